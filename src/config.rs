//! Application Configuration
//! Fixed data source, export settings and window geometry.

/// MINSAL establishments dataset published on datos.gob.cl
pub const SOURCE_URL: &str = "https://datos.gob.cl/dataset/3bf4cf7c-f638-4735-9a01-f65faae4beca/resource/2c44d782-3365-44e3-aefb-2c8b8363a1bc/download/establecimientos_20241126.csv";

/// Default file name offered by the CSV download
pub const EXPORT_FILE_NAME: &str = "establecimientos_salud.csv";
pub const EXPORT_MIME: &str = "text/csv";

/// Default file name offered by the chart image export
pub const CHART_FILE_NAME: &str = "graficos_establecimientos.png";

pub const APP_TITLE: &str = "Explorador de Establecimientos de Salud en Chile";

/// Runtime configuration, built from the constants above.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_url: String,
    pub export_file_name: String,
    pub chart_file_name: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Pixel size of exported chart images (width, height)
    pub chart_image_size: (u32, u32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
            chart_file_name: CHART_FILE_NAME.to_string(),
            window_size: [1400.0, 850.0],
            min_window_size: [1100.0, 700.0],
            chart_image_size: (1600, 800),
        }
    }
}
