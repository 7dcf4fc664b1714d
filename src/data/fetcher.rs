//! Remote CSV Fetcher Module
//! Downloads the establishments dataset and parses it with Polars.
//!
//! Successful tables are memoized per URL for the lifetime of the fetcher,
//! so repeated loads of the same URL never reach the network twice.

use chrono::{DateTime, Local};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
}

/// Raw byte transport for a URL.
pub trait Transport: Send {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// A fetched table and when it was fetched.
#[derive(Clone)]
pub struct CachedTable {
    pub table: DataFrame,
    pub fetched_at: DateTime<Local>,
}

/// Loads semicolon-delimited CSV tables from URLs, one fetch per URL.
pub struct DataFetcher {
    transport: Box<dyn Transport>,
    cache: HashMap<String, CachedTable>,
}

impl Default for DataFetcher {
    fn default() -> Self {
        Self::new(Box::new(HttpTransport::new()))
    }
}

impl DataFetcher {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            cache: HashMap::new(),
        }
    }

    /// Load the table at `url`, from cache when it was already fetched.
    ///
    /// Failed fetches are not cached; calling again retries the transport.
    pub fn load(&mut self, url: &str) -> Result<DataFrame, FetchError> {
        if let Some(cached) = self.cache.get(url) {
            debug!(url, "dataset cache hit");
            return Ok(cached.table.clone());
        }

        info!(url, "fetching dataset");
        let bytes = self.transport.get(url).inspect_err(|e| {
            warn!(url, error = %e, "fetch failed");
        })?;

        let table = parse_csv(bytes)?;
        info!(
            rows = table.height(),
            columns = table.width(),
            "dataset fetched"
        );

        self.cache.insert(
            url.to_string(),
            CachedTable {
                table: table.clone(),
                fetched_at: Local::now(),
            },
        );

        Ok(table)
    }

    /// When `url` was fetched, if it is cached.
    pub fn fetched_at(&self, url: &str) -> Option<DateTime<Local>> {
        self.cache.get(url).map(|c| c.fetched_at)
    }
}

/// Parse a semicolon-delimited CSV body; column names come from the first line.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, FetchError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .map_parse_options(|opts| {
            opts.with_separator(b';')
                .with_encoding(CsvEncoding::LossyUtf8)
        })
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    Ok(df)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) const SAMPLE_CSV: &str = "\
EstablecimientoGlosa;RegionCodigo;RegionGlosa;TipoEstablecimientoGlosa;DependenciaAdministrativa;ComunaGlosa;EstadoFuncionamiento;NivelAtencion
Hospital Carlos Van Buren;5;Región De Valparaíso;Hospital;Servicio de Salud;Valparaíso;Vigente;Terciario
CESFAM Placilla;5;Región De Valparaíso;Centro de Salud Familiar (CESFAM);Municipal;Valparaíso;Vigente;Primario
Hospital San Juan de Dios;13;Región Metropolitana de Santiago;Hospital;Servicio de Salud;Santiago;No Vigente;Terciario
Posta Desconocida;99;Sin Región;Posta de Salud Rural (PSR);Municipal;;Vigente;Primario
";

    /// Transport that counts calls and serves a fixed response.
    pub(crate) struct FakeTransport {
        pub calls: Arc<AtomicUsize>,
        pub body: Option<String>,
    }

    impl FakeTransport {
        pub fn serving(body: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                calls: calls.clone(),
                body: Some(body.to_string()),
            };
            (transport, calls)
        }

        pub fn failing() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                calls: calls.clone(),
                body: None,
            };
            (transport, calls)
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.body {
                Some(body) => Ok(body.as_bytes().to_vec()),
                None => Err(FetchError::Network(
                    "HTTP status server error (503 Service Unavailable)".to_string(),
                )),
            }
        }
    }

    #[test]
    fn parses_semicolon_delimited_body() {
        let df = parse_csv(SAMPLE_CSV.as_bytes().to_vec()).unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 8);
        assert_eq!(df.get_column_names()[0].as_str(), "EstablecimientoGlosa");
        assert_eq!(df.get_column_names()[1].as_str(), "RegionCodigo");
    }

    #[test]
    fn empty_body_is_a_parse_error() {
        let err = parse_csv(Vec::new()).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn repeated_loads_fetch_once() {
        let (transport, calls) = FakeTransport::serving(SAMPLE_CSV);
        let mut fetcher = DataFetcher::new(Box::new(transport));

        let first = fetcher.load("https://example.test/a.csv").unwrap();
        let second = fetcher.load("https://example.test/a.csv").unwrap();
        let third = fetcher.load("https://example.test/a.csv").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(first.equals_missing(&second));
        assert!(first.equals_missing(&third));
        assert!(fetcher.fetched_at("https://example.test/a.csv").is_some());
    }

    #[test]
    fn distinct_urls_fetch_separately() {
        let (transport, calls) = FakeTransport::serving(SAMPLE_CSV);
        let mut fetcher = DataFetcher::new(Box::new(transport));

        fetcher.load("https://example.test/a.csv").unwrap();
        fetcher.load("https://example.test/b.csv").unwrap();
        fetcher.load("https://example.test/a.csv").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let (transport, calls) = FakeTransport::failing();
        let mut fetcher = DataFetcher::new(Box::new(transport));

        let err = fetcher.load("https://example.test/a.csv").unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.to_string().contains("503"));
        assert!(fetcher.fetched_at("https://example.test/a.csv").is_none());

        fetcher.load("https://example.test/a.csv").unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
