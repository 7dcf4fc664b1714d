//! CSV Export Module
//! Writes the normalized establishments table as comma-delimited CSV.

use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to create file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Write a table as CSV: header row, comma separator, no index.
pub fn write_to<W: Write>(df: &DataFrame, writer: W) -> Result<(), ExportError> {
    let mut df = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    Ok(())
}

/// Write a table as CSV to `path`.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_to(df, &mut writer)?;
    writer.flush()?;

    info!(path = %path.display(), rows = df.height(), "exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::{self, MUNICIPALITY, REGION_NAME, REQUIRED};
    use crate::data::normalize;
    use std::io::Cursor;

    fn normalized() -> DataFrame {
        let raw = crate::data::fetcher_tests::SAMPLE_CSV.as_bytes().to_vec();
        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|o| o.with_separator(b';'))
            .into_reader_with_file_handle(Cursor::new(raw))
            .finish()
            .unwrap();
        normalize(Some(&raw)).unwrap().unwrap()
    }

    fn reparse(bytes: Vec<u8>) -> DataFrame {
        CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .unwrap()
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "salud_explorer_{}_{}.csv",
            tag,
            std::process::id()
        ))
    }

    /// Export through the same path the app uses and read the file back.
    fn export_and_reparse(df: &DataFrame, tag: &str) -> DataFrame {
        let path = temp_path(tag);
        write_csv(df, &path).unwrap();
        let back = reparse(std::fs::read(&path).unwrap());
        std::fs::remove_file(&path).ok();
        back
    }

    #[test]
    fn header_matches_normalized_columns_without_index() {
        let mut buf = Vec::new();
        write_to(&normalized(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();

        let mut expected = REQUIRED.to_vec();
        expected.push(REGION_NAME);
        assert_eq!(header, expected.join(","));
    }

    #[test]
    fn round_trip_preserves_columns_rows_and_values() {
        let df = normalized();
        let back = export_and_reparse(&df, "round_trip");

        assert_eq!(back.get_column_names(), df.get_column_names());
        assert_eq!(back.height(), df.height());

        for name in df.get_column_names() {
            assert_eq!(
                columns::string_values(&back, name).unwrap(),
                columns::string_values(&df, name).unwrap(),
                "column {name}"
            );
        }
    }

    #[test]
    fn null_cells_stay_null_on_disk() {
        let back = export_and_reparse(&normalized(), "nulls");

        assert_eq!(back.height(), 4);
        assert_eq!(
            columns::string_values(&back, MUNICIPALITY).unwrap()[3],
            None
        );
    }
}
