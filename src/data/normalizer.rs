//! Data Normalizer Module
//! Projects the raw table to the required columns and derives region names.

use crate::data::columns::{self, REGION_CODE, REGION_NAME, REQUIRED};
use crate::data::regions;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Normalize a raw establishments table.
///
/// `None` in gives `None` out. Region codes without a lookup entry get a null
/// `RegionNombre` rather than an error.
pub fn normalize(raw: Option<&DataFrame>) -> Result<Option<DataFrame>, NormalizeError> {
    let Some(raw) = raw else {
        debug!("no raw table to normalize");
        return Ok(None);
    };

    if let Some(missing) = REQUIRED.iter().find(|c| !columns::has_column(raw, c)) {
        return Err(NormalizeError::MissingColumn(missing.to_string()));
    }

    let mut df = raw.select(REQUIRED)?;

    let codes = df.column(REGION_CODE)?.cast(&DataType::Int64)?;
    let names: Vec<Option<&str>> = codes
        .i64()?
        .into_iter()
        .map(|code| code.and_then(regions::region_name))
        .collect();

    let unmapped = names.iter().filter(|n| n.is_none()).count();

    df.with_column(codes)?;
    df.with_column(Column::new(REGION_NAME.into(), names))?;

    info!(
        rows = df.height(),
        unmapped_regions = unmapped,
        "normalized establishments"
    );

    Ok(Some(df))
}
