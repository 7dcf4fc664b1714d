//! Dataset column names and column access helpers.

use polars::prelude::*;

pub const ESTABLISHMENT_NAME: &str = "EstablecimientoGlosa";
pub const REGION_CODE: &str = "RegionCodigo";
pub const REGION_LABEL: &str = "RegionGlosa";
pub const ESTABLISHMENT_TYPE: &str = "TipoEstablecimientoGlosa";
pub const DEPENDENCY: &str = "DependenciaAdministrativa";
pub const MUNICIPALITY: &str = "ComunaGlosa";
pub const STATUS: &str = "EstadoFuncionamiento";

/// Derived from `RegionCodigo` through the region lookup.
pub const REGION_NAME: &str = "RegionNombre";

/// Columns that must be present in the source table, in output order.
pub const REQUIRED: [&str; 7] = [
    ESTABLISHMENT_NAME,
    REGION_CODE,
    REGION_LABEL,
    ESTABLISHMENT_TYPE,
    DEPENDENCY,
    MUNICIPALITY,
    STATUS,
];

/// Whether the frame has a column with this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Column values as optional strings, nulls preserved.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Sorted distinct non-empty values of a column.
pub fn distinct_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let unique = df
        .column(name)?
        .cast(&DataType::String)?
        .as_materialized_series()
        .unique()?
        .sort(SortOptions::default())?;

    let values = unique
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect();
    Ok(values)
}
