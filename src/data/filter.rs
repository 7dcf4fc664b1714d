//! Filter Engine
//! Selects establishments by region, municipality substring, or not at all.

use crate::data::columns::{MUNICIPALITY, REGION_CODE};
use crate::data::regions;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// How to narrow the establishments table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMode {
    /// Rows whose region code matches the named region
    ByRegion(String),
    /// Rows whose municipality contains the query, ignoring case
    ByMunicipality(Option<String>),
    /// Every row
    All,
}

/// Apply a filter mode to a normalized table.
///
/// The result keeps the input schema and row order; no match gives an empty
/// table, never an error.
pub fn apply(df: &DataFrame, mode: &FilterMode) -> Result<DataFrame, FilterError> {
    let filtered = match mode {
        FilterMode::ByRegion(name) => by_region(df, name)?,
        FilterMode::ByMunicipality(query) => by_municipality(df, query.as_deref())?,
        FilterMode::All => df.clone(),
    };

    debug!(?mode, rows = filtered.height(), "filter applied");
    Ok(filtered)
}

fn by_region(df: &DataFrame, name: &str) -> Result<DataFrame, FilterError> {
    let Some(code) = regions::region_code(name) else {
        return Ok(df.clear());
    };

    let filtered = df
        .clone()
        .lazy()
        .filter(col(REGION_CODE).eq(lit(code)))
        .collect()?;
    Ok(filtered)
}

fn by_municipality(df: &DataFrame, query: Option<&str>) -> Result<DataFrame, FilterError> {
    let needle = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return Ok(df.clear()),
    };

    let column = df.column(MUNICIPALITY)?.cast(&DataType::String)?;
    let mask: BooleanChunked = column
        .str()?
        .into_iter()
        .map(|value| value.is_some_and(|v| v.to_lowercase().contains(&needle)))
        .collect();

    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::{self, ESTABLISHMENT_NAME, REGION_NAME};
    use crate::data::normalizer::{normalize, tests::raw_fixture};

    fn normalized() -> DataFrame {
        normalize(Some(&raw_fixture())).unwrap().unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        columns::string_values(df, ESTABLISHMENT_NAME)
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    fn municipalities() -> DataFrame {
        df!(
            ESTABLISHMENT_NAME => ["A", "B", "C", "D"],
            REGION_CODE => [13i64, 13, 5, 5],
            MUNICIPALITY => [Some("Santiago"), Some("SANTIAGO CENTRO"), Some("Valparaíso"), None]
        )
        .unwrap()
    }

    #[test]
    fn region_filter_keeps_matching_codes_in_order() {
        let df = normalized();
        let result = apply(&df, &FilterMode::ByRegion("Valparaíso".into())).unwrap();

        assert_eq!(result.height(), 2);
        assert_eq!(
            names(&result),
            vec!["Hospital Carlos Van Buren", "CESFAM Placilla"]
        );

        let codes: Vec<Option<i64>> = result
            .column(REGION_CODE)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert!(codes.iter().all(|c| *c == Some(5)));
    }

    #[test]
    fn region_filter_count_matches_code_count() {
        let df = normalized();
        for (code, name) in regions::REGIONS {
            let expected = df
                .column(REGION_CODE)
                .unwrap()
                .i64()
                .unwrap()
                .into_iter()
                .filter(|c| *c == Some(code))
                .count();
            let result = apply(&df, &FilterMode::ByRegion(name.into())).unwrap();
            assert_eq!(result.height(), expected, "region {name}");
        }
    }

    #[test]
    fn unknown_region_gives_empty_table_with_schema() {
        let df = normalized();
        let result = apply(&df, &FilterMode::ByRegion("Atlántida".into())).unwrap();
        assert_eq!(result.height(), 0);
        assert_eq!(result.schema(), df.schema());
    }

    #[test]
    fn municipality_filter_is_case_insensitive_substring() {
        let df = municipalities();
        let result = apply(&df, &FilterMode::ByMunicipality(Some("santiago".into()))).unwrap();
        assert_eq!(names(&result), vec!["A", "B"]);

        let result = apply(&df, &FilterMode::ByMunicipality(Some("PARAÍ".into()))).unwrap();
        assert_eq!(names(&result), vec!["C"]);
    }

    #[test]
    fn empty_or_missing_query_gives_empty_result() {
        let df = municipalities();
        let empty = apply(&df, &FilterMode::ByMunicipality(Some(String::new()))).unwrap();
        let missing = apply(&df, &FilterMode::ByMunicipality(None)).unwrap();

        assert_eq!(empty.height(), 0);
        assert_eq!(missing.height(), 0);
        assert_eq!(empty.width(), df.width());
    }

    #[test]
    fn null_municipalities_never_match() {
        let df = normalized();
        let result = apply(&df, &FilterMode::ByMunicipality(Some("a".into()))).unwrap();
        assert!(!names(&result).contains(&"Posta Desconocida".to_string()));
        assert_eq!(result.height(), 3);
    }

    #[test]
    fn all_returns_input_unchanged() {
        let df = normalized();
        let result = apply(&df, &FilterMode::All).unwrap();
        assert!(result.equals_missing(&df));
        assert_eq!(
            result.get_column_names(),
            df.get_column_names()
        );
        assert!(columns::has_column(&result, REGION_NAME));
    }
}
