//! Dashboard Pipeline
//! Sequences fetch → normalize → filter → chart summaries.
//!
//! Every interaction rebuilds the view from the immutable dataset and the
//! current `DashboardState`; nothing here holds UI state of its own.

use crate::charts::{self, CategoryChart, ChartChoice};
use crate::data::{self, columns, DataFetcher, FetchError, FilterError, FilterMode, NormalizeError};
use chrono::{DateTime, Local};
use polars::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

impl PipelineError {
    /// Single-line message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Fetch(FetchError::Network(e)) => {
                format!("Hubo un error al intentar cargar los datos. Error: {}", e)
            }
            other => format!("Error inesperado: {}", other),
        }
    }
}

/// Which filter the user picked, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    Region,
    Municipality,
    All,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [FilterKind::Region, FilterKind::Municipality, FilterKind::All];

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Region => "Región",
            FilterKind::Municipality => "Comuna",
            FilterKind::All => "Todo el País",
        }
    }
}

/// Everything the user has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub filter_mode: FilterKind,
    pub region_selection: String,
    pub municipality_query: Option<String>,
    pub chart_choice: ChartChoice,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            filter_mode: FilterKind::default(),
            region_selection: data::regions::REGIONS[0].1.to_string(),
            municipality_query: None,
            chart_choice: ChartChoice::default(),
        }
    }
}

impl DashboardState {
    pub fn filter(&self) -> FilterMode {
        match self.filter_mode {
            FilterKind::Region => FilterMode::ByRegion(self.region_selection.clone()),
            FilterKind::Municipality => FilterMode::ByMunicipality(self.municipality_query.clone()),
            FilterKind::All => FilterMode::All,
        }
    }
}

/// Normalized establishments for one session.
#[derive(Clone)]
pub struct Dataset {
    pub establishments: DataFrame,
    /// Distinct municipalities, sorted, for the typeahead picker
    pub municipalities: Vec<String>,
    pub fetched_at: Option<DateTime<Local>>,
}

/// What the presentation layer draws for one state.
#[derive(Clone)]
pub struct DashboardView {
    pub filtered: DataFrame,
    /// `None` when nothing matched the filter
    pub chart: Option<CategoryChart>,
    /// `None` when nothing matched or the status column is absent
    pub status_chart: Option<CategoryChart>,
}

impl DashboardView {
    pub fn has_charts(&self) -> bool {
        self.chart.is_some() || self.status_chart.is_some()
    }
}

/// Fetch and normalize the dataset at `url`.
pub fn load_dataset(fetcher: &mut DataFetcher, url: &str) -> Result<Option<Dataset>, PipelineError> {
    let raw = fetcher.load(url)?;

    let Some(establishments) = data::normalize(Some(&raw))? else {
        warn!("normalization produced no table");
        return Ok(None);
    };

    let municipalities = columns::distinct_values(&establishments, columns::MUNICIPALITY)?;
    info!(
        rows = establishments.height(),
        municipalities = municipalities.len(),
        "dataset ready"
    );

    Ok(Some(Dataset {
        establishments,
        municipalities,
        fetched_at: fetcher.fetched_at(url),
    }))
}

/// Filter the dataset and summarize the matches for the current state.
pub fn build_view(dataset: &Dataset, state: &DashboardState) -> Result<DashboardView, PipelineError> {
    let filtered = data::apply_filter(&dataset.establishments, &state.filter())?;

    if filtered.height() == 0 {
        return Ok(DashboardView {
            filtered,
            chart: None,
            status_chart: None,
        });
    }

    let chart = charts::selected_chart(&filtered, state.chart_choice)?;
    let status_chart = charts::status_breakdown(&filtered)?;

    Ok(DashboardView {
        filtered,
        chart: Some(chart),
        status_chart,
    })
}
