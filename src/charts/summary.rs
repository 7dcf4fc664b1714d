//! Chart Summaries
//! Frequency counts and proportions behind every chart, independent of the
//! drawing backend.

use crate::data::columns::{self, DEPENDENCY, ESTABLISHMENT_TYPE, STATUS};
use polars::prelude::*;
use std::f64::consts::TAU;

/// RGB triple shared by the egui and plotters backends.
pub type Rgb = (u8, u8, u8);

pub const SKY_BLUE: Rgb = (135, 206, 235);
pub const LIME_GREEN: Rgb = (50, 205, 50);
pub const GRAY: Rgb = (128, 128, 128);

pub const PALETTE: [Rgb; 10] = [
    (31, 119, 180),  // Blue
    (255, 127, 14),  // Orange
    (44, 160, 44),   // Green
    (214, 39, 40),   // Red
    (148, 103, 189), // Purple
    (140, 86, 75),   // Brown
    (227, 119, 194), // Pink
    (127, 127, 127), // Grey
    (188, 189, 34),  // Olive
    (23, 190, 207),  // Cyan
];

/// Output column of `value_counts`
const COUNT: &str = "count";

/// Leading words of status values counted as "open", compared case-insensitively.
const OPEN_STATUSES: [&str; 4] = ["vigente", "en funcionamiento", "abierto", "activo"];

/// User-selectable chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartChoice {
    /// Bar chart of establishment type counts
    #[default]
    TypeDistribution,
    /// Pie chart of administrative dependency proportions
    DependencyShare,
}

impl ChartChoice {
    pub const ALL: [ChartChoice; 2] = [ChartChoice::TypeDistribution, ChartChoice::DependencyShare];

    pub fn label(&self) -> &'static str {
        match self {
            ChartChoice::TypeDistribution => "Distribución por Tipo",
            ChartChoice::DependencyShare => "Proporción por Dependencia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// One color for every bar
    Single(Rgb),
    /// Cycle through `PALETTE`
    Palette,
    /// Open statuses stand out, everything else is neutral
    OpenVsOther,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Counted categories plus how to draw them.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<CategoryCount>,
    pub colors: ColorScheme,
}

/// One pie slice, angles in radians measured clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub start: f64,
    pub end: f64,
    pub percent: f64,
    pub color: Rgb,
}

impl CategoryChart {
    /// Sum of all category counts.
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }

    /// Share of category `idx` in percent.
    pub fn percent(&self, idx: usize) -> f64 {
        let total = self.total();
        match self.categories.get(idx) {
            Some(c) if total > 0 => c.count as f64 * 100.0 / total as f64,
            _ => 0.0,
        }
    }

    pub fn color(&self, idx: usize) -> Rgb {
        match self.colors {
            ColorScheme::Single(rgb) => rgb,
            ColorScheme::Palette => PALETTE[idx % PALETTE.len()],
            ColorScheme::OpenVsOther => match self.categories.get(idx) {
                Some(c) if is_open_status(&c.label) => LIME_GREEN,
                _ => GRAY,
            },
        }
    }

    pub fn max_count(&self) -> usize {
        self.categories.iter().map(|c| c.count).max().unwrap_or(0)
    }

    /// Consecutive slices covering the full circle, in category order.
    pub fn pie_slices(&self) -> Vec<PieSlice> {
        let mut start = 0.0;
        (0..self.categories.len())
            .map(|i| {
                let percent = self.percent(i);
                let end = start + TAU * percent / 100.0;
                let slice = PieSlice {
                    label: self.categories[i].label.clone(),
                    start,
                    end,
                    percent,
                    color: self.color(i),
                };
                start = end;
                slice
            })
            .collect()
    }
}

/// Percentage label with one decimal, e.g. `33.3%`.
pub fn percent_label(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Whether a status reads as open, e.g. `Vigente` or `Abierto con restricciones`.
pub fn is_open_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    OPEN_STATUSES.iter().any(|open| {
        status
            .strip_prefix(open)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', ',', '(', '-']))
    })
}

/// Non-null value counts of a column, most frequent first.
///
/// Ties keep the order in which the values first appear.
pub fn value_counts(df: &DataFrame, column: &str) -> PolarsResult<Vec<CategoryCount>> {
    let counted = df
        .clone()
        .lazy()
        .select([col(column).cast(DataType::String)])
        .filter(col(column).is_not_null())
        .group_by_stable([col(column)])
        .agg([len().alias(COUNT)])
        .sort(
            [COUNT],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let labels = columns::string_values(&counted, column)?;
    let counts = counted
        .column(COUNT)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    let categories = labels
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .filter_map(|(label, count)| {
            Some(CategoryCount {
                label: label?,
                count: count? as usize,
            })
        })
        .collect();

    Ok(categories)
}

/// Chart for the user's selection.
pub fn selected_chart(df: &DataFrame, choice: ChartChoice) -> PolarsResult<CategoryChart> {
    match choice {
        ChartChoice::TypeDistribution => type_distribution(df),
        ChartChoice::DependencyShare => dependency_share(df),
    }
}

pub fn type_distribution(df: &DataFrame) -> PolarsResult<CategoryChart> {
    Ok(CategoryChart {
        kind: ChartKind::Bar,
        title: "Distribución por Tipo de Establecimiento".to_string(),
        x_label: "Tipo de Establecimiento".to_string(),
        y_label: "Cantidad".to_string(),
        categories: value_counts(df, ESTABLISHMENT_TYPE)?,
        colors: ColorScheme::Single(SKY_BLUE),
    })
}

pub fn dependency_share(df: &DataFrame) -> PolarsResult<CategoryChart> {
    Ok(CategoryChart {
        kind: ChartKind::Pie,
        title: "Proporción por Dependencia Administrativa".to_string(),
        x_label: String::new(),
        y_label: String::new(),
        categories: value_counts(df, DEPENDENCY)?,
        colors: ColorScheme::Palette,
    })
}

/// Operating status pie, `None` when the table has no status column.
pub fn status_breakdown(df: &DataFrame) -> PolarsResult<Option<CategoryChart>> {
    if !columns::has_column(df, STATUS) {
        return Ok(None);
    }

    Ok(Some(CategoryChart {
        kind: ChartKind::Pie,
        title: "Establecimientos en Uso vs Cerrados".to_string(),
        x_label: String::new(),
        y_label: String::new(),
        categories: value_counts(df, STATUS)?,
        colors: ColorScheme::OpenVsOther,
    }))
}
