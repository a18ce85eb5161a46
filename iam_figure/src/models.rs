use std::error::Error;

use polars::error::{PolarsError, PolarsResult};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};

// Column names shared by the IAMC-style inputs.
pub const MODEL: &str = "model";
pub const SCENARIO: &str = "scenario";
pub const REGION: &str = "region";
pub const CATEGORY: &str = "Category";
pub const VARIABLE: &str = "variable";
pub const YEAR: &str = "year";
pub const VALUE: &str = "value";
pub const STUDY: &str = "study";
pub const UNIT: &str = "unit";

/// Wrap any non-polars error (drawing backend, I/O) so it can travel through `PolarsResult`.
pub fn polars_err(e: Box<dyn Error>) -> PolarsError {
    PolarsError::ComputeError(e.to_string().into())
}

pub trait Dataset {
    fn load(&self) -> PolarsResult<DataFrame>;
}

/// A labelled vertical marker drawn across every scenario panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseYearMarker {
    pub year: f64,
    pub label: String,
}

/// Selectors and knobs for one intercomparison figure.
///
/// Every field has a default, so a JSON options file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureOptions {
    /// Region pair the historical series was aggregated over; the first one names the figure.
    pub region_list: [String; 2],
    /// Ensemble categories drawn as boxplots, mildest first.
    pub box_cats: [String; 3],
    /// Ensemble rows are restricted to this year before grouping. `None` keeps every row.
    pub ensemble_year: Option<f64>,
    pub funnel_start_year: f64,
    pub show_median: bool,
    pub base_years: Vec<BaseYearMarker>,
}

impl Default for FigureOptions {
    fn default() -> Self {
        FigureOptions {
            region_list: ["EU28".to_string(), "EU27".to_string()],
            box_cats: ["C1".to_string(), "C2".to_string(), "C3".to_string()],
            ensemble_year: Some(2050.0),
            funnel_start_year: 2020.0,
            show_median: false,
            base_years: vec![BaseYearMarker {
                year: 2020.0,
                label: "Base year 2020".to_string(),
            }],
        }
    }
}
