use std::collections::BTreeMap;
use std::ops::Range;

use plotters::style::RGBColor;
use polars::prelude::*;
use tracing::{debug, warn};

use super::boxplot::{BoxGlyph, BoxStats, BOX_POSITIONS, BOX_WIDTH};
use super::geometry::clip_x;
use super::palette::{CategoryColors, ModelColors, HISTORICAL_COLOR};
use crate::helper_functions::{f64_values, str_values};
use crate::models::{BaseYearMarker, FigureOptions, CATEGORY, MODEL, SCENARIO, VALUE, YEAR};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelLine {
    pub model: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// Per-year min/max band across models, years ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Funnel {
    pub years: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub median: Option<Vec<f64>>,
}

impl Funnel {
    /// Closed outline inside `x_range`: along the upper edge, back along the lower one.
    pub fn outline(&self, x_range: &Range<f64>) -> Option<Vec<(f64, f64)>> {
        let upper: Vec<(f64, f64)> = self.years.iter().copied().zip(self.upper.iter().copied()).collect();
        let lower: Vec<(f64, f64)> = self.years.iter().copied().zip(self.lower.iter().copied()).collect();
        let upper = clip_x(&upper, x_range).into_iter().next()?;
        let lower = clip_x(&lower, x_range).into_iter().next()?;
        Some(upper.into_iter().chain(lower.into_iter().rev()).collect())
    }

    pub fn median_points(&self) -> Option<Vec<(f64, f64)>> {
        self.median
            .as_ref()
            .map(|m| self.years.iter().copied().zip(m.iter().copied()).collect())
    }
}

/// Base-year labels hang from this fraction of the upper y-limit.
const GUIDE_LABEL_FRACTION: f64 = 0.6;

/// Height of the base-year labels, kept inside `y_range`.
///
/// With an all-negative range the fraction lands above the top, so the label sits at the top.
pub fn guide_label_y(y_range: &Range<f64>) -> f64 {
    (y_range.end * GUIDE_LABEL_FRACTION).clamp(y_range.start, y_range.end)
}

/// Everything drawn inside one scenario's axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPanel {
    pub scenario: String,
    pub historical: Vec<(f64, f64)>,
    pub model_lines: Vec<ModelLine>,
    pub funnel: Option<Funnel>,
    pub boxes: Vec<BoxGlyph>,
    pub base_years: Vec<BaseYearMarker>,
}

impl ScenarioPanel {
    /// Lowest and highest plotted value, `None` for an empty panel.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        let mut ys: Vec<f64> = self.historical.iter().map(|p| p.1).collect();
        for line in &self.model_lines {
            ys.extend(line.points.iter().map(|p| p.1));
        }
        if let Some(funnel) = &self.funnel {
            ys.extend(funnel.lower.iter().chain(funnel.upper.iter()));
            if let Some(median) = &funnel.median {
                ys.extend(median.iter());
            }
        }
        for stats in self.boxes.iter().filter_map(|b| b.stats.as_ref()) {
            ys.push(stats.whisker_low);
            ys.push(stats.whisker_high);
        }
        let ys = ys.into_iter().filter(|y| y.is_finite());
        ys.fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((f64::min(lo, y), f64::max(hi, y))),
        })
    }
}

/// Study rows of one scenario, with `year` and `value` as `f64`.
pub fn scenario_subset(study: &DataFrame, scenario: &str) -> PolarsResult<DataFrame> {
    study
        .clone()
        .lazy()
        .filter(col(SCENARIO).eq(lit(scenario)))
        .with_columns([
            col(YEAR).cast(DataType::Float64),
            col(VALUE).cast(DataType::Float64),
        ])
        .collect()
}

/// One line per model, models sorted, points in row order.
pub fn model_lines(subset: &DataFrame, colors: &ModelColors) -> PolarsResult<Vec<ModelLine>> {
    let models = str_values(subset, MODEL)?;
    let years = f64_values(subset, YEAR)?;
    let values = f64_values(subset, VALUE)?;

    let mut grouped: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    for ((model, year), value) in models.into_iter().zip(years).zip(values) {
        let Some(model) = model else { continue };
        let points = grouped.entry(model).or_default();
        if let (Some(year), Some(value)) = (year, value) {
            points.push((year, value));
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(model, points)| {
            let color = colors.get(&model).unwrap_or_else(|| {
                warn!("No colour assigned to model '{}'", model);
                HISTORICAL_COLOR
            });
            ModelLine {
                model,
                color,
                points,
            }
        })
        .collect())
}

/// Min/max (and optionally median) band over the rows from `start_year` on.
pub fn funnel(subset: &DataFrame, start_year: f64, with_median: bool) -> PolarsResult<Option<Funnel>> {
    let post = subset
        .clone()
        .lazy()
        .with_columns([
            col(YEAR).cast(DataType::Float64),
            col(VALUE).cast(DataType::Float64),
        ])
        .filter(col(YEAR).gt_eq(lit(start_year)))
        .collect()?;
    if post.height() == 0 {
        return Ok(None);
    }

    let per_year = post
        .lazy()
        .group_by([col(YEAR)])
        .agg([
            col(VALUE).min().alias("min_value"),
            col(VALUE).max().alias("max_value"),
            col(VALUE).median().alias("median_value"),
        ])
        .collect()?;

    let years = f64_values(&per_year, YEAR)?;
    let mins = f64_values(&per_year, "min_value")?;
    let maxs = f64_values(&per_year, "max_value")?;
    let medians = f64_values(&per_year, "median_value")?;

    let mut rows: Vec<(f64, f64, f64, f64)> = years
        .into_iter()
        .zip(mins)
        .zip(maxs)
        .zip(medians)
        .filter_map(|(((y, lo), hi), med)| Some((y?, lo?, hi?, med?)))
        .collect();
    if rows.is_empty() {
        return Ok(None);
    }
    rows.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(Some(Funnel {
        years: rows.iter().map(|r| r.0).collect(),
        lower: rows.iter().map(|r| r.1).collect(),
        upper: rows.iter().map(|r| r.2).collect(),
        median: with_median.then(|| rows.iter().map(|r| r.3).collect()),
    }))
}

/// Boxes for the configured categories, at their fixed positions.
pub fn box_glyphs(
    ensemble: &DataFrame,
    options: &FigureOptions,
    colors: &CategoryColors,
) -> PolarsResult<Vec<BoxGlyph>> {
    let mut targeted = ensemble.clone().lazy();
    if let Some(year) = options.ensemble_year {
        targeted = targeted.filter(col(YEAR).cast(DataType::Float64).eq(lit(year)));
    }
    let targeted = targeted.collect()?;

    let categories = str_values(&targeted, CATEGORY)?;
    let values = f64_values(&targeted, VALUE)?;

    let glyphs = options
        .box_cats
        .iter()
        .zip(BOX_POSITIONS)
        .map(|(cat, position)| {
            let samples: Vec<f64> = categories
                .iter()
                .zip(&values)
                .filter(|(c, _)| c.as_deref() == Some(cat.as_str()))
                .filter_map(|(_, v)| *v)
                .collect();
            if samples.is_empty() {
                warn!("No ensemble samples for category '{}'", cat);
            } else {
                debug!("Category '{}': {} ensemble samples", cat, samples.len());
            }
            BoxGlyph {
                category: cat.clone(),
                position,
                width: BOX_WIDTH,
                color: colors.get(cat).unwrap_or(HISTORICAL_COLOR),
                sample_count: samples.len(),
                stats: BoxStats::from_values(&samples),
            }
        })
        .collect();
    Ok(glyphs)
}
