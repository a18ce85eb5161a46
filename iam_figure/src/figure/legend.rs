use plotters::style::RGBColor;

use super::palette::{CategoryColors, ModelColors, HISTORICAL_COLOR};

/// How an entry is keyed in the legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendMarker {
    Line { width: u32 },
    DashedLine { width: u32 },
    /// Filled square with a black edge.
    Swatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub marker: LegendMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Drawn in bold above the entries.
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

/// Historical entry first, then one entry per model in sorted order.
///
/// `model_region` gives the region of each model's first study row.
pub fn model_legend<'a>(
    study_name: &str,
    historical_region: &str,
    colors: &ModelColors,
    model_region: impl Fn(&str) -> Option<&'a str>,
) -> Legend {
    let mut entries = vec![LegendEntry {
        label: format!("Historical ({historical_region})"),
        color: HISTORICAL_COLOR,
        marker: LegendMarker::DashedLine { width: 2 },
    }];
    for model in colors.models() {
        let label = match model_region(model) {
            Some(region) => format!("{model} ({region})"),
            None => model.to_string(),
        };
        entries.push(LegendEntry {
            label,
            color: colors.get(model).unwrap_or(HISTORICAL_COLOR),
            marker: LegendMarker::Line { width: 3 },
        });
    }
    Legend {
        title: study_name.to_string(),
        entries,
    }
}

pub fn category_legend(
    box_cats: &[String; 3],
    colors: &CategoryColors,
    target_year: Option<f64>,
    region_label: &str,
) -> Legend {
    let title = match target_year {
        Some(year) => format!("AR6 {year:.0} projections ({region_label})"),
        None => format!("AR6 projections ({region_label})"),
    };
    let entries = box_cats
        .iter()
        .map(|cat| LegendEntry {
            label: format!("AR6 SSP2-{cat}"),
            color: colors.get(cat).unwrap_or(HISTORICAL_COLOR),
            marker: LegendMarker::Swatch,
        })
        .collect();
    Legend { title, entries }
}
