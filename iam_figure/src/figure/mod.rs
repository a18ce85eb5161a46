//! The intercomparison figure: one panel per scenario comparing the study's model
//! trajectories with the historical series and the ensemble's category boxplots.
//!
//! [`build_figure`] reduces the three frames to an [`IntercomparisonFigure`];
//! [`render`] draws that description with plotters.

pub mod boxplot;
pub mod geometry;
pub mod layout;
pub mod legend;
pub mod palette;
pub mod panel;
pub mod render;

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use polars::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use crate::helper_functions::{expand_range, first_str, str_values, xy_points};
use crate::models::{polars_err, FigureOptions, MODEL, REGION, STUDY, UNIT, VALUE, VARIABLE, YEAR};
use layout::{CellRole, GridLayout, LegendPlacement};
use legend::{category_legend, model_legend, Legend};
use palette::{CategoryColors, ModelColors};
use panel::{box_glyphs, funnel, model_lines, scenario_subset, ScenarioPanel};
use render::save_figure;

pub const X_RANGE: Range<f64> = 2000.0..2060.0;
/// Decade ticks, counted from the start of `X_RANGE`.
pub const X_TICK_STEP: f64 = 10.0;
/// Padding added above and below the shared y-range.
const Y_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    Scenario(ScenarioPanel),
    /// Spare cell holding both legends, no axes.
    Legends,
    Hidden,
}

/// Everything needed to draw the figure, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct IntercomparisonFigure {
    /// Two lines: study and variable, then the region.
    pub title: String,
    pub y_label: String,
    pub grid: GridLayout,
    /// Row-major, exactly `rows * cols` entries.
    pub cells: Vec<GridCell>,
    pub x_range: Range<f64>,
    pub x_tick_step: f64,
    /// Shared by every panel.
    pub y_range: Range<f64>,
    pub model_legend: Legend,
    pub category_legend: Legend,
    pub legend_placement: LegendPlacement,
    pub size: (u32, u32),
}

impl IntercomparisonFigure {
    /// Tick positions the x axis ends up with: every `x_tick_step` from the range start.
    pub fn x_ticks(&self) -> Vec<f64> {
        if !(self.x_tick_step > 0.0) {
            return Vec::new();
        }
        (0..)
            .map(|i| self.x_range.start + f64::from(i) * self.x_tick_step)
            .take_while(|t| *t < self.x_range.end)
            .collect()
    }

    pub fn panels(&self) -> impl Iterator<Item = &ScenarioPanel> {
        self.cells.iter().filter_map(|cell| match cell {
            GridCell::Scenario(panel) => Some(panel),
            _ => None,
        })
    }
}

/// Any `EU...` region is shown as plain `EU`.
fn region_label(region: &str) -> PolarsResult<String> {
    let eu = Regex::new(r"^EU.*").map_err(|e| polars_err(Box::new(e)))?;
    Ok(eu.replace(region, "EU").into_owned())
}

/// Region of each model's first row.
fn first_region_per_model(study: &DataFrame) -> PolarsResult<HashMap<String, String>> {
    let models = str_values(study, MODEL)?;
    let regions = str_values(study, REGION)?;
    let mut first = HashMap::new();
    for (model, region) in models.into_iter().zip(regions) {
        if let (Some(model), Some(region)) = (model, region) {
            first.entry(model).or_insert(region);
        }
    }
    Ok(first)
}

/// Reduce the inputs to a figure description. Nothing is drawn.
pub fn build_figure<S: AsRef<str>>(
    historical: &DataFrame,
    ensemble: &DataFrame,
    study: &DataFrame,
    scenarios: &[S],
    options: &FigureOptions,
) -> PolarsResult<IntercomparisonFigure> {
    let grid = GridLayout::for_scenarios(scenarios.len())?;
    info!(
        "Laying out {} scenarios on a {}x{} grid",
        scenarios.len(),
        grid.rows,
        grid.cols
    );

    let study_name = first_str(study, STUDY)?.replace('_', " ");
    let variable = first_str(study, VARIABLE)?;
    let unit = first_str(study, UNIT)?;
    let region_label = region_label(&options.region_list[0])?;
    let historical_region = first_str(historical, REGION)?;

    let model_colors = ModelColors::assign(str_values(study, MODEL)?.into_iter().flatten());
    let category_colors = CategoryColors::new(&options.box_cats);
    let model_regions = first_region_per_model(study)?;

    let historical_points = xy_points(historical, YEAR, VALUE)?;
    let boxes = box_glyphs(ensemble, options, &category_colors)?;

    let mut panels = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let scenario = scenario.as_ref();
        let subset = scenario_subset(study, scenario)?;
        let lines = model_lines(&subset, &model_colors)?;
        let band = funnel(&subset, options.funnel_start_year, options.show_median)?;
        debug!(
            "Panel '{}': {} models, funnel {}",
            scenario,
            lines.len(),
            if band.is_some() { "drawn" } else { "absent" }
        );
        panels.push(ScenarioPanel {
            scenario: scenario.to_string(),
            historical: historical_points.clone(),
            model_lines: lines,
            funnel: band,
            boxes: boxes.clone(),
            base_years: options.base_years.clone(),
        });
    }

    let (y_min, y_max) = panels
        .iter()
        .filter_map(ScenarioPanel::y_extent)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
        .unwrap_or((0.0, 1.0));
    let (y_lo, y_hi) = expand_range(y_min, y_max, Y_MARGIN);

    let mut panels = panels.into_iter();
    let cells = grid
        .roles()
        .into_iter()
        .map(|role| match role {
            CellRole::Scenario(_) => panels.next().map_or(GridCell::Hidden, GridCell::Scenario),
            CellRole::Legends => GridCell::Legends,
            CellRole::Hidden => GridCell::Hidden,
        })
        .collect();

    let models = model_legend(&study_name, &historical_region, &model_colors, |m| {
        model_regions.get(m).map(String::as_str)
    });
    let categories = category_legend(
        &options.box_cats,
        &category_colors,
        options.ensemble_year,
        &region_label,
    );

    Ok(IntercomparisonFigure {
        title: format!("{study_name} – {variable}\nRegion: {region_label}"),
        y_label: unit,
        grid,
        cells,
        x_range: X_RANGE,
        x_tick_step: X_TICK_STEP,
        y_range: y_lo..y_hi,
        model_legend: models,
        category_legend: categories,
        legend_placement: grid.legend_placement(),
        size: grid.figure_size(),
    })
}

/// Build the figure and write it to `output` (PNG, or SVG for a `.svg` path).
pub fn iam_intercomparison_figure<S: AsRef<str>>(
    historical: &DataFrame,
    ensemble: &DataFrame,
    study: &DataFrame,
    scenarios: &[S],
    options: &FigureOptions,
    output: &Path,
) -> PolarsResult<()> {
    let figure = build_figure(historical, ensemble, study, scenarios, options)?;
    save_figure(&figure, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::legend::LegendMarker;
    use polars::df;

    const YEARS: [i64; 12] = [2000, 2005, 2010, 2015, 2020, 2025, 2030, 2035, 2040, 2045, 2050, 2055];

    fn study(scenarios: &[&str], models: &[&str], years: &[i64]) -> DataFrame {
        let (mut m, mut s, mut r, mut y, mut v) = (vec![], vec![], vec![], vec![], vec![]);
        for (si, scenario) in scenarios.iter().enumerate() {
            for (mi, model) in models.iter().enumerate() {
                for year in years {
                    m.push(model.to_string());
                    s.push(scenario.to_string());
                    r.push(if mi == 0 { "EU27" } else { "EU28" }.to_string());
                    y.push(*year);
                    v.push(4000.0 - (*year - 2000) as f64 * (10.0 + si as f64) - mi as f64 * 100.0);
                }
            }
        }
        let n = m.len();
        df![
            "model" => m,
            "scenario" => s,
            "region" => r,
            "variable" => vec!["Emissions|CO2"; n],
            "year" => y,
            "value" => v,
            "study" => vec!["my_study"; n],
            "unit" => vec!["Mt CO2/yr"; n]
        ]
        .unwrap()
    }

    fn historical() -> DataFrame {
        df![
            "model" => &["History"; 4],
            "scenario" => &["Historical"; 4],
            "region" => &["EU27"; 4],
            "variable" => &["Emissions|CO2"; 4],
            "year" => &[1990i64, 2000, 2010, 2020],
            "value" => &[4500.0, 4200.0, 3900.0, 3300.0]
        ]
        .unwrap()
    }

    fn ensemble() -> DataFrame {
        df![
            "model" => &["X"; 6],
            "scenario" => &["a", "b", "c", "d", "e", "f"],
            "region" => &["EU"; 6],
            "Category" => &["C1", "C1", "C2", "C2", "C3", "C3"],
            "variable" => &["Emissions|CO2"; 6],
            "year" => &[2050i64; 6],
            "value" => &[100.0, 300.0, 800.0, 1000.0, 1500.0, 1900.0]
        ]
        .unwrap()
    }

    fn build(scenarios: &[&str], study: &DataFrame) -> PolarsResult<IntercomparisonFigure> {
        build_figure(&historical(), &ensemble(), study, scenarios, &FigureOptions::default())
    }

    #[test]
    fn four_scenarios_fill_a_two_by_two_grid() {
        let scenarios = ["S1", "S2", "S3", "S4"];
        let fig = build(&scenarios, &study(&scenarios, &["M1", "M2"], &YEARS)).unwrap();

        assert_eq!((fig.grid.rows, fig.grid.cols), (2, 2));
        assert_eq!(fig.cells.len(), 4);
        assert!(fig.cells.iter().all(|c| matches!(c, GridCell::Scenario(_))));
        assert_eq!(fig.legend_placement, LegendPlacement::RightOfGrid);
        assert_eq!(fig.size, (1000, 800));

        let titles: Vec<&str> = fig.panels().map(|p| p.scenario.as_str()).collect();
        assert_eq!(titles, scenarios);
        let first = fig.panels().next().unwrap();
        assert_eq!(first.model_lines.len(), 2);
        assert_eq!(first.funnel.as_ref().unwrap().years.first(), Some(&2020.0));
        assert_eq!(first.boxes.len(), 3);
        assert_eq!(first.base_years[0].year, 2020.0);

        assert_eq!(fig.title, "my study – Emissions|CO2\nRegion: EU");
        assert_eq!(fig.y_label, "Mt CO2/yr");
        assert_eq!(fig.x_ticks(), vec![2000.0, 2010.0, 2020.0, 2030.0, 2040.0, 2050.0]);

        assert_eq!(fig.model_legend.title, "my study");
        let labels: Vec<&str> = fig.model_legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Historical (EU27)", "M1 (EU27)", "M2 (EU28)"]);
        assert_eq!(fig.model_legend.entries[0].marker, LegendMarker::DashedLine { width: 2 });
        assert_eq!(fig.category_legend.title, "AR6 2050 projections (EU)");
        assert_eq!(fig.category_legend.entries.len(), 3);
    }

    #[test]
    fn odd_count_reserves_a_legend_cell() {
        let scenarios = ["S1", "S2", "S3"];
        let fig = build(&scenarios, &study(&scenarios, &["M1"], &YEARS)).unwrap();
        assert_eq!(fig.cells.len(), 4);
        assert_eq!(fig.cells[3], GridCell::Legends);
        assert_eq!(fig.legend_placement, LegendPlacement::Panel(3));

        let scenarios = ["S1", "S2", "S3", "S4", "S5"];
        let fig = build(&scenarios, &study(&scenarios, &["M1"], &YEARS)).unwrap();
        assert_eq!((fig.grid.rows, fig.grid.cols), (2, 3));
        assert_eq!(fig.cells[5], GridCell::Legends);
        assert_eq!(fig.panels().count(), 5);
    }

    #[test]
    fn even_count_hides_spare_cells() {
        let scenarios = ["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8"];
        let fig = build(&scenarios, &study(&scenarios, &["M1"], &YEARS)).unwrap();
        assert_eq!((fig.grid.rows, fig.grid.cols), (3, 3));
        assert_eq!(fig.cells[8], GridCell::Hidden);
        assert!(!fig.cells.contains(&GridCell::Legends));
    }

    #[test]
    fn no_funnel_when_every_year_is_before_the_start() {
        let scenarios = ["S1", "S2"];
        let early = [2000i64, 2005, 2010, 2015];
        let fig = build(&scenarios, &study(&scenarios, &["M1", "M2"], &early)).unwrap();
        assert!(fig.panels().all(|p| p.funnel.is_none()));
        assert!(fig.panels().all(|p| p.model_lines.len() == 2));
    }

    #[test]
    fn unknown_scenario_gives_an_empty_panel() {
        let data = study(&["S1"], &["M1"], &YEARS);
        let fig = build(&["S1", "nope"], &data).unwrap();
        let empty = fig.panels().nth(1).unwrap();
        assert_eq!(empty.scenario, "nope");
        assert!(empty.model_lines.is_empty());
        assert!(empty.funnel.is_none());
        assert_eq!(empty.historical.len(), 4);
    }

    #[test]
    fn zero_scenarios_is_an_error() {
        let data = study(&["S1"], &["M1"], &YEARS);
        let none: [&str; 0] = [];
        assert!(build(&none, &data).is_err());
    }

    #[test]
    fn missing_unit_column_is_an_error() {
        let data = study(&["S1"], &["M1"], &YEARS).drop("unit").unwrap();
        assert!(build(&["S1"], &data).is_err());
    }

    #[test]
    fn empty_study_is_an_error() {
        let data = study(&["S1"], &["M1"], &YEARS).head(Some(0));
        assert!(build(&["S1"], &data).is_err());
    }

    #[test]
    fn shared_y_range_covers_every_panel() {
        let scenarios = ["S1", "S2"];
        let fig = build(&scenarios, &study(&scenarios, &["M1", "M2"], &YEARS)).unwrap();
        for panel in fig.panels() {
            let (lo, hi) = panel.y_extent().unwrap();
            assert!(fig.y_range.start < lo);
            assert!(fig.y_range.end > hi);
        }
        // historical peaks at 4500, the lowest box whisker sits at 100
        assert!(fig.y_range.end > 4500.0);
        assert!(fig.y_range.start < 100.0);
    }

    #[test]
    fn building_is_deterministic() {
        let scenarios = ["S1", "S2", "S3"];
        let data = study(&scenarios, &["M2", "M1", "M3"], &YEARS);
        assert_eq!(build(&scenarios, &data).unwrap(), build(&scenarios, &data).unwrap());
    }

    #[test]
    fn region_label_collapses_eu_variants() {
        assert_eq!(region_label("EU28").unwrap(), "EU");
        assert_eq!(region_label("World").unwrap(), "World");
    }

    #[test]
    fn renders_both_legend_placements() {
        let dir = tempfile::tempdir().unwrap();
        // odd count: legends in the spare cell; even count: legends right of the grid
        let cases: [(&[&str], &str); 2] = [
            (&["S1", "S2", "S3"], "odd/figure.png"),
            (&["S1", "S2", "S3", "S4"], "even/figure.svg"),
        ];
        for (scenarios, name) in cases {
            let data = study(scenarios, &["M1", "M2"], &YEARS);
            let path = dir.path().join(name);
            iam_intercomparison_figure(
                &historical(),
                &ensemble(),
                &data,
                scenarios,
                &FigureOptions::default(),
                &path,
            )
            .unwrap();
            assert!(path.metadata().unwrap().len() > 0);
        }
    }
}
