use std::fs::create_dir_all;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::FontTransform;
use polars::prelude::PolarsResult;
use tracing::{debug, info};

use super::geometry::{clip_x, dash_segments};
use super::layout::{LegendPlacement, GRID_WIDTH_FRACTION};
use super::legend::{Legend, LegendMarker};
use super::palette::{BOX_MEDIAN_COLOR, FUNNEL_COLOR, GUIDE_COLOR, HISTORICAL_COLOR};
use super::panel::{guide_label_y, ScenarioPanel};
use super::{GridCell, IntercomparisonFigure};
use crate::models::polars_err;

// --------------------------------------------------------
//  Constants
// --------------------------------------------------------
const FONT: &str = "sans-serif";
const FONT_SIZE_TITLE: u32 = 17;
const FONT_SIZE_Y_LABEL: u32 = 17;
const FONT_SIZE_PANEL_TITLE: u32 = 13;
const FONT_SIZE_TICKS: u32 = 11;
const FONT_SIZE_GUIDE: u32 = 9;
const FONT_SIZE_LEGEND: u32 = 13;

const TITLE_AREA_PX: u32 = 64;
const TITLE_LINE_PX: i32 = 24;
const Y_LABEL_AREA_PX: u32 = 36;
const PANEL_MARGIN_PX: u32 = 8;
const X_LABEL_AREA_PX: u32 = 45;
const Y_TICK_AREA_PX: u32 = 55;

const LEGEND_TITLE_PX: i32 = 24;
const LEGEND_ROW_PX: i32 = 20;
const LEGEND_KEY_PX: i32 = 28;
const LEGEND_PAD_PX: i32 = 12;

// Line patterns in pixels: "--" at width 2 and ":" at width 1.5.
const DASH_PX: (f64, f64) = (7.4, 3.2);
const DOT_PX: (f64, f64) = (1.5, 2.5);

/// Write `figure` to `path`: SVG for a `.svg` extension, a bitmap otherwise.
pub fn save_figure(figure: &IntercomparisonFigure, path: &Path) -> PolarsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| polars_err(Box::new(e)))?;
    }
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        let root = SVGBackend::new(path, figure.size).into_drawing_area();
        draw_figure(figure, &root)?;
        root.present().map_err(|e| polars_err(Box::new(e)))?;
    } else {
        let root = BitMapBackend::new(path, figure.size).into_drawing_area();
        draw_figure(figure, &root)?;
        root.present().map_err(|e| polars_err(Box::new(e)))?;
    }

    info!("Figure saved to {}", path.display());
    Ok(())
}

/// Draw the whole figure onto `root`, whatever the backend.
pub fn draw_figure<DB: DrawingBackend>(
    figure: &IntercomparisonFigure,
    root: &DrawingArea<DB, Shift>,
) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let (title_area, body) = root.split_vertically(TITLE_AREA_PX);
    draw_title(&title_area, &figure.title)?;

    let (y_label_area, body) = body.split_horizontally(Y_LABEL_AREA_PX);
    draw_y_label(&y_label_area, &figure.y_label)?;

    let grid_area = match figure.legend_placement {
        LegendPlacement::RightOfGrid => {
            let (width, _) = body.dim_in_pixel();
            let grid_width = (width as f64 * GRID_WIDTH_FRACTION).round() as u32;
            let (grid_area, margin) = body.split_horizontally(grid_width);
            draw_legends_in_margin(&margin, figure)?;
            grid_area
        }
        LegendPlacement::Panel(_) => body,
    };

    let areas = grid_area.split_evenly((figure.grid.rows, figure.grid.cols));
    for (index, (cell, area)) in figure.cells.iter().zip(areas.iter()).enumerate() {
        match cell {
            GridCell::Scenario(panel) => {
                let first_column = index % figure.grid.cols == 0;
                draw_panel(area, panel, figure, first_column)?;
            }
            GridCell::Legends => draw_legends_in_panel(area, figure)?,
            GridCell::Hidden => debug!("Cell {} left empty", index),
        }
    }
    Ok(())
}

fn draw_title<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, title: &str) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let (width, _) = area.dim_in_pixel();
    let style = (FONT, FONT_SIZE_TITLE, FontStyle::Bold)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in title.lines().enumerate() {
        area.draw(&Text::new(
            line.trim().to_string(),
            (width as i32 / 2, 8 + i as i32 * TITLE_LINE_PX),
            style.clone(),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;
    }
    Ok(())
}

fn draw_y_label<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, label: &str) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = area.dim_in_pixel();
    let style = TextStyle::from((FONT, FONT_SIZE_Y_LABEL))
        .transform(FontTransform::Rotate270)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        label.to_string(),
        (width as i32 / 2, height as i32 / 2),
        style,
    ))
    .map_err(|e| polars_err(Box::new(e)))?;
    Ok(())
}

fn year_label(year: &f64) -> String {
    format!("{year:.0}")
}

fn no_label(_: &f64) -> String {
    String::new()
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &ScenarioPanel,
    figure: &IntercomparisonFigure,
    first_column: bool,
) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let x_range = figure.x_range.clone();
    let y_range = figure.y_range.clone();

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.scenario, (FONT, FONT_SIZE_PANEL_TITLE))
        .margin(PANEL_MARGIN_PX)
        .x_label_area_size(X_LABEL_AREA_PX)
        .y_label_area_size(if first_column { Y_TICK_AREA_PX } else { 0 })
        .build_cartesian_2d(
            x_range.clone().step(figure.x_tick_step),
            y_range.clone(),
        )
        .map_err(|e| polars_err(Box::new(e)))?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .bold_line_style(GUIDE_COLOR.mix(0.25))
        .light_line_style(TRANSPARENT)
        .x_label_formatter(&year_label)
        .x_label_style(TextStyle::from((FONT, FONT_SIZE_TICKS)).transform(FontTransform::Rotate270))
        .y_label_style((FONT, FONT_SIZE_TICKS));
    if !first_column {
        mesh.y_label_formatter(&no_label);
    }
    mesh.draw().map_err(|e| polars_err(Box::new(e)))?;

    let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
    let scale = (
        plot_w as f64 / (x_range.end - x_range.start),
        plot_h as f64 / (y_range.end - y_range.start),
    );

    // historical reference
    let historical: Vec<Vec<(f64, f64)>> = clip_x(&panel.historical, &x_range)
        .iter()
        .flat_map(|piece| dash_segments(piece, scale, DASH_PX.0, DASH_PX.1))
        .collect();
    chart
        .draw_series(
            historical
                .into_iter()
                .map(|dash| PathElement::new(dash, HISTORICAL_COLOR.stroke_width(2))),
        )
        .map_err(|e| polars_err(Box::new(e)))?;

    // model trajectories
    for line in &panel.model_lines {
        for piece in clip_x(&line.points, &x_range) {
            chart
                .draw_series(LineSeries::new(piece, line.color.mix(0.7).stroke_width(2)))
                .map_err(|e| polars_err(Box::new(e)))?;
        }
    }

    // funnel
    if let Some(funnel) = &panel.funnel {
        if let Some(outline) = funnel.outline(&x_range) {
            chart
                .draw_series(std::iter::once(Polygon::new(outline, FUNNEL_COLOR.mix(0.3).filled())))
                .map_err(|e| polars_err(Box::new(e)))?;
        }
        if let Some(median) = funnel.median_points() {
            for piece in clip_x(&median, &x_range) {
                chart
                    .draw_series(LineSeries::new(piece, GUIDE_COLOR.stroke_width(2)))
                    .map_err(|e| polars_err(Box::new(e)))?;
            }
        }
    }

    // ensemble boxes
    for glyph in &panel.boxes {
        let Some(stats) = glyph.stats else { continue };
        let x = glyph.position;
        let (hw, cw) = (glyph.half_width(), glyph.cap_half_width());
        let corners = [(x - hw, stats.q3), (x + hw, stats.q1)];
        chart
            .draw_series([
                Rectangle::new(corners, glyph.color.mix(0.8).filled()),
                Rectangle::new(corners, BLACK.stroke_width(1)),
            ])
            .map_err(|e| polars_err(Box::new(e)))?;
        chart
            .draw_series([
                PathElement::new(vec![(x, stats.q1), (x, stats.whisker_low)], BLACK.stroke_width(1)),
                PathElement::new(vec![(x, stats.q3), (x, stats.whisker_high)], BLACK.stroke_width(1)),
                PathElement::new(
                    vec![(x - cw, stats.whisker_low), (x + cw, stats.whisker_low)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - cw, stats.whisker_high), (x + cw, stats.whisker_high)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - hw, stats.median), (x + hw, stats.median)],
                    BOX_MEDIAN_COLOR.stroke_width(2),
                ),
            ])
            .map_err(|e| polars_err(Box::new(e)))?;
    }

    // base-year guides
    let label_y = guide_label_y(&y_range);
    for marker in &panel.base_years {
        if !x_range.contains(&marker.year) {
            continue;
        }
        let guide = [(marker.year, y_range.start), (marker.year, y_range.end)];
        chart
            .draw_series(
                dash_segments(&guide, scale, DOT_PX.0, DOT_PX.1)
                    .into_iter()
                    .map(|dot| PathElement::new(dot, GUIDE_COLOR.stroke_width(2))),
            )
            .map_err(|e| polars_err(Box::new(e)))?;
        let style = (FONT, FONT_SIZE_GUIDE)
            .into_font()
            .color(&GUIDE_COLOR)
            .pos(Pos::new(HPos::Right, VPos::Top));
        chart
            .draw_series(std::iter::once(Text::new(
                marker.label.clone(),
                (marker.year, label_y),
                style,
            )))
            .map_err(|e| polars_err(Box::new(e)))?;
    }

    Ok(())
}

fn legend_height(legend: &Legend) -> i32 {
    LEGEND_TITLE_PX + legend.entries.len() as i32 * LEGEND_ROW_PX
}

fn legend_width<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, legend: &Legend) -> PolarsResult<i32>
where
    DB::ErrorType: 'static,
{
    let title_style = TextStyle::from((FONT, FONT_SIZE_LEGEND, FontStyle::Bold));
    let entry_style = TextStyle::from((FONT, FONT_SIZE_LEGEND));
    let (title_w, _) = area
        .estimate_text_size(&legend.title, &title_style)
        .map_err(|e| polars_err(Box::new(e)))?;
    let mut width = title_w as i32;
    for entry in &legend.entries {
        let (w, _) = area
            .estimate_text_size(&entry.label, &entry_style)
            .map_err(|e| polars_err(Box::new(e)))?;
        width = width.max(LEGEND_KEY_PX + LEGEND_PAD_PX / 2 + w as i32);
    }
    Ok(width)
}

/// Draw `legend` with its top-left corner at `origin` (pixels inside `area`).
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    legend: &Legend,
    origin: (i32, i32),
) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let (x, y) = origin;
    area.draw(&Text::new(
        legend.title.clone(),
        (x, y),
        (FONT, FONT_SIZE_LEGEND, FontStyle::Bold).into_font().color(&BLACK),
    ))
    .map_err(|e| polars_err(Box::new(e)))?;

    for (i, entry) in legend.entries.iter().enumerate() {
        let mid = y + LEGEND_TITLE_PX + i as i32 * LEGEND_ROW_PX + LEGEND_ROW_PX / 2;
        match entry.marker {
            LegendMarker::Line { width } => {
                area.draw(&PathElement::new(
                    vec![(x, mid), (x + LEGEND_KEY_PX, mid)],
                    entry.color.stroke_width(width),
                ))
                .map_err(|e| polars_err(Box::new(e)))?;
            }
            LegendMarker::DashedLine { width } => {
                for start in (0..LEGEND_KEY_PX).step_by(11) {
                    let end = (start + 7).min(LEGEND_KEY_PX);
                    area.draw(&PathElement::new(
                        vec![(x + start, mid), (x + end, mid)],
                        entry.color.stroke_width(width),
                    ))
                    .map_err(|e| polars_err(Box::new(e)))?;
                }
            }
            LegendMarker::Swatch => {
                let corners = [(x + 4, mid - 6), (x + LEGEND_KEY_PX - 4, mid + 6)];
                area.draw(&Rectangle::new(corners, entry.color.filled()))
                    .map_err(|e| polars_err(Box::new(e)))?;
                area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))
                    .map_err(|e| polars_err(Box::new(e)))?;
            }
        }
        area.draw(&Text::new(
            entry.label.clone(),
            (x + LEGEND_KEY_PX + LEGEND_PAD_PX / 2, mid),
            (FONT, FONT_SIZE_LEGEND)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;
    }
    Ok(())
}

/// Odd scenario count: the spare cell holds both legends, model legend on top.
fn draw_legends_in_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &IntercomparisonFigure,
) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = area.dim_in_pixel();
    let centred = |w: i32| ((width as i32 - w) / 2).max(0);

    let models = &figure.model_legend;
    let categories = &figure.category_legend;
    let model_x = centred(legend_width(area, models)?);
    draw_legend(area, models, (model_x, LEGEND_PAD_PX))?;

    let category_x = centred(legend_width(area, categories)?);
    let category_y = (height as i32 - LEGEND_PAD_PX - legend_height(categories))
        .max(LEGEND_PAD_PX * 2 + legend_height(models));
    draw_legend(area, categories, (category_x, category_y))
}

/// Even scenario count: both legends to the right of the grid.
fn draw_legends_in_margin<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &IntercomparisonFigure,
) -> PolarsResult<()>
where
    DB::ErrorType: 'static,
{
    let (_, height) = area.dim_in_pixel();
    let models = &figure.model_legend;
    let categories = &figure.category_legend;

    let model_y = ((height as f64 * 0.4) as i32 - legend_height(models) / 2).max(LEGEND_PAD_PX);
    draw_legend(area, models, (LEGEND_PAD_PX, model_y))?;

    let category_y = ((height as f64 * 0.65) as i32 - legend_height(categories) / 2)
        .max(model_y + legend_height(models) + LEGEND_PAD_PX);
    draw_legend(area, categories, (LEGEND_PAD_PX, category_y))
}
