pub mod data_handling;
pub mod figure;
pub mod helper_functions;
pub mod models;

pub use figure::{build_figure, iam_intercomparison_figure, IntercomparisonFigure};
pub use models::FigureOptions;
