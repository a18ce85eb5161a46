use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::from_reader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use iam_figure::data_handling::ensemble::EnsembleDataset;
use iam_figure::data_handling::historical::HistoricalDataset;
use iam_figure::data_handling::study::StudyDataset;
use iam_figure::helper_functions::project_root;
use iam_figure::models::Dataset;
use iam_figure::{iam_intercomparison_figure, FigureOptions};

/// Render the IAM intercomparison figure from three CSV files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Historical series, already aggregated over the region pair
    #[arg(long)]
    historical: String,

    /// AR6-style ensemble with a `Category` column
    #[arg(long)]
    ensemble: String,

    /// Study scenarios with `study` and `unit` columns
    #[arg(long)]
    study: String,

    /// Scenario to draw; repeat for one panel each, in order
    #[arg(long = "scenario", required = true)]
    scenarios: Vec<String>,

    #[arg(long, num_args = 2, value_names = ["REGION", "REGION"])]
    region: Option<Vec<String>>,

    #[arg(long, num_args = 3, value_names = ["CAT", "CAT", "CAT"])]
    category: Option<Vec<String>>,

    /// JSON file with `FigureOptions`
    #[arg(long)]
    options: Option<PathBuf>,

    /// Defaults to `figures/iam_intercomparison.png` under the project root
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_options(args: &Args) -> anyhow::Result<FigureOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening options file {}", path.display()))?;
            from_reader(file).with_context(|| format!("parsing options file {}", path.display()))?
        }
        None => FigureOptions::default(),
    };
    if let Some([a, b]) = args.region.as_deref() {
        options.region_list = [a.clone(), b.clone()];
    }
    if let Some([c1, c2, c3]) = args.category.as_deref() {
        options.box_cats = [c1.clone(), c2.clone(), c3.clone()];
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting the IAM intercomparison figure");

    let options = load_options(&args)?;

    let historical = HistoricalDataset { path: args.historical.clone() }
        .load()
        .context("loading historical data")?;
    let ensemble = EnsembleDataset { path: args.ensemble.clone() }
        .load()
        .context("loading ensemble data")?;
    let study = StudyDataset { path: args.study.clone() }
        .load()
        .context("loading study data")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| project_root().join("figures").join("iam_intercomparison.png"));

    iam_intercomparison_figure(&historical, &ensemble, &study, args.scenarios.as_slice(), &options, &output)
        .context("rendering the intercomparison figure")?;

    info!("Done");
    Ok(())
}
