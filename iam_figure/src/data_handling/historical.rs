use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::read_csv;
use crate::models::Dataset;

/// Historical reference series, already aggregated over the region pair by whoever produced the file.
pub struct HistoricalDataset {
    pub path: String,
}

impl Dataset for HistoricalDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading historical data from {}", &self.path);
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read historical CSV: {}", e);
                return Err(e);
            }
        };
        debug!("Historical: {} rows, {} cols", df.height(), df.width());
        Ok(df)
    }
}
