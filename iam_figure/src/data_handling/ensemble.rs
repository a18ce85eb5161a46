use polars::prelude::*;
use tracing::{debug, error, info, warn};

use crate::helper_functions::read_csv;
use crate::models::{Dataset, CATEGORY};

/// AR6-style scenario ensemble with a `Category` classification column.
pub struct EnsembleDataset {
    pub path: String,
}

impl Dataset for EnsembleDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading ensemble data from {}", &self.path);
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read ensemble CSV: {}", e);
                return Err(e);
            }
        };
        debug!("Ensemble: {} rows, {} cols", df.height(), df.width());
        if df.column(CATEGORY).is_err() {
            warn!("Ensemble data has no '{}' column; boxplots will fail", CATEGORY);
        }
        Ok(df)
    }
}
