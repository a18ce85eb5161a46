use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::read_csv;
use crate::models::Dataset;

/// Model runs of the study under comparison, one row per model/scenario/year.
pub struct StudyDataset {
    pub path: String,
}

impl Dataset for StudyDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading study data from {}", &self.path);
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read study CSV: {}", e);
                return Err(e);
            }
        };
        debug!("Study: {} rows, {} cols", df.height(), df.width());
        debug!("df after reading = {:?}", df.head(Some(5)));
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::models::{STUDY, UNIT, YEAR};

    #[test]
    fn loads_headered_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model,scenario,region,variable,year,value,study,unit").unwrap();
        writeln!(file, "M1,S1,EU27,Emissions|CO2,2020,3000.5,my_study,Mt CO2/yr").unwrap();
        writeln!(file, "M1,S1,EU27,Emissions|CO2,2030,2100,my_study,Mt CO2/yr").unwrap();
        file.flush().unwrap();

        let df = StudyDataset {
            path: file.path().to_string_lossy().into_owned(),
        }
        .load()
        .unwrap();

        assert_eq!(df.height(), 2);
        assert!(df.column(YEAR).is_ok());
        assert_eq!(df.column(STUDY).unwrap().str().unwrap().get(0), Some("my_study"));
        assert_eq!(df.column(UNIT).unwrap().str().unwrap().get(1), Some("Mt CO2/yr"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let ds = StudyDataset {
            path: "/definitely/not/here.csv".to_string(),
        };
        assert!(ds.load().is_err());
    }
}
