use std::env;
use std::path::PathBuf;

use polars::prelude::*;

/// Root used to resolve default output locations (`PROJECT_ROOT`, else the working directory).
pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// Column values as `f64`, whatever numeric type the reader inferred.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let casted = df.column(name)?.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// `(x, y)` pairs in row order; rows with a null on either side are dropped.
pub fn xy_points(df: &DataFrame, x: &str, y: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let xs = f64_values(df, x)?;
    let ys = f64_values(df, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect())
}

/// First non-null value of a column, or an error naming the empty column.
pub fn first_str(df: &DataFrame, name: &str) -> PolarsResult<String> {
    str_values(df, name)?
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| PolarsError::ComputeError(format!("no values in column '{name}'").into()))
}

/// Expand a bit so data isn't on the border.
pub fn expand_range(min_val: f64, max_val: f64, pct: f64) -> (f64, f64) {
    if (max_val - min_val).abs() < 1e-9 {
        return (min_val - 1.0, max_val + 1.0);
    }
    let pad = (max_val - min_val) * pct;
    (min_val - pad, max_val + pad)
}

/// Linear-interpolated quantile of an ascending slice; `p` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = (n as f64 - 1.0) * p;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 < n {
        Some(sorted[idx] * (1.0 - frac) + sorted[idx + 1] * frac)
    } else {
        Some(sorted[n - 1])
    }
}
