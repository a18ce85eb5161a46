use plotters::style::RGBColor;

use crate::helper_functions::quantile_sorted;

/// Box x positions (years) and width in data units, one per category.
pub const BOX_POSITIONS: [f64; 3] = [2052.0, 2054.0, 2056.0];
pub const BOX_WIDTH: f64 = 1.3;
const WHISKER_REACH: f64 = 1.5;

/// Five-number summary of a boxplot with outliers left out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest sample within `1.5 * IQR` below `q1` (or `q1` itself).
    pub whisker_low: f64,
    /// Highest sample within `1.5 * IQR` above `q3` (or `q3` itself).
    pub whisker_high: f64,
}

impl BoxStats {
    /// `None` when there are no finite samples.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        let low_limit = q1 - WHISKER_REACH * iqr;
        let high_limit = q3 + WHISKER_REACH * iqr;
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_limit)
            .filter(|&v| v <= q1)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_limit)
            .filter(|&v| v >= q3)
            .unwrap_or(q3);

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
        })
    }
}

/// One category's box as placed in a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGlyph {
    pub category: String,
    pub position: f64,
    pub width: f64,
    pub color: RGBColor,
    pub sample_count: usize,
    pub stats: Option<BoxStats>,
}

impl BoxGlyph {
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Caps span half the box width.
    pub fn cap_half_width(&self) -> f64 {
        self.width / 4.0
    }
}
