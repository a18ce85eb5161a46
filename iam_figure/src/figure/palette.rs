use std::collections::BTreeMap;

use plotters::style::RGBColor;

/// Default ten-colour line cycle (tab10).
pub const MODEL_PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Severity ramp for the three ensemble categories, mildest first.
pub const CATEGORY_RAMP: [RGBColor; 3] = [
    RGBColor(255, 204, 204), // #ffcccc
    RGBColor(255, 102, 102), // #ff6666
    RGBColor(204, 0, 0),     // #cc0000
];

pub const HISTORICAL_COLOR: RGBColor = RGBColor(0, 0, 0);
pub const FUNNEL_COLOR: RGBColor = RGBColor(211, 211, 211);
pub const GUIDE_COLOR: RGBColor = RGBColor(128, 128, 128);
pub const BOX_MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Model name -> line colour. Iterates in sorted model order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelColors {
    colors: BTreeMap<String, RGBColor>,
}

impl ModelColors {
    /// Sorts and dedups `models`, then assigns palette entries by index, wrapping around.
    pub fn assign<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = models.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        let colors = names
            .into_iter()
            .enumerate()
            .map(|(i, m)| (m, MODEL_PALETTE[i % MODEL_PALETTE.len()]))
            .collect();
        ModelColors { colors }
    }

    pub fn get(&self, model: &str) -> Option<RGBColor> {
        self.colors.get(model).copied()
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Category name -> box colour, keyed by name so data order never shifts the ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColors {
    colors: Vec<(String, RGBColor)>,
}

impl CategoryColors {
    pub fn new(box_cats: &[String; 3]) -> Self {
        let colors = box_cats
            .iter()
            .cloned()
            .zip(CATEGORY_RAMP)
            .collect();
        CategoryColors { colors }
    }

    /// A category listed twice takes the colour of its last slot.
    pub fn get(&self, category: &str) -> Option<RGBColor> {
        self.colors
            .iter()
            .rev()
            .find(|(c, _)| c == category)
            .map(|(_, color)| *color)
    }
}
