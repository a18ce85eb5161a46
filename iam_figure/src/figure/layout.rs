use polars::prelude::{PolarsError, PolarsResult};

// One grid cell is 5 x 4 inches at 100 dpi.
pub const CELL_WIDTH_PX: u32 = 500;
pub const CELL_HEIGHT_PX: u32 = 400;
/// Share of the width left to the grid when the legends move to the right margin.
pub const GRID_WIDTH_FRACTION: f64 = 0.75;

/// What a grid cell is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Scenario(usize),
    Legends,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendPlacement {
    /// Both legends stacked inside the spare cell at this index.
    Panel(usize),
    /// Both legends to the right of the grid, which shrinks to `GRID_WIDTH_FRACTION`.
    RightOfGrid,
}

/// Near-square grid holding one panel per scenario, plus a legend panel when the count is odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub scenario_count: usize,
}

impl GridLayout {
    pub fn for_scenarios(scenario_count: usize) -> PolarsResult<Self> {
        if scenario_count == 0 {
            return Err(PolarsError::ComputeError(
                "at least one scenario is required to lay out the figure".into(),
            ));
        }
        let total = scenario_count + scenario_count % 2;
        let cols = (total as f64).sqrt().ceil() as usize;
        let rows = total.div_ceil(cols);
        Ok(GridLayout {
            rows,
            cols,
            scenario_count,
        })
    }

    pub fn is_even(&self) -> bool {
        self.scenario_count % 2 == 0
    }

    /// Panels in use: scenarios plus the reserved legend panel.
    pub fn total_panels(&self) -> usize {
        self.scenario_count + usize::from(!self.is_even())
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Role of the cell at row-major `index`.
    pub fn role(&self, index: usize) -> CellRole {
        if index < self.scenario_count {
            CellRole::Scenario(index)
        } else if index == self.scenario_count && !self.is_even() {
            CellRole::Legends
        } else {
            CellRole::Hidden
        }
    }

    pub fn roles(&self) -> Vec<CellRole> {
        (0..self.cell_count()).map(|i| self.role(i)).collect()
    }

    pub fn legend_placement(&self) -> LegendPlacement {
        if self.is_even() {
            LegendPlacement::RightOfGrid
        } else {
            LegendPlacement::Panel(self.scenario_count)
        }
    }

    pub fn figure_size(&self) -> (u32, u32) {
        (
            CELL_WIDTH_PX * self.cols as u32,
            CELL_HEIGHT_PX * self.rows as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_scenarios_cannot_be_laid_out() {
        assert!(GridLayout::for_scenarios(0).is_err());
    }

    #[test]
    fn grid_shapes() {
        // (scenarios, rows, cols)
        let cases = [
            (1, 1, 2),
            (2, 1, 2),
            (3, 2, 2),
            (4, 2, 2),
            (5, 2, 3),
            (6, 2, 3),
            (7, 3, 3),
            (9, 3, 4),
        ];
        for (n, rows, cols) in cases {
            let g = GridLayout::for_scenarios(n).unwrap();
            assert_eq!((g.rows, g.cols), (rows, cols), "{n} scenarios");
            assert!(g.cell_count() >= g.total_panels());
        }
    }

    #[test]
    fn even_count_hides_spare_cells_and_legends_go_right() {
        let g = GridLayout::for_scenarios(6).unwrap();
        let roles = g.roles();
        assert_eq!(roles.len(), 6);
        assert!(roles.iter().all(|r| matches!(r, CellRole::Scenario(_))));
        assert_eq!(g.legend_placement(), LegendPlacement::RightOfGrid);

        let g = GridLayout::for_scenarios(2).unwrap();
        assert_eq!(g.roles(), vec![CellRole::Scenario(0), CellRole::Scenario(1)]);
    }

    #[test]
    fn odd_count_reserves_the_next_cell_for_legends() {
        let g = GridLayout::for_scenarios(7).unwrap();
        let roles = g.roles();
        assert_eq!(roles.len(), 9);
        assert_eq!(roles[6], CellRole::Scenario(6));
        assert_eq!(roles[7], CellRole::Legends);
        assert_eq!(roles[8], CellRole::Hidden);
        assert_eq!(g.legend_placement(), LegendPlacement::Panel(7));
        assert_eq!(roles.iter().filter(|r| **r == CellRole::Legends).count(), 1);
    }

    #[test]
    fn size_follows_the_grid() {
        let g = GridLayout::for_scenarios(5).unwrap();
        assert_eq!(g.figure_size(), (1500, 800));
    }
}
