//! The fixed Z ladder treated as configuration, not discovered data

/// Reference building's 11 floor Z levels (meters)
pub const REFERENCE_FLOOR_LADDER: [f64; 11] = [
    -4.44, -1.56, 2.12, 5.48, 8.20, 13.32, 17.96, 22.12, 26.28, 29.64, 32.36,
];

/// An adjacent (Z_i, Z_{i+1}) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorSpan {
    pub z_bottom: f64,
    pub z_top: f64,
}

impl FloorSpan {
    pub fn height(&self) -> f64 {
        self.z_top - self.z_bottom
    }
}

/// An ordered, fixed sequence of floor Z levels
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FloorLadder {
    levels: Vec<f64>,
}

impl FloorLadder {
    /// Build a ladder from an explicit, ascending list of Z levels
    pub fn new(levels: Vec<f64>) -> Self {
        Self { levels }
    }

    /// The reference building's ladder
    pub fn reference() -> Self {
        Self::new(REFERENCE_FLOOR_LADDER.to_vec())
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Adjacent (Z_i, Z_{i+1}) spans, in ascending order
    pub fn spans(&self) -> Vec<FloorSpan> {
        self.levels
            .windows(2)
            .map(|w| FloorSpan {
                z_bottom: w[0],
                z_top: w[1],
            })
            .collect()
    }

    /// The topmost level (the roof), if the ladder is non-empty
    pub fn topmost(&self) -> Option<f64> {
        self.levels.last().copied()
    }

    /// All levels except the topmost one
    pub fn non_roof_levels(&self) -> &[f64] {
        if self.levels.is_empty() {
            &self.levels
        } else {
            &self.levels[..self.levels.len() - 1]
        }
    }

    /// The span containing `z`, matching within `tolerance`
    pub fn span_containing(&self, z: f64, tolerance: f64) -> Option<FloorSpan> {
        self.spans()
            .into_iter()
            .find(|s| z >= s.z_bottom - tolerance && z <= s.z_top + tolerance)
    }

    /// Nearest level to `z`
    pub fn nearest(&self, z: f64) -> Option<f64> {
        self.levels
            .iter()
            .copied()
            .min_by(|a, b| (a - z).abs().partial_cmp(&(b - z).abs()).unwrap())
    }
}

impl Default for FloorLadder {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_ladder_has_eleven_levels() {
        let ladder = FloorLadder::reference();
        assert_eq!(ladder.levels().len(), 11);
        assert_eq!(ladder.spans().len(), 10);
    }

    #[test]
    fn non_roof_levels_excludes_topmost() {
        let ladder = FloorLadder::reference();
        assert_eq!(ladder.non_roof_levels().len(), 10);
        assert_eq!(ladder.topmost(), Some(32.36));
    }

    #[test]
    fn span_height_is_positive() {
        let ladder = FloorLadder::reference();
        for span in ladder.spans() {
            assert!(span.height() > 2.72 - 1e-9);
        }
    }
}
