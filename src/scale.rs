/// Where the markers of the price scale sit, in percent of its width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePositions {
    pub min_pos: f64,
    pub max_pos: f64,
    pub predicted_pos: f64,
}

impl ScalePositions {
    /// False when the predicted price lies outside `[low, high]`.
    pub fn is_within_scale(&self) -> bool {
        self.predicted_pos >= self.min_pos && self.predicted_pos <= self.max_pos
    }
}

/// Maps a price range onto a 0-100 scale. A zero-width range centers the
/// prediction. Out-of-range predictions are not clamped.
pub fn compute_positions(low: u64, high: u64, predicted: u64) -> ScalePositions {
    let predicted_pos = if high > low {
        (predicted as f64 - low as f64) / (high - low) as f64 * 100.0
    } else {
        50.0
    };
    ScalePositions {
        min_pos: 0.0,
        max_pos: 100.0,
        predicted_pos,
    }
}
