//! Observation model - the immutable OCR input contract

use serde::{Deserialize, Serialize};

/// Normalized rectangle in `[0, 1]` image space
///
/// The origin is the bottom-left corner of the frame, so a larger `y` means the
/// fragment sits higher on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Vertical center of the box
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// One recognized text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObservation {
    /// Recognized text
    pub text: String,

    /// Recognizer confidence in `[0, 1]`
    pub confidence: f64,

    /// Position of the fragment in the frame
    pub bounding_box: BoundingBox,
}

impl TextObservation {
    /// Create a new observation
    pub fn new(text: impl Into<String>, confidence: f64, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bounding_box,
        }
    }

    /// Whether the fragment lies in the upper half of the frame
    pub fn is_upper_half(&self) -> bool {
        self.bounding_box.mid_y() > 0.5
    }
}

/// Sort observations top-to-bottom (descending vertical center)
///
/// Uses the same `mid_y` as `is_upper_half`, so boxes of different heights
/// order by where their text sits. Ties keep discovery order.
pub fn sorted_by_reading_order(observations: &[TextObservation]) -> Vec<&TextObservation> {
    let mut sorted: Vec<&TextObservation> = observations.iter().collect();
    sorted.sort_by(|a, b| {
        b.bounding_box
            .mid_y()
            .partial_cmp(&a.bounding_box.mid_y())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Join observation texts in on-screen reading order, one per line
pub fn reading_order_text(observations: &[TextObservation]) -> String {
    sorted_by_reading_order(observations)
        .iter()
        .map(|o| o.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
