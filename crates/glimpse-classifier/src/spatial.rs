//! Spatial layout heuristics

use glimpse_domain::TextObservation;

/// Whether the frame looks like a music player: at least `min_fragments`
/// fragments in the upper half with confidence above `confidence_threshold`
pub fn has_music_layout(
    observations: &[TextObservation],
    confidence_threshold: f64,
    min_fragments: usize,
) -> bool {
    observations
        .iter()
        .filter(|o| o.is_upper_half() && o.confidence > confidence_threshold)
        .count()
        >= min_fragments
}
