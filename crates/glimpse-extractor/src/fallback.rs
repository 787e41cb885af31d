//! Deterministic pattern-matching extraction
//!
//! Used only when the model refuses the input on safety grounds. Fragments
//! are cleaned of UI noise, then a single-line dash split is tried, then the
//! first two substantial fragments are taken as title and creator.

use crate::error::ExtractionError;
use glimpse_domain::{ContentType, ExtractedMetadata};
use regex::Regex;
use std::sync::LazyLock;

/// Confidence reported for a dash-split line
pub const DASH_SPLIT_CONFIDENCE: f64 = 0.7;

/// Confidence reported for the two-fragment rule
pub const TWO_FRAGMENT_CONFIDENCE: f64 = 0.6;

/// Fragments shorter than this are not considered by the two-fragment rule
pub const MIN_FRAGMENT_CHARS: usize = 3;

/// App names and control labels that appear as whole fragments
const NOISE_FRAGMENTS: &[&str] = &[
    "spotify",
    "apple music",
    "youtube music",
    "soundcloud",
    "now playing",
    "playing from",
    "playing from playlist",
    "shuffle",
    "repeat",
    "lyrics",
    "queue",
    "share",
    "play",
    "pause",
    "next",
    "previous",
    "add to library",
    "netflix",
    "prime video",
    "imdb",
    "letterboxd",
    "watch now",
    "trailer",
    "goodreads",
    "kindle",
    "audible",
    "want to read",
    "read sample",
    "buy now",
    "more",
    "back",
    "done",
];

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\b\d{1,2}:\d{2}(?::\d{2})?\b").unwrap());

static STATUS_BAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d{1,3}\s?%|lte|[345]g|wi-?fi)$").unwrap());

static DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:--|—|–)\s*|\s+-\s+").unwrap());

/// Which deterministic rule produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// `left - right` on a single line
    DashSplit,
    /// First two substantial fragments
    TwoFragments,
}

impl FallbackStrategy {
    /// Confidence reported for results of this rule
    pub fn confidence(&self) -> f64 {
        match self {
            FallbackStrategy::DashSplit => DASH_SPLIT_CONFIDENCE,
            FallbackStrategy::TwoFragments => TWO_FRAGMENT_CONFIDENCE,
        }
    }
}

/// Remove timestamps, status-bar items and UI-noise fragments
pub fn strip_noise<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let without_time = TIMESTAMP.replace_all(line.as_ref(), "");
            let cleaned = without_time
                .trim_matches(|c: char| c.is_whitespace() || "/|•·".contains(c))
                .to_string();

            let lowered = cleaned.to_lowercase();
            let is_noise = cleaned.is_empty()
                || STATUS_BAR.is_match(&cleaned)
                || NOISE_FRAGMENTS.contains(&lowered.as_str());
            (!is_noise).then_some(cleaned)
        })
        .collect()
}

/// Split a line on the first dash separator (`-`, `--`, `–`, `—`)
///
/// A plain hyphen needs whitespace on both sides so hyphenated names stay
/// whole. Pipes are not separators.
pub fn dash_split(line: &str) -> Option<(String, String)> {
    let separator = DASH.find(line)?;
    let left = line[..separator.start()].trim();
    let right = line[separator.end()..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

/// Title and creator from a dash-split line, oriented per content type
///
/// Players show `Artist - Song`; film and book listings show
/// `Title - Director` and `Title - Author`.
fn orient(content_type: ContentType, left: String, right: String) -> (String, String) {
    match content_type {
        ContentType::Music => (right, left),
        _ => (left, right),
    }
}

/// Extract title and creator from cleaned fragments without a model
pub fn extract_by_pattern(
    content_type: ContentType,
    lines: &[String],
) -> Result<(String, String, FallbackStrategy), ExtractionError> {
    if let Some((left, right)) = lines.iter().find_map(|line| dash_split(line)) {
        let (title, creator) = orient(content_type, left, right);
        return Ok((title, creator, FallbackStrategy::DashSplit));
    }

    let mut substantial = lines
        .iter()
        .filter(|line| line.trim().chars().count() >= MIN_FRAGMENT_CHARS);
    match (substantial.next(), substantial.next()) {
        (Some(title), Some(creator)) => Ok((
            title.trim().to_string(),
            creator.trim().to_string(),
            FallbackStrategy::TwoFragments,
        )),
        _ => Err(ExtractionError::TitleNotFound),
    }
}

/// Run the full fallback over reading-order lines
pub fn fallback_extract(
    content_type: ContentType,
    lines: &[String],
) -> Result<(ExtractedMetadata, FallbackStrategy), ExtractionError> {
    let cleaned = strip_noise(lines);
    let (title, creator, strategy) = extract_by_pattern(content_type, &cleaned)?;
    let metadata = ExtractedMetadata::new(title, creator, strategy.confidence(), lines.to_vec());
    Ok((metadata, strategy))
}
