//! Outcome module - the persisted per-item result

use crate::{ContentType, ExtractedMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque identifier of an upstream item (photo asset id, file path, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A candidate item supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemHandle {
    /// Stable identifier used by the processed index
    pub id: ItemId,

    /// Where the recognizer can find the image
    pub uri: String,
}

impl ItemHandle {
    /// Create a new handle
    pub fn new(id: impl Into<ItemId>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
        }
    }
}

/// Final status of one processed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Classified (and extracted, when required) and routed
    Success,

    /// Ambiguous; left in place for a human to review
    Flagged,

    /// Hard error while processing
    Failed,
}

impl OutcomeStatus {
    /// Get the status as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Flagged => "flagged",
            OutcomeStatus::Failed => "failed",
        }
    }

    /// Parse a status from its lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(OutcomeStatus::Success),
            "flagged" => Some(OutcomeStatus::Flagged),
            "failed" => Some(OutcomeStatus::Failed),
            _ => None,
        }
    }
}

/// Result of processing a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Item this outcome belongs to
    pub item_id: ItemId,

    /// Final status
    pub status: OutcomeStatus,

    /// Category the item was assigned
    pub content_type: ContentType,

    /// Extracted metadata, when extraction ran and succeeded
    pub metadata: Option<ExtractedMetadata>,

    /// Human readable summary, always set for flagged and failed items
    pub message: String,

    /// Link returned by the metadata lookup collaborator
    pub external_link: Option<String>,

    /// Whether processing the item again could plausibly succeed
    #[serde(default)]
    pub retryable: bool,

    /// Seconds since Unix epoch when the outcome was produced
    pub recorded_at: u64,
}

impl Outcome {
    /// A successful outcome
    pub fn success(
        item_id: ItemId,
        content_type: ContentType,
        metadata: Option<ExtractedMetadata>,
        external_link: Option<String>,
    ) -> Self {
        let message = match &metadata {
            Some(m) => format!("Filed as {}: {} by {}", content_type.display_name(), m.title, m.creator),
            None => format!("Filed as {}", content_type.display_name()),
        };
        Self {
            item_id,
            status: OutcomeStatus::Success,
            content_type,
            metadata,
            message,
            external_link,
            retryable: false,
            recorded_at: current_timestamp(),
        }
    }

    /// A flagged outcome
    pub fn flagged(
        item_id: ItemId,
        content_type: ContentType,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            item_id,
            status: OutcomeStatus::Flagged,
            content_type,
            metadata: None,
            message: message.into(),
            external_link: None,
            retryable,
            recorded_at: current_timestamp(),
        }
    }

    /// A failed outcome
    pub fn failed(
        item_id: ItemId,
        content_type: ContentType,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            item_id,
            status: OutcomeStatus::Failed,
            content_type,
            metadata: None,
            message: message.into(),
            external_link: None,
            retryable,
            recorded_at: current_timestamp(),
        }
    }

    /// Attach metadata to a flagged or failed outcome
    pub fn with_metadata(mut self, metadata: ExtractedMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach an external link
    pub fn with_external_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = Some(link.into());
        self
    }

    /// Whether the outcome should trigger destination routing
    pub fn is_routable(&self) -> bool {
        self.status == OutcomeStatus::Success && self.content_type != ContentType::Unknown
    }
}

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
