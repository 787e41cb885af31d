//! Content type module - the closed set of item categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category an item's text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Songs, albums, now-playing screens
    Music,

    /// Films and TV
    Movie,

    /// Books and audiobooks
    Book,

    /// Memes and social posts
    Meme,

    /// Nothing matched with enough confidence
    Unknown,
}

impl ContentType {
    /// Categories that can win a classification, in tie-break priority order
    pub const RANKED: [ContentType; 4] = [
        ContentType::Music,
        ContentType::Movie,
        ContentType::Book,
        ContentType::Meme,
    ];

    /// Get the content type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Music => "music",
            ContentType::Movie => "movie",
            ContentType::Book => "book",
            ContentType::Meme => "meme",
            ContentType::Unknown => "unknown",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Music => "Music",
            ContentType::Movie => "Movies & TV",
            ContentType::Book => "Books",
            ContentType::Meme => "Memes",
            ContentType::Unknown => "Unsorted",
        }
    }

    /// Whether items of this type need structured metadata extraction
    pub fn requires_extraction(&self) -> bool {
        matches!(
            self,
            ContentType::Music | ContentType::Movie | ContentType::Book
        )
    }

    /// Destination identifier handed to the routing collaborator
    pub fn destination(&self) -> &'static str {
        match self {
            ContentType::Music => "glimpse.music",
            ContentType::Movie => "glimpse.movies",
            ContentType::Book => "glimpse.books",
            ContentType::Meme => "glimpse.memes",
            ContentType::Unknown => "glimpse.unsorted",
        }
    }

    /// Parse an exact lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "music" => Some(ContentType::Music),
            "movie" => Some(ContentType::Movie),
            "book" => Some(ContentType::Book),
            "meme" => Some(ContentType::Meme),
            "unknown" => Some(ContentType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid content type: {}", s))
    }
}
