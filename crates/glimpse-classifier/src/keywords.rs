//! Deterministic keyword scoring
//!
//! Each category owns a fixed keyword list. The score of a category is the
//! number of its keywords that occur as substrings of the lower-cased,
//! space-joined observation text. The highest score wins in the fixed priority
//! order music, movie, book, meme; a tie keeps the earlier category.

use glimpse_domain::{ContentType, TextObservation};

const MUSIC_KEYWORDS: &[&str] = &[
    "now playing",
    "spotify",
    "apple music",
    "album",
    "artist",
    "playlist",
    "lyrics",
    "shuffle",
    "repeat",
    "song",
    "soundcloud",
    "track",
    "listen",
];

const MOVIE_KEYWORDS: &[&str] = &[
    "imdb",
    "netflix",
    "trailer",
    "director",
    "cast",
    "runtime",
    "rotten tomatoes",
    "letterboxd",
    "season",
    "episode",
    "watch now",
    "hbo",
    "prime video",
    "disney+",
    "starring",
];

const BOOK_KEYWORDS: &[&str] = &[
    "goodreads",
    "author",
    "chapter",
    "isbn",
    "kindle",
    "pages",
    "paperback",
    "hardcover",
    "audible",
    "novel",
    "publisher",
    "want to read",
];

const MEME_KEYWORDS: &[&str] = &[
    "lol",
    "lmao",
    "meme",
    "reddit",
    "9gag",
    "imgflip",
    "when you",
    "me when",
    "nobody:",
    "funny",
    "retweet",
    "twitter",
];

/// Keyword list for a ranked category; empty for `unknown`
pub fn keywords_for(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::Music => MUSIC_KEYWORDS,
        ContentType::Movie => MOVIE_KEYWORDS,
        ContentType::Book => BOOK_KEYWORDS,
        ContentType::Meme => MEME_KEYWORDS,
        ContentType::Unknown => &[],
    }
}

/// Per-category keyword hit counts, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordScores {
    counts: [usize; 4],
}

impl KeywordScores {
    /// Hit count for a category (always 0 for `unknown`)
    pub fn get(&self, content_type: ContentType) -> usize {
        ContentType::RANKED
            .iter()
            .position(|ranked| *ranked == content_type)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// Strictly highest-scoring category and its count; ties keep the earlier
    /// category in priority order
    pub fn best(&self) -> (ContentType, usize) {
        let mut best = (ContentType::RANKED[0], self.counts[0]);
        for (content_type, count) in ContentType::RANKED.iter().zip(self.counts).skip(1) {
            if count > best.1 {
                best = (*content_type, count);
            }
        }
        best
    }

    /// Iterate `(category, count)` in priority order
    pub fn iter(&self) -> impl Iterator<Item = (ContentType, usize)> + '_ {
        ContentType::RANKED.iter().copied().zip(self.counts)
    }
}

fn combined_text(observations: &[TextObservation]) -> String {
    observations
        .iter()
        .map(|o| o.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count keyword hits for every ranked category
pub fn keyword_scores(observations: &[TextObservation]) -> KeywordScores {
    let text = combined_text(observations);
    let mut counts = [0usize; 4];
    for (slot, content_type) in counts.iter_mut().zip(ContentType::RANKED) {
        *slot = keywords_for(content_type)
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .count();
    }
    KeywordScores { counts }
}

/// Pick the category from keyword scores, or `unknown` below `min_matches`
pub fn verdict(scores: &KeywordScores, min_matches: usize) -> ContentType {
    let (content_type, count) = scores.best();
    if count < min_matches {
        ContentType::Unknown
    } else {
        content_type
    }
}

/// Deterministic classification with a minimum of one keyword hit
pub fn classify(observations: &[TextObservation]) -> ContentType {
    verdict(&keyword_scores(observations), 1)
}
