//! One extractor per extracting content type

use crate::config::ExtractorConfig;
use crate::extractor::Extractor;
use glimpse_classifier::ClassifierConfig;
use glimpse_domain::traits::LlmProvider;
use glimpse_domain::ContentType;
use std::sync::Arc;

/// The music, movie and book extractors sharing one model provider
pub struct ExtractorSet<L: LlmProvider> {
    music: Extractor<L>,
    movie: Extractor<L>,
    book: Extractor<L>,
}

impl<L> ExtractorSet<L>
where
    L: LlmProvider + 'static,
{
    /// Build the set from per-type configurations
    pub fn new(
        llm_provider: Arc<L>,
        music: ExtractorConfig,
        movie: ExtractorConfig,
        book: ExtractorConfig,
    ) -> Self {
        Self {
            music: Extractor::new(ContentType::Music, Arc::clone(&llm_provider), music),
            movie: Extractor::new(ContentType::Movie, Arc::clone(&llm_provider), movie),
            book: Extractor::new(ContentType::Book, llm_provider, book),
        }
    }

    /// Build the set with each type's default configuration
    pub fn with_defaults(llm_provider: Arc<L>) -> Self {
        Self::new(
            llm_provider,
            ExtractorConfig::for_type(ContentType::Music),
            ExtractorConfig::for_type(ContentType::Movie),
            ExtractorConfig::for_type(ContentType::Book),
        )
    }

    /// Apply the classifier's keyword and spatial thresholds to every gate
    pub fn with_gate_config(self, gate: ClassifierConfig) -> Self {
        Self {
            music: self.music.with_gate_config(gate.clone()),
            movie: self.movie.with_gate_config(gate.clone()),
            book: self.book.with_gate_config(gate),
        }
    }

    /// The music extractor, also tried for unknown items with a player layout
    pub fn music(&self) -> &Extractor<L> {
        &self.music
    }

    /// The extractor for `content_type`, if that type is extracted
    pub fn for_type(&self, content_type: ContentType) -> Option<&Extractor<L>> {
        match content_type {
            ContentType::Music => Some(&self.music),
            ContentType::Movie => Some(&self.movie),
            ContentType::Book => Some(&self.book),
            ContentType::Meme | ContentType::Unknown => None,
        }
    }
}
