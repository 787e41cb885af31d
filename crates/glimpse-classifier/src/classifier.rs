//! Two-tier content classifier

use crate::config::ClassifierConfig;
use crate::error::ClassificationError;
use crate::keywords::{keyword_scores, verdict, KeywordScores};
use crate::parser::parse_classification;
use crate::prompt::{PromptBuilder, RESPONSE_SCHEMA};
use crate::spatial::has_music_layout;
use glimpse_domain::traits::LlmProvider;
use glimpse_domain::{ClassificationResult, ContentType, TextObservation};
use std::fmt;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Why the keyword tier produced the verdict
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The semantic verdict was below the configured minimum confidence
    LowConfidence(f64),
    /// The semantic path failed
    SemanticFailed(ClassificationError),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::LowConfidence(confidence) => {
                write!(f, "semantic confidence {:.2} too low", confidence)
            }
            FallbackReason::SemanticFailed(e) => write!(f, "semantic classification failed: {}", e),
        }
    }
}

/// Which tier produced a classification
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationSource {
    /// The semantic model's verdict was accepted
    Semantic,
    /// The deterministic keyword tier was used
    KeywordFallback {
        /// Why the semantic verdict was not used
        reason: FallbackReason,
    },
}

/// A classification together with the tier that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The verdict
    pub result: ClassificationResult,
    /// Where it came from
    pub source: ClassificationSource,
}

impl Classification {
    /// Whether the keyword tier produced the verdict
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, ClassificationSource::KeywordFallback { .. })
    }
}

/// Accept a semantic verdict, or say why the keyword tier must be used
pub fn accept_semantic(
    semantic: Result<ClassificationResult, ClassificationError>,
    min_confidence: f64,
) -> Result<ClassificationResult, FallbackReason> {
    match semantic {
        Ok(result) if result.confidence() >= min_confidence => Ok(result),
        Ok(result) => Err(FallbackReason::LowConfidence(result.confidence())),
        Err(e) => Err(FallbackReason::SemanticFailed(e)),
    }
}

/// Decides the content category of a screenshot's text
///
/// The semantic model is tried first; low-confidence or failed verdicts fall
/// back to deterministic keyword scoring, which never fails.
pub struct Classifier<L: LlmProvider> {
    llm_provider: Arc<L>,
    config: ClassifierConfig,
}

impl<L> Classifier<L>
where
    L: LlmProvider + 'static,
{
    /// Create a new Classifier
    pub fn new(llm_provider: Arc<L>, config: ClassifierConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Per-category keyword hit counts
    pub fn keyword_scores(&self, observations: &[TextObservation]) -> KeywordScores {
        keyword_scores(observations)
    }

    /// Deterministic classification by keyword scoring
    pub fn classify(&self, observations: &[TextObservation]) -> ContentType {
        verdict(&keyword_scores(observations), self.config.min_keyword_matches)
    }

    /// Deterministic classification with a confidence derived from the score
    pub fn keyword_result(&self, observations: &[TextObservation]) -> ClassificationResult {
        let scores = keyword_scores(observations);
        let content_type = verdict(&scores, self.config.min_keyword_matches);
        if content_type == ContentType::Unknown {
            return ClassificationResult::unknown(format!(
                "no category reached {} keyword match(es)",
                self.config.min_keyword_matches
            ));
        }

        let count = scores.get(content_type);
        let confidence = (self.config.fallback_base_confidence
            + self.config.fallback_confidence_step * count as f64)
            .min(1.0);
        ClassificationResult::new(
            content_type,
            confidence,
            format!("keyword score {} for {}", count, content_type),
        )
    }

    /// Whether the frame has the layout of a music player
    pub fn has_spatial_music_pattern(&self, observations: &[TextObservation]) -> bool {
        has_music_layout(
            observations,
            self.config.spatial_confidence_threshold,
            self.config.spatial_min_fragments,
        )
    }

    /// Classify with the semantic model alone
    pub async fn classify_with_semantic_model(
        &self,
        observations: &[TextObservation],
    ) -> Result<ClassificationResult, ClassificationError> {
        if observations.iter().all(|o| o.text.trim().is_empty()) {
            return Err(ClassificationError::EmptyInput);
        }

        let prompt = PromptBuilder::new(observations).build();
        debug!("Classification prompt length: {} chars", prompt.len());

        let reply = timeout(self.config.model_timeout(), self.call_llm(prompt))
            .await
            .map_err(|_| ClassificationError::Timeout)??;

        parse_classification(&reply)
    }

    /// Classify semantically, falling back to keyword scoring on failure or
    /// low confidence
    pub async fn classify_with_fallback(&self, observations: &[TextObservation]) -> Classification {
        let semantic = self.classify_with_semantic_model(observations).await;

        match accept_semantic(semantic, self.config.min_semantic_confidence) {
            Ok(result) => {
                debug!(
                    "Semantic verdict {} ({:.2})",
                    result.content_type,
                    result.confidence()
                );
                Classification {
                    result,
                    source: ClassificationSource::Semantic,
                }
            }
            Err(reason) => {
                match &reason {
                    FallbackReason::SemanticFailed(e) => warn!("Falling back to keywords: {}", e),
                    FallbackReason::LowConfidence(_) => debug!("Falling back to keywords: {}", reason),
                }
                Classification {
                    result: self.keyword_result(observations),
                    source: ClassificationSource::KeywordFallback { reason },
                }
            }
        }
    }

    async fn call_llm(&self, prompt: String) -> Result<String, ClassificationError> {
        let llm = Arc::clone(&self.llm_provider);

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate_structured(&prompt, RESPONSE_SCHEMA)
                .map_err(ClassificationError::from)
        })
        .await
        .map_err(|e| ClassificationError::Worker(e.to_string()))?
    }
}
