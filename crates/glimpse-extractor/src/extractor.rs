//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::fallback::{fallback_extract, FallbackStrategy};
use crate::parser::parse_extraction;
use crate::prompt::{response_schema, PromptBuilder};
use glimpse_classifier::keywords::verdict;
use glimpse_classifier::{has_music_layout, keyword_scores, ClassifierConfig};
use glimpse_domain::traits::LlmProvider;
use glimpse_domain::{
    sorted_by_reading_order, ClassificationResult, ContentType, ExtractedMetadata, LlmError,
    TextObservation,
};
use glimpse_gatekeeper::Gatekeeper;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Where an extraction result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The semantic model
    Semantic,
    /// The deterministic fallback after a safety refusal
    Fallback(FallbackStrategy),
}

/// Validated metadata together with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The metadata
    pub metadata: ExtractedMetadata,
    /// Which path produced it
    pub source: ExtractionSource,
}

/// Failure of the semantic path
#[derive(Debug, Clone, PartialEq)]
enum SemanticFailure {
    /// The model declined the input on safety grounds
    Refused,
    /// Any other failure, propagated unchanged
    Failed(ExtractionError),
}

impl From<ExtractionError> for SemanticFailure {
    fn from(e: ExtractionError) -> Self {
        SemanticFailure::Failed(e)
    }
}

/// Take the semantic result, or run `fallback` when the model refused
fn after_semantic<F>(
    semantic: Result<ExtractedMetadata, SemanticFailure>,
    fallback: F,
) -> Result<Extraction, ExtractionError>
where
    F: FnOnce() -> Result<(ExtractedMetadata, FallbackStrategy), ExtractionError>,
{
    match semantic {
        Ok(metadata) => Ok(Extraction {
            metadata,
            source: ExtractionSource::Semantic,
        }),
        Err(SemanticFailure::Refused) => {
            let (metadata, strategy) = fallback()?;
            Ok(Extraction {
                metadata,
                source: ExtractionSource::Fallback(strategy),
            })
        }
        Err(SemanticFailure::Failed(e)) => Err(e),
    }
}

/// Reject metadata below the confidence threshold
fn check_confidence(extraction: Extraction, threshold: f64) -> Result<Extraction, ExtractionError> {
    let score = extraction.metadata.confidence_score;
    if score < threshold {
        return Err(ExtractionError::ConfidenceTooLow(score, threshold));
    }
    Ok(extraction)
}

/// Derives validated title/creator metadata for one content type
pub struct Extractor<L: LlmProvider> {
    content_type: ContentType,
    llm_provider: Arc<L>,
    gatekeeper: Gatekeeper,
    config: ExtractorConfig,
    gate: ClassifierConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider + 'static,
{
    /// Create a new Extractor for `content_type`
    pub fn new(content_type: ContentType, llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            content_type,
            llm_provider,
            gatekeeper: Gatekeeper::new(config.validation_config()),
            config,
            gate: ClassifierConfig::default(),
        }
    }

    /// Use these keyword and spatial thresholds for the content-type gate
    pub fn with_gate_config(mut self, gate: ClassifierConfig) -> Self {
        self.gate = gate;
        self
    }

    /// The content type this extractor handles
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract metadata, re-running keyword classification as the gate
    pub async fn extract(
        &self,
        observations: &[TextObservation],
        assumed_type: ContentType,
    ) -> Result<ExtractedMetadata, ExtractionError> {
        let found = verdict(&keyword_scores(observations), self.gate.min_keyword_matches);
        self.check_gate(observations, assumed_type, found)?;
        Ok(self.run(observations).await?.metadata)
    }

    /// Extract metadata, gating on an existing classification
    pub async fn extract_classified(
        &self,
        observations: &[TextObservation],
        assumed_type: ContentType,
        classification: &ClassificationResult,
    ) -> Result<ExtractedMetadata, ExtractionError> {
        Ok(self
            .extract_detailed(observations, assumed_type, classification)
            .await?
            .metadata)
    }

    /// Like [`Extractor::extract_classified`], also reporting which path
    /// produced the metadata
    pub async fn extract_detailed(
        &self,
        observations: &[TextObservation],
        assumed_type: ContentType,
        classification: &ClassificationResult,
    ) -> Result<Extraction, ExtractionError> {
        self.check_gate(observations, assumed_type, classification.content_type)?;
        self.run(observations).await
    }

    fn check_gate(
        &self,
        observations: &[TextObservation],
        assumed_type: ContentType,
        found: ContentType,
    ) -> Result<(), ExtractionError> {
        if assumed_type != self.content_type {
            return Err(ExtractionError::WrongContentType {
                expected: self.content_type,
                found: assumed_type,
            });
        }
        if found == assumed_type {
            return Ok(());
        }
        if assumed_type == ContentType::Music
            && has_music_layout(
                observations,
                self.gate.spatial_confidence_threshold,
                self.gate.spatial_min_fragments,
            )
        {
            debug!("Music layout admits a {} classification", found);
            return Ok(());
        }
        Err(ExtractionError::WrongContentType {
            expected: assumed_type,
            found,
        })
    }

    async fn run(&self, observations: &[TextObservation]) -> Result<Extraction, ExtractionError> {
        let lines: Vec<String> = sorted_by_reading_order(observations)
            .into_iter()
            .map(|o| o.text.clone())
            .collect();

        let semantic = self.semantic_extract(&lines).await;
        let extraction = after_semantic(semantic, || {
            warn!("{} extraction refused by model, using patterns", self.content_type);
            fallback_extract(self.content_type, &lines)
        })?;

        let validation = self.gatekeeper.validate(&extraction.metadata);
        if let Some(reason) = validation.first_reason() {
            return Err(ExtractionError::InvalidExtractionResult(reason.to_string()));
        }

        let extraction = check_confidence(extraction, self.config.confidence_threshold)?;
        info!(
            "Extracted {} '{}' by '{}' ({:?}, {:.2})",
            self.content_type,
            extraction.metadata.title,
            extraction.metadata.creator,
            extraction.source,
            extraction.metadata.confidence_score
        );
        Ok(extraction)
    }

    async fn semantic_extract(&self, lines: &[String]) -> Result<ExtractedMetadata, SemanticFailure> {
        let prompt = PromptBuilder::new(self.content_type, lines.join("\n"))
            .with_max_chars(self.config.max_prompt_chars)
            .build();
        debug!("Extraction prompt length: {} chars", prompt.len());

        let reply = match timeout(self.config.model_timeout(), self.call_llm(prompt)).await {
            Err(_) => return Err(ExtractionError::Timeout.into()),
            Ok(Err(LlmError::SafetyRefusal)) => return Err(SemanticFailure::Refused),
            Ok(Err(e)) => return Err(ExtractionError::from(e).into()),
            Ok(Ok(reply)) => reply,
        };

        Ok(parse_extraction(&reply, self.content_type, lines.to_vec())?)
    }

    async fn call_llm(&self, prompt: String) -> Result<String, LlmError> {
        let llm = Arc::clone(&self.llm_provider);
        let schema = response_schema(self.content_type);

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || llm.generate_structured(&prompt, &schema))
            .await
            .map_err(|e| LlmError::Other(format!("Task join error: {}", e)))?
    }
}
