use futures::stream::{self, StreamExt, TryStreamExt};
use legalassist_common::{AnalysisConfig, LegalAssistError, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::chunking::{segment, Chunk};
use crate::gateway::ModelGateway;
use crate::prompts::PromptBuilder;
use crate::types::GenerationProfiles;

/// Raw document text awaiting analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    char_len: usize,
    source: Option<String>,
}

impl Document {
    /// Document typed or pasted into a message
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            source: None,
        }
    }

    /// Document extracted from an uploaded file
    pub fn from_file(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            source: Some(file_name.into()),
            ..Self::new(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Original file name, when uploaded
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Key information extracted from one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialExtraction {
    pub index: usize,
    pub total: usize,
    pub text: String,
}

/// How the report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Document at or below the single-shot threshold
    SingleShot,
    /// Over the threshold but fit in one window
    SingleChunk,
    /// Map over N chunks, then reduce
    Segmented { chunks: usize },
}

/// Final structured analysis
///
/// `text` is the model's answer to the final-analysis prompt, returned as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub text: String,
    pub mode: AnalysisMode,
}

impl AnalysisReport {
    /// Model calls spent producing this report
    pub fn model_calls(&self) -> usize {
        match self.mode {
            AnalysisMode::SingleShot | AnalysisMode::SingleChunk => 1,
            AnalysisMode::Segmented { chunks } => chunks + 1,
        }
    }
}

/// Document analyzer using a size-gated map-reduce strategy
pub struct DocumentAnalyzer {
    gateway: Arc<dyn ModelGateway>,
    prompts: Arc<PromptBuilder>,
    policy: AnalysisConfig,
    profiles: GenerationProfiles,
}

impl DocumentAnalyzer {
    /// Create new analyzer
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        prompts: Arc<PromptBuilder>,
        policy: AnalysisConfig,
        profiles: GenerationProfiles,
    ) -> Self {
        Self {
            gateway,
            prompts,
            policy,
            profiles,
        }
    }

    pub fn policy(&self) -> &AnalysisConfig {
        &self.policy
    }

    /// Analyze a document into a five-section report
    ///
    /// Any model failure aborts the whole analysis; no partial report is
    /// returned.
    pub async fn analyze(&self, document: &Document) -> Result<AnalysisReport> {
        info!(
            "Starting analysis - Document length: {} chars{}",
            document.len(),
            document
                .source()
                .map(|s| format!(", source: {}", s))
                .unwrap_or_default()
        );

        // Step 1: Short documents go straight to the reduce step
        if document.len() <= self.policy.single_shot_threshold {
            debug!("Document is within single-shot threshold, skipping segmentation");
            let text = self.reduce(document.as_str()).await?;
            return Ok(AnalysisReport {
                text,
                mode: AnalysisMode::SingleShot,
            });
        }

        // Step 2: Segment
        let chunks = segment(
            document.as_str(),
            self.policy.chunk_size,
            self.policy.chunk_overlap,
        );
        info!(
            "Split document into {} chunks (window {}, overlap {})",
            chunks.len(),
            self.policy.chunk_size,
            self.policy.chunk_overlap
        );

        // Step 3: One window is analyzed like a short document
        if let [only] = chunks.as_slice() {
            debug!("Document fits in one window, skipping map step");
            let text = self.reduce(&only.content).await?;
            return Ok(AnalysisReport {
                text,
                mode: AnalysisMode::SingleChunk,
            });
        }

        // Step 4: Map
        let partials = self.analyze_chunks(&chunks).await?;

        // Step 5: Reduce over the partial extractions in chunk order
        let combined = combine_extractions(&partials);
        info!(
            "Combined {} partial extractions - Length: {} chars",
            partials.len(),
            combined.len()
        );

        let text = self.reduce(&combined).await?;

        Ok(AnalysisReport {
            text,
            mode: AnalysisMode::Segmented {
                chunks: chunks.len(),
            },
        })
    }

    /// Map step; results come back in chunk order even when run concurrently
    async fn analyze_chunks(&self, chunks: &[Chunk]) -> Result<Vec<PartialExtraction>> {
        let concurrency = self.policy.chunk_concurrency.max(1);
        debug!("Analyzing {} chunks, {} at a time", chunks.len(), concurrency);

        stream::iter(chunks.iter().map(|chunk| self.analyze_chunk(chunk)))
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// Extract key information from one chunk
    async fn analyze_chunk(&self, chunk: &Chunk) -> Result<PartialExtraction> {
        debug!("Analyzing {} ({} chars)", chunk, chunk.char_len());

        let prompt = self
            .prompts
            .chunk_analysis(&chunk.content, chunk.index, chunk.total)?;

        let text = self
            .gateway
            .generate(&prompt, &self.profiles.chunk_analysis)
            .await
            .map_err(|e| LegalAssistError::analysis(chunk.to_string(), e))?;

        Ok(PartialExtraction {
            index: chunk.index,
            total: chunk.total,
            text,
        })
    }

    /// Reduce step over raw text or combined extractions
    async fn reduce(&self, document_key_info: &str) -> Result<String> {
        let prompt = self.prompts.final_analysis(document_key_info)?;

        self.gateway
            .generate(&prompt, &self.profiles.final_analysis)
            .await
            .map_err(|e| LegalAssistError::analysis("final analysis", e))
    }
}

/// Join partial extractions newline-separated, ordered by chunk index
pub fn combine_extractions(partials: &[PartialExtraction]) -> String {
    let mut ordered: Vec<&PartialExtraction> = partials.iter().collect();
    ordered.sort_by_key(|p| p.index);
    ordered
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
