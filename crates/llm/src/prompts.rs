//! Prompt templates for legal consultation, analysis and template generation

use handlebars::Handlebars;
use legalassist_common::{LegalAssistError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Consultation prompt: answers a free-form legal question
pub const CONSULTATION_TEMPLATE: &str = r#"You are an expert legal assistant. Your task is to answer legal questions clearly, precisely and professionally.
Keep a formal but accessible tone, and cite the relevant laws or regulations whenever possible.

User question: {{query}}

Answer:"#;

/// Chunk analysis prompt: extracts key information from one part of a document
pub const CHUNK_ANALYSIS_TEMPLATE: &str = r#"You are an expert legal analyst. The following text is part {{chunk_num}} of {{total_chunks}} of a larger legal document.

Extract the key information from this part only:
- The document type and purpose, if it can be identified here
- Key provisions or clauses, with a one-line explanation each
- Obligations, rights, deadlines and amounts mentioned
- Anything that could be a legal issue or concern

Be concise and factual. Do not speculate about parts you cannot see.

Document part {{chunk_num}} of {{total_chunks}}:
---
{{document_chunk}}
---

Key information:"#;

/// Final analysis prompt: produces the five-section report
pub const FINAL_ANALYSIS_TEMPLATE: &str = r#"You are an expert legal analyst. Based on the legal document information below, write a complete analysis.

Structure your answer with exactly these five sections, in this order:

1. Document Type and Purpose
2. Key Provisions or Clauses
   - Provision: explanation
3. Potential Legal Issues or Concerns
   - Issue: explanation
4. Plain Language Summary
5. Recommended Actions
   - Recommendation: explanation

Document information:
---
{{document_key_info}}
---

Analysis:"#;

/// Template generation prompt: drafts a reusable legal document
pub const TEMPLATE_GENERATION_TEMPLATE: &str = r#"You are an expert legal drafter. Create a complete, professional template for the following type of legal document: {{document_type}}.

Requirements:
- Use a clear title and numbered sections
- Mark every value the user must fill in with square brackets, for example [PARTY NAME] or [DATE]
- Include the standard clauses expected in this kind of document
- End with a signature block for all parties

Template:"#;

/// The fixed set of prompt templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Consultation,
    ChunkAnalysis,
    FinalAnalysis,
    TemplateGeneration,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Consultation,
        TemplateKind::ChunkAnalysis,
        TemplateKind::FinalAnalysis,
        TemplateKind::TemplateGeneration,
    ];

    /// Registry name
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Consultation => "consultation",
            TemplateKind::ChunkAnalysis => "chunk-analysis",
            TemplateKind::FinalAnalysis => "final-analysis",
            TemplateKind::TemplateGeneration => "template-generation",
        }
    }

    /// Variables that must be supplied to render this template
    pub fn required_variables(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Consultation => &["query"],
            TemplateKind::ChunkAnalysis => &["document_chunk", "chunk_num", "total_chunks"],
            TemplateKind::FinalAnalysis => &["document_key_info"],
            TemplateKind::TemplateGeneration => &["document_type"],
        }
    }

    fn source(&self) -> &'static str {
        match self {
            TemplateKind::Consultation => CONSULTATION_TEMPLATE,
            TemplateKind::ChunkAnalysis => CHUNK_ANALYSIS_TEMPLATE,
            TemplateKind::FinalAnalysis => FINAL_ANALYSIS_TEMPLATE,
            TemplateKind::TemplateGeneration => TEMPLATE_GENERATION_TEMPLATE,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = LegalAssistError;

    fn from_str(s: &str) -> Result<Self> {
        TemplateKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| LegalAssistError::template(format!("unknown template '{}'", s)))
    }
}

/// Named values substituted into a template
#[derive(Debug, Clone, Default)]
pub struct PromptVariables {
    values: BTreeMap<String, String>,
}

impl PromptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    pub fn set(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Renders the fixed prompt templates
///
/// Holds only the compiled templates; rendering has no side effects.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile all templates
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Prompts are plain text; document content must reach the model unchanged
        registry.register_escape_fn(handlebars::no_escape);

        for kind in TemplateKind::ALL {
            registry
                .register_template_string(kind.name(), kind.source())
                .map_err(|e| {
                    LegalAssistError::template(format!("invalid template '{}': {}", kind, e))
                })?;
        }

        Ok(Self { registry })
    }

    /// Render `kind` with `variables`
    pub fn build(&self, kind: TemplateKind, variables: &PromptVariables) -> Result<String> {
        if let Some(missing) = kind
            .required_variables()
            .iter()
            .find(|name| variables.get(name).is_none())
        {
            return Err(LegalAssistError::template(format!(
                "missing variable '{}' for template '{}'",
                missing, kind
            )));
        }

        self.registry
            .render(kind.name(), &variables.values)
            .map_err(|e| LegalAssistError::template(format!("failed to render '{}': {}", kind, e)))
    }

    /// Consultation prompt for a legal question
    pub fn consultation(&self, query: &str) -> Result<String> {
        self.build(
            TemplateKind::Consultation,
            &PromptVariables::new().set("query", query),
        )
    }

    /// Map-step prompt for one chunk
    pub fn chunk_analysis(&self, chunk: &str, chunk_num: usize, total_chunks: usize) -> Result<String> {
        self.build(
            TemplateKind::ChunkAnalysis,
            &PromptVariables::new()
                .set("document_chunk", chunk)
                .set("chunk_num", chunk_num)
                .set("total_chunks", total_chunks),
        )
    }

    /// Reduce-step prompt over raw text or joined partial extractions
    pub fn final_analysis(&self, document_key_info: &str) -> Result<String> {
        self.build(
            TemplateKind::FinalAnalysis,
            &PromptVariables::new().set("document_key_info", document_key_info),
        )
    }

    /// Template generation prompt for a document type
    pub fn template_generation(&self, document_type: &str) -> Result<String> {
        self.build(
            TemplateKind::TemplateGeneration,
            &PromptVariables::new().set("document_type", document_type),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consultation_contains_query() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder
            .consultation("Can my landlord keep my deposit?")
            .unwrap();
        assert!(prompt.contains("User question: Can my landlord keep my deposit?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_chunk_analysis_numbers_parts() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder.chunk_analysis("Section 4. Termination.", 2, 7).unwrap();
        assert!(prompt.contains("part 2 of 7"));
        assert!(prompt.contains("Section 4. Termination."));
    }

    #[test]
    fn test_final_analysis_asks_for_five_sections() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder.final_analysis("key info").unwrap();

        let sections = [
            "1. Document Type and Purpose",
            "2. Key Provisions or Clauses",
            "3. Potential Legal Issues or Concerns",
            "4. Plain Language Summary",
            "5. Recommended Actions",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| prompt.find(s).unwrap_or_else(|| panic!("missing section {}", s)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("key info"));
    }

    #[test]
    fn test_template_generation_contains_type() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder.template_generation("non-disclosure agreement").unwrap();
        assert!(prompt.contains("legal document: non-disclosure agreement."));
    }

    #[test]
    fn test_missing_variable_is_template_error() {
        let builder = PromptBuilder::new().unwrap();
        let vars = PromptVariables::new()
            .set("document_chunk", "text")
            .set("chunk_num", 1);

        let err = builder.build(TemplateKind::ChunkAnalysis, &vars).unwrap_err();
        assert!(matches!(err, LegalAssistError::Template(_)));
        assert!(err.to_string().contains("total_chunks"));
    }

    #[test]
    fn test_document_text_is_not_escaped() {
        let builder = PromptBuilder::new().unwrap();
        let text = "Party <A> & Party \"B\" agree {{not a placeholder}}";
        let prompt = builder.final_analysis(text).unwrap();
        assert!(prompt.contains(text));
    }

    #[test]
    fn test_empty_value_counts_as_present() {
        let builder = PromptBuilder::new().unwrap();
        assert!(builder.consultation("").is_ok());
    }

    #[test]
    fn test_template_kind_round_trip_names() {
        for kind in TemplateKind::ALL {
            assert_eq!(kind.name().parse::<TemplateKind>().unwrap(), kind);
        }
        assert!("contract".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_required_variables() {
        assert_eq!(TemplateKind::Consultation.required_variables(), &["query"]);
        assert_eq!(
            TemplateKind::ChunkAnalysis.required_variables(),
            &["document_chunk", "chunk_num", "total_chunks"]
        );
        assert_eq!(TemplateKind::FinalAnalysis.required_variables(), &["document_key_info"]);
        assert_eq!(TemplateKind::TemplateGeneration.required_variables(), &["document_type"]);
    }
}
