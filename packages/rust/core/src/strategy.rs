//! Classification strategies.
//!
//! A strategy decides, for one request, whether to retrieve knowledge, which
//! system prompt to use, how the user turn is phrased, and how the generated
//! text is interpreted afterwards.
//!
//! - [`HeuristicStrategy`] classifies with the rule table before generation and
//!   checks the output with the draft detector.
//! - [`TaggedStrategy`] always retrieves, hands the generator one prompt, and
//!   trusts the tag the generator puts in front of its answer.

use std::sync::Arc;

use lexdraft_classifier::{
    IntentClassifier, TagKind, is_response_legal_draft, parse_tagged_response,
};
use lexdraft_shared::{
    Category, Classification, DocumentType, KnowledgeSnippet, StoredTurn, StrategyKind,
};
use tracing::{debug, info};

use crate::prompt::request_with_context;
use crate::system_prompts;

/// What the generated text turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// Text returned to the caller and stored.
    pub content: String,
    pub is_legal_draft: bool,
    /// Present only for drafts.
    pub document_type: Option<String>,
}

/// Per-request routing policy.
pub trait ClassificationStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Classification made before generation.
    fn classify(&self, text: &str, history: &[StoredTurn]) -> Classification;

    fn should_retrieve(&self, classification: &Classification) -> bool;

    fn system_prompt(&self, classification: &Classification) -> String;

    /// The new user turn sent to the generator.
    fn compose_user_turn(
        &self,
        text: &str,
        classification: &Classification,
        snippets: &[KnowledgeSnippet],
    ) -> String;

    fn interpret(&self, raw_text: &str, classification: &Classification) -> Interpretation;
}

/// Strategy for a configured kind.
pub fn strategy_for(kind: StrategyKind) -> Arc<dyn ClassificationStrategy> {
    match kind {
        StrategyKind::Heuristic => Arc::new(HeuristicStrategy::default()),
        StrategyKind::Tagged => Arc::new(TaggedStrategy::default()),
    }
}

// ---------------------------------------------------------------------------
// Heuristic
// ---------------------------------------------------------------------------

/// Rule-based classification before generation.
#[derive(Debug, Default)]
pub struct HeuristicStrategy {
    classifier: IntentClassifier,
}

impl ClassificationStrategy for HeuristicStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Heuristic
    }

    fn classify(&self, text: &str, history: &[StoredTurn]) -> Classification {
        self.classifier.classify_with_history(text, history)
    }

    fn should_retrieve(&self, classification: &Classification) -> bool {
        !matches!(
            classification.category,
            Category::Conversational | Category::GeneralQuestion
        )
    }

    fn system_prompt(&self, classification: &Classification) -> String {
        match classification.category {
            Category::GeneralQuestion => system_prompts::GENERAL_ASSISTANT.to_string(),
            Category::Conversational => system_prompts::LEGAL_CONVERSATIONAL.to_string(),
            Category::VagueDraftRequest => system_prompts::VAGUE_DOCUMENT.to_string(),
            Category::DraftRequest | Category::FollowUp => system_prompts::document_prompt(
                classification
                    .document_type
                    .unwrap_or(DocumentType::General),
            ),
        }
    }

    fn compose_user_turn(
        &self,
        text: &str,
        classification: &Classification,
        snippets: &[KnowledgeSnippet],
    ) -> String {
        match classification.category {
            Category::Conversational | Category::GeneralQuestion => text.to_string(),
            _ => request_with_context(text, snippets),
        }
    }

    fn interpret(&self, raw_text: &str, classification: &Classification) -> Interpretation {
        let is_legal_draft = is_response_legal_draft(raw_text);
        let document_type = is_legal_draft.then(|| {
            classification
                .document_type
                .unwrap_or(DocumentType::General)
                .as_str()
                .to_string()
        });
        Interpretation {
            content: raw_text.to_string(),
            is_legal_draft,
            document_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Tagged
// ---------------------------------------------------------------------------

/// The generator classifies its own output with a leading tag.
#[derive(Debug, Default)]
pub struct TaggedStrategy {
    classifier: IntentClassifier,
}

impl ClassificationStrategy for TaggedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Tagged
    }

    /// Informational only: routing does not depend on it.
    fn classify(&self, text: &str, history: &[StoredTurn]) -> Classification {
        self.classifier.classify_with_history(text, history)
    }

    fn should_retrieve(&self, _classification: &Classification) -> bool {
        true
    }

    fn system_prompt(&self, _classification: &Classification) -> String {
        system_prompts::SELF_TAGGING.to_string()
    }

    fn compose_user_turn(
        &self,
        text: &str,
        _classification: &Classification,
        snippets: &[KnowledgeSnippet],
    ) -> String {
        if snippets.is_empty() {
            text.to_string()
        } else {
            request_with_context(text, snippets)
        }
    }

    fn interpret(&self, raw_text: &str, classification: &Classification) -> Interpretation {
        let parsed = parse_tagged_response(raw_text);
        let reported = parsed.classification(classification.is_valid);
        match parsed.kind {
            TagKind::Missing => info!(
                event = "tag_missing",
                "generator response carried no tag, treating as general"
            ),
            _ => debug!(category = %reported.category, "generator tagged its response"),
        }
        Interpretation {
            is_legal_draft: parsed.is_legal_draft,
            document_type: parsed
                .is_legal_draft
                .then(|| parsed.document_type.clone()),
            content: parsed.content,
        }
    }
}
