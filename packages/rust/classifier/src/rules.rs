//! Rule-based request classifier.
//!
//! Rules live in an ordered table of `(name, category, predicate)` entries and
//! are evaluated top to bottom; the first match wins. The last entry always
//! matches, so classification is total.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use lexdraft_shared::{Category, Classification, DocumentType, Role, StoredTurn};

use crate::keywords::{
    DOCUMENT_KEYWORDS, DOCUMENT_TYPE_TABLE, GENERIC_TOPICS, LEGAL_KEYWORDS, contains_any,
};
use crate::validity::is_nonsensical;

/// Requests shorter than this (after trimming) are treated as chatter.
const MIN_SUBSTANTIVE_CHARS: usize = 5;

/// Document requests with fewer words than this are too vague to draft.
const VAGUE_WORD_LIMIT: usize = 8;

static CONVERSATIONAL_OPENERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:hi|hello|hey|greetings|howdy|good morning|good afternoon|good evening|how are you|how's it going|what's up|help|can you help|assist me|thanks|thank you|who are you|what can you do)\b",
    )
    .expect("valid regex")
});

static INTERROGATIVE_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:who|what|when|where|why|how)\s").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Rule input
// ---------------------------------------------------------------------------

/// A request prepared once for every rule.
#[derive(Debug)]
pub struct RuleInput<'a> {
    /// Request text with surrounding whitespace removed.
    pub trimmed: &'a str,
    /// Lower-cased `trimmed`.
    pub lower: String,
    /// Prior turns of the conversation, oldest first.
    pub history: &'a [StoredTurn],
}

impl<'a> RuleInput<'a> {
    pub fn new(text: &'a str, history: &'a [StoredTurn]) -> Self {
        let trimmed = text.trim();
        Self {
            trimmed,
            lower: trimmed.to_lowercase(),
            history,
        }
    }

    fn word_count(&self) -> usize {
        self.trimmed.split_whitespace().count()
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Empty, very short, or an opening pleasantry.
pub fn is_conversational(input: &RuleInput<'_>) -> bool {
    input.trimmed.chars().count() < MIN_SUBSTANTIVE_CHARS
        || CONVERSATIONAL_OPENERS.is_match(input.trimmed)
}

/// A question that is about a generic topic or carries no legal vocabulary.
pub fn is_general_question(input: &RuleInput<'_>) -> bool {
    let is_question = input.trimmed.ends_with('?') || INTERROGATIVE_OPENER.is_match(input.trimmed);
    is_question
        && (contains_any(&input.lower, GENERIC_TOPICS)
            || !contains_any(&input.lower, LEGAL_KEYWORDS))
}

/// The user answering a clarifying question the assistant asked about a
/// document the user has already named.
pub fn is_follow_up(input: &RuleInput<'_>) -> bool {
    let Some(last_assistant) = input
        .history
        .iter()
        .rposition(|t| t.role == Role::Assistant)
    else {
        return false;
    };
    let reply = &input.history[last_assistant];
    if reply.is_legal_draft || !reply.content.contains('?') {
        return false;
    }
    input.history[..last_assistant]
        .iter()
        .filter(|t| t.role == Role::User)
        .any(|t| contains_any(&t.content.to_lowercase(), DOCUMENT_KEYWORDS))
}

/// Names a document but says too little to draft it.
pub fn is_vague_draft_request(input: &RuleInput<'_>) -> bool {
    contains_any(&input.lower, DOCUMENT_KEYWORDS) && input.word_count() < VAGUE_WORD_LIMIT
}

fn always(_: &RuleInput<'_>) -> bool {
    true
}

/// Resolve the document type from the priority table; `general` when nothing matches.
pub fn detect_document_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();
    DOCUMENT_TYPE_TABLE
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(doc_type, _)| *doc_type)
        .unwrap_or(DocumentType::General)
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// One entry of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Rule name for tracing and tests.
    pub name: &'static str,
    /// Category assigned when the predicate matches.
    pub category: Category,
    predicate: fn(&RuleInput<'_>) -> bool,
}

impl Rule {
    pub fn matches(&self, input: &RuleInput<'_>) -> bool {
        (self.predicate)(input)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// Ordered rule table mapping request text (and prior turns) to a category.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<Rule>,
}

impl IntentClassifier {
    /// Create a classifier with the built-in rules in precedence order.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule {
                    name: "conversational",
                    category: Category::Conversational,
                    predicate: is_conversational,
                },
                Rule {
                    name: "general_question",
                    category: Category::GeneralQuestion,
                    predicate: is_general_question,
                },
                Rule {
                    name: "vague_draft_request",
                    category: Category::VagueDraftRequest,
                    predicate: is_vague_draft_request,
                },
                Rule {
                    name: "follow_up",
                    category: Category::FollowUp,
                    predicate: is_follow_up,
                },
                Rule {
                    name: "draft_request",
                    category: Category::DraftRequest,
                    predicate: always,
                },
            ],
        }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify a request that starts a new conversation.
    pub fn classify(&self, text: &str) -> Classification {
        self.classify_with_history(text, &[])
    }

    /// Classify a request in the context of the conversation so far.
    pub fn classify_with_history(&self, text: &str, history: &[StoredTurn]) -> Classification {
        let input = RuleInput::new(text, history);
        let category = self.category_for(&input);

        let document_type = match category {
            Category::FollowUp => Some(follow_up_document_type(text, history)),
            c if c.implies_draft() => Some(detect_document_type(text)),
            _ => None,
        };

        Classification::new(category, document_type, !is_nonsensical(text))
    }

    /// First matching rule's category.
    pub fn category_for(&self, input: &RuleInput<'_>) -> Category {
        for rule in &self.rules {
            if rule.matches(input) {
                trace!(rule = rule.name, "rule matched");
                return rule.category;
            }
        }
        // The table ends with an always-matching rule.
        Category::DraftRequest
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A follow-up names its document type itself, or inherits the most recent
/// specific type from earlier user turns.
fn follow_up_document_type(text: &str, history: &[StoredTurn]) -> DocumentType {
    let own = detect_document_type(text);
    if own != DocumentType::General {
        return own;
    }
    history
        .iter()
        .rev()
        .filter(|t| t.role == Role::User)
        .map(|t| detect_document_type(&t.content))
        .find(|t| *t != DocumentType::General)
        .unwrap_or(DocumentType::General)
}
