//! Core domain types for LexDraft conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum characters of the first request kept in a conversation title.
pub const TITLE_MAX_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// ConversationId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for conversation identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Generate a new time-sortable conversation identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One incoming user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Free-text user message.
    pub text: String,
    /// Conversation to continue, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

impl Request {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_id: None,
        }
    }

    /// Continue an existing conversation.
    pub fn in_conversation(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What kind of answer a request calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Conversational,
    GeneralQuestion,
    VagueDraftRequest,
    DraftRequest,
    FollowUp,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::GeneralQuestion => "general_question",
            Self::VagueDraftRequest => "vague_draft_request",
            Self::DraftRequest => "draft_request",
            Self::FollowUp => "follow_up",
        }
    }

    /// Whether this category is about producing a document.
    pub fn implies_draft(&self) -> bool {
        matches!(
            self,
            Self::VagueDraftRequest | Self::DraftRequest | Self::FollowUp
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of legal document a draft request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Contract,
    Memo,
    Brief,
    Letter,
    Opinion,
    Analysis,
    Complaint,
    Motion,
    General,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Memo => "memo",
            Self::Brief => "brief",
            Self::Letter => "letter",
            Self::Opinion => "opinion",
            Self::Analysis => "analysis",
            Self::Complaint => "complaint",
            Self::Motion => "motion",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contract" => Ok(Self::Contract),
            "memo" => Ok(Self::Memo),
            "brief" => Ok(Self::Brief),
            "letter" => Ok(Self::Letter),
            "opinion" => Ok(Self::Opinion),
            "analysis" => Ok(Self::Analysis),
            "complaint" => Ok(Self::Complaint),
            "motion" => Ok(Self::Motion),
            "general" => Ok(Self::General),
            other => Err(format!("unknown document type '{other}'")),
        }
    }
}

/// Result of classifying one request. Exactly one category, always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Only present when `category` implies a draft.
    pub document_type: Option<DocumentType>,
    /// Informational: `false` when the input looks nonsensical.
    pub is_valid: bool,
}

impl Classification {
    /// Build a classification, dropping the document type for non-draft categories.
    pub fn new(category: Category, document_type: Option<DocumentType>, is_valid: bool) -> Self {
        let document_type = if category.implies_draft() {
            document_type
        } else {
            None
        };
        Self {
            category,
            document_type,
            is_valid,
        }
    }
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// Where a source document lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceOrigin {
    Local,
    RemoteObjectStore,
}

/// Attribution for a retrieved passage. Equality is `(filename, origin, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub filename: String,
    pub origin: SourceOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SourceDescriptor {
    pub fn local(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            origin: SourceOrigin::Local,
            key: None,
        }
    }

    pub fn remote(filename: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            origin: SourceOrigin::RemoteObjectStore,
            key: Some(key.into()),
        }
    }
}

/// A retrieved passage of domain knowledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    pub content: String,
    /// `1 - distance`, clamped to `[0, 1]`. Informational only.
    pub relevance: f32,
    pub source: SourceDescriptor,
}

// ---------------------------------------------------------------------------
// Prompt and turns
// ---------------------------------------------------------------------------

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A turn as replayed to the generator: role and content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything sent to the generator for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptBundle {
    pub system_prompt: String,
    /// Prior turns followed by the newly composed user turn (always last).
    pub turns: Vec<Turn>,
}

/// Raw generator output, opaque until parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResult {
    pub raw_text: String,
}

/// Final output of one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub content: String,
    pub is_legal_draft: bool,
    pub document_type: Option<String>,
    pub sources: Vec<SourceDescriptor>,
    /// Conversation the turn was recorded in; `None` if recording failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

// ---------------------------------------------------------------------------
// Persisted conversation state
// ---------------------------------------------------------------------------

/// A turn as stored by the persistence collaborator, with its flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub is_legal_draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl StoredTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_legal_draft: false,
            document_type: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        is_legal_draft: bool,
        document_type: Option<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_legal_draft,
            document_type,
        }
    }

    /// Strip the flags, keeping what the generator sees.
    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Read-only view of a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    pub title: String,
    pub turns: Vec<StoredTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry for a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub turn_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Conversation title derived from its first request: at most
/// [`TITLE_MAX_CHARS`] characters, with `...` appended when cut.
pub fn conversation_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
