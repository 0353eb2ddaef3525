//! Shared types, error model, and configuration for LexDraft.
//!
//! This crate is the foundation depended on by all other LexDraft crates.
//! It provides:
//! - [`LexDraftError`], the unified error type
//! - Domain types ([`Classification`], [`KnowledgeSnippet`], [`ResponseEnvelope`], ...)
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AssistantConfig, GeneratorConfig, RetrievalConfig, StorageConfig, StrategyKind,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_api_key,
    validate_api_key,
};
pub use error::{LexDraftError, Result};
pub use types::{
    Category, Classification, ConversationId, ConversationSnapshot, ConversationSummary,
    DocumentType, GeneratedResult, KnowledgeSnippet, PromptBundle, Request, ResponseEnvelope,
    Role, SourceDescriptor, SourceOrigin, StoredTurn, TITLE_MAX_CHARS, Turn, conversation_title,
};
