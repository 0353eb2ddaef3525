//! Conversation orchestration for LexDraft.
//!
//! This crate ties together classification, knowledge retrieval, prompt
//! assembly, generation and persistence into one turn
//! ([`ConversationOrchestrator::handle`]).

pub mod generator;
pub mod orchestrator;
pub mod prompt;
pub mod strategy;
pub mod system_prompts;

pub use generator::{AnthropicGenerator, Generator};
pub use orchestrator::{ConversationOrchestrator, SilentProgress, TurnProgress, TurnStage};
pub use prompt::{PromptAssembler, render_snippets, request_with_context};
pub use strategy::{
    ClassificationStrategy, HeuristicStrategy, Interpretation, TaggedStrategy, strategy_for,
};
