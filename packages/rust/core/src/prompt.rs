//! Prompt assembly: user-turn composition and the replayed history window.

use lexdraft_shared::{KnowledgeSnippet, PromptBundle, Role, StoredTurn, Turn};

/// Render retrieved passages as a knowledge block. Empty when there are none.
pub fn render_snippets(snippets: &[KnowledgeSnippet]) -> String {
    if snippets.is_empty() {
        return String::new();
    }
    let blocks: Vec<String> = snippets
        .iter()
        .map(|s| format!("[Relevance Score: {:.2}]\n{}", s.relevance, s.content))
        .collect();
    format!("Legal Knowledge:\n{}", blocks.join("\n\n"))
}

/// `Context:` + knowledge + `Request:` when there is knowledge, else just `Request:`.
pub fn request_with_context(text: &str, snippets: &[KnowledgeSnippet]) -> String {
    if snippets.is_empty() {
        format!("Request: {text}")
    } else {
        format!("Context:\n{}\n\nRequest: {text}", render_snippets(snippets))
    }
}

/// Builds the [`PromptBundle`] sent to the generator.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    /// Prior turns replayed; 0 means all of them.
    max_history_turns: usize,
}

impl PromptAssembler {
    pub fn new(max_history_turns: usize) -> Self {
        Self { max_history_turns }
    }

    /// The prior turns that will be replayed: the most recent
    /// `max_history_turns`, never starting with an assistant turn.
    pub fn window<'a>(&self, history: &'a [StoredTurn]) -> &'a [StoredTurn] {
        let start = if self.max_history_turns == 0 {
            0
        } else {
            history.len().saturating_sub(self.max_history_turns)
        };
        let recent = &history[start..];
        let first_user = recent
            .iter()
            .position(|t| t.role == Role::User)
            .unwrap_or(recent.len());
        &recent[first_user..]
    }

    /// Prior turns (role and content only) followed by the new user turn.
    pub fn assemble(
        &self,
        system_prompt: String,
        history: &[StoredTurn],
        user_turn: String,
    ) -> PromptBundle {
        let mut turns: Vec<Turn> = self.window(history).iter().map(StoredTurn::to_turn).collect();
        turns.push(Turn::user(user_turn));
        PromptBundle {
            system_prompt,
            turns,
        }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(20)
    }
}
