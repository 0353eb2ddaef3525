//! Request classification and response interpretation for LexDraft.
//!
//! Three independent pieces live here:
//! - [`IntentClassifier`]: an ordered rule table mapping a request (and the
//!   conversation so far) to exactly one [`Category`](lexdraft_shared::Category).
//! - [`is_response_legal_draft`]: checks whether generated text is a real draft.
//! - [`parse_tagged_response`]: reads the tag a self-classifying generator puts
//!   in front of its answer.
//!
//! Nothing in this crate performs I/O.

mod draft;
mod keywords;
mod rules;
mod tags;
mod validity;

pub use draft::{DraftAssessment, is_response_legal_draft};
pub use rules::{
    IntentClassifier, Rule, RuleInput, detect_document_type, is_conversational, is_follow_up,
    is_general_question, is_vague_draft_request,
};
pub use tags::{TagKind, TagParse, parse_tagged_response, strip_tag};
pub use validity::is_nonsensical;
