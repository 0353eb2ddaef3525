//! Parser for self-tagged generator output.
//!
//! Under the tagged strategy the generator prefixes its answer with either
//! `[GENERAL_RESPONSE]` or `[LEGAL_DRAFT][<TYPE>]`. A missing or malformed tag
//! is not an error: the response is treated as general.

use std::sync::LazyLock;

use regex::Regex;

use lexdraft_shared::{Category, Classification, DocumentType};

static DRAFT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\[LEGAL_DRAFT\](?:\[([A-Za-z_]+)\])?\s*").expect("valid regex")
});

static GENERAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\[GENERAL_RESPONSE\]\s*").expect("valid regex"));

/// Which leading tag the response carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    LegalDraft,
    General,
    Missing,
}

/// Outcome of parsing one tagged response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParse {
    pub kind: TagKind,
    pub is_legal_draft: bool,
    /// Lower-cased type token, `general` when absent.
    pub document_type: String,
    /// Response body with the tag removed.
    pub content: String,
}

impl TagParse {
    /// The classification this tag implies.
    pub fn classification(&self, is_valid: bool) -> Classification {
        if self.is_legal_draft {
            let doc_type = self
                .document_type
                .parse::<DocumentType>()
                .unwrap_or(DocumentType::General);
            Classification::new(Category::DraftRequest, Some(doc_type), is_valid)
        } else {
            Classification::new(Category::GeneralQuestion, None, is_valid)
        }
    }
}

/// Parse the leading tag of `text`.
pub fn parse_tagged_response(text: &str) -> TagParse {
    if let Some(caps) = DRAFT_TAG.captures(text) {
        let document_type = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| DocumentType::General.as_str().to_string());
        let tag_len = caps.get(0).map_or(0, |m| m.end());
        return TagParse {
            kind: TagKind::LegalDraft,
            is_legal_draft: true,
            document_type,
            content: text[tag_len..].to_string(),
        };
    }

    let (kind, content) = match GENERAL_TAG.find(text) {
        Some(m) => (TagKind::General, &text[m.end()..]),
        None => (TagKind::Missing, text),
    };
    TagParse {
        kind,
        is_legal_draft: false,
        document_type: DocumentType::General.as_str().to_string(),
        content: content.to_string(),
    }
}

/// Remove a recognized leading tag, leaving anything else untouched.
pub fn strip_tag(text: &str) -> String {
    parse_tagged_response(text).content
}
