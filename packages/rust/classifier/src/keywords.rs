//! Fixed vocabularies used by the request rules.
//!
//! All matching is case-insensitive substring containment against the
//! lower-cased request text, so entries here must be lower case.

use lexdraft_shared::DocumentType;

/// Words that name a legal document, used by the vague-request rule.
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "contract",
    "agreement",
    "draft",
    "document",
    "legal",
    "memo",
    "memorandum",
    "brief",
    "letter",
    "opinion",
    "analysis",
    "complaint",
    "motion",
];

/// Legal vocabulary. A question containing none of these is a general question.
pub const LEGAL_KEYWORDS: &[&str] = &[
    "contract",
    "agreement",
    "law",
    "legal",
    "court",
    "rights",
    "attorney",
    "lawyer",
    "plaintiff",
    "defendant",
    "lawsuit",
    "sue",
    "litigation",
    "judge",
    "statute",
    "regulation",
    "clause",
    "provision",
    "draft",
    "document",
    "memo",
    "memorandum",
    "brief",
    "letter",
    "opinion",
    "analysis",
    "complaint",
    "motion",
];

/// Topics that mark a question as general knowledge.
pub const GENERIC_TOPICS: &[&str] = &[
    "weather",
    "sports",
    "news",
    "history",
    "science",
    "technology",
    "music",
    "movie",
    "film",
    "book",
    "travel",
    "food",
    "recipe",
    "health",
    "exercise",
    "education",
    "language",
    "math",
    "calculation",
    "translate",
    "meaning",
    "definition",
    "explain",
    "difference",
    "compare",
    "best",
    "recommend",
    "suggestion",
    "advice",
    "help",
    "how to",
    "tutorial",
    "guide",
    "instruction",
    "steps",
    "process",
    "procedure",
    "method",
];

/// Document type resolution table, in priority order. The first entry whose
/// keywords intersect the text wins.
pub const DOCUMENT_TYPE_TABLE: &[(DocumentType, &[&str])] = &[
    (
        DocumentType::Contract,
        &["contract", "agreement", "terms", "conditions"],
    ),
    (DocumentType::Memo, &["memo", "memorandum"]),
    (DocumentType::Brief, &["brief"]),
    (DocumentType::Letter, &["letter", "cease and desist"]),
    (DocumentType::Opinion, &["opinion"]),
    (DocumentType::Analysis, &["analysis"]),
    (DocumentType::Complaint, &["complaint", "lawsuit", "petition"]),
    (DocumentType::Motion, &["motion"]),
    (DocumentType::General, &["draft", "document"]),
];

/// Whether `lower` contains any of `keywords`.
pub(crate) fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabularies_are_lower_case() {
        for list in [DOCUMENT_KEYWORDS, LEGAL_KEYWORDS, GENERIC_TOPICS] {
            for word in list {
                assert_eq!(*word, word.to_lowercase());
            }
        }
        for (_, words) in DOCUMENT_TYPE_TABLE {
            for word in *words {
                assert_eq!(*word, word.to_lowercase());
            }
        }
    }

    #[test]
    fn document_type_table_ends_with_general() {
        let (last, _) = DOCUMENT_TYPE_TABLE.last().expect("non-empty table");
        assert_eq!(*last, DocumentType::General);
    }

    #[test]
    fn contains_any_is_substring_based() {
        assert!(contains_any("please draft a sublease", &["lease"]));
        assert!(!contains_any("hello there", &["contract"]));
    }
}
