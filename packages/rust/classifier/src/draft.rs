//! Draft detection on generated text.
//!
//! Decides whether a response is an actual legal document or a conversational
//! answer, independent of how the request was classified.

use std::sync::LazyLock;

use regex::Regex;

/// Responses shorter than this are never drafts.
const MIN_DRAFT_CHARS: usize = 200;

/// Title patterns are looked for in this many leading lines.
const TITLE_SEARCH_LINES: usize = 5;

/// This many distinct question patterns mark a response as an interview, not a draft.
const MAX_QUESTION_PATTERNS: usize = 2;

static CONVERSATIONAL_OPENING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:hello|hi\b|hey\b|greetings|good (?:morning|afternoon|evening)|i(?:'m| am) (?:a|your)\b|as (?:a|your|an)\b|how can i (?:help|assist)|i(?:'d| would) be happy to|i understand|thank you|you're welcome|is there anything else)",
    )
    .expect("valid regex")
});

static DOCUMENT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)agreement|contract|memorandum|letter|opinion|brief|motion|complaint|analysis")
        .expect("valid regex")
});

/// Pattern lists counted against a response; each list entry counts once.
struct DraftPatterns {
    structure: Vec<Regex>,
    question: Vec<Regex>,
}

static DRAFT_PATTERNS: LazyLock<DraftPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect()
    };

    DraftPatterns {
        structure: mk(&[
            r"(?i)party [a-z]",
            r"(?i)between.*and",
            r"(?i)hereinafter",
            r"(?i)section \d",
            r"(?i)article \d",
            r"(?i)clause \d",
            r"(?i)paragraph \d",
            r"(?i)whereas",
            r"(?i)witnesseth",
            r"(?i)in witness whereof",
            r"(?i)now, therefore",
            r"(?i)signature",
            r"(?i)signed by",
            r"(?i)dated",
        ]),
        question: mk(&[
            r"(?m)\?\s*$",
            r"(?i)what is",
            r"(?i)what are",
            r"(?i)do you",
            r"(?i)can you",
            r"(?i)would you",
            r"(?i)please provide",
            r"(?i)please answer",
        ]),
    }
});

fn count_matches(patterns: &[Regex], content: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(content)).count()
}

/// Evidence gathered about one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftAssessment {
    pub conversational_opening: bool,
    pub long_enough: bool,
    pub has_title: bool,
    /// Distinct structure indicators present anywhere in the text.
    pub structure_indicators: usize,
    /// Distinct question patterns present anywhere in the text.
    pub question_patterns: usize,
}

impl DraftAssessment {
    pub fn assess(content: &str) -> Self {
        let trimmed = content.trim();
        Self {
            conversational_opening: CONVERSATIONAL_OPENING.is_match(trimmed),
            long_enough: content.chars().count() >= MIN_DRAFT_CHARS,
            has_title: content
                .lines()
                .take(TITLE_SEARCH_LINES)
                .any(|line| DOCUMENT_TITLE.is_match(line)),
            structure_indicators: count_matches(&DRAFT_PATTERNS.structure, content),
            question_patterns: count_matches(&DRAFT_PATTERNS.question, content),
        }
    }

    pub fn is_draft(&self) -> bool {
        !self.conversational_opening
            && self.long_enough
            && self.has_title
            && self.structure_indicators >= 1
            && self.question_patterns < MAX_QUESTION_PATTERNS
    }
}

/// Whether generated text is an actual legal draft.
pub fn is_response_legal_draft(content: &str) -> bool {
    DraftAssessment::assess(content).is_draft()
}
