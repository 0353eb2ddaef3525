//! Input validity: does the request look like something a person typed on purpose?
//!
//! The verdict is informational. It is recorded on the classification and
//! logged, but never blocks generation.

/// Greetings that are short but meaningful.
const WHITELISTED_GREETINGS: &[&str] = &["hi", "hey", "hello", "help"];

/// Substrings produced by running a hand along the keyboard.
const KEYBOARD_MASH: &[&str] = &[
    "asdf", "qwer", "zxcv", "hjkl", "uiop", "jkl;", "1234", "7890", "tyui", "bnm", "fghj",
];

/// Shortest normalized text accepted without further evidence.
const MIN_CHARS: usize = 10;

/// Fewest words accepted.
const MIN_WORDS: usize = 2;

/// Vowel ratio below which a letter run is considered random.
const MIN_VOWEL_RATIO: f64 = 0.10;

/// Longest run of one repeated character accepted.
const MAX_REPEAT_RUN: usize = 3;

/// Returns `true` when the request looks like random or mashed input.
pub fn is_nonsensical(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();

    if WHITELISTED_GREETINGS.contains(&normalized.as_str()) {
        return false;
    }

    if normalized.chars().count() < MIN_CHARS {
        return true;
    }

    if normalized.split_whitespace().count() < MIN_WORDS {
        return true;
    }

    if vowel_ratio_too_low(&normalized) {
        return true;
    }

    if longest_repeat_run(&normalized) > MAX_REPEAT_RUN {
        return true;
    }

    KEYBOARD_MASH.iter().any(|p| normalized.contains(p))
}

/// Checks the ratio of vowels among ASCII letters, ignoring short letter runs.
fn vowel_ratio_too_low(normalized: &str) -> bool {
    let letters: Vec<char> = normalized.chars().filter(|c| c.is_ascii_lowercase()).collect();
    if letters.len() <= 5 {
        return false;
    }
    let vowels = letters
        .iter()
        .filter(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .count();
    (vowels as f64 / letters.len() as f64) < MIN_VOWEL_RATIO
}

/// Length of the longest run of one character repeated consecutively.
fn longest_repeat_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if Some(c) == prev {
            current += 1;
        } else {
            current = 1;
            prev = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_mash_is_nonsensical() {
        assert!(is_nonsensical("asdf1234"));
        assert!(is_nonsensical("qwerty"));
        assert!(is_nonsensical("please asdf this for me now"));
    }

    #[test]
    fn whitelisted_greeting_is_sensible() {
        assert!(!is_nonsensical("hello"));
        assert!(!is_nonsensical("  Hi  "));
        assert!(!is_nonsensical("help"));
    }

    #[test]
    fn short_text_is_nonsensical() {
        assert!(is_nonsensical("ok then"));
        assert!(is_nonsensical(""));
    }

    #[test]
    fn single_long_word_is_nonsensical() {
        assert!(is_nonsensical("supercalifragilistic"));
    }

    #[test]
    fn consonant_soup_is_nonsensical() {
        assert!(is_nonsensical("xkcd prst vbnz qrtp"));
    }

    #[test]
    fn repeated_characters_are_nonsensical() {
        assert!(is_nonsensical("please help meeee now"));
        // three in a row is fine
        assert!(!is_nonsensical("draft a letter to the committee"));
    }

    #[test]
    fn ordinary_request_is_sensible() {
        assert!(!is_nonsensical(
            "Draft a confidentiality agreement between Acme Corp and Beta LLC"
        ));
        assert!(!is_nonsensical("What is the statute of limitations?"));
    }

    #[test]
    fn longest_repeat_run_counts_runs() {
        assert_eq!(longest_repeat_run(""), 0);
        assert_eq!(longest_repeat_run("abc"), 1);
        assert_eq!(longest_repeat_run("aabbbbc"), 4);
    }
}
