//! Rule-based sentence segmentation

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::Segmenter;

static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "mt.", "vs.", "etc.", "e.g.",
        "i.e.", "inc.", "ltd.", "co.", "corp.", "jan.", "feb.", "mar.", "apr.", "jun.", "jul.",
        "aug.", "sep.", "sept.", "oct.", "nov.", "dec.", "no.", "u.s.", "u.k.", "approx.",
    ]
    .into_iter()
    .collect()
});

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}' | '\u{201d}' | '\u{2019}')
}

/// Splits on `.`, `!` and `?` followed by whitespace, except after known
/// abbreviations and single-letter initials
#[derive(Debug, Clone, Default)]
pub struct RuleSegmenter;

impl RuleSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Byte offsets just past each sentence-final punctuation run
    fn boundaries(&self, text: &str) -> Vec<usize> {
        let mut boundaries = Vec::new();
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !is_terminal(c) {
                continue;
            }

            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if is_terminal(next) || is_closing(next) {
                    end = j + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let followed_by_space = text[end..].chars().next().map_or(true, char::is_whitespace);
            if followed_by_space && !(c == '.' && self.is_abbreviation(&text[..i + 1])) {
                boundaries.push(end);
            }
        }

        boundaries
    }

    /// Whether the word ending at the final `.` of `prefix` is an abbreviation
    fn is_abbreviation(&self, prefix: &str) -> bool {
        let word = prefix
            .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
            .next()
            .unwrap_or("");
        let lower = word.to_lowercase();

        if ABBREVIATIONS.contains(lower.as_str()) {
            return true;
        }

        // Initials such as "J." in "J. R. R. Tolkien"
        let mut letters = word.chars();
        matches!(
            (letters.next(), letters.next(), letters.next()),
            (Some(l), Some('.'), None) if l.is_uppercase()
        )
    }
}

impl Segmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for end in self.boundaries(text) {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        sentences
    }

    fn ends_sentence(&self, text: &str) -> bool {
        let trimmed = text.trim_end();
        !trimmed.is_empty() && self.boundaries(trimmed).last() == Some(&trimmed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let segmenter = RuleSegmenter::new();
        let sentences = segmenter.segment("The cat sat. Did it purr? Yes!  It did.");
        assert_eq!(
            sentences,
            vec!["The cat sat.", "Did it purr?", "Yes!", "It did."]
        );
    }

    #[test]
    fn test_keeps_abbreviations_and_initials() {
        let segmenter = RuleSegmenter::new();
        let sentences =
            segmenter.segment("Mr. Smith met Dr. Jones in the U.S. yesterday. J. R. R. Tolkien wrote books.");
        assert_eq!(
            sentences,
            vec![
                "Mr. Smith met Dr. Jones in the U.S. yesterday.",
                "J. R. R. Tolkien wrote books."
            ]
        );
    }

    #[test]
    fn test_closing_quotes_stay_with_sentence() {
        let segmenter = RuleSegmenter::new();
        let sentences = segmenter.segment("He said \"stop.\" Then he left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn test_decimals_do_not_split() {
        let segmenter = RuleSegmenter::new();
        assert_eq!(segmenter.segment("It costs 3.5 dollars."), vec!["It costs 3.5 dollars."]);
    }

    #[test]
    fn test_unterminated_tail() {
        let segmenter = RuleSegmenter::new();
        assert_eq!(
            segmenter.segment("One sentence. And a fragment"),
            vec!["One sentence.", "And a fragment"]
        );
        assert!(segmenter.ends_sentence("One sentence.  "));
        assert!(!segmenter.ends_sentence("One sentence. And a fragment"));
        assert!(!segmenter.ends_sentence("Talk to Mr."));
        assert!(!segmenter.ends_sentence(""));
    }
}
