//! Part-of-speech lexicon
//!
//! Tags come from, in order: the user lexicon (`word<TAB>TAG` lines), the
//! built-in closed-class lexicon, then suffix rules.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::{ParserError, Result};

static CLOSED_CLASS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: &[(&str, &[&str])] = &[
        (
            "DT",
            &[
                "the", "a", "an", "this", "these", "those", "every", "each", "some", "any", "no",
                "all", "both", "another",
            ],
        ),
        (
            "PRP",
            &[
                "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
                "itself", "himself", "herself", "themselves",
            ],
        ),
        ("PRP$", &["my", "your", "his", "its", "our", "their"]),
        (
            "IN",
            &[
                "in", "on", "at", "of", "for", "with", "by", "from", "into", "onto", "over",
                "under", "about", "after", "before", "since", "because", "although", "though",
                "if", "while", "unless", "through", "during", "without", "within", "between",
                "against", "among", "toward", "towards", "upon", "near", "across", "behind",
                "than", "that", "whether",
            ],
        ),
        ("TO", &["to"]),
        ("CC", &["and", "or", "but", "nor", "yet"]),
        (
            "MD",
            &["will", "would", "can", "could", "shall", "should", "may", "might", "must", "ca", "wo"],
        ),
        ("VBZ", &["is", "has", "does", "says"]),
        ("VBP", &["are", "am", "have", "do", "say"]),
        (
            "VBD",
            &[
                "was", "were", "had", "did", "said", "went", "made", "took", "got", "gave",
                "found", "thought", "told", "became", "left", "felt", "brought", "began", "kept",
                "held", "wrote", "stood", "heard", "meant", "met", "ran", "paid", "sat", "spoke",
                "led", "grew", "lost", "fell", "sent", "built", "drew", "broke", "spent", "won",
                "taught", "bought", "caught", "ate", "drove", "flew", "knew", "saw", "sang",
                "threw", "wore", "came", "chose", "rose", "sold", "struck",
            ],
        ),
        ("VB", &["be"]),
        ("VBN", &["been", "done", "gone", "taken", "given", "written", "known", "seen", "born"]),
        ("VBG", &["being", "having", "doing"]),
        (
            "RB",
            &[
                "not", "n't", "never", "very", "also", "often", "always", "just", "still",
                "already", "soon", "too", "here", "there", "now", "then",
            ],
        ),
        (
            "JJ",
            &[
                "good", "bad", "new", "old", "great", "big", "small", "large", "long", "short",
                "high", "low", "young", "happy", "sad", "true", "false", "rich", "poor", "red",
                "green", "blue", "black", "white", "first", "last", "best", "important",
            ],
        ),
        ("WRB", &["when", "where", "how", "why"]),
        ("WP", &["who", "whom", "what"]),
        ("WDT", &["which"]),
        ("POS", &["'s"]),
        (
            "CD",
            &[
                "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
                "hundred", "thousand", "million", "billion",
            ],
        ),
    ];

    groups
        .iter()
        .flat_map(|(tag, words)| words.iter().map(move |w| (*w, *tag)))
        .collect()
});

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical", "ish"];

/// Word-to-tag lexicon
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, String>,
}

impl Lexicon {
    /// Empty user lexicon; tagging falls back to built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a lexicon file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse `word<TAB>TAG` lines; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('\t') {
                Some((word, tag)) if !word.trim().is_empty() && !tag.trim().is_empty() => {
                    entries.insert(word.trim().to_lowercase(), tag.trim().to_string());
                }
                _ => {
                    return Err(ParserError::InvalidLexicon {
                        line: number + 1,
                        content: line.to_string(),
                    })
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tag a token without context
    pub fn tag(&self, word: &str, sentence_initial: bool) -> String {
        let lower = word.to_lowercase();

        if let Some(tag) = self.entries.get(&lower) {
            return tag.clone();
        }
        if let Some(tag) = CLOSED_CLASS.get(lower.as_str()) {
            return tag.to_string();
        }

        suffix_tag(word, &lower, sentence_initial).to_string()
    }
}

fn suffix_tag(word: &str, lower: &str, sentence_initial: bool) -> &'static str {
    let first = match word.chars().next() {
        Some(c) => c,
        None => return "SYM",
    };

    if !first.is_alphanumeric() {
        return punctuation_tag(word);
    }
    if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return "CD";
    }
    if first.is_uppercase() && (!sentence_initial || word.len() > 1 && !lower.ends_with("ly")) {
        return "NNP";
    }
    if lower.ends_with("n't") {
        return "RB";
    }
    if lower.len() > 4 && lower.ends_with("ly") {
        return "RB";
    }
    if lower.len() > 4 && lower.ends_with("ing") {
        return "VBG";
    }
    if lower.len() > 3 && lower.ends_with("ed") {
        return "VBD";
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| lower.len() > s.len() + 2 && lower.ends_with(s)) {
        return "JJ";
    }
    if lower.len() > 2 && lower.ends_with('s') && !lower.ends_with("ss") {
        return "NNS";
    }
    "NN"
}

fn punctuation_tag(word: &str) -> &'static str {
    match word {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "-" | "--" => ":",
        "\"" | "``" | "\u{201c}" => "``",
        "''" | "\u{201d}" => "''",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "$" => "$",
        _ => "SYM",
    }
}
