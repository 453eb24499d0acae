//! Dependency graph representation
//!
//! A `DependencyGraph` holds the tokens of one sentence and the labelled
//! edges between them. Graphs serialize to a single line so they can be
//! written as an output column and read back as pre-parsed input:
//!
//! ```text
//! det(cat_NN_1_4, The_DT_0_0); nsubj(sat_VBD_2_8, cat_NN_1_4); root(ROOT, sat_VBD_2_8)
//! ```
//!
//! Each token is encoded `text_POS_index_offset`; `ROOT` stands for the
//! artificial root governor.

use std::collections::BTreeMap;

use crate::{ParserError, Result};

const ROOT: &str = "ROOT";
const ENTRY_SEPARATOR: &str = "; ";

/// A token of the sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Position in the sentence, starting at 0
    pub index: usize,
    pub text: String,
    /// Part-of-speech tag (Penn Treebank)
    pub pos: String,
    /// Byte offset into the sentence text
    pub offset: usize,
}

impl Token {
    pub fn new(index: usize, text: impl Into<String>, pos: impl Into<String>, offset: usize) -> Self {
        Self {
            index,
            text: text.into(),
            pos: pos.into(),
            offset,
        }
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_verb(&self) -> bool {
        self.pos.starts_with("VB")
    }

    pub fn is_noun(&self) -> bool {
        self.pos.starts_with("NN") || self.pos == "PRP" || self.pos == "CD"
    }

    fn encode(&self) -> String {
        format!("{}_{}_{}_{}", self.text, self.pos, self.index, self.offset)
    }

    fn decode(encoded: &str) -> Result<Self> {
        let malformed = || ParserError::MalformedGraph(format!("bad token '{}'", encoded));

        let mut fields = encoded.rsplitn(4, '_');
        let offset = fields.next().ok_or_else(malformed)?;
        let index = fields.next().ok_or_else(malformed)?;
        let pos = fields.next().ok_or_else(malformed)?;
        let text = fields.next().ok_or_else(malformed)?;

        if text.is_empty() || pos.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            index: index.parse().map_err(|_| malformed())?,
            text: text.to_string(),
            pos: pos.to_string(),
            offset: offset.parse().map_err(|_| malformed())?,
        })
    }
}

/// A labelled edge from a governor to a dependent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub label: String,
    /// Governor token index; `None` for the root edge
    pub governor: Option<usize>,
    pub dependent: usize,
}

impl Dependency {
    pub fn new(label: impl Into<String>, governor: Option<usize>, dependent: usize) -> Self {
        Self {
            label: label.into(),
            governor,
            dependent,
        }
    }
}

/// Parsed structure of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    text: String,
    tokens: Vec<Token>,
    dependencies: Vec<Dependency>,
}

impl DependencyGraph {
    /// Build a graph; tokens must be sorted by index and offsets must point
    /// into `text`
    pub fn new(text: impl Into<String>, tokens: Vec<Token>, dependencies: Vec<Dependency>) -> Self {
        Self {
            text: text.into(),
            tokens,
            dependencies,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens
            .binary_search_by_key(&index, |t| t.index)
            .ok()
            .map(|i| &self.tokens[i])
    }

    /// Edges leaving `governor`, in graph order
    pub fn dependents(&self, governor: usize) -> impl Iterator<Item = &Dependency> + '_ {
        self.dependencies
            .iter()
            .filter(move |d| d.governor == Some(governor))
    }

    /// The edge pointing at `dependent`, if any
    pub fn incoming(&self, dependent: usize) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.dependent == dependent)
    }

    /// Token attached to the artificial root
    pub fn root(&self) -> Option<usize> {
        self.dependencies
            .iter()
            .find(|d| d.governor.is_none())
            .map(|d| d.dependent)
    }

    /// `head` plus every token reachable from it through edges whose label
    /// satisfies `follow`, sorted by index
    pub fn subtree(&self, head: usize, follow: impl Fn(&str) -> bool) -> Vec<usize> {
        let mut nodes = vec![head];
        let mut frontier = vec![head];

        while let Some(node) = frontier.pop() {
            for dep in self.dependents(node) {
                if follow(&dep.label) && !nodes.contains(&dep.dependent) {
                    nodes.push(dep.dependent);
                    frontier.push(dep.dependent);
                }
            }
        }

        nodes.sort_unstable();
        nodes
    }

    /// Sentence text covering the given tokens, from the first token's start
    /// to the last token's end
    pub fn span_text(&self, indices: &[usize]) -> String {
        let tokens: Vec<&Token> = indices.iter().filter_map(|i| self.token(*i)).collect();
        let start = tokens.iter().map(|t| t.offset).min();
        let end = tokens.iter().map(|t| t.end()).max();

        match (start, end) {
            (Some(start), Some(end)) => self.text.get(start..end).unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    /// Single-line serialization
    pub fn serialize(&self) -> String {
        self.dependencies
            .iter()
            .map(|dep| {
                let governor = match dep.governor.and_then(|g| self.token(g)) {
                    Some(token) => token.encode(),
                    None => ROOT.to_string(),
                };
                let dependent = self
                    .token(dep.dependent)
                    .map(Token::encode)
                    .unwrap_or_default();
                format!("{}({}, {})", dep.label, governor, dependent)
            })
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    /// Rebuild a graph from its serialization. The sentence text is
    /// reconstructed from the token offsets.
    pub fn deserialize(serialized: &str) -> Result<Self> {
        let serialized = serialized.trim();
        if serialized.is_empty() {
            return Err(ParserError::MalformedGraph("empty graph".to_string()));
        }

        let mut tokens: BTreeMap<usize, Token> = BTreeMap::new();
        let mut dependencies = Vec::new();

        for entry in serialized.split(ENTRY_SEPARATOR) {
            let entry = entry.trim();
            let malformed = || ParserError::MalformedGraph(format!("bad entry '{}'", entry));

            let open = entry.find('(').ok_or_else(malformed)?;
            if !entry.ends_with(')') || open == 0 {
                return Err(malformed());
            }
            let label = &entry[..open];
            let inner = &entry[open + 1..entry.len() - 1];
            let (governor, dependent) = inner.split_once(", ").ok_or_else(malformed)?;

            let governor = if governor == ROOT {
                None
            } else {
                let token = Token::decode(governor)?;
                let index = token.index;
                tokens.entry(index).or_insert(token);
                Some(index)
            };

            let dependent = Token::decode(dependent)?;
            let dependent_index = dependent.index;
            tokens.entry(dependent_index).or_insert(dependent);

            dependencies.push(Dependency::new(label, governor, dependent_index));
        }

        // Offsets past the serialized line cannot come from a real sentence
        if let Some(token) = tokens.values().find(|t| t.offset > serialized.len()) {
            return Err(ParserError::MalformedGraph(format!(
                "offset {} of '{}' is out of range",
                token.offset, token.text
            )));
        }

        // Lay the tokens out again so offsets are consistent with the text
        let mut text = String::new();
        let mut tokens: Vec<Token> = tokens.into_values().collect();
        for token in &mut tokens {
            if token.offset > text.len() {
                text.push_str(&" ".repeat(token.offset - text.len()));
            } else if !text.is_empty() && token.offset < text.len() {
                text.push(' ');
            }
            token.offset = text.len();
            text.push_str(&token.text);
        }

        Ok(Self::new(text, tokens, dependencies))
    }
}

impl std::fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.serialize())
    }
}
