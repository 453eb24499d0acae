//! Heuristic shallow dependency parser
//!
//! Tokenizes and tags a sentence, splits it into clauses at subordinators
//! and after reporting verbs, then attaches tokens inside each clause with
//! a handful of positional rules:
//! - verb group: auxiliaries, negation and adverbs hang off the main verb
//! - noun phrases: determiners, adjectives, numbers and compounds hang off
//!   the last noun
//! - the noun phrase left of the verb is the subject, the first one right
//!   of it the object
//! - prepositions are collapsed into `prep_<word>` edges
//!
//! Every token ends up with exactly one governor.

use crate::graph::{Dependency, DependencyGraph, Token};
use crate::lexicon::Lexicon;
use crate::{DependencyParser, ParserError, Result};

const SUBORDINATORS: &[&str] = &[
    "if", "because", "although", "though", "when", "while", "unless", "since", "after", "before",
    "whereas",
];

const REPORTING_VERBS: &[&str] = &[
    "said", "says", "say", "told", "tells", "believes", "believe", "believed", "claims", "claimed",
    "claim", "thinks", "think", "thought", "reported", "reports", "announced", "announces",
    "stated", "states", "argued", "argues", "suggests", "suggested", "noted", "notes", "insists",
    "insisted", "confirmed", "denied",
];

const BE_FORMS: &[&str] = &["is", "are", "was", "were", "be", "been", "being", "am", "'s", "'re", "'m"];

const DO_FORMS: &[&str] = &["do", "does", "did"];

const NEGATIONS: &[&str] = &["not", "n't", "never"];

fn is_verbal(pos: &str) -> bool {
    pos.starts_with("VB") || pos == "MD"
}

fn is_nominal(pos: &str) -> bool {
    pos.starts_with("NN") || pos == "PRP" || pos == "CD"
}

fn is_np_tag(pos: &str) -> bool {
    is_nominal(pos) || pos.starts_with("JJ") || matches!(pos, "DT" | "PRP$" | "POS")
}

fn is_punctuation(pos: &str) -> bool {
    !pos.starts_with(|c: char| c.is_ascii_alphabetic())
}

// ============================================================================
// Tokenization
// ============================================================================

/// Split a sentence into `(byte offset, token)` pairs.
///
/// Words keep inner hyphens and apostrophes, numbers keep decimal points and
/// thousands separators, clitics (`'s`, `n't`) become their own tokens and
/// every other non-space character is a token of its own.
pub fn tokenize(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if !c.is_alphanumeric() {
            tokens.push((start, &text[start..start + c.len_utf8()]));
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            let after = text[i + next.len_utf8()..].chars().next();
            let before = text[..i].chars().next_back();
            let joins = next.is_alphanumeric()
                || (matches!(next, '\'' | '-') && after.is_some_and(char::is_alphanumeric))
                || (matches!(next, '.' | ',')
                    && before.is_some_and(|b| b.is_ascii_digit())
                    && after.is_some_and(|a| a.is_ascii_digit()));
            if !joins {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        split_clitics(&text[start..end], start, &mut tokens);
    }

    tokens
}

fn split_clitics<'a>(word: &'a str, offset: usize, tokens: &mut Vec<(usize, &'a str)>) {
    let len = word.len();
    let split = if len > 3 && word.is_char_boundary(len - 3) && word[len - 3..].eq_ignore_ascii_case("n't") {
        Some(len - 3)
    } else {
        word.rfind('\'').filter(|&p| p > 0)
    };

    match split {
        Some(at) => {
            tokens.push((offset, &word[..at]));
            tokens.push((offset + at, &word[at..]));
        }
        None => tokens.push((offset, word)),
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Lexicon-driven heuristic dependency parser
#[derive(Debug, Clone, Default)]
pub struct ShallowParser {
    lexicon: Lexicon,
}

impl ShallowParser {
    /// Parser using the built-in lexicon only
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser consulting `lexicon` before the built-in rules
    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    fn tag(&self, words: &[(usize, &str)]) -> Vec<Token> {
        let mut tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(index, (offset, word))| {
                Token::new(index, *word, self.lexicon.tag(word, index == 0), *offset)
            })
            .collect();

        retag(&mut tokens);
        tokens
    }
}

impl DependencyParser for ShallowParser {
    fn parse(&self, sentence: &str) -> Result<DependencyGraph> {
        let words = tokenize(sentence);
        if words.is_empty() {
            return Err(ParserError::EmptySentence);
        }

        let tokens = self.tag(&words);
        let clauses = split_clauses(&tokens);

        let mut edges = EdgeBuilder::new(tokens.len());
        let heads: Vec<Option<usize>> = clauses
            .iter()
            .map(|clause| attach_clause(&tokens, &clause.tokens, &mut edges))
            .collect();

        let root = clauses
            .iter()
            .zip(&heads)
            .find(|(clause, head)| clause.kind == ClauseKind::Main && head.is_some())
            .and_then(|(_, head)| *head)
            .or_else(|| heads.iter().flatten().next().copied())
            .unwrap_or(0);
        edges.root(root);

        for (clause, head) in clauses.iter().zip(&heads) {
            let head = head.unwrap_or(root);
            match clause.kind {
                ClauseKind::Main => {
                    edges.link("parataxis", root, head);
                }
                ClauseKind::Subordinate { marker } => {
                    edges.link("advcl", root, head);
                    edges.link("mark", head, marker);
                }
                ClauseKind::Reported {
                    verb,
                    complementizer,
                } => {
                    edges.link("ccomp", verb, head);
                    if let Some(that) = complementizer {
                        edges.link("complm", head, that);
                    }
                }
            }
        }

        for index in 0..tokens.len() {
            edges.link("dep", root, index);
        }

        Ok(DependencyGraph::new(sentence, tokens, edges.finish()))
    }
}

/// Fix tags that depend on neighbouring tokens
fn retag(tokens: &mut [Token]) {
    let mut clause_has_verb = false;

    for i in 0..tokens.len() {
        let lower = tokens[i].text.to_lowercase();
        let prev = i
            .checked_sub(1)
            .map(|p| tokens[p].pos.clone())
            .unwrap_or_default();
        let next = tokens.get(i + 1).map(|t| t.pos.clone()).unwrap_or_default();
        let before_noun = next.starts_with("NN") || next.starts_with("JJ");

        match lower.as_str() {
            "that" if before_noun && !is_verbal(&prev) => tokens[i].pos = "DT".to_string(),
            "her" if before_noun => tokens[i].pos = "PRP$".to_string(),
            "'s" if prev == "PRP" => tokens[i].pos = "VBZ".to_string(),
            _ => {}
        }

        // Base form after a modal or do-support, skipping negation
        let governor = (0..i).rev().find(|&p| tokens[p].pos != "RB");
        let after_modal = governor.is_some_and(|p| {
            tokens[p].pos == "MD" || DO_FORMS.contains(&tokens[p].text.to_lowercase().as_str())
        });
        if after_modal && matches!(tokens[i].pos.as_str(), "NN" | "NNS" | "VBP") {
            tokens[i].pos = "VB".to_string();
        }

        // A clause without a verb: "John likes pizza", "They like pizza"
        if !clause_has_verb {
            let pos = tokens[i].pos.as_str();
            if pos == "NNS" && matches!(prev.as_str(), "NN" | "NNP" | "PRP") {
                tokens[i].pos = "VBZ".to_string();
            } else if pos == "NN" && matches!(prev.as_str(), "NNS" | "PRP") {
                tokens[i].pos = "VBP".to_string();
            }
        }

        if is_verbal(&tokens[i].pos) {
            clause_has_verb = true;
        }
        if tokens[i].pos == "," || lower == "that" || SUBORDINATORS.contains(&lower.as_str()) {
            clause_has_verb = false;
        }
    }
}

// ============================================================================
// Clauses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseKind {
    Main,
    Subordinate {
        marker: usize,
    },
    Reported {
        verb: usize,
        complementizer: Option<usize>,
    },
}

#[derive(Debug, Clone)]
struct Clause {
    kind: ClauseKind,
    /// Token indices, without the marker or complementizer
    tokens: Vec<usize>,
}

impl Clause {
    fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
        }
    }

    fn has_verb(&self, tokens: &[Token]) -> bool {
        self.tokens.iter().any(|&i| is_verbal(&tokens[i].pos))
    }

    /// Tokens including the marker or complementizer, in order
    fn all_tokens(&self) -> Vec<usize> {
        let mut all = self.tokens.clone();
        match self.kind {
            ClauseKind::Subordinate { marker } => all.push(marker),
            ClauseKind::Reported {
                complementizer: Some(that),
                ..
            } => all.push(that),
            _ => {}
        }
        all.sort_unstable();
        all
    }
}

fn split_clauses(tokens: &[Token]) -> Vec<Clause> {
    let mut clauses: Vec<Clause> = Vec::new();
    let mut current = Clause::new(ClauseKind::Main);
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let lower = token.text.to_lowercase();

        if SUBORDINATORS.contains(&lower.as_str()) && matches!(token.pos.as_str(), "IN" | "WRB") {
            if !current.tokens.is_empty() || current.kind != ClauseKind::Main {
                clauses.push(current);
            }
            current = Clause::new(ClauseKind::Subordinate { marker: i });
            i += 1;
            continue;
        }

        if token.pos == ","
            && matches!(current.kind, ClauseKind::Subordinate { .. })
            && current.has_verb(tokens)
        {
            current.tokens.push(i);
            clauses.push(std::mem::replace(&mut current, Clause::new(ClauseKind::Main)));
            i += 1;
            continue;
        }

        current.tokens.push(i);

        let opens_report = token.is_verb()
            && REPORTING_VERBS.contains(&lower.as_str())
            && tokens.get(i + 1).is_some_and(|next| !is_punctuation(&next.pos));
        if opens_report {
            let complementizer = tokens
                .get(i + 1)
                .filter(|next| next.text.eq_ignore_ascii_case("that"))
                .map(|_| i + 1);
            clauses.push(std::mem::replace(
                &mut current,
                Clause::new(ClauseKind::Reported {
                    verb: i,
                    complementizer,
                }),
            ));
            i += if complementizer.is_some() { 2 } else { 1 };
            continue;
        }

        i += 1;
    }
    clauses.push(current);

    merge_verbless(clauses, tokens)
}

/// Fold subordinate and reported clauses without a verb ("after lunch",
/// "said nothing") back into the clause before them
fn merge_verbless(clauses: Vec<Clause>, tokens: &[Token]) -> Vec<Clause> {
    let mut merged: Vec<Clause> = Vec::new();

    for clause in clauses {
        if clause.kind == ClauseKind::Main || clause.has_verb(tokens) {
            if clause.kind != ClauseKind::Main || !clause.tokens.is_empty() {
                merged.push(clause);
            }
            continue;
        }

        let all = clause.all_tokens();
        match merged.last_mut() {
            Some(previous) => {
                previous.tokens.extend(all);
                previous.tokens.sort_unstable();
            }
            None => merged.push(Clause {
                kind: ClauseKind::Main,
                tokens: all,
            }),
        }
    }

    merged
}

// ============================================================================
// Attachment
// ============================================================================

struct EdgeBuilder {
    edges: Vec<Dependency>,
    attached: Vec<bool>,
}

impl EdgeBuilder {
    fn new(len: usize) -> Self {
        Self {
            edges: Vec::with_capacity(len),
            attached: vec![false; len],
        }
    }

    /// Attach `dependent` unless it already has a governor
    fn link(&mut self, label: impl Into<String>, governor: usize, dependent: usize) -> bool {
        if governor == dependent || self.attached[dependent] {
            return false;
        }
        self.attached[dependent] = true;
        self.edges
            .push(Dependency::new(label, Some(governor), dependent));
        true
    }

    fn root(&mut self, dependent: usize) {
        self.attached[dependent] = true;
        self.edges.push(Dependency::new("root", None, dependent));
    }

    fn finish(mut self) -> Vec<Dependency> {
        self.edges.sort_by_key(|d| d.dependent);
        self.edges
    }
}

/// Clause positions of the first run of verbs
#[derive(Debug, Clone, Copy)]
struct VerbGroup {
    start: usize,
    end: usize,
    main: usize,
}

/// Clause positions of a noun phrase
#[derive(Debug, Clone, Copy)]
struct Chunk {
    start: usize,
    end: usize,
    head: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    BeforeVerb,
    AfterVerb,
    Verbless,
}

fn find_verb_group(tokens: &[Token], clause: &[usize]) -> Option<VerbGroup> {
    let start = (0..clause.len()).find(|&k| is_verbal(&tokens[clause[k]].pos))?;
    let mut group = VerbGroup {
        start,
        end: start,
        main: start,
    };

    let mut k = start + 1;
    while k < clause.len() {
        let pos = tokens[clause[k]].pos.as_str();
        let verb_follows = clause
            .get(k + 1)
            .is_some_and(|&next| is_verbal(&tokens[next].pos));

        if is_verbal(pos) {
            group.end = k;
            group.main = k;
        } else if !(pos == "RB" && verb_follows) {
            break;
        }
        k += 1;
    }

    Some(group)
}

fn find_chunks(tokens: &[Token], clause: &[usize], group: Option<VerbGroup>) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut start = None;

    for k in 0..=clause.len() {
        let in_group = group.is_some_and(|g| (g.start..=g.end).contains(&k));
        let in_np = k < clause.len() && !in_group && is_np_tag(&tokens[clause[k]].pos);

        match (in_np, start) {
            (true, None) => start = Some(k),
            (false, Some(s)) => {
                let head = (s..k)
                    .rev()
                    .find(|&p| is_nominal(&tokens[clause[p]].pos))
                    .unwrap_or(k - 1);
                chunks.push(Chunk {
                    start: s,
                    end: k - 1,
                    head,
                });
                start = None;
            }
            _ => {}
        }
    }

    chunks
}

fn attach_chunk(tokens: &[Token], clause: &[usize], chunk: Chunk, edges: &mut EdgeBuilder) {
    let head = clause[chunk.head];

    // "the company 's founder": company is the possessor of founder
    let marker = (chunk.start + 1..chunk.head).find(|&k| tokens[clause[k]].pos == "POS");
    let possessor =
        marker.and_then(|m| (chunk.start..m).rev().find(|&k| is_nominal(&tokens[clause[k]].pos)));
    if let (Some(m), Some(owner)) = (marker, possessor) {
        edges.link("poss", head, clause[owner]);
        edges.link("possessive", clause[owner], clause[m]);
    }

    for k in chunk.start..=chunk.end {
        let index = clause[k];
        let governor = match (marker, possessor) {
            (Some(m), Some(owner)) if k < m => clause[owner],
            _ => head,
        };
        let pos = tokens[index].pos.as_str();
        let label = match pos {
            "DT" => "det",
            "PRP$" => "poss",
            "CD" => "num",
            _ if pos.starts_with("JJ") => "amod",
            _ if pos.starts_with("NN") => "nn",
            _ => "dep",
        };
        edges.link(label, governor, index);
    }
}

/// Attach the tokens of one clause and return its head
fn attach_clause(tokens: &[Token], clause: &[usize], edges: &mut EdgeBuilder) -> Option<usize> {
    if clause.is_empty() {
        return None;
    }

    let group = find_verb_group(tokens, clause);
    let chunks = find_chunks(tokens, clause, group);
    let chunk_at = |k: usize| chunks.iter().copied().find(|c| c.start == k);
    let chunk_containing = |k: usize| chunks.iter().copied().find(|c| (c.start..=c.end).contains(&k));
    let lower = |k: usize| tokens[clause[k]].text.to_lowercase();

    let head = match (group, chunks.first()) {
        (Some(g), _) => clause[g.main],
        (None, Some(c)) => clause[c.head],
        (None, None) => clause[0],
    };

    let mut passive = false;
    let mut copula = false;
    if let Some(g) = group {
        let main_lower = lower(g.main);
        copula = BE_FORMS.contains(&main_lower.as_str());

        for k in g.start..=g.end {
            if k == g.main {
                continue;
            }
            let word = lower(k);
            let index = clause[k];
            if is_verbal(&tokens[index].pos) {
                let main_pos = tokens[head].pos.as_str();
                let auxpass = BE_FORMS.contains(&word.as_str()) && matches!(main_pos, "VBN" | "VBD");
                passive |= auxpass;
                edges.link(if auxpass { "auxpass" } else { "aux" }, head, index);
            } else if NEGATIONS.contains(&word.as_str()) {
                edges.link("neg", head, index);
            } else {
                edges.link("advmod", head, index);
            }
        }
    }

    let ranges = match group {
        Some(g) => vec![
            (Side::BeforeVerb, 0..g.start),
            (Side::AfterVerb, g.end + 1..clause.len()),
        ],
        None => vec![(Side::Verbless, 0..clause.len())],
    };

    let mut subject: Option<usize> = None;

    for (side, range) in ranges {
        let mut predicate = head;
        let mut seen_object = false;
        let mut last_head: Option<usize> = None;
        let mut pending_cc: Option<usize> = None;
        let mut k = range.start;

        while k < range.end {
            let index = clause[k];
            let pos = tokens[index].pos.as_str();

            if let Some(chunk) = chunk_at(k) {
                attach_chunk(tokens, clause, chunk, edges);
                let np = clause[chunk.head];

                if let (Some(cc), Some(previous)) = (pending_cc, last_head) {
                    edges.link("conj", previous, np);
                    edges.link("cc", previous, cc);
                    pending_cc = None;
                } else {
                    match side {
                        Side::BeforeVerb => {
                            if let Some(old) = subject.replace(np) {
                                edges.link("dep", head, old);
                            }
                        }
                        Side::AfterVerb if !seen_object => {
                            seen_object = true;
                            let label = match (copula, tokens[np].pos.starts_with("JJ")) {
                                (true, true) => "acomp",
                                (true, false) => "attr",
                                (false, _) => "dobj",
                            };
                            edges.link(label, predicate, np);
                        }
                        _ => {
                            edges.link("dep", predicate, np);
                        }
                    }
                }

                last_head = Some(np);
                k = chunk.end + 1;
                continue;
            }

            match pos {
                "IN" | "TO" => {
                    if let Some(object) = chunk_at(k + 1).filter(|c| c.start < range.end) {
                        attach_chunk(tokens, clause, object, edges);
                        let np = clause[object.head];
                        let governor = match side {
                            Side::BeforeVerb | Side::Verbless => k
                                .checked_sub(1)
                                .and_then(chunk_containing)
                                .map(|c| clause[c.head])
                                .unwrap_or(predicate),
                            Side::AfterVerb => predicate,
                        };
                        edges.link(format!("prep_{}", lower(k)), governor, np);
                        edges.link("case", np, index);
                        last_head = Some(np);
                        k = object.end + 1;
                        continue;
                    }

                    let infinitive = pos == "TO"
                        && k + 1 < range.end
                        && is_verbal(&tokens[clause[k + 1]].pos);
                    if infinitive {
                        let verb = clause[k + 1];
                        edges.link("xcomp", predicate, verb);
                        edges.link("aux", verb, index);
                        predicate = verb;
                        seen_object = false;
                        k += 2;
                        continue;
                    }

                    edges.link("dep", predicate, index);
                }
                "CC" => {
                    let coordinates = k + 1 < range.end
                        && (chunk_at(k + 1).is_some() || is_verbal(&tokens[clause[k + 1]].pos));
                    if coordinates {
                        pending_cc = Some(index);
                    } else {
                        edges.link("cc", predicate, index);
                    }
                }
                "RB" => {
                    let label = if NEGATIONS.contains(&lower(k).as_str()) {
                        "neg"
                    } else {
                        "advmod"
                    };
                    edges.link(label, predicate, index);
                }
                _ if is_verbal(pos) => {
                    let label = match pending_cc.take() {
                        Some(cc) => {
                            edges.link("cc", head, cc);
                            "conj"
                        }
                        None => "dep",
                    };
                    edges.link(label, head, index);
                    predicate = index;
                    seen_object = false;
                }
                _ if is_punctuation(pos) => {
                    edges.link("punct", head, index);
                }
                _ => {
                    edges.link("dep", predicate, index);
                }
            }

            k += 1;
        }

        if let Some(cc) = pending_cc {
            edges.link("cc", predicate, cc);
        }
    }

    if let (Some(g), Some(subject)) = (group, subject) {
        let label = if passive { "nsubjpass" } else { "nsubj" };
        edges.link(label, clause[g.main], subject);
    }

    Some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(graph: &DependencyGraph) -> Vec<(String, Option<String>, String)> {
        graph
            .dependencies()
            .iter()
            .map(|d| {
                (
                    d.label.clone(),
                    d.governor.map(|g| graph.token(g).unwrap().text.clone()),
                    graph.token(d.dependent).unwrap().text.clone(),
                )
            })
            .collect()
    }

    fn has_edge(graph: &DependencyGraph, label: &str, governor: &str, dependent: &str) -> bool {
        labels(graph).iter().any(|(l, g, d)| {
            l == label && g.as_deref() == Some(governor) && d == dependent
        })
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<&str> = tokenize("Edison's lamp didn't cost $3.50, well-known fact.")
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                "Edison", "'s", "lamp", "did", "n't", "cost", "$", "3.50", ",", "well-known",
                "fact", "."
            ]
        );
    }

    #[test]
    fn test_tokenize_offsets() {
        let text = "The cat sat.";
        let tokens = tokenize(text);
        for (offset, token) in tokens {
            assert_eq!(&text[offset..offset + token.len()], token);
        }
    }

    #[test]
    fn test_empty_sentence() {
        let parser = ShallowParser::new();
        assert!(matches!(parser.parse("   "), Err(ParserError::EmptySentence)));
    }

    #[test]
    fn test_simple_sentence() {
        let parser = ShallowParser::new();
        let graph = parser.parse("The cat sat on the mat.").unwrap();

        assert_eq!(graph.root(), Some(2));
        assert!(has_edge(&graph, "nsubj", "sat", "cat"));
        assert!(has_edge(&graph, "det", "cat", "The"));
        assert!(has_edge(&graph, "prep_on", "sat", "mat"));
        assert!(has_edge(&graph, "case", "mat", "on"));
        assert!(has_edge(&graph, "det", "mat", "the"));
        assert!(has_edge(&graph, "punct", "sat", "."));
    }

    #[test]
    fn test_every_token_has_one_governor() {
        let parser = ShallowParser::new();
        for sentence in [
            "The cat sat on the mat.",
            "If the weather is good, John plays tennis.",
            "Mary said that John likes pizza and pasta.",
            "Thomas Edison invented the light bulb in 1879.",
            "Hello , world !",
            "and or but",
        ] {
            let graph = parser.parse(sentence).unwrap();
            for token in graph.tokens() {
                let incoming = graph
                    .dependencies()
                    .iter()
                    .filter(|d| d.dependent == token.index)
                    .count();
                assert_eq!(incoming, 1, "token '{}' in '{}'", token.text, sentence);
            }
            assert_eq!(
                graph.dependencies().iter().filter(|d| d.governor.is_none()).count(),
                1
            );
        }
    }

    #[test]
    fn test_verb_recovery_and_object() {
        let parser = ShallowParser::new();
        let graph = parser.parse("John likes pizza.").unwrap();

        assert_eq!(graph.token(1).unwrap().pos, "VBZ");
        assert!(has_edge(&graph, "nsubj", "likes", "John"));
        assert!(has_edge(&graph, "dobj", "likes", "pizza"));
    }

    #[test]
    fn test_compound_noun_phrase() {
        let parser = ShallowParser::new();
        let graph = parser
            .parse("Thomas Edison invented the light bulb in 1879.")
            .unwrap();

        assert!(has_edge(&graph, "nsubj", "invented", "Edison"));
        assert!(has_edge(&graph, "nn", "Edison", "Thomas"));
        assert!(has_edge(&graph, "dobj", "invented", "bulb"));
        assert!(has_edge(&graph, "nn", "bulb", "light"));
        assert!(has_edge(&graph, "prep_in", "invented", "1879"));
    }

    #[test]
    fn test_subordinate_clause() {
        let parser = ShallowParser::new();
        let graph = parser
            .parse("If the weather is good, John plays tennis.")
            .unwrap();

        assert_eq!(graph.token(graph.root().unwrap()).unwrap().text, "plays");
        assert!(has_edge(&graph, "advcl", "plays", "is"));
        assert!(has_edge(&graph, "mark", "is", "If"));
        assert!(has_edge(&graph, "acomp", "is", "good"));
        assert!(has_edge(&graph, "dobj", "plays", "tennis"));
    }

    #[test]
    fn test_reported_clause() {
        let parser = ShallowParser::new();
        let graph = parser.parse("Mary said that John likes pizza.").unwrap();

        assert_eq!(graph.token(graph.root().unwrap()).unwrap().text, "said");
        assert!(has_edge(&graph, "nsubj", "said", "Mary"));
        assert!(has_edge(&graph, "ccomp", "said", "likes"));
        assert!(has_edge(&graph, "complm", "likes", "that"));
        assert!(has_edge(&graph, "dobj", "likes", "pizza"));
    }

    #[test]
    fn test_passive_voice() {
        let parser = ShallowParser::new();
        let graph = parser.parse("The company was founded by Bill Gates.").unwrap();

        assert!(has_edge(&graph, "nsubjpass", "founded", "company"));
        assert!(has_edge(&graph, "auxpass", "founded", "was"));
        assert!(has_edge(&graph, "prep_by", "founded", "Gates"));
    }

    #[test]
    fn test_verbless_subordinate_is_merged() {
        let parser = ShallowParser::new();
        let graph = parser.parse("We met after lunch.").unwrap();

        assert!(has_edge(&graph, "prep_after", "met", "lunch"));
        assert!(!labels(&graph).iter().any(|(l, _, _)| l == "advcl"));
    }

    #[test]
    fn test_user_lexicon() {
        let lexicon = Lexicon::parse("zorbs\tVBZ\n").unwrap();
        let parser = ShallowParser::with_lexicon(lexicon);
        let graph = parser.parse("The alien zorbs the rock.").unwrap();
        assert!(has_edge(&graph, "nsubj", "zorbs", "alien"));
        assert!(has_edge(&graph, "dobj", "zorbs", "rock"));
    }

    #[test]
    fn test_output_round_trips_through_serialization() {
        let parser = ShallowParser::new();
        let graph = parser.parse("Mary said that John likes pizza.").unwrap();
        let restored = DependencyGraph::deserialize(&graph.serialize()).unwrap();
        assert_eq!(restored, graph);
    }
}
