//! Pattern-based relation extraction
//!
//! A pattern names the edge from a relation head to each argument, e.g.
//! `nsubj` and `prep_*`. Every verb of the sentence is tried against every
//! pattern; each match becomes one candidate. Arguments expand to their
//! noun phrase, the relation picks up auxiliaries, negation and the
//! preposition of a `prep_*` argument.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use oie_core::{ExtractionCandidate, Part, Result};
use oie_parser::DependencyGraph;

use crate::{read_model, Extractor};

/// Labels that stay inside a noun phrase
const NOUN_PHRASE_LABELS: &[&str] = &["det", "amod", "nn", "num", "poss", "possessive"];

/// Labels folded into the relation phrase
const RELATION_LABELS: &[&str] = &["aux", "auxpass", "neg"];

fn default_rel_pos() -> String {
    "VB".to_string()
}

/// One extraction pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPattern {
    /// Identifier written to output
    pub id: String,

    /// Edge label from the relation head to the first argument
    pub arg1: String,

    /// Edge label from the relation head to the second argument; a
    /// trailing `*` matches any suffix
    pub arg2: String,

    /// Required POS tag prefix of the relation head
    #[serde(default = "default_rel_pos")]
    pub rel_pos: String,

    /// How often the pattern held in training; used as its confidence
    pub frequency: f64,
}

impl ExtractionPattern {
    pub fn new(id: &str, arg1: &str, arg2: &str, frequency: f64) -> Self {
        Self {
            id: id.to_string(),
            arg1: arg1.to_string(),
            arg2: arg2.to_string(),
            rel_pos: default_rel_pos(),
            frequency,
        }
    }

    fn matches_arg1(&self, label: &str) -> bool {
        glob_match(&self.arg1, label)
    }

    fn matches_arg2(&self, label: &str) -> bool {
        glob_match(&self.arg2, label)
    }
}

fn glob_match(pattern: &str, label: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => label.starts_with(prefix),
        None => pattern == label,
    }
}

/// On-disk pattern model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternModel {
    #[serde(default)]
    pub patterns: Vec<ExtractionPattern>,
}

/// Extractor driven by a list of dependency patterns
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    patterns: Vec<ExtractionPattern>,
}

impl PatternExtractor {
    /// Extractor with the built-in patterns
    pub fn new(openparse_threshold: f64) -> Self {
        Self::with_patterns(builtin_patterns(), openparse_threshold)
    }

    /// Patterns with a frequency below `openparse_threshold` are dropped
    pub fn with_patterns(patterns: Vec<ExtractionPattern>, openparse_threshold: f64) -> Self {
        let total = patterns.len();
        let patterns: Vec<ExtractionPattern> = patterns
            .into_iter()
            .filter(|p| p.frequency >= openparse_threshold)
            .collect();

        if patterns.len() < total {
            tracing::debug!(
                dropped = total - patterns.len(),
                openparse_threshold,
                "Dropped infrequent patterns"
            );
        }

        Self { patterns }
    }

    /// Load patterns from a JSON or TOML model file
    pub fn from_file(path: impl AsRef<Path>, openparse_threshold: f64) -> Result<Self> {
        let model: PatternModel = read_model(path.as_ref(), "extraction model")?;
        Ok(Self::with_patterns(model.patterns, openparse_threshold))
    }

    pub fn patterns(&self) -> &[ExtractionPattern] {
        &self.patterns
    }

    fn match_head(
        &self,
        graph: &DependencyGraph,
        head: usize,
        pos: &str,
        context: &ClauseContext,
        candidates: &mut Vec<ExtractionCandidate>,
    ) {
        for pattern in self.patterns.iter().filter(|p| pos.starts_with(&p.rel_pos)) {
            let arg1_edges = graph.dependents(head).filter(|d| pattern.matches_arg1(&d.label));
            for arg1 in arg1_edges {
                let arg2_edges = graph
                    .dependents(head)
                    .filter(|d| d.dependent != arg1.dependent && pattern.matches_arg2(&d.label));

                for arg2 in arg2_edges {
                    let mut rel = relation_tokens(graph, head);
                    if arg2.label.starts_with("prep_") {
                        rel.extend(
                            graph
                                .dependents(arg2.dependent)
                                .filter(|d| d.label == "case")
                                .map(|d| d.dependent),
                        );
                    }
                    rel.sort_unstable();

                    let arg1_tokens = noun_phrase(graph, arg1.dependent);
                    let arg2_tokens = noun_phrase(graph, arg2.dependent);

                    candidates.push(ExtractionCandidate {
                        arg1: part(graph, arg1_tokens),
                        rel: part(graph, rel),
                        arg2: part(graph, arg2_tokens),
                        enabler: context.enabler.clone(),
                        attribution: context.attribution.clone(),
                        pattern: pattern.id.clone(),
                        sentence: graph.text().to_string(),
                        dependencies: context.dependencies.clone(),
                        extractor_confidence: pattern.frequency,
                    });
                }
            }
        }
    }
}

impl Extractor for PatternExtractor {
    fn extract(&self, graph: &DependencyGraph) -> Result<Vec<ExtractionCandidate>> {
        let dependencies = graph.serialize();
        let mut candidates = Vec::new();

        for token in graph.tokens() {
            if !self.patterns.iter().any(|p| token.pos.starts_with(&p.rel_pos)) {
                continue;
            }

            let context = ClauseContext {
                enabler: enabler(graph, token.index),
                attribution: attribution(graph, token.index),
                dependencies: dependencies.clone(),
            };
            self.match_head(graph, token.index, &token.pos, &context, &mut candidates);
        }

        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.display_text()));
        Ok(candidates)
    }
}

/// Per-head information shared by all of its candidates
struct ClauseContext {
    enabler: Option<Part>,
    attribution: Option<Part>,
    dependencies: String,
}

fn part(graph: &DependencyGraph, tokens: Vec<usize>) -> Part {
    Part::new(phrase_text(graph, &tokens), tokens)
}

/// Text of the given tokens, spaced the way the sentence spaces them
fn phrase_text(graph: &DependencyGraph, tokens: &[usize]) -> String {
    let mut text = String::new();
    let mut last_end: Option<usize> = None;

    for token in tokens.iter().filter_map(|&i| graph.token(i)) {
        if last_end.is_some_and(|end| end < token.offset) {
            text.push(' ');
        }
        text.push_str(&token.text);
        last_end = Some(token.end());
    }

    text
}

fn relation_tokens(graph: &DependencyGraph, head: usize) -> Vec<usize> {
    let mut tokens = vec![head];
    tokens.extend(
        graph
            .dependents(head)
            .filter(|d| RELATION_LABELS.contains(&d.label.as_str()))
            .map(|d| d.dependent),
    );
    tokens
}

/// Noun phrase around `head`, including `of`-style modifiers
fn noun_phrase(graph: &DependencyGraph, head: usize) -> Vec<usize> {
    let mut tokens = graph.subtree(head, |label| {
        NOUN_PHRASE_LABELS.contains(&label) || label.starts_with("prep_")
    });

    // Prepositions of nested modifiers, but not of the phrase itself
    let prepositions: Vec<usize> = tokens
        .iter()
        .filter(|&&t| t != head)
        .flat_map(|&t| graph.dependents(t).filter(|d| d.label == "case").map(|d| d.dependent))
        .collect();

    tokens.extend(prepositions);
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

/// Subordinate clause attached to `head` ("if it rains")
fn enabler(graph: &DependencyGraph, head: usize) -> Option<Part> {
    let clause = graph.dependents(head).find(|d| d.label == "advcl")?;
    let tokens = graph.subtree(clause.dependent, |label| label != "punct");
    Some(part(graph, tokens))
}

/// Speaker of a reported clause ("John said")
fn attribution(graph: &DependencyGraph, head: usize) -> Option<Part> {
    let edge = graph.incoming(head).filter(|d| d.label == "ccomp")?;
    let verb = edge.governor?;
    if !graph.token(verb).is_some_and(|t| t.is_verb()) {
        return None;
    }

    let mut tokens = relation_tokens(graph, verb);
    if let Some(subject) = graph
        .dependents(verb)
        .find(|d| d.label == "nsubj" || d.label == "nsubjpass")
    {
        tokens.extend(noun_phrase(graph, subject.dependent));
    }
    tokens.sort_unstable();

    Some(part(graph, tokens))
}

/// Patterns used when no model file is given
pub fn builtin_patterns() -> Vec<ExtractionPattern> {
    vec![
        ExtractionPattern::new("nsubj-dobj", "nsubj", "dobj", 0.42),
        ExtractionPattern::new("nsubj-prep", "nsubj", "prep_*", 0.21),
        ExtractionPattern::new("nsubjpass-prep", "nsubjpass", "prep_*", 0.12),
        ExtractionPattern::new("nsubj-attr", "nsubj", "attr", 0.08),
        ExtractionPattern::new("nsubj-acomp", "nsubj", "acomp", 0.05),
        ExtractionPattern::new("nsubj-xcomp", "nsubj", "xcomp", 0.01),
        ExtractionPattern::new("nsubj-dep", "nsubj", "dep", 0.002),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parse;
    use oie_core::DEFAULT_OPENPARSE_THRESHOLD;
    use std::io::Write;

    fn extract(sentence: &str) -> Vec<ExtractionCandidate> {
        PatternExtractor::new(DEFAULT_OPENPARSE_THRESHOLD)
            .extract(&parse(sentence))
            .unwrap()
    }

    fn display(candidates: &[ExtractionCandidate]) -> Vec<String> {
        candidates.iter().map(|c| c.display_text()).collect()
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("prep_*", "prep_on"));
        assert!(glob_match("dobj", "dobj"));
        assert!(!glob_match("dobj", "dobj2"));
        assert!(!glob_match("prep_*", "dobj"));
    }

    #[test]
    fn test_prepositional_relation() {
        let candidates = extract("The cat sat on the mat.");
        assert_eq!(display(&candidates), vec!["(The cat; sat on; the mat)"]);

        let c = &candidates[0];
        assert_eq!(c.pattern, "nsubj-prep");
        assert_eq!(c.sentence, "The cat sat on the mat.");
        assert_eq!(c.arg1.tokens, vec![0, 1]);
        assert_eq!(c.rel.tokens, vec![2, 3]);
        assert_eq!(c.arg2.tokens, vec![4, 5]);
        assert!(c.dependencies.contains("prep_on(sat_VBD_2_8, mat_NN_5_19)"));
    }

    #[test]
    fn test_direct_object_then_prepositions() {
        let candidates = extract("Thomas Edison invented the light bulb in 1879.");
        assert_eq!(
            display(&candidates),
            vec![
                "(Thomas Edison; invented; the light bulb)",
                "(Thomas Edison; invented in; 1879)"
            ]
        );
    }

    #[test]
    fn test_passive_relation_keeps_auxiliary() {
        let candidates = extract("The company was founded by Bill Gates.");
        assert_eq!(
            display(&candidates),
            vec!["(The company; was founded by; Bill Gates)"]
        );
    }

    #[test]
    fn test_enabler() {
        let candidates = extract("If the weather is good, John plays tennis.");
        let texts = display(&candidates);
        assert!(texts.contains(&"(the weather; is; good)".to_string()));
        assert!(texts.contains(&"(John; plays; tennis)[enabler=If the weather is good]".to_string()));
    }

    #[test]
    fn test_attribution() {
        let candidates = extract("Mary said that John likes pizza.");
        assert_eq!(
            display(&candidates),
            vec!["(John; likes; pizza)[attrib=Mary said]"]
        );
    }

    #[test]
    fn test_no_extractions() {
        assert!(extract("Hello , world !").is_empty());
    }

    #[test]
    fn test_openparse_threshold_filters_patterns() {
        let all = PatternExtractor::new(0.0);
        assert_eq!(all.patterns().len(), builtin_patterns().len());

        let default = PatternExtractor::new(DEFAULT_OPENPARSE_THRESHOLD);
        assert!(default.patterns().iter().all(|p| p.frequency >= 0.005));
        assert!(!default.patterns().iter().any(|p| p.id == "nsubj-dep"));

        let strict = PatternExtractor::new(0.3);
        assert_eq!(strict.patterns().len(), 1);
        assert!(strict.extract(&parse("The cat sat on the mat.")).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let patterns = vec![
            ExtractionPattern::new("first", "nsubj", "dobj", 0.5),
            ExtractionPattern::new("second", "nsubj", "dobj", 0.4),
        ];
        let extractor = PatternExtractor::with_patterns(patterns, 0.0);
        let candidates = extractor.extract(&parse("John likes pizza.")).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].pattern, "first");
    }

    #[test]
    fn test_rel_pos_restricts_heads() {
        let mut pattern = ExtractionPattern::new("nominal", "det", "amod", 0.5);
        pattern.rel_pos = "NN".to_string();
        let extractor = PatternExtractor::with_patterns(vec![pattern], 0.0);

        let candidates = extractor.extract(&parse("The big cat sat.")).unwrap();
        assert_eq!(display(&candidates), vec!["(The; cat; big)"]);
    }

    #[test]
    fn test_model_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"patterns": [
                {{"id": "subj-obj", "arg1": "nsubj", "arg2": "dobj", "frequency": 0.9}},
                {{"id": "rare", "arg1": "nsubj", "arg2": "prep_*", "frequency": 0.001}}
            ]}}"#
        )
        .unwrap();

        let extractor = PatternExtractor::from_file(file.path(), 0.005).unwrap();
        assert_eq!(extractor.patterns().len(), 1);
        assert_eq!(extractor.patterns()[0].rel_pos, "VB");

        let candidates = extractor.extract(&parse("John likes pizza.")).unwrap();
        assert_eq!(candidates[0].pattern, "subj-obj");
        assert_eq!(candidates[0].extractor_confidence, 0.9);
    }

    #[test]
    fn test_works_on_deserialized_graphs() {
        let graph = DependencyGraph::deserialize(
            "nsubj(likes_VBZ_1_5, Bob_NNP_0_0); root(ROOT, likes_VBZ_1_5); dobj(likes_VBZ_1_5, jazz_NN_2_11)",
        )
        .unwrap();
        let candidates = PatternExtractor::new(0.005).extract(&graph).unwrap();
        assert_eq!(display(&candidates), vec!["(Bob; likes; jazz)"]);
    }
}
