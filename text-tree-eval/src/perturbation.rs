//! Perturbation classes, records and content sources.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use text_tree::TextTree;

/// The kind of change a perturbed variant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationClass {
    /// Text rewritten with the same meaning; structure untouched.
    Paraphrase,
    /// Nodes moved, removed or added; text otherwise untouched.
    Structural,
    /// Text replaced with unrelated content; structure untouched.
    Semantic,
}

impl PerturbationClass {
    /// All classes in evaluation order.
    pub const ALL: [Self; 3] = [Self::Paraphrase, Self::Structural, Self::Semantic];

    /// Returns the snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paraphrase => "paraphrase",
            Self::Structural => "structural",
            Self::Semantic => "semantic",
        }
    }

    /// The two classes a coefficient for `self` is contrasted against.
    #[must_use]
    pub const fn others(self) -> [Self; 2] {
        match self {
            Self::Paraphrase => [Self::Structural, Self::Semantic],
            Self::Structural => [Self::Paraphrase, Self::Semantic],
            Self::Semantic => [Self::Paraphrase, Self::Structural],
        }
    }
}

impl fmt::Display for PerturbationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference tree paired with one perturbed variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerturbationRecord {
    /// The unmodified reference.
    pub reference: TextTree,
    /// The perturbed variant.
    pub perturbed: TextTree,
    /// Kind of perturbation applied.
    pub class: PerturbationClass,
    /// Number of elementary edits actually applied.
    pub magnitude: usize,
    /// Position of the reference in the input corpus.
    pub reference_index: usize,
}

/// Supplies replacement text for content perturbations.
///
/// Implementations return `None` when they have nothing to offer for a
/// text; the generator then tries another node.
pub trait ContentSource {
    /// A rewording of `text` with the same meaning.
    fn paraphrase(&self, text: &str, rng: &mut dyn RngCore) -> Option<String>;

    /// Text unrelated in meaning to `text`.
    fn semantic_replacement(&self, text: &str, rng: &mut dyn RngCore) -> Option<String>;
}

impl<S: ContentSource + ?Sized> ContentSource for &S {
    fn paraphrase(&self, text: &str, rng: &mut dyn RngCore) -> Option<String> {
        (**self).paraphrase(text, rng)
    }

    fn semantic_replacement(&self, text: &str, rng: &mut dyn RngCore) -> Option<String> {
        (**self).semantic_replacement(text, rng)
    }
}

/// A [`ContentSource`] backed by synonym groups and a distractor pool.
///
/// Paraphrases swap a whole text or one of its words for another member of
/// the same synonym group, keeping the leading capital. Semantic
/// replacements draw from the distractor pool.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use text_tree_eval::{ContentSource, LexiconContent};
///
/// let lexicon = LexiconContent::new()
///     .with_synonyms(["results", "findings"])
///     .with_distractors(["tide tables"]);
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
///
/// assert_eq!(lexicon.paraphrase("Key results", &mut rng).as_deref(), Some("Key findings"));
/// assert_eq!(lexicon.semantic_replacement("Key results", &mut rng).as_deref(), Some("tide tables"));
/// assert_eq!(lexicon.paraphrase("Appendix", &mut rng), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LexiconContent {
    groups: Vec<Vec<String>>,
    index: HashMap<String, usize>,
    distractors: Vec<String>,
}

impl LexiconContent {
    /// Creates an empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexicon covering common section headings of papers and reports.
    #[must_use]
    pub fn academic() -> Self {
        let groups: [&[&str]; 14] = [
            &["introduction", "intro", "overview"],
            &["methods", "approach", "methodology"],
            &["results", "findings", "outcomes"],
            &["conclusion", "summary", "closing remarks"],
            &["discussion", "analysis", "interpretation"],
            &["background", "context", "preliminaries"],
            &["related work", "prior work", "literature review"],
            &["experiments", "evaluation", "empirical study"],
            &["limitations", "caveats", "shortcomings"],
            &["future work", "next steps", "open directions"],
            &["motivation", "rationale"],
            &["dataset", "corpus"],
            &["model", "architecture"],
            &["training", "optimization"],
        ];
        let distractors = [
            "medieval castle masonry",
            "coral reef ecology",
            "sourdough baking",
            "jazz improvisation",
            "volcanic eruptions",
            "railway timetables",
            "tax law reform",
            "alpine skiing technique",
            "beekeeping basics",
            "opera costume design",
            "antique clock repair",
            "desert navigation",
        ];
        groups
            .into_iter()
            .fold(Self::new(), |lexicon, group| lexicon.with_synonyms(group.iter().copied()))
            .with_distractors(distractors)
    }

    /// Adds a group of interchangeable words or phrases.
    ///
    /// Members are stored lowercased; a member already in another group is
    /// moved to this one.
    #[must_use]
    pub fn with_synonyms<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members: Vec<String> = group
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if members.len() < 2 {
            return self;
        }
        let id = self.groups.len();
        for member in &members {
            self.index.insert(member.clone(), id);
        }
        self.groups.push(members);
        self
    }

    /// Adds unrelated replacement texts.
    #[must_use]
    pub fn with_distractors<I, S>(mut self, distractors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.distractors.extend(
            distractors
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty()),
        );
        self
    }

    /// Single-word alias pairs `(member, canonical)` for every group, where
    /// the canonical word is the group's first single-word member.
    ///
    /// Feeding these to an embedder's alias table makes it treat this
    /// lexicon's paraphrases as identical.
    #[must_use]
    pub fn word_aliases(&self) -> Vec<(String, String)> {
        let mut aliases = Vec::new();
        for group in &self.groups {
            let mut words = group.iter().filter(|m| !m.contains(char::is_whitespace));
            let Some(canonical) = words.next() else {
                continue;
            };
            aliases.extend(words.map(|w| (w.clone(), canonical.clone())));
        }
        aliases
    }

    /// Number of synonym groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Distractor texts.
    #[must_use]
    pub fn distractors(&self) -> &[String] {
        &self.distractors
    }

    /// Another member of `member`'s group, if it has a group.
    fn synonym_of(&self, member: &str, rng: &mut dyn RngCore) -> Option<&str> {
        let group = &self.groups[*self.index.get(member)?];
        let choices: Vec<&str> = group
            .iter()
            .map(String::as_str)
            .filter(|m| *m != member)
            .collect();
        choices.choose(rng).copied()
    }
}

/// Copies the capitalisation of `original`'s first letter onto `replacement`.
fn match_case(original: &str, replacement: &str) -> String {
    let upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}

impl ContentSource for LexiconContent {
    fn paraphrase(&self, text: &str, rng: &mut dyn RngCore) -> Option<String> {
        let whole = text.trim().to_lowercase();
        if let Some(synonym) = self.synonym_of(&whole, rng) {
            return Some(match_case(text.trim(), synonym));
        }

        // Word-level: (start, end, lowercased word) of every known word.
        let mut spans = Vec::new();
        let mut start = None;
        for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            match (start, c.is_alphanumeric()) {
                (None, true) => start = Some(i),
                (Some(s), false) => {
                    let word = text[s..i].to_lowercase();
                    if self.index.contains_key(&word) {
                        spans.push((s, i, word));
                    }
                    start = None;
                }
                _ => {}
            }
        }
        let (s, e, word) = spans.choose(rng)?;
        let synonym = self.synonym_of(word, rng)?;
        Some(format!("{}{}{}", &text[..*s], match_case(&text[*s..*e], synonym), &text[*e..]))
    }

    fn semantic_replacement(&self, text: &str, rng: &mut dyn RngCore) -> Option<String> {
        let candidates: Vec<&String> = self
            .distractors
            .iter()
            .filter(|d| !d.eq_ignore_ascii_case(text))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..candidates.len());
        Some(candidates[pick].clone())
    }
}
