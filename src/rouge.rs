//! Lexical pairwise baseline built on ROUGE overlap.
//!
//! Each tree is flattened into its parent-child text pairs. Pairs of the
//! second tree are greedily matched against the remaining pairs of the first
//! by summed sentence similarity, where sentence similarity is the mean of
//! the ROUGE-1, ROUGE-2 and ROUGE-L F1 scores. The similarity `S(A, B)` is
//! turned into a pseudometric with the kernel trick:
//!
//! ```text
//! d(A, B) = sqrt(S(A, A) + S(B, B) - S(A, B) - S(B, A))
//! ```
//!
//! Trees without edges (empty or single-node) have no pairs and therefore
//! distance 0 to each other.

use std::collections::HashMap;

use crate::tree::TextTree;

/// Lowercased alphanumeric tokens of `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn f1(overlap: usize, candidate: usize, reference: usize) -> f64 {
    if overlap == 0 || candidate == 0 || reference == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (overlap, candidate, reference) = (overlap as f64, candidate as f64, reference as f64);
    let precision = overlap / candidate;
    let recall = overlap / reference;
    2.0 * precision * recall / (precision + recall)
}

/// ROUGE-N F1 between two token sequences (clipped n-gram overlap).
#[must_use]
pub fn rouge_n(candidate: &[String], reference: &[String], n: usize) -> f64 {
    if n == 0 || candidate.len() < n || reference.len() < n {
        return 0.0;
    }
    let mut counts: HashMap<&[String], usize> = HashMap::new();
    for gram in reference.windows(n) {
        *counts.entry(gram).or_default() += 1;
    }
    let mut overlap = 0;
    for gram in candidate.windows(n) {
        if let Some(count) = counts.get_mut(gram).filter(|count| **count > 0) {
            *count -= 1;
            overlap += 1;
        }
    }
    f1(overlap, candidate.len() + 1 - n, reference.len() + 1 - n)
}

/// ROUGE-L F1 between two token sequences (longest common subsequence).
#[must_use]
pub fn rouge_l(candidate: &[String], reference: &[String]) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }
    let mut previous = vec![0usize; reference.len() + 1];
    let mut current = vec![0usize; reference.len() + 1];
    for token in candidate {
        for (j, other) in reference.iter().enumerate() {
            current[j + 1] = if token == other {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    f1(previous[reference.len()], candidate.len(), reference.len())
}

/// Mean of ROUGE-1, ROUGE-2 and ROUGE-L F1 between two texts.
#[must_use]
pub fn rouge_similarity(a: &str, b: &str) -> f64 {
    token_similarity(&tokenize(a), &tokenize(b))
}

fn token_similarity(a: &[String], b: &[String]) -> f64 {
    (rouge_n(a, b, 1) + rouge_n(a, b, 2) + rouge_l(a, b)) / 3.0
}

/// Tokenized `(parent, child)` pair.
type Edge = (Vec<String>, Vec<String>);

/// Parent-child pairs, parents in preorder and children left to right.
fn edges(tree: &TextTree) -> Vec<Edge> {
    let mut pairs = Vec::with_capacity(tree.len().saturating_sub(1));
    for id in tree.preorder() {
        let parent = tokenize(tree.text(id));
        for &child in tree.children(id) {
            pairs.push((parent.clone(), tokenize(tree.text(child))));
        }
    }
    pairs
}

/// Greedy pair-matching similarity of `b` against `a`.
///
/// Not symmetric: the pairs of `b` drive the matching.
#[must_use]
pub fn pairwise_similarity(a: &TextTree, b: &TextTree) -> f64 {
    matched_similarity(&edges(a), &edges(b))
}

fn matched_similarity(a: &[Edge], b: &[Edge]) -> f64 {
    let mut remaining: Vec<&Edge> = a.iter().collect();
    let mut total = 0.0;
    for (parent, child) in b {
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_sum = 0.0;
        for (index, (other_parent, other_child)) in remaining.iter().enumerate() {
            let parent_sim = token_similarity(parent, other_parent);
            let child_sim = token_similarity(child, other_child);
            if parent_sim + child_sim > best_sum {
                best_sum = parent_sim + child_sim;
                best = Some((index, parent_sim, child_sim));
            }
        }
        if let Some((index, parent_sim, child_sim)) = best {
            total += (parent_sim + child_sim) / 2.0;
            remaining.remove(index);
        }
    }
    total
}

/// Kernel distance derived from [`pairwise_similarity`].
#[must_use]
pub fn pairwise_rouge_distance(a: &TextTree, b: &TextTree) -> f64 {
    let (ea, eb) = (edges(a), edges(b));
    let cross = matched_similarity(&ea, &eb) + matched_similarity(&eb, &ea);
    let own = matched_similarity(&ea, &ea) + matched_similarity(&eb, &eb);
    (own - cross).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::Outline;

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(tokenize("Deep-Learning, 2024!"), vec!["deep", "learning", "2024"]);
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn identical_sentences_score_one() {
        assert!((rouge_similarity("the cat sat", "The cat sat.") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_sentences_score_zero() {
        assert!(rouge_similarity("alpha beta", "gamma delta").abs() < f64::EPSILON);
    }

    #[test]
    fn rouge_one_counts_clipped_overlap() {
        // overlap 2 of 3 candidate, 2 of 2 reference
        let score = rouge_n(&tokens("the the cat"), &tokens("the cat"), 1);
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rouge_l_uses_subsequence() {
        // lcs("a b c d", "a c d") = 3
        let score = rouge_l(&tokens("a b c d"), &tokens("a c d"));
        let expected = 2.0 * 0.75 * 1.0 / 1.75;
        assert!((score - expected).abs() < 1e-12);
    }

    fn tree(outline: &Outline) -> TextTree {
        TextTree::from_outline(outline).unwrap()
    }

    #[test]
    fn identical_trees_have_zero_distance() {
        let a = tree(&Outline::new(
            "graph neural networks",
            vec![Outline::leaf("message passing"), Outline::leaf("node classification")],
        ));
        assert!(pairwise_rouge_distance(&a, &a).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = tree(&Outline::new(
            "graph neural networks",
            vec![Outline::leaf("message passing"), Outline::leaf("node classification")],
        ));
        let b = tree(&Outline::new(
            "graph networks",
            vec![Outline::leaf("node labels")],
        ));
        let ab = pairwise_rouge_distance(&a, &b);
        let ba = pairwise_rouge_distance(&b, &a);
        assert!(ab > 0.0);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn edgeless_trees_are_indistinguishable() {
        let a = TextTree::leaf("x").unwrap();
        let b = TextTree::leaf("y").unwrap();
        assert!(pairwise_rouge_distance(&a, &b).abs() < f64::EPSILON);
        assert!(pairwise_similarity(&a, &TextTree::empty()).abs() < f64::EPSILON);
    }
}
