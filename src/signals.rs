//! Signal extraction.
//!
//! Every analysis pass in the engine asks one question of a piece of text:
//! which of these trigger terms does it signal? [`SignalScorer`] is that
//! question as a strategy, so the lexical containment heuristic can be
//! swapped for a semantic scorer without touching the components that
//! consume signals.
//!
//! Semantics of the default [`LexicalScorer`]:
//! - case-insensitive containment, not tokenized matching (`"lead"` is
//!   signalled by `"leadership"`, overlapping terms all count);
//! - a term counts once per text no matter how often it occurs;
//! - distinct terms of the same category each add weight.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;

use crate::lexicon::LexicalCategory;

/// Pluggable strategy deciding which terms a text signals.
pub trait SignalScorer: Send + Sync {
    /// Terms from `terms` signalled by `text`, each at most once, in the
    /// order they were declared.
    fn matched<'t>(&self, text: &str, terms: &[&'t str]) -> Vec<&'t str>;

    /// Number of distinct terms signalled.
    fn count(&self, text: &str, terms: &[&str]) -> usize {
        self.matched(text, terms).len()
    }

    /// Whether any term is signalled.
    fn any(&self, text: &str, terms: &[&str]) -> bool {
        !self.matched(text, terms).is_empty()
    }
}

/// Case-insensitive substring containment backed by an Aho-Corasick scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalScorer;

impl SignalScorer for LexicalScorer {
    fn matched<'t>(&self, text: &str, terms: &[&'t str]) -> Vec<&'t str> {
        if text.is_empty() || terms.is_empty() {
            return Vec::new();
        }

        let haystack = text.to_lowercase();
        let needles: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let matcher = match AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&needles)
        {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::warn!("Falling back to linear term scan: {}", e);
                return terms
                    .iter()
                    .zip(&needles)
                    .filter(|(_, needle)| haystack.contains(needle.as_str()))
                    .map(|(term, _)| *term)
                    .collect();
            }
        };

        // Overlapping search reports every pattern occurring anywhere in the
        // haystack, which is exactly per-term containment.
        let mut seen = vec![false; terms.len()];
        for mat in matcher.find_overlapping_iter(&haystack) {
            seen[mat.pattern().as_usize()] = true;
        }

        terms
            .iter()
            .zip(seen)
            .filter_map(|(term, hit)| hit.then_some(*term))
            .collect()
    }
}

/// Weighted hit for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalHit<C> {
    pub category: C,
    pub weight: f64,
    /// Distinct terms that produced the weight.
    pub terms: Vec<&'static str>,
}

/// Per-category hits, in category declaration order. Categories without a
/// hit are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalHits<C> {
    hits: Vec<SignalHit<C>>,
}

impl<C: LexicalCategory> SignalHits<C> {
    fn empty() -> Self {
        Self { hits: Vec::new() }
    }

    /// Weight for a category (0.0 when absent).
    pub fn weight(&self, category: C) -> f64 {
        self.hits
            .iter()
            .find(|h| h.category == category)
            .map_or(0.0, |h| h.weight)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalHit<C>> {
        self.hits.iter()
    }

    /// Up to `n` categories ranked by weight, highest first. Ties keep
    /// declaration order.
    pub fn top(&self, n: usize) -> Vec<C> {
        let mut ranked: Vec<&SignalHit<C>> = self.hits.iter().collect();
        ranked.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.into_iter().take(n).map(|h| h.category).collect()
    }

    fn absorb(&mut self, other: SignalHits<C>) {
        for hit in other.hits {
            match self.hits.iter_mut().find(|h| h.category == hit.category) {
                Some(existing) => {
                    existing.weight += hit.weight;
                    for term in hit.terms {
                        if !existing.terms.contains(&term) {
                            existing.terms.push(term);
                        }
                    }
                }
                None => self.hits.push(hit),
            }
        }
        self.hits.sort_by_key(|h| declaration_index(h.category));
    }
}

fn declaration_index<C: LexicalCategory>(category: C) -> usize {
    C::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(usize::MAX)
}

/// Score one text against every category of a family.
pub fn extract<C: LexicalCategory>(scorer: &dyn SignalScorer, text: &str) -> SignalHits<C> {
    let hits = C::ALL
        .iter()
        .filter_map(|category| {
            let terms = scorer.matched(text, category.terms());
            if terms.is_empty() {
                None
            } else {
                Some(SignalHit {
                    category: *category,
                    weight: terms.len() as f64,
                    terms,
                })
            }
        })
        .collect();
    SignalHits { hits }
}

/// Sum per-text hits over a sequence of texts.
///
/// Each text contributes its own distinct-term count, so a term repeated in
/// two answers counts twice.
pub fn tally<'a, C, I>(scorer: &dyn SignalScorer, texts: I) -> SignalHits<C>
where
    C: LexicalCategory,
    I: IntoIterator<Item = &'a str>,
{
    let mut total = SignalHits::empty();
    for text in texts {
        total.absorb(extract(scorer, text));
    }
    total
}

/// First weighted signal present in `text`, by declaration order.
pub fn first_signal(
    scorer: &dyn SignalScorer,
    text: &str,
    signals: &'static [(&'static str, f64)],
) -> Option<(&'static str, f64)> {
    let terms: Vec<&'static str> = signals.iter().map(|(term, _)| *term).collect();
    let first = scorer.matched(text, &terms).into_iter().next()?;
    signals.iter().find(|(term, _)| *term == first).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{InsightKind, PassionCategory, SkillCategory};

    #[test]
    fn test_matched_is_case_insensitive_containment() {
        let scorer = LexicalScorer;
        let terms = ["lead", "teach", "organize"];
        let matched = scorer.matched("Leadership and TEACHING are my thing", &terms);
        assert_eq!(matched, vec!["lead", "teach"]);
    }

    #[test]
    fn test_matched_counts_overlapping_terms() {
        let scorer = LexicalScorer;
        // "help others learn" overlaps "help" and "learn".
        let terms = ["help", "help others learn", "learn"];
        let matched = scorer.matched("I help others learn", &terms);
        assert_eq!(matched, vec!["help", "help others learn", "learn"]);
    }

    #[test]
    fn test_repeated_term_counts_once() {
        let scorer = LexicalScorer;
        assert_eq!(scorer.count("teach teach teach", &["teach"]), 1);
    }

    #[test]
    fn test_empty_inputs_match_nothing() {
        let scorer = LexicalScorer;
        assert!(scorer.matched("", &["teach"]).is_empty());
        assert!(scorer.matched("teach", &[]).is_empty());
        assert!(!scorer.any("   ", &["teach"]));
    }

    #[test]
    fn test_extract_weights_distinct_terms_per_category() {
        let hits: SignalHits<SkillCategory> =
            extract(&LexicalScorer, "I teach, mentor and explain; I also organize events.");
        assert_eq!(hits.weight(SkillCategory::Teaching), 3.0);
        // "organize" belongs to both leadership and administrative.
        assert_eq!(hits.weight(SkillCategory::Leadership), 1.0);
        assert_eq!(hits.weight(SkillCategory::Administrative), 1.0);
        assert_eq!(hits.weight(SkillCategory::Technical), 0.0);
    }

    #[test]
    fn test_tally_sums_across_texts_and_ranks() {
        let texts = ["I teach kids", "I teach adults and coach", "I plan trips"];
        let hits: SignalHits<SkillCategory> = tally(&LexicalScorer, texts);
        assert_eq!(hits.weight(SkillCategory::Teaching), 3.0);
        assert_eq!(hits.weight(SkillCategory::Administrative), 1.0);
        assert_eq!(
            hits.top(3),
            vec![SkillCategory::Teaching, SkillCategory::Administrative]
        );
    }

    #[test]
    fn test_top_breaks_ties_by_declaration_order() {
        let hits: SignalHits<PassionCategory> =
            tally(&LexicalScorer, ["health and nature and people"]);
        assert_eq!(
            hits.top(3),
            vec![
                PassionCategory::People,
                PassionCategory::Nature,
                PassionCategory::Healing
            ]
        );
    }

    #[test]
    fn test_first_signal_uses_declaration_order() {
        let text = "I excel at this and people often come to me for it";
        let hit = first_signal(
            &LexicalScorer,
            text,
            InsightKind::StrongSkillIndicator.signals(),
        );
        assert_eq!(hit, Some(("people often come to me", 0.8)));
    }
}
