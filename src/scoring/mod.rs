//! Alignment scoring engine.
//!
//! Scores the subject against every [`TraitCategory`] from four sub-scores of
//! up to 25 points each:
//!
//! - skills: share of the category's skills among the subject's top three
//! - passions: same for passions
//! - values: share of the category's value keywords in values-stage answers
//! - behavior: share of behavioral markers with any word in the full corpus
//!
//! Scores are a pure function of the answers; nothing is cached.

mod report;
mod taxonomy;

pub use report::{Assessment, Overlap, StageResponseSummary, alignment_score, find_overlaps};
pub use taxonomy::{TraitCategory, TraitProfile};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::{LexicalCategory, PassionCategory, SkillCategory};
use crate::signals::{SignalHits, SignalScorer, tally};
use crate::stage::{Stage, StageMachine};

/// Maximum points per sub-score.
pub const SUB_SCORE_WEIGHT: f64 = 25.0;
/// Number of top skill or passion categories considered.
pub const TOP_CATEGORIES: usize = 3;

/// Strength band for a total score, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthLabel {
    Low,
    Emerging,
    Moderate,
    Strong,
    Dominant,
}

impl StrengthLabel {
    pub fn from_total(total: f64) -> Self {
        if total >= 70.0 {
            Self::Dominant
        } else if total >= 50.0 {
            Self::Strong
        } else if total >= 30.0 {
            Self::Moderate
        } else if total >= 15.0 {
            Self::Emerging
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Emerging => "Emerging",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::Dominant => "Dominant",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub skills: f64,
    pub passions: f64,
    pub values: f64,
    pub behavior: f64,
}

impl SubScores {
    pub fn total(&self) -> f64 {
        self.skills + self.passions + self.values + self.behavior
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    pub category: TraitCategory,
    /// Sum of sub-scores, rounded to one decimal.
    pub total: f64,
    pub sub_scores: SubScores,
    /// Decided on the unrounded total.
    pub label: StrengthLabel,
}

/// Tallied hits for one lexical family plus its top categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnalysis<C> {
    pub hits: SignalHits<C>,
    pub top: Vec<C>,
}

impl<C: LexicalCategory> CategoryAnalysis<C> {
    fn from_texts<'a>(scorer: &dyn SignalScorer, texts: impl IntoIterator<Item = &'a str>) -> Self {
        let hits = tally(scorer, texts);
        let top = hits.top(TOP_CATEGORIES);
        Self { hits, top }
    }
}

pub fn analyze_skills(
    scorer: &dyn SignalScorer,
    machine: &StageMachine,
) -> CategoryAnalysis<SkillCategory> {
    CategoryAnalysis::from_texts(
        scorer,
        machine
            .answers(Stage::SkillsAssessment)
            .iter()
            .map(|a| a.text.as_str()),
    )
}

pub fn analyze_passions(
    scorer: &dyn SignalScorer,
    machine: &StageMachine,
) -> CategoryAnalysis<PassionCategory> {
    CategoryAnalysis::from_texts(
        scorer,
        machine
            .answers(Stage::PassionExploration)
            .iter()
            .map(|a| a.text.as_str()),
    )
}

/// Share of `required` present in `top`, scaled to the sub-score weight.
fn overlap_share<C: PartialEq>(top: &[C], required: &[C]) -> f64 {
    if top.is_empty() || required.is_empty() {
        return 0.0;
    }
    let shared = required.iter().filter(|r| top.contains(r)).count();
    shared as f64 / required.len() as f64 * SUB_SCORE_WEIGHT
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Inputs shared by every category in one scoring pass.
struct ScoringInputs<'a> {
    top_skills: &'a [SkillCategory],
    top_passions: &'a [PassionCategory],
    values_text: &'a str,
    corpus: &'a str,
}

fn score_category(
    scorer: &dyn SignalScorer,
    category: TraitCategory,
    inputs: &ScoringInputs<'_>,
) -> TraitScore {
    let profile = category.profile();

    let values = if profile.values.is_empty() {
        0.0
    } else {
        scorer.count(inputs.values_text, profile.values) as f64 / profile.values.len() as f64
            * SUB_SCORE_WEIGHT
    };

    let behavior = if profile.markers.is_empty() {
        0.0
    } else {
        let matched = profile
            .markers
            .iter()
            .filter(|marker| {
                let lowered = marker.to_lowercase();
                let words: Vec<&str> = lowered.split_whitespace().collect();
                scorer.any(inputs.corpus, &words)
            })
            .count();
        matched as f64 / profile.markers.len() as f64 * SUB_SCORE_WEIGHT
    };

    let sub_scores = SubScores {
        skills: overlap_share(inputs.top_skills, profile.skills),
        passions: overlap_share(inputs.top_passions, profile.passions),
        values,
        behavior,
    };
    let raw = sub_scores.total();

    TraitScore {
        category,
        total: round_tenth(raw),
        sub_scores,
        label: StrengthLabel::from_total(raw),
    }
}

/// Score every category, in taxonomy order.
pub fn calculate_scores(scorer: &dyn SignalScorer, machine: &StageMachine) -> Vec<TraitScore> {
    let skills = analyze_skills(scorer, machine);
    let passions = analyze_passions(scorer, machine);
    score_with(scorer, machine, &skills.top, &passions.top)
}

fn score_with(
    scorer: &dyn SignalScorer,
    machine: &StageMachine,
    top_skills: &[SkillCategory],
    top_passions: &[PassionCategory],
) -> Vec<TraitScore> {
    let values_text = machine.stage_corpus(Stage::ValuesClarification);
    let corpus = machine.corpus();
    let inputs = ScoringInputs {
        top_skills,
        top_passions,
        values_text: &values_text,
        corpus: &corpus,
    };

    let scores: Vec<TraitScore> = TraitCategory::ALL
        .iter()
        .map(|category| score_category(scorer, *category, &inputs))
        .collect();
    tracing::debug!(
        categories = scores.len(),
        responses = machine.total_responses(),
        "Calculated trait scores"
    );
    scores
}

/// Scores sorted by total, highest first. Ties keep taxonomy order.
pub fn rank(scores: &[TraitScore]) -> Vec<TraitScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::LexicalScorer;

    fn machine_with(skills: &[&str], passions: &[&str], values: &[&str]) -> StageMachine {
        let mut machine = StageMachine::new();
        machine.advance();
        for text in skills {
            machine.record_answer(text);
        }
        machine.advance();
        for text in passions {
            machine.record_answer(text);
        }
        machine.advance();
        for text in values {
            machine.record_answer(text);
        }
        machine
    }

    fn score_of(scores: &[TraitScore], category: TraitCategory) -> &TraitScore {
        scores.iter().find(|s| s.category == category).unwrap()
    }

    #[test]
    fn test_strength_label_thresholds() {
        assert_eq!(StrengthLabel::from_total(70.0), StrengthLabel::Dominant);
        assert_eq!(StrengthLabel::from_total(69.99), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_total(50.0), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_total(30.0), StrengthLabel::Moderate);
        assert_eq!(StrengthLabel::from_total(15.0), StrengthLabel::Emerging);
        assert_eq!(StrengthLabel::from_total(14.99), StrengthLabel::Low);
        assert!(StrengthLabel::Strong > StrengthLabel::Moderate);
    }

    #[test]
    fn test_empty_corpus_scores_zero_everywhere() {
        let machine = StageMachine::new();
        let scores = calculate_scores(&LexicalScorer, &machine);
        assert_eq!(scores.len(), TraitCategory::ALL.len());
        for score in &scores {
            assert_eq!(score.total, 0.0, "{}", score.category);
            assert_eq!(score.label, StrengthLabel::Low);
            assert_eq!(score.sub_scores, SubScores::default());
        }
    }

    #[test]
    fn test_teaching_signals_score_at_least_moderate() {
        let machine = machine_with(
            &["I love to teach and explain things to others, and I mentor new hires"],
            &["I love to learn, education matters"],
            &[],
        );
        let scores = calculate_scores(&LexicalScorer, &machine);
        let teaching = score_of(&scores, TraitCategory::Teaching);

        // 1 of 3 skills, 1 of 2 passions, no values, 3 of 4 markers.
        assert!((teaching.sub_scores.skills - 25.0 / 3.0).abs() < 1e-9);
        assert_eq!(teaching.sub_scores.passions, 12.5);
        assert_eq!(teaching.sub_scores.values, 0.0);
        assert_eq!(teaching.sub_scores.behavior, 18.75);
        assert_eq!(teaching.total, 39.6);
        assert!(teaching.total > 30.0);
        assert!(teaching.label >= StrengthLabel::Moderate);
    }

    #[test]
    fn test_values_sub_score_reads_values_stage_only() {
        // "truth" and "growth" appear, but only in the skills stage.
        let machine = machine_with(&["truth and growth"], &[], &["understanding matters"]);
        let scores = calculate_scores(&LexicalScorer, &machine);
        let teaching = score_of(&scores, TraitCategory::Teaching);
        assert_eq!(teaching.sub_scores.values, 6.25);
    }

    #[test]
    fn test_scores_are_idempotent() {
        let machine = machine_with(
            &["I organize teams and lead projects", "I analyze data"],
            &["I care about justice and people"],
            &["stewardship and vision guide me"],
        );
        let first = calculate_scores(&LexicalScorer, &machine);
        let second = calculate_scores(&LexicalScorer, &machine);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_orders_by_total_with_stable_ties() {
        let machine = StageMachine::new();
        let mut scores = calculate_scores(&LexicalScorer, &machine);
        scores[3].total = 10.0;
        let ranked = rank(&scores);
        assert_eq!(ranked[0].category, TraitCategory::Administration);
        assert_eq!(ranked[1].category, TraitCategory::Teaching);
        assert_eq!(ranked[2].category, TraitCategory::Leadership);
    }
}
