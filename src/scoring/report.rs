//! Assessment report built from trait scores.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    CategoryAnalysis, StrengthLabel, TOP_CATEGORIES, TraitCategory, TraitScore, analyze_passions,
    analyze_skills, rank, round_tenth, score_with,
};
use crate::lexicon::{PassionCategory, SkillCategory};
use crate::signals::SignalScorer;
use crate::stage::{Stage, StageMachine};
use crate::util::title_case;

const OVERLAP_POINTS: f64 = 20.0;
const OVERLAP_CAP: f64 = 60.0;
const CATEGORY_POINTS: f64 = 10.0;
const CATEGORY_CAP: f64 = 40.0;

/// A top skill and a top passion that both point at the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub skill: SkillCategory,
    pub passion: PassionCategory,
    pub category: TraitCategory,
}

/// Every skill x passion pair shared with a category's profile, in taxonomy
/// order.
pub fn find_overlaps(skills: &[SkillCategory], passions: &[PassionCategory]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    for category in TraitCategory::ALL {
        let profile = category.profile();
        for skill in profile.skills.iter().filter(|s| skills.contains(s)) {
            for passion in profile.passions.iter().filter(|p| passions.contains(p)) {
                overlaps.push(Overlap {
                    skill: *skill,
                    passion: *passion,
                    category: *category,
                });
            }
        }
    }
    overlaps
}

/// 20 points per overlap (max 60) plus 10 per distinct category (max 40).
pub fn alignment_score(overlaps: &[Overlap]) -> f64 {
    let mut categories: Vec<TraitCategory> = overlaps.iter().map(|o| o.category).collect();
    categories.dedup();
    let overlap_points = (overlaps.len() as f64 * OVERLAP_POINTS).min(OVERLAP_CAP);
    let category_points = (categories.len() as f64 * CATEGORY_POINTS).min(CATEGORY_CAP);
    (overlap_points + category_points).min(100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResponseSummary {
    pub stage: Stage,
    pub response_count: usize,
    pub sample: String,
}

/// Complete assessment of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// In taxonomy order.
    pub scores: Vec<TraitScore>,
    /// By total, highest first.
    pub ranked: Vec<TraitCategory>,
    pub top: Vec<TraitScore>,
    /// Categories labelled Strong or Dominant, in ranking order.
    pub dominant: Vec<TraitCategory>,
    pub readiness: f64,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub responses: Vec<StageResponseSummary>,
    pub skills: CategoryAnalysis<SkillCategory>,
    pub passions: CategoryAnalysis<PassionCategory>,
    pub overlaps: Vec<Overlap>,
    pub alignment: f64,
}

impl Assessment {
    pub fn from_machine(scorer: &dyn SignalScorer, machine: &StageMachine) -> Self {
        let skills = analyze_skills(scorer, machine);
        let passions = analyze_passions(scorer, machine);
        let scores = score_with(scorer, machine, &skills.top, &passions.top);

        let ranked_scores = rank(&scores);
        let top: Vec<TraitScore> = ranked_scores.iter().take(TOP_CATEGORIES).cloned().collect();
        let dominant = ranked_scores
            .iter()
            .filter(|s| s.label >= StrengthLabel::Strong)
            .map(|s| s.category)
            .collect();
        let readiness = if top.is_empty() {
            0.0
        } else {
            round_tenth(top.iter().map(|s| s.total).sum::<f64>() / top.len() as f64)
        };

        let overlaps = find_overlaps(&skills.top, &passions.top);
        let alignment = alignment_score(&overlaps);

        let responses = Stage::ALL
            .iter()
            .filter_map(|stage| {
                let answers = machine.answers(*stage);
                answers.first().map(|first| StageResponseSummary {
                    stage: *stage,
                    response_count: answers.len(),
                    sample: first.text.clone(),
                })
            })
            .collect();

        let assessment = Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            ranked: ranked_scores.iter().map(|s| s.category).collect(),
            recommendations: recommendations(&top, readiness),
            next_steps: next_steps(&top),
            scores,
            top,
            dominant,
            readiness,
            responses,
            skills,
            passions,
            overlaps,
            alignment,
        };
        tracing::info!(
            id = %assessment.id,
            readiness = assessment.readiness,
            top = ?assessment.ranked.first(),
            "Generated assessment"
        );
        assessment
    }

    pub fn score(&self, category: TraitCategory) -> Option<&TraitScore> {
        self.scores.iter().find(|s| s.category == category)
    }

    /// Human-readable report.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Strengths Assessment");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Generated {} (id `{}`)",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            self.id
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "**Readiness:** {:.1}/100", self.readiness);
        let _ = writeln!(out, "**Skill/passion alignment:** {:.0}/100", self.alignment);
        let _ = writeln!(out);

        let _ = writeln!(out, "## Top categories");
        let _ = writeln!(out);
        for (i, score) in self.top.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** {:.1} ({}): {}",
                i + 1,
                title_case(score.category.as_str()),
                score.total,
                score.label,
                score.category.profile().description
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## All scores");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "| Category | Total | Skills | Passions | Values | Behavior | Strength |"
        );
        let _ = writeln!(out, "|---|---|---|---|---|---|---|");
        for category in &self.ranked {
            if let Some(s) = self.score(*category) {
                let _ = writeln!(
                    out,
                    "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {} |",
                    title_case(category.as_str()),
                    s.total,
                    s.sub_scores.skills,
                    s.sub_scores.passions,
                    s.sub_scores.values,
                    s.sub_scores.behavior,
                    s.label
                );
            }
        }
        let _ = writeln!(out);

        if !self.skills.top.is_empty() || !self.passions.top.is_empty() {
            let _ = writeln!(out, "## Skills and passions");
            let _ = writeln!(out);
            let skills: Vec<String> = self.skills.top.iter().map(|s| s.to_string()).collect();
            let passions: Vec<String> = self.passions.top.iter().map(|p| p.to_string()).collect();
            if !skills.is_empty() {
                let _ = writeln!(out, "- Strongest skills: {}", skills.join(", "));
            }
            if !passions.is_empty() {
                let _ = writeln!(out, "- Core passions: {}", passions.join(", "));
            }
            for overlap in &self.overlaps {
                let _ = writeln!(
                    out,
                    "- {} + {} point toward {}",
                    overlap.skill, overlap.passion, overlap.category
                );
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "## Recommendations");
        let _ = writeln!(out);
        for rec in &self.recommendations {
            let _ = writeln!(out, "- {rec}");
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## Next steps");
        let _ = writeln!(out);
        for step in &self.next_steps {
            let _ = writeln!(out, "- {step}");
        }
        out
    }
}

fn recommendations(top: &[TraitScore], readiness: f64) -> Vec<String> {
    let mut recs = Vec::new();
    if readiness >= 60.0 {
        recs.push(
            "You show strong clarity in your gifts! Consider seeking opportunities to use these gifts more actively."
                .to_string(),
        );
    }
    if readiness >= 40.0 {
        recs.push(
            "You have good awareness of your gifts. Focus on developing your top 1-2 gifts through practice and mentorship."
                .to_string(),
        );
    } else {
        recs.push(
            "Continue exploring your gifts through various experiences and feedback from others."
                .to_string(),
        );
    }

    for score in top.iter().filter(|s| s.label >= StrengthLabel::Strong) {
        if let Some(expression) = score.category.profile().expressions.first() {
            recs.push(format!(
                "For your {} gift, consider: {}",
                score.category,
                expression.to_lowercase()
            ));
        }
    }
    recs
}

fn next_steps(top: &[TraitScore]) -> Vec<String> {
    let mut steps = Vec::new();
    if let Some(primary) = top.first() {
        let name = primary.category;
        steps.push(format!("Find a mentor who demonstrates the {name} gift well"));
        steps.push(format!(
            "Look for opportunities to practice {name} in low-risk environments"
        ));
        steps.push(
            "Seek feedback from trusted friends about how they see these gifts in you".to_string(),
        );
    }
    steps.push("Keep a journal of when you feel most energized and effective".to_string());
    steps.push(
        "Continue learning about gifts through books, assessments, or courses".to_string(),
    );
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::LexicalScorer;

    #[test]
    fn test_find_overlaps_per_category() {
        let overlaps = find_overlaps(
            &[SkillCategory::Teaching, SkillCategory::Communication],
            &[PassionCategory::Learning],
        );
        // Only teaching lists the learning passion.
        assert_eq!(
            overlaps,
            vec![
                Overlap {
                    skill: SkillCategory::Teaching,
                    passion: PassionCategory::Learning,
                    category: TraitCategory::Teaching,
                },
                Overlap {
                    skill: SkillCategory::Communication,
                    passion: PassionCategory::Learning,
                    category: TraitCategory::Teaching,
                },
            ]
        );
        assert_eq!(alignment_score(&overlaps), 50.0);
    }

    #[test]
    fn test_alignment_score_caps() {
        let overlaps = find_overlaps(
            &[
                SkillCategory::Communication,
                SkillCategory::Helping,
                SkillCategory::Administrative,
            ],
            &[
                PassionCategory::People,
                PassionCategory::Service,
                PassionCategory::Justice,
            ],
        );
        assert!(overlaps.len() > 3);
        assert_eq!(alignment_score(&overlaps), 100.0);
        assert_eq!(alignment_score(&[]), 0.0);
    }

    #[test]
    fn test_empty_session_assessment() {
        let machine = StageMachine::new();
        let assessment = Assessment::from_machine(&LexicalScorer, &machine);
        assert_eq!(assessment.readiness, 0.0);
        assert!(assessment.dominant.is_empty());
        assert_eq!(assessment.top.len(), 3);
        assert_eq!(assessment.top[0].category, TraitCategory::Teaching);
        assert_eq!(
            assessment.recommendations,
            vec![
                "Continue exploring your gifts through various experiences and feedback from others."
            ]
        );
        assert_eq!(assessment.next_steps.len(), 5);
        assert_eq!(
            assessment.next_steps[0],
            "Find a mentor who demonstrates the teaching gift well"
        );
        assert!(assessment.responses.is_empty());
        assert_eq!(assessment.alignment, 0.0);
    }

    #[test]
    fn test_strong_category_gets_expression_recommendation() {
        let mut machine = StageMachine::new();
        machine.record_answer("Others seek me out to explain things.");
        machine.advance();
        machine.record_answer("I teach, I write and I analyze and research.");
        machine.advance();
        machine.record_answer("I love to learn; people and growth in knowledge.");
        machine.advance();
        machine.record_answer("Truth, growth, education and understanding.");

        let assessment = Assessment::from_machine(&LexicalScorer, &machine);
        let teaching = assessment.score(TraitCategory::Teaching).unwrap();
        assert_eq!(teaching.label, StrengthLabel::Dominant);
        assert_eq!(assessment.ranked[0], TraitCategory::Teaching);
        assert!(assessment.dominant.contains(&TraitCategory::Teaching));
        assert!(
            assessment
                .recommendations
                .contains(&"For your teaching gift, consider: formal teaching or training".to_string())
        );
        assert_eq!(assessment.responses.len(), 4);
        assert_eq!(assessment.responses[1].stage, Stage::SkillsAssessment);

        let markdown = assessment.to_markdown();
        assert!(markdown.contains("# Strengths Assessment"));
        assert!(markdown.contains("**Teaching**"));
        assert!(markdown.contains("- Strongest skills: analytical, teaching, communication"));
    }

    #[test]
    fn test_assessment_serializes_to_json() {
        let machine = StageMachine::new();
        let assessment = Assessment::from_machine(&LexicalScorer, &machine);
        let value = serde_json::to_value(&assessment).unwrap();
        assert_eq!(value["scores"].as_array().map(Vec::len), Some(8));
        assert_eq!(value["scores"][0]["label"], "Low");
        assert_eq!(value["scores"][0]["category"], "teaching");
    }
}
