//! Coverage and pattern engine.
//!
//! Detects named behavioral patterns in the full answer corpus, tracks which
//! required topic areas the subject has not touched yet, and picks the next
//! question. Selection runs through a fixed ladder:
//!
//! 1. deep dive on a pattern from this pass with confidence >= 0.8 (priority 0.9)
//! 2. follow-up fired by phrasing in the last answer (0.7)
//! 3. first uncovered coverage area (0.6)
//! 4. synthesis once two historical patterns reach 0.7 (0.8)
//! 5. standard stage question (0.5)
//!
//! Synthesis carries a higher priority value than coverage but is checked
//! after it; the ladder order is what decides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::FOLLOW_UP_RULES;
use crate::signals::SignalScorer;
use crate::stage::Stage;

/// Deep dives fire at this confidence.
pub const DEEP_DIVE_CONFIDENCE: f64 = 0.8;
/// Historical patterns at this confidence count toward synthesis.
pub const SYNTHESIS_CONFIDENCE: f64 = 0.7;
/// Number of qualifying historical patterns needed for synthesis.
pub const SYNTHESIS_MIN_PATTERNS: usize = 2;
/// Hard cap on answers per stage while strong patterns keep a stage open.
pub const MAX_STAGE_RESPONSES: usize = 4;

const KEYWORD_TENTHS: u32 = 2;
const PHRASE_TENTHS: u32 = 3;
const MAX_TENTHS: u32 = 10;

const SYNTHESIS_QUESTION: &str = "Looking at what you've shared about your strengths and passions, where do you see the strongest connections?";
const FALLBACK_QUESTION: &str = "Tell me more about your experiences.";

// ---------------------------------------------------------------------------
// Coverage areas
// ---------------------------------------------------------------------------

/// A required topic the interview must address regardless of adaptive flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageArea {
    NaturalAbilities,
    EnergySources,
    CoreValues,
    ImpactDesires,
}

impl CoverageArea {
    pub const ALL: &'static [Self] = &[
        Self::NaturalAbilities,
        Self::EnergySources,
        Self::CoreValues,
        Self::ImpactDesires,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NaturalAbilities => "natural_abilities",
            Self::EnergySources => "energy_sources",
            Self::CoreValues => "core_values",
            Self::ImpactDesires => "impact_desires",
        }
    }

    /// Canonical questions, first one preferred.
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Self::NaturalAbilities => &[
                "What comes easily to you that others find difficult?",
                "What skills do people compliment you on most often?",
                "In what areas do others seek your help or advice?",
            ],
            Self::EnergySources => &[
                "What activities energize rather than drain you?",
                "When do you feel most alive and engaged?",
                "What would you do for free because you love it so much?",
            ],
            Self::CoreValues => &[
                "What principles guide your important decisions?",
                "What would you want to be remembered for?",
                "What injustices or problems motivate you to action?",
            ],
            Self::ImpactDesires => &[
                "How do you want to make a difference in the world?",
                "What legacy do you hope to leave?",
                "Who do you most want to help or serve?",
            ],
        }
    }

    /// Terms whose presence anywhere in the corpus marks the area covered.
    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            Self::NaturalAbilities => &["good at", "excel", "talented", "naturally", "easily"],
            Self::EnergySources => &["energizes", "love", "enjoy", "alive", "passionate"],
            Self::CoreValues => &["value", "important", "principle", "believe", "matters"],
            Self::ImpactDesires => &["difference", "change", "help", "impact", "legacy"],
        }
    }
}

impl fmt::Display for CoverageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Named behavioral signature detected from the whole corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    #[serde(rename = "strong_teaching_indicators")]
    TeachingStrength,
    LeadershipEmergence,
    ServiceOrientation,
    CreativeExpression,
    JusticePassion,
}

impl PatternKind {
    pub const ALL: &'static [Self] = &[
        Self::TeachingStrength,
        Self::LeadershipEmergence,
        Self::ServiceOrientation,
        Self::CreativeExpression,
        Self::JusticePassion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeachingStrength => "strong_teaching_indicators",
            Self::LeadershipEmergence => "leadership_emergence",
            Self::ServiceOrientation => "service_orientation",
            Self::CreativeExpression => "creative_expression",
            Self::JusticePassion => "justice_passion",
        }
    }

    /// Single-keyword triggers, worth 0.2 each.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::TeachingStrength => &[
                "teach",
                "explain",
                "mentor",
                "guide",
                "help others learn",
                "break down",
            ],
            Self::LeadershipEmergence => &[
                "lead",
                "organize",
                "vision",
                "inspire",
                "motivate others",
                "take charge",
            ],
            Self::ServiceOrientation => &[
                "serve",
                "help",
                "support",
                "care",
                "assist",
                "come alongside",
            ],
            Self::CreativeExpression => &[
                "create", "design", "artistic", "beauty", "express", "imagine",
            ],
            Self::JusticePassion => &[
                "justice", "fair", "equality", "advocate", "stand up", "rights",
            ],
        }
    }

    /// Multi-word phrase triggers, worth 0.3 each.
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            Self::TeachingStrength => &[
                "people come to me",
                "i love helping others understand",
                "explaining",
            ],
            Self::LeadershipEmergence => &["others follow", "i see the big picture", "rally people"],
            Self::ServiceOrientation => &[
                "behind the scenes",
                "prefer to support",
                "help others succeed",
            ],
            Self::CreativeExpression => &["creative outlet", "artistic expression", "beauty matters"],
            Self::JusticePassion => &["not fair", "speak up for", "injustice bothers me"],
        }
    }

    /// Emission threshold in tenths.
    fn threshold_tenths(&self) -> u32 {
        match self {
            Self::TeachingStrength | Self::LeadershipEmergence | Self::JusticePassion => 7,
            Self::ServiceOrientation | Self::CreativeExpression => 6,
        }
    }

    pub fn threshold(&self) -> f64 {
        f64::from(self.threshold_tenths()) / 10.0
    }

    /// What the pattern suggests exploring next.
    pub fn implications(&self) -> &'static [&'static str] {
        match self {
            Self::TeachingStrength => &[
                "Explore specific teaching experiences",
                "Ask about satisfaction from others learning",
                "Investigate formal vs informal teaching preferences",
            ],
            Self::LeadershipEmergence => &[
                "Explore vision-casting experiences",
                "Ask about team dynamics and motivation",
                "Investigate leadership style preferences",
            ],
            Self::ServiceOrientation => &[
                "Explore behind-the-scenes contributions",
                "Ask about satisfaction from supporting others",
                "Investigate preferred ways to help",
            ],
            Self::CreativeExpression => &[
                "Explore artistic outlets and mediums",
                "Ask about role of beauty in life",
                "Investigate creative problem-solving",
            ],
            Self::JusticePassion => &[
                "Explore specific justice issues that matter",
                "Ask about advocacy experiences",
                "Investigate ways they want to create change",
            ],
        }
    }

    /// Deep-dive templates, first one preferred.
    pub fn deep_dive_questions(&self) -> &'static [&'static str] {
        match self {
            Self::TeachingStrength => &[
                "You've mentioned teaching/explaining several times - can you tell me about a specific time when you helped someone understand something complex?",
                "It sounds like you have a natural teaching gift. What do you find most rewarding about helping others learn?",
                "When you're explaining something to someone, what approach do you naturally take?",
            ],
            Self::LeadershipEmergence => &[
                "I notice leadership themes in what you're sharing. Can you describe a time when you naturally took charge of a situation?",
                "What happens when you're in a group and no clear direction exists?",
                "How do you typically motivate or inspire others?",
            ],
            Self::ServiceOrientation => &[
                "You seem drawn to supporting and helping others. What's your favorite way to serve?",
                "Tell me about a time when you helped someone succeed - what was that like for you?",
                "Do you prefer to help from behind the scenes or more visibly?",
            ],
            Self::CreativeExpression => &[
                "Creativity keeps surfacing in your answers. What is a piece of work you made that still feels most like you?",
                "Where does beauty show up in the ordinary parts of your week?",
                "When a problem lands on your desk, how does your creative side shape the way you approach it?",
            ],
            Self::JusticePassion => &[
                "Fairness seems to matter a great deal to you. Can you tell me about a moment when you spoke up for someone?",
                "Which injustice would you most like to see changed in your lifetime?",
                "What does advocacy look like for you in everyday life?",
            ],
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pattern emitted by one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub confidence: f64,
    /// `Mentioned: <keyword>` and `Said: <phrase>` entries.
    pub evidence: Vec<String>,
    pub first_stage: Stage,
    pub implications: Vec<String>,
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Class of an adaptive question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Standard,
    FollowUp,
    DeepDive,
    Clarification,
    Synthesis,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FollowUp => "follow_up",
            Self::DeepDive => "deep_dive",
            Self::Clarification => "clarification",
            Self::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an adaptive question is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QuestionTarget {
    Pattern(PatternKind),
    Stage(Stage),
    Coverage(CoverageArea),
    PatternConnection,
}

impl fmt::Display for QuestionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(kind) => write!(f, "{kind}"),
            Self::Stage(stage) => write!(f, "{stage}"),
            Self::Coverage(area) => write!(f, "{area}"),
            Self::PatternConnection => f.write_str("pattern_connection"),
        }
    }
}

/// A question chosen by the engine, with why it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveQuestion {
    pub text: String,
    pub kind: QuestionKind,
    pub target: QuestionTarget,
    pub reasoning: String,
    pub priority: f64,
}

/// Fallback question for a stage when nothing adaptive applies.
pub fn standard_question(stage: Stage) -> &'static str {
    match stage {
        Stage::Introduction => "Tell me what brought you here to explore your gifts today?",
        Stage::SkillsAssessment => {
            "What's something you do that others find difficult but comes naturally to you?"
        }
        Stage::PassionExploration => {
            "What activities or causes make you feel most alive and engaged?"
        }
        Stage::ValuesClarification => {
            "What principles or values guide your most important decisions?"
        }
        Stage::Synthesis | Stage::Recommendations => FALLBACK_QUESTION,
    }
}

/// Minimum answers before a stage may close.
pub fn min_stage_responses(stage: Stage) -> usize {
    match stage {
        Stage::SkillsAssessment | Stage::PassionExploration => 2,
        Stage::Introduction
        | Stage::ValuesClarification
        | Stage::Synthesis
        | Stage::Recommendations => 1,
    }
}

/// Snapshot of engine state for progress displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestioningSummary {
    pub patterns_identified: usize,
    pub high_confidence_patterns: usize,
    pub questions_asked: usize,
    pub uncovered_areas: Vec<CoverageArea>,
}

/// Pattern history plus the question ladder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionEngine {
    history: Vec<Pattern>,
    asked: Vec<AdaptiveQuestion>,
}

impl QuestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pattern ever emitted, duplicates included.
    pub fn history(&self) -> &[Pattern] {
        &self.history
    }

    /// Every question the engine has returned, oldest first.
    pub fn asked(&self) -> &[AdaptiveQuestion] {
        &self.asked
    }

    /// Score every pattern over the corpus and append emitted ones to history.
    pub fn detect_patterns(
        &mut self,
        scorer: &dyn SignalScorer,
        corpus: &str,
        stage: Stage,
    ) -> Vec<Pattern> {
        let mut found = Vec::new();
        for kind in PatternKind::ALL {
            let keywords = scorer.matched(corpus, kind.keywords());
            let phrases = scorer.matched(corpus, kind.phrases());
            if keywords.is_empty() && phrases.is_empty() {
                continue;
            }

            let tenths = (keywords.len() as u32 * KEYWORD_TENTHS
                + phrases.len() as u32 * PHRASE_TENTHS)
                .min(MAX_TENTHS);
            if tenths < kind.threshold_tenths() {
                continue;
            }

            let evidence = keywords
                .iter()
                .map(|k| format!("Mentioned: {k}"))
                .chain(phrases.iter().map(|p| format!("Said: {p}")))
                .collect();
            let pattern = Pattern {
                kind: *kind,
                confidence: f64::from(tenths) / 10.0,
                evidence,
                first_stage: stage,
                implications: kind.implications().iter().map(|s| s.to_string()).collect(),
            };
            tracing::debug!(pattern = %kind, confidence = pattern.confidence, "Detected pattern");
            found.push(pattern);
        }

        self.history.extend(found.iter().cloned());
        found
    }

    /// Coverage areas with no indicator anywhere in the corpus, in
    /// declaration order.
    pub fn uncovered_areas(&self, scorer: &dyn SignalScorer, corpus: &str) -> Vec<CoverageArea> {
        CoverageArea::ALL
            .iter()
            .filter(|area| !scorer.any(corpus, area.indicators()))
            .copied()
            .collect()
    }

    /// Pick the next question; see the module docs for the ladder.
    pub fn next_question(
        &mut self,
        scorer: &dyn SignalScorer,
        corpus: &str,
        stage: Stage,
        last_answer: &str,
    ) -> AdaptiveQuestion {
        let patterns = self.detect_patterns(scorer, corpus, stage);
        let question = self.select(scorer, corpus, stage, last_answer, &patterns);
        tracing::debug!(
            kind = %question.kind,
            target = %question.target,
            priority = question.priority,
            "Selected next question"
        );
        self.asked.push(question.clone());
        question
    }

    fn select(
        &self,
        scorer: &dyn SignalScorer,
        corpus: &str,
        stage: Stage,
        last_answer: &str,
        patterns: &[Pattern],
    ) -> AdaptiveQuestion {
        if let Some(pattern) = patterns
            .iter()
            .find(|p| p.confidence >= DEEP_DIVE_CONFIDENCE)
        {
            return deep_dive_question(pattern);
        }

        if let Some(question) = follow_up_question(scorer, last_answer, stage) {
            return question;
        }

        if let Some(area) = self.uncovered_areas(scorer, corpus).into_iter().next() {
            return AdaptiveQuestion {
                text: area.questions()[0].to_string(),
                kind: QuestionKind::Standard,
                target: QuestionTarget::Coverage(area),
                reasoning: format!("Ensuring coverage of {area}"),
                priority: 0.6,
            };
        }

        let strong = self
            .history
            .iter()
            .filter(|p| p.confidence >= SYNTHESIS_CONFIDENCE)
            .count();
        if strong >= SYNTHESIS_MIN_PATTERNS {
            return AdaptiveQuestion {
                text: SYNTHESIS_QUESTION.to_string(),
                kind: QuestionKind::Synthesis,
                target: QuestionTarget::PatternConnection,
                reasoning: "Multiple strong patterns identified - time to synthesize".to_string(),
                priority: 0.8,
            };
        }

        AdaptiveQuestion {
            text: standard_question(stage).to_string(),
            kind: QuestionKind::Standard,
            target: QuestionTarget::Stage(stage),
            reasoning: "Standard stage question".to_string(),
            priority: 0.5,
        }
    }

    /// Whether the current stage should keep collecting answers.
    pub fn should_continue_stage(&self, stage: Stage, response_count: usize) -> bool {
        if response_count < min_stage_responses(stage) {
            return true;
        }
        self.has_strong_pattern() && response_count < MAX_STAGE_RESPONSES
    }

    /// Whether adaptive questions should keep driving the conversation rather
    /// than the scripted stage templates.
    pub fn should_continue_dynamic_flow(&self, scorer: &dyn SignalScorer, corpus: &str) -> bool {
        self.has_strong_pattern() || self.uncovered_areas(scorer, corpus).len() > 2
    }

    fn has_strong_pattern(&self) -> bool {
        self.history
            .iter()
            .any(|p| p.confidence >= DEEP_DIVE_CONFIDENCE)
    }

    pub fn summary(&self, scorer: &dyn SignalScorer, corpus: &str) -> QuestioningSummary {
        QuestioningSummary {
            patterns_identified: self.history.len(),
            high_confidence_patterns: self
                .history
                .iter()
                .filter(|p| p.confidence >= DEEP_DIVE_CONFIDENCE)
                .count(),
            questions_asked: self.asked.len(),
            uncovered_areas: self.uncovered_areas(scorer, corpus),
        }
    }
}

fn deep_dive_question(pattern: &Pattern) -> AdaptiveQuestion {
    AdaptiveQuestion {
        text: pattern.kind.deep_dive_questions()[0].to_string(),
        kind: QuestionKind::DeepDive,
        target: QuestionTarget::Pattern(pattern.kind),
        reasoning: format!(
            "Strong {} pattern detected (confidence: {:.2})",
            pattern.kind, pattern.confidence
        ),
        priority: 0.9,
    }
}

fn follow_up_question(
    scorer: &dyn SignalScorer,
    last_answer: &str,
    stage: Stage,
) -> Option<AdaptiveQuestion> {
    FOLLOW_UP_RULES
        .iter()
        .find(|rule| scorer.any(last_answer, rule.triggers))
        .map(|rule| AdaptiveQuestion {
            text: rule.question.to_string(),
            kind: QuestionKind::FollowUp,
            target: QuestionTarget::Stage(stage),
            reasoning: rule.reasoning.to_string(),
            priority: 0.7,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::LexicalScorer;

    const COVERS_ALL: &str = "I'm good at it, I enjoy it, it matters, it makes a difference.";

    #[test]
    fn test_detect_patterns_scores_keywords_and_phrases() {
        let mut engine = QuestionEngine::new();
        // teach, explain, mentor (0.6) + "explaining" phrase (0.3) = 0.9
        let patterns = engine.detect_patterns(
            &LexicalScorer,
            "i teach and mentor; explaining things is my joy",
            Stage::SkillsAssessment,
        );
        let teaching = patterns
            .iter()
            .find(|p| p.kind == PatternKind::TeachingStrength)
            .unwrap();
        assert_eq!(teaching.confidence, 0.9);
        assert_eq!(
            teaching.evidence,
            vec![
                "Mentioned: teach",
                "Mentioned: explain",
                "Mentioned: mentor",
                "Said: explaining"
            ]
        );
        assert_eq!(teaching.first_stage, Stage::SkillsAssessment);
        assert_eq!(teaching.implications.len(), 3);
    }

    #[test]
    fn test_detect_patterns_respects_thresholds() {
        let mut engine = QuestionEngine::new();
        // Service: serve, help, support = 0.6 >= 0.6 threshold.
        // Justice: justice, fair, rights = 0.6 < 0.7 threshold.
        let patterns = engine.detect_patterns(
            &LexicalScorer,
            "I serve, help and support; justice, fair play and rights",
            Stage::PassionExploration,
        );
        let kinds: Vec<PatternKind> = patterns.iter().map(|p| p.kind).collect();
        assert!(kinds.contains(&PatternKind::ServiceOrientation));
        assert!(!kinds.contains(&PatternKind::JusticePassion));
    }

    #[test]
    fn test_detect_patterns_caps_confidence() {
        let mut engine = QuestionEngine::new();
        let corpus = "teach explain mentor guide help others learn break down \
                      people come to me, i love helping others understand, explaining";
        let patterns = engine.detect_patterns(&LexicalScorer, corpus, Stage::SkillsAssessment);
        let teaching = patterns
            .iter()
            .find(|p| p.kind == PatternKind::TeachingStrength)
            .unwrap();
        assert_eq!(teaching.confidence, 1.0);
    }

    #[test]
    fn test_history_accumulates_duplicates() {
        let mut engine = QuestionEngine::new();
        let corpus = "I teach, mentor, guide and explain";
        engine.detect_patterns(&LexicalScorer, corpus, Stage::SkillsAssessment);
        engine.detect_patterns(&LexicalScorer, corpus, Stage::SkillsAssessment);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_deep_dive_beats_follow_up() {
        let mut engine = QuestionEngine::new();
        let corpus = "I teach, mentor, guide and explain";
        let question = engine.next_question(
            &LexicalScorer,
            corpus,
            Stage::SkillsAssessment,
            "I love it",
        );
        assert_eq!(question.kind, QuestionKind::DeepDive);
        assert_eq!(question.target, QuestionTarget::Pattern(PatternKind::TeachingStrength));
        assert_eq!(question.priority, 0.9);
        assert_eq!(engine.asked().len(), 1);
    }

    #[test]
    fn test_every_pattern_has_a_deep_dive() {
        for kind in PatternKind::ALL {
            assert!(!kind.deep_dive_questions().is_empty());
        }
    }

    #[test]
    fn test_follow_up_rules_in_declaration_order() {
        let mut engine = QuestionEngine::new();
        // Matches both the difficulty rule and the initiative rule.
        let answer = "I started a club even though it was difficult";
        let question = engine.next_question(
            &LexicalScorer,
            answer,
            Stage::PassionExploration,
            answer,
        );
        assert_eq!(question.kind, QuestionKind::FollowUp);
        assert_eq!(
            question.text,
            "Even though it's challenging, what draws you to persist with it?"
        );
        assert_eq!(question.priority, 0.7);
    }

    #[test]
    fn test_coverage_question_for_first_uncovered_area() {
        let mut engine = QuestionEngine::new();
        // Covers natural abilities only.
        let corpus = "I am good at fixing bikes";
        let question = engine.next_question(&LexicalScorer, corpus, Stage::Introduction, corpus);
        assert_eq!(question.kind, QuestionKind::Standard);
        assert_eq!(question.target, QuestionTarget::Coverage(CoverageArea::EnergySources));
        assert_eq!(question.text, "What activities energize rather than drain you?");
        assert_eq!(question.priority, 0.6);
    }

    #[test]
    fn test_uncovered_area_persists_until_indicator_appears() {
        let mut engine = QuestionEngine::new();
        let mut corpus = String::from("I am good at puzzles and I enjoy them");
        for _ in 0..3 {
            let uncovered = engine.uncovered_areas(&LexicalScorer, &corpus);
            assert!(uncovered.contains(&CoverageArea::CoreValues));
            let question =
                engine.next_question(&LexicalScorer, &corpus, Stage::SkillsAssessment, "ok");
            assert_eq!(question.target, QuestionTarget::Coverage(CoverageArea::CoreValues));
        }
        corpus.push_str(" Honesty is important");
        let uncovered = engine.uncovered_areas(&LexicalScorer, &corpus);
        assert!(!uncovered.contains(&CoverageArea::CoreValues));
        assert_eq!(uncovered, vec![CoverageArea::ImpactDesires]);
    }

    #[test]
    fn test_synthesis_after_coverage_complete() {
        let mut engine = QuestionEngine::new();
        // Two detection passes each emitting a 0.7 leadership pattern
        // (lead, organize + "others follow").
        let strong = "I lead and organize, and others follow";
        engine.detect_patterns(&LexicalScorer, strong, Stage::SkillsAssessment);
        engine.detect_patterns(&LexicalScorer, strong, Stage::SkillsAssessment);

        let question = engine.next_question(
            &LexicalScorer,
            COVERS_ALL,
            Stage::ValuesClarification,
            "ok",
        );
        assert_eq!(question.kind, QuestionKind::Synthesis);
        assert_eq!(question.target, QuestionTarget::PatternConnection);
        assert_eq!(question.priority, 0.8);
    }

    #[test]
    fn test_coverage_checked_before_synthesis() {
        let mut engine = QuestionEngine::new();
        let strong = "I lead and organize, and others follow";
        engine.detect_patterns(&LexicalScorer, strong, Stage::SkillsAssessment);
        engine.detect_patterns(&LexicalScorer, strong, Stage::SkillsAssessment);

        // Nothing in this corpus covers any area.
        let question = engine.next_question(&LexicalScorer, "hmm", Stage::Synthesis, "hmm");
        assert_eq!(question.kind, QuestionKind::Standard);
        assert_eq!(
            question.target,
            QuestionTarget::Coverage(CoverageArea::NaturalAbilities)
        );
    }

    #[test]
    fn test_standard_fallback() {
        let mut engine = QuestionEngine::new();
        let question =
            engine.next_question(&LexicalScorer, COVERS_ALL, Stage::PassionExploration, "ok");
        assert_eq!(question.kind, QuestionKind::Standard);
        assert_eq!(question.target, QuestionTarget::Stage(Stage::PassionExploration));
        assert_eq!(question.priority, 0.5);

        let question = engine.next_question(&LexicalScorer, COVERS_ALL, Stage::Recommendations, "ok");
        assert_eq!(question.text, "Tell me more about your experiences.");
    }

    #[test]
    fn test_should_continue_stage() {
        let mut engine = QuestionEngine::new();
        assert!(engine.should_continue_stage(Stage::SkillsAssessment, 1));
        assert!(!engine.should_continue_stage(Stage::SkillsAssessment, 2));
        assert!(!engine.should_continue_stage(Stage::Introduction, 1));

        engine.detect_patterns(
            &LexicalScorer,
            "I teach, mentor, guide and explain",
            Stage::SkillsAssessment,
        );
        assert!(engine.should_continue_stage(Stage::SkillsAssessment, 3));
        assert!(!engine.should_continue_stage(Stage::SkillsAssessment, 4));
    }

    #[test]
    fn test_should_continue_dynamic_flow() {
        let engine = QuestionEngine::new();
        assert!(engine.should_continue_dynamic_flow(&LexicalScorer, "hmm"));
        assert!(!engine.should_continue_dynamic_flow(&LexicalScorer, COVERS_ALL));
    }

    #[test]
    fn test_pattern_kind_serialized_name() {
        let json = serde_json::to_string(&PatternKind::TeachingStrength).unwrap();
        assert_eq!(json, "\"strong_teaching_indicators\"");
        let json = serde_json::to_string(&PatternKind::JusticePassion).unwrap();
        assert_eq!(json, "\"justice_passion\"");
    }
}
