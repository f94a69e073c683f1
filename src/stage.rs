//! Stage state machine.
//!
//! The interview runs through a fixed, ordered list of stages. The machine
//! owns every answer the subject gives, grouped by the stage it was given in,
//! and only ever moves forward: the stage index never decreases and the only
//! way past a stage is an explicit [`StageMachine::advance`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// One ordered phase of the guided interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Introduction,
    SkillsAssessment,
    PassionExploration,
    ValuesClarification,
    Synthesis,
    Recommendations,
}

impl Stage {
    pub const ALL: &'static [Self] = &[
        Self::Introduction,
        Self::SkillsAssessment,
        Self::PassionExploration,
        Self::ValuesClarification,
        Self::Synthesis,
        Self::Recommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::SkillsAssessment => "skills_assessment",
            Self::PassionExploration => "passion_exploration",
            Self::ValuesClarification => "values_clarification",
            Self::Synthesis => "synthesis",
            Self::Recommendations => "recommendations",
        }
    }

    /// Human-readable name, e.g. "Skills Assessment".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::SkillsAssessment => "Skills Assessment",
            Self::PassionExploration => "Passion Exploration",
            Self::ValuesClarification => "Values Clarification",
            Self::Synthesis => "Synthesis",
            Self::Recommendations => "Recommendations",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Introduction => 0,
            Self::SkillsAssessment => 1,
            Self::PassionExploration => 2,
            Self::ValuesClarification => 3,
            Self::Synthesis => 4,
            Self::Recommendations => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Scripted questions asked in order while the stage is current.
    pub fn question_templates(&self) -> &'static [&'static str] {
        match self {
            Self::Introduction => &[
                "Hello! I'm excited to guide you on this journey of self-discovery. What's your name, and what drew you to explore your gifts and passions today?",
                "Tell me a bit about yourself - what brings you joy in your daily life?",
                "Have you ever taken any personality or strengths assessments before? What did you learn?",
            ],
            Self::SkillsAssessment => &[
                "Let's explore your natural talents. What activities do you find yourself excelling at with minimal effort?",
                "Think about compliments you often receive from others. What strengths do people frequently notice in you?",
                "What skills have you developed over the years that others come to you for help with?",
                "In what areas do you feel confident teaching or mentoring others?",
            ],
            Self::PassionExploration => &[
                "What activities make you lose track of time because you're so engaged?",
                "When you daydream about your ideal life, what are you doing?",
                "What causes or issues in the world stir something deep within you?",
                "Think of a time when you felt most alive and energized. What were you doing?",
            ],
            Self::ValuesClarification => &[
                "What principles or values guide your most important decisions?",
                "What would you want to be remembered for at the end of your life?",
                "What injustices or problems in the world motivate you to take action?",
                "What does 'making a difference' mean to you personally?",
            ],
            Self::Synthesis => &[
                "Looking at what we've discussed about your skills and passions, where do you see the strongest overlap?",
                "What patterns do you notice emerging from our conversation?",
                "If you could design a role that combines your best skills with your deepest passions, what would it look like?",
            ],
            Self::Recommendations => &[
                "Based on our journey together, I'd like to offer some insights about your gifts. Are you ready to explore these discoveries?",
                "What resonates most strongly with you from what we've uncovered?",
                "How might you begin to explore or develop these gifts further?",
            ],
        }
    }

    /// Steering text handed to the generation collaborator for this stage.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Introduction => "Build rapport and understand their motivation for discovery",
            Self::SkillsAssessment => "Help identify natural talents and developed abilities",
            Self::PassionExploration => "Uncover what truly energizes and motivates them",
            Self::ValuesClarification => "Explore core beliefs and decision-making drivers",
            Self::Synthesis => "Help connect patterns between skills, passions, and values",
            Self::Recommendations => "Provide insights about their gifts based on all information",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one subject turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub stage: Stage,
    /// Position across the whole session, starting at 0.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// Completion flag and answers for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub completed: bool,
    pub answers: Vec<Answer>,
}

/// Forward-only interview state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMachine {
    index: usize,
    stages: Vec<StageRecord>,
    next_sequence: u64,
}

impl Default for StageMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StageMachine {
    pub fn new() -> Self {
        Self {
            index: 0,
            stages: vec![StageRecord::default(); Stage::ALL.len()],
            next_sequence: 0,
        }
    }

    /// Current stage, or `None` once every stage is complete.
    pub fn current_stage(&self) -> Option<Stage> {
        Stage::from_index(self.index)
    }

    pub fn is_complete(&self) -> bool {
        self.index >= Stage::ALL.len()
    }

    /// Raw stage index; equals the stage count in the terminal state.
    pub fn stage_index(&self) -> usize {
        self.index
    }

    /// Next unused scripted question, advancing past exhausted stages.
    ///
    /// Returns `None` when every stage is exhausted.
    pub fn next_question(&mut self) -> Option<&'static str> {
        loop {
            let stage = self.current_stage()?;
            let asked = self.response_count(stage);
            match stage.question_templates().get(asked) {
                Some(question) => return Some(question),
                None => {
                    tracing::debug!(stage = %stage, "Question templates exhausted");
                    self.advance();
                }
            }
        }
    }

    /// Record a subject answer in the current stage.
    ///
    /// Returns `None` (not accepted) in the terminal state or for blank text.
    pub fn record_answer(&mut self, text: &str) -> Option<&Answer> {
        let stage = self.current_stage()?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let answer = Answer {
            text: text.to_string(),
            stage,
            sequence: self.next_sequence,
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;

        let record = &mut self.stages[stage.index()];
        record.answers.push(answer);
        record.answers.last()
    }

    /// Mark the current stage complete and move to the next one.
    ///
    /// No-op in the terminal state.
    pub fn advance(&mut self) {
        let Some(stage) = self.current_stage() else {
            return;
        };
        self.stages[stage.index()].completed = true;
        self.index += 1;
        match self.current_stage() {
            Some(next) => tracing::info!(from = %stage, to = %next, "Advanced interview stage"),
            None => tracing::info!(from = %stage, "Interview complete"),
        }
    }

    pub fn response_count(&self, stage: Stage) -> usize {
        self.stages[stage.index()].answers.len()
    }

    pub fn stage_completed(&self, stage: Stage) -> bool {
        self.stages[stage.index()].completed
    }

    pub fn answers(&self, stage: Stage) -> &[Answer] {
        &self.stages[stage.index()].answers
    }

    /// Every answer in stage order, then sequence order.
    pub fn all_answers(&self) -> impl Iterator<Item = &Answer> {
        self.stages.iter().flat_map(|s| s.answers.iter())
    }

    pub fn total_responses(&self) -> usize {
        self.stages.iter().map(|s| s.answers.len()).sum()
    }

    /// All answer texts joined by a single space.
    pub fn corpus(&self) -> String {
        self.all_answers()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Answer texts of one stage joined by a single space.
    pub fn stage_corpus(&self, stage: Stage) -> String {
        self.answers(stage)
            .iter()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Share of stages passed, 0-100.
    pub fn completion_percent(&self) -> f64 {
        self.index as f64 / Stage::ALL.len() as f64 * 100.0
    }

    /// Check structural consistency of a deserialized machine.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.stages.len() != Stage::ALL.len() {
            return Err(SessionError::Invalid(format!(
                "expected {} stages, found {}",
                Stage::ALL.len(),
                self.stages.len()
            )));
        }
        if self.index > Stage::ALL.len() {
            return Err(SessionError::Invalid(format!(
                "stage index {} out of range",
                self.index
            )));
        }
        for (position, (stage, record)) in Stage::ALL.iter().zip(&self.stages).enumerate() {
            if position < self.index && !record.completed {
                return Err(SessionError::Invalid(format!(
                    "stage {stage} is behind the cursor but not completed"
                )));
            }
            if position >= self.index && record.completed {
                return Err(SessionError::Invalid(format!(
                    "stage {stage} is completed ahead of the cursor"
                )));
            }
            if let Some(stray) = record.answers.iter().find(|a| a.stage != *stage) {
                return Err(SessionError::Invalid(format!(
                    "answer {} filed under {stage} belongs to {}",
                    stray.sequence, stray.stage
                )));
            }
        }
        if let Some(max) = self.all_answers().map(|a| a.sequence).max()
            && max >= self.next_sequence
        {
            return Err(SessionError::Invalid(format!(
                "answer sequence {max} not below next sequence {}",
                self.next_sequence
            )));
        }
        Ok(())
    }
}
