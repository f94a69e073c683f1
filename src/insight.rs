//! Insight and theme tracking.
//!
//! The tracker keeps the session's conversational memory:
//! - an append-only log of [`Insight`]s, single high-confidence signals pulled
//!   from one answer;
//! - [`Theme`]s, categories that recur across answers and only ever grow
//!   stronger (up to a ceiling);
//! - a windowed log of recent [`Exchange`]s used to build prompt context.
//!
//! Only the exchange log is windowed. Insights and themes are kept in full.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::lexicon::{InsightKind, LexicalCategory, ThemeKind};
use crate::signals::{SignalScorer, first_signal};
use crate::stage::Stage;
use crate::util::{title_case, truncate_chars};

/// Minimum micro-signal confidence for an insight to be kept.
pub const INSIGHT_THRESHOLD: f64 = 0.6;
/// Insights at or above this confidence are surfaced in prompt context.
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Default number of exchanges kept in the log.
pub const DEFAULT_EXCHANGE_WINDOW: usize = 8;

pub const THEME_INITIAL_STRENGTH: f64 = 1.0;
pub const THEME_INCREMENT: f64 = 0.5;
pub const THEME_CEILING: f64 = 5.0;
/// Themes at or above this strength count as emerging.
pub const STRONG_THEME: f64 = 2.0;

const DEEP_DIVE_STRENGTH: f64 = 2.5;
const DEEP_DIVE_EVIDENCE: usize = 3;
const CONTEXT_INSIGHTS: usize = 3;
const CONTEXT_THEMES: usize = 3;
const CONTEXT_EXCHANGES: usize = 3;
const INSIGHT_EXCERPT_CHARS: usize = 100;
const RESPONSE_EXCERPT_CHARS: usize = 150;

/// A single high-confidence behavioral signal extracted from one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub content: String,
    pub stage: Stage,
    pub confidence: f64,
    pub kind: InsightKind,
    pub timestamp: DateTime<Utc>,
}

/// A recurring category of signal, strengthened across answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub kind: ThemeKind,
    /// Source texts, oldest first.
    pub evidence: Vec<String>,
    pub strength: f64,
    pub first_stage: Stage,
}

/// One subject/guide turn pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: u64,
    pub stage: Stage,
    pub subject_text: String,
    pub generated_text: String,
    pub timestamp: DateTime<Utc>,
}

/// What one call to [`ConversationTracker::record_exchange`] produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedSignals {
    pub insights: Vec<Insight>,
    pub themes: Vec<ThemeKind>,
}

/// Per-theme entry of [`ConversationSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSummary {
    pub kind: ThemeKind,
    pub strength: f64,
    pub evidence_count: usize,
}

/// Snapshot of tracker state for progress displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    /// Exchanges currently held in the window.
    pub windowed_exchanges: usize,
    pub total_exchanges: u64,
    pub current_stage: Option<Stage>,
    pub insights_count: usize,
    pub high_confidence_insights: usize,
    pub themes: Vec<ThemeSummary>,
}

/// Session-wide insight, theme and exchange memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTracker {
    insights: Vec<Insight>,
    /// In order of first appearance.
    themes: Vec<Theme>,
    exchanges: VecDeque<Exchange>,
    window: usize,
    total_exchanges: u64,
    current_stage: Option<Stage>,
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE_WINDOW)
    }
}

impl ConversationTracker {
    pub fn new(window: usize) -> Self {
        Self {
            insights: Vec::new(),
            themes: Vec::new(),
            exchanges: VecDeque::new(),
            window: window.max(1),
            total_exchanges: 0,
            current_stage: None,
        }
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn theme(&self, kind: ThemeKind) -> Option<&Theme> {
        self.themes.iter().find(|t| t.kind == kind)
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record a turn pair and mine the subject text for insights and themes.
    pub fn record_exchange(
        &mut self,
        scorer: &dyn SignalScorer,
        subject_text: &str,
        generated_text: &str,
        stage: Stage,
    ) -> RecordedSignals {
        let now = Utc::now();
        self.exchanges.push_back(Exchange {
            id: self.total_exchanges,
            stage,
            subject_text: subject_text.to_string(),
            generated_text: generated_text.to_string(),
            timestamp: now,
        });
        self.total_exchanges += 1;
        self.current_stage = Some(stage);

        let recorded = RecordedSignals {
            insights: self.extract_insights(scorer, subject_text, stage, now),
            themes: self.update_themes(scorer, subject_text, stage),
        };

        while self.exchanges.len() > self.window {
            self.exchanges.pop_front();
        }

        recorded
    }

    fn extract_insights(
        &mut self,
        scorer: &dyn SignalScorer,
        text: &str,
        stage: Stage,
        timestamp: DateTime<Utc>,
    ) -> Vec<Insight> {
        let mut found = Vec::new();
        for kind in InsightKind::ALL {
            let Some((phrase, confidence)) = first_signal(scorer, text, kind.signals()) else {
                continue;
            };
            if confidence < INSIGHT_THRESHOLD {
                continue;
            }
            tracing::debug!(kind = %kind, phrase, confidence, "Recorded insight");
            let insight = Insight {
                content: text.to_string(),
                stage,
                confidence,
                kind: *kind,
                timestamp,
            };
            self.insights.push(insight.clone());
            found.push(insight);
        }
        found
    }

    fn update_themes(
        &mut self,
        scorer: &dyn SignalScorer,
        text: &str,
        stage: Stage,
    ) -> Vec<ThemeKind> {
        let mut touched = Vec::new();
        for kind in ThemeKind::ALL {
            if !scorer.any(text, kind.terms()) {
                continue;
            }
            match self.themes.iter_mut().find(|t| t.kind == *kind) {
                Some(theme) => {
                    theme.evidence.push(text.to_string());
                    theme.strength = (theme.strength + THEME_INCREMENT).min(THEME_CEILING);
                    tracing::debug!(theme = %kind, strength = theme.strength, "Strengthened theme");
                }
                None => {
                    self.themes.push(Theme {
                        kind: *kind,
                        evidence: vec![text.to_string()],
                        strength: THEME_INITIAL_STRENGTH,
                        first_stage: stage,
                    });
                    tracing::debug!(theme = %kind, "New theme");
                }
            }
            touched.push(*kind);
        }
        touched
    }

    /// Themes at or above `min_strength`, strongest first. Ties keep order of
    /// first appearance.
    pub fn ranked_themes(&self, min_strength: f64) -> Vec<&Theme> {
        let mut ranked: Vec<&Theme> = self
            .themes
            .iter()
            .filter(|t| t.strength >= min_strength)
            .collect();
        ranked.sort_by(|a, b| {
            b.strength
                .partial_cmp(&a.strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Strongest theme; the earliest one wins a tie.
    pub fn strongest_theme(&self) -> Option<&Theme> {
        self.themes.iter().fold(None, |best: Option<&Theme>, theme| match best {
            Some(b) if b.strength >= theme.strength => Some(b),
            _ => Some(theme),
        })
    }

    /// Advisory context block for the generation collaborator.
    pub fn build_context(&self, current_input: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::new();

        let high: Vec<&Insight> = self
            .insights
            .iter()
            .filter(|i| i.confidence >= HIGH_CONFIDENCE)
            .collect();
        if !high.is_empty() {
            parts.push("KEY INSIGHTS DISCOVERED:".to_string());
            let skip = high.len().saturating_sub(CONTEXT_INSIGHTS);
            for insight in &high[skip..] {
                parts.push(format!(
                    "  • {}: {}...",
                    insight.stage,
                    truncate_chars(&insight.content, INSIGHT_EXCERPT_CHARS)
                ));
            }
        }

        let strong = self.ranked_themes(STRONG_THEME);
        if !strong.is_empty() {
            parts.push("\nEMERGING THEMES:".to_string());
            for theme in strong.into_iter().take(CONTEXT_THEMES) {
                parts.push(format!(
                    "  • {}: Mentioned {} times (strength: {:.1})",
                    title_case(theme.kind.as_str()),
                    theme.evidence.len(),
                    theme.strength
                ));
            }
        }

        parts.push("\nRECENT CONVERSATION:".to_string());
        let skip = self.exchanges.len().saturating_sub(CONTEXT_EXCHANGES);
        for exchange in self.exchanges.iter().skip(skip) {
            parts.push(format!("  User: {}", exchange.subject_text));
            parts.push(format!(
                "  Guide: {}...",
                truncate_chars(&exchange.generated_text, RESPONSE_EXCERPT_CHARS)
            ));
        }

        if let Some(input) = current_input.filter(|i| !i.trim().is_empty()) {
            parts.push(format!("\nCURRENT USER INPUT: {input}"));
        }

        parts.join("\n")
    }

    /// Stage steering, adjusted for what the conversation has surfaced.
    pub fn contextual_guidance(&self, stage: Stage) -> String {
        let mut parts = vec![format!("STAGE GUIDANCE: {}", stage.guidance())];

        if let Some(theme) = self.strongest_theme().filter(|t| t.strength >= STRONG_THEME) {
            parts.push(format!(
                "CONTEXT: User shows strong {} theme - explore this further",
                theme.kind
            ));
        }

        if self
            .insights
            .iter()
            .any(|i| i.stage == stage && i.confidence >= 0.7)
        {
            parts.push("RECENT INSIGHTS: Build on what they've shared about their strengths".to_string());
        }

        parts.join(" | ")
    }

    /// Whether a theme is strong and well-evidenced enough to explore in depth.
    pub fn should_deep_dive(&self, kind: ThemeKind) -> bool {
        self.theme(kind).is_some_and(|t| {
            t.strength >= DEEP_DIVE_STRENGTH && t.evidence.len() >= DEEP_DIVE_EVIDENCE
        })
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            windowed_exchanges: self.exchanges.len(),
            total_exchanges: self.total_exchanges,
            current_stage: self.current_stage,
            insights_count: self.insights.len(),
            high_confidence_insights: self
                .insights
                .iter()
                .filter(|i| i.confidence >= HIGH_CONFIDENCE)
                .count(),
            themes: self
                .themes
                .iter()
                .map(|t| ThemeSummary {
                    kind: t.kind,
                    strength: t.strength,
                    evidence_count: t.evidence.len(),
                })
                .collect(),
        }
    }

    /// Check ranges and invariants of a deserialized tracker.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.window == 0 {
            return Err(SessionError::Invalid("exchange window is zero".to_string()));
        }
        if self.exchanges.len() > self.window {
            return Err(SessionError::Invalid(format!(
                "{} exchanges exceed window {}",
                self.exchanges.len(),
                self.window
            )));
        }
        if self.exchanges.len() as u64 > self.total_exchanges {
            return Err(SessionError::Invalid(
                "exchange log longer than total exchange count".to_string(),
            ));
        }
        if let Some(bad) = self
            .insights
            .iter()
            .find(|i| !(INSIGHT_THRESHOLD..=1.0).contains(&i.confidence))
        {
            return Err(SessionError::Invalid(format!(
                "insight confidence {} out of range",
                bad.confidence
            )));
        }
        for theme in &self.themes {
            if !(THEME_INITIAL_STRENGTH..=THEME_CEILING).contains(&theme.strength) {
                return Err(SessionError::Invalid(format!(
                    "theme {} strength {} out of range",
                    theme.kind, theme.strength
                )));
            }
            if theme.evidence.is_empty() {
                return Err(SessionError::Invalid(format!(
                    "theme {} has no evidence",
                    theme.kind
                )));
            }
        }
        for (i, theme) in self.themes.iter().enumerate() {
            if self.themes[..i].iter().any(|t| t.kind == theme.kind) {
                return Err(SessionError::Invalid(format!(
                    "theme {} listed twice",
                    theme.kind
                )));
            }
        }
        Ok(())
    }
}
