//! Communication style classifier.
//!
//! Derives linguistic markers from the subject's answers and maps them to a
//! best-fit [`CommunicationStyle`] and [`ResponseDepth`]. Style scores are
//! additive and kept in integer tenths; the primary style is the highest
//! score, ties going to the style declared first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::{
    ABSTRACT_TERMS, CONCRETE_TERMS, EMOTIONAL_TERMS, ENTHUSIASM_TERMS, HEDGING_TERMS,
};
use crate::signals::SignalScorer;

/// Samples needed before the first profile is built.
pub const DEFAULT_MIN_SAMPLES: usize = 3;

const NO_PROFILE_GUIDANCE: &str = "Respond naturally with warmth and insight.";

/// Linguistic markers over the whole sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleMarkers {
    pub avg_words: f64,
    /// Emotional-term hits per word.
    pub emotional_rate: f64,
    /// Question marks per sample.
    pub question_rate: f64,
    /// Concrete hits over concrete plus abstract hits; 0.5 when neither.
    pub concrete_ratio: f64,
    /// Hedging-phrase hits per sample.
    pub hedging_rate: f64,
    /// Exclamation marks plus enthusiasm-term hits, per word.
    pub enthusiasm_rate: f64,
}

impl Default for StyleMarkers {
    fn default() -> Self {
        Self {
            avg_words: 20.0,
            emotional_rate: 0.05,
            question_rate: 0.2,
            concrete_ratio: 0.5,
            hedging_rate: 0.1,
            enthusiasm_rate: 0.03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Analytical,
    Expressive,
    Practical,
    Reflective,
}

impl CommunicationStyle {
    pub const ALL: &'static [Self] = &[
        Self::Analytical,
        Self::Expressive,
        Self::Practical,
        Self::Reflective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analytical => "analytical",
            Self::Expressive => "expressive",
            Self::Practical => "practical",
            Self::Reflective => "reflective",
        }
    }

    /// Additive score in tenths.
    fn score_tenths(&self, m: &StyleMarkers) -> u32 {
        let rules: Vec<(bool, u32)> = match self {
            Self::Analytical => vec![
                (m.concrete_ratio > 0.6, 3),
                (m.avg_words > 25.0, 2),
                (m.emotional_rate < 0.03, 2),
                (m.question_rate > 0.3, 2),
                (m.hedging_rate < 0.1, 1),
            ],
            Self::Expressive => vec![
                (m.emotional_rate > 0.01, 3),
                (m.enthusiasm_rate > 0.02, 3),
                (m.avg_words > 20.0, 2),
                (m.concrete_ratio < 0.4, 2),
            ],
            Self::Practical => vec![
                (m.avg_words < 15.0, 3),
                (m.concrete_ratio > 0.7, 3),
                (m.emotional_rate < 0.04, 2),
                (m.question_rate < 0.2, 2),
            ],
            Self::Reflective => vec![
                (m.hedging_rate > 0.15, 3),
                (m.avg_words > 30.0, 2),
                (m.question_rate > 0.25, 2),
                (m.concrete_ratio < 0.5, 2),
                (m.emotional_rate > 0.03 && m.emotional_rate < 0.08, 1),
            ],
        };
        rules
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, tenths)| tenths)
            .sum()
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Analytical => {
                "Be logical, structured, and precise. Use specific examples. Ask clarifying questions."
            }
            Self::Expressive => {
                "Be warm, enthusiastic, and emotionally engaging. Use vivid language that matches their energy."
            }
            Self::Practical => {
                "Be concise, direct, and action-oriented. Focus on practical insights and next steps."
            }
            Self::Reflective => {
                "Be thoughtful, patient, and introspective. Allow space for contemplation and deeper reflection."
            }
        }
    }

    fn adaptations(&self) -> &'static [&'static str] {
        match self {
            Self::Analytical => &[
                "Use structured, logical responses",
                "Include specific examples and data points",
                "Avoid overly emotional language",
                "Ask clarifying questions for precision",
            ],
            Self::Expressive => &[
                "Use warm, encouraging language",
                "Include emotional validation",
                "Use vivid, descriptive language",
                "Match their enthusiasm level",
            ],
            Self::Practical => &[
                "Keep responses concise and actionable",
                "Focus on concrete next steps",
                "Avoid excessive elaboration",
                "Be direct and clear",
            ],
            Self::Reflective => &[
                "Allow processing time between questions",
                "Use thoughtful, introspective language",
                "Validate their careful consideration",
                "Ask open-ended, reflective questions",
            ],
        }
    }
}

impl fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDepth {
    Brief,
    Moderate,
    Detailed,
}

impl ResponseDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Moderate => "moderate",
            Self::Detailed => "detailed",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Brief => "Keep responses concise (2-3 sentences typically).",
            Self::Moderate => "Provide balanced detail (1-2 paragraphs typically).",
            Self::Detailed => "Offer comprehensive responses with thorough explanation.",
        }
    }

    fn adaptation(&self) -> Option<&'static str> {
        match self {
            Self::Brief => Some("Keep responses shorter and more focused"),
            Self::Moderate => None,
            Self::Detailed => Some("Provide comprehensive, thorough responses"),
        }
    }
}

impl fmt::Display for ResponseDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-fit style for a sample set. Rebuilt wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationProfile {
    pub primary: CommunicationStyle,
    /// Runner-up style, when it scored above zero.
    pub secondary: Option<CommunicationStyle>,
    pub depth: ResponseDepth,
    /// Raw score of the primary style; not normalized.
    pub confidence: f64,
    pub markers: StyleMarkers,
    pub adaptations: Vec<String>,
}

/// Compute markers over every sample. Empty input yields the defaults.
pub fn derive_markers<S: AsRef<str>>(scorer: &dyn SignalScorer, samples: &[S]) -> StyleMarkers {
    if samples.is_empty() {
        return StyleMarkers::default();
    }

    let sample_count = samples.len() as f64;
    let mut words = 0usize;
    let mut emotional = 0usize;
    let mut questions = 0usize;
    let mut concrete = 0usize;
    let mut abstract_hits = 0usize;
    let mut hedges = 0usize;
    let mut enthusiasm = 0usize;

    for sample in samples {
        let text = sample.as_ref();
        words += text.split_whitespace().count();
        emotional += scorer.count(text, EMOTIONAL_TERMS);
        questions += text.matches('?').count();
        concrete += scorer.count(text, CONCRETE_TERMS);
        abstract_hits += scorer.count(text, ABSTRACT_TERMS);
        hedges += scorer.count(text, HEDGING_TERMS);
        enthusiasm += scorer.count(text, ENTHUSIASM_TERMS) + text.matches('!').count();
    }

    let per_word = |n: usize| {
        if words == 0 {
            0.0
        } else {
            n as f64 / words as f64
        }
    };
    let concrete_ratio = if concrete + abstract_hits == 0 {
        0.5
    } else {
        concrete as f64 / (concrete + abstract_hits) as f64
    };

    StyleMarkers {
        avg_words: words as f64 / sample_count,
        emotional_rate: per_word(emotional),
        question_rate: questions as f64 / sample_count,
        concrete_ratio,
        hedging_rate: hedges as f64 / sample_count,
        enthusiasm_rate: per_word(enthusiasm),
    }
}

/// Every style with its score, highest first. Ties keep declaration order.
pub fn rank_styles(markers: &StyleMarkers) -> Vec<(CommunicationStyle, f64)> {
    let mut scored: Vec<(CommunicationStyle, u32)> = CommunicationStyle::ALL
        .iter()
        .map(|style| (*style, style.score_tenths(markers)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .map(|(style, tenths)| (style, f64::from(tenths) / 10.0))
        .collect()
}

/// Primary style and its raw score.
pub fn classify_style(markers: &StyleMarkers) -> (CommunicationStyle, f64) {
    rank_styles(markers)
        .into_iter()
        .next()
        .unwrap_or((CommunicationStyle::Analytical, 0.0))
}

pub fn response_depth(markers: &StyleMarkers) -> ResponseDepth {
    if markers.avg_words < 12.0 {
        ResponseDepth::Brief
    } else if markers.avg_words > 35.0 {
        ResponseDepth::Detailed
    } else {
        ResponseDepth::Moderate
    }
}

fn adaptations_for(
    style: CommunicationStyle,
    depth: ResponseDepth,
    markers: &StyleMarkers,
) -> Vec<String> {
    let mut adaptations: Vec<String> = style.adaptations().iter().map(|s| s.to_string()).collect();
    if let Some(extra) = depth.adaptation() {
        adaptations.push(extra.to_string());
    }
    if markers.hedging_rate > 0.2 {
        adaptations.push("Provide reassurance and normalize uncertainty".to_string());
    }
    if markers.enthusiasm_rate > 0.05 {
        adaptations.push("Match and encourage their positive energy".to_string());
    }
    adaptations
}

/// Build a profile from the given markers.
pub fn build_profile(markers: StyleMarkers) -> CommunicationProfile {
    let ranked = rank_styles(&markers);
    let (primary, confidence) = ranked
        .first()
        .copied()
        .unwrap_or((CommunicationStyle::Analytical, 0.0));
    let secondary = ranked
        .get(1)
        .filter(|(_, score)| *score > 0.0)
        .map(|(style, _)| *style);
    let depth = response_depth(&markers);

    CommunicationProfile {
        primary,
        secondary,
        depth,
        confidence,
        adaptations: adaptations_for(primary, depth, &markers),
        markers,
    }
}

/// Profile state reported to the command surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StyleSummary {
    InsufficientData {
        samples_needed: usize,
    },
    Profiled {
        primary: CommunicationStyle,
        secondary: Option<CommunicationStyle>,
        depth: ResponseDepth,
        confidence: f64,
        avg_words: f64,
        emotional_rate: f64,
        enthusiasm_rate: f64,
        hedging_rate: f64,
        adaptations: usize,
        samples: usize,
    },
}

/// Accumulates answer samples and keeps the current profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfiler {
    samples: Vec<String>,
    #[serde(skip)]
    profile: Option<CommunicationProfile>,
    min_samples: usize,
}

impl Default for StyleProfiler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SAMPLES)
    }
}

impl StyleProfiler {
    pub fn new(min_samples: usize) -> Self {
        Self {
            samples: Vec::new(),
            profile: None,
            min_samples: min_samples.max(1),
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn profile(&self) -> Option<&CommunicationProfile> {
        self.profile.as_ref()
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Add a sample; rebuilds the profile once enough samples exist.
    pub fn record_sample(
        &mut self,
        scorer: &dyn SignalScorer,
        text: &str,
    ) -> Option<&CommunicationProfile> {
        self.samples.push(text.to_string());
        self.rebuild(scorer);
        self.profile.as_ref()
    }

    /// Recompute the profile from the current samples. Used after loading,
    /// since profiles are derived and never persisted.
    pub fn rebuild(&mut self, scorer: &dyn SignalScorer) {
        if self.samples.len() < self.min_samples {
            return;
        }
        let profile = build_profile(derive_markers(scorer, &self.samples));
        tracing::debug!(
            primary = %profile.primary,
            depth = %profile.depth,
            confidence = profile.confidence,
            "Rebuilt communication profile"
        );
        self.profile = Some(profile);
    }

    /// Style directives for the generation prompt.
    pub fn style_guidance(&self) -> String {
        let Some(profile) = &self.profile else {
            return NO_PROFILE_GUIDANCE.to_string();
        };

        let mut parts = vec![
            format!("COMMUNICATION STYLE: {}", profile.primary.instruction()),
            format!("RESPONSE DEPTH: {}", profile.depth.instruction()),
        ];
        if !profile.adaptations.is_empty() {
            let top: Vec<&str> = profile
                .adaptations
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            parts.push(format!("SPECIFIC ADAPTATIONS: {}", top.join(" | ")));
        }
        parts.join(" ")
    }

    pub fn summary(&self) -> StyleSummary {
        match &self.profile {
            None => StyleSummary::InsufficientData {
                samples_needed: self.min_samples.saturating_sub(self.samples.len()),
            },
            Some(p) => StyleSummary::Profiled {
                primary: p.primary,
                secondary: p.secondary,
                depth: p.depth,
                confidence: p.confidence,
                avg_words: p.markers.avg_words,
                emotional_rate: p.markers.emotional_rate,
                enthusiasm_rate: p.markers.enthusiasm_rate,
                hedging_rate: p.markers.hedging_rate,
                adaptations: p.adaptations.len(),
                samples: self.samples.len(),
            },
        }
    }
}
