//! Lexical signal library.
//!
//! Static category -> trigger-term tables used by every analysis pass. Each
//! family is a closed enum so lookups are exhaustive matches rather than
//! string-keyed tables. Terms are lower-case; matching is containment over
//! lower-cased text (see [`crate::signals`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed family of categories, each owning a fixed list of trigger terms.
pub trait LexicalCategory: Copy + Eq + fmt::Debug + 'static {
    /// Every category in declaration order. Ranking ties resolve in this order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn terms(&self) -> &'static [&'static str];
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Skill categories recognised in skills-stage answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Teaching,
    Leadership,
    Communication,
    Helping,
    Creative,
    Analytical,
    Administrative,
    Technical,
}

impl LexicalCategory for SkillCategory {
    const ALL: &'static [Self] = &[
        Self::Teaching,
        Self::Leadership,
        Self::Communication,
        Self::Helping,
        Self::Creative,
        Self::Analytical,
        Self::Administrative,
        Self::Technical,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Teaching => "teaching",
            Self::Leadership => "leadership",
            Self::Communication => "communication",
            Self::Helping => "helping",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Administrative => "administrative",
            Self::Technical => "technical",
        }
    }

    fn terms(&self) -> &'static [&'static str] {
        match self {
            Self::Teaching => &[
                "teach", "mentor", "guide", "explain", "instruct", "train", "educate", "coach",
            ],
            Self::Leadership => &[
                "lead",
                "manage",
                "organize",
                "coordinate",
                "direct",
                "supervise",
                "delegate",
            ],
            Self::Communication => &[
                "speak",
                "write",
                "present",
                "communicate",
                "express",
                "articulate",
                "convey",
            ],
            Self::Helping => &[
                "help", "assist", "support", "serve", "care", "counsel", "encourage", "comfort",
            ],
            Self::Creative => &[
                "create", "design", "artistic", "creative", "imagine", "innovate", "craft", "build",
            ],
            Self::Analytical => &[
                "analyze",
                "research",
                "investigate",
                "study",
                "examine",
                "solve",
                "logical",
            ],
            Self::Administrative => &[
                "organize",
                "plan",
                "schedule",
                "coordinate",
                "detail",
                "systematic",
            ],
            Self::Technical => &[
                "technical",
                "technology",
                "programming",
                "engineering",
                "computing",
                "digital",
            ],
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Passions
// ---------------------------------------------------------------------------

/// Passion categories recognised in passion-stage answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassionCategory {
    People,
    Justice,
    Nature,
    Creativity,
    Learning,
    Service,
    Innovation,
    Healing,
}

impl LexicalCategory for PassionCategory {
    const ALL: &'static [Self] = &[
        Self::People,
        Self::Justice,
        Self::Nature,
        Self::Creativity,
        Self::Learning,
        Self::Service,
        Self::Innovation,
        Self::Healing,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Justice => "justice",
            Self::Nature => "nature",
            Self::Creativity => "creativity",
            Self::Learning => "learning",
            Self::Service => "service",
            Self::Innovation => "innovation",
            Self::Healing => "healing",
        }
    }

    fn terms(&self) -> &'static [&'static str] {
        match self {
            Self::People => &[
                "people",
                "relationships",
                "community",
                "social",
                "family",
                "friends",
                "connection",
            ],
            Self::Justice => &[
                "justice", "fair", "equality", "rights", "advocacy", "change", "reform",
            ],
            Self::Nature => &[
                "nature",
                "environment",
                "outdoors",
                "animals",
                "earth",
                "conservation",
            ],
            Self::Creativity => &[
                "art",
                "music",
                "creative",
                "beauty",
                "expression",
                "imagination",
                "design",
            ],
            Self::Learning => &[
                "learn",
                "knowledge",
                "education",
                "study",
                "growth",
                "discovery",
                "wisdom",
            ],
            Self::Service => &[
                "serve",
                "volunteer",
                "giving",
                "ministry",
                "mission",
                "charity",
                "helping",
            ],
            Self::Innovation => &[
                "innovation",
                "technology",
                "progress",
                "future",
                "advancement",
                "improvement",
            ],
            Self::Healing => &[
                "health",
                "healing",
                "wellness",
                "medical",
                "therapy",
                "recovery",
                "wholeness",
            ],
        }
    }
}

impl fmt::Display for PassionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Conversation themes
// ---------------------------------------------------------------------------

/// Recurring themes tracked across exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKind {
    Teaching,
    Leadership,
    Helping,
    Creativity,
    Justice,
    PeopleFocus,
}

impl LexicalCategory for ThemeKind {
    const ALL: &'static [Self] = &[
        Self::Teaching,
        Self::Leadership,
        Self::Helping,
        Self::Creativity,
        Self::Justice,
        Self::PeopleFocus,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Teaching => "teaching",
            Self::Leadership => "leadership",
            Self::Helping => "helping",
            Self::Creativity => "creativity",
            Self::Justice => "justice",
            Self::PeopleFocus => "people_focus",
        }
    }

    fn terms(&self) -> &'static [&'static str] {
        match self {
            Self::Teaching => &[
                "teach",
                "explain",
                "mentor",
                "guide",
                "instruct",
                "help others learn",
            ],
            Self::Leadership => &[
                "lead",
                "direct",
                "manage",
                "organize",
                "vision",
                "inspire others",
            ],
            Self::Helping => &[
                "help",
                "serve",
                "support",
                "assist",
                "care for",
                "come alongside",
            ],
            Self::Creativity => &[
                "create",
                "design",
                "artistic",
                "express",
                "beauty",
                "innovation",
            ],
            Self::Justice => &[
                "justice",
                "fairness",
                "equality",
                "advocate",
                "stand up for",
                "rights",
            ],
            Self::PeopleFocus => &[
                "people",
                "relationships",
                "community",
                "connection",
                "social",
            ],
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Conversational micro-signals
// ---------------------------------------------------------------------------

/// Kinds of micro-signal an answer can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    StrongSkillIndicator,
    PassionIndicator,
    ValueIndicator,
    GiftIndicator,
}

impl InsightKind {
    pub const ALL: &'static [Self] = &[
        Self::StrongSkillIndicator,
        Self::PassionIndicator,
        Self::ValueIndicator,
        Self::GiftIndicator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongSkillIndicator => "strong_skill_indicator",
            Self::PassionIndicator => "passion_indicator",
            Self::ValueIndicator => "value_indicator",
            Self::GiftIndicator => "gift_indicator",
        }
    }

    /// Trigger phrases with their fixed confidence, in precedence order.
    pub fn signals(&self) -> &'static [(&'static str, f64)] {
        match self {
            Self::StrongSkillIndicator => &[
                ("people often come to me", 0.8),
                ("i excel at", 0.8),
                ("i'm naturally good at", 0.9),
                ("others seek me out", 0.8),
                ("i find it easy to", 0.7),
            ],
            Self::PassionIndicator => &[
                ("i love", 0.8),
                ("makes me feel alive", 0.9),
                ("lose track of time", 0.9),
                ("deeply passionate about", 0.9),
                ("stirs my heart", 0.8),
            ],
            Self::ValueIndicator => &[
                ("important to me", 0.7),
                ("i believe in", 0.7),
                ("guides my decisions", 0.8),
                ("core value", 0.9),
            ],
            Self::GiftIndicator => &[
                ("calling", 0.8),
                ("vocation", 0.8),
                ("gifted in", 0.9),
                ("natural gift", 0.9),
            ],
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Follow-up triggers
// ---------------------------------------------------------------------------

/// A follow-up question fired by phrasing in the most recent answer.
#[derive(Debug)]
pub struct FollowUpRule {
    pub triggers: &'static [&'static str],
    pub question: &'static str,
    pub reasoning: &'static str,
}

/// Evaluated in declaration order; the first rule with any trigger wins.
pub const FOLLOW_UP_RULES: &[FollowUpRule] = &[
    FollowUpRule {
        triggers: &["i love", "passionate about", "deeply care"],
        question: "What specifically about that resonates so deeply with you?",
        reasoning: "User expressed strong passion",
    },
    FollowUpRule {
        triggers: &["difficult", "challenging", "struggle with"],
        question: "Even though it's challenging, what draws you to persist with it?",
        reasoning: "User mentioned difficulty but continued engagement",
    },
    FollowUpRule {
        triggers: &["people come to me", "others seek me out", "friends ask me"],
        question: "What do you think it is about you that makes people naturally turn to you for this?",
        reasoning: "User mentioned others recognizing their ability",
    },
    FollowUpRule {
        triggers: &["started", "began", "initiated"],
        question: "What motivated you to take that first step?",
        reasoning: "User mentioned taking initiative",
    },
];

// ---------------------------------------------------------------------------
// Style markers
// ---------------------------------------------------------------------------

pub const EMOTIONAL_TERMS: &[&str] = &[
    "love",
    "passionate",
    "excited",
    "energized",
    "alive",
    "frustrated",
    "concerned",
    "worried",
    "joyful",
    "thrilled",
    "overwhelmed",
    "blessed",
    "grateful",
    "moved",
];

pub const CONCRETE_TERMS: &[&str] = &[
    "specific",
    "example",
    "exactly",
    "precisely",
    "literally",
    "actually",
    "definitely",
    "clearly",
    "obviously",
    "specifically",
];

pub const ABSTRACT_TERMS: &[&str] = &[
    "generally",
    "usually",
    "often",
    "sometimes",
    "might",
    "could",
    "possibly",
    "perhaps",
    "maybe",
    "tend to",
    "feel like",
];

pub const HEDGING_TERMS: &[&str] = &[
    "not sure",
    "i think",
    "maybe",
    "perhaps",
    "might be",
    "could be",
    "i guess",
];

/// `!` is listed as a term as well as counted per occurrence, so a text with
/// exclamation marks scores the term once plus once per mark.
pub const ENTHUSIASM_TERMS: &[&str] = &[
    "!",
    "really",
    "absolutely",
    "definitely",
    "totally",
    "amazing",
    "wonderful",
    "incredible",
];
