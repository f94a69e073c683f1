//! Trait-category taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexicon::{PassionCategory, SkillCategory};

/// Trait categories a subject is scored against, in ranking-tie order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitCategory {
    Teaching,
    Leadership,
    Mercy,
    Administration,
    Serving,
    Encouraging,
    Giving,
    Creativity,
}

/// Everything the scorer needs to know about one category.
#[derive(Debug)]
pub struct TraitProfile {
    pub description: &'static str,
    pub skills: &'static [SkillCategory],
    pub passions: &'static [PassionCategory],
    /// Keywords searched for in values-stage answers.
    pub values: &'static [&'static str],
    /// A marker counts when any of its words appears in the corpus.
    pub markers: &'static [&'static str],
    pub expressions: &'static [&'static str],
}

const TEACHING: TraitProfile = TraitProfile {
    description: "The ability to understand and communicate truth effectively",
    skills: &[
        SkillCategory::Teaching,
        SkillCategory::Communication,
        SkillCategory::Analytical,
    ],
    passions: &[PassionCategory::Learning, PassionCategory::People],
    values: &["truth", "growth", "education", "understanding"],
    markers: &[
        "Others seek you out for explanations",
        "You enjoy breaking down complex concepts",
        "You feel satisfied when others understand",
        "You naturally use examples and illustrations",
    ],
    expressions: &[
        "Formal teaching or training",
        "Mentoring and coaching",
        "Writing instructional content",
        "Creating educational resources",
    ],
};

const LEADERSHIP: TraitProfile = TraitProfile {
    description: "The ability to inspire and guide others toward goals",
    skills: &[
        SkillCategory::Leadership,
        SkillCategory::Communication,
        SkillCategory::Administrative,
    ],
    passions: &[
        PassionCategory::People,
        PassionCategory::Service,
        PassionCategory::Justice,
    ],
    values: &["vision", "purpose", "teamwork", "progress"],
    markers: &[
        "People naturally follow your direction",
        "You see the big picture and future possibilities",
        "You motivate others to achieve more",
        "You take initiative in group situations",
    ],
    expressions: &[
        "Team or organization leadership",
        "Project management",
        "Community organizing",
        "Visionary planning",
    ],
};

const MERCY: TraitProfile = TraitProfile {
    description: "Deep compassion that moves you to help those who suffer",
    skills: &[SkillCategory::Helping, SkillCategory::Communication],
    passions: &[
        PassionCategory::People,
        PassionCategory::Healing,
        PassionCategory::Justice,
    ],
    values: &["compassion", "kindness", "healing", "restoration"],
    markers: &[
        "You are deeply moved by others suffering",
        "You offer comfort naturally",
        "You attract people who need encouragement",
        "You see good in difficult people",
    ],
    expressions: &[
        "Counseling and support",
        "Healthcare and healing",
        "Working with marginalized people",
        "Crisis intervention",
    ],
};

const ADMINISTRATION: TraitProfile = TraitProfile {
    description: "The ability to organize and coordinate people and resources effectively",
    skills: &[
        SkillCategory::Administrative,
        SkillCategory::Leadership,
        SkillCategory::Analytical,
    ],
    passions: &[PassionCategory::Service, PassionCategory::People],
    values: &["order", "efficiency", "stewardship", "service"],
    markers: &[
        "You naturally organize and systematize",
        "You see what needs to be done logistically",
        "You coordinate resources effectively",
        "You help others be more productive",
    ],
    expressions: &[
        "Event planning and coordination",
        "Business and operations management",
        "Resource allocation",
        "Systems development",
    ],
};

const SERVING: TraitProfile = TraitProfile {
    description: "Joy in meeting practical needs and supporting others",
    skills: &[SkillCategory::Helping, SkillCategory::Administrative],
    passions: &[PassionCategory::Service, PassionCategory::People],
    values: &["service", "humility", "helpfulness", "support"],
    markers: &[
        "You prefer to work behind the scenes",
        "You notice practical needs others miss",
        "You find joy in helping tasks get done",
        "You work well under others leadership",
    ],
    expressions: &[
        "Volunteer coordination",
        "Hospitality and events",
        "Maintenance and support",
        "Administrative assistance",
    ],
};

const ENCOURAGING: TraitProfile = TraitProfile {
    description: "The ability to motivate and build up others",
    skills: &[SkillCategory::Communication, SkillCategory::Helping],
    passions: &[PassionCategory::People, PassionCategory::Healing],
    values: &["hope", "growth", "potential", "encouragement"],
    markers: &[
        "You see potential in others",
        "You naturally motivate and inspire",
        "People feel better after talking with you",
        "You focus on solutions and possibilities",
    ],
    expressions: &[
        "Life coaching and mentoring",
        "Motivational speaking",
        "Counseling and therapy",
        "Team building and development",
    ],
};

const GIVING: TraitProfile = TraitProfile {
    description: "Joy in sharing resources generously where they do the most good",
    skills: &[SkillCategory::Administrative, SkillCategory::Analytical],
    passions: &[PassionCategory::Service, PassionCategory::Justice],
    values: &["generosity", "stewardship", "impact", "justice"],
    markers: &[
        "You give quietly and consistently",
        "You research where gifts will have most impact",
        "You motivate others to give",
        "You see resources as tools for good",
    ],
    expressions: &[
        "Philanthropy and donations",
        "Fundraising and development",
        "Financial planning for causes you care about",
        "Resource mobilization",
    ],
};

const CREATIVITY: TraitProfile = TraitProfile {
    description: "Using artistic gifts to inspire and communicate truth",
    skills: &[SkillCategory::Creative, SkillCategory::Communication],
    passions: &[
        PassionCategory::Creativity,
        PassionCategory::People,
        PassionCategory::Service,
    ],
    values: &["beauty", "expression", "inspiration", "truth"],
    markers: &[
        "You express yourself through artistic means",
        "You use creativity to communicate deeper truths",
        "You inspire others through your art",
        "You see beauty and meaning in everyday things",
    ],
    expressions: &[
        "Visual and performing arts",
        "Creative writing and storytelling",
        "Design and aesthetics",
        "Celebration and community arts",
    ],
};

impl TraitCategory {
    pub const ALL: &'static [Self] = &[
        Self::Teaching,
        Self::Leadership,
        Self::Mercy,
        Self::Administration,
        Self::Serving,
        Self::Encouraging,
        Self::Giving,
        Self::Creativity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teaching => "teaching",
            Self::Leadership => "leadership",
            Self::Mercy => "mercy",
            Self::Administration => "administration",
            Self::Serving => "serving",
            Self::Encouraging => "encouraging",
            Self::Giving => "giving",
            Self::Creativity => "creativity",
        }
    }

    pub fn profile(&self) -> &'static TraitProfile {
        match self {
            Self::Teaching => &TEACHING,
            Self::Leadership => &LEADERSHIP,
            Self::Mercy => &MERCY,
            Self::Administration => &ADMINISTRATION,
            Self::Serving => &SERVING,
            Self::Encouraging => &ENCOURAGING,
            Self::Giving => &GIVING,
            Self::Creativity => &CREATIVITY,
        }
    }
}

impl fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
