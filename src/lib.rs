//! Wayfinder: an adaptive guided-interview engine.
//!
//! A session walks a subject through a fixed sequence of interview stages,
//! mines every answer for lexical signals, and uses those signals to pick the
//! next question, shape the tone of generated replies, and finally score the
//! subject against a fixed taxonomy of trait categories.
//!
//! Everything in the core is deterministic. The only suspension point is the
//! generation collaborator behind [`llm::LlmProvider`].

pub mod config;
pub mod coverage;
pub mod error;
pub mod insight;
pub mod lexicon;
pub mod llm;
pub mod prompt;
pub mod scoring;
pub mod session;
pub mod signals;
pub mod stage;
pub mod style;
pub mod util;

pub use error::{Error, Result};
