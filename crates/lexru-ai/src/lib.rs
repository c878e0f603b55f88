//! Ranking, validation and model-facing stages of the answer pipeline.
//!
//! Ranking and validation are pure functions over pattern tables. Intent
//! fallback, planning and answer drafting go through the [`Generator`] seam;
//! the OpenAI-compatible backend needs the `openai` feature.

pub mod citation;
pub mod generator;
pub mod intent;
pub mod planner;
pub mod quality;
pub mod relevance;

#[cfg(feature = "openai")]
mod openai;

pub use citation::{Citation, extract_citations, has_valid_citation};
pub use generator::{CompletionRequest, Generator, GeneratorError, answer_request};
pub use intent::{Intent, classify_intent};
pub use planner::plan_queries;
pub use quality::{QualityReport, assess, has_strict_legal_quality};
pub use relevance::{filter_and_rank_pages, score_page};

#[cfg(feature = "openai")]
pub use openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient};
