pub mod answer;
pub mod norm;
pub mod patterns;
pub mod plan;
pub mod types;

pub use answer::{Confidence, clamp_text, compose_reply, format_answer};
pub use norm::{NormTarget, normalize_code, parse_norm_targets};
pub use plan::QueryPlan;
pub use types::{FetchedPage, RankedPage, SearchHit, UsedSource, dedup_by_url};
