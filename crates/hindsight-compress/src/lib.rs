//! Observation log compression and highlight summarization

mod compressor;
mod summarize;

pub use compressor::{compress, DEFAULT_THRESHOLD};
pub use summarize::{
    build_summary_prompt, fallback_highlights, parse_highlights, summarize_or_fallback,
    summarize_via_api, MAX_HIGHLIGHTS,
};
