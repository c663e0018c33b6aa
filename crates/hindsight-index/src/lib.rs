//! Text-relevance ranking over stored sessions

mod ranker;

pub use ranker::SessionRanker;
