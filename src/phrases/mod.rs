// Repeated-content detection: normalized phrases that recur across a corpus.

pub mod normalize;
pub mod repetition;
