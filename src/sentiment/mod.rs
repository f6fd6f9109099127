// Sentiment scoring: trait-based abstraction for swappable polarity providers.
//
// The PolarityScorer trait defines the interface. LexiconScorer is the local
// default; anything that can turn text into a score in [-1, 1] can be dropped
// in behind the aggregator.

pub mod aggregate;
pub mod lexicon;
pub mod traits;
