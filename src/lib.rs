// Botwatch: batch bot-activity detection for exported social account data
//
// This is the library root. Each module corresponds to one analyzer or to
// the plumbing shared between them.

pub mod cadence;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod output;
pub mod phrases;
pub mod pipeline;
pub mod sentiment;
pub mod snapshot;
