// Posting-cadence analysis: flags accounts whose posts arrive too close together.

pub mod interval;
pub mod timestamps;
