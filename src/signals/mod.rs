// =============================================================================
// Signals Module
// =============================================================================
//
// Maps the latest indicator readings to the discrete trend / momentum labels
// shown on the dashboard.

pub mod classifier;

pub use classifier::{classify, LatestValues, SignalSummary};
