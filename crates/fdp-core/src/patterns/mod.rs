//! Design patterns shared across the workspace.

/// Observer / Observable pattern for market-data invalidation.
pub mod observable;
