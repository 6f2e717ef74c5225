//! Incremental consumption-history aggregation.
//!
//! Turns quarter-hour readings from a metering portal into a gap-free,
//! monotonically increasing cumulative series per installation. The engine
//! deduplicates raw readings, aggregates them into hourly and daily buckets,
//! decides which days are complete under DST irregularities, advances a
//! resumable checkpoint past fully-confirmed days, and can extrapolate a
//! short-horizon forecast from per-(month, hour) historical averages.
//!
//! The only state that survives between cycles is the
//! [`Checkpoint`](checkpoint::Checkpoint) returned by
//! [`SyncEngine::run_cycle`](engine::SyncEngine::run_cycle); the caller owns
//! its persistence.

#![deny(missing_docs)]

pub mod aggregate;
pub mod calendar;
pub mod checkpoint;
pub mod engine;
pub mod errors;
pub mod normalize;
pub mod predict;
pub mod reconcile;
