//! Precomputation stages of the shiftplan pipeline.
//!
//! Every stage is a pure function of the validated input and the
//! configuration:
//!
//! - [`eligibility`] - which employee may take which shift
//! - [`segment`] - atomic time segments per role and day
//! - [`demand`] - headcount and skill demand of each segment
//! - [`conflict`] - shift pairs that break rest or night rules
//! - [`weights`] - per-minute objective weights with tier separation
//!
//! Identical inputs always produce identical outputs, element order included.

pub mod conflict;
pub mod demand;
pub mod eligibility;
pub mod segment;
pub mod weights;

pub use conflict::{analyze_conflicts, is_night, ConflictPair, ConflictSet, NightWeek};
pub use demand::aggregate_demand;
pub use eligibility::Eligibility;
pub use segment::{index_segments, DemandSource, Segment, SegmentGroup, SegmentIndex};
pub use weights::{
    normalize_weights, overtime_factors, DominanceViolation, PenaltyBounds, WeightEntry,
    WeightTable,
};
