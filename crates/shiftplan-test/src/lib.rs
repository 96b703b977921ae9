//! Shared test fixtures for shiftplan crates.
//!
//! This crate provides entity builders and canned inputs for testing.
//! It depends only on `shiftplan-core` and `shiftplan-config` so every other
//! crate can use it as a dev-dependency without cycles.
//!
//! - [`calendar`] - Fixed planning week and date helpers
//! - [`builders`] - Terse constructors for employees, shifts and windows
//! - [`scenarios`] - Complete inputs used across crates
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! shiftplan-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use shiftplan_test::builders::{employee, shift, window};
//! use shiftplan_test::scenarios::window_inside_shift;
//! ```

pub mod builders;
pub mod calendar;
pub mod scenarios;

pub use builders::{employee, shift, window};
pub use calendar::{day, DAY0};
