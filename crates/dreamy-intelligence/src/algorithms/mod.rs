// ABOUTME: Algorithm selection layer for pluggable running analytics formulas
// ABOUTME: Enum dispatch for VDOT, TRIMP, training stress and load averaging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Algorithm Selection Module
//!
//! Each formula family is an enum with `FromStr`, `name()` and `formula()` so
//! callers can select a variant from a query string and report which one ran.
//!
//! ```rust,no_run
//! use dreamy_intelligence::algorithms::VdotAlgorithm;
//!
//! # fn example() -> Result<(), dreamy_core::errors::AppError> {
//! let vdot = VdotAlgorithm::Daniels.calculate_vdot(5000.0, 1200.0)?;
//! # Ok(())
//! # }
//! ```

/// CTL/ATL averaging over a daily stress series
pub mod training_load;
/// Banister training impulse
pub mod trimp;
/// Training stress score formulas
pub mod tss;
/// VDOT, race prediction and training paces
pub mod vdot;

pub use training_load::TrainingLoadAlgorithm;
pub use trimp::TrimpAlgorithm;
pub use tss::StressMethod;
pub use vdot::{race_equivalents, training_paces, PaceRange, RaceEquivalent, TrainingPaces, VdotAlgorithm};
