//! Core use-case services.
//!
//! # Responsibility
//! - Own the planner state and expose its mutation/query contract.
//! - Keep shell/view layers decoupled from storage details.

pub mod day_plan;
pub mod planner;
