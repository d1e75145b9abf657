//! Library half of the `qd` CLI
//!
//! Holds the replay harness so it can be driven from tests on a paused
//! clock as well as from the binary.

pub mod replay;

pub use replay::{parse_schedule, Invocation, ReplayPlan};
