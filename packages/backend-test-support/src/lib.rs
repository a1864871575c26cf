//! Backend test support utilities
//!
//! Shared by the backend's integration tests: one-time logging
//! initialization and Problem Details assertions that do not depend on
//! backend types.

pub mod logging;
pub mod problem_details;
