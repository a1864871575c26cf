//! Background retention jobs and the loop that schedules them.

pub mod scheduler;

pub use scheduler::{run_once, spawn_scheduler, Job, JobReport};
