//! Repository functions for domain layer.

pub mod analytics;
pub mod rankings;
pub mod rooms;
pub mod sessions;
