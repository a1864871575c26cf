//! Adapters for external dependencies.

pub mod analytics_sea;
pub mod matchmaking_sea;
pub mod rankings_sea;
pub mod rooms_sea;
pub mod sessions_sea;
