//! Services orchestrate repos over a transaction or connection.

pub mod rankings;
pub mod retention;
pub mod rooms;
pub mod sessions;

pub use rankings::RankingService;
pub use retention::RetentionService;
pub use rooms::RoomService;
pub use sessions::SessionService;
