pub mod custom_rooms;
pub mod game_analytics;
pub mod game_sessions;
pub mod matchmaking;
pub mod ranking_statistics;
pub mod rankings;
pub mod session_players;

pub use custom_rooms::Entity as CustomRooms;
pub use game_analytics::Entity as GameAnalytics;
pub use game_sessions::Entity as GameSessions;
pub use matchmaking::Entity as Matchmaking;
pub use ranking_statistics::Entity as RankingStatistics;
pub use rankings::Entity as Rankings;
pub use session_players::Entity as SessionPlayers;
