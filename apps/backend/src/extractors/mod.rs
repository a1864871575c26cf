pub mod current_player;
pub mod session_id;
pub mod validated_json;

pub use current_player::{CurrentPlayer, MaybePlayer, PLAYER_ID_HEADER, PLAYER_NAME_HEADER};
pub use session_id::SessionId;
pub use validated_json::ValidatedJson;
