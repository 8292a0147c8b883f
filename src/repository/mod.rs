pub mod sessions;

pub use sessions::{new_session_id, SessionRepository, DEFAULT_STORAGE_KEY};
