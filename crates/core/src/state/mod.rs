pub mod db;
pub mod sessions;

pub use db::CollabDb;

pub use sessions::{
    CollaborationSummary, NewSession, SessionManager, SessionRecord, SessionStats, SessionStatus,
    SessionStore,
};
