use chrono::{DateTime, Utc};

/// An issued bearer credential. Sessions never expire; they live until
/// logout, owner deletion or an admin clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}
