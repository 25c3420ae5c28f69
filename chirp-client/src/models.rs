use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A post in the shared feed.
pub struct Post {
    /// Post id.
    pub id: i64,
    /// Author's user id; absent on posts that predate author ids.
    #[serde(default)]
    pub author_id: Option<i64>,
    /// Author's username at the time of posting.
    pub username: String,
    /// Post body.
    pub content: String,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Whether the post was edited after creation.
    #[serde(default)]
    pub edited: bool,
    /// Time of the last edit (UTC).
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Response to a successful register or login.
pub struct AuthResponse {
    /// Opaque session token.
    pub token: String,
    /// Username of the session owner.
    pub username: String,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A user as listed by the admin API.
pub struct AdminUser {
    /// User id.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Registration time (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Record counts, either current totals or the number removed by an admin action.
pub struct RecordCounts {
    /// Users.
    pub users: usize,
    /// Posts.
    pub posts: usize,
    /// Sessions.
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Outcome of a destructive admin action.
pub struct AdminAction {
    /// Always `true` on a 2xx response.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// How many records were removed.
    pub removed: RecordCounts,
}

#[cfg(test)]
mod tests {
    use super::Post;

    #[test]
    fn post_decodes_camel_case_and_optional_fields() {
        let json = r#"{
            "id": 7,
            "authorId": 3,
            "username": "alice",
            "content": "hello",
            "createdAt": "2024-05-01T10:00:00Z",
            "edited": false
        }"#;

        let post: Post = serde_json::from_str(json).expect("post json");
        assert_eq!(post.id, 7);
        assert_eq!(post.author_id, Some(3));
        assert!(post.edited_at.is_none());
    }

    #[test]
    fn legacy_post_without_author_id_decodes() {
        let json = r#"{
            "id": 1,
            "username": "old",
            "content": "first",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;

        let post: Post = serde_json::from_str(json).expect("post json");
        assert_eq!(post.author_id, None);
        assert!(!post.edited);
    }
}
