use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A short text post.
///
/// `author_id` is optional only for records restored from before the field
/// existed; such posts are attributed by `username` when read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: Option<i64>,
    pub(crate) username: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) edited: bool,
    pub(crate) edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) content: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) content: String,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        author_id: i64,
        username: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            author_id: Some(author_id),
            username: username.into(),
            content,
            created_at,
            edited: false,
            edited_at: None,
        })
    }

    /// Replaces the content and stamps the edit. `created_at` is untouched
    /// and `edited_at` never precedes it.
    pub(crate) fn apply_edit(&mut self, content: String, now: DateTime<Utc>) {
        self.content = content;
        self.edited = true;
        self.edited_at = Some(now.max(self.created_at));
    }

    pub(crate) fn is_authored_by(&self, user_id: i64, username: &str) -> bool {
        match self.author_id {
            Some(author_id) => author_id == user_id,
            None => self.username == username,
        }
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

// Length is not bounded here; the 280 char limit is a client convention.
fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
