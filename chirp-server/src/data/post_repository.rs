use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) username: String,
    pub(crate) content: String,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// Assigns the next id and places the post at the head of the feed.
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    /// Places an already built record at the head of the feed as is, id and
    /// timestamps included. Records from before author ids existed come in
    /// this way with `author_id: None`. Nothing outside tests restores such
    /// records yet.
    #[cfg(test)]
    async fn insert_post(&self, post: Post) -> Result<(), DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    async fn replace_post(&self, post: Post) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn remove_by_author(&self, author_id: i64, username: &str) -> Result<usize, DomainError>;
    async fn clear(&self) -> Result<usize, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
