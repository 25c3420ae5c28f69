use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::data::post_repository::{NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Default)]
struct Feed {
    // newest at the front
    posts: VecDeque<Post>,
    last_id: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryPostRepository {
    feed: Arc<RwLock<Feed>>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut feed = self.feed.write().await;
        let id = feed.last_id + 1;
        let post = Post::new(id, input.author_id, input.username, input.content, Utc::now())?;
        feed.last_id = id;
        feed.posts.push_front(post.clone());
        Ok(post)
    }

    #[cfg(test)]
    async fn insert_post(&self, post: Post) -> Result<(), DomainError> {
        let mut feed = self.feed.write().await;
        if feed.posts.iter().any(|existing| existing.id == post.id) {
            return Err(DomainError::AlreadyExists(format!("post id: {}", post.id)));
        }
        feed.last_id = feed.last_id.max(post.id);
        feed.posts.push_front(post);
        Ok(())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let feed = self.feed.read().await;
        Ok(feed.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let feed = self.feed.read().await;
        Ok(feed.posts.iter().cloned().collect())
    }

    async fn replace_post(&self, post: Post) -> Result<Option<Post>, DomainError> {
        let mut feed = self.feed.write().await;
        let Some(slot) = feed.posts.iter_mut().find(|existing| existing.id == post.id) else {
            return Ok(None);
        };
        *slot = post.clone();
        Ok(Some(post))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut feed = self.feed.write().await;
        let before = feed.posts.len();
        feed.posts.retain(|post| post.id != id);
        Ok(feed.posts.len() < before)
    }

    async fn remove_by_author(&self, author_id: i64, username: &str) -> Result<usize, DomainError> {
        let mut feed = self.feed.write().await;
        let before = feed.posts.len();
        feed.posts
            .retain(|post| !post.is_authored_by(author_id, username));
        Ok(before - feed.posts.len())
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let mut feed = self.feed.write().await;
        let removed = feed.posts.len();
        feed.posts.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.feed.read().await.posts.len())
    }
}
