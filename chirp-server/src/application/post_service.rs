use chrono::Utc;
use tracing::{info, warn};

use crate::data::post_repository::{NewPost, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::User;

pub(crate) struct PostService<P: PostRepository, U: UserRepository> {
    posts: P,
    users: U,
}

impl<P: PostRepository, U: UserRepository> PostService<P, U> {
    pub(crate) fn new(posts: P, users: U) -> Self {
        Self { posts, users }
    }

    /// All posts, newest first. Records without an `author_id` get it filled
    /// in from their username on the way out; the stored record is left as is.
    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.list_posts().await?;
        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            out.push(self.backfill_author(post).await?);
        }
        Ok(out)
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        let post = self.find_post(id).await?;
        self.backfill_author(post).await
    }

    pub(crate) async fn create_post(
        &self,
        author: &User,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        if self.users.find_by_id(author.id).await?.is_none() {
            return Err(DomainError::NotFound(format!("user id: {}", author.id)));
        }

        let post = self
            .posts
            .create_post(NewPost {
                author_id: author.id,
                username: author.username.clone(),
                content: req.content,
            })
            .await?;

        // A user delete that ran between the check above and the insert has
        // already swept this author's posts, so the new one must go too.
        if self.users.find_by_id(author.id).await?.is_none() {
            self.posts.delete_post(post.id).await?;
            warn!(post_id = post.id, author_id = author.id, "author removed during post create");
            return Err(DomainError::NotFound(format!("user id: {}", author.id)));
        }

        info!(post_id = post.id, author_id = author.id, "post created");
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor: &User,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let mut post = self.find_post(post_id).await?;
        if !post.is_authored_by(actor.id, &actor.username) {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;

        post.apply_edit(req.content, Utc::now());
        let post = self
            .posts
            .replace_post(post)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        info!(post_id, author_id = actor.id, "post edited");
        self.backfill_author(post).await
    }

    pub(crate) async fn delete_post(&self, actor: &User, post_id: i64) -> Result<(), DomainError> {
        let post = self.find_post(post_id).await?;
        if !post.is_authored_by(actor.id, &actor.username) {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        info!(post_id, author_id = actor.id, "post deleted");
        Ok(())
    }

    async fn find_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    async fn backfill_author(&self, mut post: Post) -> Result<Post, DomainError> {
        if post.author_id.is_none()
            && let Some(creds) = self.users.find_by_username(&post.username).await?
        {
            post.author_id = Some(creds.user.id);
        }
        Ok(post)
    }
}
