use tracing::{info, warn};

use crate::data::post_repository::PostRepository;
use crate::data::session_repository::SessionRepository;
use crate::data::user_repository::{UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::session::Session;
use crate::domain::user::{UpdateUserRequest, User};
use crate::infrastructure::password::PasswordHasher;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RemovedCounts {
    pub(crate) users: usize,
    pub(crate) posts: usize,
    pub(crate) sessions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stats {
    pub(crate) users: usize,
    pub(crate) posts: usize,
    pub(crate) sessions: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Export {
    pub(crate) users: Vec<User>,
    pub(crate) posts: Vec<Post>,
    pub(crate) sessions: Vec<Session>,
}

/// Privileged bulk operations. Deleting users cascades explicitly to their
/// sessions and posts; the stores have no referential integrity of their own.
pub(crate) struct AdminService<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PostRepository,
{
    users: U,
    sessions: S,
    posts: P,
    hasher: PasswordHasher,
}

impl<U, S, P> AdminService<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PostRepository,
{
    pub(crate) fn new(users: U, sessions: S, posts: P, hasher: PasswordHasher) -> Self {
        Self {
            users,
            sessions,
            posts,
            hasher,
        }
    }

    pub(crate) async fn stats(&self) -> Result<Stats, DomainError> {
        Ok(Stats {
            users: self.users.count().await?,
            posts: self.posts.count().await?,
            sessions: self.sessions.count().await?,
        })
    }

    pub(crate) async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list_users().await
    }

    pub(crate) async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound(format!("user id: {id}")));
        }

        let password_hash = match req.password {
            Some(password) => Some(self.hasher.hash_password_blocking(password).await?),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = self
            .users
            .update_user(
                id,
                UserPatch {
                    username: req.username,
                    email: req.email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;

        info!(user_id = id, password_changed, "admin updated user");
        Ok(user)
    }

    pub(crate) async fn delete_user(&self, id: i64) -> Result<(User, RemovedCounts), DomainError> {
        let user = self
            .users
            .delete_user(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;

        let sessions = self.sessions.remove_by_user(user.id).await?;
        let posts = self.posts.remove_by_author(user.id, &user.username).await?;

        info!(
            user_id = id,
            username = %user.username,
            posts,
            sessions,
            "admin deleted user"
        );
        Ok((
            user,
            RemovedCounts {
                users: 1,
                posts,
                sessions,
            },
        ))
    }

    pub(crate) async fn clear_posts(&self) -> Result<RemovedCounts, DomainError> {
        let posts = self.posts.clear().await?;
        warn!(posts, "admin cleared all posts");
        Ok(RemovedCounts {
            posts,
            ..RemovedCounts::default()
        })
    }

    /// Users go together with everything that references them.
    pub(crate) async fn clear_users(&self) -> Result<RemovedCounts, DomainError> {
        let removed = self.clear_everything().await?;
        warn!(
            users = removed.users,
            posts = removed.posts,
            sessions = removed.sessions,
            "admin cleared all users"
        );
        Ok(removed)
    }

    pub(crate) async fn clear_all(&self) -> Result<RemovedCounts, DomainError> {
        let removed = self.clear_everything().await?;
        warn!(
            users = removed.users,
            posts = removed.posts,
            sessions = removed.sessions,
            "admin cleared all data"
        );
        Ok(removed)
    }

    pub(crate) async fn export(&self) -> Result<Export, DomainError> {
        Ok(Export {
            users: self.users.list_users().await?,
            posts: self.posts.list_posts().await?,
            sessions: self.sessions.list_sessions().await?,
        })
    }

    async fn clear_everything(&self) -> Result<RemovedCounts, DomainError> {
        // sessions first so no request can authenticate against a half-cleared state
        let sessions = self.sessions.clear().await?;
        let users = self.users.clear().await?;
        let posts = self.posts.clear().await?;
        Ok(RemovedCounts {
            users,
            posts,
            sessions,
        })
    }
}
