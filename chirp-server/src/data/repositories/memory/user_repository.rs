use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<i64, UserCredentials>,
    last_id: i64,
}

impl UserTable {
    fn conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<i64>,
    ) -> Option<&'static str> {
        self.rows
            .values()
            .filter(|row| Some(row.user.id) != except)
            .find_map(|row| {
                if username == Some(row.user.username.as_str()) {
                    Some("username")
                } else if email == Some(row.user.email.as_str()) {
                    Some("email")
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        if let Some(resource) = table.conflict(
            Some(input.username.as_str()),
            Some(input.email.as_str()),
            None,
        ) {
            return Err(DomainError::AlreadyExists(resource.to_string()));
        }

        table.last_id += 1;
        let user = User::new(table.last_id, input.username, input.email, Utc::now())?;
        table.rows.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|row| row.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|row| row.user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|row| row.user.email == email)
            .cloned())
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError> {
        let table = self.table.read().await;
        Ok(table.conflict(Some(username), Some(email), None).is_some())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().map(|row| row.user.clone()).collect())
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(resource) =
            table.conflict(patch.username.as_deref(), patch.email.as_deref(), Some(id))
        {
            return Err(DomainError::AlreadyExists(resource.to_string()));
        }

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            row.user.username = username;
        }
        if let Some(email) = patch.email {
            row.user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            row.password_hash = password_hash;
        }
        Ok(Some(row.user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).map(|row| row.user))
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let mut table = self.table.write().await;
        let removed = table.rows.len();
        table.rows.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryUserRepository;
    use crate::data::user_repository::{NewUser, UserPatch, UserRepository};
    use crate::domain::error::DomainError;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_user_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let alice = repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");
        let bob = repo.create_user(new_user("bob", "b@x.com")).await.expect("bob");

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn create_user_rejects_taken_username_or_email() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");

        let err = repo
            .create_user(new_user("alice", "other@x.com"))
            .await
            .expect_err("username is taken");
        assert!(matches!(err, DomainError::AlreadyExists(ref r) if r == "username"));

        let err = repo
            .create_user(new_user("alice2", "a@x.com"))
            .await
            .expect_err("email is taken");
        assert!(matches!(err, DomainError::AlreadyExists(ref r) if r == "email"));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");

        repo.create_user(new_user("Alice", "A@x.com"))
            .await
            .expect("different case is a different user");
        assert!(repo.find_by_username("ALICE").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");
        repo.delete_user(alice.id).await.expect("delete");

        let bob = repo.create_user(new_user("bob", "b@x.com")).await.expect("bob");
        assert_eq!(bob.id, 2);
    }

    #[tokio::test]
    async fn update_user_checks_other_users_only() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");
        repo.create_user(new_user("bob", "b@x.com")).await.expect("bob");

        let same = repo
            .update_user(
                alice.id,
                UserPatch {
                    username: Some("alice".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .expect("own username is not a conflict");
        assert!(same.is_some());

        let err = repo
            .update_user(
                alice.id,
                UserPatch {
                    email: Some("b@x.com".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .expect_err("bob's email is taken");
        assert!(matches!(err, DomainError::AlreadyExists(_)));

        let missing = repo
            .update_user(99, UserPatch::default())
            .await
            .expect("missing user is not an error");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_user_replaces_password_hash() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create_user(new_user("alice", "a@x.com")).await.expect("alice");

        repo.update_user(
            alice.id,
            UserPatch {
                password_hash: Some("new-hash".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .expect("update");

        let creds = repo
            .find_by_email("a@x.com")
            .await
            .expect("lookup")
            .expect("alice exists");
        assert_eq!(creds.password_hash, "new-hash");
    }
}
