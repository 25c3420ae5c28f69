use tracing::info;

use crate::data::session_repository::SessionRepository;
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::password::PasswordHasher;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) token: String,
}

pub(crate) struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    hasher: PasswordHasher,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub(crate) fn new(users: U, sessions: S, hasher: PasswordHasher) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Creates the user and logs them in.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        // Cheap early rejection; the store re-checks atomically on insert.
        if self.users.exists(&req.username, &req.email).await? {
            return Err(DomainError::AlreadyExists("user".to_string()));
        }

        let password_hash = self.hasher.hash_password_blocking(req.password).await?;
        let user = self
            .users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        let session = self.sessions.create_session(user.id).await?;
        info!(user_id = user.id, username = %user.username, "user registered");

        Ok(AuthResult {
            user,
            token: session.token,
        })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(creds) = self.find_credentials(&req.identifier).await? else {
            // keep the response time close to the wrong-password path
            self.hasher.hash_password_blocking(req.password).await?;
            return Err(DomainError::InvalidCredentials);
        };

        self.hasher
            .verify_password_blocking(req.password, creds.password_hash)
            .await?;

        let session = self.sessions.create_session(creds.user.id).await?;
        info!(user_id = creds.user.id, username = %creds.user.username, "user logged in");

        Ok(AuthResult {
            user: creds.user,
            token: session.token,
        })
    }

    /// Removes the session if there is one. Unknown tokens are not an error.
    pub(crate) async fn logout(&self, token: &str) -> Result<bool, DomainError> {
        let removed = self.sessions.remove_session(token).await?;
        if removed {
            info!("session closed");
        }
        Ok(removed)
    }

    /// Resolves a bearer token to its user. Tokens whose user no longer
    /// exists resolve to `None` just like unknown tokens.
    pub(crate) async fn authenticate(&self, token: &str) -> Result<Option<User>, DomainError> {
        let Some(session) = self.sessions.find_session(token).await? else {
            return Ok(None);
        };
        self.users.find_by_id(session.user_id).await
    }

    async fn find_credentials(
        &self,
        identifier: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        if let Some(creds) = self.users.find_by_username(identifier).await? {
            return Ok(Some(creds));
        }
        self.users.find_by_email(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::AuthService;
    use crate::data::repositories::memory::session_repository::InMemorySessionRepository;
    use crate::data::repositories::memory::user_repository::InMemoryUserRepository;
    use crate::data::session_repository::SessionRepository;
    use crate::data::user_repository::UserRepository;
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest};
    use crate::infrastructure::password::cheap_hasher;

    type Service = AuthService<InMemoryUserRepository, InMemorySessionRepository>;

    fn service() -> (Service, InMemoryUserRepository, InMemorySessionRepository) {
        let users = InMemoryUserRepository::new();
        let sessions = InMemorySessionRepository::new();
        let service = AuthService::new(users.clone(), sessions.clone(), cheap_hasher());
        (service, users, sessions)
    }

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_req(identifier: &str, password: &str) -> LoginRequest {
        LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_session() {
        let (service, users, sessions) = service();

        let result = service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("register must succeed");

        assert_eq!(result.user.username, "alice");
        assert!(!result.token.is_empty());
        assert_eq!(users.count().await.expect("count"), 1);

        let session = sessions
            .find_session(&result.token)
            .await
            .expect("lookup")
            .expect("session must exist");
        assert_eq!(session.user_id, result.user.id);

        let creds = users
            .find_by_username("alice")
            .await
            .expect("lookup")
            .expect("user must exist");
        assert_ne!(creds.password_hash, "pw123");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username_or_email() {
        let (service, _, _) = service();
        service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("first register");

        let err = service
            .register(register_req("alice", "other@x.com", "pw"))
            .await
            .expect_err("duplicate username");
        assert!(matches!(err, DomainError::AlreadyExists(_)));

        let err = service
            .register(register_req("bob", "a@x.com", "pw"))
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, DomainError::AlreadyExists(_)));

        service
            .register(register_req("bob", "b@x.com", "pw"))
            .await
            .expect("distinct user must not collide");
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let (service, _, sessions) = service();
        let registered = service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("register");

        let by_name = service
            .login(login_req("alice", "pw123"))
            .await
            .expect("login by username");
        let by_email = service
            .login(login_req("a@x.com", "pw123"))
            .await
            .expect("login by email");

        assert_eq!(by_name.user.id, registered.user.id);
        assert_eq!(by_email.user.id, registered.user.id);
        assert_ne!(by_name.token, by_email.token);
        // earlier sessions stay valid
        assert_eq!(sessions.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (service, _, _) = service();
        service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("register");

        let wrong_password = service
            .login(login_req("alice", "nope"))
            .await
            .expect_err("wrong password");
        let unknown_user = service
            .login(login_req("mallory", "pw123"))
            .await
            .expect_err("unknown user");

        assert!(matches!(wrong_password, DomainError::InvalidCredentials));
        assert!(matches!(unknown_user, DomainError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn logout_invalidates_token_and_is_idempotent() {
        let (service, _, _) = service();
        let result = service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("register");

        assert!(service.authenticate(&result.token).await.expect("auth").is_some());

        assert!(service.logout(&result.token).await.expect("logout"));
        assert!(!service.logout(&result.token).await.expect("logout again"));
        assert!(service.authenticate(&result.token).await.expect("auth").is_none());
    }

    #[tokio::test]
    async fn dangling_session_does_not_authenticate() {
        let (service, users, _) = service();
        let result = service
            .register(register_req("alice", "a@x.com", "pw123"))
            .await
            .expect("register");

        users.delete_user(result.user.id).await.expect("delete");

        assert!(service.authenticate(&result.token).await.expect("auth").is_none());
    }
}
