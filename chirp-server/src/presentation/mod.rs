use std::sync::Arc;

use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::data::repositories::memory::post_repository::InMemoryPostRepository;
use crate::data::repositories::memory::session_repository::InMemorySessionRepository;
use crate::data::repositories::memory::user_repository::InMemoryUserRepository;
use crate::infrastructure::password::PasswordHasher;
use crate::infrastructure::settings::DEVELOPMENT;

pub(crate) mod http;

pub(crate) type AppAuthService = AuthService<InMemoryUserRepository, InMemorySessionRepository>;
pub(crate) type AppPostService = PostService<InMemoryPostRepository, InMemoryUserRepository>;
pub(crate) type AppAdminService =
    AdminService<InMemoryUserRepository, InMemorySessionRepository, InMemoryPostRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) admin_service: Arc<AppAdminService>,
    pub(crate) admin_password: Arc<str>,
    pub(crate) environment: Arc<str>,
    /// 500 bodies carry the underlying error text; development only.
    pub(crate) expose_internal_errors: bool,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AppAuthService>,
        post_service: Arc<AppPostService>,
        admin_service: Arc<AppAdminService>,
        admin_password: &str,
        environment: &str,
    ) -> Self {
        Self {
            auth_service,
            post_service,
            admin_service,
            admin_password: admin_password.into(),
            environment: environment.into(),
            expose_internal_errors: environment == DEVELOPMENT,
        }
    }

    /// Wires every service over one shared set of in-memory stores.
    pub(crate) fn in_memory(hasher: PasswordHasher, admin_password: &str, environment: &str) -> Self {
        let users = InMemoryUserRepository::new();
        let sessions = InMemorySessionRepository::new();
        let posts = InMemoryPostRepository::new();

        let auth_service = AuthService::new(users.clone(), sessions.clone(), hasher.clone());
        let post_service = PostService::new(posts.clone(), users.clone());
        let admin_service = AdminService::new(users, sessions, posts, hasher);

        Self::new(
            Arc::new(auth_service),
            Arc::new(post_service),
            Arc::new(admin_service),
            admin_password,
            environment,
        )
    }
}
