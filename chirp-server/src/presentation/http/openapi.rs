use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::MessageDto;
use crate::presentation::http::handlers::admin::{
    AdminActionDto, AdminUserDto, ExportDto, ExportedSessionDto, RemovedDto, StatsDto,
    UpdateUserDto, UpdateUserResponseDto,
};
use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto};
use crate::presentation::http::handlers::posts::{CreatePostDto, PostDto, UpdatePostDto};
use crate::presentation::http::handlers::system::{ApiIndexDto, HealthDto};
use crate::presentation::http::middleware::admin::ADMIN_PASSWORD_HEADER;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::system::api_index,
        crate::presentation::http::handlers::system::health,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::logout,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::admin::stats,
        crate::presentation::http::handlers::admin::list_users,
        crate::presentation::http::handlers::admin::update_user,
        crate::presentation::http::handlers::admin::delete_user,
        crate::presentation::http::handlers::admin::clear_all,
        crate::presentation::http::handlers::admin::clear_posts,
        crate::presentation::http::handlers::admin::clear_users,
        crate::presentation::http::handlers::admin::export
    ),
    components(
        schemas(
            MessageDto,
            HealthDto,
            ApiIndexDto,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            StatsDto,
            AdminUserDto,
            UpdateUserDto,
            UpdateUserResponseDto,
            RemovedDto,
            AdminActionDto,
            ExportedSessionDto,
            ExportDto
        )
    ),
    tags(
        (name = "system", description = "Health and service description"),
        (name = "auth", description = "Registration and sessions"),
        (name = "posts", description = "The shared feed"),
        (name = "admin", description = "Password-gated maintenance")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("opaque")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "admin_password",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_PASSWORD_HEADER))),
        );
        openapi.components = Some(components);
    }
}
