pub(crate) mod admin_service;
pub(crate) mod auth_service;
pub(crate) mod post_service;
