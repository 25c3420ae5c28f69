//! Process-lifetime stores. Every record is lost on restart.

pub(crate) mod post_repository;
pub(crate) mod session_repository;
pub(crate) mod user_repository;
