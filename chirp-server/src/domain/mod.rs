pub(crate) mod error;
pub(crate) mod post;
pub(crate) mod session;
pub(crate) mod user;
