pub(crate) mod logging;
pub(crate) mod password;
pub(crate) mod settings;
pub(crate) mod token;
