pub mod auth;
pub mod flash;
