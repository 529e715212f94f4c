pub mod flash;
pub mod health;
pub mod me;
pub mod session;
