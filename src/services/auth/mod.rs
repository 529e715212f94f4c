pub mod channel;
pub mod codec;
pub mod factory;
pub mod jwt;
pub mod service;

pub use channel::AuthMode;
pub use factory::build_auth_service;
pub use service::{AuthError, AuthService};
