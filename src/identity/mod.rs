pub mod authorizer;
pub mod principal;
pub mod provider;

pub use authorizer::{admin_allowlist, is_admin};
pub use principal::Principal;
pub use provider::{AuthService, HostedAuth, SessionToken};
