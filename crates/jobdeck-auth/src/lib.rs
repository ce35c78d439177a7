// jobdeck authentication library
// Provides the login gate, identity-service client, and ticket cookie helpers

pub mod cookie;
pub mod error;
pub mod gate;
pub mod identity;

pub use cookie::{CookieConfig, AUTH_COOKIE_NAME};
pub use error::{AuthError, AuthResult};
pub use gate::{GateState, LoginGate, LoginOutcome, LoginPrompt, ADMIN_ROLE};
pub use identity::{
    decode_identity_body, format_identity_date, HttpIdentityService, IdentityRequest,
    IdentityService,
};
