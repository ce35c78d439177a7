//! Login gate
//!
//! Validates user credentials against the external identity service and, on
//! success, issues a ticket cookie and a redirect. The gate has exactly two
//! states: `AwaitingCredentials` (render the login form, possibly with a
//! message) and `Authenticated` (terminal; the ticket cookie is set and the
//! browser is redirected). Failed or undecodable validation keeps the gate
//! in `AwaitingCredentials` with an "invalid login" message and sets no
//! cookie.

use crate::cookie::CookieConfig;
use crate::error::{AuthError, AuthResult};
use crate::identity::{decode_identity_body, IdentityRequest, IdentityService};
use chrono::{DateTime, Utc};
use jobdeck_commons::ProjectId;
use jobdeck_ticket::{AccessTicket, TicketCodec};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// The gate's two states. `Authenticated` is terminal for a session; a new
/// login attempt simply overwrites the cookie (latest successful one wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    AwaitingCredentials,
    Authenticated,
}

/// Display-ready description of the login form. Rendering is external; the
/// gate only decides what the form should say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    /// Message shown above the form, when any ("invalid login",
    /// "not authorized for this project", ...).
    pub message: Option<String>,
    /// Return URL carried through the form round trip.
    pub back: Option<String>,
}

/// Outcome of one credential submission.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Transition to `Authenticated`: set the cookie, redirect.
    Authenticated {
        ticket: AccessTicket,
        redirect: String,
    },
    /// Remain in `AwaitingCredentials` with a non-empty message.
    Rejected(LoginPrompt),
}

impl LoginOutcome {
    pub fn state(&self) -> GateState {
        match self {
            LoginOutcome::Authenticated { .. } => GateState::Authenticated,
            LoginOutcome::Rejected(_) => GateState::AwaitingCredentials,
        }
    }
}

/// The login gate. One instance serves all sessions; per-attempt state lives
/// on the stack (concurrent attempts are independent).
pub struct LoginGate {
    identity: Arc<dyn IdentityService>,
    secret: Vec<u8>,
    /// Redirect target when the caller did not supply a `back` URL.
    default_url: String,
    /// Usernames whose tickets carry the "administrator" role slot.
    admin_users: Vec<String>,
    pub cookie: CookieConfig,
}

/// Role token stored in the ticket's extra-data slot for administrators.
pub const ADMIN_ROLE: &str = "administrator";

impl LoginGate {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        secret: Vec<u8>,
        default_url: impl Into<String>,
        admin_users: Vec<String>,
        cookie: CookieConfig,
    ) -> Self {
        Self {
            identity,
            secret,
            default_url: default_url.into(),
            admin_users,
            cookie,
        }
    }

    /// Describe the login form for a request without credentials.
    pub fn challenge(&self, unauthorized: bool, back: Option<&str>) -> LoginPrompt {
        LoginPrompt {
            message: unauthorized.then(|| {
                "You are not authorized for this project. \
                 Maybe login with different credentials?"
                    .to_string()
            }),
            back: back.map(str::to_string),
        }
    }

    /// Validate one credential submission.
    ///
    /// Returns `Rejected` for bad credentials and for responses that stay
    /// undecodable after the legacy-encoding fallback; both are recovered
    /// locally. Transport failure is the only hard error.
    pub async fn submit(
        &self,
        username: &str,
        password: &str,
        client_ip: Ipv4Addr,
        back: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<LoginOutcome> {
        let request = IdentityRequest::new(username, password, now);
        let body = self.identity.validate(&request).await?;

        let tokens = match self.extract_tokens(username, &body) {
            Ok(tokens) => tokens,
            // Recovered locally: stay in AwaitingCredentials with a
            // user-facing message, internals never surface.
            Err(AuthError::InvalidCredentials) => return Ok(self.rejected(back)),
            Err(err) => return Err(err),
        };
        let role = if self.admin_users.iter().any(|u| u == username) {
            ADMIN_ROLE
        } else {
            ""
        };
        let ticket = TicketCodec::issue(
            client_ip,
            username,
            &tokens,
            role,
            &self.secret,
            now.timestamp() as u32,
        );
        let redirect = match back {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.default_url.clone(),
        };
        log::info!(
            "login ok for {} ({} project tokens)",
            username,
            ticket.tokens.len()
        );
        Ok(LoginOutcome::Authenticated { ticket, redirect })
    }

    /// Verify the ticket cookie presented on a console request.
    pub fn authenticate(
        &self,
        cookie_value: &str,
        client_ip: Ipv4Addr,
        now: u32,
    ) -> AuthResult<AccessTicket> {
        self.cookie
            .verify(cookie_value, client_ip, &self.secret, now)
    }

    /// Interpret the identity reply. An explicit error code and an
    /// undecodable body both count as invalid credentials.
    fn extract_tokens(&self, username: &str, body: &[u8]) -> AuthResult<Vec<ProjectId>> {
        let reply = decode_identity_body(body).ok_or_else(|| {
            log::warn!(
                "identity response undecodable ({} bytes); treating as invalid login",
                body.len()
            );
            AuthError::InvalidCredentials
        })?;
        if reply.get("errorCode").is_some() {
            log::debug!("identity service rejected credentials for {}", username);
            return Err(AuthError::InvalidCredentials);
        }
        Ok(project_tokens(&reply))
    }

    fn rejected(&self, back: Option<&str>) -> LoginOutcome {
        LoginOutcome::Rejected(LoginPrompt {
            message: Some("Invalid login".to_string()),
            back: back.map(str::to_string),
        })
    }
}

/// Extract the authorized project tokens from a successful identity reply.
///
/// The reply carries projects as a JSON object keyed by project ID. Key
/// order is not preserved through JSON maps, so IDs are ordered numerically
/// (lexicographically for the odd non-numeric ID) to keep the ticket's token
/// segment deterministic.
fn project_tokens(reply: &serde_json::Value) -> Vec<ProjectId> {
    let mut tokens: Vec<ProjectId> = reply
        .get("projects")
        .and_then(|p| p.as_object())
        .map(|map| map.keys().map(|k| ProjectId::new(k.clone())).collect())
        .unwrap_or_default();
    tokens.sort_by(|a, b| match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.as_str().cmp(b.as_str()),
    });
    tokens
}
