// Ticket cookie handling
//
// The serialized ticket travels in the `auth_tkt` cookie, scoped to the whole
// site with a 30-day expiry. Any process sharing the secret can re-derive and
// check it — no server-side session store.

use crate::error::{AuthError, AuthResult};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use jobdeck_ticket::AccessTicket;
use std::net::Ipv4Addr;

/// Cookie name shared with the front-end ticket checker.
pub const AUTH_COOKIE_NAME: &str = "auth_tkt";

/// Configuration for the ticket cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the Secure flag (true behind HTTPS).
    pub secure: bool,
    /// Cookie path; the ticket must cover the whole site.
    pub path: String,
    /// Client-enforced expiry in days. The codec itself never checks age.
    pub max_age_days: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            path: "/".to_string(),
            max_age_days: 30,
        }
    }
}

impl CookieConfig {
    /// Build the `auth_tkt` cookie for a freshly issued ticket.
    pub fn build<'a>(&self, ticket: &AccessTicket) -> Cookie<'a> {
        Cookie::build(AUTH_COOKIE_NAME, ticket.serialize())
            .path(self.path.clone())
            .max_age(CookieDuration::days(self.max_age_days))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Verify a presented cookie value and enforce max age.
    ///
    /// `now` is epoch seconds. Expired-but-authentic tickets are rejected
    /// the same way forged ones are handled by callers: as if no cookie was
    /// presented.
    pub fn verify(
        &self,
        value: &str,
        ip: Ipv4Addr,
        secret: &[u8],
        now: u32,
    ) -> AuthResult<AccessTicket> {
        let ticket = jobdeck_ticket::verify(value, ip, secret)?;
        let age_limit = (self.max_age_days as u64) * 24 * 60 * 60;
        if u64::from(now).saturating_sub(u64::from(ticket.issued_at)) > age_limit {
            return Err(AuthError::TicketExpired);
        }
        Ok(ticket)
    }
}
