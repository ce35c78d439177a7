//! Ticket issuance, serialization, and verification.
//!
//! Wire grammar (all one string, no separators between the fixed-width
//! fields):
//!
//! ```text
//! digest(32 lowercase hex) timestamp(8 hex) subject ["!" tokens ["!" extra]]
//! ```
//!
//! With an empty token list the tokens segment and its separator are dropped,
//! leaving `digest timestamp subject "!" extra`.
//!
//! The digest is the legacy two-round MD5 construction: the inner hash
//! covers `be32(ip) ++ be32(ts) ++ secret ++ subject ++ NUL ++ tokens ++ NUL
//! ++ extra`, and the outer hash covers the *hex form* of the inner hash
//! followed by the secret again. MD5 here is a compatibility requirement,
//! not a strength claim; the secret is what makes the digest unforgeable to
//! outsiders.

use crate::error::{Result, TicketError};
use jobdeck_commons::ProjectId;
use md5::{Digest, Md5};
use std::net::Ipv4Addr;
use subtle::ConstantTimeEq;

/// An issued, immutable access ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTicket {
    /// Issue time, seconds since the epoch.
    pub issued_at: u32,
    /// The authenticated username.
    pub subject: String,
    /// Authorized project tokens, in issue order.
    pub tokens: Vec<ProjectId>,
    /// Opaque extra data; conventionally a role token such as
    /// "administrator".
    pub extra: String,
    /// 128-bit digest binding all of the above to the shared secret.
    pub digest: [u8; 16],
}

impl AccessTicket {
    /// Serialize to the cookie wire form.
    pub fn serialize(&self) -> String {
        let tokens = join_tokens(&self.tokens);
        let head = format!("{}{:08x}{}", hex::encode(self.digest), self.issued_at, self.subject);
        if tokens.is_empty() {
            format!("{}!{}", head, self.extra)
        } else {
            format!("{}!{}!{}", head, tokens, self.extra)
        }
    }
}

/// A ticket parsed from the wire, not yet verified against the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTicket {
    pub digest: [u8; 16],
    pub issued_at: u32,
    pub subject: String,
    /// The raw comma-joined token segment. Kept verbatim so verification
    /// hashes exactly the bytes that were signed.
    pub tokens: String,
    pub extra: String,
}

impl ParsedTicket {
    pub fn token_list(&self) -> Vec<ProjectId> {
        if self.tokens.is_empty() {
            Vec::new()
        } else {
            self.tokens.split(',').map(ProjectId::from).collect()
        }
    }
}

/// Namespace for ticket operations; all methods are stateless.
pub struct TicketCodec;

impl TicketCodec {
    /// Issue a ticket for `subject` holding `tokens`, signed with `secret`.
    ///
    /// `now` is supplied by the caller so issuance is deterministic and
    /// testable. The subject must not contain `!` (it is the wire
    /// separator); tokens are project IDs and never do.
    pub fn issue(
        ip: Ipv4Addr,
        subject: &str,
        tokens: &[ProjectId],
        extra: &str,
        secret: &[u8],
        now: u32,
    ) -> AccessTicket {
        let joined = join_tokens(tokens);
        let digest = compute_digest(ip, now, subject, &joined, extra, secret);
        AccessTicket {
            issued_at: now,
            subject: subject.to_string(),
            tokens: tokens.to_vec(),
            extra: extra.to_string(),
            digest,
        }
    }
}

/// Parse the wire form without checking the digest.
pub fn parse(ticket: &str) -> Result<ParsedTicket> {
    if ticket.len() < 40 {
        return Err(TicketError::InvalidTicket(format!(
            "ticket too short ({} bytes)",
            ticket.len()
        )));
    }
    if !ticket.is_char_boundary(32) || !ticket.is_char_boundary(40) {
        return Err(TicketError::InvalidTicket("non-ascii ticket header".into()));
    }
    let mut digest = [0u8; 16];
    hex::decode_to_slice(&ticket[..32], &mut digest)
        .map_err(|_| TicketError::InvalidTicket("digest is not hex".into()))?;
    let issued_at = u32::from_str_radix(&ticket[32..40], 16)
        .map_err(|_| TicketError::InvalidTicket("timestamp is not hex".into()))?;

    // subject ["!" tokens ["!" extra]]; a single separator means the tokens
    // segment was dropped at issue time.
    let rest = &ticket[40..];
    let mut fields = rest.splitn(3, '!');
    let subject = fields.next().unwrap_or_default().to_string();
    let (tokens, extra) = match (fields.next(), fields.next()) {
        (Some(tokens), Some(extra)) => (tokens.to_string(), extra.to_string()),
        (Some(extra), None) => (String::new(), extra.to_string()),
        _ => (String::new(), String::new()),
    };

    Ok(ParsedTicket {
        digest,
        issued_at,
        subject,
        tokens,
        extra,
    })
}

/// Parse and check the digest against a recomputation with `secret`.
///
/// The comparison is constant-time. Expiry is not checked here; callers
/// enforce their own max-age against `issued_at`.
pub fn verify(ticket: &str, ip: Ipv4Addr, secret: &[u8]) -> Result<AccessTicket> {
    let parsed = parse(ticket)?;
    let expected = compute_digest(
        ip,
        parsed.issued_at,
        &parsed.subject,
        &parsed.tokens,
        &parsed.extra,
        secret,
    );
    if parsed.digest.ct_eq(&expected).unwrap_u8() != 1 {
        return Err(TicketError::TicketForged);
    }
    Ok(AccessTicket {
        issued_at: parsed.issued_at,
        subject: parsed.subject.clone(),
        tokens: parsed.token_list(),
        extra: parsed.extra,
        digest: parsed.digest,
    })
}

/// Lossy role accessor: the third `!`-separated field of the wire form, or
/// `""` when absent.
///
/// This reads the conventional role slot (extra data) without touching the
/// digest. It must never gate anything security-relevant on its own — run
/// [`verify`] first when the answer matters.
pub fn parse_role(ticket: &str) -> String {
    ticket.split('!').nth(2).unwrap_or_default().to_string()
}

fn join_tokens(tokens: &[ProjectId]) -> String {
    tokens
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// The mod_auth_tkt double-MD5. The outer round hashes the lowercase hex of
/// the inner round, not its raw bytes — that is what the legacy scheme does.
fn compute_digest(
    ip: Ipv4Addr,
    ts: u32,
    subject: &str,
    tokens: &str,
    extra: &str,
    secret: &[u8],
) -> [u8; 16] {
    let mut inner = Md5::new();
    inner.update(u32::from(ip).to_be_bytes());
    inner.update(ts.to_be_bytes());
    inner.update(secret);
    inner.update(subject.as_bytes());
    inner.update([0u8]);
    inner.update(tokens.as_bytes());
    inner.update([0u8]);
    inner.update(extra.as_bytes());
    let inner_hex = hex::encode(inner.finalize());

    let mut outer = Md5::new();
    outer.update(inner_hex.as_bytes());
    outer.update(secret);
    outer.finalize().into()
}
