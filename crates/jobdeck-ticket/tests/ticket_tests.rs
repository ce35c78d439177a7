//! Unit tests for ticket issuance, serialization, and verification.
//!
//! Tests cover:
//! - Digest determinism and input sensitivity
//! - Wire grammar (token segment omission, role slot)
//! - Verification against tampering and wrong secrets
//! - Structural parse failures

use jobdeck_commons::ProjectId;
use jobdeck_ticket::{parse, parse_role, verify, TicketCodec, TicketError};
use std::net::Ipv4Addr;

const SECRET: &[u8] = b"k6Zw9pJ4uG1rX2tD8sQ0mB5nV7cY3hL/";
const NOW: u32 = 1_700_000_000;

fn alice_tokens() -> Vec<ProjectId> {
    vec![ProjectId::from("12"), ProjectId::from("47")]
}

fn issue_alice() -> jobdeck_ticket::AccessTicket {
    TicketCodec::issue(
        Ipv4Addr::new(10, 1, 2, 3),
        "alice",
        &alice_tokens(),
        "administrator",
        SECRET,
        NOW,
    )
}

/// Issuing twice with identical inputs yields an identical digest.
#[test]
fn test_digest_deterministic() {
    assert_eq!(issue_alice().digest, issue_alice().digest);
    assert_eq!(issue_alice().serialize(), issue_alice().serialize());
}

/// Changing any one input changes the digest.
#[test]
fn test_digest_sensitive_to_every_input() {
    let base = issue_alice().digest;
    let ip = Ipv4Addr::new(10, 1, 2, 3);

    let other_ip = TicketCodec::issue(
        Ipv4Addr::new(10, 1, 2, 4),
        "alice",
        &alice_tokens(),
        "administrator",
        SECRET,
        NOW,
    );
    assert_ne!(base, other_ip.digest, "ip must be signed");

    let other_subject =
        TicketCodec::issue(ip, "alicia", &alice_tokens(), "administrator", SECRET, NOW);
    assert_ne!(base, other_subject.digest, "subject must be signed");

    let other_tokens = TicketCodec::issue(
        ip,
        "alice",
        &[ProjectId::from("12")],
        "administrator",
        SECRET,
        NOW,
    );
    assert_ne!(base, other_tokens.digest, "tokens must be signed");

    let other_extra = TicketCodec::issue(ip, "alice", &alice_tokens(), "", SECRET, NOW);
    assert_ne!(base, other_extra.digest, "extra data must be signed");

    let other_secret = TicketCodec::issue(
        ip,
        "alice",
        &alice_tokens(),
        "administrator",
        b"another secret entirely",
        NOW,
    );
    assert_ne!(base, other_secret.digest, "secret must be signed");

    let other_time = TicketCodec::issue(
        ip,
        "alice",
        &alice_tokens(),
        "administrator",
        SECRET,
        NOW + 1,
    );
    assert_ne!(base, other_time.digest, "timestamp must be signed");
}

/// The serialized tokens segment is exactly the comma-joined project IDs.
#[test]
fn test_token_segment_wire_form() {
    let wire = issue_alice().serialize();
    let fields: Vec<&str> = wire.split('!').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[1], "12,47");
    assert!(fields[0].ends_with("alice"));
    assert_eq!(&wire[32..40], format!("{:08x}", NOW));
}

/// With no tokens the segment and its separator are dropped, but the extra
/// segment keeps its single separator.
#[test]
fn test_empty_tokens_omit_segment() {
    let ticket = TicketCodec::issue(
        Ipv4Addr::new(10, 1, 2, 3),
        "bob",
        &[],
        "administrator",
        SECRET,
        NOW,
    );
    let wire = ticket.serialize();
    assert_eq!(wire.matches('!').count(), 1);
    assert!(wire.ends_with("bob!administrator"));

    // A single-separator ticket has no role slot.
    assert_eq!(parse_role(&wire), "");
    let parsed = parse(&wire).unwrap();
    assert_eq!(parsed.subject, "bob");
    assert!(parsed.tokens.is_empty());
    assert_eq!(parsed.extra, "administrator");
}

/// The role slot is the third !-separated field.
#[test]
fn test_parse_role() {
    assert_eq!(parse_role(&issue_alice().serialize()), "administrator");

    let plain = TicketCodec::issue(
        Ipv4Addr::new(10, 1, 2, 3),
        "alice",
        &alice_tokens(),
        "",
        SECRET,
        NOW,
    );
    assert_eq!(parse_role(&plain.serialize()), "");
}

/// A ticket round-trips through serialize → verify with the same secret.
#[test]
fn test_verify_round_trip() {
    let issued = issue_alice();
    let ok = verify(&issued.serialize(), Ipv4Addr::new(10, 1, 2, 3), SECRET).unwrap();
    assert_eq!(ok.subject, "alice");
    assert_eq!(ok.tokens, alice_tokens());
    assert_eq!(ok.extra, "administrator");
    assert_eq!(ok.issued_at, NOW);
    assert_eq!(ok.digest, issued.digest);
}

/// Any tampering with the payload is caught as forgery.
#[test]
fn test_verify_rejects_tampering() {
    let wire = issue_alice().serialize();

    let promoted = wire.replace("12,47", "12,47,999");
    assert_eq!(
        verify(&promoted, Ipv4Addr::new(10, 1, 2, 3), SECRET),
        Err(TicketError::TicketForged)
    );

    let renamed = wire.replace("alice", "mallory");
    assert_eq!(
        verify(&renamed, Ipv4Addr::new(10, 1, 2, 3), SECRET),
        Err(TicketError::TicketForged)
    );
}

/// A digest made with a different secret never verifies.
#[test]
fn test_verify_rejects_wrong_secret() {
    let wire = issue_alice().serialize();
    assert_eq!(
        verify(&wire, Ipv4Addr::new(10, 1, 2, 3), b"not the shared secret"),
        Err(TicketError::TicketForged)
    );
}

/// The digest binds the client IP.
#[test]
fn test_verify_rejects_other_ip() {
    let wire = issue_alice().serialize();
    assert_eq!(
        verify(&wire, Ipv4Addr::new(192, 168, 0, 9), SECRET),
        Err(TicketError::TicketForged)
    );
}

/// Structurally broken cookies are invalid, not forged.
#[test]
fn test_malformed_tickets_are_invalid() {
    for bad in ["", "tooshort", &"ff".repeat(20)[..39]] {
        assert!(
            matches!(verify(bad, Ipv4Addr::LOCALHOST, SECRET), Err(TicketError::InvalidTicket(_))),
            "{bad:?} should be structurally invalid"
        );
    }
}
