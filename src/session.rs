//! Per-ticket browsing sessions.
//!
//! Each verified ticket gets one [`JobBrowser`], keyed by the ticket digest
//! (the digest is unique per issued ticket and already unguessable). The
//! browser is wrapped in an async mutex so a session's actions are
//! serialized; sessions never share state with each other.

use dashmap::DashMap;
use jobdeck_browser::JobBrowser;
use jobdeck_client::StatusClient;
use jobdeck_ticket::AccessTicket;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Mutex<JobBrowser>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the browser for a verified ticket.
    pub fn session_for(
        &self,
        ticket: &AccessTicket,
        serialized: &str,
        client: &Arc<StatusClient>,
        max_rows: Option<u32>,
    ) -> Arc<Mutex<JobBrowser>> {
        let key = hex::encode(ticket.digest);
        // Count before taking the entry lock; len() walks the same shards.
        let active = self.sessions.len();
        self.sessions
            .entry(key)
            .or_insert_with(|| {
                log::debug!(
                    "new browsing session for {} ({} already active)",
                    ticket.subject,
                    active
                );
                Arc::new(Mutex::new(JobBrowser::new(
                    client.clone(),
                    serialized.to_string(),
                    max_rows,
                )))
            })
            .clone()
    }

    /// Drop a session (e.g. after its ticket stopped verifying).
    pub fn evict(&self, ticket_digest: &[u8; 16]) {
        self.sessions.remove(&hex::encode(ticket_digest));
    }
}
