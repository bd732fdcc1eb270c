use std::sync::Arc;

use http::HeaderMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OutboxConfig;
use crate::core::{CapturedEntry, OutboxError, Payload, Result, filter_headers};
use crate::forward::ForwardClient;
use crate::storage::EntryStore;

/// Operator batch: ids approved for forwarding and ids to discard.
/// Either list may be empty, overlap, or name ids that no longer exist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManageCommand {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<String>,
}

/// The captured-request lifecycle manager: owns the entry store and
/// drives capture, release/delete, and the inspection snapshot.
pub struct RequestOutbox {
    store: Arc<EntryStore>,
    forwarder: Arc<dyn ForwardClient>,
    config: OutboxConfig,
    /// Serializes manage batches so two concurrent batches cannot both
    /// forward the same entry. Held across a whole batch; the store
    /// lock is still only taken around lookups and removals.
    manage_gate: Mutex<()>,
}

impl RequestOutbox {
    pub fn new(config: OutboxConfig, forwarder: Arc<dyn ForwardClient>) -> Self {
        Self {
            store: Arc::new(EntryStore::new()),
            forwarder,
            config,
            manage_gate: Mutex::new(()),
        }
    }

    /// Shared handle to the store, for the eviction sweeper.
    pub fn store(&self) -> Arc<EntryStore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &OutboxConfig {
        &self.config
    }

    /// Record an inbound request. No forward happens here; the entry
    /// waits in the store until released, deleted, or evicted.
    pub async fn capture(
        &self,
        method: &str,
        target_url: Option<&str>,
        headers: &HeaderMap,
        body: Payload,
    ) -> Result<Arc<CapturedEntry>> {
        let target_url = match target_url {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => return Err(OutboxError::MissingTarget),
        };
        let headers = filter_headers(headers, &self.config.forward_headers);
        let entry = CapturedEntry::new(method.to_string(), target_url, headers, body);
        let entry = self.store.insert(entry).await?;
        info!(id = %entry.id, request = %entry.request_line(), "captured request");
        Ok(entry)
    }

    /// Apply an operator batch: forward `allowed` in the order given,
    /// then drop `deleted`.
    ///
    /// Forwarding is sequential by design: a transport failure aborts
    /// the remainder of `allowed` and leaves `deleted` unprocessed, so
    /// the store afterwards is a deterministic, inspectable remainder.
    /// Absent or unparseable ids are skipped without error.
    pub async fn manage(&self, command: ManageCommand) -> Result<()> {
        let _gate = self.manage_gate.lock().await;
        info!(
            allowed = command.allowed.len(),
            deleted = command.deleted.len(),
            "received manage batch"
        );

        for id in parse_ids(&command.allowed) {
            // Absent means already evicted or removed; nothing to do.
            let Some(entry) = self.store.get(&id).await else {
                continue;
            };
            self.release(&entry).await?;
        }

        for id in parse_ids(&command.deleted) {
            if self.store.remove(&id).await.is_some() {
                info!(%id, "deleted entry");
            }
        }

        let remaining = self.store.len().await;
        info!(remaining, "manage batch applied");
        Ok(())
    }

    /// Forward one entry and remove it. The entry is removed on any
    /// completed call, delivery-failure statuses included; the store
    /// tracks pending disposition, not delivery success.
    async fn release(&self, entry: &CapturedEntry) -> Result<()> {
        let receipt = self.forwarder.forward(entry).await?;
        if receipt.status >= 400 {
            warn!(
                id = %entry.id,
                status = receipt.status,
                response = %receipt.body,
                "forward target answered with error status"
            );
        } else {
            info!(id = %entry.id, status = receipt.status, "forwarded entry");
        }
        self.store.remove(&entry.id).await;
        Ok(())
    }

    /// Snapshot of the current entries, most recent capture first.
    /// Read-only; successive snapshots may differ as traffic arrives.
    pub async fn entries(&self) -> Vec<Arc<CapturedEntry>> {
        let mut entries = self.store.snapshot().await;
        entries.sort_by(|a, b| b.captured_on.cmp(&a.captured_on));
        entries
    }
}

fn parse_ids(raw: &[String]) -> impl Iterator<Item = Uuid> + '_ {
    raw.iter().filter_map(|id| Uuid::parse_str(id).ok())
}
