//! In-memory registry of received uploads awaiting conversion.
//!
//! Uploads expire after a configurable time; a background task sweeps them
//! out, which deletes their temporary files.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::converter::Upload;

/// Thread-safe store of uploads keyed by id.
///
/// Entries are reference counted, so an upload that is removed while a
/// conversion is still reading it stays on disk until that conversion ends.
#[derive(Clone)]
pub struct UploadStore {
    uploads: Arc<DashMap<Uuid, Arc<Upload>>>,
    /// Age after which an upload is discarded.
    ttl: Duration,
}

impl UploadStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            uploads: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Register an upload and return the shared handle.
    pub fn insert(&self, upload: Upload) -> Arc<Upload> {
        let upload = Arc::new(upload);
        self.uploads.insert(upload.id(), upload.clone());
        upload
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Upload>> {
        self.uploads.get(id).map(|entry| entry.value().clone())
    }

    /// Forget an upload. Returns `false` if it was unknown.
    pub fn remove(&self, id: &Uuid) -> bool {
        match self.uploads.remove(id) {
            Some((_, upload)) => {
                tracing::info!(upload_id = %id, filename = %upload.filename(), "Upload removed");
                true
            }
            None => false,
        }
    }

    /// Drop uploads older than the TTL.
    ///
    /// # Returns
    /// The number of uploads that were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(3600));

        let mut removed_count = 0;
        self.uploads.retain(|id, upload| {
            let age = now - upload.received_at();
            if age > ttl {
                tracing::info!(
                    upload_id = %id,
                    age_secs = age.num_seconds(),
                    "Expired upload removed"
                );
                removed_count += 1;
                false
            } else {
                true
            }
        });

        if removed_count > 0 {
            tracing::debug!(removed = removed_count, "Cleaned up expired uploads");
        }

        removed_count
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

/// Start a background task that periodically discards expired uploads.
pub fn start_cleanup_task(store: UploadStore, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            store.cleanup_expired();
        }
    })
}
