use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::types::AssetId;

#[derive(Debug, Default)]
struct RegistryInner {
    /// Asset IDs slated for persistable key storage whose keys have not
    /// been stored yet.
    pending: HashSet<AssetId>,
    /// Asset ID to stream name, diagnostics only.
    stream_names: HashMap<AssetId, String>,
}

/**
    Tracks which asset IDs are slated for persistable (offline) key
    storage, and which stream each belongs to.

    A simple membership table, not a cache: entries are inserted before a
    preload request is submitted and read while the request is handled.
    Removal is owned by the persistence collaborator, so no removal
    operation exists here. A single mutex guards both structures.
*/
#[derive(Debug, Default)]
pub struct PendingKeyRegistry {
    inner: Mutex<RegistryInner>,
}

impl PendingKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Mark an asset as pending persistable key storage.

        Idempotent: re-marking an already pending asset only overwrites
        its recorded stream name.
    */
    pub fn mark_pending_persistable(&self, asset_id: &AssetId, stream_name: &str) {
        let mut inner = self.inner.lock().expect("pending key registry poisoned");
        inner.pending.insert(asset_id.clone());
        inner
            .stream_names
            .insert(asset_id.clone(), stream_name.to_owned());
    }

    pub fn is_pending_persistable(&self, asset_id: &AssetId) -> bool {
        let inner = self.inner.lock().expect("pending key registry poisoned");
        inner.pending.contains(asset_id)
    }

    /// Stream name recorded for an asset, if it was ever marked pending.
    pub fn stream_name(&self, asset_id: &AssetId) -> Option<String> {
        let inner = self.inner.lock().expect("pending key registry poisoned");
        inner.stream_names.get(asset_id).cloned()
    }
}
