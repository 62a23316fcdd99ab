use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{KeyError, KeyResult};
use crate::types::AssetId;

/**
    Marker returned when a key request cannot be converted into a
    persistable-key request.

    Not part of the error taxonomy: the coordinator answers it by falling
    back to the online key path, and it is never reported upstream. This
    is expected, for example, for key requests arriving from an
    external-display mirroring session.
*/
#[derive(Debug, Clone, Copy, Error)]
#[error("platform session does not support persistable key requests")]
pub struct PersistableConversionUnsupported;

/**
    One opaque key request surfaced by the platform decryption engine.

    The engine owns request construction and decryption; this crate only
    drives the exchange. `produce_payload` may complete on an arbitrary
    worker context.
*/
#[async_trait]
pub trait KeyRequest: Send + Sync {
    /// The key-identifier URI this request was raised for.
    fn identifier(&self) -> &str;

    /// Produce the signed key request payload (SPC) bound to the given
    /// application certificate and asset ID bytes.
    async fn produce_payload(&self, certificate: &[u8], asset_id: &[u8]) -> KeyResult<Vec<u8>>;

    /// Ask the engine to re-issue this request as a persistable-key
    /// request.
    fn convert_to_persistable(&self) -> Result<(), PersistableConversionUnsupported>;

    /// Hand the key response payload (CKC) back to the engine to finalize
    /// decryption.
    fn supply_response(&self, response: Vec<u8>);

    /// Report a terminal failure for this request to the engine's error
    /// channel.
    fn supply_error(&self, error: KeyError);
}

/**
    Seam through which the coordinator asks the platform engine to start
    processing a key identifier, used for persistable key preloading.
*/
pub trait KeySession: Send + Sync {
    fn process_key_request(&self, identifier: &str);
}

/**
    Opaque predicate over durable persistable-key storage.

    Queried only on platforms supporting persistable keys. Lookup
    semantics belong to the implementation; the coordinator only consumes
    the boolean.
*/
pub trait PersistableKeyStore: Send + Sync {
    fn persistable_key_exists(&self, asset_id: &AssetId) -> bool;
}

/**
    Filesystem-backed store: one `<asset-id>.key` file per persisted key
    inside a dedicated directory.

    Writing the key files is owned by the persistence collaborator; this
    type only bootstraps the directory and answers existence queries.
*/
#[derive(Debug, Clone)]
pub struct FsKeyStore {
    directory: PathBuf,
}

impl FsKeyStore {
    /**
        Open (creating if needed) the content key directory.
    */
    pub fn new(directory: impl Into<PathBuf>) -> io::Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &std::path::Path {
        &self.directory
    }
}

impl PersistableKeyStore for FsKeyStore {
    fn persistable_key_exists(&self, asset_id: &AssetId) -> bool {
        self.directory.join(format!("{asset_id}.key")).is_file()
    }
}

/**
    Store for platforms without persistable key support; reports every
    lookup as absent.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistableKeys;

impl PersistableKeyStore for NoPersistableKeys {
    fn persistable_key_exists(&self, _asset_id: &AssetId) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_finds_persisted_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKeyStore::new(dir.path().join(".keys")).unwrap();
        std::fs::write(store.directory().join("asset-42.key"), b"ckc").unwrap();

        assert!(store.persistable_key_exists(&AssetId::new("asset-42")));
        assert!(!store.persistable_key_exists(&AssetId::new("asset-43")));
    }

    #[test]
    fn fs_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join(".keys");
        let store = FsKeyStore::new(&nested).unwrap();
        assert!(store.directory().is_dir());
        assert!(!store.persistable_key_exists(&AssetId::new("anything")));
    }

    #[test]
    fn no_persistable_keys_is_always_empty() {
        assert!(!NoPersistableKeys.persistable_key_exists(&AssetId::new("asset-42")));
    }
}
