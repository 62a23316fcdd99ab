//! Client-side content-key acquisition for FairPlay-style DRM playback.
//!
//! The platform decryption engine surfaces opaque "key needed" events; this
//! crate turns each one into a signed key request, ships it to the remote
//! key security module (KSM) over HTTPS, and feeds the encrypted key
//! response back to the engine. Persistable (offline) key preloading and
//! retry classification are layered on top.
//!
//! Typical wiring:
//! ```ignore
//! let config = KsmConfig::new(url, token);
//! let coordinator = Arc::new(KeyRequestCoordinator::new(
//!     CertificateProvider::new(Some(cert_b64)),
//!     KsmClient::new(config),
//!     Box::new(FsKeyStore::new(key_dir)?),
//!     PlatformCapabilities { persistable_keys: true },
//! ));
//!
//! // On each "key needed" event from the engine:
//! coordinator.handle_key_request(request).await;
//! ```

mod certificate;
mod config;
mod coordinator;
mod engine;
mod error;
mod identifier;
mod ksm;
mod registry;
mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use self::certificate::CertificateProvider;
pub use self::config::{KsmConfig, PlatformCapabilities};
pub use self::coordinator::{KeyRequestCoordinator, KeyRequestObserver};
pub use self::engine::{
    FsKeyStore, KeyRequest, KeySession, NoPersistableKeys, PersistableConversionUnsupported,
    PersistableKeyStore,
};
pub use self::error::{KeyError, KeyResult};
pub use self::identifier::resolve_asset_id;
pub use self::ksm::KsmClient;
pub use self::registry::PendingKeyRegistry;
pub use self::types::{AssetId, RetryReason};
