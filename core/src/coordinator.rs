use std::sync::Arc;

use tracing::{debug, warn};

use crate::certificate::CertificateProvider;
use crate::config::PlatformCapabilities;
use crate::engine::{KeyRequest, KeySession, PersistableKeyStore};
use crate::error::KeyError;
use crate::identifier::resolve_asset_id;
use crate::ksm::KsmClient;
use crate::registry::PendingKeyRegistry;
use crate::types::{AssetId, RetryReason};

type SucceededHook = Box<dyn Fn(&str) + Send + Sync>;
type FailedHook = Box<dyn Fn(&str, &KeyError) + Send + Sync>;

/**
    Optional observability hooks invoked from the coordinator's
    success/failure notifications. Defaults to log-only; no core logic
    depends on these.
*/
#[derive(Default)]
pub struct KeyRequestObserver {
    on_succeeded: Option<SucceededHook>,
    on_failed: Option<FailedHook>,
}

impl KeyRequestObserver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_succeeded(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_succeeded = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_failed(mut self, hook: impl Fn(&str, &KeyError) + Send + Sync + 'static) -> Self {
        self.on_failed = Some(Box::new(hook));
        self
    }
}

/**
    Drives one key request end-to-end: resolve the identifier, decide
    between the online and persistable paths, run the KSM exchange, and
    hand the result back to the platform engine.

    One coordinator instance serves a whole playback session and is shared
    behind an [`Arc`]. Requests for different assets are independent; the
    engine is responsible for not issuing overlapping requests for the
    same asset.
*/
pub struct KeyRequestCoordinator {
    certificates: CertificateProvider,
    ksm: KsmClient,
    registry: PendingKeyRegistry,
    store: Box<dyn PersistableKeyStore>,
    capabilities: PlatformCapabilities,
    observer: KeyRequestObserver,
}

impl KeyRequestCoordinator {
    pub fn new(
        certificates: CertificateProvider,
        ksm: KsmClient,
        store: Box<dyn PersistableKeyStore>,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            certificates,
            ksm,
            registry: PendingKeyRegistry::new(),
            store,
            capabilities,
            observer: KeyRequestObserver::default(),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: KeyRequestObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn registry(&self) -> &PendingKeyRegistry {
        &self.registry
    }

    /**
        Handle one "key needed" event from the platform engine.

        Takes the coordinator by owned `Arc` so the engine's asynchronous
        payload-production step holds only a weak back-reference: if the
        owning session tears the coordinator down mid-flight, the
        completion becomes a no-op instead of reviving it.
    */
    pub async fn handle_key_request(self: Arc<Self>, request: Arc<dyn KeyRequest>) {
        let identifier = request.identifier().to_owned();
        let asset_id = match resolve_asset_id(&identifier) {
            Ok(asset_id) => asset_id,
            Err(error) => {
                // Nothing upstream is waiting for a response yet, so the
                // request is abandoned rather than failed.
                warn!(%identifier, %error, "abandoning key request");
                return;
            }
        };
        debug!(asset_id = %asset_id, "handling key request");

        if self.capabilities.persistable_keys
            && (self.registry.is_pending_persistable(&asset_id)
                || self.store.persistable_key_exists(&asset_id))
        {
            match request.convert_to_persistable() {
                Ok(()) => {
                    // The engine re-delivers this request in persistable
                    // form; handling continues there.
                    debug!(asset_id = %asset_id, "converted to persistable key request");
                    return;
                }
                Err(_) => {
                    // Expected for sessions that cannot persist keys
                    // (external-display mirroring). Not a failure.
                    debug!(
                        asset_id = %asset_id,
                        "persistable conversion unsupported, answering with online key"
                    );
                }
            }
        }

        self.provide_online_key(request, asset_id).await;
    }

    /**
        Handle a renewal of an existing content key; renewals re-enter the
        same pipeline as fresh requests.
    */
    pub async fn handle_renewing_key_request(self: Arc<Self>, request: Arc<dyn KeyRequest>) {
        debug!(identifier = request.identifier(), "renewing key request");
        self.handle_key_request(request).await;
    }

    /// The online key path: certificate, payload, KSM exchange, response.
    async fn provide_online_key(self: Arc<Self>, request: Arc<dyn KeyRequest>, asset_id: AssetId) {
        let certificate = match self.certificates.application_certificate() {
            Ok(certificate) => certificate,
            Err(error) => {
                warn!(asset_id = %asset_id, %error, "cannot build key request");
                request.supply_error(error);
                return;
            }
        };

        // The engine builds the payload on its own worker; only a weak
        // handle survives the await so a torn-down owner stays down.
        let coordinator = Arc::downgrade(&self);
        drop(self);

        let spc = match request
            .produce_payload(&certificate, asset_id.as_bytes())
            .await
        {
            Ok(spc) => spc,
            Err(error) => {
                warn!(asset_id = %asset_id, %error, "key request payload production failed");
                request.supply_error(error);
                return;
            }
        };

        let Some(this) = coordinator.upgrade() else {
            debug!(asset_id = %asset_id, "coordinator gone, dropping key request completion");
            return;
        };

        match this.ksm.request_key(&spc, &asset_id).await {
            Ok(ckc) => request.supply_response(ckc),
            Err(error) => {
                warn!(asset_id = %asset_id, %error, "key server exchange failed");
                request.supply_error(error);
            }
        }
    }

    /**
        Preload the content keys of a stream for persisting on disk.

        Marks every resolvable identifier as pending persistable storage
        and asks the engine session to start a key request for it.
        Preloading keys ahead of playback keeps key loading off the
        playback startup path.
    */
    pub fn preload_persistable_keys(
        &self,
        stream_name: &str,
        identifiers: &[String],
        session: &dyn KeySession,
    ) {
        for identifier in identifiers {
            let asset_id = match resolve_asset_id(identifier) {
                Ok(asset_id) => asset_id,
                Err(error) => {
                    warn!(%identifier, %error, "skipping preload for unresolvable identifier");
                    continue;
                }
            };
            debug!(asset_id = %asset_id, stream = stream_name, "preloading persistable key");
            self.registry.mark_pending_persistable(&asset_id, stream_name);
            session.process_key_request(identifier);
        }
    }

    /**
        Answer the engine's retry callback for a failed request.
    */
    pub fn should_retry(&self, reason: &RetryReason) -> bool {
        let retry = reason.should_retry();
        debug!(?reason, retry, "classified retry reason");
        retry
    }

    /// Notification from the engine that a key request succeeded.
    pub fn request_did_succeed(&self, identifier: &str) {
        debug!(identifier, "key request succeeded");
        if let Some(hook) = &self.observer.on_succeeded {
            hook(identifier);
        }
    }

    /// Notification from the engine that a key request failed.
    pub fn request_did_fail(&self, identifier: &str, error: &KeyError) {
        warn!(identifier, %error, "key request failed");
        if let Some(hook) = &self.observer.on_failed {
            hook(identifier, error);
        }
    }
}
