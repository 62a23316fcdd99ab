use thiserror::Error;

/**
    Errors produced while acquiring a content key.

    Every variant terminates a single key request only; none of them is
    fatal to the process or to other in-flight requests.
*/
#[derive(Debug, Clone, Error)]
pub enum KeyError {
    // ── Configuration ─────────────────────────────────────────────────
    #[error("application certificate is missing or not decodable")]
    MissingCertificate,

    // ── Key server exchange ───────────────────────────────────────────
    #[error("no content key returned by KSM: {0}")]
    NoKeyReturned(String),

    // ── Platform engine input ─────────────────────────────────────────
    #[error("cannot resolve an asset ID from key identifier {0:?}")]
    UnresolvableIdentifier(String),

    // ── Platform engine payload construction ──────────────────────────
    #[error("key request payload production failed: {0}")]
    PayloadProduction(String),
}

/**
    Type alias for results that may return a [`KeyError`].
*/
pub type KeyResult<T> = std::result::Result<T, KeyError>;
