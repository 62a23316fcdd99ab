use core::fmt;

/**
    Server-addressable name for a protected asset's key.

    Derived from the host component of a key-identifier URI (see
    [`resolve_asset_id`](crate::resolve_asset_id)) and immutable once
    derived.
*/
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes of the asset ID, as handed to the platform engine's
    /// payload-production step.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/**
    Reason the platform engine gives when asking whether a failed key
    request should be retried.

    The platform reports reasons as opaque string codes; codes this crate
    does not recognize are captured in `Unrecognized` and are never
    retried.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RetryReason {
    /// The request timed out before a key response was set.
    TimedOut,
    /// A response was set, but its lease had already expired.
    ReceivedResponseWithExpiredLease,
    /// A response was set, but the content key it carried was obsolete.
    ReceivedObsoleteContentKey,
    /// Any other or future reason code.
    Unrecognized(String),
}

impl RetryReason {
    /**
        Map a platform-supplied reason code onto a `RetryReason`.
    */
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            "TimedOut" => Self::TimedOut,
            "ReceivedResponseWithExpiredLease" => Self::ReceivedResponseWithExpiredLease,
            "ReceivedObsoleteContentKey" => Self::ReceivedObsoleteContentKey,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    /**
        Whether a failed key request should be retried for this reason.

        True for exactly: timed out, expired-lease response, obsolete key
        response. Unknown reasons are deliberately not retried.
    */
    pub fn should_retry(&self) -> bool {
        matches!(
            self,
            Self::TimedOut
                | Self::ReceivedResponseWithExpiredLease
                | Self::ReceivedObsoleteContentKey
        )
    }
}
