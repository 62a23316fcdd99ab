use url::Url;

use crate::error::{KeyError, KeyResult};
use crate::types::AssetId;

/**
    Extract the server-addressable asset ID from a key-identifier URI.

    The platform engine hands over a scheme-qualified identifier (for
    example `skd://asset-42/variant`); its host component is the asset ID
    the KSM understands. Fails with [`KeyError::UnresolvableIdentifier`]
    when the string is not a well-formed URI or has no host.
*/
pub fn resolve_asset_id(identifier: &str) -> KeyResult<AssetId> {
    let unresolvable = || KeyError::UnresolvableIdentifier(identifier.to_owned());

    let uri = Url::parse(identifier).map_err(|_| unresolvable())?;
    match uri.host_str() {
        Some(host) if !host.is_empty() => Ok(AssetId::new(host)),
        _ => Err(unresolvable()),
    }
}
