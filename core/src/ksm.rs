use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::config::KsmConfig;
use crate::error::{KeyError, KeyResult};
use crate::types::AssetId;

/// Literal wrapper tags some KSM deployments place around the base64
/// response body.
const CKC_OPEN_TAG: &str = "<ckc>";
const CKC_CLOSE_TAG: &str = "</ckc>";

/// JSON body POSTed to the KSM endpoint.
#[derive(Serialize)]
struct KeyRequestBody<'a> {
    spc: String,
    #[serde(rename = "assetId")]
    asset_id: &'a str,
}

/**
    Client for the key security module (KSM) exchange.

    Performs exactly one HTTPS round trip per call: encode the signed key
    request payload, POST it, decode the encrypted key response. No retry
    happens here; retry is driven by the state machine through the
    platform engine's retry callback.
*/
#[derive(Debug, Clone)]
pub struct KsmClient {
    http: reqwest::Client,
    config: KsmConfig,
}

impl KsmClient {
    pub fn new(config: KsmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &KsmConfig {
        &self.config
    }

    /**
        Exchange a key request payload (SPC) for the key response payload
        (CKC) covering `asset_id`.

        The call completes in-line from the caller's perspective; do not
        run it on a latency-sensitive thread. Any transport error,
        non-success status, or undecodable body folds into
        [`KeyError::NoKeyReturned`].
    */
    pub async fn request_key(&self, spc: &[u8], asset_id: &AssetId) -> KeyResult<Vec<u8>> {
        let body = encode_request_body(spc, asset_id);
        debug!(asset_id = %asset_id, body_len = body.len(), "posting key request to KSM");

        let response = self
            .http
            .post(self.config.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .bearer_auth(&self.config.auth_token)
            .body(body)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| KeyError::NoKeyReturned(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyError::NoKeyReturned(format!(
                "KSM returned HTTP {status}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| KeyError::NoKeyReturned(e.to_string()))?;

        let ckc = decode_ckc(&text)?;
        debug!(asset_id = %asset_id, ckc_len = ckc.len(), "received key response from KSM");
        Ok(ckc)
    }
}

/// Serialize the `{"spc": ..., "assetId": ...}` POST body.
fn encode_request_body(spc: &[u8], asset_id: &AssetId) -> Vec<u8> {
    let body = KeyRequestBody {
        spc: data_encoding::BASE64.encode(spc),
        asset_id: asset_id.as_str(),
    };
    // Serialization of a two-string struct cannot fail.
    serde_json::to_vec(&body).unwrap_or_default()
}

/**
    Decode a textual KSM response body into CKC bytes.

    Strips literal `<ckc>`/`</ckc>` wrapper tags if present, then
    base64-decodes the remainder. Stripping is idempotent: bodies without
    tags decode identically.
*/
fn decode_ckc(body: &str) -> KeyResult<Vec<u8>> {
    let stripped = body
        .replace(CKC_OPEN_TAG, "")
        .replace(CKC_CLOSE_TAG, "");
    let stripped = stripped.trim();

    data_encoding::BASE64
        .decode(stripped.as_bytes())
        .map_err(|e| KeyError::NoKeyReturned(format!("response is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testutil::KsmStub;

    #[test]
    fn decode_tagged_body() {
        assert_eq!(decode_ckc("<ckc>QUJD</ckc>").unwrap(), b"ABC");
    }

    #[test]
    fn decode_untagged_body() {
        assert_eq!(decode_ckc("QUJD").unwrap(), b"ABC");
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        assert_eq!(decode_ckc("\n<ckc>QUJD</ckc>\n").unwrap(), b"ABC");
    }

    #[test]
    fn non_base64_body_is_rejected() {
        let err = decode_ckc("<ckc>definitely not base64!</ckc>").unwrap_err();
        assert!(matches!(err, KeyError::NoKeyReturned(_)));
    }

    #[test]
    fn request_body_round_trip() {
        for len in [0usize, 1, 4096] {
            let spc: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let body = encode_request_body(&spc, &AssetId::new("asset-42"));

            let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(parsed["assetId"], "asset-42");
            let decoded = data_encoding::BASE64
                .decode(parsed["spc"].as_str().unwrap().as_bytes())
                .unwrap();
            assert_eq!(decoded, spc);
        }
    }

    #[tokio::test]
    async fn exchange_against_stub_server() {
        let stub = KsmStub::spawn("<ckc>U0VDUkVU</ckc>").await;
        let client = KsmClient::new(stub.config());

        let ckc = client
            .request_key(b"spc-bytes", &AssetId::new("asset-42"))
            .await
            .unwrap();
        assert_eq!(ckc, b"SECRET");
        assert_eq!(stub.hits(), 1);

        let seen = stub.last_request().unwrap();
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(seen.body["assetId"], "asset-42");
    }

    #[tokio::test]
    async fn http_error_status_yields_no_key() {
        let stub = KsmStub::spawn_with_status(axum::http::StatusCode::FORBIDDEN, "denied").await;
        let client = KsmClient::new(stub.config());

        let err = client
            .request_key(b"spc", &AssetId::new("asset-42"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NoKeyReturned(_)));
    }

    #[tokio::test]
    async fn connection_refused_yields_no_key() {
        // Port 1 on loopback is never listening.
        let url = url::Url::parse("http://127.0.0.1:1/fps/").unwrap();
        let config = KsmConfig::new(url, "token").with_request_timeout(Duration::from_secs(2));
        let client = KsmClient::new(config);

        let err = client
            .request_key(b"spc", &AssetId::new("asset-42"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NoKeyReturned(_)));
    }
}
