use crate::error::{KeyError, KeyResult};

/**
    Supplies the static application certificate used to construct key
    requests.

    The certificate is a config-time constant for the lifetime of the
    process; there is no rotation. An absent or undecodable credential is
    surfaced as [`KeyError::MissingCertificate`] on each request, never as
    a crash.
*/
#[derive(Debug, Clone)]
pub struct CertificateProvider {
    certificate_b64: Option<String>,
}

impl CertificateProvider {
    pub fn new(certificate_b64: Option<String>) -> Self {
        Self { certificate_b64 }
    }

    /**
        Decode and return the application certificate bytes.
    */
    pub fn application_certificate(&self) -> KeyResult<Vec<u8>> {
        let encoded = self
            .certificate_b64
            .as_deref()
            .ok_or(KeyError::MissingCertificate)?;

        let certificate = data_encoding::BASE64
            .decode(encoded.trim().as_bytes())
            .map_err(|_| KeyError::MissingCertificate)?;

        if certificate.is_empty() {
            return Err(KeyError::MissingCertificate);
        }

        Ok(certificate)
    }
}
