use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fps_core::CertificateProvider;

/**
    Decode a base64-encoded application certificate and report its size.
*/
#[derive(Args)]
pub struct InspectCertificateCommand {
    /**
        Path to a file containing the base64-encoded certificate.
    */
    #[arg(short, long)]
    certificate: PathBuf,
}

impl InspectCertificateCommand {
    pub fn run(self) -> Result<()> {
        let encoded = std::fs::read_to_string(&self.certificate)
            .context("failed to read certificate file")?;

        let provider = CertificateProvider::new(Some(encoded));
        let certificate = provider
            .application_certificate()
            .context("certificate is not usable")?;

        println!("Certificate decodes to {} bytes", certificate.len());
        Ok(())
    }
}
