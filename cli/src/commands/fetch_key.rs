use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use url::Url;

use fps_core::{AssetId, KsmClient, KsmConfig, resolve_asset_id};

/**
    Fetch a content key (CKC) from a key security module.
*/
#[derive(Args)]
pub struct FetchKeyCommand {
    /**
        Path to the SPC payload file to send.
    */
    #[arg(short, long)]
    spc: PathBuf,

    /**
        Key identifier URI (e.g. skd://asset-id); its host component is
        the asset ID.
    */
    #[arg(short, long, required_unless_present = "asset_id")]
    identifier: Option<String>,

    /**
        Raw asset ID, when no identifier URI is at hand.
    */
    #[arg(short, long, conflicts_with = "identifier")]
    asset_id: Option<String>,

    /**
        KSM endpoint URL to POST the key request to.
    */
    #[arg(short, long)]
    url: Url,

    /**
        Bearer token for the Authorization header.
    */
    #[arg(short, long)]
    token: String,

    /**
        Request timeout in seconds.
    */
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /**
        Write the CKC to this file instead of printing it base64-encoded.
    */
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl FetchKeyCommand {
    pub async fn run(self) -> Result<()> {
        let spc = std::fs::read(&self.spc).context("failed to read SPC file")?;

        let asset_id = if let Some(ref identifier) = self.identifier {
            resolve_asset_id(identifier).context("failed to resolve asset ID from identifier")?
        } else if let Some(ref raw) = self.asset_id {
            AssetId::new(raw.clone())
        } else {
            bail!("either --identifier or --asset-id is required");
        };

        eprintln!("Requesting key for asset {asset_id} ({} byte SPC)", spc.len());

        let config = KsmConfig::new(self.url, self.token)
            .with_request_timeout(Duration::from_secs(self.timeout));
        let client = KsmClient::new(config);

        let ckc = client
            .request_key(&spc, &asset_id)
            .await
            .context("KSM exchange failed")?;
        eprintln!("Received CKC ({} bytes)", ckc.len());

        match self.output {
            Some(path) => {
                std::fs::write(&path, &ckc).context("failed to write CKC file")?;
                eprintln!("Wrote {}", path.display());
            }
            None => println!("{}", data_encoding::BASE64.encode(&ckc)),
        }

        Ok(())
    }
}
