use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{FetchKeyCommand, InspectCertificateCommand};

/**
    FairPlay key acquisition command-line tool.
*/
#[derive(Parser)]
#[command(name = "fps-cli")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a content key (CKC) from a KSM for a prepared SPC.
    FetchKey(FetchKeyCommand),
    /// Decode and summarize an application certificate.
    InspectCertificate(InspectCertificateCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::FetchKey(cmd) => cmd.run().await,
            Command::InspectCertificate(cmd) => cmd.run(),
        }
    }
}
