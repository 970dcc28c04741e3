use mimalloc::MiMalloc;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod config;
mod error;
mod imap;

use imap::account::{self, AccountOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "mailreap.json".to_string());

    let config = match config::Config::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "starting mail reaper: {} account(s), {} folder threshold(s)",
        config.mboxes.len(),
        config.cutofftime.len()
    );

    // One account at a time; a failed account never stops the rest.
    for (name, mbox) in &config.mboxes {
        info!("processing account {name}");
        match account::process_account(mbox, &config.cutofftime).await {
            AccountOutcome::Completed { folders } => {
                let failed = folders.iter().filter(|r| !r.succeeded()).count();
                if failed == 0 {
                    info!("account {name} done, {} folder(s) reaped", folders.len());
                } else {
                    warn!(
                        "account {name} done, {failed}/{} folder(s) failed",
                        folders.len()
                    );
                }
            }
            AccountOutcome::Unreachable(_) | AccountOutcome::LoginRejected(_) => {
                warn!("account {name} skipped");
            }
        }
    }

    ExitCode::SUCCESS
}
