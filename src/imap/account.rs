use crate::config::MailboxConfig;
use crate::error::AppError;
use crate::imap::reaper::{self, FolderOutcome};
use crate::imap::session::MailSession;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Per-folder result of one account run.
#[derive(Debug)]
pub struct FolderReport {
    pub folder: String,
    pub result: Result<FolderOutcome, AppError>,
}

impl FolderReport {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.committed)
    }
}

/// How one account run ended. Never fatal to the overall run: the caller
/// logs it and moves on to the next account.
#[derive(Debug)]
pub enum AccountOutcome {
    Completed { folders: Vec<FolderReport> },
    Unreachable(AppError),
    LoginRejected(AppError),
}

/// Opens a session to one account and reaps every configured folder.
///
/// Connection and login failures end this account only. Once connected, the
/// session is torn down on every path before returning.
pub async fn process_account(
    account: &MailboxConfig,
    cutoffs: &BTreeMap<String, u64>,
) -> AccountOutcome {
    let user = &account.username;
    let host = &account.imap;

    let mut session = match super::connect(host, account.port, user, &account.password).await {
        Ok(session) => session,
        Err(e @ AppError::Auth(_)) => {
            error!("{user}: login rejected by {host}: {e}");
            return AccountOutcome::LoginRejected(e);
        }
        Err(e) => {
            error!("{user}: failed to reach {host}: {e}");
            return AccountOutcome::Unreachable(e);
        }
    };
    info!("{user}: session established with {host}");

    let folders = reap_folders(&mut session, user, cutoffs).await;
    AccountOutcome::Completed { folders }
}

/// Reaps every folder in `cutoffs` on an open session, then tears the
/// session down. A folder failure is recorded and logged but never stops
/// the remaining folders; teardown always runs exactly once.
pub async fn reap_folders<S: MailSession>(
    session: &mut S,
    user: &str,
    cutoffs: &BTreeMap<String, u64>,
) -> Vec<FolderReport> {
    let mut reports = Vec::with_capacity(cutoffs.len());
    for (folder, hours) in cutoffs {
        let result = reaper::reap_folder(session, user, folder, *hours).await;
        match &result {
            Ok(outcome) if outcome.committed => {
                info!(
                    "{user}: {folder}: reap complete, {} message(s) removed",
                    outcome.marked
                );
            }
            Ok(outcome) => {
                error!(
                    "{user}: {folder}: marked {} message(s) but expunge failed",
                    outcome.marked
                );
            }
            Err(e) => error!("{user}: {folder}: reap aborted: {e}"),
        }
        reports.push(FolderReport {
            folder: folder.clone(),
            result,
        });
    }

    if let Err(e) = session.close_folder().await {
        warn!("{user}: failed to close folder: {e}");
    }
    if let Err(e) = session.logout().await {
        warn!("{user}: failed to logout: {e}");
    }

    reports
}
