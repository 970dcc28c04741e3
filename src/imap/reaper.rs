use crate::error::AppError;
use crate::imap::session::MailSession;
use tracing::{error, info, warn};

/// What one reap pass did to one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOutcome {
    pub folder: String,
    pub marked: usize,
    pub committed: bool,
}

/// Deletes every message in `folder` older than `threshold_hours`.
///
/// Selects the folder read-write, searches server-side, flags each match as
/// deleted and expunges. Only the first and last matches get a Date header
/// fetch for the log line; pulling headers for every one of potentially
/// thousands of matches is not worth it, and the two boundary samples show
/// the age range being purged. A failed fetch or store is logged and skipped.
/// Expunge runs even when the search matched nothing.
pub async fn reap_folder<S: MailSession>(
    session: &mut S,
    user: &str,
    folder: &str,
    threshold_hours: u64,
) -> Result<FolderOutcome, AppError> {
    session.select_writable(folder).await?;

    info!("{user}: {folder}: searching for messages older than {threshold_hours}h");
    let matches = session.search_older_than(threshold_hours * 3600).await?;

    let mut marked = 0usize;
    let last = matches.len().saturating_sub(1);
    for (i, &seq) in matches.iter().enumerate() {
        if i == 0 || i == last {
            match session.fetch_date_header(seq).await {
                Ok(date) => info!(
                    "{user}: {folder}: marking message #{seq} for deletion, message date: {date}"
                ),
                Err(e) => {
                    warn!("{user}: {folder}: failed to fetch date of message #{seq}: {e}");
                    info!("{user}: {folder}: marking message #{seq} for deletion");
                }
            }
        } else {
            info!("{user}: {folder}: marking message #{seq} for deletion");
        }

        match session.mark_deleted(seq).await {
            Ok(()) => marked += 1,
            Err(e) => error!("{user}: {folder}: failed to mark message #{seq}: {e}"),
        }
    }

    info!("{user}: {folder}: deleting {marked} marked message(s)");
    let committed = match session.expunge().await {
        Ok(()) => true,
        Err(e) => {
            error!("{user}: {folder}: expunge failed: {e}");
            false
        }
    };

    Ok(FolderOutcome {
        folder: folder.to_string(),
        marked,
        committed,
    })
}
