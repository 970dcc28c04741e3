use crate::error::AppError;
use async_trait::async_trait;
use futures::StreamExt;
use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Date:\s*(.*)").unwrap());

/// Server-assigned message sequence number. Only valid while the folder it
/// came from stays selected in the same session.
pub type Seq = u32;

/// The protocol operations the reaper needs from an authenticated session.
#[async_trait]
pub trait MailSession: Send {
    /// Selects `folder` read-write; any prior selection ends.
    async fn select_writable(&mut self, folder: &str) -> Result<(), AppError>;

    /// Searches the selected folder for messages whose internal date is
    /// older than `age_seconds`, as judged by the server's clock. The list
    /// is in the order returned by the search operation.
    async fn search_older_than(&mut self, age_seconds: u64) -> Result<Vec<Seq>, AppError>;

    /// Fetches the Date header of one message, without the body.
    async fn fetch_date_header(&mut self, seq: Seq) -> Result<String, AppError>;

    /// Flags one message as deleted. Not permanent until [`Self::expunge`].
    async fn mark_deleted(&mut self, seq: Seq) -> Result<(), AppError>;

    /// Permanently removes every flagged message in the selected folder.
    async fn expunge(&mut self) -> Result<(), AppError>;

    async fn close_folder(&mut self) -> Result<(), AppError>;

    async fn logout(&mut self) -> Result<(), AppError>;
}

pub type TlsSession =
    async_imap::Session<async_native_tls::TlsStream<async_std::net::TcpStream>>;

#[derive(Debug)]
pub struct ImapSession {
    inner: TlsSession,
}

impl ImapSession {
    pub fn new(inner: TlsSession) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MailSession for ImapSession {
    async fn select_writable(&mut self, folder: &str) -> Result<(), AppError> {
        self.inner
            .select(folder)
            .await
            .map_err(|e| AppError::FolderSelect(e.to_string()))?;
        Ok(())
    }

    async fn search_older_than(&mut self, age_seconds: u64) -> Result<Vec<Seq>, AppError> {
        let matches = self
            .inner
            .search(format!("OLDER {age_seconds}"))
            .await
            .map_err(|e| AppError::Search(e.to_string()))?;

        // async-imap hands the SEARCH result back as an unordered set;
        // servers emit it in ascending sequence order, so sorting restores it.
        let mut seqs: Vec<Seq> = matches.into_iter().collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    async fn fetch_date_header(&mut self, seq: Seq) -> Result<String, AppError> {
        let fetches: Vec<_> = self
            .inner
            .fetch(seq.to_string(), "BODY.PEEK[HEADER.FIELDS (DATE)]")
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?
            .collect()
            .await;

        for fetch_result in fetches {
            let fetch = fetch_result.map_err(|e| AppError::Fetch(e.to_string()))?;
            if let Some(header) = fetch.header() {
                let text = String::from_utf8_lossy(header);
                if let Some(m) = DATE_RE.captures(&text) {
                    if let Some(date) = m.get(1) {
                        return Ok(date.as_str().trim().to_string());
                    }
                }
            }
        }
        Err(AppError::Fetch(format!("message #{seq} has no Date header")))
    }

    async fn mark_deleted(&mut self, seq: Seq) -> Result<(), AppError> {
        self.inner
            .store(seq.to_string(), "+FLAGS (\\Deleted)")
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
            .collect::<Vec<_>>()
            .await;
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), AppError> {
        self.inner
            .expunge()
            .await
            .map_err(|e| AppError::Commit(e.to_string()))?
            .collect::<Vec<_>>()
            .await;
        Ok(())
    }

    async fn close_folder(&mut self) -> Result<(), AppError> {
        self.inner
            .close()
            .await
            .map_err(|e| AppError::Imap(e.to_string()))
    }

    async fn logout(&mut self) -> Result<(), AppError> {
        self.inner
            .logout()
            .await
            .map_err(|e| AppError::Imap(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{MailSession, Seq};
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Op {
        Select(String),
        Search(u64),
        Fetch(Seq),
        Store(Seq),
        Expunge,
        Close,
        Logout,
    }

    #[derive(Debug, Clone)]
    pub enum FolderScript {
        SelectFails,
        SearchFails,
        Messages(Vec<Seq>),
    }

    /// Scripted stand-in for a live session; records one [`Op`] per call.
    #[derive(Debug, Default)]
    pub struct FakeSession {
        pub folders: BTreeMap<String, FolderScript>,
        pub fail_fetch: HashSet<Seq>,
        pub fail_store: HashSet<Seq>,
        pub fail_expunge: bool,
        pub ops: Vec<Op>,
        selected: Option<String>,
    }

    impl FakeSession {
        pub fn with_folder(mut self, name: &str, script: FolderScript) -> Self {
            self.folders.insert(name.to_string(), script);
            self
        }

        pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    #[async_trait]
    impl MailSession for FakeSession {
        async fn select_writable(&mut self, folder: &str) -> Result<(), AppError> {
            self.ops.push(Op::Select(folder.to_string()));
            match self.folders.get(folder) {
                None | Some(FolderScript::SelectFails) => Err(AppError::FolderSelect(
                    format!("cannot select {folder}"),
                )),
                Some(_) => {
                    self.selected = Some(folder.to_string());
                    Ok(())
                }
            }
        }

        async fn search_older_than(&mut self, age_seconds: u64) -> Result<Vec<Seq>, AppError> {
            self.ops.push(Op::Search(age_seconds));
            let selected = self.selected.as_deref().unwrap_or_default();
            match self.folders.get(selected) {
                Some(FolderScript::Messages(seqs)) => Ok(seqs.clone()),
                _ => Err(AppError::Search("NO".to_string())),
            }
        }

        async fn fetch_date_header(&mut self, seq: Seq) -> Result<String, AppError> {
            self.ops.push(Op::Fetch(seq));
            if self.fail_fetch.contains(&seq) {
                Err(AppError::Fetch(format!("message #{seq} is malformed")))
            } else {
                Ok(format!("Mon, 1 Jan 2024 00:00:{:02} +0000", seq % 60))
            }
        }

        async fn mark_deleted(&mut self, seq: Seq) -> Result<(), AppError> {
            self.ops.push(Op::Store(seq));
            if self.fail_store.contains(&seq) {
                Err(AppError::Store(format!("STORE #{seq} rejected")))
            } else {
                Ok(())
            }
        }

        async fn expunge(&mut self) -> Result<(), AppError> {
            self.ops.push(Op::Expunge);
            if self.fail_expunge {
                Err(AppError::Commit("EXPUNGE rejected".to_string()))
            } else {
                Ok(())
            }
        }

        async fn close_folder(&mut self) -> Result<(), AppError> {
            self.ops.push(Op::Close);
            Ok(())
        }

        async fn logout(&mut self) -> Result<(), AppError> {
            self.ops.push(Op::Logout);
            Ok(())
        }
    }
}
