use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Folder select failed: {0}")]
    FolderSelect(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Header fetch failed: {0}")]
    Fetch(String),

    #[error("Store failed: {0}")]
    Store(String),

    #[error("Expunge failed: {0}")]
    Commit(String),

    #[error("IMAP error: {0}")]
    Imap(String),
}

impl From<async_imap::error::Error> for AppError {
    fn from(e: async_imap::error::Error) -> Self {
        AppError::Imap(e.to_string())
    }
}

impl From<async_native_tls::Error> for AppError {
    fn from(e: async_native_tls::Error) -> Self {
        AppError::Tls(e.to_string())
    }
}
