pub mod account;
pub mod reaper;
pub mod session;

use crate::error::AppError;
use session::ImapSession;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn connect(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
) -> Result<ImapSession, AppError> {
    let tls = async_native_tls::TlsConnector::new();
    let tcp = async_std::future::timeout(
        CONNECT_TIMEOUT,
        async_std::net::TcpStream::connect((host, port)),
    )
    .await
    .map_err(|_| AppError::Connection("TCP connect timed out after 30s".to_string()))?
    .map_err(|e| AppError::Connection(e.to_string()))?;

    let tls_stream = tls
        .connect(host, tcp)
        .await
        .map_err(|e| AppError::Tls(e.to_string()))?;

    let client = async_imap::Client::new(tls_stream);
    let session = client
        .login(username, password)
        .await
        .map_err(|(e, _)| AppError::Auth(e.to_string()))?;

    Ok(ImapSession::new(session))
}
