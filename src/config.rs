use crate::error::AppError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Run configuration: the accounts to clean and the shared per-folder
/// age thresholds (hours) applied to every account.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mboxes: BTreeMap<String, MailboxConfig>,
    pub cutofftime: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    pub imap: String,
    #[serde(default = "default_imap_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
}

fn default_imap_port() -> u16 {
    993
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accounts_and_thresholds() {
        let raw = r#"{
            "mboxes": {
                "work": {
                    "imap": "imap.example.com",
                    "username": "bob@example.com",
                    "password": "hunter2"
                },
                "home": {
                    "imap": "mail.example.org",
                    "port": 1993,
                    "username": "bob",
                    "password": "s3cret"
                }
            },
            "cutofftime": { "INBOX": 720, "Spam": 24, "Trash": 0 }
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.mboxes.len(), 2);
        assert_eq!(config.mboxes["work"].port, 993);
        assert_eq!(config.mboxes["home"].port, 1993);
        assert_eq!(config.mboxes["home"].imap, "mail.example.org");
        assert_eq!(config.cutofftime["INBOX"], 720);
        assert_eq!(config.cutofftime["Trash"], 0);
    }

    #[test]
    fn rejects_missing_credentials() {
        let raw = r#"{
            "mboxes": { "work": { "imap": "imap.example.com" } },
            "cutofftime": {}
        }"#;
        assert!(serde_json::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/mailreap.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
