//! Merchant account list (`merchant-ids.json`).

use std::path::Path;

use crate::core::models::AccountEntry;
use crate::error::{FeedstatError, Result};

/// Load the configured merchant accounts, in file order.
///
/// # Errors
///
/// `ConfigNotFound` when the file is missing, `ConfigParse` when it is not a
/// JSON array of `{"merchantId", "propName"}` objects.
pub fn load_accounts(path: &Path) -> Result<Vec<AccountEntry>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FeedstatError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let accounts: Vec<AccountEntry> =
        serde_json::from_str(&content).map_err(|e| FeedstatError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    tracing::debug!(?path, count = accounts.len(), "Loaded merchant accounts");
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;

    #[test]
    fn loads_string_and_numeric_ids_in_order() {
        let dir = TestDir::new();
        dir.create_file(
            "merchant-ids.json",
            r#"[
                {"merchantId": "1234567", "propName": "Outdoor Store"},
                {"merchantId": 7654321, "propName": "Garden Store"}
            ]"#,
        );

        let accounts = load_accounts(&dir.path().join("merchant-ids.json")).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].merchant_id, "1234567");
        assert_eq!(accounts[0].prop_name, "Outdoor Store");
        assert_eq!(accounts[1].merchant_id, "7654321");
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = TestDir::new();
        let err = load_accounts(&dir.path().join("merchant-ids.json")).unwrap_err();
        assert!(matches!(err, FeedstatError::ConfigNotFound { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TestDir::new();
        dir.create_file("merchant-ids.json", r#"{"merchantId": "1"}"#);
        let err = load_accounts(&dir.path().join("merchant-ids.json")).unwrap_err();
        assert!(matches!(err, FeedstatError::ConfigParse { .. }));
    }
}
