//! TOML-backed local budget ledger.
//!
//! Each principal gets its own file, `budget_entries_<principal>.toml`, in
//! the ledger directory.

use std::path::PathBuf;

use async_trait::async_trait;
use hearth_core::budget::{BudgetEntry, LedgerStore, ledger_key};
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::Principal;
use serde::{Deserialize, Serialize};

use crate::storage::AtomicTomlFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default, rename = "entry")]
    entries: Vec<BudgetEntry>,
}

pub struct TomlLedgerStore {
    dir: PathBuf,
}

impl TomlLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, principal: &Principal) -> AtomicTomlFile<LedgerFile> {
        let name = ledger_key(&Principal::new(escape_principal(principal.as_str())));
        AtomicTomlFile::new(self.dir.join(format!("{}.toml", name)))
    }

    async fn blocking<F, R>(&self, principal: &Principal, f: F) -> Result<R>
    where
        F: FnOnce(AtomicTomlFile<LedgerFile>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file(principal);
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| HearthError::internal(format!("Ledger task failed: {}", e)))?
    }
}

#[async_trait]
impl LedgerStore for TomlLedgerStore {
    async fn load(&self, principal: &Principal) -> Result<Vec<BudgetEntry>> {
        self.blocking(principal, |file| {
            Ok(file.load()?.map(|ledger| ledger.entries).unwrap_or_default())
        })
        .await
    }

    async fn save(&self, principal: &Principal, entries: &[BudgetEntry]) -> Result<()> {
        let entries = entries.to_vec();
        tracing::debug!(
            "[TomlLedgerStore] Saving {} entries for {}",
            entries.len(),
            principal
        );
        self.blocking(principal, move |file| {
            file.update(LedgerFile::default(), |ledger| {
                ledger.entries = entries;
                Ok(())
            })
        })
        .await
    }

    async fn clear(&self, principal: &Principal) -> Result<()> {
        tracing::debug!("[TomlLedgerStore] Clearing ledger for {}", principal);
        self.blocking(principal, |file| file.remove()).await
    }
}

/// Makes `raw` safe as a file name without collisions: every byte outside
/// `[A-Za-z0-9-]`, `_` included, becomes `_XX` in hex.
fn escape_principal(raw: &str) -> String {
    raw.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'-' {
                char::from(b).to_string()
            } else {
                format!("_{:02X}", b)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::budget::EntryKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_ledger_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlLedgerStore::new(temp_dir.path());
        assert!(store.load(&Principal::new("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlLedgerStore::new(temp_dir.path());
        let alice = Principal::new("alice-123");
        let entries = vec![
            BudgetEntry::new(EntryKind::Income, "Salary", 3200.0),
            BudgetEntry::new(EntryKind::Expense, "Rent", 1100.5),
        ];

        store.save(&alice, &entries).await.unwrap();
        assert!(temp_dir.path().join("budget_entries_alice-123.toml").exists());
        assert_eq!(store.load(&alice).await.unwrap(), entries);

        store.clear(&alice).await.unwrap();
        assert!(store.load(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlLedgerStore::new(temp_dir.path());
        let alice = Principal::new("alice");
        let bob = Principal::new("bob");

        store
            .save(&alice, &[BudgetEntry::new(EntryKind::Expense, "Coffee", 4.0)])
            .await
            .unwrap();
        store
            .save(&bob, &[BudgetEntry::new(EntryKind::Income, "Gift", 50.0)])
            .await
            .unwrap();
        store.clear(&alice).await.unwrap();

        assert!(store.load(&alice).await.unwrap().is_empty());
        assert_eq!(store.load(&bob).await.unwrap()[0].description, "Gift");
    }

    #[tokio::test]
    async fn test_unsafe_principal_characters_are_escaped() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlLedgerStore::new(temp_dir.path());
        let odd = Principal::new("../escape");

        store
            .save(&odd, &[BudgetEntry::new(EntryKind::Income, "Tips", 12.0)])
            .await
            .unwrap();

        assert!(
            temp_dir
                .path()
                .join("budget_entries__2E_2E_2Fescape.toml")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_similar_principals_do_not_share_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlLedgerStore::new(temp_dir.path());
        let dotted = Principal::new("a.b");
        let underscored = Principal::new("a_b");

        store
            .save(&dotted, &[BudgetEntry::new(EntryKind::Income, "Gift", 5.0)])
            .await
            .unwrap();
        store
            .save(&underscored, &[BudgetEntry::new(EntryKind::Expense, "Tea", 2.0)])
            .await
            .unwrap();

        assert_eq!(store.load(&dotted).await.unwrap()[0].description, "Gift");
        assert_eq!(store.load(&underscored).await.unwrap()[0].description, "Tea");

        store.clear(&dotted).await.unwrap();
        assert!(store.load(&dotted).await.unwrap().is_empty());
        assert_eq!(store.load(&underscored).await.unwrap().len(), 1);
    }

    #[test]
    fn test_escape_principal() {
        assert_eq!(escape_principal("alice-123"), "alice-123");
        assert_eq!(escape_principal("a.b"), "a_2Eb");
        assert_eq!(escape_principal("a_b"), "a_5Fb");
    }
}
