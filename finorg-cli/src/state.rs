use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use finorg_core::Ledger;

/// `$FINORG_HOME`, or `~/.finorg`.
pub fn finorg_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINORG_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".finorg"))
}

pub fn ensure_finorg_home() -> Result<PathBuf> {
    let dir = finorg_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a `{transactions, cards, recurring}` snapshot written from the API.
pub fn read_snapshot(path: &Path) -> Result<Ledger> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse snapshot {}", path.display()))
}

pub fn write_snapshot(path: &Path, ledger: &Ledger) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
            .join("snapshot.json")
    }

    #[test]
    fn test_read_fixture_snapshot() {
        let ledger = read_snapshot(&fixture_path()).expect("should parse fixtures/snapshot.json");
        assert_eq!(ledger.transactions.len(), 6);
        assert_eq!(ledger.cards.len(), 2);
        assert_eq!(ledger.recurring.len(), 3);
        assert!(ledger.transactions[2].has_receipt());
        assert_eq!(ledger.transactions[5].category, None);
        assert!(!ledger.recurring[2].is_active);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let ledger = read_snapshot(&fixture_path()).unwrap();
        let out = std::env::temp_dir().join(format!("finorg-snapshot-{}.json", std::process::id()));
        write_snapshot(&out, &ledger).unwrap();
        let again = read_snapshot(&out).unwrap();
        fs::remove_file(&out).ok();
        assert_eq!(again, ledger);
    }

    #[test]
    fn test_missing_snapshot_names_path() {
        let err = read_snapshot(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
