// 💾 Backups - consistent copies of the store file
//
// Backups are taken on demand. Deciding *when* one is due is a pure function
// of the settings and the current time; nothing here runs on a timer.

use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::SqliteTaxPayerStore;
use chrono::{DateTime, Local, Utc};
use rusqlite::params;
use std::path::{Path, PathBuf};
use tracing::info;

/// Numbered names tried after the plain one is taken.
const MAX_NAME_SUFFIX: u32 = 99;

/// File name for a backup taken at `now` (local time, millisecond precision).
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("taxpayers_{}.db", timestamp_stem(now))
}

fn timestamp_stem(now: DateTime<Utc>) -> String {
    now.with_timezone(&Local).format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// First name in `folder` not already taken: the plain name, then `_1`, `_2`, ...
fn free_backup_path(folder: &Path, now: DateTime<Utc>) -> StoreResult<PathBuf> {
    let plain = folder.join(backup_file_name(now));
    if !plain.exists() {
        return Ok(plain);
    }

    let stem = timestamp_stem(now);
    for n in 1..=MAX_NAME_SUFFIX {
        let candidate = folder.join(format!("taxpayers_{}_{}.db", stem, n));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(StoreError::BackupExists(plain))
}

/// Write a consistent snapshot of `store` into `folder`.
///
/// Uses `VACUUM INTO`, so the copy is taken inside a read transaction and
/// is complete even with a WAL file next to the source. An existing file is
/// never overwritten; a backup taken in the same millisecond as an earlier
/// one gets a numbered name.
pub fn backup_database(
    store: &SqliteTaxPayerStore,
    folder: &Path,
    now: DateTime<Utc>,
) -> StoreResult<PathBuf> {
    std::fs::create_dir_all(folder)?;

    let target = free_backup_path(folder, now)?;

    let conn = store.connect()?;
    conn.execute(
        "VACUUM INTO ?1",
        params![target.to_string_lossy().into_owned()],
    )?;

    info!(backup = %target.display(), "database backed up");
    Ok(target)
}

/// Whether an automatic backup should run at `now`.
pub fn is_backup_due(config: &AppConfig, now: DateTime<Utc>) -> bool {
    if !config.auto_backup_enabled {
        return false;
    }

    match config.last_backup_time {
        None => true,
        Some(last) => now - last >= config.auto_backup_interval(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TaxPayer;
    use crate::store::TaxPayerRepository;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn enabled_config(last: Option<DateTime<Utc>>) -> AppConfig {
        AppConfig {
            auto_backup_enabled: true,
            auto_backup_interval_minutes: 60,
            last_backup_time: last,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_backup_contains_rows() {
        let dir = TempDir::new().unwrap();
        let mut store = SqliteTaxPayerStore::open(dir.path().join("taxpayers.db")).unwrap();
        store.upsert(&TaxPayer::new("ACME A.S.", "1234567890").unwrap()).unwrap();
        store.upsert(&TaxPayer::new("Ayşe Yılmaz", "10000000146").unwrap()).unwrap();

        let backup_dir = dir.path().join("BackUp");
        let path = backup_database(&store, &backup_dir, Utc::now()).unwrap();

        assert!(path.starts_with(&backup_dir));
        let copy = SqliteTaxPayerStore::open(&path).unwrap();
        assert_eq!(copy.list_all().unwrap(), store.list_all().unwrap());
        assert!(copy.last_update_time().is_some());
    }

    #[test]
    fn test_backups_in_same_instant_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let mut store = SqliteTaxPayerStore::open(dir.path().join("taxpayers.db")).unwrap();
        let backup_dir = dir.path().join("BackUp");
        let now = Utc::now();

        let first = backup_database(&store, &backup_dir, now).unwrap();
        store.upsert(&TaxPayer::new("ACME A.S.", "1234567890").unwrap()).unwrap();
        let second = backup_database(&store, &backup_dir, now).unwrap();

        assert_eq!(first, backup_dir.join(backup_file_name(now)));
        assert_eq!(second, backup_dir.join(format!("taxpayers_{}_1.db", timestamp_stem(now))));
        // The earlier copy was left alone
        assert_eq!(SqliteTaxPayerStore::open(&first).unwrap().count().unwrap(), 0);
        assert_eq!(SqliteTaxPayerStore::open(&second).unwrap().count().unwrap(), 1);
    }

    #[test]
    fn test_backup_refuses_when_every_name_is_taken() {
        let dir = TempDir::new().unwrap();
        let store = SqliteTaxPayerStore::open(dir.path().join("taxpayers.db")).unwrap();
        let now = Utc::now();

        std::fs::write(dir.path().join(backup_file_name(now)), b"").unwrap();
        let stem = timestamp_stem(now);
        for n in 1..=MAX_NAME_SUFFIX {
            std::fs::write(dir.path().join(format!("taxpayers_{}_{}.db", stem, n)), b"").unwrap();
        }

        let result = backup_database(&store, dir.path(), now);
        assert!(matches!(result, Err(StoreError::BackupExists(_))));
    }

    #[test]
    fn test_backups_a_millisecond_apart_use_plain_names() {
        let first = backup_file_name(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
        let second = backup_file_name(
            Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap() + Duration::milliseconds(1),
        );
        assert_ne!(first, second);
    }

    #[test]
    fn test_backup_file_name_shape() {
        let name = backup_file_name(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
        assert!(name.starts_with("taxpayers_2026101"));
        assert!(name.ends_with(".db"));
        assert_eq!(name.len(), "taxpayers_YYYYMMDD_HHMMSS_mmm.db".len());
    }

    #[test]
    fn test_backup_due_when_never_taken() {
        assert!(is_backup_due(&enabled_config(None), Utc::now()));
    }

    #[test]
    fn test_backup_due_after_interval() {
        let now = Utc::now();

        assert!(!is_backup_due(&enabled_config(Some(now - Duration::minutes(30))), now));
        assert!(is_backup_due(&enabled_config(Some(now - Duration::minutes(60))), now));
    }

    #[test]
    fn test_backup_never_due_when_disabled() {
        let config = AppConfig {
            auto_backup_enabled: false,
            ..AppConfig::default()
        };
        assert!(!is_backup_due(&config, Utc::now()));
    }
}
