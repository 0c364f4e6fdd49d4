use crate::api::models::{Complaint, Notification};
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::fs;
use std::path::{Path, PathBuf};

/// Preference keys kept in the `kv` table.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_ID: &str = "userId";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
    pub const SEEN_ONBOARDING: &str = "seenOnboarding";
}

pub fn default_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "shakwa", "Shakwa")?;
    Some(proj.data_dir().join("shakwa.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// The session token lives here, so nobody but the owner gets to read it.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn sortable(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn upsert_complaint_rows(tx: &Transaction<'_>, complaints: &[Complaint]) -> Result<()> {
    for c in complaints {
        tx.execute(
            r#"
            INSERT INTO complaints (id, local, created_at, raw_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                local=excluded.local,
                created_at=excluded.created_at,
                raw_json=excluded.raw_json
            "#,
            params![c.id, c.local, sortable(&c.created_at), serde_json::to_string(c)?],
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self { path: path.into() };
        ensure_dir(&storage.path)?;
        storage.init()?;
        restrict_permissions(&storage.path)?;
        Ok(storage)
    }

    pub fn open_default() -> Result<Self> {
        let path = default_path().ok_or_else(|| Error::Config("no data dir".into()))?;
        Self::open(path)
    }

    fn conn(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS complaints (
                id TEXT PRIMARY KEY,
                local INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                raw_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                raw_json TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn upsert_complaints(&self, complaints: &[Complaint]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        upsert_complaint_rows(&tx, complaints)?;
        tx.commit()?;
        Ok(())
    }

    /// Swaps the cached server rows for `complaints`; local-only rows survive.
    pub fn replace_remote_complaints(&self, complaints: &[Complaint]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM complaints WHERE local = 0", [])?;
        upsert_complaint_rows(&tx, complaints)?;
        tx.commit()?;
        Ok(())
    }

    /// Drops everything tied to the signed-in account. Preferences stay.
    pub fn clear_user_data(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM complaints", [])?;
        tx.execute("DELETE FROM notifications", [])?;
        tx.commit()?;
        Ok(())
    }

    pub fn cached_complaints(&self, limit: Option<usize>) -> Result<Vec<Complaint>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT raw_json FROM complaints ORDER BY local DESC, created_at DESC LIMIT ?1",
        )?;
        let lim = limit.unwrap_or(500) as i64;
        let rows = stmt.query_map(params![lim], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for raw in rows {
            out.push(serde_json::from_str(&raw?)?);
        }
        Ok(out)
    }

    pub fn upsert_notifications(&self, notifications: &[Notification]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for n in notifications {
            tx.execute(
                r#"
                INSERT INTO notifications (id, read, created_at, raw_json)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    read=excluded.read,
                    created_at=excluded.created_at,
                    raw_json=excluded.raw_json
                "#,
                params![n.id, n.read, sortable(&n.created_at), serde_json::to_string(n)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn notifications(&self, limit: Option<usize>) -> Result<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT raw_json, read FROM notifications ORDER BY created_at DESC LIMIT ?1",
        )?;
        let lim = limit.unwrap_or(200) as i64;
        let rows = stmt.query_map(params![lim], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?;
        let mut out = Vec::new();
        for r in rows {
            let (raw, read) = r?;
            let mut n: Notification = serde_json::from_str(&raw)?;
            n.read = read;
            out.push(n);
        }
        Ok(out)
    }

    pub fn mark_notification_read(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("UPDATE notifications SET read = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn mark_all_notifications_read(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("UPDATE notifications SET read = 1", [])?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::models::{ComplaintStatus, NotificationKind};
    use chrono::{Duration, Utc};

    pub(crate) fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path().join("nested").join("test.sqlite")).unwrap();
        (dir, storage)
    }

    pub(crate) fn complaint(id: &str, hours_ago: i64, local: bool) -> Complaint {
        Complaint {
            id: id.into(),
            title: format!("complaint {}", id),
            kind: "maintenance".into(),
            status: ComplaintStatus::Pending,
            created_at: Utc::now() - Duration::hours(hours_ago),
            description: String::new(),
            location: None,
            priority: None,
            phone: None,
            email: None,
            attachments: Vec::new(),
            local,
        }
    }

    pub(crate) fn notification(id: &str, hours_ago: i64, read: bool) -> Notification {
        Notification {
            id: id.into(),
            title: format!("note {}", id),
            message: "status changed".into(),
            kind: NotificationKind::Update,
            read,
            created_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn kv_roundtrip_and_remove() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        storage.set(keys::TOKEN, "abc").unwrap();
        storage.set(keys::TOKEN, "def").unwrap();
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("def"));
        storage.remove(keys::TOKEN).unwrap();
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn database_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        Storage::open(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn replacing_remote_keeps_local_rows() {
        let (_dir, storage) = temp_storage();
        storage
            .upsert_complaints(&[complaint("r1", 5, false), complaint("l1", 10, true)])
            .unwrap();
        storage.replace_remote_complaints(&[complaint("r2", 1, false)]).unwrap();

        let ids: Vec<String> = storage.cached_complaints(None).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["l1", "r2"]);
    }

    #[test]
    fn failed_replace_leaves_cache_untouched() {
        let (_dir, storage) = temp_storage();
        storage.upsert_complaints(&[complaint("r1", 5, false)]).unwrap();

        // The delete runs first, then the insert of r2 fails.
        let conn = storage.conn().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_r2 BEFORE INSERT ON complaints WHEN NEW.id = 'r2'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();
        assert!(storage.replace_remote_complaints(&[complaint("r2", 1, false)]).is_err());

        let ids: Vec<String> = storage.cached_complaints(None).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["r1"]);
    }

    #[test]
    fn clearing_user_data_keeps_preferences() {
        let (_dir, storage) = temp_storage();
        storage.set(keys::THEME, "dark").unwrap();
        storage.upsert_complaints(&[complaint("r1", 5, false), complaint("l1", 1, true)]).unwrap();
        storage.upsert_notifications(&[notification("n1", 1, false)]).unwrap();

        storage.clear_user_data().unwrap();
        assert!(storage.cached_complaints(None).unwrap().is_empty());
        assert!(storage.notifications(None).unwrap().is_empty());
        assert_eq!(storage.get(keys::THEME).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn notifications_newest_first_with_read_flag() {
        let (_dir, storage) = temp_storage();
        storage
            .upsert_notifications(&[notification("a", 3, false), notification("b", 1, false)])
            .unwrap();
        storage.mark_notification_read("a").unwrap();

        let list = storage.notifications(None).unwrap();
        assert_eq!(list[0].id, "b");
        assert!(!list[0].read);
        assert!(list[1].read);

        storage.mark_all_notifications_read().unwrap();
        assert!(storage.notifications(None).unwrap().iter().all(|n| n.read));
    }
}
