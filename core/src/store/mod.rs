//! SQLite-backed store for users, history, favorites and analytics

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::payload::PayloadKind;
use crate::style::{EccLevel, Rgb, StyleOptions};
use crate::{Error, Result};

/// Username and password of the seeded administrator account
const ADMIN_USERNAME: &str = "Admin";
const ADMIN_DEFAULT_PASSWORD: &str = "RANPROJECT";

/// Tables dumped by the admin CSV export
const EXPORT_TABLES: &[&str] = &["users", "qr_history", "favorites", "analytics"];

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// A stored generation record
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub kind: PayloadKind,
    pub content: String,
    pub created_at: String,
}

/// A saved style preset
#[derive(Debug, Clone)]
pub struct Favorite {
    pub id: i64,
    pub name: String,
    pub style: StyleOptions,
}

/// Generation count for one payload kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub kind: String,
    pub count: i64,
}

/// Generation count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

/// Handle to the local database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE,
                password_hash TEXT
            );
            CREATE TABLE IF NOT EXISTS qr_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                qr_type TEXT,
                content TEXT,
                created_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id)
            );
            CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                name TEXT,
                fg_color TEXT,
                bg_color TEXT,
                box_size INTEGER,
                border_size INTEGER,
                error_level TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id)
            );
            CREATE TABLE IF NOT EXISTS analytics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                qr_type TEXT,
                created_at TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id)
            );",
        )?;

        // Databases created before the admin feature lack the column.
        let mut stmt = self.conn.prepare("PRAGMA table_info(users)")?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<_, _>>()?;
        drop(stmt);

        if !columns.iter().any(|c| c == "is_admin") {
            self.conn
                .execute("ALTER TABLE users ADD COLUMN is_admin INTEGER DEFAULT 0", [])?;
        }

        self.seed_admin()?;
        Ok(())
    }

    fn seed_admin(&self) -> Result<()> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![ADMIN_USERNAME],
                |row| row.get(0),
            )
            .optional()?;

        if exists.is_none() {
            self.conn.execute(
                "INSERT INTO users (username, password_hash, is_admin) VALUES (?1, ?2, 1)",
                params![ADMIN_USERNAME, hash_password(ADMIN_DEFAULT_PASSWORD)],
            )?;
            tracing::info!("seeded administrator account");
        }
        Ok(())
    }

    // --- users ---

    /// Create a regular user. Duplicate usernames are rejected.
    pub fn create_user(&self, username: &str, password: &str) -> Result<i64> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "username and password must not be empty".to_string(),
            ));
        }

        let result = self.conn.execute(
            "INSERT INTO users (username, password_hash, is_admin) VALUES (?1, ?2, 0)",
            params![username, hash_password(password)],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Auth(format!("username '{}' already exists", username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and return the matching user.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, username, is_admin FROM users
                 WHERE username = ?1 AND password_hash = ?2",
                params![username, hash_password(password)],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        is_admin: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::Auth("invalid username or password".to_string()))
    }

    // --- history ---

    /// Record a generated payload for a user.
    pub fn record_history(&self, user_id: i64, kind: PayloadKind, content: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO qr_history (user_id, qr_type, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, kind.as_str(), content, now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All history entries for a user, newest first.
    pub fn history(&self, user_id: i64) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, qr_type, content, created_at FROM qr_history
             WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, kind, content, created_at) = row?;
            entries.push(HistoryEntry {
                id,
                kind: PayloadKind::parse(&kind)?,
                content,
                created_at,
            });
        }
        Ok(entries)
    }

    /// One history entry by id (for regeneration).
    pub fn history_entry(&self, user_id: i64, id: i64) -> Result<HistoryEntry> {
        let row = self
            .conn
            .query_row(
                "SELECT id, qr_type, content, created_at FROM qr_history
                 WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let (entry_id, kind, content, created_at) =
            row.ok_or_else(|| Error::NotFound(format!("no history entry with id {}", id)))?;

        Ok(HistoryEntry {
            id: entry_id,
            kind: PayloadKind::parse(&kind)?,
            content,
            created_at,
        })
    }

    /// Delete a history entry. Returns whether a row was removed.
    pub fn delete_history(&self, user_id: i64, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM qr_history WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(n > 0)
    }

    // --- favorites ---

    /// Save the given style under a name for a user.
    pub fn save_favorite(&self, user_id: i64, name: &str, style: &StyleOptions) -> Result<i64> {
        if name.is_empty() {
            return Err(Error::Validation("favorite name must not be empty".to_string()));
        }
        self.conn.execute(
            "INSERT INTO favorites
                (user_id, name, fg_color, bg_color, box_size, border_size, error_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                name,
                style.fg.to_hex(),
                style.bg.to_hex(),
                style.module_size,
                style.border,
                style.ecc.letter(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All favorites for a user, ordered by name.
    pub fn favorites(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, fg_color, bg_color, box_size, border_size, error_level
             FROM favorites WHERE user_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![user_id], favorite_row)?;

        let mut favorites = Vec::new();
        for row in rows {
            favorites.push(parse_favorite(row?)?);
        }
        Ok(favorites)
    }

    /// Load a favorite's style by name.
    pub fn favorite(&self, user_id: i64, name: &str) -> Result<StyleOptions> {
        self.conn
            .query_row(
                "SELECT id, name, fg_color, bg_color, box_size, border_size, error_level
                 FROM favorites WHERE user_id = ?1 AND name = ?2",
                params![user_id, name],
                favorite_row,
            )
            .optional()?
            .map(parse_favorite)
            .transpose()?
            .map(|f| f.style)
            .ok_or_else(|| Error::NotFound(format!("no favorite named '{}'", name)))
    }

    /// Delete a favorite by name. Returns whether a row was removed.
    pub fn delete_favorite(&self, user_id: i64, name: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
        )?;
        Ok(n > 0)
    }

    // --- analytics ---

    /// Record one generation for the usage analytics.
    pub fn record_analytics(&self, user_id: i64, kind: PayloadKind) -> Result<()> {
        self.conn.execute(
            "INSERT INTO analytics (user_id, qr_type, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, kind.as_str(), now()],
        )?;
        Ok(())
    }

    /// Generation counts per payload kind, most used first.
    pub fn type_counts(&self, user_id: i64) -> Result<Vec<TypeCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT qr_type, COUNT(*) AS count FROM analytics
             WHERE user_id = ?1 GROUP BY qr_type ORDER BY count DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(TypeCount {
                kind: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Generation counts for the most recent seven active days,
    /// newest first.
    pub fn daily_counts(&self, user_id: i64) -> Result<Vec<DayCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(created_at, 1, 10) AS day, COUNT(*) AS count
             FROM analytics WHERE user_id = ?1
             GROUP BY day ORDER BY day DESC LIMIT 7",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(DayCount {
                date: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    // --- export ---

    /// Dump every table to `<dir>/<table>.csv`. Administrators only.
    ///
    /// Returns the names of the files written.
    pub fn export_csv(&self, user: &User, dir: &Path) -> Result<Vec<String>> {
        if !user.is_admin {
            return Err(Error::Auth(
                "database export is restricted to administrators".to_string(),
            ));
        }

        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for table in EXPORT_TABLES {
            let mut stmt = self.conn.prepare(&format!("SELECT * FROM {}", table))?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

            let mut out = String::new();
            out.push_str(&csv_line(&columns));

            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let fields: Vec<String> = (0..columns.len())
                    .map(|i| value_to_string(row.get_ref(i)))
                    .collect::<Result<_>>()?;
                out.push_str(&csv_line(&fields));
            }

            let file_name = format!("{}.csv", table);
            std::fs::write(dir.join(&file_name), out)?;
            written.push(file_name);
        }

        tracing::info!("exported {} tables to {}", written.len(), dir.display());
        Ok(written)
    }
}

fn favorite_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<(i64, String, String, String, u32, u32, String), rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn parse_favorite(row: (i64, String, String, String, u32, u32, String)) -> Result<Favorite> {
    let (id, name, fg, bg, module_size, border, ecc) = row;
    Ok(Favorite {
        id,
        name,
        style: StyleOptions {
            fg: Rgb::from_hex(&fg)?,
            bg: Rgb::from_hex(&bg)?,
            module_size,
            border,
            ecc: EccLevel::parse(&ecc)?,
        },
    })
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn value_to_string(value: rusqlite::Result<rusqlite::types::ValueRef<'_>>) -> Result<String> {
    use rusqlite::types::ValueRef;

    Ok(match value? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => {
            use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
            BASE64.encode(b)
        }
    })
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_admin_is_seeded() {
        let store = store();
        let admin = store.authenticate("Admin", "RANPROJECT").unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.username, "Admin");
    }

    #[test]
    fn test_create_and_authenticate_user() {
        let store = store();
        let id = store.create_user("alice", "hunter2").unwrap();
        let user = store.authenticate("alice", "hunter2").unwrap();
        assert_eq!(user.id, id);
        assert!(!user.is_admin);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let store = store();
        store.create_user("alice", "hunter2").unwrap();
        assert!(matches!(
            store.authenticate("alice", "wrong"),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = store();
        store.create_user("alice", "hunter2").unwrap();
        assert!(matches!(
            store.create_user("alice", "other"),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_passwords_are_hashed() {
        let store = store();
        store.create_user("alice", "hunter2").unwrap();
        let stored: String = store
            .conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = 'alice'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_ne!(stored, "hunter2");
        assert_eq!(stored.len(), 64);
    }

    #[test]
    fn test_history_roundtrip() {
        let store = store();
        let user = store.create_user("alice", "pw").unwrap();

        let id = store
            .record_history(user, PayloadKind::Url, "https://example.com")
            .unwrap();
        store.record_history(user, PayloadKind::Text, "note").unwrap();

        let entries = store.history(user).unwrap();
        assert_eq!(entries.len(), 2);

        let entry = store.history_entry(user, id).unwrap();
        assert_eq!(entry.kind, PayloadKind::Url);
        assert_eq!(entry.content, "https://example.com");
    }

    #[test]
    fn test_history_is_per_user() {
        let store = store();
        let alice = store.create_user("alice", "pw").unwrap();
        let bob = store.create_user("bob", "pw").unwrap();

        let id = store.record_history(alice, PayloadKind::Text, "hi").unwrap();

        assert!(store.history(bob).unwrap().is_empty());
        assert!(store.history_entry(bob, id).is_err());
        assert!(!store.delete_history(bob, id).unwrap());
    }

    #[test]
    fn test_delete_history() {
        let store = store();
        let user = store.create_user("alice", "pw").unwrap();
        let id = store.record_history(user, PayloadKind::Text, "hi").unwrap();

        assert!(store.delete_history(user, id).unwrap());
        assert!(store.history(user).unwrap().is_empty());
        assert!(!store.delete_history(user, id).unwrap());
    }

    #[test]
    fn test_favorites_roundtrip() {
        let store = store();
        let user = store.create_user("alice", "pw").unwrap();

        let style = crate::style::template("Professional").unwrap();
        store.save_favorite(user, "work", &style).unwrap();

        let loaded = store.favorite(user, "work").unwrap();
        assert_eq!(loaded, style);

        let all = store.favorites(user).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "work");

        assert!(store.delete_favorite(user, "work").unwrap());
        assert!(store.favorite(user, "work").is_err());
    }

    #[test]
    fn test_favorites_ordered_by_name() {
        let store = store();
        let user = store.create_user("alice", "pw").unwrap();
        let style = StyleOptions::default();

        store.save_favorite(user, "zeta", &style).unwrap();
        store.save_favorite(user, "alpha", &style).unwrap();

        let names: Vec<String> = store
            .favorites(user)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_analytics_counts() {
        let store = store();
        let user = store.create_user("alice", "pw").unwrap();

        store.record_analytics(user, PayloadKind::Url).unwrap();
        store.record_analytics(user, PayloadKind::Url).unwrap();
        store.record_analytics(user, PayloadKind::Wifi).unwrap();

        let counts = store.type_counts(user).unwrap();
        assert_eq!(counts[0], TypeCount { kind: "url".to_string(), count: 2 });
        assert_eq!(counts[1], TypeCount { kind: "wifi".to_string(), count: 1 });

        let days = store.daily_counts(user).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].count, 3);
    }

    #[test]
    fn test_export_requires_admin() {
        let store = store();
        store.create_user("alice", "pw").unwrap();
        let user = store.authenticate("alice", "pw").unwrap();

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            store.export_csv(&user, dir.path()),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_export_writes_all_tables() {
        let store = store();
        let admin = store.authenticate("Admin", "RANPROJECT").unwrap();
        let user = store.create_user("alice", "pw").unwrap();
        store.record_history(user, PayloadKind::Text, "a,b \"quoted\"").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let files = store.export_csv(&admin, dir.path()).unwrap();
        assert_eq!(
            files,
            vec!["users.csv", "qr_history.csv", "favorites.csv", "analytics.csv"]
        );

        let history = std::fs::read_to_string(dir.path().join("qr_history.csv")).unwrap();
        assert!(history.starts_with("id,user_id,qr_type,content,created_at\n"));
        assert!(history.contains("\"a,b \"\"quoted\"\"\""));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }
}
