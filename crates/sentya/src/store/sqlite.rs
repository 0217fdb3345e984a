//! `SQLite`-backed user store.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::{migrations, UserStore};
use crate::error::{Error, Result};
use crate::patch::UserPatch;
use crate::user::{NewUser, Role, UserRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_USER: &str = r"
SELECT id, name, last_name, email, dni, phone, birth_date, address,
       observations, role, is_active, is_online, join_date
FROM users
";

/// Persistent user store in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a user database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fail with a conflict if another user already holds `email` or `dni`.
    fn ensure_unique(&self, email: &str, dni: &str, except: Option<i64>) -> Result<()> {
        let clash: Option<(String, String)> = self
            .conn
            .query_row(
                r"
                SELECT email, dni FROM users
                WHERE (lower(email) = lower(?1) OR dni = ?2) AND id != ?3
                LIMIT 1
                ",
                params![email, dni, except.unwrap_or(-1)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match clash {
            Some((existing, _)) if existing.eq_ignore_ascii_case(email) => {
                Err(Error::conflict("email", email))
            }
            Some(_) => Err(Error::conflict("dni", dni)),
            None => Ok(()),
        }
    }

    fn require(&self, id: i64) -> Result<UserRecord> {
        self.get(id)?.ok_or(Error::UserNotFound { id })
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRecord> {
        let birth_date: Option<String> = row.get(6)?;
        let role_str: String = row.get(9)?;
        let join_date: String = row.get(12)?;

        let role = role_str.parse().unwrap_or_else(|_| {
            warn!("Unknown role: {}, defaulting to client", role_str);
            Role::Client
        });

        Ok(UserRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            dni: row.get(4)?,
            phone: row.get(5)?,
            birth_date: birth_date
                .map(|value| parse_column_date(6, &value))
                .transpose()?,
            address: row.get(7)?,
            observations: row.get(8)?,
            role,
            is_active: row.get(10)?,
            is_online: row.get(11)?,
            join_date: parse_column_date(12, &join_date)?,
        })
    }
}

fn parse_column_date(column: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl UserStore for SqliteStore {
    fn list(&self) -> Result<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_USER} ORDER BY id"))?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                &format!("{SELECT_USER} WHERE id = ?1"),
                [id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn insert(&mut self, user: NewUser, join_date: NaiveDate) -> Result<UserRecord> {
        self.ensure_unique(&user.email, &user.dni, None)?;

        self.conn.execute(
            r"
            INSERT INTO users (name, last_name, email, dni, phone, birth_date, address,
                               observations, role, is_active, is_online, join_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11)
            ",
            params![
                user.name,
                user.last_name,
                user.email,
                user.dni,
                user.phone,
                user.birth_date.map(format_date),
                user.address,
                user.observations,
                user.role.key(),
                user.is_active,
                format_date(join_date),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted user with id {}", id);
        Ok(user.into_record(id, join_date))
    }

    fn update(&mut self, id: i64, patch: &UserPatch) -> Result<UserRecord> {
        let mut user = self.require(id)?;
        patch.apply(&mut user);
        self.ensure_unique(&user.email, &user.dni, Some(id))?;

        self.conn.execute(
            r"
            UPDATE users SET name = ?2, last_name = ?3, email = ?4, dni = ?5, phone = ?6,
                             birth_date = ?7, address = ?8, observations = ?9, role = ?10,
                             is_active = ?11, updated_at = datetime('now')
            WHERE id = ?1
            ",
            params![
                id,
                user.name,
                user.last_name,
                user.email,
                user.dni,
                user.phone,
                user.birth_date.map(format_date),
                user.address,
                user.observations,
                user.role.key(),
                user.is_active,
            ],
        )?;

        debug!("Updated user {} ({} fields)", id, patch.changed_fields().len());
        Ok(user)
    }

    fn set_online(&mut self, id: i64, online: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE users SET is_online = ?2 WHERE id = ?1",
            params![id, online],
        )?;
        if changed == 0 {
            return Err(Error::UserNotFound { id });
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::internal(format!("invalid user count: {count}")))
    }
}
