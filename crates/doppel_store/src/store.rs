use anyhow::{Context, Result};
use async_trait::async_trait;
use doppel_core::{NewPersona, Page, PageCursor, PersonaRecord, PersonaStore, Platform};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, username, platform, name, avatar, profile, \"desc\", \
                              sub_count, connection_count, created_at, chat_prompt";

/// SQLite-backed persona repository. Cheap to clone; all clones share the
/// same connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS personas (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                platform TEXT NOT NULL,
                name TEXT NOT NULL,
                avatar TEXT NOT NULL,
                profile TEXT NOT NULL,
                "desc" TEXT NOT NULL,
                sub_count INTEGER NOT NULL DEFAULT 0,
                connection_count INTEGER,
                created_at TEXT NOT NULL,
                chat_prompt TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create personas table")?;

        // One persona per (username, platform). Creation is check-then-insert
        // from the callers' side; the index turns a lost race into a store
        // error instead of a duplicate row.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_personas_username_platform \
             ON personas(username, platform)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create dedup index")?;

        // Covers the catalog order (sub_count desc, id asc).
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_personas_sub_count \
             ON personas(sub_count DESC, id ASC)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ordering index")?;

        Ok(())
    }

    fn row_to_record(row: &SqliteRow) -> Result<PersonaRecord> {
        let platform: String = row.try_get("platform")?;
        Ok(PersonaRecord {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            platform: platform.parse::<Platform>()?,
            name: row.try_get("name")?,
            avatar: row.try_get("avatar")?,
            profile: row.try_get("profile")?,
            desc: row.try_get("desc")?,
            sub_count: row.try_get("sub_count")?,
            connection_count: row.try_get("connection_count")?,
            created_at: row.try_get("created_at")?,
            chat_prompt: row.try_get("chat_prompt")?,
        })
    }
}

#[async_trait]
impl PersonaStore for SqliteStore {
    async fn find_by_username(
        &self,
        platform: Option<Platform>,
        username: &str,
    ) -> Result<Option<PersonaRecord>> {
        let row = match platform {
            Some(p) => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM personas \
                     WHERE username = ?1 AND platform = ?2 LIMIT 1"
                ))
                .bind(username)
                .bind(p.as_str())
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM personas WHERE username = ?1 LIMIT 1"
                ))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .context("Failed to query persona by username")?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn create(&self, persona: &NewPersona) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO personas
                (id, username, platform, name, avatar, profile, "desc",
                 sub_count, connection_count, created_at, chat_prompt)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(&persona.username)
        .bind(persona.platform.as_str())
        .bind(&persona.name)
        .bind(&persona.avatar)
        .bind(&persona.profile)
        .bind(&persona.desc)
        .bind(persona.sub_count)
        .bind(persona.connection_count)
        .bind(&persona.created_at)
        .bind(&persona.chat_prompt)
        .execute(&self.pool)
        .await
        .context("Failed to insert persona")?;

        tracing::debug!(id = %id, username = %persona.username, platform = %persona.platform,
            "Persona created");
        Ok(id)
    }

    async fn list_page(&self, cursor: Option<&PageCursor>, limit: i64) -> Result<Page> {
        let rows = match cursor {
            Some(c) => {
                // Keyset continuation from the (sub_count desc, id asc) order.
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM personas \
                     WHERE sub_count < ?1 OR (sub_count = ?1 AND id > ?2) \
                     ORDER BY sub_count DESC, id ASC LIMIT ?3"
                ))
                .bind(c.sub_count)
                .bind(&c.id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM personas \
                     ORDER BY sub_count DESC, id ASC LIMIT ?1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list personas")?;

        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = records.last().map(|r| PageCursor {
            sub_count: r.sub_count,
            id: r.id.clone(),
        });

        Ok(Page {
            records,
            next_cursor,
        })
    }
}
