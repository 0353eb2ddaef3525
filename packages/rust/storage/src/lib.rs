//! Turso Embedded / libSQL conversation store (offline mode).
//!
//! The [`Storage`] struct wraps a libSQL database holding conversations and
//! their ordered turns. It implements [`ConversationStore`], the persistence
//! seam the orchestrator is written against.
//!
//! **Access rules:**
//! - `lexdraft chat`: read-write via [`Storage::open`]
//! - `lexdraft history`: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use lexdraft_shared::{
    ConversationId, ConversationSnapshot, ConversationSummary, LexDraftError, Result, Role,
    StoredTurn,
};
use libsql::{Connection, Database, params};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// ConversationStore
// ---------------------------------------------------------------------------

/// Persistence collaborator for conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation holding `initial_turns`. Returns its new id.
    async fn create_conversation(
        &self,
        title: &str,
        initial_turns: &[StoredTurn],
    ) -> Result<ConversationId>;

    /// Append `turns` in order. Fails with
    /// [`LexDraftError::ConversationNotFound`] for an unknown id.
    async fn append_turns(&self, id: ConversationId, turns: &[StoredTurn]) -> Result<()>;

    /// Read a conversation and all its turns, oldest first.
    async fn get_conversation(&self, id: ConversationId) -> Result<ConversationSnapshot>;

    /// Most recently updated conversations first.
    async fn list_conversations(&self, limit: u32) -> Result<Vec<ConversationSummary>>;
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Primary storage handle wrapping a libSQL database.
///
/// All statements share one connection, so write transactions are
/// serialized behind `write_lock`.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    write_lock: Mutex<()>,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LexDraftError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LexDraftError::Storage(format!(
                "no conversation database at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            write_lock: Mutex::new(()),
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        LexDraftError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(LexDraftError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    /// Insert `turns` after the current last turn of `id`. Runs inside the
    /// caller's transaction.
    async fn insert_turns(
        conn: &Connection,
        id: &str,
        turns: &[StoredTurn],
        now: &str,
    ) -> Result<()> {
        let mut rows = conn
            .query(
                "SELECT COALESCE(MAX(seq), -1) + 1 FROM turns WHERE conversation_id = ?1",
                params![id],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;
        let mut next_seq: i64 = match rows.next().await {
            Ok(Some(row)) => row.get(0).unwrap_or(0),
            _ => 0,
        };

        for turn in turns {
            conn.execute(
                "INSERT INTO turns (conversation_id, seq, role, content, is_legal_draft, document_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    next_seq,
                    turn.role.as_str(),
                    turn.content.as_str(),
                    i64::from(turn.is_legal_draft),
                    turn.document_type.as_deref(),
                    now,
                ],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;
            next_seq += 1;
        }
        Ok(())
    }

    async fn load_turns(&self, id: &str) -> Result<Vec<StoredTurn>> {
        let mut rows = self
            .conn
            .query(
                "SELECT role, content, is_legal_draft, document_type
                 FROM turns WHERE conversation_id = ?1 ORDER BY seq",
                params![id],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let mut turns = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            turns.push(row_to_turn(&row)?);
        }
        Ok(turns)
    }
}

#[async_trait]
impl ConversationStore for Storage {
    async fn create_conversation(
        &self,
        title: &str,
        initial_turns: &[StoredTurn],
    ) -> Result<ConversationId> {
        self.check_writable()?;
        let id = ConversationId::new();
        let id_str = id.to_string();
        let _write = self.write_lock.lock().await;
        let now = timestamp(Utc::now());

        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;
        tx.execute(
            "INSERT INTO conversations (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![id_str.as_str(), title, now.as_str(), now.as_str()],
        )
        .await
        .map_err(|e| LexDraftError::Storage(e.to_string()))?;
        Self::insert_turns(&tx, &id_str, initial_turns, &now).await?;
        tx.commit()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        tracing::debug!(conversation = %id, turns = initial_turns.len(), "conversation created");
        Ok(id)
    }

    async fn append_turns(&self, id: ConversationId, turns: &[StoredTurn]) -> Result<()> {
        self.check_writable()?;
        let id_str = id.to_string();
        let _write = self.write_lock.lock().await;
        let now = timestamp(Utc::now());

        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;
        let touched = tx
            .execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                params![now.as_str(), id_str.as_str()],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;
        if touched == 0 {
            tx.rollback()
                .await
                .map_err(|e| LexDraftError::Storage(e.to_string()))?;
            return Err(LexDraftError::ConversationNotFound(id));
        }
        Self::insert_turns(&tx, &id_str, turns, &now).await?;
        tx.commit()
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        tracing::debug!(conversation = %id, turns = turns.len(), "turns appended");
        Ok(())
    }

    async fn get_conversation(&self, id: ConversationId) -> Result<ConversationSnapshot> {
        let id_str = id.to_string();
        let mut rows = self
            .conn
            .query(
                "SELECT title, created_at, updated_at FROM conversations WHERE id = ?1",
                params![id_str.as_str()],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let (title, created_at, updated_at) = match rows.next().await {
            Ok(Some(row)) => (
                row.get::<String>(0)
                    .map_err(|e| LexDraftError::Storage(e.to_string()))?,
                parse_timestamp(&row, 1)?,
                parse_timestamp(&row, 2)?,
            ),
            Ok(None) => return Err(LexDraftError::ConversationNotFound(id)),
            Err(e) => return Err(LexDraftError::Storage(e.to_string())),
        };

        Ok(ConversationSnapshot {
            id,
            title,
            turns: self.load_turns(&id_str).await?,
            created_at,
            updated_at,
        })
    }

    async fn list_conversations(&self, limit: u32) -> Result<Vec<ConversationSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT c.id, c.title, c.updated_at,
                        (SELECT COUNT(*) FROM turns t WHERE t.conversation_id = c.id)
                 FROM conversations c
                 ORDER BY c.updated_at DESC, c.id DESC
                 LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(|e| LexDraftError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let id: String = row
                .get(0)
                .map_err(|e| LexDraftError::Storage(e.to_string()))?;
            let id = id
                .parse::<ConversationId>()
                .map_err(|e| LexDraftError::Storage(format!("invalid conversation id: {e}")))?;
            results.push(ConversationSummary {
                id,
                title: row
                    .get::<String>(1)
                    .map_err(|e| LexDraftError::Storage(e.to_string()))?,
                updated_at: parse_timestamp(&row, 2)?,
                turn_count: row.get::<i64>(3).unwrap_or(0) as usize,
            });
        }
        Ok(results)
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &libsql::Row, idx: i32) -> Result<DateTime<Utc>> {
    let s: String = row
        .get(idx)
        .map_err(|e| LexDraftError::Storage(e.to_string()))?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LexDraftError::Storage(format!("invalid date: {e}")))
}

/// Convert a database row to a [`StoredTurn`].
fn row_to_turn(row: &libsql::Row) -> Result<StoredTurn> {
    let role: String = row
        .get(0)
        .map_err(|e| LexDraftError::Storage(e.to_string()))?;
    Ok(StoredTurn {
        role: role.parse::<Role>().map_err(LexDraftError::Storage)?,
        content: row
            .get::<String>(1)
            .map_err(|e| LexDraftError::Storage(e.to_string()))?,
        is_legal_draft: row.get::<i64>(2).unwrap_or(0) != 0,
        document_type: row.get::<String>(3).ok(),
    })
}
