// SQLite-backed Event Store Adapter

use async_trait::async_trait;
use canary_core::error::Result;
use canary_core::{
    fold_case, EventError, EventFilter, EventStats, Predicate, Resolution, SecurityEvent,
    ValidatedEvent,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::store::EventStore;

const EVENT_COLUMNS: &str =
    "id, created_at, event_type, endpoint, ip_address, details, resolved, resolved_at";

pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(EventError::storage)?;
            }
        }

        let conn = Connection::open(path).map_err(EventError::storage)?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(EventError::storage)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .map_err(EventError::storage)?;

        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(EventError::storage)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn).map_err(EventError::storage)?;
        init_schema(&conn).map_err(EventError::storage)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool so a slow disk never
    /// stalls the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| EventError::storage("connection lock poisoned"))?;
            f(&mut guard).map_err(EventError::storage)
        })
        .await
        .map_err(|e| EventError::storage(format!("storage task failed: {}", e)))?
    }
}

/// `unicode_lower(text)`: SQLite's own `lower()` and `LIKE` only fold ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS security_events (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            event_type TEXT NOT NULL CHECK (length(event_type) > 0),
            endpoint TEXT NOT NULL CHECK (length(endpoint) > 0),
            ip_address TEXT NOT NULL CHECK (length(ip_address) > 0),
            details TEXT,
            resolved INTEGER NOT NULL DEFAULT 0,
            resolved_at TEXT,
            CHECK ((resolved = 0 AND resolved_at IS NULL)
                OR (resolved = 1 AND resolved_at IS NOT NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_security_events_created
            ON security_events(created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_security_events_type
            ON security_events(event_type);

        CREATE INDEX IF NOT EXISTS idx_security_events_resolved
            ON security_events(resolved);
    "#,
    )
}

// ============================================================================
// Row mapping
// ============================================================================

/// Fixed-width UTC timestamps, so text order in SQLite equals time order.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_event(row: &Row) -> rusqlite::Result<SecurityEvent> {
    let created_at: String = row.get(1)?;
    let resolved_at: Option<String> = row.get(7)?;

    Ok(SecurityEvent {
        id: row.get(0)?,
        created_at: parse_ts(1, &created_at)?,
        event_type: row.get(2)?,
        endpoint: row.get(3)?,
        ip_address: row.get(4)?,
        details: row.get(5)?,
        resolved: row.get::<_, i64>(6)? != 0,
        resolved_at: resolved_at.map(|s| parse_ts(7, &s)).transpose()?,
    })
}

fn get_event(conn: &Connection, id: &str) -> rusqlite::Result<Option<SecurityEvent>> {
    conn.query_row(
        &format!("SELECT {} FROM security_events WHERE id = ?1", EVENT_COLUMNS),
        params![id],
        row_to_event,
    )
    .optional()
}

// ============================================================================
// Predicate compilation
// ============================================================================

/// Compile a predicate tree into a parameterized WHERE fragment.
///
/// Column names come from `TextField::column`, never from caller input; every
/// value is bound as a parameter.
fn compile_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::EventTypeIs(t) => {
            params.push(Value::Text(t.clone()));
            "event_type = ?".to_string()
        }
        Predicate::ResolvedIs(flag) => {
            params.push(Value::Integer(i64::from(*flag)));
            "resolved = ?".to_string()
        }
        Predicate::FieldContains(field, needle) => {
            params.push(Value::Text(like_pattern(&fold_case(needle))));
            format!("unicode_lower({}) LIKE ? ESCAPE '\\'", field.column())
        }
        Predicate::All(parts) => join_parts(parts, " AND ", "1 = 1", params),
        Predicate::Any(parts) => join_parts(parts, " OR ", "1 = 0", params),
    }
}

fn join_parts(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let mut compiled = Vec::with_capacity(parts.len());
    for part in parts {
        compiled.push(compile_predicate(part, params));
    }
    format!("({})", compiled.join(sep))
}

/// `%needle%` with LIKE metacharacters escaped, so the needle is matched
/// literally. Callers fold case on both sides first.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ============================================================================
// EventStore implementation
// ============================================================================

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn insert(&self, event: &ValidatedEvent) -> Result<SecurityEvent> {
        let event = SecurityEvent {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            event_type: event.event_type().to_string(),
            endpoint: event.endpoint().to_string(),
            ip_address: event.ip_address().to_string(),
            details: event.details().map(str::to_string),
            resolved: false,
            resolved_at: None,
        };

        self.with_conn(move |conn| {
            conn.execute(
                r#"INSERT INTO security_events
                   (id, created_at, event_type, endpoint, ip_address, details, resolved, resolved_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL)"#,
                params![
                    event.id,
                    format_ts(&event.created_at),
                    event.event_type,
                    event.endpoint,
                    event.ip_address,
                    event.details,
                ],
            )?;
            Ok(event)
        })
        .await
    }

    async fn select(&self, filter: &EventFilter) -> Result<Vec<SecurityEvent>> {
        let mut values = Vec::new();
        let clause = compile_predicate(&filter.predicate(), &mut values);
        values.push(Value::Integer(filter.limit as i64));

        let sql = format!(
            "SELECT {} FROM security_events WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ?",
            EVENT_COLUMNS, clause
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), row_to_event)?;
            rows.collect()
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<SecurityEvent>> {
        let id = id.to_string();
        self.with_conn(move |conn| get_event(conn, &id)).await
    }

    async fn update_resolution(
        &self,
        id: &str,
        resolution: Resolution,
    ) -> Result<Option<SecurityEvent>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE security_events SET resolved = ?1, resolved_at = ?2 WHERE id = ?3",
                params![
                    i64::from(resolution.is_resolved()),
                    resolution.timestamp().as_ref().map(format_ts),
                    id
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            get_event(conn, &id)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let count = conn.execute("DELETE FROM security_events WHERE id = ?1", params![id])?;
            Ok(count > 0)
        })
        .await
    }

    async fn stats(&self) -> Result<EventStats> {
        self.with_conn(|conn| {
            let (total, unresolved, unique_ips): (i64, i64, i64) = conn.query_row(
                r#"SELECT COUNT(*),
                          COALESCE(SUM(CASE WHEN resolved = 0 THEN 1 ELSE 0 END), 0),
                          COUNT(DISTINCT ip_address)
                   FROM security_events"#,
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?;

            let mut stmt = conn.prepare(
                "SELECT event_type, COUNT(*) FROM security_events GROUP BY event_type",
            )?;
            let mut rows = stmt.query([])?;
            let mut by_type = std::collections::BTreeMap::new();
            while let Some(row) = rows.next()? {
                let event_type: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                by_type.insert(event_type, count as u64);
            }

            Ok(EventStats {
                total: total as u64,
                unresolved: unresolved as u64,
                unique_ips: unique_ips as u64,
                by_type,
            })
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |_| Ok(())))
            .await
    }
}
