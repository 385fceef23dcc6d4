//! Database schema SQL.

/// Flat key-value table backing the semantic cache and any other
/// string-keyed engine state.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;
