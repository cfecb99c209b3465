// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use rusqlite::{Connection, Result as SqliteResult};

// The store is rebuildable demo state, so schema changes just drop and
// recreate everything.
const SCHEMA_VERSION: &str = "20260819-2";

pub fn get_data_dir() -> std::path::PathBuf {
    if let Ok(data_dir) = std::env::var("VVE_DATA_DIR") {
        return std::path::PathBuf::from(data_dir);
    }
    let home_dir = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    home_dir.join(".vve")
}

pub fn get_db_path() -> std::path::PathBuf {
    get_data_dir().join("vve.db")
}

pub fn uploads_dir() -> std::path::PathBuf {
    get_data_dir().join("uploads")
}

pub fn exports_dir() -> std::path::PathBuf {
    get_data_dir().join("exports")
}

pub fn models_dir() -> std::path::PathBuf {
    get_data_dir().join("models")
}

pub fn commands_dir() -> std::path::PathBuf {
    get_data_dir().join(".commands")
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version TEXT PRIMARY KEY
        )",
        [],
    )?;

    let current_version: Option<String> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    if current_version.as_deref() != Some(SCHEMA_VERSION) {
        conn.execute("DROP TABLE IF EXISTS projects", [])?;
        conn.execute("DROP TABLE IF EXISTS jobs", [])?;
        conn.execute("DROP TABLE IF EXISTS schema_version", [])?;

        conn.execute(
            "CREATE TABLE schema_version (
                version TEXT PRIMARY KEY
            )",
            [],
        )?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;

        // Structured fields (metadata, transcript, vibe_analysis, style) are
        // serialized JSON; NULL means the project hasn't reached that step yet.
        conn.execute(
            "CREATE TABLE projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                video_path TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                metadata TEXT,
                transcript TEXT,
                vibe_analysis TEXT,
                selected_vibe TEXT,
                style TEXT,
                saved_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                stage TEXT NOT NULL,
                percent INTEGER NOT NULL,
                message TEXT NOT NULL,
                output_path TEXT,
                error TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
    }

    Ok(())
}

pub fn get_connection() -> SqliteResult<Connection> {
    let db_path = get_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(db_path)?;
    init_database(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub(crate) mod testenv {
    use std::sync::Mutex;

    // VVE_DATA_DIR and VVE_CONFIG_PATH are process-global, so tests that
    // redirect them take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub fn with_temp_store<F: FnOnce()>(f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var("VVE_DATA_DIR", dir.path());
            std::env::set_var("VVE_CONFIG_PATH", dir.path().join("config.toml"));
        }
        f();
        unsafe {
            std::env::remove_var("VVE_DATA_DIR");
            std::env::remove_var("VVE_CONFIG_PATH");
        }
    }
}
