// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::db;
use crate::web::ApiResponse;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const STATUS_QUEUED: &str = "queued";
pub const STATUS_RUNNING: &str = "running";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const KIND_ANALYSIS: &str = "analysis";
pub const KIND_EXPORT: &str = "export";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub project_id: String,
    pub kind: String,
    pub status: String,
    pub stage: String,
    pub percent: i64,
    pub message: String,
    pub output_path: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

const JOB_COLUMNS: &str =
    "id, project_id, kind, status, stage, percent, message, output_path, error, created_at, updated_at";

fn job_from_row(row: &Row) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        project_id: row.get(1)?,
        kind: row.get(2)?,
        status: row.get(3)?,
        stage: row.get(4)?,
        percent: row.get(5)?,
        message: row.get(6)?,
        output_path: row.get(7)?,
        error: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn create_job(project_id: &str, kind: &str) -> Result<Job, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO jobs (project_id, kind, status, stage, percent, message, output_path, error, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, NULL, NULL, ?6, ?6)",
        (project_id, kind, STATUS_QUEUED, "queued", "Waiting in queue", &now),
    )?;
    let id = conn.last_insert_rowid();
    get_job(id)
}

pub fn get_job(id: i64) -> Result<Job, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let mut stmt = conn.prepare(&format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS))?;
    let mut rows = stmt.query_map([id], job_from_row)?;

    match rows.next() {
        Some(job) => Ok(job?),
        None => Err(format!("No job with id: {}", id).into()),
    }
}

pub fn list_jobs_for_project(project_id: &str) -> Result<Vec<Job>, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM jobs WHERE project_id = ?1 ORDER BY created_at DESC",
        JOB_COLUMNS
    ))?;
    let rows = stmt.query_map([project_id], job_from_row)?;

    let mut jobs = Vec::new();
    for job in rows {
        jobs.push(job?);
    }
    Ok(jobs)
}

// Oldest queued job wins. Claiming flips it to running in the same statement
// so two workers can't pick up the same row.
pub fn claim_next_job() -> Result<Option<Job>, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let candidate: Option<i64> = conn
        .query_row(
            "SELECT id FROM jobs WHERE status = ?1 ORDER BY created_at ASC, id ASC LIMIT 1",
            [STATUS_QUEUED],
            |row| row.get(0),
        )
        .ok();

    let Some(id) = candidate else {
        return Ok(None);
    };

    let claimed = conn.execute(
        "UPDATE jobs SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        (id, STATUS_RUNNING, Utc::now().to_rfc3339(), STATUS_QUEUED),
    )?;

    if claimed == 0 {
        return Ok(None);
    }
    Ok(Some(get_job(id)?))
}

// Used by the CLI when it runs a job inline instead of through the worker.
pub fn mark_running(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "UPDATE jobs SET status = ?2, updated_at = ?3 WHERE id = ?1",
        (id, STATUS_RUNNING, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

pub fn update_progress(
    id: i64,
    stage: &str,
    percent: i64,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "UPDATE jobs SET stage = ?2, percent = ?3, message = ?4, updated_at = ?5 WHERE id = ?1",
        (id, stage, percent, message, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

pub fn finish_job(
    id: i64,
    output_path: Option<&str>,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "UPDATE jobs SET status = ?2, stage = ?3, percent = 100, message = ?4, output_path = ?5, updated_at = ?6
         WHERE id = ?1",
        (
            id,
            STATUS_COMPLETED,
            "done",
            message,
            output_path,
            Utc::now().to_rfc3339(),
        ),
    )?;
    clear_cancel_marker(id);
    Ok(())
}

pub fn fail_job(id: i64, error: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "UPDATE jobs SET status = ?2, message = ?3, error = ?3, updated_at = ?4 WHERE id = ?1",
        (id, STATUS_FAILED, error, Utc::now().to_rfc3339()),
    )?;
    clear_cancel_marker(id);
    Ok(())
}

pub fn mark_cancelled(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "UPDATE jobs SET status = ?2, message = ?3, updated_at = ?4 WHERE id = ?1",
        (
            id,
            STATUS_CANCELLED,
            "Cancelled by user",
            Utc::now().to_rfc3339(),
        ),
    )?;
    clear_cancel_marker(id);
    Ok(())
}

fn cancel_marker_path(id: i64) -> std::path::PathBuf {
    db::commands_dir().join(format!("CANCEL_{}", id))
}

// Cancellation goes through a marker file rather than the database so a
// long-running stage doesn't need its own connection to notice it.
pub fn request_cancel(id: i64) -> Result<Job, Box<dyn std::error::Error>> {
    let job = get_job(id)?;
    match job.status.as_str() {
        STATUS_QUEUED => {
            mark_cancelled(id)?;
        }
        STATUS_RUNNING => {
            let commands_dir = db::commands_dir();
            std::fs::create_dir_all(&commands_dir)?;
            std::fs::write(cancel_marker_path(id), "")?;
            // The job can reach a terminal state while the marker is being
            // written; a marker for a finished job would never be cleared.
            if get_job(id)?.status != STATUS_RUNNING {
                clear_cancel_marker(id);
            }
        }
        other => {
            clear_cancel_marker(id);
            return Err(format!("Job {} is already {}", id, other).into());
        }
    }
    get_job(id)
}

pub fn is_cancel_requested(id: i64) -> bool {
    cancel_marker_path(id).exists()
}

pub fn clear_cancel_marker(id: i64) {
    let marker = cancel_marker_path(id);
    if marker.exists() {
        std::fs::remove_file(marker).ok();
    }
}

// Default pacing between simulated pipeline stages, in milliseconds.
// VVE_STAGE_DELAY_MS=0 makes job runs instant for tests.
pub fn stage_delay_ms() -> u64 {
    std::env::var("VVE_STAGE_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(900)
}

fn run_claimed_job(job: Job) {
    let result = match job.kind.as_str() {
        KIND_ANALYSIS => crate::analysis::run_analysis(job.id, &job.project_id, stage_delay_ms()),
        KIND_EXPORT => crate::export::run_export(job.id, &job.project_id, stage_delay_ms()),
        other => Err(format!("Unknown job kind: {}", other).into()),
    };

    if let Err(e) = result {
        eprintln!("job {} ({}) failed: {}", job.id, job.kind, e);
        fail_job(job.id, &e.to_string()).ok();
    }
}

// Background worker: poll for queued jobs once a second and run them one at a
// time on the blocking pool.
pub fn process_jobs() {
    tokio::spawn(async {
        loop {
            // The claim result carries a non-Send error type, so it must be
            // consumed before the next await point.
            let claimed = match claim_next_job() {
                Ok(job) => job,
                Err(e) => {
                    eprintln!("error polling job queue: {}", e);
                    None
                }
            };

            if let Some(job) = claimed {
                println!("starting job {} ({}) for project {}", job.id, job.kind, job.project_id);
                let handle = tokio::task::spawn_blocking(move || run_claimed_job(job));
                if let Err(e) = handle.await {
                    eprintln!("job worker panicked: {}", e);
                }
            }
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
    });
}

#[get("/api/jobs/<id>")]
pub fn web_get_job(_auth: AuthGuard, id: i64) -> Json<ApiResponse<Job>> {
    match get_job(id) {
        Ok(job) => Json(ApiResponse::success(job)),
        Err(e) => Json(ApiResponse::error(format!("Failed to get job: {}", e))),
    }
}

#[post("/api/jobs/<id>/cancel")]
pub fn web_cancel_job(_auth: AuthGuard, id: i64) -> Json<ApiResponse<Job>> {
    match request_cancel(id) {
        Ok(job) => Json(ApiResponse::success(job)),
        Err(e) => Json(ApiResponse::error(format!("Failed to cancel job: {}", e))),
    }
}
