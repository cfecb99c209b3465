// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{VveConfig, load_config_or_default};
use crate::db;
use crate::metadata::{self, VideoMetadata};
use crate::styling::StyleSettings;
use crate::transcripts::Transcript;
use crate::vibes::{Vibe, VibeAnalysis};
use crate::web::ApiResponse;
use chrono::Utc;
use globset::Glob;
use rayon::prelude::*;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::{delete, get, post};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;
use walkdir::WalkDir;

pub fn get_video_extensions() -> Vec<&'static str> {
    vec!["mp4", "mov", "avi", "mkv"]
}

// Uploads also accept webm since the browser can hand us screen recordings.
pub fn get_upload_extensions() -> Vec<&'static str> {
    vec!["mp4", "mov", "avi", "mkv", "webm"]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub video_path: String,
    pub created_at: String,
    pub updated_at: String,
    pub metadata: Option<VideoMetadata>,
    pub transcript: Option<Transcript>,
    pub vibe_analysis: Option<VibeAnalysis>,
    pub selected_vibe: Option<Vibe>,
    pub style: Option<StyleSettings>,
    pub saved_at: Option<String>,
}

fn validate_video_file(path: &Path, extensions: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()).into());
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()).into());
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension {
        Some(ext) if extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(format!("Unsupported video format: {}", ext).into()),
        None => Err("File has no extension or invalid extension".into()),
    }
}

fn json_column<T: Serialize>(value: &Option<T>) -> Option<String> {
    value
        .as_ref()
        .and_then(|v| serde_json::to_string(v).ok())
}

fn parse_json_column<T: for<'de> Deserialize<'de>>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        video_path: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        metadata: parse_json_column(row.get(5)?),
        transcript: parse_json_column(row.get(6)?),
        vibe_analysis: parse_json_column(row.get(7)?),
        selected_vibe: row
            .get::<_, Option<String>>(8)?
            .and_then(|s| s.parse().ok()),
        style: parse_json_column(row.get(9)?),
        saved_at: row.get(10)?,
    })
}

const PROJECT_COLUMNS: &str =
    "id, name, video_path, created_at, updated_at, metadata, transcript, vibe_analysis, selected_vibe, style, saved_at";

pub fn create_project(video_path: &str) -> Result<Project, Box<dyn std::error::Error>> {
    let path = Path::new(video_path);
    validate_video_file(path, &get_video_extensions())?;

    let cfg = load_config_or_default();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string());

    let now = Utc::now().to_rfc3339();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        name,
        video_path: video_path.to_string(),
        created_at: now.clone(),
        updated_at: now,
        metadata: Some(metadata::probe(path, &cfg)),
        transcript: None,
        vibe_analysis: None,
        selected_vibe: None,
        style: None,
        saved_at: None,
    };

    insert_project(&project)?;
    Ok(project)
}

fn insert_project(project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    conn.execute(
        "INSERT INTO projects (id, name, video_path, created_at, updated_at, metadata, transcript, vibe_analysis, selected_vibe, style, saved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        (
            &project.id,
            &project.name,
            &project.video_path,
            &project.created_at,
            &project.updated_at,
            json_column(&project.metadata),
            json_column(&project.transcript),
            json_column(&project.vibe_analysis),
            project.selected_vibe.map(|v| v.as_str().to_string()),
            json_column(&project.style),
            &project.saved_at,
        ),
    )?;
    Ok(())
}

pub fn list_projects() -> Result<Vec<Project>, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM projects ORDER BY created_at DESC",
        PROJECT_COLUMNS
    ))?;
    let rows = stmt.query_map([], project_from_row)?;

    let mut projects = Vec::new();
    for project in rows {
        projects.push(project?);
    }
    Ok(projects)
}

pub fn get_project(id: &str) -> Result<Project, Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM projects WHERE id = ?1",
        PROJECT_COLUMNS
    ))?;
    let mut rows = stmt.query_map([id], project_from_row)?;

    match rows.next() {
        Some(project) => Ok(project?),
        None => Err(format!("No project with id: {}", id).into()),
    }
}

// Every write path funnels through here so updated_at always moves.
pub fn update_project(project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::get_connection()?;
    let updated = conn.execute(
        "UPDATE projects SET name = ?2, video_path = ?3, updated_at = ?4, metadata = ?5, transcript = ?6,
         vibe_analysis = ?7, selected_vibe = ?8, style = ?9, saved_at = ?10 WHERE id = ?1",
        (
            &project.id,
            &project.name,
            &project.video_path,
            Utc::now().to_rfc3339(),
            json_column(&project.metadata),
            json_column(&project.transcript),
            json_column(&project.vibe_analysis),
            project.selected_vibe.map(|v| v.as_str().to_string()),
            json_column(&project.style),
            &project.saved_at,
        ),
    )?;

    if updated == 0 {
        return Err(format!("No project with id: {}", project.id).into());
    }
    Ok(())
}

// "Save Project": a snapshot stamp, not a separate copy of the row.
pub fn save_project(id: &str) -> Result<Project, Box<dyn std::error::Error>> {
    let mut project = get_project(id)?;
    project.saved_at = Some(Utc::now().to_rfc3339());
    update_project(&project)?;
    get_project(id)
}

pub fn delete_project(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let project = get_project(id)?;

    let conn = db::get_connection()?;
    conn.execute("DELETE FROM jobs WHERE project_id = ?1", [id])?;
    conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;

    // Only files that live under our data dir go with the project.
    let data_dir = db::get_data_dir();
    let video_path = Path::new(&project.video_path);
    if video_path.starts_with(&data_dir) && video_path.exists() {
        std::fs::remove_file(video_path).ok();
    }

    let exports_dir = db::exports_dir();
    if exports_dir.exists() {
        for entry in std::fs::read_dir(&exports_dir)?.flatten() {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with(&format!("{}_", project.id)) {
                std::fs::remove_file(entry.path()).ok();
            }
        }
    }

    Ok(())
}

pub fn set_selected_vibe(
    id: &str,
    vibe: Option<Vibe>,
) -> Result<Project, Box<dyn std::error::Error>> {
    let mut project = get_project(id)?;
    project.selected_vibe = vibe;
    update_project(&project)?;
    get_project(id)
}

pub fn set_style(
    id: &str,
    style: StyleSettings,
) -> Result<StyleSettings, Box<dyn std::error::Error>> {
    let mut project = get_project(id)?;
    project.style = Some(style.clone());
    update_project(&project)?;
    Ok(style)
}

// Selection override wins, then the detected vibe, then the configured default.
pub fn effective_vibe(project: &Project, cfg: &VveConfig) -> Vibe {
    if let Some(vibe) = project.selected_vibe {
        return vibe;
    }
    if let Some(analysis) = &project.vibe_analysis {
        return analysis.vibe;
    }
    cfg.default_vibe.parse().unwrap_or(Vibe::Professional)
}

pub fn sanitize_upload_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '.')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("_")
        .chars()
        .take(80)
        .collect()
}

// Register every video file under a directory as a project. Metadata probing
// is the slow part so it runs across the rayon pool first.
pub fn scan_directory(
    dir: &str,
    filter: Option<&str>,
) -> Result<Vec<Project>, Box<dyn std::error::Error>> {
    let dir_path = Path::new(dir);
    if !dir_path.is_dir() {
        return Err(format!("Not a directory: {}", dir).into());
    }

    let glob = match filter {
        Some(pattern) => Some(Glob::new(pattern)?.compile_matcher()),
        None => None,
    };

    let video_extensions = get_video_extensions();
    let existing: Vec<String> = list_projects()?
        .into_iter()
        .map(|p| p.video_path)
        .collect();

    let mut candidates: Vec<String> = WalkDir::new(dir_path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| video_extensions.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .filter(|entry| {
            glob.as_ref()
                .map(|m| m.is_match(entry.path()))
                .unwrap_or(true)
        })
        .map(|entry| entry.path().to_string_lossy().to_string())
        .filter(|path| !existing.contains(path))
        .collect();
    candidates.sort();

    let cfg = load_config_or_default();
    let probed: Vec<(String, VideoMetadata)> = candidates
        .par_iter()
        .map(|path| (path.clone(), metadata::probe(Path::new(path), &cfg)))
        .collect();

    let mut projects = Vec::new();
    for (path, video_metadata) in probed {
        let now = Utc::now().to_rfc3339();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: Path::new(&path)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "untitled".to_string()),
            video_path: path,
            created_at: now.clone(),
            updated_at: now,
            metadata: Some(video_metadata),
            transcript: None,
            vibe_analysis: None,
            selected_vibe: None,
            style: None,
            saved_at: None,
        };
        insert_project(&project)?;
        projects.push(project);
    }

    Ok(projects)
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub path: String,
}

#[derive(rocket::FromForm)]
pub struct UploadForm<'r> {
    pub file: TempFile<'r>,
}

#[derive(Serialize)]
pub struct VibeStatus {
    pub detected: Option<VibeAnalysis>,
    pub selected: Option<Vibe>,
    pub effective: Vibe,
}

#[derive(Deserialize)]
pub struct SelectVibeRequest {
    pub vibe: String,
}

#[post("/api/projects", data = "<request>")]
pub fn web_create_project(
    _auth: AuthGuard,
    request: Json<CreateProjectRequest>,
) -> Json<ApiResponse<Project>> {
    match create_project(&request.path) {
        Ok(project) => Json(ApiResponse::success(project)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to create project: {}",
            e
        ))),
    }
}

#[post("/api/projects/upload", data = "<form>")]
pub async fn web_upload_project(
    _auth: AuthGuard,
    mut form: Form<UploadForm<'_>>,
) -> Json<ApiResponse<Project>> {
    let raw_name = form
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_else(|| "upload.mp4".to_string());
    let file_name = sanitize_upload_name(&raw_name);

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    if !get_upload_extensions().contains(&extension.as_str()) {
        return Json(ApiResponse::error(format!(
            "Unsupported video format: {}",
            extension
        )));
    }

    let uploads_dir = db::uploads_dir();
    if let Err(e) = std::fs::create_dir_all(&uploads_dir) {
        return Json(ApiResponse::error(format!(
            "Failed to create uploads directory: {}",
            e
        )));
    }

    let target = uploads_dir.join(format!("{}_{}", Uuid::new_v4(), file_name));
    if let Err(e) = form.file.persist_to(&target).await {
        return Json(ApiResponse::error(format!("Failed to save upload: {}", e)));
    }

    let cfg = load_config_or_default();
    let now = Utc::now().to_rfc3339();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string()),
        video_path: target.to_string_lossy().to_string(),
        created_at: now.clone(),
        updated_at: now,
        metadata: Some(metadata::probe(&target, &cfg)),
        transcript: None,
        vibe_analysis: None,
        selected_vibe: None,
        style: None,
        saved_at: None,
    };

    match insert_project(&project) {
        Ok(()) => Json(ApiResponse::success(project)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to create project: {}",
            e
        ))),
    }
}

#[get("/api/projects")]
pub fn web_list_projects(_auth: AuthGuard) -> Json<ApiResponse<Vec<Project>>> {
    match list_projects() {
        Ok(projects) => Json(ApiResponse::success(projects)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to list projects: {}",
            e
        ))),
    }
}

#[get("/api/projects/<id>")]
pub fn web_get_project(_auth: AuthGuard, id: String) -> Json<ApiResponse<Project>> {
    match get_project(&id) {
        Ok(project) => Json(ApiResponse::success(project)),
        Err(e) => Json(ApiResponse::error(format!("Failed to get project: {}", e))),
    }
}

#[delete("/api/projects/<id>")]
pub fn web_delete_project(_auth: AuthGuard, id: String) -> Json<ApiResponse<String>> {
    match delete_project(&id) {
        Ok(()) => Json(ApiResponse::success(format!("Deleted project {}", id))),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to delete project: {}",
            e
        ))),
    }
}

#[post("/api/projects/<id>/save")]
pub fn web_save_project(_auth: AuthGuard, id: String) -> Json<ApiResponse<Project>> {
    match save_project(&id) {
        Ok(project) => Json(ApiResponse::success(project)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to save project: {}",
            e
        ))),
    }
}

#[get("/api/projects/<id>/vibe")]
pub fn web_get_vibe(_auth: AuthGuard, id: String) -> Json<ApiResponse<VibeStatus>> {
    match get_project(&id) {
        Ok(project) => {
            let cfg = load_config_or_default();
            Json(ApiResponse::success(VibeStatus {
                effective: effective_vibe(&project, &cfg),
                detected: project.vibe_analysis,
                selected: project.selected_vibe,
            }))
        }
        Err(e) => Json(ApiResponse::error(format!("Failed to get project: {}", e))),
    }
}

#[post("/api/projects/<id>/vibe", data = "<request>")]
pub fn web_select_vibe(
    _auth: AuthGuard,
    id: String,
    request: Json<SelectVibeRequest>,
) -> Json<ApiResponse<VibeStatus>> {
    let vibe = match request.vibe.parse::<Vibe>() {
        Ok(vibe) => vibe,
        Err(e) => return Json(ApiResponse::error(e)),
    };

    match set_selected_vibe(&id, Some(vibe)) {
        Ok(project) => {
            let cfg = load_config_or_default();
            Json(ApiResponse::success(VibeStatus {
                effective: effective_vibe(&project, &cfg),
                detected: project.vibe_analysis,
                selected: project.selected_vibe,
            }))
        }
        Err(e) => Json(ApiResponse::error(format!("Failed to select vibe: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_video_file_missing() {
        let result = validate_video_file(Path::new("/nonexistent.mp4"), &get_video_extensions());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("File does not exist")
        );
    }

    #[test]
    fn test_validate_video_file_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not a video").unwrap();

        let result = validate_video_file(&path, &get_video_extensions());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unsupported video format: txt")
        );
    }

    #[test]
    fn test_validate_video_file_accepts_mkv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.MKV");
        std::fs::write(&path, "fake").unwrap();

        assert!(validate_video_file(&path, &get_video_extensions()).is_ok());
    }

    #[test]
    fn test_sanitize_upload_name() {
        assert_eq!(
            sanitize_upload_name("my demo video!.mp4"),
            "my_demo_video.mp4"
        );
        assert_eq!(sanitize_upload_name("a/b\\c.mov"), "abc.mov");
    }

    #[test]
    fn test_sanitize_upload_name_truncates() {
        let long_name = format!("{}.mp4", "a".repeat(200));
        assert_eq!(sanitize_upload_name(&long_name).len(), 80);
    }

    #[test]
    fn test_effective_vibe_precedence() {
        let cfg = VveConfig {
            default_vibe: "calm".to_string(),
            ..Default::default()
        };
        let mut project = Project {
            id: "p".to_string(),
            name: "p".to_string(),
            video_path: "/tmp/p.mp4".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            metadata: None,
            transcript: None,
            vibe_analysis: None,
            selected_vibe: None,
            style: None,
            saved_at: None,
        };

        // nothing detected or selected: config default
        assert_eq!(effective_vibe(&project, &cfg), Vibe::Calm);

        project.vibe_analysis = Some(crate::vibes::classify("a funny hilarious comedy"));
        assert_eq!(effective_vibe(&project, &cfg), Vibe::Fun);

        project.selected_vibe = Some(Vibe::Dramatic);
        assert_eq!(effective_vibe(&project, &cfg), Vibe::Dramatic);
    }

    #[test]
    fn test_effective_vibe_auto_default_falls_back_to_professional() {
        let cfg = VveConfig::default();
        let project = Project {
            id: "p".to_string(),
            name: "p".to_string(),
            video_path: "/tmp/p.mp4".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            metadata: None,
            transcript: None,
            vibe_analysis: None,
            selected_vibe: None,
            style: None,
            saved_at: None,
        };
        assert_eq!(effective_vibe(&project, &cfg), Vibe::Professional);
    }
}
