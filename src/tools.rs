// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{VveConfig, load_config_or_default, store_config};
use crate::web::ApiResponse;
use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;

pub const TOOL_NAMES: &[&str] = &["ffmpeg", "ffprobe", "whisper-cli"];

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub configured_path: Option<String>,
    pub system_available: bool,
    pub system_path: Option<String>,
    pub active: bool,
}

fn configured_path(cfg: &VveConfig, tool: &str) -> String {
    match tool {
        "ffmpeg" => cfg.ffmpeg_path.clone(),
        "ffprobe" => cfg.ffprobe_path.clone(),
        "whisper-cli" => cfg.whispercli_path.clone(),
        _ => String::new(),
    }
}

fn set_configured_path(cfg: &mut VveConfig, tool: &str, path: String) -> Result<(), String> {
    match tool {
        "ffmpeg" => cfg.ffmpeg_path = path,
        "ffprobe" => cfg.ffprobe_path = path,
        "whisper-cli" => cfg.whispercli_path = path,
        other => return Err(format!("Unknown tool: {}", other)),
    }
    Ok(())
}

pub fn tool_info(cfg: &VveConfig, tool: &str) -> ToolInfo {
    let configured = configured_path(cfg, tool);
    let system_path = which::which(tool)
        .ok()
        .map(|p| p.to_string_lossy().to_string());

    ToolInfo {
        name: tool.to_string(),
        configured_path: if configured.is_empty() {
            None
        } else {
            Some(configured.clone())
        },
        system_available: system_path.is_some(),
        system_path,
        active: !configured.is_empty() && std::path::Path::new(&configured).exists(),
    }
}

pub fn list_tools() -> Vec<ToolInfo> {
    let cfg = load_config_or_default();
    TOOL_NAMES
        .iter()
        .map(|tool| tool_info(&cfg, tool))
        .collect()
}

// Point the config at whatever the PATH lookup finds for this tool.
pub fn use_system_tool(tool: &str) -> Result<String, Box<dyn std::error::Error>> {
    if !TOOL_NAMES.contains(&tool) {
        return Err(format!(
            "Unknown tool: {} (expected one of: {})",
            tool,
            TOOL_NAMES.join(", ")
        )
        .into());
    }

    let found = which::which(tool)
        .map_err(|_| format!("{} not found on PATH", tool))?;
    let path = found.to_string_lossy().to_string();

    let mut cfg = load_config_or_default();
    set_configured_path(&mut cfg, tool, path.clone())?;
    store_config(&cfg)?;

    Ok(path)
}

#[get("/api/tools/list")]
pub fn web_list_tools(_auth: AuthGuard) -> Json<ApiResponse<Vec<ToolInfo>>> {
    Json(ApiResponse::success(list_tools()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_info_unconfigured() {
        let cfg = VveConfig::default();
        let info = tool_info(&cfg, "ffmpeg");
        assert_eq!(info.name, "ffmpeg");
        assert!(info.configured_path.is_none());
        assert!(!info.active);
    }

    #[test]
    fn test_tool_info_configured_missing_file_is_inactive() {
        let cfg = VveConfig {
            ffmpeg_path: "/nonexistent/ffmpeg".to_string(),
            ..Default::default()
        };
        let info = tool_info(&cfg, "ffmpeg");
        assert_eq!(info.configured_path.as_deref(), Some("/nonexistent/ffmpeg"));
        assert!(!info.active);
    }

    #[test]
    fn test_tool_info_active_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffprobe");
        std::fs::write(&fake, "").unwrap();

        let cfg = VveConfig {
            ffprobe_path: fake.to_string_lossy().to_string(),
            ..Default::default()
        };
        assert!(tool_info(&cfg, "ffprobe").active);
    }

    #[test]
    fn test_use_system_tool_unknown_name() {
        let err = use_system_tool("imagemagick").unwrap_err().to_string();
        assert!(err.contains("Unknown tool: imagemagick"));
    }
}
