// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::web::ApiResponse;
use rocket::serde::json::Json;
use rocket::{get, post};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MASKED_VALUE: &str = "********";

fn default_true() -> bool {
    true
}

fn default_model_name() -> String {
    "base".to_string()
}

fn default_groq_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_vibe() -> String {
    "auto".to_string()
}

fn default_video_quality() -> u32 {
    720
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_export_format() -> String {
    "mp4".to_string()
}

fn default_export_quality() -> u32 {
    8
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VveConfig {
    #[serde(default)]
    pub ffmpeg_path: String,
    #[serde(default)]
    pub ffprobe_path: String,
    #[serde(default)]
    pub whispercli_path: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    pub groq_api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_vibe")]
    pub default_vibe: String,
    #[serde(default = "default_true")]
    pub auto_remove_fillers: bool,
    #[serde(default = "default_video_quality")]
    pub video_quality: u32,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: u32,
    #[serde(default = "default_export_format")]
    pub export_format: String,
    #[serde(default = "default_export_quality")]
    pub export_quality: u32,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub config: VveConfig,
    pub is_complete: bool,
}

impl Default for VveConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: String::new(),
            ffprobe_path: String::new(),
            whispercli_path: String::new(),
            model_name: default_model_name(),
            groq_api_key: None,
            groq_model: default_groq_model(),
            default_vibe: default_vibe(),
            auto_remove_fillers: true,
            video_quality: default_video_quality(),
            audio_bitrate: default_audio_bitrate(),
            export_format: default_export_format(),
            export_quality: default_export_quality(),
            password: None,
        }
    }
}

pub fn load_config() -> Result<VveConfig, confy::ConfyError> {
    if let Ok(config_path) = std::env::var("VVE_CONFIG_PATH") {
        confy::load_path(&config_path)
    } else {
        confy::load("vve", "config")
    }
}

pub fn load_config_or_default() -> VveConfig {
    load_config().unwrap_or_default()
}

pub fn store_config(config: &VveConfig) -> Result<(), confy::ConfyError> {
    if let Ok(config_path) = std::env::var("VVE_CONFIG_PATH") {
        confy::store_path(&config_path, config)
    } else {
        confy::store("vve", "config", config)
    }
}

pub fn get_config_file_path() -> Result<std::path::PathBuf, confy::ConfyError> {
    if let Ok(config_path) = std::env::var("VVE_CONFIG_PATH") {
        Ok(std::path::PathBuf::from(config_path))
    } else {
        confy::get_configuration_file_path("vve", "config")
    }
}

// Used to namespace PID files so instances pointed at different configs
// (like parallel test runs) don't trip over each other.
pub fn get_config_path_sha() -> String {
    let path = get_config_file_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "default".to_string());
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    format!("{:x}", hasher.finalize())[..8].to_string()
}

pub fn config_field_names() -> &'static [&'static str] {
    &[
        "ffmpeg_path",
        "ffprobe_path",
        "whispercli_path",
        "model_name",
        "groq_api_key",
        "groq_model",
        "default_vibe",
        "auto_remove_fillers",
        "video_quality",
        "audio_bitrate",
        "export_format",
        "export_quality",
        "password",
    ]
}

pub fn is_valid_config_field(field: &str) -> bool {
    config_field_names().contains(&field)
}

pub fn set_config_field(cfg: &mut VveConfig, field: &str, value: &str) -> Result<(), String> {
    match field {
        "ffmpeg_path" => cfg.ffmpeg_path = value.to_string(),
        "ffprobe_path" => cfg.ffprobe_path = value.to_string(),
        "whispercli_path" => cfg.whispercli_path = value.to_string(),
        "model_name" => cfg.model_name = value.to_string(),
        "groq_api_key" => cfg.groq_api_key = Some(value.to_string()),
        "groq_model" => cfg.groq_model = value.to_string(),
        "default_vibe" => {
            if value != "auto" && value.parse::<crate::vibes::Vibe>().is_err() {
                return Err(format!(
                    "Invalid vibe '{}'. Valid values are: auto, {}",
                    value,
                    crate::vibes::Vibe::all()
                        .iter()
                        .map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            cfg.default_vibe = value.to_lowercase();
        }
        "auto_remove_fillers" => {
            cfg.auto_remove_fillers = value
                .parse::<bool>()
                .map_err(|_| format!("Invalid boolean value for auto_remove_fillers: {}", value))?;
        }
        "video_quality" => {
            let quality = value
                .parse::<u32>()
                .map_err(|_| format!("Invalid number value for video_quality: {}", value))?;
            if !(480..=1080).contains(&quality) {
                return Err(format!(
                    "video_quality must be between 480 and 1080, got {}",
                    quality
                ));
            }
            cfg.video_quality = quality;
        }
        "audio_bitrate" => {
            let bitrate = value
                .parse::<u32>()
                .map_err(|_| format!("Invalid number value for audio_bitrate: {}", value))?;
            if !(128..=320).contains(&bitrate) {
                return Err(format!(
                    "audio_bitrate must be between 128 and 320, got {}",
                    bitrate
                ));
            }
            cfg.audio_bitrate = bitrate;
        }
        "export_format" => {
            let format = value.to_lowercase();
            if !["mp4", "mov", "avi", "webm"].contains(&format.as_str()) {
                return Err(format!(
                    "Invalid export format '{}'. Valid formats are: mp4, mov, avi, webm",
                    value
                ));
            }
            cfg.export_format = format;
        }
        "export_quality" => {
            let quality = value
                .parse::<u32>()
                .map_err(|_| format!("Invalid number value for export_quality: {}", value))?;
            if !(1..=10).contains(&quality) {
                return Err(format!(
                    "export_quality must be between 1 and 10, got {}",
                    quality
                ));
            }
            cfg.export_quality = quality;
        }
        "password" => cfg.password = Some(value.to_string()),
        _ => return Err(format!("Unknown field: {}", field)),
    }
    Ok(())
}

pub fn unset_config_field(cfg: &mut VveConfig, field: &str) -> Result<(), String> {
    match field {
        "ffmpeg_path" => cfg.ffmpeg_path = String::new(),
        "ffprobe_path" => cfg.ffprobe_path = String::new(),
        "whispercli_path" => cfg.whispercli_path = String::new(),
        "model_name" => cfg.model_name = default_model_name(),
        "groq_api_key" => cfg.groq_api_key = None,
        "groq_model" => cfg.groq_model = default_groq_model(),
        "default_vibe" => cfg.default_vibe = default_vibe(),
        "auto_remove_fillers" => cfg.auto_remove_fillers = true,
        "video_quality" => cfg.video_quality = default_video_quality(),
        "audio_bitrate" => cfg.audio_bitrate = default_audio_bitrate(),
        "export_format" => cfg.export_format = default_export_format(),
        "export_quality" => cfg.export_quality = default_export_quality(),
        "password" => cfg.password = None,
        _ => return Err(format!("Unknown field: {}", field)),
    }
    Ok(())
}

// Real processing needs all three tools; everything else falls back to mock data.
pub fn tools_configured(cfg: &VveConfig) -> bool {
    !cfg.ffmpeg_path.is_empty()
        && !cfg.ffprobe_path.is_empty()
        && !cfg.whispercli_path.is_empty()
}

fn masked(cfg: &VveConfig) -> VveConfig {
    let mut masked = cfg.clone();
    if masked.groq_api_key.is_some() {
        masked.groq_api_key = Some(MASKED_VALUE.to_string());
    }
    if masked.password.is_some() {
        masked.password = Some(MASKED_VALUE.to_string());
    }
    masked
}

#[get("/api/config")]
pub fn web_get_config(_auth: AuthGuard) -> Json<ApiResponse<ConfigResponse>> {
    let config = load_config_or_default();
    let is_complete = tools_configured(&config);

    let response = ConfigResponse {
        config: masked(&config),
        is_complete,
    };

    Json(ApiResponse::success(response))
}

#[post("/api/config", data = "<config>")]
pub fn web_set_config(_auth: AuthGuard, config: Json<VveConfig>) -> Json<ApiResponse<String>> {
    let mut incoming = config.into_inner();

    // The GET endpoint masks secrets; a round-tripped mask must not clobber
    // the stored values.
    let current = load_config_or_default();
    if incoming.groq_api_key.as_deref() == Some(MASKED_VALUE) {
        incoming.groq_api_key = current.groq_api_key.clone();
    }
    if incoming.password.as_deref() == Some(MASKED_VALUE) {
        incoming.password = current.password.clone();
    }

    match store_config(&incoming) {
        Ok(()) => Json(ApiResponse::success(
            "Config updated successfully".to_string(),
        )),
        Err(e) => Json(ApiResponse::error(format!("Error saving config: {}", e))),
    }
}
