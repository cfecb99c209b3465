// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{load_config_or_default, store_config};
use crate::db;
use crate::web::ApiResponse;
use indicatif::{ProgressBar, ProgressStyle};
use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    pub name: &'static str,
    pub file_name: &'static str,
    pub size_mb: u64,
}

// Whisper ggml checkpoints hosted on Hugging Face. "large" is large-v3 on
// disk; the short name is what goes in the config.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        name: "tiny",
        file_name: "ggml-tiny.bin",
        size_mb: 75,
    },
    ModelSpec {
        name: "base",
        file_name: "ggml-base.bin",
        size_mb: 142,
    },
    ModelSpec {
        name: "small",
        file_name: "ggml-small.bin",
        size_mb: 466,
    },
    ModelSpec {
        name: "medium",
        file_name: "ggml-medium.bin",
        size_mb: 1500,
    },
    ModelSpec {
        name: "large",
        file_name: "ggml-large-v3.bin",
        size_mb: 2900,
    },
];

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub fn find_model(name: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.name == name)
}

pub fn model_path(name: &str) -> std::path::PathBuf {
    let file_name = find_model(name)
        .map(|m| m.file_name.to_string())
        .unwrap_or_else(|| format!("ggml-{}.bin", name));
    db::models_dir().join(file_name)
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub file_name: String,
    pub size_mb: u64,
    pub downloaded: bool,
    pub current: bool,
}

pub fn list_models() -> Vec<ModelStatus> {
    let cfg = load_config_or_default();
    MODELS
        .iter()
        .map(|spec| ModelStatus {
            name: spec.name.to_string(),
            file_name: spec.file_name.to_string(),
            size_mb: spec.size_mb,
            downloaded: model_path(spec.name).exists(),
            current: cfg.model_name == spec.name,
        })
        .collect()
}

// Streams the checkpoint to disk with a progress bar, prints its SHA-256,
// and makes it the configured model.
pub fn download_model(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let spec = find_model(name).ok_or_else(|| {
        format!(
            "Unknown model: {} (expected one of: {})",
            name,
            MODELS
                .iter()
                .map(|m| m.name)
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let target = model_path(spec.name);
    if target.exists() {
        println!("Model {} already downloaded at {}", spec.name, target.display());
        return make_current(spec.name);
    }

    let models_dir = db::models_dir();
    std::fs::create_dir_all(&models_dir)?;

    let url = format!("{}/{}", MODEL_BASE_URL, spec.file_name);
    println!("Downloading {} from {}", spec.file_name, url);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(3600))
        .build()?;
    let mut response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(format!("Download failed with status: {}", response.status()).into());
    }

    let total_size = response.content_length().unwrap_or(spec.size_mb * 1024 * 1024);
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let partial = target.with_extension("partial");
    let mut file = std::fs::File::create(&partial)?;
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 8192];

    loop {
        let read = response.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])?;
        hasher.update(&buffer[..read]);
        downloaded += read as u64;
        pb.set_position(downloaded.min(total_size));
    }
    file.flush()?;
    drop(file);
    pb.finish_with_message("done");

    std::fs::rename(&partial, &target)?;
    println!("SHA-256: {:x}", hasher.finalize());
    println!("Saved to {}", target.display());

    make_current(spec.name)
}

fn make_current(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = load_config_or_default();
    if cfg.model_name != name {
        cfg.model_name = name.to_string();
        store_config(&cfg)?;
        println!("Set model_name = {}", name);
    }
    Ok(())
}

#[get("/api/models/list")]
pub fn web_list_models(_auth: AuthGuard) -> Json<ApiResponse<Vec<ModelStatus>>> {
    Json(ApiResponse::success(list_models()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testenv::with_temp_store;

    #[test]
    fn test_catalog_names() {
        let names: Vec<&str> = MODELS.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["tiny", "base", "small", "medium", "large"]);
    }

    #[test]
    fn test_large_maps_to_v3_file() {
        assert_eq!(find_model("large").unwrap().file_name, "ggml-large-v3.bin");
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = download_model("enormous").unwrap_err().to_string();
        assert!(err.contains("Unknown model: enormous"));
    }

    #[test]
    fn test_list_models_reports_downloaded() {
        with_temp_store(|| {
            let models_dir = db::models_dir();
            std::fs::create_dir_all(&models_dir).unwrap();
            std::fs::write(models_dir.join("ggml-tiny.bin"), "stub").unwrap();

            let statuses = list_models();
            let tiny = statuses.iter().find(|m| m.name == "tiny").unwrap();
            assert!(tiny.downloaded);
            let base = statuses.iter().find(|m| m.name == "base").unwrap();
            assert!(!base.downloaded);
            assert!(base.current);
        });
    }
}
