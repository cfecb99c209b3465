// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{self, VveConfig, load_config_or_default};
use crate::jobs::{self, Job};
use crate::metadata;
use crate::projects;
use crate::transcripts::{self, Transcript};
use crate::vibes::{self, VibeAnalysis};
use crate::web::ApiResponse;
use crate::{llm, models};
use rocket::post;
use rocket::serde::json::Json;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

// Pipeline checkpoints reported to the job row, in order.
pub const STAGES: &[(&str, i64, &str)] = &[
    ("extracting_audio", 20, "Extracting audio..."),
    ("transcribing", 50, "Generating transcript with Whisper..."),
    ("detecting_vibe", 80, "Analyzing content vibe..."),
    ("done", 100, "Analysis complete"),
];

fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        std::thread::sleep(std::time::Duration::from_millis(delay_ms));
    }
}

fn cancelled(job_id: i64) -> Result<bool, Box<dyn std::error::Error>> {
    if jobs::is_cancel_requested(job_id) {
        jobs::mark_cancelled(job_id)?;
        return Ok(true);
    }
    Ok(false)
}

// Full analysis pipeline for one project. Runs on the blocking pool (or
// inline from the CLI); every stage falls back to canned data when the
// external tools aren't available, so the pipeline always produces a result.
pub fn run_analysis(
    job_id: i64,
    project_id: &str,
    delay_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config_or_default();
    let mut project = projects::get_project(project_id)?;

    let (stage, percent, message) = STAGES[0];
    jobs::update_progress(job_id, stage, percent, message)?;
    project.metadata = Some(metadata::probe(Path::new(&project.video_path), &cfg));
    let audio = extract_audio(&project.video_path, &cfg);
    pause(delay_ms);
    if cancelled(job_id)? {
        cleanup_audio(&audio);
        return Ok(());
    }

    let (stage, percent, message) = STAGES[1];
    jobs::update_progress(job_id, stage, percent, message)?;
    let mut transcript = match &audio {
        Some(wav) => transcribe(wav, &cfg).unwrap_or_else(|e| {
            println!("whisper failed, using canned transcript: {}", e);
            transcripts::mock_transcript()
        }),
        None => transcripts::mock_transcript(),
    };
    cleanup_audio(&audio);
    if cfg.auto_remove_fillers {
        for segment in &mut transcript.segments {
            segment.text = transcripts::remove_filler_words(&segment.text);
        }
        transcript.segments.retain(|s| !s.text.is_empty());
    }
    pause(delay_ms);
    if cancelled(job_id)? {
        return Ok(());
    }

    let (stage, percent, message) = STAGES[2];
    jobs::update_progress(job_id, stage, percent, message)?;
    let analysis = detect_vibe(&transcript, &cfg);
    pause(delay_ms);
    if cancelled(job_id)? {
        return Ok(());
    }

    project.transcript = Some(transcript);
    project.vibe_analysis = Some(analysis);
    projects::update_project(&project)?;

    let (_, _, message) = STAGES[3];
    jobs::finish_job(job_id, None, message)?;
    Ok(())
}

// Whisper wants mono 16kHz wav input.
fn extract_audio(video_path: &str, cfg: &VveConfig) -> Option<PathBuf> {
    if !config::tools_configured(cfg) {
        return None;
    }

    let wav_path = std::env::temp_dir().join(format!("vve_audio_{}.wav", Uuid::new_v4()));
    let result = Command::new(&cfg.ffmpeg_path)
        .args([
            "-y",
            "-i",
            video_path,
            "-map",
            "0:a:0",
            "-q:a",
            "0",
            "-ac",
            "1",
            "-ar",
            "16000",
        ])
        .arg(&wav_path)
        .output();

    match result {
        Ok(output) if output.status.success() && wav_path.exists() => Some(wav_path),
        Ok(output) => {
            println!(
                "ffmpeg audio extraction failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            println!("could not run ffmpeg: {}", e);
            None
        }
    }
}

fn cleanup_audio(audio: &Option<PathBuf>) {
    if let Some(path) = audio {
        std::fs::remove_file(path).ok();
        let mut vtt = path.clone().into_os_string();
        vtt.push(".vtt");
        std::fs::remove_file(PathBuf::from(vtt)).ok();
    }
}

fn transcribe(wav_path: &Path, cfg: &VveConfig) -> Result<Transcript, Box<dyn std::error::Error>> {
    let model_path = models::model_path(&cfg.model_name);
    if !model_path.exists() {
        return Err(format!(
            "Model {} not downloaded (expected at {})",
            cfg.model_name,
            model_path.display()
        )
        .into());
    }

    let output = Command::new(&cfg.whispercli_path)
        .arg("-m")
        .arg(&model_path)
        .args(["-np", "--max-context", "0", "-ovtt", "-f"])
        .arg(wav_path)
        .output()?;

    if !output.status.success() {
        return Err(format!(
            "whisper-cli failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }

    // whisper-cli writes <input>.vtt next to the input file
    let mut vtt_path = wav_path.as_os_str().to_os_string();
    vtt_path.push(".vtt");
    let content = std::fs::read_to_string(PathBuf::from(vtt_path))?;

    let segments = transcripts::parse_vtt_content(&content);
    if segments.is_empty() {
        return Err("whisper produced an empty transcript".into());
    }

    Ok(Transcript {
        segments,
        source: "whisper".to_string(),
    })
}

// LLM when a key is configured, keyword classifier otherwise (and as the
// fallback when the LLM call fails).
fn detect_vibe(transcript: &Transcript, cfg: &VveConfig) -> VibeAnalysis {
    let text = transcript.full_text();
    if llm::is_configured(cfg) {
        match llm::classify_vibe(&text, cfg) {
            Ok(analysis) => return analysis,
            Err(e) => println!("LLM vibe detection failed, using keywords: {}", e),
        }
    }
    vibes::classify(&text)
}

#[post("/api/projects/<id>/analyze")]
pub fn web_analyze_project(_auth: AuthGuard, id: String) -> Json<ApiResponse<Job>> {
    if let Err(e) = projects::get_project(&id) {
        return Json(ApiResponse::error(format!("Failed to get project: {}", e)));
    }

    match jobs::create_job(&id, jobs::KIND_ANALYSIS) {
        Ok(job) => Json(ApiResponse::success(job)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to queue analysis: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testenv::with_temp_store;

    fn make_project(dir: &Path) -> projects::Project {
        let video = dir.join("demo.mp4");
        std::fs::write(&video, "fake video bytes").unwrap();
        projects::create_project(video.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_stage_table_percentages() {
        let percents: Vec<i64> = STAGES.iter().map(|(_, p, _)| *p).collect();
        assert_eq!(percents, vec![20, 50, 80, 100]);
        assert_eq!(STAGES[1].2, "Generating transcript with Whisper...");
    }

    #[test]
    fn test_run_analysis_mock_pipeline() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let project = make_project(dir.path());
            let job = jobs::create_job(&project.id, jobs::KIND_ANALYSIS).unwrap();
            jobs::mark_running(job.id).unwrap();

            run_analysis(job.id, &project.id, 0).unwrap();

            let done = jobs::get_job(job.id).unwrap();
            assert_eq!(done.status, jobs::STATUS_COMPLETED);
            assert_eq!(done.message, "Analysis complete");

            let analyzed = projects::get_project(&project.id).unwrap();
            let transcript = analyzed.transcript.unwrap();
            assert_eq!(transcript.source, "mock");
            assert_eq!(transcript.segments.len(), 4);

            let analysis = analyzed.vibe_analysis.unwrap();
            assert_eq!(analysis.source, "keywords");
            assert!(analysis.confidence >= 0.5 && analysis.confidence <= 0.9);
        });
    }

    #[test]
    fn test_run_analysis_honors_cancel_marker() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let project = make_project(dir.path());
            let job = jobs::create_job(&project.id, jobs::KIND_ANALYSIS).unwrap();
            jobs::mark_running(job.id).unwrap();
            jobs::request_cancel(job.id).unwrap();

            run_analysis(job.id, &project.id, 0).unwrap();

            let cancelled = jobs::get_job(job.id).unwrap();
            assert_eq!(cancelled.status, jobs::STATUS_CANCELLED);
            assert!(
                projects::get_project(&project.id)
                    .unwrap()
                    .transcript
                    .is_none()
            );
        });
    }
}
