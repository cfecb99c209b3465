// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{self, VveConfig, load_config_or_default};
use crate::db;
use crate::jobs::{self, Job};
use crate::projects::{self, Project};
use crate::styling::StyleSettings;
use crate::transcripts::Segment;
use crate::vibes::Vibe;
use crate::web::ApiResponse;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::{get, post};
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

pub const STAGES: &[(&str, i64, &str)] = &[
    ("styling", 20, "Generating styled video..."),
    ("music", 40, "Adding background music..."),
    ("effects", 60, "Applying visual effects..."),
    ("subtitles", 80, "Adding subtitles..."),
    ("rendering", 100, "Exporting final video..."),
];

// Quality slider (1-10) to encoder bitrates. Requests between keys snap to
// the nearest one; exact midpoints snap down.
const QUALITY_BITRATES: &[(u32, &str, &str)] = &[
    (1, "500k", "64k"),
    (3, "1000k", "128k"),
    (5, "2000k", "192k"),
    (8, "5000k", "256k"),
    (10, "10000k", "320k"),
];

pub fn bitrates_for_quality(quality: u32) -> (&'static str, &'static str) {
    let mut best = QUALITY_BITRATES[0];
    let mut best_distance = u32::MAX;
    for entry in QUALITY_BITRATES {
        let distance = entry.0.abs_diff(quality);
        if distance < best_distance {
            best = *entry;
            best_distance = distance;
        }
    }
    (best.1, best.2)
}

fn resolution_dimensions(resolution: &str) -> (u32, u32) {
    match resolution {
        "720p" => (1280, 720),
        "4K" => (3840, 2160),
        _ => (1920, 1080),
    }
}

pub fn output_path(project: &Project, vibe: Vibe, format: &str) -> PathBuf {
    db::exports_dir().join(format!("{}_{}.{}", project.id, vibe.as_str(), format))
}

fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        std::thread::sleep(std::time::Duration::from_millis(delay_ms));
    }
}

// Styled export for one project. The middle stages are pacing checkpoints;
// the actual encode (or placeholder write) happens at the final stage so a
// cancel request never leaves a half-written file in exports/.
pub fn run_export(
    job_id: i64,
    project_id: &str,
    delay_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config_or_default();
    let project = projects::get_project(project_id)?;
    let vibe = projects::effective_vibe(&project, &cfg);
    let style = project
        .style
        .clone()
        .unwrap_or_else(|| StyleSettings::default_for_vibe(vibe));
    style.validate()?;

    for (stage, percent, message) in &STAGES[..STAGES.len() - 1] {
        jobs::update_progress(job_id, stage, *percent, message)?;
        pause(delay_ms);
        if jobs::is_cancel_requested(job_id) {
            jobs::mark_cancelled(job_id)?;
            return Ok(());
        }
    }

    let (stage, percent, message) = STAGES[STAGES.len() - 1];
    jobs::update_progress(job_id, stage, percent, message)?;

    let exports_dir = db::exports_dir();
    std::fs::create_dir_all(&exports_dir)?;
    let target = output_path(&project, vibe, &style.format);

    let encoded = if config::tools_configured(&cfg) && Path::new(&project.video_path).exists() {
        match encode_with_ffmpeg(&project, &style, vibe, &target, &cfg) {
            Ok(()) => true,
            Err(e) => {
                println!("ffmpeg export failed, writing placeholder: {}", e);
                false
            }
        }
    } else {
        false
    };

    if !encoded {
        write_placeholder(&project, &target)?;
    }

    jobs::finish_job(
        job_id,
        Some(&target.to_string_lossy()),
        "Export complete",
    )?;
    Ok(())
}

fn encode_with_ffmpeg(
    project: &Project,
    style: &StyleSettings,
    vibe: Vibe,
    target: &Path,
    cfg: &VveConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (video_bitrate, audio_bitrate) = bitrates_for_quality(style.quality);
    let (width, height) = resolution_dimensions(&style.resolution);

    let mut filters = vec![format!("scale={}:{}", width, height)];

    // Burned-in subtitles need the transcript rendered to a temp SRT file.
    let mut srt_path: Option<PathBuf> = None;
    if style.add_subtitles {
        if let Some(transcript) = &project.transcript {
            if !transcript.segments.is_empty() {
                let path =
                    std::env::temp_dir().join(format!("vve_subs_{}.srt", Uuid::new_v4()));
                std::fs::write(&path, render_srt(&transcript.segments))?;
                filters.push(format!(
                    "subtitles={}:force_style='{}'",
                    path.to_string_lossy(),
                    subtitle_force_style(vibe)
                ));
                srt_path = Some(path);
            }
        }
    }

    let result = Command::new(&cfg.ffmpeg_path)
        .args(["-y", "-i", &project.video_path])
        .args(["-vf", &filters.join(",")])
        .args(["-c:v", "libx264", "-b:v", video_bitrate])
        .args(["-c:a", "aac", "-b:a", audio_bitrate])
        .arg(target)
        .output();

    if let Some(path) = srt_path {
        std::fs::remove_file(path).ok();
    }

    let output = result?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).to_string().into());
    }
    if !target.exists() {
        return Err("ffmpeg reported success but produced no file".into());
    }
    Ok(())
}

// Stand-in export when the real encoder isn't available: the source bytes
// under the export name, or a stub when even the source is gone.
fn write_placeholder(project: &Project, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = Path::new(&project.video_path);
    if source.exists() {
        std::fs::copy(source, target)?;
    } else {
        std::fs::write(target, format!("vve export placeholder for {}\n", project.id))?;
    }
    Ok(())
}

pub fn render_srt(segments: &[Segment]) -> String {
    let mut srt = String::new();
    for (index, segment) in segments.iter().enumerate() {
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            srt_timestamp(segment.start),
            srt_timestamp(segment.end),
            segment.text
        ));
    }
    srt
}

fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let s = (total_ms / 1000) % 60;
    let m = (total_ms / 60_000) % 60;
    let h = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

// libass force_style string; ASS colours are &HBBGGRR&.
fn subtitle_force_style(vibe: Vibe) -> String {
    let style = vibe.subtitle_style();
    format!(
        "FontName={},FontSize={},PrimaryColour={},OutlineColour={},Outline={}",
        style.font,
        style.font_size,
        ass_color(style.color),
        ass_color(style.stroke_color),
        style.stroke_width
    )
}

fn ass_color(color: &str) -> String {
    // subtitle styles use CSS colour names, accent colours come as hex
    let rgb = match color {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "yellow" => [255, 255, 0],
        "red" => [255, 0, 0],
        "darkred" => [139, 0, 0],
        "lightblue" => [173, 216, 230],
        "navy" => [0, 0, 128],
        "magenta" => [255, 0, 255],
        "gray" => [128, 128, 128],
        other => crate::styling::parse_hex_color(other).unwrap_or([255, 255, 255]),
    };
    format!("&H{:02X}{:02X}{:02X}&", rgb[2], rgb[1], rgb[0])
}

#[post("/api/projects/<id>/export")]
pub fn web_export_project(_auth: AuthGuard, id: String) -> Json<ApiResponse<Job>> {
    if let Err(e) = projects::get_project(&id) {
        return Json(ApiResponse::error(format!("Failed to get project: {}", e)));
    }

    match jobs::create_job(&id, jobs::KIND_EXPORT) {
        Ok(job) => Json(ApiResponse::success(job)),
        Err(e) => Json(ApiResponse::error(format!("Failed to queue export: {}", e))),
    }
}

fn content_type_for(path: &Path) -> ContentType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => ContentType::MP4,
        Some("mov") => ContentType::new("video", "quicktime"),
        Some("avi") => ContentType::new("video", "x-msvideo"),
        Some("webm") => ContentType::new("video", "webm"),
        _ => ContentType::Binary,
    }
}

#[get("/api/projects/<id>/export/download")]
pub fn web_download_export(
    _auth: AuthGuard,
    id: String,
) -> Result<(ContentType, Vec<u8>), rocket::response::status::NotFound<String>> {
    let completed = jobs::list_jobs_for_project(&id)
        .map_err(|e| rocket::response::status::NotFound(e.to_string()))?
        .into_iter()
        .find(|job| job.kind == jobs::KIND_EXPORT && job.status == jobs::STATUS_COMPLETED);

    let Some(job) = completed else {
        return Err(rocket::response::status::NotFound(format!(
            "No completed export for project {}",
            id
        )));
    };

    let path = job
        .output_path
        .map(PathBuf::from)
        .ok_or_else(|| rocket::response::status::NotFound("Export has no output file".to_string()))?;

    let bytes = std::fs::read(&path).map_err(|e| {
        rocket::response::status::NotFound(format!("Failed to read export: {}", e))
    })?;

    Ok((content_type_for(&path), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testenv::with_temp_store;

    #[test]
    fn test_bitrates_exact_keys() {
        assert_eq!(bitrates_for_quality(1), ("500k", "64k"));
        assert_eq!(bitrates_for_quality(5), ("2000k", "192k"));
        assert_eq!(bitrates_for_quality(10), ("10000k", "320k"));
    }

    #[test]
    fn test_bitrates_snap_to_nearest() {
        assert_eq!(bitrates_for_quality(2), ("500k", "64k")); // midpoint snaps down
        assert_eq!(bitrates_for_quality(4), ("1000k", "128k")); // midpoint snaps down
        assert_eq!(bitrates_for_quality(6), ("2000k", "192k"));
        assert_eq!(bitrates_for_quality(7), ("5000k", "256k"));
        assert_eq!(bitrates_for_quality(9), ("5000k", "256k")); // midpoint snaps down
    }

    #[test]
    fn test_srt_rendering() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 5.2,
                text: "Hello there.".to_string(),
                confidence: 0.9,
            },
            Segment {
                start: 65.5,
                end: 70.0,
                text: "Second line.".to_string(),
                confidence: 0.9,
            },
        ];
        let srt = render_srt(&segments);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:05,200\nHello there.\n"));
        assert!(srt.contains("2\n00:01:05,500 --> 00:01:10,000\nSecond line.\n"));
    }

    #[test]
    fn test_ass_color_swaps_channels() {
        assert_eq!(ass_color("#ff6b35"), "&H356BFF&");
        assert_eq!(ass_color("not-a-color"), "&HFFFFFF&");
    }

    #[test]
    fn test_run_export_writes_placeholder() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("demo.mp4");
            std::fs::write(&video, "fake video bytes").unwrap();
            let project = projects::create_project(video.to_str().unwrap()).unwrap();

            let job = jobs::create_job(&project.id, jobs::KIND_EXPORT).unwrap();
            jobs::mark_running(job.id).unwrap();
            run_export(job.id, &project.id, 0).unwrap();

            let done = jobs::get_job(job.id).unwrap();
            assert_eq!(done.status, jobs::STATUS_COMPLETED);

            let output = PathBuf::from(done.output_path.unwrap());
            assert!(output.exists());
            // default style, no analysis or override: professional mp4
            assert!(
                output
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .ends_with("_professional.mp4")
            );
            assert_eq!(std::fs::read(&output).unwrap(), b"fake video bytes");
        });
    }

    #[test]
    fn test_run_export_cancelled_before_render() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("demo.mp4");
            std::fs::write(&video, "fake video bytes").unwrap();
            let project = projects::create_project(video.to_str().unwrap()).unwrap();

            let job = jobs::create_job(&project.id, jobs::KIND_EXPORT).unwrap();
            jobs::mark_running(job.id).unwrap();
            jobs::request_cancel(job.id).unwrap();
            run_export(job.id, &project.id, 0).unwrap();

            assert_eq!(jobs::get_job(job.id).unwrap().status, jobs::STATUS_CANCELLED);
            assert!(!db::exports_dir().exists());
        });
    }
}
