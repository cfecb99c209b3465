// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::{self, VveConfig, load_config_or_default};
use crate::projects::{self, Project};
use crate::styling::{apply_color_grading, parse_hex_color};
use crate::vibes::Vibe;
use image::{ImageFormat, RgbImage};
use rocket::get;
use rocket::http::ContentType;
use std::io::Cursor;
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

// A point in the video, as users write it: plain seconds ("12.5"), a frame
// number ("300f"), or a timestamp ("1:05" / "00:01:05.500").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSpec {
    Seconds(f64),
    Frames(u64),
    Timestamp(f64),
}

impl TimeSpec {
    pub fn parse(input: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let input = input.trim();
        if input.is_empty() {
            return Err("Empty time value".into());
        }

        if let Some(frames) = input.strip_suffix('f') {
            let n: u64 = frames
                .parse()
                .map_err(|_| format!("Invalid frame number: {}", input))?;
            return Ok(TimeSpec::Frames(n));
        }

        if input.contains(':') {
            return Ok(TimeSpec::Timestamp(parse_timestamp(input)?));
        }

        let seconds: f64 = input
            .parse()
            .map_err(|_| format!("Invalid time value: {}", input))?;
        if seconds < 0.0 {
            return Err(format!("Time cannot be negative: {}", input).into());
        }
        Ok(TimeSpec::Seconds(seconds))
    }

    pub fn to_seconds(self, fps: f64) -> f64 {
        match self {
            TimeSpec::Seconds(s) | TimeSpec::Timestamp(s) => s,
            TimeSpec::Frames(n) => {
                if fps > 0.0 {
                    n as f64 / fps
                } else {
                    n as f64 / 30.0
                }
            }
        }
    }
}

// MM:SS, MM:SS.mmm, HH:MM:SS, or HH:MM:SS.mmm
fn parse_timestamp(input: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = input.split(':').collect();
    let (hours, minutes, seconds_part) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(format!("Invalid timestamp: {}", input).into()),
    };

    let hours: f64 = hours
        .parse()
        .map_err(|_| format!("Invalid timestamp: {}", input))?;
    let minutes: f64 = minutes
        .parse()
        .map_err(|_| format!("Invalid timestamp: {}", input))?;
    let seconds: f64 = seconds_part
        .parse()
        .map_err(|_| format!("Invalid timestamp: {}", input))?;

    if minutes >= 60.0 || seconds >= 60.0 || hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return Err(format!("Invalid timestamp: {}", input).into());
    }

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

// Grab one frame, vibe-graded, as encoded PNG bytes. When ffmpeg isn't
// around (or fails) the preview is a synthetic placeholder so the UI always
// has something to show.
pub fn preview_frame(
    project: &Project,
    time: TimeSpec,
    vibe: Vibe,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let cfg = load_config_or_default();
    let fps = project
        .metadata
        .as_ref()
        .map(|m| m.fps)
        .unwrap_or(30.0);
    let seconds = time.to_seconds(fps);

    let mut frame = match grab_frame(&project.video_path, seconds, &cfg) {
        Some(frame) => frame,
        None => placeholder_frame(vibe, seconds),
    };
    apply_color_grading(&mut frame, vibe);

    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(frame).write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

fn grab_frame(video_path: &str, seconds: f64, cfg: &VveConfig) -> Option<RgbImage> {
    if !config::tools_configured(cfg) || !Path::new(video_path).exists() {
        return None;
    }

    let png_path = std::env::temp_dir().join(format!("vve_frame_{}.png", Uuid::new_v4()));
    let result = Command::new(&cfg.ffmpeg_path)
        .args(["-y", "-ss", &format!("{:.3}", seconds), "-i", video_path])
        .args(["-vframes", "1"])
        .arg(&png_path)
        .output();

    let frame = match result {
        Ok(output) if output.status.success() && png_path.exists() => image::open(&png_path)
            .ok()
            .map(|img| img.to_rgb8()),
        Ok(output) => {
            println!(
                "ffmpeg frame grab failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            println!("could not run ffmpeg: {}", e);
            None
        }
    };

    std::fs::remove_file(&png_path).ok();
    frame
}

// 320x180 card in the vibe's accent color with a horizontal brightness ramp.
// Deterministic for a given vibe and time so previews are cacheable.
pub fn placeholder_frame(vibe: Vibe, seconds: f64) -> RgbImage {
    let accent = parse_hex_color(vibe.profile().color).unwrap_or([64, 64, 64]);
    let phase = (seconds.max(0.0) % 10.0) / 10.0;

    RgbImage::from_fn(320, 180, |x, _y| {
        let ramp = 0.35 + 0.65 * ((x as f64 / 320.0 + phase) % 1.0);
        image::Rgb([
            (accent[0] as f64 * ramp) as u8,
            (accent[1] as f64 * ramp) as u8,
            (accent[2] as f64 * ramp) as u8,
        ])
    })
}

#[get("/api/projects/<id>/preview?<time>")]
pub fn web_preview_frame(
    _auth: AuthGuard,
    id: String,
    time: Option<String>,
) -> Result<(ContentType, Vec<u8>), rocket::response::status::NotFound<String>> {
    let project = projects::get_project(&id)
        .map_err(|e| rocket::response::status::NotFound(format!("Failed to get project: {}", e)))?;

    let spec = match time.as_deref() {
        Some(raw) => TimeSpec::parse(raw)
            .map_err(|e| rocket::response::status::NotFound(e.to_string()))?,
        None => TimeSpec::Seconds(0.0),
    };

    let cfg = load_config_or_default();
    let vibe = projects::effective_vibe(&project, &cfg);
    let bytes = preview_frame(&project, spec, vibe)
        .map_err(|e| rocket::response::status::NotFound(format!("Preview failed: {}", e)))?;

    Ok((ContentType::PNG, bytes))
}
