// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::config::VveConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration: f64,
    pub frame_count: u64,
    pub has_audio: bool,
    pub audio_sample_rate: u32,
    pub resolution: String,
    pub aspect_ratio: f64,
    pub source: String,
}

// Stand-in numbers for when ffprobe isn't configured or fails.
pub fn mock_metadata() -> VideoMetadata {
    VideoMetadata {
        width: 1920,
        height: 1080,
        fps: 30.0,
        duration: 60.0,
        frame_count: 1800,
        has_audio: true,
        audio_sample_rate: 44100,
        resolution: "1920x1080".to_string(),
        aspect_ratio: 1920.0 / 1080.0,
        source: "mock".to_string(),
    }
}

pub fn probe(video_path: &Path, cfg: &VveConfig) -> VideoMetadata {
    if cfg.ffprobe_path.is_empty() {
        return mock_metadata();
    }

    match probe_with_ffprobe(video_path, Path::new(&cfg.ffprobe_path)) {
        Ok(metadata) => metadata,
        Err(e) => {
            eprintln!(
                "ffprobe failed for {}, using mock metadata: {}",
                video_path.display(),
                e
            );
            mock_metadata()
        }
    }
}

pub fn probe_with_ffprobe(
    video_path: &Path,
    ffprobe_path: &Path,
) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
    let (width, height, fps, frames) = probe_video_stream(video_path, ffprobe_path)?;
    let duration = probe_duration(video_path, ffprobe_path)?;
    let (has_audio, audio_sample_rate) = probe_audio_stream(video_path, ffprobe_path)?;

    Ok(VideoMetadata {
        width,
        height,
        fps,
        duration,
        frame_count: frames.unwrap_or_else(|| (duration * fps).round() as u64),
        has_audio,
        audio_sample_rate,
        resolution: format!("{}x{}", width, height),
        aspect_ratio: width as f64 / height as f64,
        source: "ffprobe".to_string(),
    })
}

fn probe_video_stream(
    video_path: &Path,
    ffprobe_path: &Path,
) -> Result<(u32, u32, f64, Option<u64>), Box<dyn std::error::Error>> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,r_frame_rate,nb_frames",
            "-of", "csv=p=0",
        ])
        .arg(video_path)
        .output()?;

    if !output.status.success() {
        let error_output = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffprobe failed: {}", error_output).into());
    }

    let line = String::from_utf8(output.stdout)?.trim().to_string();
    parse_video_stream_line(&line)
}

fn parse_video_stream_line(
    line: &str,
) -> Result<(u32, u32, f64, Option<u64>), Box<dyn std::error::Error>> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        return Err(format!("Unexpected ffprobe stream output: {}", line).into());
    }

    let width: u32 = parts[0].parse()?;
    let height: u32 = parts[1].parse()?;
    let fps = parse_fps_fraction(parts[2])?;
    // nb_frames is "N/A" for streams without the count in the header
    let frames = parts.get(3).and_then(|raw| raw.trim().parse().ok());
    Ok((width, height, fps, frames))
}

// r_frame_rate comes back as a fraction like "30/1" or "2997/100"
fn parse_fps_fraction(fps_str: &str) -> Result<f64, Box<dyn std::error::Error>> {
    if fps_str.contains('/') {
        let parts: Vec<&str> = fps_str.split('/').collect();
        if parts.len() == 2 {
            let numerator: f64 = parts[0].parse()?;
            let denominator: f64 = parts[1].parse()?;
            if denominator != 0.0 {
                return Ok(numerator / denominator);
            }
        }
    }

    fps_str
        .parse::<f64>()
        .map_err(|_| format!("Invalid frame rate format: {}", fps_str).into())
}

fn probe_duration(
    video_path: &Path,
    ffprobe_path: &Path,
) -> Result<f64, Box<dyn std::error::Error>> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v", "error",
            "-show_entries", "format=duration",
            "-of", "csv=p=0",
        ])
        .arg(video_path)
        .output()?;

    if !output.status.success() {
        let error_output = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffprobe failed: {}", error_output).into());
    }

    let duration_str = String::from_utf8(output.stdout)?.trim().to_string();
    Ok(duration_str.parse()?)
}

fn probe_audio_stream(
    video_path: &Path,
    ffprobe_path: &Path,
) -> Result<(bool, u32), Box<dyn std::error::Error>> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v", "error",
            "-select_streams", "a:0",
            "-show_entries", "stream=sample_rate",
            "-of", "csv=p=0",
        ])
        .arg(video_path)
        .output()?;

    if !output.status.success() {
        let error_output = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffprobe failed: {}", error_output).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let sample_rate_str = stdout.trim();
    if sample_rate_str.is_empty() {
        return Ok((false, 0));
    }

    Ok((true, sample_rate_str.parse().unwrap_or(44100)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fps_fraction_whole() {
        assert_eq!(parse_fps_fraction("30/1").unwrap(), 30.0);
    }

    #[test]
    fn test_parse_fps_fraction_ntsc() {
        assert_eq!(parse_fps_fraction("2997/100").unwrap(), 29.97);
    }

    #[test]
    fn test_parse_fps_plain_number() {
        assert_eq!(parse_fps_fraction("24").unwrap(), 24.0);
    }

    #[test]
    fn test_parse_fps_invalid() {
        let result = parse_fps_fraction("not-a-rate");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid frame rate format")
        );
    }

    #[test]
    fn test_parse_video_stream_line() {
        let (width, height, fps, frames) = parse_video_stream_line("1280,720,30000/1001").unwrap();
        assert_eq!(width, 1280);
        assert_eq!(height, 720);
        assert!((fps - 29.97).abs() < 0.01);
        assert_eq!(frames, None);
    }

    #[test]
    fn test_parse_video_stream_line_with_frame_count() {
        let (_, _, _, frames) = parse_video_stream_line("1920,1080,30/1,5400").unwrap();
        assert_eq!(frames, Some(5400));
    }

    #[test]
    fn test_parse_video_stream_line_na_frame_count() {
        let (_, _, _, frames) = parse_video_stream_line("1920,1080,30/1,N/A").unwrap();
        assert_eq!(frames, None);
    }

    #[test]
    fn test_parse_video_stream_line_too_short() {
        let result = parse_video_stream_line("1280,720");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unexpected ffprobe stream output")
        );
    }

    #[test]
    fn test_mock_metadata_shape() {
        let metadata = mock_metadata();
        assert_eq!(metadata.resolution, "1920x1080");
        assert_eq!(metadata.frame_count, 1800);
        assert_eq!(metadata.source, "mock");
        assert!(metadata.has_audio);
        assert!((metadata.aspect_ratio - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_probe_falls_back_to_mock_without_ffprobe() {
        let cfg = VveConfig {
            ffprobe_path: String::new(),
            ..Default::default()
        };
        let metadata = probe(Path::new("/nonexistent/video.mp4"), &cfg);
        assert_eq!(metadata.source, "mock");
        assert_eq!(metadata.width, 1920);
    }
}
