// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::load_config_or_default;
use crate::projects;
use crate::vibes::Vibe;
use crate::web::ApiResponse;
use image::RgbImage;
use rocket::serde::{Deserialize, json::Json};
use rocket::{get, post};
use serde::Serialize;

pub const MUSIC_TRACKS: &[&str] = &["Track 1", "Track 2", "Track 3", "Custom Upload"];
pub const RESOLUTIONS: &[&str] = &["720p", "1080p", "4K"];
pub const EXPORT_FORMATS: &[&str] = &["mp4", "mov", "avi", "webm"];

fn default_music_volume() -> u32 {
    20
}

fn default_music_track() -> String {
    "Track 1".to_string()
}

fn default_transition_speed() -> f64 {
    1.0
}

fn default_accent_color() -> String {
    Vibe::Professional.profile().color.to_string()
}

fn default_resolution() -> String {
    "1080p".to_string()
}

fn default_quality() -> u32 {
    8
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSettings {
    #[serde(default = "default_music_volume")]
    pub music_volume: u32,
    #[serde(default = "default_music_track")]
    pub music_track: String,
    #[serde(default = "default_transition_speed")]
    pub transition_speed: f64,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_quality")]
    pub quality: u32,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub add_subtitles: bool,
    #[serde(default)]
    pub remove_silence: bool,
    #[serde(default = "default_true")]
    pub normalize_audio: bool,
}

impl Default for StyleSettings {
    fn default() -> Self {
        StyleSettings {
            music_volume: default_music_volume(),
            music_track: default_music_track(),
            transition_speed: default_transition_speed(),
            accent_color: default_accent_color(),
            resolution: default_resolution(),
            quality: default_quality(),
            format: default_format(),
            add_subtitles: true,
            remove_silence: false,
            normalize_audio: true,
        }
    }
}

impl StyleSettings {
    pub fn default_for_vibe(vibe: Vibe) -> Self {
        StyleSettings {
            accent_color: vibe.profile().color.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.music_volume > 100 {
            return Err("music_volume must be between 0 and 100".into());
        }
        if !(0.5..=3.0).contains(&self.transition_speed) {
            return Err("transition_speed must be between 0.5 and 3.0".into());
        }
        if !MUSIC_TRACKS.contains(&self.music_track.as_str()) {
            return Err(format!(
                "music_track must be one of: {}",
                MUSIC_TRACKS.join(", ")
            )
            .into());
        }
        parse_hex_color(&self.accent_color)?;
        if !RESOLUTIONS.contains(&self.resolution.as_str()) {
            return Err(format!(
                "resolution must be one of: {}",
                RESOLUTIONS.join(", ")
            )
            .into());
        }
        if !(1..=10).contains(&self.quality) {
            return Err("quality must be between 1 and 10".into());
        }
        if !EXPORT_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(format!(
                "format must be one of: {}",
                EXPORT_FORMATS.join(", ")
            )
            .into());
        }
        Ok(())
    }
}

pub fn parse_hex_color(hex: &str) -> Result<[u8; 3], Box<dyn std::error::Error>> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| format!("Invalid hex color: {}", hex))?;
    if digits.len() != 6 {
        return Err(format!("Invalid hex color: {}", hex).into());
    }

    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| format!("Invalid hex color: {}", hex))
    };
    Ok([parse(0..2)?, parse(2..4)?, parse(4..6)?])
}

// Per-pixel grade: channel multipliers then a flat contrast multiply,
// clamped back into u8 range.
pub fn apply_color_grading(image: &mut RgbImage, vibe: Vibe) {
    let config = vibe.style_config();
    for pixel in image.pixels_mut() {
        for (channel, multiplier) in pixel.0.iter_mut().zip(config.color_multipliers) {
            let graded = *channel as f32 * multiplier * config.contrast;
            *channel = graded.clamp(0.0, 255.0) as u8;
        }
    }
}

#[get("/api/projects/<id>/style")]
pub fn web_get_style(_auth: AuthGuard, id: String) -> Json<ApiResponse<StyleSettings>> {
    match projects::get_project(&id) {
        Ok(project) => {
            let style = project.style.clone().unwrap_or_else(|| {
                let cfg = load_config_or_default();
                StyleSettings::default_for_vibe(projects::effective_vibe(&project, &cfg))
            });
            Json(ApiResponse::success(style))
        }
        Err(e) => Json(ApiResponse::error(format!("Failed to get project: {}", e))),
    }
}

#[post("/api/projects/<id>/style", data = "<request>")]
pub fn web_set_style(
    _auth: AuthGuard,
    id: String,
    request: Json<StyleSettings>,
) -> Json<ApiResponse<StyleSettings>> {
    let settings = request.into_inner();
    if let Err(e) = settings.validate() {
        return Json(ApiResponse::error(format!("Invalid style settings: {}", e)));
    }

    match projects::set_style(&id, settings) {
        Ok(style) => Json(ApiResponse::success(style)),
        Err(e) => Json(ApiResponse::error(format!("Failed to save style: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = StyleSettings::default();
        assert_eq!(settings.music_volume, 20);
        assert_eq!(settings.music_track, "Track 1");
        assert_eq!(settings.transition_speed, 1.0);
        assert_eq!(settings.resolution, "1080p");
        assert_eq!(settings.quality, 8);
        assert_eq!(settings.format, "mp4");
        assert!(settings.add_subtitles);
        assert!(!settings.remove_silence);
        assert!(settings.normalize_audio);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_for_vibe_sets_accent_color() {
        let settings = StyleSettings::default_for_vibe(Vibe::Calm);
        assert_eq!(settings.accent_color, "#6b73ff");
        assert_eq!(settings.music_volume, 20);
    }

    #[test]
    fn test_validate_rejects_out_of_range_volume() {
        let settings = StyleSettings {
            music_volume: 150,
            ..Default::default()
        };
        let result = settings.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("music_volume must be between 0 and 100")
        );
    }

    #[test]
    fn test_validate_rejects_bad_transition_speed() {
        let settings = StyleSettings {
            transition_speed: 5.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_resolution() {
        let settings = StyleSettings {
            resolution: "480p".to_string(),
            ..Default::default()
        };
        let result = settings.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("resolution must be one of")
        );
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let settings = StyleSettings {
            format: "flv".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_uppercase_format() {
        let settings = StyleSettings {
            format: "MP4".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff6b35").unwrap(), [0xff, 0x6b, 0x35]);
        assert_eq!(parse_hex_color("#000000").unwrap(), [0, 0, 0]);
        assert!(parse_hex_color("ff6b35").is_err());
        assert!(parse_hex_color("#ff6b").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_apply_color_grading_professional() {
        // professional multipliers are 1.0 so only contrast (1.1) applies
        let mut image = RgbImage::from_pixel(2, 1, image::Rgb([100, 100, 100]));
        apply_color_grading(&mut image, Vibe::Professional);
        let pixel = image.get_pixel(0, 0);
        assert_eq!(pixel.0, [110, 110, 110]);
    }

    #[test]
    fn test_apply_color_grading_clamps() {
        let mut image = RgbImage::from_pixel(1, 1, image::Rgb([250, 10, 0]));
        apply_color_grading(&mut image, Vibe::Energetic);
        let pixel = image.get_pixel(0, 0);
        // red channel saturates, blue stays black
        assert_eq!(pixel.0[0], 255);
        assert_eq!(pixel.0[2], 0);
    }
}
