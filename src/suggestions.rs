// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::config::load_config_or_default;
use crate::projects;
use crate::transcripts::{self, Segment, SpeakerChange};
use crate::vibes::{self, Vibe};
use crate::web::ApiResponse;
use rand::seq::SliceRandom;
use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize)]
pub struct MusicSuggestion {
    pub style: &'static str,
    pub tracks: [&'static str; 2],
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectsSuggestion {
    pub transitions: &'static [&'static str],
    pub filters: &'static [&'static str],
    pub pace: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleSuggestions {
    pub music: MusicSuggestion,
    pub effects: EffectsSuggestion,
    pub colors: [&'static str; 3],
    pub typography: &'static str,
}

// Curated entries exist for three vibes, the rest borrow the professional set.
pub fn for_vibe(vibe: Vibe) -> StyleSuggestions {
    match vibe {
        Vibe::Energetic => StyleSuggestions {
            music: MusicSuggestion {
                style: "Upbeat electronic",
                tracks: ["Electronic Beat 1", "Rock Anthem"],
                volume: 0.4,
            },
            effects: EffectsSuggestion {
                transitions: &["quick cut", "zoom"],
                filters: &["high contrast"],
                pace: "fast",
            },
            colors: ["#ff6b35", "#f7931e", "#ffcb47"],
            typography: "Bold, modern sans-serif",
        },
        Vibe::Calm => StyleSuggestions {
            music: MusicSuggestion {
                style: "Ambient peaceful",
                tracks: ["Nature Sounds", "Gentle Piano"],
                volume: 0.2,
            },
            effects: EffectsSuggestion {
                transitions: &["fade", "dissolve"],
                filters: &["soft glow"],
                pace: "slow",
            },
            colors: ["#6b73ff", "#9b59b6", "#3498db"],
            typography: "Soft, rounded fonts",
        },
        _ => StyleSuggestions {
            music: MusicSuggestion {
                style: "Corporate minimal",
                tracks: ["Business Theme", "Corporate Success"],
                volume: 0.2,
            },
            effects: EffectsSuggestion {
                transitions: &["clean cut"],
                filters: &["professional grade"],
                pace: "medium",
            },
            colors: ["#2c3e50", "#34495e", "#1abc9c"],
            typography: "Clean, professional serif",
        },
    }
}

pub fn music_style_line(vibe: Vibe) -> String {
    let style = match vibe {
        Vibe::Energetic => "Upbeat electronic music, rock anthems, or high-energy pop tracks",
        Vibe::Calm => "Ambient music, soft piano, nature sounds, or meditative tracks",
        Vibe::Professional => "Corporate background music, minimal electronic, or sophisticated jazz",
        Vibe::Fun => "Pop music, upbeat indie, comedy music, or playful electronic beats",
        Vibe::Dramatic => "Cinematic orchestral music, emotional piano, or dramatic film scores",
        Vibe::Minimalist => "Minimal techno, ambient soundscapes, or simple acoustic guitar",
    };
    format!("Recommended music style for {} vibe: {}", vibe, style)
}

pub fn visual_effects_line(vibe: Vibe) -> String {
    let effects = match vibe {
        Vibe::Energetic => "Quick cuts, zoom transitions, high contrast, vibrant colors, motion blur effects",
        Vibe::Calm => "Slow fades, gentle transitions, soft lighting, cool color grading, minimal effects",
        Vibe::Professional => "Clean cuts, corporate templates, neutral color grading, subtle transitions",
        Vibe::Fun => "Playful transitions, bright colors, creative overlays, animated elements, bounce effects",
        Vibe::Dramatic => "Slow motion, dramatic lighting, high contrast, cinematic color grading, fade to black",
        Vibe::Minimalist => "Simple cuts, clean typography, monochrome effects, geometric shapes, negative space",
    };
    format!("Visual effects for {} vibe: {}", vibe, effects)
}

const EDITING_TIPS: &[&str] = &[
    "Consider removing filler words (um, uh, like) for cleaner audio",
    "Add subtitles for better accessibility and engagement",
    "Create thumbnail from the most engaging moment",
    "Add intro/outro sections with branding",
    "Include call-to-action overlays at key moments",
    "Consider adding B-roll footage to illustrate key points",
    "Normalize audio levels for consistent volume",
    "Add chapter markers for longer content",
];

pub fn editing_tips() -> Vec<String> {
    let mut rng = rand::thread_rng();
    EDITING_TIPS
        .choose_multiple(&mut rng, 3)
        .map(|tip| tip.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptImprovement {
    pub kind: String,
    pub segment_index: usize,
    pub original: String,
    pub suggested: String,
    pub reason: String,
}

pub fn transcript_improvements(segments: &[Segment]) -> Vec<TranscriptImprovement> {
    let mut improvements = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        let text = &segment.text;

        if transcripts::contains_filler_words(text) {
            improvements.push(TranscriptImprovement {
                kind: "filler".to_string(),
                segment_index: index,
                original: text.clone(),
                suggested: transcripts::remove_filler_words(text),
                reason: "Remove filler words for clarity".to_string(),
            });
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() && !trimmed.ends_with(['.', '!', '?']) {
            improvements.push(TranscriptImprovement {
                kind: "grammar".to_string(),
                segment_index: index,
                original: text.clone(),
                suggested: format!("{}.", trimmed),
                reason: "Add proper punctuation".to_string(),
            });
        }
    }

    improvements.truncate(5);
    improvements
}

#[derive(Serialize)]
pub struct VibeSuggestions {
    pub vibe: Vibe,
    pub style: StyleSuggestions,
    pub music_note: String,
    pub effects_note: String,
    pub editing_tips: Vec<String>,
}

pub fn vibe_suggestions(vibe: Vibe) -> VibeSuggestions {
    VibeSuggestions {
        vibe,
        style: for_vibe(vibe),
        music_note: music_style_line(vibe),
        effects_note: visual_effects_line(vibe),
        editing_tips: editing_tips(),
    }
}

#[derive(Serialize)]
pub struct ProjectSuggestions {
    pub vibe: Vibe,
    pub style: StyleSuggestions,
    pub music_note: String,
    pub effects_note: String,
    pub editing_tips: Vec<String>,
    pub improvements: Vec<TranscriptImprovement>,
    pub key_moments: Vec<String>,
    pub speaker_changes: Vec<SpeakerChange>,
}

pub fn project_suggestions(
    project_id: &str,
) -> Result<ProjectSuggestions, Box<dyn std::error::Error>> {
    let project = projects::get_project(project_id)?;
    let cfg = load_config_or_default();
    let vibe = projects::effective_vibe(&project, &cfg);

    let (improvements, key_moments, speaker_changes) = match &project.transcript {
        Some(transcript) => {
            // LLM suggestions when a key is configured, heuristics otherwise.
            let improvements = if crate::llm::is_configured(&cfg) {
                crate::llm::suggest_improvements(&transcript.segments, &cfg).unwrap_or_else(|e| {
                    println!("LLM improvement suggestions failed, using heuristics: {}", e);
                    transcript_improvements(&transcript.segments)
                })
            } else {
                transcript_improvements(&transcript.segments)
            };
            (
                improvements,
                vibes::identify_key_moments(&transcript.full_text()),
                transcripts::detect_speaker_changes(&transcript.segments),
            )
        }
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    Ok(ProjectSuggestions {
        vibe,
        style: for_vibe(vibe),
        music_note: music_style_line(vibe),
        effects_note: visual_effects_line(vibe),
        editing_tips: editing_tips(),
        improvements,
        key_moments,
        speaker_changes,
    })
}

#[get("/api/vibes/<name>/suggestions")]
pub fn web_vibe_suggestions(_auth: AuthGuard, name: String) -> Json<ApiResponse<VibeSuggestions>> {
    match Vibe::from_str(&name) {
        Ok(vibe) => Json(ApiResponse::success(vibe_suggestions(vibe))),
        Err(e) => Json(ApiResponse::error(e)),
    }
}

#[get("/api/projects/<id>/suggestions")]
pub fn web_project_suggestions(
    _auth: AuthGuard,
    id: String,
) -> Json<ApiResponse<ProjectSuggestions>> {
    match project_suggestions(&id) {
        Ok(suggestions) => Json(ApiResponse::success(suggestions)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to build suggestions: {}",
            e
        ))),
    }
}
