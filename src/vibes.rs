// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::web::ApiResponse;
use rocket::get;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Energetic,
    Calm,
    Professional,
    Fun,
    Dramatic,
    Minimalist,
}

#[derive(Debug, Clone, Serialize)]
pub struct VibeProfile {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub music_style: &'static str,
    pub editing_style: &'static str,
}

// Rendering hints applied when styling previews and exports. Multipliers are
// r/g/b channel scales, applied before the contrast scale.
#[derive(Debug, Clone, Serialize)]
pub struct VibeStyleConfig {
    pub color_multipliers: [f32; 3],
    pub contrast: f32,
    pub saturation: f32,
    pub speed_factor: f32,
    pub transition_style: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub color: &'static str,
    pub stroke_color: &'static str,
    pub stroke_width: u32,
    pub font: &'static str,
}

impl Vibe {
    pub fn all() -> [Vibe; 6] {
        [
            Vibe::Energetic,
            Vibe::Calm,
            Vibe::Professional,
            Vibe::Fun,
            Vibe::Dramatic,
            Vibe::Minimalist,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vibe::Energetic => "energetic",
            Vibe::Calm => "calm",
            Vibe::Professional => "professional",
            Vibe::Fun => "fun",
            Vibe::Dramatic => "dramatic",
            Vibe::Minimalist => "minimalist",
        }
    }

    pub fn profile(&self) -> VibeProfile {
        match self {
            Vibe::Energetic => VibeProfile {
                name: "energetic",
                color: "#ff6b35",
                description: "High energy, fast-paced content",
                music_style: "Upbeat, electronic, rock",
                editing_style: "Quick cuts, dynamic transitions",
            },
            Vibe::Calm => VibeProfile {
                name: "calm",
                color: "#6b73ff",
                description: "Peaceful, relaxing content",
                music_style: "Ambient, classical, nature sounds",
                editing_style: "Slow transitions, gentle fades",
            },
            Vibe::Professional => VibeProfile {
                name: "professional",
                color: "#2c3e50",
                description: "Business, corporate content",
                music_style: "Corporate, minimal, sophisticated",
                editing_style: "Clean cuts, corporate templates",
            },
            Vibe::Fun => VibeProfile {
                name: "fun",
                color: "#e91e63",
                description: "Entertainment, comedy content",
                music_style: "Pop, comedy, upbeat",
                editing_style: "Playful effects, colorful themes",
            },
            Vibe::Dramatic => VibeProfile {
                name: "dramatic",
                color: "#8e24aa",
                description: "Emotional, storytelling content",
                music_style: "Cinematic, orchestral, emotional",
                editing_style: "Dramatic lighting, slow motion",
            },
            Vibe::Minimalist => VibeProfile {
                name: "minimalist",
                color: "#263238",
                description: "Clean, simple design",
                music_style: "Minimal, ambient, subtle",
                editing_style: "Simple cuts, clean typography",
            },
        }
    }

    pub fn style_config(&self) -> VibeStyleConfig {
        match self {
            Vibe::Energetic => VibeStyleConfig {
                color_multipliers: [1.2, 1.1, 1.0],
                contrast: 1.3,
                saturation: 1.4,
                speed_factor: 1.1,
                transition_style: "quick_cut",
            },
            Vibe::Calm => VibeStyleConfig {
                color_multipliers: [0.9, 1.0, 1.2],
                contrast: 0.8,
                saturation: 0.9,
                speed_factor: 0.9,
                transition_style: "fade",
            },
            Vibe::Professional => VibeStyleConfig {
                color_multipliers: [1.0, 1.0, 1.0],
                contrast: 1.1,
                saturation: 0.95,
                speed_factor: 1.0,
                transition_style: "cut",
            },
            Vibe::Fun => VibeStyleConfig {
                color_multipliers: [1.3, 1.2, 1.1],
                contrast: 1.4,
                saturation: 1.5,
                speed_factor: 1.2,
                transition_style: "zoom",
            },
            Vibe::Dramatic => VibeStyleConfig {
                color_multipliers: [1.1, 0.9, 0.8],
                contrast: 1.5,
                saturation: 1.2,
                speed_factor: 0.8,
                transition_style: "fade",
            },
            Vibe::Minimalist => VibeStyleConfig {
                color_multipliers: [1.0, 1.0, 1.0],
                contrast: 0.9,
                saturation: 0.7,
                speed_factor: 1.0,
                transition_style: "simple_cut",
            },
        }
    }

    pub fn subtitle_style(&self) -> SubtitleStyle {
        match self {
            Vibe::Energetic => SubtitleStyle {
                font_size: 48,
                color: "yellow",
                stroke_color: "red",
                stroke_width: 3,
                font: "Arial-Bold",
            },
            Vibe::Calm => SubtitleStyle {
                font_size: 40,
                color: "lightblue",
                stroke_color: "navy",
                stroke_width: 2,
                font: "Arial",
            },
            Vibe::Professional => SubtitleStyle {
                font_size: 42,
                color: "white",
                stroke_color: "black",
                stroke_width: 2,
                font: "Arial",
            },
            Vibe::Fun => SubtitleStyle {
                font_size: 50,
                color: "magenta",
                stroke_color: "yellow",
                stroke_width: 3,
                font: "Comic Sans MS",
            },
            Vibe::Dramatic => SubtitleStyle {
                font_size: 44,
                color: "white",
                stroke_color: "darkred",
                stroke_width: 3,
                font: "Times New Roman",
            },
            Vibe::Minimalist => SubtitleStyle {
                font_size: 36,
                color: "white",
                stroke_color: "gray",
                stroke_width: 1,
                font: "Helvetica",
            },
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Vibe::Energetic => &[
                "amazing",
                "incredible",
                "exciting",
                "awesome",
                "fantastic",
                "energy",
            ],
            Vibe::Professional => &[
                "business",
                "corporate",
                "professional",
                "strategy",
                "solution",
            ],
            Vibe::Fun => &["fun", "funny", "hilarious", "entertaining", "comedy", "joke"],
            Vibe::Calm => &["peaceful", "relaxing", "calm", "meditation", "serene", "quiet"],
            Vibe::Dramatic => &["dramatic", "emotional", "intense", "powerful", "moving"],
            Vibe::Minimalist => &["simple", "clean", "minimal", "basic", "essential"],
        }
    }
}

impl FromStr for Vibe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energetic" => Ok(Vibe::Energetic),
            "calm" => Ok(Vibe::Calm),
            "professional" => Ok(Vibe::Professional),
            "fun" => Ok(Vibe::Fun),
            "dramatic" => Ok(Vibe::Dramatic),
            "minimalist" => Ok(Vibe::Minimalist),
            _ => Err(format!("Unknown vibe: {}", s)),
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibeAnalysis {
    pub vibe: Vibe,
    pub confidence: f64,
    pub reasoning: String,
    pub keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub source: String,
}

// Scan order breaks score ties: the first vibe with the top score wins.
const CLASSIFY_ORDER: [Vibe; 6] = [
    Vibe::Energetic,
    Vibe::Professional,
    Vibe::Fun,
    Vibe::Calm,
    Vibe::Dramatic,
    Vibe::Minimalist,
];

// Keyword-bag classifier, also the fallback when no LLM is configured.
// Scores are plain substring-containment counts against each vibe's list.
pub fn classify(text: &str) -> VibeAnalysis {
    let text_lower = text.to_lowercase();

    let mut best = Vibe::Professional;
    let mut best_score = 0usize;
    for vibe in CLASSIFY_ORDER {
        let score = vibe
            .keywords()
            .iter()
            .filter(|kw| text_lower.contains(*kw))
            .count();
        if score > best_score {
            best = vibe;
            best_score = score;
        }
    }

    let confidence = (0.15 * best_score as f64 + 0.5).min(0.9);
    let keywords: Vec<String> = best
        .keywords()
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    VibeAnalysis {
        vibe: best,
        confidence,
        reasoning: "Detected based on keyword analysis".to_string(),
        keywords,
        suggestions: vec![
            format!("Consider {} music style", best.as_str()),
            format!("Use {} visual effects", best.as_str()),
        ],
        source: "keywords".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
}

const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "great",
    "awesome",
    "fantastic",
    "excellent",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &["bad", "terrible", "awful", "horrible", "disappointing"];

pub fn analyze_sentiment(text: &str) -> SentimentResult {
    let text_lower = text.to_lowercase();

    let positive = POSITIVE_WORDS
        .iter()
        .filter(|w| text_lower.contains(*w))
        .count();
    let negative = NEGATIVE_WORDS
        .iter()
        .filter(|w| text_lower.contains(*w))
        .count();

    if positive > negative {
        SentimentResult {
            sentiment: Sentiment::Positive,
            confidence: (0.2 * positive as f64 + 0.5).min(0.9),
        }
    } else if negative > positive {
        SentimentResult {
            sentiment: Sentiment::Negative,
            confidence: (0.2 * negative as f64 + 0.5).min(0.9),
        }
    } else {
        SentimentResult {
            sentiment: Sentiment::Neutral,
            confidence: 0.6,
        }
    }
}

const KEY_MOMENT_PHRASES: &[&str] = &[
    "important",
    "key point",
    "remember",
    "crucial",
    "essential",
    "breakthrough",
    "discovery",
    "solution",
    "result",
    "conclusion",
];

pub fn identify_key_moments(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();

    let moments: Vec<String> = text_lower
        .split('.')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|sentence| KEY_MOMENT_PHRASES.iter().any(|p| sentence.contains(p)))
        .take(3)
        .enumerate()
        .map(|(i, sentence)| format!("Moment {}: {}", i + 1, sentence))
        .collect();

    if moments.is_empty() {
        vec![
            "Beginning of content".to_string(),
            "Main discussion".to_string(),
            "Conclusion".to_string(),
        ]
    } else {
        moments
    }
}

#[derive(Serialize)]
pub struct VibeCatalogEntry {
    pub profile: VibeProfile,
    pub style: VibeStyleConfig,
    pub subtitles: SubtitleStyle,
}

#[get("/api/vibes")]
pub fn web_get_vibes(_auth: AuthGuard) -> Json<ApiResponse<Vec<VibeCatalogEntry>>> {
    let catalog = Vibe::all()
        .iter()
        .map(|v| VibeCatalogEntry {
            profile: v.profile(),
            style: v.style_config(),
            subtitles: v.subtitle_style(),
        })
        .collect();
    Json(ApiResponse::success(catalog))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_energetic_keywords() {
        let result = classify("This is an amazing and incredible demo with so much energy");
        assert_eq!(result.vibe, Vibe::Energetic);
        assert!(result.keywords.contains(&"amazing".to_string()));
        assert!(result.keywords.contains(&"energy".to_string()));
        assert_eq!(result.source, "keywords");
    }

    #[test]
    fn test_classify_defaults_to_professional() {
        let result = classify("the weather outside tonight seems unremarkable");
        assert_eq!(result.vibe, Vibe::Professional);
        assert_eq!(result.confidence, 0.5);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_classify_tie_prefers_earlier_scan_order() {
        // One professional keyword, one calm keyword; professional is scanned first
        let result = classify("a calm business meeting");
        assert_eq!(result.vibe, Vibe::Professional);
    }

    #[test]
    fn test_classify_confidence_scales_with_matches() {
        let one = classify("that was funny");
        let three = classify("a funny, hilarious comedy");
        assert!(three.confidence > one.confidence);
        assert!(three.confidence <= 0.9);
    }

    #[test]
    fn test_classify_confidence_is_capped() {
        let result = classify("fun funny hilarious entertaining comedy joke");
        assert_eq!(result.vibe, Vibe::Fun);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_sentiment_positive() {
        let result = analyze_sentiment("What a great and wonderful day");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert!(result.confidence > 0.6);
    }

    #[test]
    fn test_sentiment_negative() {
        let result = analyze_sentiment("that was a terrible, awful show");
        assert_eq!(result.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_sentiment_neutral_on_tie() {
        let result = analyze_sentiment("an amazing start but a terrible ending");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_key_moments_extraction() {
        let text = "Welcome everyone. This is the most important discovery of the year. Nothing else here. The conclusion follows.";
        let moments = identify_key_moments(text);
        assert_eq!(moments.len(), 2);
        assert!(moments[0].starts_with("Moment 1:"));
        assert!(moments[0].contains("important"));
        assert!(moments[1].contains("conclusion"));
    }

    #[test]
    fn test_key_moments_fallback() {
        let moments = identify_key_moments("nothing notable here at all");
        assert_eq!(
            moments,
            vec![
                "Beginning of content".to_string(),
                "Main discussion".to_string(),
                "Conclusion".to_string()
            ]
        );
    }

    #[test]
    fn test_vibe_from_str_any_case() {
        assert_eq!("Energetic".parse::<Vibe>().unwrap(), Vibe::Energetic);
        assert_eq!("DRAMATIC".parse::<Vibe>().unwrap(), Vibe::Dramatic);
        assert!("upbeat".parse::<Vibe>().is_err());
    }

    #[test]
    fn test_vibe_serde_roundtrip() {
        let json = serde_json::to_string(&Vibe::Minimalist).unwrap();
        assert_eq!(json, "\"minimalist\"");
        let back: Vibe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Vibe::Minimalist);
    }
}
