// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::config::VveConfig;
use crate::suggestions::TranscriptImprovement;
use crate::vibes::{Vibe, VibeAnalysis};
use regex::Regex;
use serde_json::json;
use std::time::Duration;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 30;

// Long transcripts get truncated before they hit the prompt.
const MAX_TRANSCRIPT_CHARS: usize = 2000;

const VIBE_SYSTEM_PROMPT: &str = r#"You are an expert video content analyzer. Analyze the provided transcript and determine the overall vibe/mood.

Available vibes:
- energetic: High energy, fast-paced, exciting
- calm: Peaceful, relaxing, meditative
- professional: Business, corporate, formal
- fun: Entertainment, comedy, playful
- dramatic: Emotional, storytelling, intense
- minimalist: Clean, simple, understated

Provide analysis in JSON format:
{
    "vibe": "detected_vibe",
    "confidence": 0.85,
    "reasoning": "Brief explanation",
    "keywords": ["key", "words", "found"],
    "suggestions": ["Suggestion 1", "Suggestion 2"]
}"#;

const IMPROVEMENT_SYSTEM_PROMPT: &str = r#"You are an expert transcript editor. Review the provided transcript segments and suggest up to 5 concrete edits.

Respond with a JSON array of objects:
[
    {
        "kind": "filler|grammar|clarity",
        "segment_index": 0,
        "original": "the segment text as given",
        "suggested": "the improved text",
        "reason": "Brief explanation"
    }
]

Only suggest edits that genuinely improve the transcript. Respond with [] if nothing needs changing."#;

pub fn is_configured(cfg: &VveConfig) -> bool {
    cfg.groq_api_key
        .as_deref()
        .map(|key| !key.is_empty())
        .unwrap_or(false)
}

pub fn classify_vibe(
    transcript_text: &str,
    cfg: &VveConfig,
) -> Result<VibeAnalysis, Box<dyn std::error::Error>> {
    let api_key = cfg
        .groq_api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or("No Groq API key configured")?;

    let user_prompt = format!(
        "Analyze this transcript: {}",
        truncate_transcript(transcript_text)
    );
    let content = request_completion(api_key, &cfg.groq_model, VIBE_SYSTEM_PROMPT, &user_prompt)?;
    Ok(parse_vibe_response(&content))
}

pub fn suggest_improvements(
    segments: &[crate::transcripts::Segment],
    cfg: &VveConfig,
) -> Result<Vec<TranscriptImprovement>, Box<dyn std::error::Error>> {
    let api_key = cfg
        .groq_api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or("No Groq API key configured")?;

    let numbered = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| format!("[{}] {}", index, segment.text))
        .collect::<Vec<_>>()
        .join("\n");
    let user_prompt = format!(
        "Suggest edits for these segments:\n{}",
        truncate_transcript(&numbered)
    );

    let content = request_completion(
        api_key,
        &cfg.groq_model,
        IMPROVEMENT_SYSTEM_PROMPT,
        &user_prompt,
    )?;
    Ok(parse_improvements_response(&content, segments.len()))
}

fn parse_improvements_response(content: &str, segment_count: usize) -> Vec<TranscriptImprovement> {
    // Salvage the array even when the model wraps it in prose.
    let trimmed = content.trim();
    let sliced = match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(open), Some(close)) if open < close => &trimmed[open..=close],
        _ => trimmed,
    };

    let Ok(serde_json::Value::Array(items)) = serde_json::from_str(sliced) else {
        return Vec::new();
    };

    let mut improvements = Vec::new();
    for item in items {
        let Some(index) = item.get("segment_index").and_then(|v| v.as_u64()) else {
            continue;
        };
        if index as usize >= segment_count {
            continue;
        }
        let field = |name: &str| {
            item.get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let suggested = field("suggested");
        if suggested.is_empty() {
            continue;
        }
        improvements.push(TranscriptImprovement {
            kind: field("kind"),
            segment_index: index as usize,
            original: field("original"),
            suggested,
            reason: field("reason"),
        });
    }

    improvements.truncate(5);
    improvements
}

fn truncate_transcript(text: &str) -> String {
    text.chars().take(MAX_TRANSCRIPT_CHARS).collect()
}

fn request_completion(
    api_key: &str,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
        "temperature": 0.1,
        "max_tokens": 500,
    });

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let response = client
        .post(GROQ_API_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()?;

    let status = response.status();
    let response_text = response.text()?;
    if !status.is_success() {
        return Err(format!("Groq API returned {}: {}", status, response_text).into());
    }

    let payload: serde_json::Value = serde_json::from_str(&response_text)?;
    let content = payload["choices"][0]["message"]["content"]
        .as_str()
        .ok_or("Groq response has no message content")?;
    Ok(content.to_string())
}

// Models don't always honor the JSON instruction, so keep a text fallback.
fn parse_vibe_response(content: &str) -> VibeAnalysis {
    parse_json_response(content).unwrap_or_else(|| parse_text_response(content))
}

fn parse_json_response(content: &str) -> Option<VibeAnalysis> {
    let value: serde_json::Value = serde_json::from_str(content.trim()).ok()?;
    let vibe: Vibe = value.get("vibe")?.as_str()?.parse().ok()?;

    Some(VibeAnalysis {
        vibe,
        confidence: value
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.7),
        reasoning: value
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        keywords: string_array(value.get("keywords")),
        suggestions: string_array(value.get("suggestions")),
        source: "llm".to_string(),
    })
}

fn string_array(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_text_response(content: &str) -> VibeAnalysis {
    let confidence_regex = Regex::new(r"(0\.\d+|\d+%)").expect("valid regex");
    let mut vibe = Vibe::Professional;
    let mut confidence = 0.7;

    for line in content.lines() {
        let lower = line.to_lowercase();
        if lower.contains("vibe") {
            for candidate in Vibe::all() {
                if lower.contains(candidate.as_str()) {
                    vibe = candidate;
                    break;
                }
            }
        } else if lower.contains("confidence") {
            if let Some(caps) = confidence_regex.captures(&lower) {
                let matched = &caps[1];
                if let Some(percent) = matched.strip_suffix('%') {
                    if let Ok(v) = percent.parse::<f64>() {
                        confidence = v / 100.0;
                    }
                } else if let Ok(v) = matched.parse::<f64>() {
                    confidence = v;
                }
            }
        }
    }

    VibeAnalysis {
        vibe,
        confidence,
        reasoning: "Parsed from AI response".to_string(),
        keywords: Vec::new(),
        suggestions: Vec::new(),
        source: "llm".to_string(),
    }
}
