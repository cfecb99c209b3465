use crate::auth::AuthGuard;
use crate::projects;
use crate::web::ApiResponse;
use regex::Regex;
use rocket::serde::{Deserialize, json::Json};
use rocket::{delete, get, post};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub source: String,
}

impl Transcript {
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// The canned transcript used whenever whisper isn't available or fails.
pub fn mock_transcript() -> Transcript {
    Transcript {
        segments: vec![
            Segment {
                start: 0.0,
                end: 5.2,
                text: "Welcome to our amazing product demonstration!".to_string(),
                confidence: 0.95,
            },
            Segment {
                start: 5.2,
                end: 11.8,
                text: "Today we are going to show you something truly incredible.".to_string(),
                confidence: 0.92,
            },
            Segment {
                start: 11.8,
                end: 18.5,
                text: "This revolutionary technology will change the way you work.".to_string(),
                confidence: 0.89,
            },
            Segment {
                start: 18.5,
                end: 25.0,
                text: "Let us dive deep into the features and capabilities.".to_string(),
                confidence: 0.91,
            },
        ],
        source: "mock".to_string(),
    }
}

// whisper-cli VTT output: a WEBVTT header line, then cue blocks separated by
// blank lines. Timestamps come as HH:MM:SS.mmm or MM:SS.mmm. VTT carries no
// per-segment confidence, so parsed segments all get 0.9.
pub fn parse_vtt_content(content: &str) -> Vec<Segment> {
    let timestamp_regex =
        Regex::new(r"(?:(\d{1,2}):)?(\d{1,2}):(\d{2})[.,](\d{3})").expect("valid regex");

    let cleaned = content.trim().replace('\r', "");
    let mut segments = Vec::new();

    for block in cleaned.split("\n\n") {
        let lines: Vec<&str> = block
            .split('\n')
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        let Some(cue_index) = lines.iter().position(|line| line.contains("-->")) else {
            continue;
        };

        let mut times = timestamp_regex.captures_iter(lines[cue_index]);
        let (Some(start_caps), Some(end_caps)) = (times.next(), times.next()) else {
            continue;
        };

        let text = lines[cue_index + 1..].join(" ").trim().to_string();
        if text.is_empty() {
            continue;
        }

        segments.push(Segment {
            start: vtt_timestamp_to_seconds(&start_caps),
            end: vtt_timestamp_to_seconds(&end_caps),
            text,
            confidence: 0.9,
        });
    }

    segments
}

fn vtt_timestamp_to_seconds(caps: &regex::Captures) -> f64 {
    let hours: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);
    let millis: f64 = caps[4].parse().unwrap_or(0.0);
    hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0
}

const FILLER_WORDS: &[&str] = &[
    "um",
    "uh",
    "like",
    "you know",
    "so",
    "well",
    "actually",
    "basically",
    "literally",
    "kind of",
    "sort of",
];

pub fn remove_filler_words(text: &str) -> String {
    let mut cleaned = text.to_string();
    for filler in FILLER_WORDS {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(filler));
        let re = Regex::new(&pattern).expect("valid regex");
        cleaned = re.replace_all(&cleaned, "").to_string();
    }

    let whitespace = Regex::new(r"\s+").expect("valid regex");
    whitespace.replace_all(&cleaned, " ").trim().to_string()
}

pub fn contains_filler_words(text: &str) -> bool {
    FILLER_WORDS.iter().any(|filler| {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(filler));
        Regex::new(&pattern)
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    })
}

pub fn fix_punctuation(text: &str) -> String {
    let trailing_letter = Regex::new(r"([a-zA-Z])\s*$").expect("valid regex");
    let mut fixed = trailing_letter.replace(text, "${1}.").to_string();

    let after_period = Regex::new(r"\.\s+([a-z])").expect("valid regex");
    fixed = after_period
        .replace_all(&fixed, |caps: &regex::Captures| {
            format!(". {}", caps[1].to_uppercase())
        })
        .to_string();

    let mut chars = fixed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => fixed,
    }
}

pub fn improve_readability(text: &str) -> String {
    let replacements = [
        ("gonna", "going to"),
        ("wanna", "want to"),
        ("gotta", "got to"),
        ("kinda", "kind of"),
        ("sorta", "sort of"),
    ];

    let mut improved = text.to_string();
    for (spoken, written) in replacements {
        let pattern = format!(r"(?i)\b{}\b", spoken);
        let re = Regex::new(&pattern).expect("valid regex");
        improved = re.replace_all(&improved, written).to_string();
    }
    improved
}

const SPEAKER_INDICATORS: &[&str] = &[
    "he said",
    "she said",
    "they said",
    "i said",
    "according to",
    "as mentioned",
    "someone asked",
];

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerChange {
    pub segment_index: usize,
    pub indicator: String,
}

pub fn detect_speaker_changes(segments: &[Segment]) -> Vec<SpeakerChange> {
    let mut changes = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        // Word boundaries, or "she said" would also register as "he said"
        for indicator in SPEAKER_INDICATORS {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(indicator));
            let matched = Regex::new(&pattern)
                .map(|re| re.is_match(&segment.text))
                .unwrap_or(false);
            if matched {
                changes.push(SpeakerChange {
                    segment_index: index,
                    indicator: indicator.to_string(),
                });
                break;
            }
        }
    }
    changes
}

pub fn format_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", minutes, secs)
}

pub fn render_plain(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| {
            format!(
                "[{} - {}] {}",
                format_time(s.start),
                format_time(s.end),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn edit_transcript<F>(project_id: &str, edit: F) -> Result<Transcript, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Transcript) -> Result<(), Box<dyn std::error::Error>>,
{
    let mut project = projects::get_project(project_id)?;
    let mut transcript = project
        .transcript
        .take()
        .ok_or("Project has no transcript yet, run analysis first")?;

    edit(&mut transcript)?;

    project.transcript = Some(transcript.clone());
    projects::update_project(&project)?;
    Ok(transcript)
}

pub fn set_segment_text(
    project_id: &str,
    index: usize,
    text: &str,
) -> Result<Transcript, Box<dyn std::error::Error>> {
    edit_transcript(project_id, |transcript| {
        if index >= transcript.segments.len() {
            return Err(format!(
                "Segment {} is beyond the end of the transcript (transcript has {} segments)",
                index,
                transcript.segments.len()
            )
            .into());
        }
        transcript.segments[index].text = text.to_string();
        Ok(())
    })
}

pub fn delete_segment(
    project_id: &str,
    index: usize,
) -> Result<Transcript, Box<dyn std::error::Error>> {
    edit_transcript(project_id, |transcript| {
        if index >= transcript.segments.len() {
            return Err(format!(
                "Segment {} is beyond the end of the transcript (transcript has {} segments)",
                index,
                transcript.segments.len()
            )
            .into());
        }
        transcript.segments.remove(index);
        Ok(())
    })
}

pub fn clean_fillers(project_id: &str) -> Result<Transcript, Box<dyn std::error::Error>> {
    edit_transcript(project_id, |transcript| {
        for segment in &mut transcript.segments {
            segment.text = remove_filler_words(&segment.text);
        }
        Ok(())
    })
}

pub fn punctuate(project_id: &str) -> Result<Transcript, Box<dyn std::error::Error>> {
    edit_transcript(project_id, |transcript| {
        for segment in &mut transcript.segments {
            segment.text = fix_punctuation(&segment.text);
        }
        Ok(())
    })
}

pub fn readability(project_id: &str) -> Result<Transcript, Box<dyn std::error::Error>> {
    edit_transcript(project_id, |transcript| {
        for segment in &mut transcript.segments {
            segment.text = improve_readability(&segment.text);
        }
        Ok(())
    })
}

#[derive(Deserialize)]
pub struct SetSegmentRequest {
    pub index: usize,
    pub text: String,
}

#[get("/api/projects/<id>/transcript")]
pub fn web_get_transcript(_auth: AuthGuard, id: String) -> Json<ApiResponse<Transcript>> {
    match projects::get_project(&id) {
        Ok(project) => match project.transcript {
            Some(transcript) => Json(ApiResponse::success(transcript)),
            None => Json(ApiResponse::error(
                "Project has no transcript yet, run analysis first".to_string(),
            )),
        },
        Err(e) => Json(ApiResponse::error(format!("Failed to get project: {}", e))),
    }
}

#[post("/api/projects/<id>/transcript/segment", data = "<request>")]
pub fn web_set_segment(
    _auth: AuthGuard,
    id: String,
    request: Json<SetSegmentRequest>,
) -> Json<ApiResponse<Transcript>> {
    match set_segment_text(&id, request.index, &request.text) {
        Ok(transcript) => Json(ApiResponse::success(transcript)),
        Err(e) => Json(ApiResponse::error(format!("Failed to edit segment: {}", e))),
    }
}

#[delete("/api/projects/<id>/transcript/segment/<index>")]
pub fn web_delete_segment(
    _auth: AuthGuard,
    id: String,
    index: usize,
) -> Json<ApiResponse<Transcript>> {
    match delete_segment(&id, index) {
        Ok(transcript) => Json(ApiResponse::success(transcript)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to delete segment: {}",
            e
        ))),
    }
}

#[post("/api/projects/<id>/transcript/clean")]
pub fn web_clean_fillers(_auth: AuthGuard, id: String) -> Json<ApiResponse<Transcript>> {
    match clean_fillers(&id) {
        Ok(transcript) => Json(ApiResponse::success(transcript)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to remove filler words: {}",
            e
        ))),
    }
}

#[post("/api/projects/<id>/transcript/punctuate")]
pub fn web_punctuate(_auth: AuthGuard, id: String) -> Json<ApiResponse<Transcript>> {
    match punctuate(&id) {
        Ok(transcript) => Json(ApiResponse::success(transcript)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to fix punctuation: {}",
            e
        ))),
    }
}

#[post("/api/projects/<id>/transcript/readability")]
pub fn web_readability(_auth: AuthGuard, id: String) -> Json<ApiResponse<Transcript>> {
    match readability(&id) {
        Ok(transcript) => Json(ApiResponse::success(transcript)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to improve readability: {}",
            e
        ))),
    }
}

#[get("/api/projects/<id>/transcript/download")]
pub fn web_download_transcript(
    _auth: AuthGuard,
    id: String,
) -> Result<(rocket::http::ContentType, String), rocket::response::status::NotFound<String>> {
    let project = projects::get_project(&id)
        .map_err(|e| rocket::response::status::NotFound(format!("Failed to get project: {}", e)))?;

    match project.transcript {
        Some(transcript) => Ok((
            rocket::http::ContentType::Text,
            render_plain(&transcript.segments),
        )),
        None => Err(rocket::response::status::NotFound(
            "Project has no transcript yet".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vtt_basic() {
        let content = "WEBVTT\n\n00:00:00.000 --> 00:00:05.200\nWelcome to the demo!\n\n00:00:05.200 --> 00:00:11.800\nHere is the second line.\n";
        let segments = parse_vtt_content(content);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 5.2);
        assert_eq!(segments[0].text, "Welcome to the demo!");
        assert_eq!(segments[1].text, "Here is the second line.");
        assert_eq!(segments[1].confidence, 0.9);
    }

    #[test]
    fn test_parse_vtt_without_hours() {
        let content = "WEBVTT\n\n01:30.500 --> 01:35.000\nShort timestamp form.\n";
        let segments = parse_vtt_content(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 90.5);
        assert_eq!(segments[0].end, 95.0);
    }

    #[test]
    fn test_parse_vtt_multiline_cue_text() {
        let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nfirst line\nsecond line\n";
        let segments = parse_vtt_content(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "first line second line");
    }

    #[test]
    fn test_parse_vtt_skips_malformed_blocks() {
        let content = "WEBVTT\n\nnot a cue at all\n\n00:00:01.000 --> 00:00:02.000\nreal cue\n";
        let segments = parse_vtt_content(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "real cue");
    }

    #[test]
    fn test_remove_filler_words() {
        let cleaned = remove_filler_words("This is like basically a test");
        assert_eq!(cleaned, "This is a test");
    }

    #[test]
    fn test_remove_filler_words_case_insensitive() {
        let cleaned = remove_filler_words("Um, this is Actually fine");
        assert_eq!(cleaned, ", this is fine");
    }

    #[test]
    fn test_remove_filler_words_multiword() {
        let cleaned = remove_filler_words("it was kind of hard you know to finish");
        assert_eq!(cleaned, "it was hard to finish");
    }

    #[test]
    fn test_remove_filler_words_keeps_partial_matches() {
        // "solar" contains "so" but word boundaries must keep it intact
        let cleaned = remove_filler_words("solar panels are sound");
        assert_eq!(cleaned, "solar panels are sound");
    }

    #[test]
    fn test_contains_filler_words() {
        assert!(contains_filler_words("this is basically done"));
        assert!(!contains_filler_words("this is completely done"));
    }

    #[test]
    fn test_fix_punctuation_adds_period() {
        assert_eq!(fix_punctuation("hello world"), "Hello world.");
    }

    #[test]
    fn test_fix_punctuation_capitalizes_after_period() {
        assert_eq!(
            fix_punctuation("first part. second part"),
            "First part. Second part."
        );
    }

    #[test]
    fn test_fix_punctuation_leaves_existing_terminal() {
        assert_eq!(fix_punctuation("is this done?"), "Is this done?");
    }

    #[test]
    fn test_improve_readability() {
        assert_eq!(
            improve_readability("we're gonna see if you wanna join"),
            "we're going to see if you want to join"
        );
    }

    #[test]
    fn test_improve_readability_ignores_case_and_partial_words() {
        assert_eq!(improve_readability("Gonna try this"), "going to try this");
        assert_eq!(improve_readability("the gonnabe star"), "the gonnabe star");
    }

    #[test]
    fn test_detect_speaker_changes() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 1.0,
                text: "Introduction with no markers".to_string(),
                confidence: 0.9,
            },
            Segment {
                start: 1.0,
                end: 2.0,
                text: "And then she said it was ready".to_string(),
                confidence: 0.9,
            },
        ];
        let changes = detect_speaker_changes(&segments);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].segment_index, 1);
        assert_eq!(changes[0].indicator, "she said");
    }

    #[test]
    fn test_detect_speaker_changes_keeps_he_said() {
        let segments = vec![Segment {
            start: 0.0,
            end: 1.0,
            text: "And he said we were done".to_string(),
            confidence: 0.9,
        }];
        let changes = detect_speaker_changes(&segments);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].indicator, "he said");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(75.5), "01:15");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn test_render_plain() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 5.2,
                text: "First".to_string(),
                confidence: 0.9,
            },
            Segment {
                start: 5.2,
                end: 11.8,
                text: "Second".to_string(),
                confidence: 0.9,
            },
        ];
        let rendered = render_plain(&segments);
        assert_eq!(rendered, "[00:00 - 00:05] First\n[00:05 - 00:11] Second");
    }

    #[test]
    fn test_mock_transcript_shape() {
        let transcript = mock_transcript();
        assert_eq!(transcript.segments.len(), 4);
        assert_eq!(transcript.source, "mock");
        assert_eq!(transcript.segments[0].start, 0.0);
        assert_eq!(transcript.segments[3].end, 25.0);
        assert!(transcript.full_text().contains("amazing product"));
    }
}
