// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use crate::auth::AuthGuard;
use crate::db;
use crate::jobs;
use crate::projects;
use crate::web::ApiResponse;
use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_projects: usize,
    pub total_hours: f64,
    pub transcribed_projects: usize,
    pub completed_exports: usize,
    pub vibe_distribution: BTreeMap<String, usize>,
    pub average_confidence: Option<f64>,
}

pub fn collect_stats() -> Result<Stats, Box<dyn std::error::Error>> {
    let project_list = projects::list_projects()?;

    let total_seconds: f64 = project_list
        .iter()
        .filter_map(|p| p.metadata.as_ref())
        .map(|m| m.duration)
        .sum();

    let transcribed_projects = project_list
        .iter()
        .filter(|p| p.transcript.is_some())
        .count();

    let mut vibe_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut confidence_sum = 0.0;
    let mut confidence_count = 0usize;
    for project in &project_list {
        // A manual override counts under the vibe the user picked
        let effective = project
            .selected_vibe
            .or_else(|| project.vibe_analysis.as_ref().map(|a| a.vibe));
        if let Some(vibe) = effective {
            *vibe_distribution.entry(vibe.as_str().to_string()).or_insert(0) += 1;
        }
        if let Some(analysis) = &project.vibe_analysis {
            confidence_sum += analysis.confidence;
            confidence_count += 1;
        }
    }

    let conn = db::get_connection()?;
    let completed_exports: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE kind = ?1 AND status = ?2",
        (jobs::KIND_EXPORT, jobs::STATUS_COMPLETED),
        |row| row.get::<_, i64>(0),
    )? as usize;

    Ok(Stats {
        total_projects: project_list.len(),
        total_hours: total_seconds / 3600.0,
        transcribed_projects,
        completed_exports,
        vibe_distribution,
        average_confidence: if confidence_count > 0 {
            Some(confidence_sum / confidence_count as f64)
        } else {
            None
        },
    })
}

pub fn print_stats(stats: &Stats) {
    println!("Projects:            {}", stats.total_projects);
    println!("Video hours:         {:.2}", stats.total_hours);
    println!("With transcript:     {}", stats.transcribed_projects);
    println!("Completed exports:   {}", stats.completed_exports);
    match stats.average_confidence {
        Some(avg) => println!("Avg vibe confidence: {:.2}", avg),
        None => println!("Avg vibe confidence: n/a"),
    }
    if !stats.vibe_distribution.is_empty() {
        println!("Vibes:");
        for (vibe, count) in &stats.vibe_distribution {
            println!("  {:12} {}", vibe, count);
        }
    }
}

#[get("/api/stats")]
pub fn web_get_stats(_auth: AuthGuard) -> Json<ApiResponse<Stats>> {
    match collect_stats() {
        Ok(stats) => Json(ApiResponse::success(stats)),
        Err(e) => Json(ApiResponse::error(format!(
            "Failed to collect stats: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testenv::with_temp_store;

    #[test]
    fn test_stats_empty_store() {
        with_temp_store(|| {
            let stats = collect_stats().unwrap();
            assert_eq!(stats.total_projects, 0);
            assert_eq!(stats.total_hours, 0.0);
            assert!(stats.average_confidence.is_none());
            assert!(stats.vibe_distribution.is_empty());
        });
    }

    #[test]
    fn test_stats_counts_analyzed_projects() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            for name in ["a.mp4", "b.mp4"] {
                let video = dir.path().join(name);
                std::fs::write(&video, "fake").unwrap();
                projects::create_project(video.to_str().unwrap()).unwrap();
            }

            let listed = projects::list_projects().unwrap();
            let mut first = listed[0].clone();
            first.vibe_analysis = Some(crate::vibes::classify("exciting fast-paced action"));
            first.transcript = Some(crate::transcripts::mock_transcript());
            projects::update_project(&first).unwrap();

            let stats = collect_stats().unwrap();
            assert_eq!(stats.total_projects, 2);
            // mock metadata is 60s per project
            assert!((stats.total_hours - 2.0 / 60.0).abs() < 1e-9);
            assert_eq!(stats.transcribed_projects, 1);
            assert_eq!(stats.vibe_distribution.len(), 1);
            assert!(stats.average_confidence.unwrap() > 0.5);
        });
    }

    #[test]
    fn test_stats_distribution_uses_vibe_override() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("demo.mp4");
            std::fs::write(&video, "fake").unwrap();
            let project = projects::create_project(video.to_str().unwrap()).unwrap();

            let mut analyzed = projects::get_project(&project.id).unwrap();
            let detected = crate::vibes::classify("a funny hilarious comedy");
            assert_eq!(detected.vibe, crate::vibes::Vibe::Fun);
            analyzed.vibe_analysis = Some(detected);
            projects::update_project(&analyzed).unwrap();
            projects::set_selected_vibe(&project.id, Some(crate::vibes::Vibe::Dramatic)).unwrap();

            let stats = collect_stats().unwrap();
            assert_eq!(stats.vibe_distribution.get("dramatic"), Some(&1));
            assert_eq!(stats.vibe_distribution.get("fun"), None);
        });
    }

    #[test]
    fn test_stats_counts_selected_only_projects() {
        with_temp_store(|| {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("demo.mp4");
            std::fs::write(&video, "fake").unwrap();
            let project = projects::create_project(video.to_str().unwrap()).unwrap();

            // No analysis ran, the user just picked a vibe
            projects::set_selected_vibe(&project.id, Some(crate::vibes::Vibe::Calm)).unwrap();

            let stats = collect_stats().unwrap();
            assert_eq!(stats.vibe_distribution.get("calm"), Some(&1));
            assert!(stats.average_confidence.is_none());
        });
    }
}
