// vve (vibe video editor)
// Copyright (C) 2026 Andrew Nissen

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::time::Duration;

mod analysis;
mod auth;
mod config;
mod db;
mod export;
mod frames;
mod jobs;
mod llm;
mod metadata;
mod models;
mod projects;
mod stats;
mod styling;
mod suggestions;
mod tools;
mod transcripts;
mod vibes;
mod web;

#[derive(Parser, Debug)]
#[command(name = "vve", version, about = "vibe video editor", long_about = None, arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Analyze a video: metadata, transcript, and vibe detection")]
    #[command(arg_required_else_help = true)]
    Analyze {
        #[arg(help = "Path to the video file")]
        path: String,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Classify the vibe of raw text")]
    #[command(arg_required_else_help = true)]
    Vibe {
        #[arg(help = "Text to classify", num_args = 1.., value_delimiter = ' ')]
        text: Vec<String>,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Manage video projects")]
    Projects {
        #[command(subcommand)]
        projects_command: Option<ProjectsCommands>,
    },
    #[command(about = "View and edit project transcripts")]
    Transcript {
        #[command(subcommand)]
        transcript_command: Option<TranscriptCommands>,
    },
    #[command(about = "Export a styled video")]
    #[command(arg_required_else_help = true)]
    Export {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long, help = "Output resolution", value_parser = ["720p", "1080p", "4K"])]
        resolution: Option<String>,
        #[arg(long, help = "Quality 1-10")]
        quality: Option<u32>,
        #[arg(long, help = "Output format", value_parser = ["mp4", "mov", "avi", "webm"])]
        format: Option<String>,
        #[arg(long, help = "Skip burned-in subtitles", default_value = "false")]
        no_subtitles: bool,
    },
    #[command(about = "Style suggestions for a vibe")]
    #[command(arg_required_else_help = true)]
    Suggest {
        #[arg(help = "Vibe name (energetic, calm, professional, fun, dramatic, minimalist)")]
        vibe: String,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Library statistics")]
    Stats {
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Manage Whisper models")]
    Models {
        #[command(subcommand)]
        models_command: Option<ModelsCommands>,
    },
    #[command(about = "Manage external tools and dependencies")]
    Tools {
        #[command(subcommand)]
        tools_command: Option<ToolsCommands>,
    },
    #[command(about = "Display current configuration settings")]
    Config {
        #[command(subcommand)]
        config_command: Option<ConfigCommands>,
    },
    #[command(about = "Run the web server")]
    Web {
        #[command(subcommand)]
        web_command: Option<WebCommands>,
    },
    #[command(about = "Show version information")]
    Version {
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectsCommands {
    #[command(about = "List all projects")]
    List {
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Delete a project and its generated files")]
    Delete {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long, help = "Skip the confirmation prompt", default_value = "false")]
        yes: bool,
    },
    #[command(about = "Stamp a project as saved")]
    Save {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Register every video file under a directory")]
    Scan {
        #[arg(help = "Directory to scan")]
        dir: String,
        #[arg(short = 'f', long, help = "Glob filter applied to file paths")]
        filter: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TranscriptCommands {
    #[command(about = "Print a project's transcript")]
    Get {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Replace the text of one segment")]
    Set {
        #[arg(help = "Project id")]
        id: String,
        #[arg(help = "Segment index (0-based)")]
        index: usize,
        #[arg(help = "New segment text")]
        text: String,
    },
    #[command(about = "Remove filler words from every segment")]
    Clean {
        #[arg(help = "Project id")]
        id: String,
    },
    #[command(about = "Fix capitalization and sentence endings")]
    Punctuate {
        #[arg(help = "Project id")]
        id: String,
    },
    #[command(about = "Break run-on segments for readability")]
    Readability {
        #[arg(help = "Project id")]
        id: String,
    },
    #[command(about = "Write the transcript to a text file")]
    Download {
        #[arg(help = "Project id")]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ModelsCommands {
    #[command(about = "List available Whisper models")]
    List {
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Download a Whisper model and make it current")]
    Download {
        #[arg(help = "Model name (tiny, base, small, medium, large)")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsCommands {
    #[command(about = "List tool availability")]
    List {
        #[arg(long, help = "Show JSON output instead of formatted", default_value = "false")]
        json: bool,
    },
    #[command(about = "Point the config at the system install of a tool")]
    UseSystem {
        #[arg(help = "Tool name (ffmpeg, ffprobe, whisper-cli)")]
        tool: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    #[command(about = "Show the current configuration")]
    Show,
    #[command(about = "Show the configuration file path")]
    Path,
    #[command(about = "Set a configuration field")]
    Set {
        #[arg(help = "Field name")]
        field: String,
        #[arg(help = "New value")]
        value: String,
    },
    #[command(about = "Reset a configuration field to its default")]
    Unset {
        #[arg(help = "Field name")]
        field: String,
    },
}

#[derive(Subcommand, Debug)]
enum WebCommands {
    #[command(about = "Run the API and web UI server")]
    All {
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value = "4620")]
        port: u16,
    },
    #[command(about = "Run the API-only server")]
    Api {
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value = "4620")]
        port: u16,
    },
}

fn pid_file_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("vve_web_{}.pid", config::get_config_path_sha()))
}

fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use std::process::Command;
        Command::new("ps")
            .arg("-p")
            .arg(pid.to_string())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        Command::new("tasklist")
            .arg("/FI")
            .arg(format!("PID eq {}", pid))
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()))
            .unwrap_or(false)
    }
}

fn setup_pid_file() -> Result<(), Box<dyn std::error::Error>> {
    let pid_file = pid_file_path();

    if pid_file.exists() {
        let recorded: Option<u32> = fs::read_to_string(&pid_file)
            .ok()
            .and_then(|s| s.trim().parse().ok());
        match recorded {
            Some(pid) if is_process_running(pid) => {
                return Err(format!(
                    "Another vve web server is already running (PID: {})",
                    pid
                )
                .into());
            }
            _ => {
                println!("Removing stale PID file: {}", pid_file.display());
                fs::remove_file(&pid_file)?;
            }
        }
    }

    fs::write(&pid_file, std::process::id().to_string())?;

    ctrlc::set_handler(move || {
        println!("\nReceived interrupt signal, cleaning up pid file");
        cleanup_pid_file();
        std::process::exit(0);
    })?;

    Ok(())
}

fn cleanup_pid_file() {
    let pid_file = pid_file_path();
    if pid_file.exists()
        && let Err(e) = fs::remove_file(&pid_file)
    {
        eprintln!("Warning: Failed to remove PID file: {}", e);
    }
}

// Runs a queued job on a worker thread while the main thread drives an
// indicatif bar off the job row.
fn run_job_with_progress(
    job: jobs::Job,
    runner: fn(i64, &str, u64) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<jobs::Job, Box<dyn std::error::Error>> {
    jobs::mark_running(job.id)?;

    let job_id = job.id;
    let project_id = job.project_id.clone();
    let worker = std::thread::spawn(move || {
        if let Err(e) = runner(job_id, &project_id, jobs::stage_delay_ms()) {
            jobs::fail_job(job_id, &e.to_string()).ok();
        }
    });

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    let finished = loop {
        let current = jobs::get_job(job.id)?;
        pb.set_position(current.percent.clamp(0, 100) as u64);
        pb.set_message(current.message.clone());
        match current.status.as_str() {
            jobs::STATUS_QUEUED | jobs::STATUS_RUNNING => {
                std::thread::sleep(Duration::from_millis(200))
            }
            _ => break current,
        }
    };
    pb.finish_with_message(finished.message.clone());

    worker.join().map_err(|_| "job worker panicked")?;

    match finished.status.as_str() {
        jobs::STATUS_COMPLETED => Ok(finished),
        jobs::STATUS_CANCELLED => Err("Job was cancelled".into()),
        _ => Err(finished
            .error
            .unwrap_or_else(|| "Job failed".to_string())
            .into()),
    }
}

fn print_project_line(project: &projects::Project) {
    let duration = project
        .metadata
        .as_ref()
        .map(|m| transcripts::format_time(m.duration))
        .unwrap_or_else(|| "--:--".to_string());
    let vibe = project
        .vibe_analysis
        .as_ref()
        .map(|a| a.vibe.as_str())
        .unwrap_or("-");
    println!(
        "{}  {:20}  {:>8}  {:12}  {}",
        project.id, project.name, duration, vibe, project.video_path
    );
}

fn print_project_details(project: &projects::Project) {
    println!("id:         {}", project.id);
    println!("name:       {}", project.name);
    println!("video:      {}", project.video_path);
    println!("created:    {}", project.created_at);
    println!("updated:    {}", project.updated_at);
    if let Some(saved_at) = &project.saved_at {
        println!("saved:      {}", saved_at);
    }
    if let Some(metadata) = &project.metadata {
        println!(
            "metadata:   {}x{} @ {:.2}fps, {} ({})",
            metadata.width,
            metadata.height,
            metadata.fps,
            transcripts::format_time(metadata.duration),
            metadata.source
        );
    }
    if let Some(transcript) = &project.transcript {
        println!(
            "transcript: {} segments ({})",
            transcript.segments.len(),
            transcript.source
        );
    }
    if let Some(analysis) = &project.vibe_analysis {
        println!(
            "vibe:       {} ({:.0}% confidence, {})",
            analysis.vibe, analysis.confidence * 100.0, analysis.source
        );
    }
    if let Some(selected) = project.selected_vibe {
        println!("override:   {}", selected);
    }
}

fn show_transcript(project: &projects::Project) -> Result<(), Box<dyn std::error::Error>> {
    let transcript = project
        .transcript
        .as_ref()
        .ok_or("Project has no transcript yet (run `vve analyze` first)")?;
    println!("{}", transcripts::render_plain(&transcript.segments));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Analyze { path, json }) => {
            let project = projects::create_project(&path).unwrap_or_else(|e| {
                eprintln!("Error creating project: {}", e);
                std::process::exit(1);
            });
            let job = jobs::create_job(&project.id, jobs::KIND_ANALYSIS)?;

            match run_job_with_progress(job, analysis::run_analysis) {
                Ok(_) => {
                    let analyzed = projects::get_project(&project.id)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&analyzed)?);
                    } else {
                        print_project_details(&analyzed);
                    }
                }
                Err(e) => {
                    eprintln!("Error analyzing video: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Vibe { text, json }) => {
            let analysis = vibes::classify(&text.join(" "));
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("vibe:       {}", analysis.vibe);
                println!("confidence: {:.0}%", analysis.confidence * 100.0);
                println!("reasoning:  {}", analysis.reasoning);
                if !analysis.keywords.is_empty() {
                    println!("keywords:   {}", analysis.keywords.join(", "));
                }
            }
        }
        Some(Commands::Projects { projects_command }) => match projects_command {
            Some(ProjectsCommands::List { json }) => match projects::list_projects() {
                Ok(project_list) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&project_list)?);
                    } else {
                        for project in &project_list {
                            print_project_line(project);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Error listing projects: {}", e);
                    std::process::exit(1);
                }
            },
            Some(ProjectsCommands::Show { id, json }) => match projects::get_project(&id) {
                Ok(project) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&project)?);
                    } else {
                        print_project_details(&project);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            },
            Some(ProjectsCommands::Delete { id, yes }) => {
                let project = projects::get_project(&id).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });

                let confirmed = yes
                    || Confirm::new()
                        .with_prompt(format!(
                            "Delete project \"{}\" and its generated files?",
                            project.name
                        ))
                        .default(false)
                        .interact()?;
                if !confirmed {
                    println!("Aborted");
                    return Ok(());
                }

                match projects::delete_project(&id) {
                    Ok(()) => println!("Deleted project {}", id),
                    Err(e) => {
                        eprintln!("Error deleting project: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Some(ProjectsCommands::Save { id, json }) => match projects::save_project(&id) {
                Ok(project) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&project)?);
                    } else {
                        println!(
                            "Saved project {} at {}",
                            project.id,
                            project.saved_at.as_deref().unwrap_or("")
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Error saving project: {}", e);
                    std::process::exit(1);
                }
            },
            Some(ProjectsCommands::Scan { dir, filter }) => {
                match projects::scan_directory(&dir, filter.as_deref()) {
                    Ok(created) => {
                        println!("Registered {} new project(s)", created.len());
                        for project in &created {
                            print_project_line(project);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error scanning directory: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            None => {}
        },
        Some(Commands::Transcript { transcript_command }) => match transcript_command {
            Some(TranscriptCommands::Get { id, json }) => {
                let project = projects::get_project(&id).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });
                if json {
                    match &project.transcript {
                        Some(transcript) => {
                            println!("{}", serde_json::to_string_pretty(transcript)?)
                        }
                        None => {
                            eprintln!("Project has no transcript yet");
                            std::process::exit(1);
                        }
                    }
                } else if let Err(e) = show_transcript(&project) {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
            Some(TranscriptCommands::Set { id, index, text }) => {
                match transcripts::set_segment_text(&id, index, &text) {
                    Ok(_) => println!("Updated segment {}", index),
                    Err(e) => {
                        eprintln!("Error updating segment: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Some(TranscriptCommands::Clean { id }) => match transcripts::clean_fillers(&id) {
                Ok(transcript) => {
                    println!("{}", transcripts::render_plain(&transcript.segments))
                }
                Err(e) => {
                    eprintln!("Error cleaning transcript: {}", e);
                    std::process::exit(1);
                }
            },
            Some(TranscriptCommands::Punctuate { id }) => match transcripts::punctuate(&id) {
                Ok(transcript) => {
                    println!("{}", transcripts::render_plain(&transcript.segments))
                }
                Err(e) => {
                    eprintln!("Error punctuating transcript: {}", e);
                    std::process::exit(1);
                }
            },
            Some(TranscriptCommands::Readability { id }) => match transcripts::readability(&id) {
                Ok(transcript) => {
                    println!("{}", transcripts::render_plain(&transcript.segments))
                }
                Err(e) => {
                    eprintln!("Error improving transcript: {}", e);
                    std::process::exit(1);
                }
            },
            Some(TranscriptCommands::Download { id }) => {
                let project = projects::get_project(&id).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                });
                let transcript = project
                    .transcript
                    .as_ref()
                    .ok_or("Project has no transcript yet")?;
                let target = format!("{}_transcript.txt", project.name.replace(' ', "_"));
                fs::write(&target, transcripts::render_plain(&transcript.segments))?;
                println!("Wrote {}", target);
            }
            None => {}
        },
        Some(Commands::Export {
            id,
            resolution,
            quality,
            format,
            no_subtitles,
        }) => {
            let project = projects::get_project(&id).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            // Flags override the stored style for this run
            let cfg = config::load_config_or_default();
            let vibe = projects::effective_vibe(&project, &cfg);
            let mut style = project
                .style
                .clone()
                .unwrap_or_else(|| styling::StyleSettings::default_for_vibe(vibe));
            if let Some(resolution) = resolution {
                style.resolution = resolution;
            }
            if let Some(quality) = quality {
                style.quality = quality;
            }
            if let Some(format) = format {
                style.format = format;
            }
            if no_subtitles {
                style.add_subtitles = false;
            }
            if let Err(e) = style.validate() {
                eprintln!("Invalid style: {}", e);
                std::process::exit(1);
            }
            projects::set_style(&id, style)?;

            let job = jobs::create_job(&id, jobs::KIND_EXPORT)?;
            match run_job_with_progress(job, export::run_export) {
                Ok(finished) => {
                    println!("Exported to {}", finished.output_path.unwrap_or_default())
                }
                Err(e) => {
                    eprintln!("Error exporting video: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Suggest { vibe, json }) => {
            let vibe: vibes::Vibe = vibe.parse().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            let suggestions = suggestions::vibe_suggestions(vibe);
            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                println!("{}", suggestions.music_note);
                println!("{}", suggestions.effects_note);
                println!("Editing tips:");
                for tip in &suggestions.editing_tips {
                    println!("  - {}", tip);
                }
            }
        }
        Some(Commands::Stats { json }) => match stats::collect_stats() {
            Ok(stats) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    stats::print_stats(&stats);
                }
            }
            Err(e) => {
                eprintln!("Error collecting stats: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Models { models_command }) => match models_command {
            Some(ModelsCommands::List { json }) => {
                let model_list = models::list_models();
                if json {
                    println!("{}", serde_json::to_string_pretty(&model_list)?);
                } else {
                    for model in &model_list {
                        println!(
                            "{:8} {:20} ~{} MB{}{}",
                            model.name,
                            model.file_name,
                            model.size_mb,
                            if model.downloaded { "  [downloaded]" } else { "" },
                            if model.current { "  [current]" } else { "" },
                        );
                    }
                }
            }
            Some(ModelsCommands::Download { name }) => {
                if let Err(e) = models::download_model(&name) {
                    eprintln!("Error downloading model: {}", e);
                    std::process::exit(1);
                }
            }
            None => {}
        },
        Some(Commands::Tools { tools_command }) => match tools_command {
            Some(ToolsCommands::List { json }) => {
                let tool_list = tools::list_tools();
                if json {
                    println!("{}", serde_json::to_string_pretty(&tool_list)?);
                } else {
                    for tool in &tool_list {
                        println!(
                            "{:12} configured: {:40} system: {}",
                            tool.name,
                            tool.configured_path.as_deref().unwrap_or("-"),
                            tool.system_path.as_deref().unwrap_or("not found"),
                        );
                    }
                }
            }
            Some(ToolsCommands::UseSystem { tool }) => match tools::use_system_tool(&tool) {
                Ok(path) => println!("Using system {} at {}", tool, path),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            },
            None => {}
        },
        Some(Commands::Config { config_command }) => match config_command {
            Some(ConfigCommands::Show) | None => {
                let cfg = config::load_config_or_default();
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
            Some(ConfigCommands::Path) => {
                println!("{}", config::get_config_file_path()?.display());
            }
            Some(ConfigCommands::Set { field, value }) => {
                let mut cfg = config::load_config_or_default();
                match config::set_config_field(&mut cfg, &field, &value) {
                    Ok(()) => {
                        config::store_config(&cfg)?;
                        println!("Set {} = {}", field, value);
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Some(ConfigCommands::Unset { field }) => {
                let mut cfg = config::load_config_or_default();
                match config::unset_config_field(&mut cfg, &field) {
                    Ok(()) => {
                        config::store_config(&cfg)?;
                        println!("Unset {}", field);
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
        Some(Commands::Web { web_command }) => match web_command {
            Some(WebCommands::All { host, port }) => {
                setup_pid_file()?;

                println!(
                    "Starting vve \x1b[1mAPI\x1b[0m and \x1b[1mWeb UI\x1b[0m server on http://{}:{}",
                    host, port
                );

                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(async {
                    if let Err(e) = web::launch_server(&host, port).await {
                        eprintln!("Error starting web server: {}", e);
                        std::process::exit(1);
                    }
                });
            }
            Some(WebCommands::Api { host, port }) => {
                setup_pid_file()?;

                println!(
                    "Starting vve \x1b[1mAPI-only\x1b[0m server on http://{}:{}",
                    host, port
                );

                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(async {
                    if let Err(e) = web::launch_api_server(&host, port).await {
                        eprintln!("Error starting API server: {}", e);
                        std::process::exit(1);
                    }
                });
            }
            None => {}
        },
        Some(Commands::Version { json }) => {
            let version = env!("CARGO_PKG_VERSION");
            if json {
                println!("{}", serde_json::json!({ "version": version }));
            } else {
                println!("vve {}", version);
            }
        }
        None => {}
    }

    cleanup_pid_file();

    Ok(())
}
