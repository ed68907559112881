use clap::{Parser, Subcommand};
use music_splitter_core::{
    set_job_progress_callback, JobManager, JobProgress, JobStatus, SplitterConfig,
};
use std::{
    path::{Path, PathBuf},
    process,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "music-splitter")]
#[command(about = "Separate songs into stems using ffmpeg and Spleeter", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory for work files, outputs and job records
    #[arg(long, default_value = ".", global = true)]
    base_dir: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Separate an audio file, or every supported file in a folder
    Split {
        input: PathBuf,

        #[arg(short, long, default_value_t = 4)]
        stems: u8,

        #[arg(long, default_value_t = 45)]
        chunk_secs: u32,

        #[arg(long, default_value = "ffmpeg")]
        ffmpeg: String,

        #[arg(long, default_value = "python3")]
        python: String,

        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the stored record for a job id
    Status { id: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Split {
            input,
            stems,
            chunk_secs,
            ffmpeg,
            python,
            quiet,
        } => {
            let config = SplitterConfig {
                base_dir: cli.base_dir,
                chunk_secs,
                ffmpeg_bin: ffmpeg,
                python_bin: python,
                ..SplitterConfig::default()
            };
            handle_split(config, &input, stems, quiet)
        }
        Commands::Status { id } => {
            let config = SplitterConfig {
                base_dir: cli.base_dir,
                ..SplitterConfig::default()
            };
            handle_status(config, &id)
        }
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn handle_split(
    config: SplitterConfig,
    input: &Path,
    stems: u8,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = collect_audio_files(input)?;
    if files.is_empty() {
        return Err("No supported audio files found.".into());
    }

    if !quiet {
        setup_progress_output();
    }

    let manager = JobManager::new(config);
    let mut failures = 0usize;

    for file in &files {
        if !quiet {
            eprintln!("🎵 {}", file.display());
        }

        let job_id = manager.submit(file, stems)?;
        let record = manager.wait(&job_id, Duration::from_millis(250))?;

        match record.status {
            JobStatus::Done => {
                if quiet {
                    for name in &record.files {
                        println!("{}/{}/{}", job_id, record.track_folder, name);
                    }
                } else {
                    eprintln!("✅ Job {} done:", job_id);
                    for name in &record.files {
                        eprintln!("   {}", name);
                    }
                }
            }
            _ => {
                failures += 1;
                eprintln!("❌ Job {} failed: {}", job_id, record.error);
            }
        }
    }

    if failures > 0 {
        return Err(format!("Done with {failures} failed file(s).").into());
    }
    if !quiet {
        eprintln!("Done. All files separated successfully.");
    }
    Ok(())
}

fn handle_status(config: SplitterConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let manager = JobManager::new(config);
    let record = manager.status(id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// A file is used as-is; a folder contributes its supported files sorted
/// by name.
fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .map(|e| {
                            music_splitter_core::types::SUPPORTED_EXTENSIONS
                                .contains(&e.to_lowercase().as_str())
                        })
                        .unwrap_or(false)
            })
            .collect();
        files.sort();
        return Ok(files);
    }
    Err(format!("Input path not found: {}", path.display()).into())
}

fn setup_progress_output() {
    set_job_progress_callback(|job_id, progress| match progress {
        JobProgress::Chunking => eprintln!("⏳ [{}] splitting into chunks", job_id),
        JobProgress::Separating { done, total } => {
            eprintln!("🔄 [{}] separating chunk {}/{}", job_id, done + 1, total)
        }
        JobProgress::Merging => eprintln!("⏳ [{}] merging stems", job_id),
        JobProgress::Finished => {}
    });
}
