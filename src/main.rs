use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use docmerge::config::Config;
use docmerge::document::{Block, FormField, Inline, Paragraph, Run};
use docmerge::publish::RcloneSink;
use docmerge::row::CsvRowSource;
use docmerge::{pipeline, Document};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run one pipeline pass and exit instead of scheduling
    #[arg(long, global = true)]
    once: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new docmerge project
    Init {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Fill and publish documents on a schedule (default command)
    Run,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            init_project(&path)?;
        }
        Some(Commands::Run) | None => {
            run(cli)?;
        }
    }

    Ok(())
}

fn init_project(path: &Path) -> Result<()> {
    info!("Initializing docmerge project at {:?}", path);

    std::fs::create_dir_all(path.join("templates"))?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_content = r#"template: templates/model.json
spreadsheet: data/rows.csv
work_dir: temp
name_column: "Name"
output_prefix: document
interval_minutes: 60

remote:
  rclone_path: rclone
  remote_name: sharepoint
  folder: files
"#;
    std::fs::write(path.join("config.yaml"), config_content)?;

    let template = Document {
        body: vec![Block::Paragraph(Paragraph {
            children: vec![
                Inline::Run(Run {
                    text: "Report for ${Name}, contact: ".to_string(),
                }),
                Inline::FormField(FormField {
                    tag: Some("Email".to_string()),
                    runs: vec![Run {
                        text: "<email>".to_string(),
                    }],
                }),
            ],
        })],
    };
    template
        .save(&path.join("templates/model.json"))
        .context("Failed to write example template")?;

    let rows_content = "Name,Email\nAlice,alice@example.com\n";
    std::fs::write(path.join("data/rows.csv"), rows_content)?;

    info!("Project initialized successfully");
    info!("  Run: docgen -c config.yaml --once");

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .ok_or_else(|| anyhow::anyhow!("--config is required"))?;

    info!("Loading config from {:?}", config_path);
    let config = Config::load(&config_path).context("Failed to load config")?;

    // The environment wins over the config file, as in deployments where
    // the interval is injected per container.
    let interval_minutes = std::env::var("INTERVAL_MINUTES")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(config.interval_minutes);

    let source = CsvRowSource::new(&config.spreadsheet);
    let sink = RcloneSink::new(&config.remote);

    if cli.once {
        return pipeline::run_once(&config, &source, &sink).map(|_| ());
    }

    // First pass runs immediately. A transient failure here (spreadsheet
    // or remote down at startup) is logged and retried on the schedule,
    // it must not kill the service.
    pipeline::run_logged(&config, &source, &sink);

    info!("Scheduling a run every {} minutes", interval_minutes);
    loop {
        thread::sleep(Duration::from_secs(interval_minutes * 60));
        // The loop is single-threaded, so runs can never overlap.
        pipeline::run_logged(&config, &source, &sink);
    }
}
