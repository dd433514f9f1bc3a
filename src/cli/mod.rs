//! CLI commands for AppLogger using clap.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};

use crate::config::{load_settings, load_settings_from, Settings};
use crate::store::{calculate_points, NewRecord, Record, RecordPatch, Store};
use crate::web::{run_server, WebServerConfig};

/// AppLogger - job-application tracker backed by a CSV file.
#[derive(Parser)]
#[command(name = "applogger")]
#[command(version = "0.1.0")]
#[command(about = "AppLogger - track job applications and earn points", long_about = None)]
pub struct Commands {
    /// Settings file (default: ~/.applogger/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV data file, overriding the settings
    #[arg(long, global = true, env = "APPLOGGER_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data file with its header if it does not exist
    Init,

    /// Start the HTTP API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List applications and the total score
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Log a new application
    Add {
        /// Job title
        title: String,

        /// Company name
        company: String,

        /// CV was tailored for this role
        #[arg(long)]
        tailored: bool,

        /// Applied through a referral
        #[arg(long)]
        referral: bool,

        /// Initial status
        #[arg(long, default_value = "Applied")]
        status: String,

        /// Link to the posting
        #[arg(long)]
        link: Option<String>,

        /// Follow-up date
        #[arg(long)]
        follow_up: Option<String>,

        /// Interview date
        #[arg(long)]
        interview: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Change fields of an existing application
    Update {
        /// Application ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        points: Option<i64>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        follow_up: Option<String>,

        #[arg(long)]
        interview: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an application
    #[command(alias = "rm")]
    Delete {
        /// Application ID
        id: String,
    },

    /// Export the raw CSV file
    Export {
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let settings = match &self.config {
            Some(path) => load_settings_from(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => load_settings()?,
        };
        let store = Store::new(settings.store_config(self.data_file.clone())?);

        match &self.command {
            Command::Init => cmd_init(&store),
            Command::Serve { host, port } => cmd_serve(&settings, store, host, port).await,
            Command::List { json } => cmd_list(&store, *json),
            Command::Add {
                title,
                company,
                tailored,
                referral,
                status,
                link,
                follow_up,
                interview,
                notes,
            } => {
                let input = build_new_record(
                    title,
                    company,
                    *tailored,
                    *referral,
                    status,
                    link,
                    follow_up,
                    interview,
                    notes,
                );
                cmd_add(&store, input)
            }
            Command::Update {
                id,
                title,
                company,
                points,
                status,
                link,
                follow_up,
                interview,
                notes,
            } => {
                let patch = RecordPatch {
                    job_title: title.clone(),
                    company_name: company.clone(),
                    points_earned: *points,
                    status: status.clone(),
                    job_link: link.clone(),
                    follow_up_date: follow_up.clone(),
                    interview_date: interview.clone(),
                    notes: notes.clone(),
                    ..RecordPatch::for_id(id.as_str())
                };
                cmd_update(&store, id, &patch)
            }
            Command::Delete { id } => cmd_delete(&store, id),
            Command::Export { output } => cmd_export(&store, output.as_ref()),
        }
    }
}

/// Build a new record the way the browser form does: id and date from the
/// current time, points from the tailored/referral flags.
#[allow(clippy::too_many_arguments)]
fn build_new_record(
    title: &str,
    company: &str,
    tailored: bool,
    referral: bool,
    status: &str,
    link: &Option<String>,
    follow_up: &Option<String>,
    interview: &Option<String>,
    notes: &Option<String>,
) -> NewRecord {
    let now = Utc::now();
    NewRecord {
        id: Some(now.timestamp_millis().to_string()),
        job_title: Some(title.to_string()),
        company_name: Some(company.to_string()),
        points_earned: Some(calculate_points(tailored, referral)),
        is_tailored: Some(tailored),
        has_referral: Some(referral),
        timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        status: Some(status.to_string()),
        follow_up_date: follow_up.clone(),
        interview_date: interview.clone(),
        job_link: link.clone(),
        notes: notes.clone(),
    }
}

// Command implementations

fn cmd_init(store: &Store) -> Result<()> {
    if store.init()? {
        println!("Created {}", store.path().display());
    } else {
        println!("Data file already exists: {}", store.path().display());
    }
    Ok(())
}

async fn cmd_serve(
    settings: &Settings,
    store: Store,
    host: &Option<String>,
    port: &Option<u16>,
) -> Result<()> {
    let config = WebServerConfig {
        host: host.clone().unwrap_or_else(|| settings.server.host.clone()),
        port: port.unwrap_or(settings.server.port),
    };

    println!("Starting web server on {}:{}...", config.host, config.port);
    println!("API endpoints:");
    println!("  http://localhost:{}/api/applications", config.port);
    println!("  http://localhost:{}/api/download-csv", config.port);
    println!("  http://localhost:{}/health", config.port);
    println!("Data file: {}", store.path().display());
    println!();
    println!("Press Ctrl+C to stop");

    run_server(config, store)
        .await
        .map_err(|e| anyhow::anyhow!("Web server error: {}", e))
}

fn cmd_list(store: &Store, json: bool) -> Result<()> {
    let listing = store.read_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Applications ({}):", listing.applications.len());
    for record in listing.applications.iter().rev() {
        print_record(record);
    }
    println!();
    println!("Total points: {}", listing.total_score);
    Ok(())
}

fn print_record(record: &Record) {
    let mut flags = Vec::new();
    if record.is_tailored {
        flags.push("tailored");
    }
    if record.has_referral {
        flags.push("referral");
    }
    println!(
        "  [{}] {} @ {} - {} (+{}){}",
        record.id,
        record.job_title,
        record.company_name,
        record.status,
        record.points_earned,
        if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        }
    );
}

fn cmd_add(store: &Store, input: NewRecord) -> Result<()> {
    let record = store.create(input)?;
    println!("Saved application {} (+{} points)", record.id, record.points_earned);
    Ok(())
}

fn cmd_update(store: &Store, id: &str, patch: &RecordPatch) -> Result<()> {
    let record = store.update(id, patch)?;
    println!("Updated application {}", record.id);
    print_record(&record);
    Ok(())
}

fn cmd_delete(store: &Store, id: &str) -> Result<()> {
    store.delete(id)?;
    println!("Deleted application {}", id);
    Ok(())
}

fn cmd_export(store: &Store, output: Option<&PathBuf>) -> Result<()> {
    let bytes = store.export()?;
    match output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
