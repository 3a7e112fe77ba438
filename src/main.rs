//! Recovery Journal command-line front end.
//!
//! Each invocation runs one command against the data directory and prints
//! its notices. Storage failures exit non-zero.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use recovery_journal::commands::{analytics, entries, fields, Artifact, ArtifactResponder, NoticeSink};
use recovery_journal::config;
use recovery_journal::core_state::CoreState;
use recovery_journal::db::DatabaseError;
use recovery_journal::metrics;
use recovery_journal::models::NoticeLevel;

/// Command-line arguments for recovery-journal
#[derive(Parser, Debug)]
#[command(name = "recovery-journal")]
#[command(about = "Private health journal with trend charts and PDF reports")]
#[command(version)]
struct Cli {
    /// Data directory holding fields_config.json, journal.db and exports/
    #[arg(short, long, env = config::DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the data directory, default fields and database
    Init,
    /// Print every entry
    List,
    /// Per-field mean, minimum and maximum
    Stats,
    /// Add an entry from FIELD=VALUE pairs
    Add {
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_pair)]
        values: Vec<(String, String)>,
    },
    /// Change the given fields of the entry at INDEX; other fields keep their values
    Edit {
        index: usize,
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_pair)]
        values: Vec<(String, String)>,
    },
    /// Delete the entry at INDEX
    Delete { index: usize },
    /// Manage the field configuration
    #[command(subcommand)]
    Fields(FieldsCommand),
    /// Render every applicable chart as PNG
    Graphs {
        /// Output directory (default: <data-dir>/graphs)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Write the PDF report into <data-dir>/exports
    Export,
}

#[derive(Subcommand, Debug)]
enum FieldsCommand {
    List,
    Add(FieldArgs),
    /// Change label, type, required flag or bounds; the name is fixed
    Edit {
        name: String,
        #[command(flatten)]
        field: FieldArgs,
    },
    Remove { name: String },
    /// Restore the default field set
    Reset,
}

#[derive(Args, Debug)]
struct FieldArgs {
    /// Display label
    #[arg(short, long)]
    label: String,
    /// Field name (derived from the label when omitted)
    #[arg(short, long)]
    name: Option<String>,
    /// date, number, text or textarea
    #[arg(short = 't', long = "type", default_value = "text")]
    field_type: String,
    #[arg(long)]
    required: bool,
    #[arg(long)]
    min: Option<i64>,
    #[arg(long)]
    max: Option<i64>,
}

impl FieldArgs {
    fn into_form(self) -> HashMap<String, String> {
        let mut form = HashMap::new();
        form.insert("field_label".to_string(), self.label);
        form.insert("field_name".to_string(), self.name.unwrap_or_default());
        form.insert("field_type".to_string(), self.field_type);
        if self.required {
            form.insert("field_required".to_string(), "on".to_string());
        }
        if let Some(min) = self.min {
            form.insert("field_min".to_string(), min.to_string());
        }
        if let Some(max) = self.max {
            form.insert("field_max".to_string(), max.to_string());
        }
        form
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

// ─── Console collaborators ───

#[derive(Default)]
struct Console {
    failed: bool,
}

impl NoticeSink for Console {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Success => println!("{message}"),
            NoticeLevel::Warning => eprintln!("warning: {message}"),
            NoticeLevel::Danger => {
                self.failed = true;
                eprintln!("error: {message}");
            }
        }
    }
}

impl ArtifactResponder for Console {
    fn deliver(&mut self, artifact: &Artifact) {
        println!("{} written to {}", artifact.file_name, artifact.path.display());
    }
}

fn main() -> ExitCode {
    recovery_journal::init_tracing();
    let cli = Cli::parse();

    let state = match cli.data_dir {
        Some(dir) => CoreState::new(dir),
        None => CoreState::from_env(),
    };
    info!(
        "{} v{} data dir: {}",
        config::APP_NAME,
        config::APP_VERSION,
        state.data_dir().display()
    );

    let mut console = Console::default();
    match run(&state, cli.command, &mut console) {
        Ok(()) if console.failed => ExitCode::FAILURE,
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(state: &CoreState, command: Command, console: &mut Console) -> Result<(), DatabaseError> {
    match command {
        Command::Init => {
            if state.initialize()? {
                console.success(format!("Initialized {}", state.data_dir().display()));
            } else {
                console.success(format!("Already initialized: {}", state.data_dir().display()));
            }
        }
        Command::List => {
            let listing = entries::list_entries(state, console)?;
            let names: Vec<&str> = listing.schema.names().collect();
            println!("#\t{}", names.join("\t"));
            for (index, record) in listing.entries.iter().enumerate() {
                let row: Vec<String> = names.iter().map(|n| record.text(n)).collect();
                println!("{index}\t{}", row.join("\t"));
            }
        }
        Command::Stats => {
            let listing = entries::list_entries(state, console)?;
            for row in metrics::summary_statistics(&listing.entries, &listing.schema) {
                println!(
                    "{}\tmean {}\tmin {}\tmax {}",
                    row.label,
                    row.mean_display(),
                    row.min_display(),
                    row.max_display()
                );
            }
        }
        Command::Add { values } => {
            let form: HashMap<String, String> = values.into_iter().collect();
            entries::add_entry(state, &form, console)?;
        }
        Command::Edit { index, values } => {
            let form: HashMap<String, String> = values.into_iter().collect();
            entries::patch_entry(state, index, &form, console)?;
        }
        Command::Delete { index } => {
            entries::delete_entry(state, index, console)?;
        }
        Command::Fields(sub) => run_fields(state, sub, console)?,
        Command::Graphs { out } => {
            let Some(set) = analytics::generate_graphs(state, console)? else {
                return Ok(());
            };
            let out = out.unwrap_or_else(|| state.data_dir().join("graphs"));
            std::fs::create_dir_all(&out)?;
            for (i, chart) in set.charts.iter().enumerate() {
                let path = out.join(format!("{:02}_{}.png", i + 1, chart.id.slug()));
                std::fs::write(&path, &chart.png)?;
                println!("{}\t{}", chart.title, path.display());
            }
            console.success(format!(
                "{} charts from {} entries",
                set.charts.len(),
                set.entry_count
            ));
        }
        Command::Export => {
            let now = chrono::Local::now().naive_local();
            let mut delivered: Vec<Artifact> = Vec::new();
            analytics::export_report(state, now, console, &mut delivered)?;
            for artifact in &delivered {
                console.deliver(artifact);
            }
        }
    }
    Ok(())
}

fn run_fields(state: &CoreState, command: FieldsCommand, console: &mut Console) -> Result<(), DatabaseError> {
    match command {
        FieldsCommand::List => {
            for field in fields::list_fields(state)?.fields() {
                let bounds = match (field.min(), field.max()) {
                    (None, None) => String::new(),
                    (min, max) => format!(
                        " [{}..{}]",
                        min.map(|v| v.to_string()).unwrap_or_default(),
                        max.map(|v| v.to_string()).unwrap_or_default()
                    ),
                };
                println!(
                    "{}\t{}\t{}{}{}",
                    field.name,
                    field.label,
                    field.field_type,
                    if field.required { " required" } else { "" },
                    bounds
                );
            }
        }
        FieldsCommand::Add(args) => {
            fields::add_field(state, &args.into_form(), console)?;
        }
        FieldsCommand::Edit { name, field } => {
            fields::edit_field(state, &name, &field.into_form(), console)?;
        }
        FieldsCommand::Remove { name } => {
            fields::remove_field(state, &name, console)?;
        }
        FieldsCommand::Reset => {
            fields::reset_fields(state, console)?;
        }
    }
    Ok(())
}
