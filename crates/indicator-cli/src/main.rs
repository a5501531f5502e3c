#![allow(
    clippy::needless_pass_by_value,    // clap hands over owned values
    clippy::unnecessary_wraps,         // consistent Result return for CLI handlers
)]

//! Indicator CLI - ingest indicator report documents
//!
//! Parses the first table of a `.docx` (or `.html`) indicator report,
//! normalizes it and keeps indicators and organizations in a JSON store.

mod config;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use colored::Colorize;
use config::Config;
use indicator_core::view::humanize;
use indicator_core::{
    normalize, Indicator, IndicatorError, IndicatorPatch, IndicatorQuery, IndicatorService,
    JsonFileStore, ParsedRecord, StoreError,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Exit code for a missing indicator or organization.
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
enum OutputFormat {
    /// JSON output (default)
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    fn from_config(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "indicator",
    about = "Ingest indicator report documents",
    long_about = "Parse the first table of an indicator report (.docx or .html),\n\
                  normalize it into a typed indicator and keep it in a JSON store.\n\
                  \n\
                  Defaults can be set via .indicator.toml configuration files.",
    version
)]
struct Args {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress status messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// JSON store file (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Compact JSON output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a document and print its key/value record
    Parse {
        /// Input document (.docx, .html)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the normalized indicator and organization instead
        #[arg(long)]
        normalize: bool,
    },

    /// Parse, normalize and store a document, printing the new indicator id
    Ingest {
        /// Input document (.docx, .html)
        #[arg(value_name = "FILE", required_unless_present = "parsed", conflicts_with = "parsed")]
        input: Option<PathBuf>,

        /// Already-parsed record as a JSON object ("-" reads stdin)
        #[arg(long, value_name = "JSON")]
        parsed: Option<PathBuf>,
    },

    /// Show an indicator with its organization
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List indicators, newest first
    #[command(long_about = "List indicators, newest first, one line per indicator.\n\
                      \n\
                      Passing --format prints the full records instead.")]
    List {
        /// Case-insensitive text matched against short name and description
        #[arg(long, value_name = "TEXT")]
        query: Option<String>,

        /// Thematic area filter (e.g. CLIMATE_CHANGE, or ALL)
        #[arg(long, value_name = "AREA")]
        topic: Option<String>,
    },

    /// Re-derive an indicator from a document, or apply a partial update
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["parsed", "data", "file"])
    ))]
    Update {
        #[arg(value_name = "ID")]
        id: String,

        /// Parsed record JSON to re-derive from ("-" reads stdin)
        #[arg(long, value_name = "JSON")]
        parsed: Option<PathBuf>,

        /// Partial update JSON with camelCase fields ("-" reads stdin)
        #[arg(long, value_name = "JSON")]
        data: Option<PathBuf>,

        /// Document to re-derive from
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Delete an indicator
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Manage configuration settings
    #[command(long_about = "Manage indicator configuration files.\n\
                      \n\
                      Configuration files are loaded in this order (later overrides earlier):\n\
                        1. User config: ~/.indicator.toml\n\
                        2. Project config: ./.indicator.toml\n\
                        3. Command-line arguments")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Create a starter .indicator.toml
    Init {
        /// Create in the home directory instead of the current directory
        #[arg(long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Show the configuration file paths
    Path,
}

/// Settings resolved from flags and config.
struct Session {
    config: Config,
    store_path: PathBuf,
    format: OutputFormat,
    format_requested: bool,
    compact: bool,
    quiet: bool,
}

impl Session {
    fn new(args: &Args, config: Config) -> Self {
        let store_path = args.store.clone().unwrap_or_else(|| config.store_path());
        let format = args
            .format
            .or_else(|| config.output_format().and_then(OutputFormat::from_config))
            .unwrap_or(OutputFormat::Json);
        let compact = args.compact || config.compact();
        Self {
            config,
            store_path,
            format,
            format_requested: args.format.is_some(),
            compact,
            quiet: args.quiet,
        }
    }

    fn service(&self) -> Result<IndicatorService<JsonFileStore>> {
        let store = JsonFileStore::open(&self.store_path)
            .with_context(|| format!("Failed to open store: {}", self.store_path.display()))?;
        Ok(IndicatorService::new(store))
    }

    fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match (self.format, self.compact) {
            (OutputFormat::Json, true) => serde_json::to_string(value)?,
            (OutputFormat::Json, false) => serde_json::to_string_pretty(value)?,
            (OutputFormat::Yaml, _) => serde_yaml::to_string(value)?,
        };
        println!("{}", text.trim_end());
        Ok(())
    }

    fn status(&self, label: &str, message: &str) {
        if !self.quiet {
            eprintln!("{} {message}", label.green().bold());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let (user_config, project_config) = Config::discover_configs();
    let config = Config::merge(user_config, project_config);
    let ctx = Session::new(&args, config);

    if let Err(e) = run(args.command, &ctx) {
        if is_not_found(&e) {
            eprintln!("{} {e}", "Not found:".red().bold());
            std::process::exit(EXIT_NOT_FOUND);
        }
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

/// Whether the error chain bottoms out in a missing record.
fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<IndicatorError>()
            .is_some_and(IndicatorError::is_not_found)
            || cause
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_not_found)
    })
}

fn run(command: Commands, ctx: &Session) -> Result<()> {
    match command {
        Commands::Parse { input, normalize } => parse_command(&input, normalize, ctx),
        Commands::Ingest { input, parsed } => ingest_command(input, parsed, ctx),
        Commands::Show { id } => show_command(&id, ctx),
        Commands::List { query, topic } => list_command(query, topic, ctx),
        Commands::Update {
            id,
            parsed,
            data,
            file,
        } => update_command(&id, parsed, data, file, ctx),
        Commands::Delete { id } => delete_command(&id, ctx),
        Commands::Config { action } => config_command(action, ctx),
        Commands::Completions { shell } => completion_command(shell),
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load a hand-supplied record and canonicalize its labels.
fn load_parsed_record(path: &Path) -> Result<ParsedRecord> {
    let content = read_input(path)?;
    ParsedRecord::from_json(&content)
        .with_context(|| format!("Invalid parsed record: {}", path.display()))
}

fn parse_document(path: &Path) -> Result<ParsedRecord> {
    indicator_backend::parse_file(path)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_command(input: &Path, normalize_record: bool, ctx: &Session) -> Result<()> {
    let record = parse_document(input)?;
    if record.is_empty() {
        log::warn!("No label/value rows found in {}", input.display());
    }
    if normalize_record {
        ctx.print(&normalize(&record))
    } else {
        ctx.print(&record)
    }
}

fn ingest_command(input: Option<PathBuf>, parsed: Option<PathBuf>, ctx: &Session) -> Result<()> {
    let record = match (input, parsed) {
        (_, Some(parsed)) => load_parsed_record(&parsed)?,
        (Some(input), None) => parse_document(&input)?,
        (None, None) => bail!("Either FILE or --parsed is required"),
    };

    let mut service = ctx.service()?;
    let indicator = service.ingest(&record)?;
    ctx.status(
        "Created:",
        &format!("indicator '{}'", indicator.data.short_name),
    );
    println!("{}", indicator.id);
    Ok(())
}

fn show_command(id: &str, ctx: &Session) -> Result<()> {
    let view = ctx.service()?.view(id)?;
    ctx.print(&view)
}

fn list_command(query: Option<String>, topic: Option<String>, ctx: &Session) -> Result<()> {
    let query = IndicatorQuery::parse(query.as_deref(), topic.as_deref())?;
    let indicators = ctx.service()?.search(&query)?;

    if ctx.format_requested {
        return ctx.print(&indicators);
    }
    for indicator in &indicators {
        println!("{}", list_line(indicator));
    }
    if indicators.is_empty() {
        ctx.status("Info:", "no indicators match");
    }
    Ok(())
}

/// `id  date  Status  Short name  (Area, Area)`
fn list_line(indicator: &Indicator) -> String {
    let mut line = format!(
        "{}  {}  {}  {}",
        indicator.id,
        indicator.created_at.format("%Y-%m-%d"),
        humanize(indicator.data.status.as_str()),
        indicator.data.short_name
    );
    let areas: Vec<String> = indicator
        .data
        .thematic_areas
        .iter()
        .map(|area| humanize(area.as_str()))
        .collect();
    if !areas.is_empty() {
        line.push_str(&format!("  ({})", areas.join(", ")));
    }
    line
}

fn update_command(
    id: &str,
    parsed: Option<PathBuf>,
    data: Option<PathBuf>,
    file: Option<PathBuf>,
    ctx: &Session,
) -> Result<()> {
    let mut service = ctx.service()?;
    let indicator = if let Some(data) = data {
        let content = read_input(&data)?;
        let patch = IndicatorPatch::from_json(&content)
            .with_context(|| format!("Invalid update: {}", data.display()))?;
        service.update(id, patch)?
    } else {
        let record = match (parsed, file) {
            (Some(parsed), _) => load_parsed_record(&parsed)?,
            (None, Some(file)) => parse_document(&file)?,
            (None, None) => bail!("One of --parsed, --data or --file is required"),
        };
        service.rederive(id, &record)?
    };

    ctx.status("Updated:", &format!("indicator {}", indicator.id));
    ctx.print(&indicator)
}

fn delete_command(id: &str, ctx: &Session) -> Result<()> {
    ctx.service()?.delete(id)?;
    ctx.status("Deleted:", &format!("indicator {id}"));
    Ok(())
}

fn config_command(action: ConfigAction, ctx: &Session) -> Result<()> {
    match action {
        ConfigAction::Init { global, force } => config_init(global, force, ctx),
        ConfigAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
            }
            Ok(())
        }
        ConfigAction::Path => {
            if let Some(user) = Config::user_config_path() {
                println!("user: {}", user.display());
            }
            println!("project: {}", Config::project_config_path().display());
            Ok(())
        }
    }
}

/// Create a new configuration file with commented defaults
fn config_init(global: bool, force: bool, ctx: &Session) -> Result<()> {
    let config_path = if global {
        Config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
    } else {
        Config::project_config_path()
    };

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::write(&config_path, config::STARTER_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
    ctx.status(
        "Success:",
        &format!("Created configuration file: {}", config_path.display()),
    );
    Ok(())
}

fn completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
