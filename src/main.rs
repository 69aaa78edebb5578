use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nahcloud::config::Config;
use nahcloud::nah::http::error_hint;
use nahcloud::resource::{self, Target, Verb};
use nahcloud::NahClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the NahCloud API
#[derive(Parser, Debug)]
#[command(name = "nah", version, about, long_about = None)]
struct Args {
    /// API endpoint (falls back to NAH_ENDPOINT, then the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API token (falls back to NAH_TOKEN, then the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage compute instances
    Instance {
        /// Project for new instances (or pass project_id in --data)
        #[arg(long)]
        project: Option<String>,
        #[command(subcommand)]
        action: Action,
    },
    /// Manage metadata entries
    Metadata {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage storage buckets
    Bucket {
        #[command(subcommand)]
        action: Action,
    },
    /// Manage objects inside a bucket
    Object {
        /// Bucket that holds the object
        #[arg(short, long)]
        bucket: String,
        #[command(subcommand)]
        action: Action,
    },
    /// List the resource types and their fields
    Types,
    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Command-line name of the resource a command manages
    fn resource_name(&self) -> Option<&'static str> {
        match self {
            Command::Project { .. } => Some("project"),
            Command::Instance { .. } => Some("instance"),
            Command::Metadata { .. } => Some("metadata"),
            Command::Bucket { .. } => Some("bucket"),
            Command::Object { .. } => Some("object"),
            Command::Types | Command::Config { .. } => None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the saved configuration (the token is masked)
    Show,
    /// Save settings to the config file; an empty value clears the setting
    Set {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Create a new entity from a JSON payload
    Create {
        /// JSON object, or @path to read it from a file
        #[arg(long)]
        data: String,
    },
    /// Fetch one or more entities by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Update the fields given in the JSON payload, leaving the rest untouched
    Update {
        id: String,
        /// JSON object, or @path to read it from a file
        #[arg(long)]
        data: String,
    },
    /// Delete an entity
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("nah started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("nah").join("nah.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".nah").join("nah.log");
    }
    PathBuf::from("nah.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();

    if let Command::Config { action } = &args.command {
        let value = run_config(&mut config, action)?;
        println!("{}", render(&value, args.output)?);
        return Ok(());
    }

    let client_config = config.client_config(
        args.endpoint.as_deref(),
        args.token.as_deref(),
        args.timeout,
    );

    tracing::info!("Using endpoint: {}", client_config.endpoint);

    // Ctrl-C aborts whatever request is in flight
    let cancel = CancellationToken::new();
    let client = NahClient::from_config(&client_config)
        .context("Failed to configure NahCloud client")?
        .with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight requests");
            cancel.cancel();
        }
    });

    match run(&client, &args.command).await {
        Ok(Value::Null) => Ok(()),
        Ok(value) => {
            println!("{}", render(&value, args.output)?);
            Ok(())
        }
        Err(err) => {
            if let Some(hint) = err.downcast_ref::<nahcloud::Error>().and_then(error_hint) {
                eprintln!("Hint: {}", hint);
            }
            Err(err)
        }
    }
}

async fn run(client: &NahClient, command: &Command) -> Result<Value> {
    let (parent, action) = match command {
        Command::Project { action }
        | Command::Metadata { action }
        | Command::Bucket { action } => (None, action),
        Command::Instance { project, action } => (project.as_deref(), action),
        Command::Object { bucket, action } => (Some(bucket.as_str()), action),
        Command::Types => return Ok(describe_types()),
        Command::Config { .. } => anyhow::bail!("config commands do not call the API"),
    };
    let resource_key = command
        .resource_name()
        .and_then(resource::resolve_resource_key)
        .with_context(|| format!("No resource type registered for {:?}", command))?;

    let target = |id: Option<&str>| Target {
        id: id.map(str::to_string),
        parent: parent.map(str::to_string),
    };

    match action {
        Action::Create { data } => {
            let params = parse_data(data)?;
            resource::execute(client, resource_key, Verb::Create, &target(None), &params)
                .await
                .with_context(|| format!("Failed to create {}", resource_key))
        }
        Action::Get { ids } => {
            let fetches = ids.iter().map(|id| {
                let target = target(Some(id.as_str()));
                async move {
                    resource::execute(client, resource_key, Verb::Get, &target, &Value::Null)
                        .await
                        .with_context(|| format!("Failed to get {} {}", resource_key, id))
                }
            });
            let mut items = futures::future::try_join_all(fetches).await?;

            if items.len() == 1 {
                Ok(items.remove(0))
            } else {
                Ok(Value::Array(items))
            }
        }
        Action::Update { id, data } => {
            let params = parse_data(data)?;
            resource::execute(client, resource_key, Verb::Update, &target(Some(id.as_str())), &params)
                .await
                .with_context(|| format!("Failed to update {} {}", resource_key, id))
        }
        Action::Delete { id } => {
            resource::execute(
                client,
                resource_key,
                Verb::Delete,
                &target(Some(id.as_str())),
                &Value::Null,
            )
            .await
            .with_context(|| format!("Failed to delete {} {}", resource_key, id))?;
            eprintln!("Deleted {} {}", resource_key, id);
            Ok(Value::Null)
        }
    }
}

/// Apply a `config` subcommand; `set` persists to the default config file
fn run_config(config: &mut Config, action: &ConfigAction) -> Result<Value> {
    if let ConfigAction::Set {
        endpoint,
        token,
        timeout_secs,
    } = action
    {
        apply_config_set(config, endpoint.as_deref(), token.as_deref(), *timeout_secs);
        config.save().context("Failed to save configuration")?;
        if let Some(path) = Config::config_path() {
            eprintln!("Saved {}", path.display());
        }
    }
    Ok(describe_config(config))
}

fn apply_config_set(
    config: &mut Config,
    endpoint: Option<&str>,
    token: Option<&str>,
    timeout_secs: Option<u64>,
) {
    let setting = |value: &str| Some(value.to_string()).filter(|v| !v.trim().is_empty());
    if let Some(endpoint) = endpoint {
        config.endpoint = setting(endpoint);
    }
    if let Some(token) = token {
        config.token = setting(token);
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = Some(secs).filter(|s| *s > 0);
    }
}

fn describe_config(config: &Config) -> Value {
    json!({
        "endpoint": config.endpoint,
        "token": config.token.as_ref().map(|_| "********"),
        "timeout_secs": config.timeout_secs,
    })
}

/// Parse a `--data` argument: inline JSON, or `@path` to a JSON file
fn parse_data(data: &str) -> Result<Value> {
    let content = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path))?,
        None => data.to_string(),
    };
    serde_json::from_str(&content).context("Payload is not valid JSON")
}

fn describe_types() -> Value {
    let types: Vec<Value> = resource::get_all_resource_keys()
        .into_iter()
        .filter_map(|key| resource::get_resource(key).map(|def| (key, def)))
        .map(|(key, def)| {
            let fields: Vec<Value> = def
                .fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "required": f.required,
                        "computed": f.computed,
                        "force_new": f.force_new,
                        "default": f.default,
                        "description": f.description,
                    })
                })
                .collect();
            json!({
                "type": key,
                "command": def.cli_name,
                "display_name": def.display_name,
                "collection": def.collection,
                "parent_field": def.parent_field,
                "description": def.description,
                "fields": fields,
            })
        })
        .collect();
    Value::Array(types)
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}
