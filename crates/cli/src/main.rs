use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use otodb_lookup_core::classify::QueryClassifier;
use otodb_lookup_core::config::{config_path, load_config, load_config_from, save_config, AppConfig};
use otodb_lookup_core::envelope::LookupEnvelope;
use otodb_lookup_core::resolve::MetadataResolver;

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "otodb-lookup")]
#[command(about = "Resolve video references to otodb metadata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ~/.config/otodb-lookup/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which platform and id a query refers to
    Classify {
        /// Platform id or URL
        query: String,
    },

    /// Look up metadata for a query
    Resolve {
        /// Platform id or URL
        query: String,

        /// Print the XML document (takes precedence over --json)
        #[arg(long)]
        xml: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Classify { query } => run_classify(query, cli.config.as_deref(), cli.json),
        Commands::Resolve { query, xml } => run_resolve(query, *xml, cli.config.as_deref(), cli.json).await,
        Commands::Config { action } => run_config(action, cli.config.as_deref(), cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error + Send + Sync>> {
    match explicit {
        Some(path) => Ok(load_config_from(path)?),
        None => Ok(load_config()),
    }
}

fn run_classify(query: &str, config: Option<&Path>, json: bool) -> CliResult {
    let cfg = resolve_config(config)?;
    let classifier = QueryClassifier::new().with_soundcloud(cfg.classifier.soundcloud);
    let reference = classifier
        .classify(query)
        .ok_or_else(|| format!("Unrecognized query: {}", query))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reference)?);
    } else {
        println!("{}", reference);
        println!("{}", reference.watch_url());
    }
    Ok(())
}

async fn run_resolve(query: &str, xml: bool, config: Option<&Path>, json: bool) -> CliResult {
    let cfg = resolve_config(config)?;
    let resolver = MetadataResolver::from_config(&cfg)?;
    let resolution = resolver.resolve(Some(query)).await;
    tracing::debug!(outcome = resolution.outcome.message(), "resolved query");
    let envelope = LookupEnvelope::from(&resolution);

    if xml {
        println!("{}", envelope.to_xml()?);
        return Ok(());
    }
    if json {
        println!("{}", envelope.to_json_pretty()?);
        return Ok(());
    }

    println!("{}", envelope.message);
    if let Some(reference) = &envelope.parsed_query {
        println!("  Parsed:    {}", reference);
    }
    if let Some(data) = &envelope.data {
        println!("  Title:     {}", data.title);
        println!("  Thumbnail: {}", data.thumbnail);
        println!("  URL:       {}", data.url);
        match data.otodb_id {
            Some(id) => println!("  otodb id:  {}", id),
            None => println!("  otodb id:  none (platform fallback)"),
        }
    }
    Ok(())
}

fn run_config(action: &ConfigAction, config: Option<&Path>, json: bool) -> CliResult {
    let path = match config {
        Some(p) => Some(p.to_path_buf()),
        None => config_path(),
    };
    match action {
        ConfigAction::Init { force } => {
            let path = path.ok_or("Could not determine config directory")?;
            if path.exists() && !force {
                return Err(format!("Config already exists: {} (use --force to overwrite)", path.display()).into());
            }
            save_config(&AppConfig::default(), &path)?;
            if json {
                println!("{}", serde_json::json!({ "path": path.display().to_string() }));
            } else {
                println!("Wrote: {}", path.display());
            }
        }
        ConfigAction::Show => {
            let cfg = resolve_config(config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else {
                print!("{}", cfg.to_toml()?);
            }
        }
        ConfigAction::Path => match path {
            Some(p) if json => println!("{}", serde_json::json!({ "path": p.display().to_string() })),
            Some(p) => println!("{}", p.display()),
            None => return Err("Could not determine config directory".into()),
        },
    }
    Ok(())
}
