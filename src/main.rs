//! cashmere CLI: signifier middleware for hypermedia multi-agent systems.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};

use cashmere::config::CashmereConfig;
use cashmere::middleware::{Middleware, RefreshOutcome};

#[derive(Parser)]
#[command(name = "cashmere", version, about = "Signifier middleware for hypermedia MAS")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Turtle file signifiers are loaded from and saved to.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest execution plans and print the touched signifier IRIs.
    Ingest {
        /// Plan JSON files, ingested in order.
        #[arg(required = true)]
        plans: Vec<PathBuf>,
    },

    /// Print stored signifiers as Turtle.
    Signifiers {
        /// Print only this signifier.
        #[arg(long)]
        iri: Option<String>,
    },

    /// Index Thing Descriptions from files and list their actions.
    Actions {
        /// Description to index, as ARTIFACT_URI=PATH. Repeatable.
        #[arg(long = "td", value_parser = parse_td_arg)]
        descriptions: Vec<(String, PathBuf)>,

        /// Artifact whose actions to print. Without it, known artifacts are listed.
        #[arg(long)]
        artifact: Option<String>,

        /// Print structured JSON instead of Turtle.
        #[arg(long)]
        json: bool,
    },

    /// Fetch one artifact's description over HTTP and print its actions.
    Fetch {
        artifact_uri: String,

        /// Print structured JSON instead of Turtle.
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored signifier.
    Reset,
}

fn parse_td_arg(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    let (uri, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ARTIFACT_URI=PATH, got \"{raw}\""))?;
    if uri.is_empty() || path.is_empty() {
        return Err(format!("expected ARTIFACT_URI=PATH, got \"{raw}\""));
    }
    Ok((uri.to_string(), PathBuf::from(path)))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CashmereConfig::load(path)?,
        None => CashmereConfig::default(),
    };
    let snapshot = cli.snapshot.clone().or_else(|| config.snapshot_path.clone());
    let mw = Middleware::new(config);

    if let Some(path) = &snapshot {
        load_snapshot(&mw, path)?;
    }

    match cli.command {
        Commands::Ingest { plans } => {
            for path in &plans {
                let text = std::fs::read_to_string(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to read plan {}", path.display()))?;
                let touched = mw.ingest_plan(&text)?;
                for iri in touched {
                    println!("{iri}");
                }
            }
            if let Some(path) = &snapshot {
                save_snapshot(&mw, path)?;
            }
        }

        Commands::Signifiers { iri } => match iri {
            Some(iri) => match mw.signifier_turtle(&iri) {
                Some(turtle) => println!("{turtle}"),
                None => println!("# no signifier {iri}"),
            },
            None => println!("{}", mw.signifiers_turtle()),
        },

        Commands::Actions {
            descriptions,
            artifact,
            json,
        } => {
            let mut batch = Vec::with_capacity(descriptions.len());
            for (uri, path) in descriptions {
                let text = std::fs::read_to_string(&path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to read description {}", path.display()))?;
                batch.push((uri, text));
            }
            for ((uri, _), result) in batch.iter().zip(mw.index_descriptions(&batch)) {
                if let Err(e) = result {
                    eprintln!("skipping {uri}: {e}");
                }
            }

            match artifact {
                Some(uri) => print_actions(&mw, &uri, json)?,
                None => {
                    let uris = mw.known_artifact_uris();
                    if uris.is_empty() {
                        println!("No artifacts with environment actions.");
                    }
                    for uri in uris {
                        println!("{uri}");
                    }
                }
            }
        }

        Commands::Fetch { artifact_uri, json } => {
            let source = mw.http_source();
            match mw.refresh_artifact(&artifact_uri, &source)? {
                RefreshOutcome::Indexed(_) => print_actions(&mw, &artifact_uri, json)?,
                RefreshOutcome::Removed => println!("# {artifact_uri} no longer exists"),
            }
        }

        Commands::Reset => {
            mw.reset();
            if let Some(path) = &snapshot {
                if path.exists() {
                    std::fs::remove_file(path)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("failed to remove {}", path.display()))?;
                }
            }
            println!("All signifiers deleted.");
        }
    }

    Ok(())
}

fn print_actions(mw: &Middleware, artifact_uri: &str, json: bool) -> Result<()> {
    if json {
        let actions = mw.actions_for(artifact_uri).unwrap_or_default();
        let text = serde_json::to_string_pretty(&actions).into_diagnostic()?;
        println!("{text}");
    } else {
        match mw.action_affordances(artifact_uri) {
            Some(turtle) => println!("{turtle}"),
            None => println!("# no environment actions for {artifact_uri}"),
        }
    }
    Ok(())
}

fn load_snapshot(mw: &Middleware, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read snapshot {}", path.display()))?;
    mw.load_signifiers(&text)?;
    Ok(())
}

fn save_snapshot(mw: &Middleware, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let turtle = mw.try_signifiers_turtle()?;
    std::fs::write(path, turtle)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to write snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(())
}
