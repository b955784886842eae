use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::core::{DocumentSink, Engine, FsDocumentWriter};

#[derive(Parser)]
#[command(name = "docsynth")]
#[command(about = "Synthesizes Markdown documentation from a source tree")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration and the bundled templates
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing configuration and templates
        #[arg(long)]
        force: bool,
    },

    /// Analyze the source tree and render documentation
    Generate {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory for documentation
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Print the generated payload as JSON
        #[arg(long)]
        emit_json: bool,
    },

    /// Print file analyses and the architecture snapshot as JSON
    Analyze {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => {
                let target = match path {
                    Some(path) => path,
                    None => std::env::current_dir().context("Failed to resolve current directory")?,
                };
                engine.init(&target, force)?;
                Ok(())
            }
            Commands::Generate {
                source,
                output,
                dry_run,
                emit_json,
            } => {
                let output_dir = output.unwrap_or_else(|| engine.config().project.output_dir.clone());
                let payload = engine.generate(source, Some(output_dir.clone())).await?;

                if dry_run {
                    info!("📋 Dry run - {} documents not written", payload.documentation.len());
                    for document in &payload.documentation {
                        info!("  would write {}", document.target_path.display());
                    }
                } else {
                    FsDocumentWriter::new(&output_dir).write(&payload)?;
                }

                if emit_json {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                Ok(())
            }
            Commands::Analyze { source } => {
                let analysis = engine.analyze(source).await?;
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "docsynth", "--verbose", "generate", "--source", "app", "--dry-run", "--emit-json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Generate {
                source,
                output,
                dry_run,
                emit_json,
            } => {
                assert_eq!(source, Some(PathBuf::from("app")));
                assert!(output.is_none());
                assert!(dry_run);
                assert!(emit_json);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["docsynth", "sync"]).is_err());
    }
}
