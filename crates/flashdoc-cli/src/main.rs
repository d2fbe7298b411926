//! Flashdoc CLI

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use flashdoc::{ExtractionConfig, JobRequest, Pipeline, ProgressEvent, dispatch};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Output format for extracted content
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Normalized plain text only
    #[default]
    Text,
    /// The full result as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "flashdoc")]
#[command(about = "Extract clean text from PDFs, Word documents, images and text files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a file
    Extract {
        /// File to extract
        file: PathBuf,

        /// MIME type to use instead of guessing from the extension
        #[arg(short, long)]
        mime: Option<String>,

        /// Configuration file (TOML, YAML or JSON); discovered from the working directory when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum characters of native text for a PDF page to skip OCR
        #[arg(long)]
        threshold: Option<usize>,

        /// OCR languages, joined with '+'
        #[arg(short, long)]
        languages: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Don't print progress to stderr
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the format a file would be extracted as
    Detect {
        /// File to inspect
        file: PathBuf,

        /// MIME type reported for the file
        #[arg(short, long)]
        mime: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            file,
            mime,
            config,
            threshold,
            languages,
            format,
            quiet,
        } => {
            let config = load_config(config.as_deref())?;
            let config = apply_overrides(config, threshold, languages);
            extract(&file, mime, config, format, quiet).await
        }

        Commands::Detect { file, mime } => {
            let name = file_name(&file)?;
            let format = dispatch(mime.as_deref(), name)?;
            println!("{}", format);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    if let Some(path) = path {
        return ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }

    match ExtractionConfig::discover()? {
        Some(config) => {
            tracing::debug!("Using discovered flashdoc.toml");
            Ok(config)
        }
        None => Ok(ExtractionConfig::default()),
    }
}

fn apply_overrides(mut config: ExtractionConfig, threshold: Option<usize>, languages: Option<String>) -> ExtractionConfig {
    if let Some(threshold) = threshold {
        config.min_text_length_per_page = threshold;
    }
    if let Some(languages) = languages {
        config.ocr.languages = languages;
    }
    config
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))
}

async fn extract(path: &Path, mime: Option<String>, config: ExtractionConfig, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut request =
        JobRequest::from_path(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if let Some(mime) = mime {
        request = request.with_declared_type(mime);
    }

    let pipeline = Pipeline::new(config);
    let mut handle = pipeline.submit(request);

    while let Some(event) = handle.next_event().await {
        match event {
            ProgressEvent::Processing { detail } => {
                if !quiet {
                    eprintln!("{}", detail);
                }
            }
            ProgressEvent::Progress {
                percent, phase, detail, ..
            } => {
                if !quiet {
                    eprintln!("[{:>3}%] {}: {}", percent, phase, detail);
                }
            }
            ProgressEvent::Ready { content, .. } => {
                match format {
                    OutputFormat::Text => println!("{}", content.text),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&content)?),
                }
                return Ok(());
            }
            ProgressEvent::Error { kind, message, detail } => {
                if let Some(detail) = detail {
                    tracing::debug!(%kind, detail = %detail, "Extraction failed");
                }
                bail!("{} ({})", message, kind)
            }
            ProgressEvent::Cancelled => bail!("Extraction was cancelled"),
        }
    }

    bail!("Extraction ended without a result")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_extract() {
        let cli = Cli::try_parse_from([
            "flashdoc",
            "extract",
            "notes.pdf",
            "--threshold",
            "40",
            "--languages",
            "eng",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract {
                file,
                threshold,
                languages,
                format,
                ..
            } => {
                assert_eq!(file, PathBuf::from("notes.pdf"));
                assert_eq!(threshold, Some(40));
                assert_eq!(languages.as_deref(), Some("eng"));
                assert!(matches!(format, OutputFormat::Json));
            }
            Commands::Detect { .. } => panic!("expected extract"),
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = apply_overrides(ExtractionConfig::default(), Some(5), Some("eng".to_string()));
        assert_eq!(config.min_text_length_per_page, 5);
        assert_eq!(config.ocr.languages, "eng");

        let untouched = apply_overrides(ExtractionConfig::default(), None, None);
        assert_eq!(untouched.min_text_length_per_page, 20);
        assert_eq!(untouched.ocr.languages, "ind+eng");
    }

    #[test]
    fn test_load_config_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "min_text_length_per_page = 12\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.min_text_length_per_page, 12);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/scan.png")).unwrap(), "scan.png");
    }
}
