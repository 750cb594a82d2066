//! Document Signer CLI
//!
//! Inspection and configuration front end for the signing library:
//! document classification, preview rendering, sign request validation and
//! configuration management.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use document_signer::{
    classify, ConfigManager, Document, ExportFormat, MimeType, SignRequestBody,
    SignerConfiguration, SignatureProfile, TransformationEngine,
};

#[derive(Parser)]
#[command(name = "document-signer")]
#[command(about = "Prepare documents for XAdES, CAdES and PAdES signing")]
#[command(long_about = "
Document Signer - signing job preparation utility

EXAMPLES:
    # Show how a document will be treated
    document-signer classify form.xml

    # Render a preview through the form's stylesheet
    document-signer preview form.xml --xslt form.xslt

    # Validate a JSON sign request and print the resolved parameters
    document-signer check-request request.json

    # Change the default XAdES digest
    document-signer config set default_digest_algorithm.xades SHA384

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a document by its mime type
    Classify {
        /// Document to classify
        file: PathBuf,
        /// Declared mime type (guessed from the extension by default)
        #[arg(short, long)]
        mime: Option<String>,
    },

    /// Render the human-readable preview of a document
    Preview {
        /// Document to preview
        file: PathBuf,
        /// Stylesheet used for XML documents
        #[arg(short, long)]
        xslt: Option<PathBuf>,
        /// Declared mime type (guessed from the extension by default)
        #[arg(short, long)]
        mime: Option<String>,
    },

    /// Validate a JSON sign request
    CheckRequest {
        /// Request body file
        file: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import configuration
    Import {
        /// Configuration file to import
        file: PathBuf,
        /// Import format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },
}

#[derive(ValueEnum, Clone)]
enum ExportFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new().into_diagnostic()?,
    };

    match cli.command {
        Commands::Classify { file, mime } => {
            let document = load_document(&file, mime.as_deref())?;
            println!("{}: {} ({})", file.display(), classify(&document), document.mime_type());
        }

        Commands::Preview { file, xslt, mime } => {
            let config = config_manager.load_or_create_default().into_diagnostic()?;
            handle_preview_command(&config, &file, xslt, mime.as_deref())?;
        }

        Commands::CheckRequest { file } => {
            let config = config_manager.load_or_create_default().into_diagnostic()?;
            handle_check_request_command(&config, &file)?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

fn load_document(file: &Path, mime: Option<&str>) -> Result<Document> {
    let document = Document::from_file(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load {}", file.display()))?;

    Ok(match mime {
        Some(mime) => {
            let mut overridden = Document::new(document.content().to_vec(), MimeType::parse(mime));
            if let Some(name) = document.filename() {
                overridden = overridden.with_filename(name);
            }
            overridden
        }
        None => document,
    })
}

fn handle_preview_command(
    config: &SignerConfiguration,
    file: &Path,
    xslt: Option<PathBuf>,
    mime: Option<&str>,
) -> Result<()> {
    let document = load_document(file, mime)?;
    let stylesheet = match xslt {
        Some(path) => Some(
            std::fs::read_to_string(&path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read stylesheet {}", path.display()))?,
        ),
        None => None,
    };

    let preview = TransformationEngine::default()
        .render_preview(&document, stylesheet.as_deref(), &config.preview_encoding)
        .into_diagnostic()?;
    println!("{preview}");
    Ok(())
}

fn handle_check_request_command(config: &SignerConfiguration, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let request = SignRequestBody::from_json(&json).into_diagnostic()?;
    let defaults = config.resolver_defaults().into_diagnostic()?;
    let (document, parameters) = request.into_job_inputs(&defaults).into_diagnostic()?;

    println!("Request is valid:");
    println!("  Document: {} ({} bytes)", document.mime_type(), document.len());
    println!("  Class: {}", classify(&document));
    println!("  Family: {}", parameters.family());
    println!("  Level: {}", parameters.profile.level().as_str());
    if let SignatureProfile::Xades(p) = &parameters.profile {
        println!("  Packaging: {:?}", p.packaging);
    } else if let SignatureProfile::Cades(p) = &parameters.profile {
        println!("  Packaging: {:?}", p.packaging);
    }
    if let Some(container) = parameters.container() {
        println!("  Container: {}", container.mime_type());
    }
    println!("  Digest: {}", parameters.digest_algorithm);
    if let Some(xdc) = &parameters.data_container {
        println!("  Data container: {} (version {})", xdc.identifier, xdc.effective_version());
    }
    if let Some(output) = &parameters.transformation_output_mime_type {
        println!("  Preview output: {output}");
    }
    Ok(())
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                println!("Current Configuration:");
                let digest = &config.default_digest_algorithm;
                println!(
                    "  Digest algorithms: XAdES {}, CAdES {}, PAdES {}",
                    digest.xades, digest.cades, digest.pades
                );
                println!("  Default level: {}", config.default_level);
                println!("  Default container: {}", config.default_container);
                println!("  Preview encoding: {}", config.preview_encoding);
                println!("  Visualization width: {}", config.visualization_width);
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(_) => {
                println!("No configuration file found. Use 'config init' to create one.");
            }
        },

        ConfigCommands::Init => {
            config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "Configuration initialized: {}",
                config_manager.config_path().display()
            );
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }

        ConfigCommands::Import { file, format } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            config_manager
                .import_config(&content, format.into())
                .into_diagnostic()?;
            println!("Configuration imported from: {}", file.display());
        }
    }

    Ok(())
}
