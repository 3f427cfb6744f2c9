//! @ai:module:intent CLI entry point for the Puppet manifest parser and linter
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on processor, output, config

use clap::{Parser, Subcommand, ValueEnum};
use puppet_walk::{
    output, processor, Config, Diagnostics, OutputFormat, RenderOptions, Severity,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "puppet-walk")]
#[command(author, version, about = "Puppet tools: parser, linter and module validator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and lint every manifest of a module, then validate the module
    Lint {
        /// Path to a puppet module (must contain files/ and manifests/)
        path: PathBuf,

        /// Name of the puppet module
        module_name: String,

        /// Print the tree of parsed objects
        #[arg(short = 't', long)]
        print_tree: bool,

        /// Only parse for format validating/linting
        #[arg(long)]
        only_parse: bool,

        /// Minimum log level (Debug=1, Info=2, Warning=3, Error=4, Fatal=5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        log_level: Option<u8>,

        /// Skip to the next line after a failed statement rule instead of dropping the rest of the block
        #[arg(long)]
        resync: bool,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Parse a single manifest and show its tree and diagnostics
    Parse {
        /// Path to the manifest
        path: PathBuf,

        /// Minimum log level (Debug=1, Info=2, Warning=3, Error=4, Fatal=5)
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=5))]
        log_level: u8,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env();
    let filter = match "puppet_walk=warn".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Lint {
            path,
            module_name,
            print_tree,
            only_parse,
            log_level,
            resync,
            config,
            format,
        } => {
            let mut config = match config {
                Some(config_path) => match Config::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(2);
                    }
                },
                None => Config::default(),
            };

            config.print_tree |= print_tree;
            config.only_parse |= only_parse;
            config.walk.resync |= resync;
            if let Some(level) = log_level {
                config.log_level = level;
            }

            match processor::process_module(&path, &module_name, &config) {
                Ok(report) => {
                    let options = RenderOptions {
                        threshold: config.threshold(),
                        print_tree: config.print_tree,
                    };
                    print!("{}", output::format_module_report(&report, format.into(), options));

                    if report.passed() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(1)
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Parse {
            path,
            log_level,
            format,
        } => {
            let mut diagnostics = Diagnostics::new();
            let walk = Config::default().walk;

            let file = match processor::process_file(&path, &mut diagnostics, &walk) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(2);
                }
            };

            let failed = diagnostics.entries().iter().any(|d| d.severity >= Severity::Error);

            match OutputFormat::from(format) {
                OutputFormat::Text => {
                    if let Some(file) = &file {
                        print!("{}", output::format_tree(file));
                    }
                    let threshold = Severity::from_level(log_level).unwrap_or_default();
                    print!("{}", output::format_diagnostics(diagnostics.entries(), threshold));
                }
                json => {
                    let value = serde_json::json!({
                        "file": file,
                        "diagnostics": diagnostics.entries(),
                    });
                    let rendered = match json {
                        OutputFormat::JsonPretty => serde_json::to_string_pretty(&value),
                        _ => serde_json::to_string(&value),
                    };
                    println!("{}", rendered.unwrap_or_default());
                }
            }

            if failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
