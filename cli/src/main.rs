//! OpenSASE Forms CLI
//!
//! Command-line access to the forms rule engine, working on local JSON or
//! YAML files.
//!
//! # Usage
//!
//! ```bash
//! opensase-forms stable-keys --form contact.json
//! opensase-forms resolve --form contact.json --data submission.json email name
//! opensase-forms evaluate --form contact.json --data submission.json --rules rules.yaml
//! opensase-forms render --form contact.json --data submission.json --template "Hi {{name}}"
//! opensase-forms dispatch --form contact.json --data submission.json \
//!     --rules rules.yaml --templates templates.yaml --format json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod input;
mod output;

#[derive(Parser)]
#[command(name = "opensase-forms")]
#[command(author = "OpenSASE")]
#[command(version)]
#[command(about = "OpenSASE Forms rule engine", long_about = None)]
struct Cli {
    /// Engine config file (defaults to ~/.opensase/forms.toml)
    #[arg(long, short, env = "OPENSASE_FORMS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Form definition and submission data shared by most commands
#[derive(clap::Args)]
pub struct SubmissionArgs {
    /// Form definition (a form object or a bare field list)
    #[arg(long)]
    form: PathBuf,

    /// Submission data (flat object of field id to value)
    #[arg(long)]
    data: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stable key of every field, assigning missing ones
    StableKeys {
        /// Form definition
        #[arg(long)]
        form: PathBuf,

        /// Write the form back with the assigned keys
        #[arg(long)]
        write: bool,
    },
    /// Resolve logical keys against a submission
    Resolve {
        #[command(flatten)]
        input: SubmissionArgs,

        /// Logical keys to resolve
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Evaluate email rules against a submission
    Evaluate {
        #[command(flatten)]
        input: SubmissionArgs,

        /// Email rules file
        #[arg(long)]
        rules: PathBuf,
    },
    /// Interpolate a template against a submission
    Render {
        #[command(flatten)]
        input: SubmissionArgs,

        /// Template text
        #[arg(long, conflicts_with = "template_file", required_unless_present = "template_file")]
        template: Option<String>,

        /// Read the template text from a file
        #[arg(long)]
        template_file: Option<PathBuf>,
    },
    /// Show which fields are visible for a (partial) submission
    Visibility {
        #[command(flatten)]
        input: SubmissionArgs,
    },
    /// Run the full dispatch pipeline and print the outgoing emails
    Dispatch {
        #[command(flatten)]
        input: SubmissionArgs,

        /// Email rules file
        #[arg(long)]
        rules: PathBuf,

        /// Email templates file
        #[arg(long)]
        templates: PathBuf,
    },
    /// Manage engine configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to ~/.opensase/forms.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match config::load(cli.config.as_deref()) {
        Ok(engine_config) => match cli.command {
            Commands::StableKeys { form, write } => {
                commands::stable_keys::handle(&form, write, cli.format)
            }
            Commands::Resolve { input, keys } => {
                commands::resolve::handle(&input, &keys, &engine_config, cli.format)
            }
            Commands::Evaluate { input, rules } => {
                commands::evaluate::handle(&input, &rules, &engine_config, cli.format)
            }
            Commands::Render {
                input,
                template,
                template_file,
            } => commands::render::handle(&input, template, template_file.as_deref(), &engine_config),
            Commands::Visibility { input } => {
                commands::visibility::handle(&input, &engine_config, cli.format)
            }
            Commands::Dispatch {
                input,
                rules,
                templates,
            } => {
                commands::dispatch::handle(&input, &rules, &templates, engine_config, cli.format)
                    .await
            }
            Commands::Config { action } => {
                commands::config::handle(action, cli.config.as_deref(), &engine_config, cli.format)
            }
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
