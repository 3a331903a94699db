//! remindful CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "remindful",
    version,
    about = "Cued-recall memory screening at the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administer a session
    Run {
        /// Vocabulary file, or a directory to rotate versions from
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Subject identifier recorded with the results
        #[arg(long)]
        subject: Option<String>,

        /// Take replies from a script file instead of the console
        #[arg(long)]
        script: Option<PathBuf>,

        /// Matching during controlled learning: exact, fuzzy
        #[arg(long)]
        matching: Option<String>,

        /// Similarity floor for fuzzy matching (1-100)
        #[arg(long)]
        threshold: Option<u8>,

        /// Interference length in seconds
        #[arg(long)]
        interference_secs: Option<u64>,

        /// Free recall length in seconds
        #[arg(long)]
        free_recall_secs: Option<u64>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, csv, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two session reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Decline threshold on component rates
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if declines found
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate vocabulary TOML files
    Validate {
        /// Path to vocabulary file or directory
        #[arg(long)]
        vocabulary: PathBuf,
    },

    /// List word-list versions and which one runs next
    Versions {
        /// Subject whose history decides the rotation
        #[arg(long)]
        subject: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and standard word lists
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("remindful=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            vocabulary,
            subject,
            script,
            matching,
            threshold,
            interference_secs,
            free_recall_secs,
            output,
            format,
            config,
        } => {
            commands::run::execute(
                vocabulary,
                subject,
                script,
                matching,
                threshold,
                interference_secs,
                free_recall_secs,
                output,
                format,
                config,
            )
            .await
        }
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
        Commands::Validate { vocabulary } => commands::validate::execute(vocabulary),
        Commands::Versions { subject, config } => commands::versions::execute(subject, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
