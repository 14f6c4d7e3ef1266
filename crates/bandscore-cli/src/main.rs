//! bandscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "bandscore",
    version,
    about = "Grade IELTS-style practice tests and convert scores to bands"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one submission against an exam file
    Grade {
        /// Exam document (.json or .toml)
        #[arg(long)]
        exam: PathBuf,

        /// Submission document (.json or .toml)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Omit the band score
        #[arg(long)]
        no_band: bool,
    },

    /// Grade a directory of submissions against the configured exam store
    Batch {
        /// Directory of submission documents
        #[arg(long)]
        submissions: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Max concurrent submissions (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Extra report format besides JSON: json, html, markdown
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Validate exam files
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// List known question types
    Types {
        /// Filter to one section: listening, reading, writing
        #[arg(long)]
        section: Option<String>,
    },

    /// Convert a percentage to a band score
    Band {
        /// Percentage of correct answers (0-100)
        percentage: f64,
    },

    /// List exams in the configured store
    Exams {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored graded submissions for an exam
    History {
        /// Exam id
        #[arg(long)]
        exam: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, an example exam and a submission
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "bandscore=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            exam,
            answers,
            format,
            output,
            no_band,
        } => commands::grade::execute(exam, answers, format, output, no_band),
        Commands::Batch {
            submissions,
            config,
            parallelism,
            format,
        } => commands::batch::execute(submissions, config, parallelism, format).await,
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Types { section } => commands::types::execute(section),
        Commands::Band { percentage } => commands::band::execute(percentage),
        Commands::Exams { config } => commands::exams::list(config).await,
        Commands::History { exam, config } => commands::exams::history(exam, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
