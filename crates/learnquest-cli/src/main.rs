//! learnquest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "learnquest",
    version,
    about = "Gamified learning progress tracker"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and sample content
    Init,

    /// Validate curriculum and achievement files
    Validate {
        /// Curriculum JSON (defaults to the configured path)
        #[arg(long)]
        curriculum: Option<PathBuf>,

        /// Achievement catalog JSON (defaults to the configured path)
        #[arg(long)]
        achievements: Option<PathBuf>,
    },

    /// Show a learner's progress
    Show {
        /// Learner identity
        #[arg(long, default_value = "default")]
        user: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Erase a learner's progress
    Reset {
        /// Learner identity
        #[arg(long, default_value = "default")]
        user: String,
    },

    /// Log one answered question
    Attempt {
        #[arg(long, default_value = "default")]
        user: String,

        #[arg(long)]
        level: u32,

        /// Question index within the level's quiz
        #[arg(long)]
        question: usize,

        /// The answer was correct
        #[arg(long)]
        correct: bool,

        /// Concept label (defaults to the curriculum's)
        #[arg(long)]
        concept: Option<String>,

        /// beginner, intermediate or advanced (defaults to the curriculum's)
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Submit answers for a level's quiz
    Quiz {
        #[arg(long, default_value = "default")]
        user: String,

        #[arg(long)]
        level: u32,

        /// Comma-separated answers; join multi-select indices with '+' (e.g. "1,0+2,3")
        #[arg(long)]
        answers: String,

        /// Complete the level when the score is good enough
        #[arg(long)]
        proceed: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Mark a level complete
    Complete {
        #[arg(long, default_value = "default")]
        user: String,

        #[arg(long)]
        level: u32,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Take a hint (costs XP)
    Hint {
        #[arg(long, default_value = "default")]
        user: String,
    },

    /// List missed questions to practice
    Practice {
        #[arg(long, default_value = "default")]
        user: String,

        /// Maximum number of questions
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record the result of practicing a missed question
    Practiced {
        #[arg(long, default_value = "default")]
        user: String,

        #[arg(long)]
        level: u32,

        #[arg(long)]
        question: usize,

        /// The practice answer was correct
        #[arg(long)]
        correct: bool,
    },

    /// Show the concepts that most need review
    Weaknesses {
        #[arg(long, default_value = "default")]
        user: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Rank every learner in the store
    Leaderboard {
        /// Number of rows
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnquest=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate {
            curriculum,
            achievements,
        } => commands::validate::execute(curriculum, achievements, config),
        Commands::Show { user, format } => commands::profile::show(user, format, config),
        Commands::Reset { user } => commands::profile::reset(user, config),
        Commands::Attempt {
            user,
            level,
            question,
            correct,
            concept,
            difficulty,
        } => commands::progress::attempt(
            user, level, question, correct, concept, difficulty, config,
        ),
        Commands::Quiz {
            user,
            level,
            answers,
            proceed,
            format,
        } => commands::progress::quiz(user, level, answers, proceed, format, config),
        Commands::Complete {
            user,
            level,
            format,
        } => commands::progress::complete(user, level, format, config),
        Commands::Hint { user } => commands::progress::hint(user, config),
        Commands::Practice {
            user,
            limit,
            format,
        } => commands::practice::list(user, limit, format, config),
        Commands::Practiced {
            user,
            level,
            question,
            correct,
        } => commands::practice::record(user, level, question, correct, config),
        Commands::Weaknesses { user, format } => {
            commands::report::weaknesses(user, format, config)
        }
        Commands::Leaderboard { limit, format } => {
            commands::report::leaderboard(limit, format, config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
