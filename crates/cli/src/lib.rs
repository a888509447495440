pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use wardrobe_db::DEFAULT_DEMO_OWNER;

#[derive(Debug, Parser)]
#[command(
    name = "wardrobe",
    about = "Wardrobe operator CLI",
    long_about = "Operate the wardrobe service: inspect configuration, check readiness, apply migrations, seed demo data, and request outfit recommendations.",
    after_help = "Examples:\n  wardrobe doctor --json\n  wardrobe seed --owner demo\n  wardrobe recommend --owner demo --occasion casual --include-coat"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo wardrobe for an owner")]
    Seed {
        #[arg(long, default_value = DEFAULT_DEMO_OWNER, help = "Owner that receives the demo garments")]
        owner: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Generate ranked outfit recommendations from an owner's wardrobe")]
    Recommend(RecommendArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RecommendArgs {
    #[arg(long, help = "Owner whose wardrobe is used")]
    pub owner: String,
    #[arg(long, value_delimiter = ',', help = "Preferred colors, comma separated")]
    pub colors: Vec<String>,
    #[arg(long, help = "casual | formal | sporty | party | work")]
    pub occasion: Option<String>,
    #[arg(long, help = "minimalist | colorful | elegant | modern")]
    pub style: Option<String>,
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Attach a coat when one is available (`=false` turns it off)"
    )]
    pub include_coat: Option<bool>,
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Accept dresses, informational only (`=false` turns it off)"
    )]
    pub include_dress: Option<bool>,
    #[arg(long, help = "any | tshirt | pullover")]
    pub top_preference: Option<String>,
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Layer a pullover over a T-shirt (`=false` turns it off)"
    )]
    pub layered_top: Option<bool>,
    #[arg(long, value_delimiter = ',', help = "Combo keys already shown, comma separated")]
    pub exclude: Vec<String>,
    #[arg(long, help = "Start from the owner's stored preference profile")]
    pub use_profile: bool,
    #[arg(long, help = "Seed for reproducible sampling")]
    pub seed: Option<u64>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { owner } => commands::seed::run(&owner),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Recommend(args) => commands::recommend::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
