use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use artikel_meister::app::{App, ResetTarget};
use artikel_meister::config::Config;

#[derive(Parser)]
#[command(
    name = "artikel-meister",
    version,
    about = "Learn German noun genders and translations with adaptive review"
)]
struct Cli {
    #[arg(short, long, help = "Data directory (overrides config)")]
    data_dir: Option<PathBuf>,

    #[arg(short = 'n', long, help = "Number of translation choices per round")]
    choices: Option<usize>,

    #[arg(long, help = "Ask for translations only, never articles")]
    no_articles: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start a quiz (default)
    Play {
        #[arg(short, long, help = "Stop after this many rounds")]
        rounds: Option<u32>,
    },
    /// Match German words to their translations
    Match {
        #[arg(short, long, help = "Stop after this many matched pairs")]
        pairs: Option<u32>,
    },
    /// Lifetime game statistics
    Stats,
    /// Per-word progress overview
    Progress {
        #[arg(short, long, help = "List every word with its score")]
        verbose: bool,
    },
    /// Manage custom word lists
    Lists {
        #[command(subcommand)]
        action: Option<ListAction>,
    },
    /// Show or change learning settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Write a progress backup
    Export {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Restore progress from a backup
    Import { path: PathBuf },
    /// Clear saved data
    Reset {
        #[arg(value_enum)]
        target: ResetTarget,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// Show saved lists and which are active
    Show,
    /// Save a generated vocabulary file as a new list
    Add {
        path: PathBuf,
        #[arg(short, long, help = "Number of words that were requested")]
        count: Option<usize>,
    },
    Remove { id: String },
    Toggle { id: String },
    /// Include or exclude the built-in words
    BuiltIn,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::default()
    });
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(choices) = cli.choices {
        config.choice_count = choices;
    }
    if cli.no_articles {
        config.guess_articles = false;
    }
    config.validate();

    let filter = EnvFilter::try_from_env("ARTIKEL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut app = App::new(config)?;
    let stdout = io::stdout();

    match cli.command.unwrap_or(Command::Play { rounds: None }) {
        Command::Play { rounds } => {
            app.play(io::stdin().lock(), stdout.lock(), rounds)?;
        }
        Command::Match { pairs } => {
            app.play_matching(io::stdin().lock(), stdout.lock(), pairs)?;
        }
        Command::Stats => app.write_stats(stdout.lock())?,
        Command::Progress { verbose } => app.write_progress(stdout.lock(), verbose)?,
        Command::Lists { action } => match action.unwrap_or(ListAction::Show) {
            ListAction::Show => app.write_lists(stdout.lock())?,
            ListAction::Add { path, count } => {
                let (list, warning) = app.add_list_from_file(&path, count)?;
                if let Some(warning) = warning {
                    eprintln!("{warning}");
                }
                println!(
                    "Saved \"{}\" with {} words as {}",
                    list.name, list.word_count, list.id
                );
            }
            ListAction::Remove { id } => {
                let removed = app.session.remove_custom_list(&id)?;
                println!("Removed \"{}\"", removed.name);
            }
            ListAction::Toggle { id } => {
                let active = app.session.toggle_custom_list(&id)?;
                println!("{id} is now {}", if active { "active" } else { "inactive" });
            }
            ListAction::BuiltIn => {
                let included = app.session.toggle_built_in()?;
                println!(
                    "Built-in words {}",
                    if included { "included" } else { "excluded" }
                );
            }
        },
        Command::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => app.write_settings(stdout.lock())?,
            SettingsAction::Set { key, value } => {
                app.set_setting(&key, &value)?;
                app.write_settings(stdout.lock())?;
            }
        },
        Command::Export { path } => {
            let written = app.export_to(&path)?;
            println!("Exported progress to {}", written.display());
        }
        Command::Import { path } => {
            app.import_from(&path)?;
            println!("Imported progress from {}", path.display());
        }
        Command::Reset { target } => {
            app.reset(target)?;
            println!("Reset {}", format!("{target:?}").to_lowercase());
        }
    }

    Ok(())
}
