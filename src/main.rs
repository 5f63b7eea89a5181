use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shuati_tracker::commands::{self, AppState, AuthMode, AuthOutcome, DashboardDto, SolveForm};
use shuati_tracker::config::Config;
use shuati_tracker::error::AppError;
use shuati_tracker::models::Difficulty;
use shuati_tracker::utils;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const NOTES_PREVIEW_CHARS: usize = 40;

#[derive(Parser)]
#[command(name = "shuati-tracker", version, about = "Log coding-practice solves and track your streak")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Log a solved problem
    Log {
        /// Problem slug or URL, e.g. two-sum
        slug: String,
        #[arg(short, long, default_value = "Easy")]
        difficulty: Difficulty,
        #[arg(short, long, default_value_t = 20, allow_negative_numbers = true)]
        minutes: i64,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Show stats and recent solves
    Dashboard {
        /// Reference day for the streak, defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Delete a logged solve by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    utils::init_logger(level, Some(&utils::log_path())).context("Failed to initialize logging")?;

    let state = AppState::from_config(&config).context("Failed to initialize backend")?;
    run(cli.command, &state).await
}

async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Signup { email, password } => {
            let password = password_or_prompt(password)?;
            let outcome = commands::submit_credentials(AuthMode::SignUp, email, password, state)
                .await
                .map_err(|e| anyhow!(e))?;
            if let AuthOutcome::SignedUp(message) = outcome {
                println!("{}", message);
            }
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let outcome = commands::submit_credentials(AuthMode::LogIn, email, password, state)
                .await
                .map_err(|e| anyhow!(e))?;
            if let AuthOutcome::SignedIn(user) = outcome {
                println!("Logged in as: {}", user.email);
            }
        }
        Command::Logout => {
            commands::sign_out(state).await.map_err(|e| anyhow!(e))?;
            println!("Logged out.");
        }
        Command::Whoami => match commands::current_user(state).await.map_err(|e| anyhow!(e))? {
            Some(user) => println!("{} ({})", user.email, user.id),
            None => println!("Not logged in."),
        },
        Command::Log {
            slug,
            difficulty,
            minutes,
            date,
            notes,
        } => {
            let mut form = SolveForm::new(utils::today());
            form.slug = slug;
            form.difficulty = difficulty;
            form.minutes_spent = minutes;
            if let Some(date) = date {
                form.solved_date = date;
            }
            form.notes = notes;

            let saved = commands::log_solve(&mut form, state)
                .await
                .map_err(redirect_if_signed_out)?;
            println!("{}", commands::SAVED_MESSAGE);
            println!(
                "{}  {}  {}  {} min  (id {})",
                saved.solved_date, saved.problem_slug, saved.difficulty, saved.minutes_spent, saved.id
            );
        }
        Command::Dashboard { as_of } => {
            let view = commands::load_dashboard(state)
                .await
                .map_err(redirect_if_signed_out)?;
            print_dashboard(&view.to_dto(as_of.unwrap_or_else(utils::today)));
        }
        Command::Delete { id } => {
            let mut view = commands::load_dashboard(state)
                .await
                .map_err(redirect_if_signed_out)?;
            let deleted = view.delete_row(&id, state).await;
            print_dashboard(&view.to_dto(utils::today()));
            deleted.map_err(|e| anyhow!(e))?;
        }
    }

    Ok(())
}

/// 未登录时提示先登录
fn redirect_if_signed_out(message: String) -> anyhow::Error {
    if message == AppError::NotAuthenticated.to_string() {
        anyhow!("Not logged in. Run `shuati-tracker login --email <EMAIL>` first.")
    } else {
        anyhow!(message)
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

fn print_dashboard(dashboard: &DashboardDto) {
    println!("Dashboard");
    println!("Logged in as: {}", dashboard.email);
    println!();

    for card in &dashboard.cards {
        println!("  {:<22} {}", card.label, card.value);
    }

    println!();
    println!("Recent solves");

    if let Some(message) = &dashboard.message {
        println!("  {}", message);
    }

    if dashboard.entries.is_empty() {
        if dashboard.message.is_none() {
            println!("  No entries yet. Add one with `shuati-tracker log <slug>`.");
        }
        return;
    }

    println!(
        "  {:<10}  {:<32}  {:<10}  {:>7}  {:<36}  Notes",
        "Date", "Problem", "Difficulty", "Minutes", "Id"
    );
    for entry in &dashboard.entries {
        let notes = entry
            .notes
            .as_deref()
            .map(|n| utils::notes_preview(n, NOTES_PREVIEW_CHARS))
            .unwrap_or_default();
        println!(
            "  {:<10}  {:<32}  {:<10}  {:>7}  {:<36}  {}",
            entry.solved_date, entry.problem_slug, entry.difficulty, entry.minutes_spent, entry.id, notes
        );
    }
}
