use clap::{Parser, Subcommand};
use keepgoing_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "keepgoing")]
#[command(about = "Daily exercise routine and streak tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    date: Option<DateKey>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up your routine for the first time
    Onboard {
        /// Exercise as NAME=TARGET, e.g. "Push-ups=15" or "Plank=30s@yoga"
        #[arg(long = "exercise", required = true)]
        exercises: Vec<ExerciseArg>,
    },

    /// Show today's routine (default)
    Today,

    /// Check an exercise off for today, or un-check it
    Done {
        /// Exercise id, position (1-based) or name
        exercise: String,

        /// Accept a target increase if one is offered
        #[arg(long, conflicts_with = "skip")]
        accept: bool,

        /// Decline a target increase if one is offered
        #[arg(long, conflicts_with = "accept")]
        skip: bool,
    },

    /// Add an exercise to the end of the routine
    Add {
        name: String,
        target: String,

        /// Mark as a yoga exercise
        #[arg(long)]
        yoga: bool,

        /// Keep the target as text even if it is a number
        #[arg(long)]
        label: bool,
    },

    /// Change an exercise's name, target or type
    Edit {
        /// Exercise id, position (1-based) or name
        exercise: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        target: Option<String>,

        /// Make it a yoga exercise
        #[arg(long, conflicts_with = "weights")]
        yoga: bool,

        /// Make it a weights exercise
        #[arg(long, conflicts_with = "yoga")]
        weights: bool,

        /// Keep the new target as text even if it is a number
        #[arg(long, requires = "target")]
        label: bool,
    },

    /// Remove an exercise from the routine
    Remove {
        /// Exercise id, position (1-based) or name
        exercise: String,
    },

    /// Move an exercise to a new position (1-based)
    Move {
        /// Exercise id, position (1-based) or name
        exercise: String,
        position: usize,
    },

    /// Show current streaks
    Streak,
}

/// `NAME=TARGET` with an optional `@yoga` / `@weights` suffix
#[derive(Clone, Debug)]
struct ExerciseArg {
    name: String,
    target: String,
    kind: ExerciseKind,
}

impl FromStr for ExerciseArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, rest) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected NAME=TARGET, got '{}'", s))?;

        let (target, kind) = match rest.rsplit_once('@') {
            Some((target, kind)) => (target, kind.parse().map_err(|e: Error| e.to_string())?),
            None => (rest, ExerciseKind::Weights),
        };

        Ok(Self {
            name: name.to_string(),
            target: target.to_string(),
            kind,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        keepgoing_core::logging::init_with_level("debug");
    } else {
        keepgoing_core::logging::init();
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = JsonFileStore::in_dir(&data_dir);
    let today = cli.date.unwrap_or_else(keepgoing_core::today);
    tracing::debug!("Using data directory {:?}, today is {}", data_dir, today);

    match cli.command {
        Some(Commands::Onboard { exercises }) => cmd_onboard(&store, exercises),
        Some(Commands::Today) | None => cmd_today(&store, today),
        Some(Commands::Done {
            exercise,
            accept,
            skip,
        }) => {
            let answer = match (accept, skip) {
                (true, _) => Some(PromptResponse::Accept),
                (_, true) => Some(PromptResponse::Skip),
                _ => None,
            };
            cmd_done(&store, &exercise, today, answer, &config)
        }
        Some(Commands::Add {
            name,
            target,
            yoga,
            label,
        }) => cmd_add(&store, &name, &target, yoga, label),
        Some(Commands::Edit {
            exercise,
            name,
            target,
            yoga,
            weights,
            label,
        }) => {
            let kind = match (yoga, weights) {
                (true, _) => Some(ExerciseKind::Yoga),
                (_, true) => Some(ExerciseKind::Weights),
                _ => None,
            };
            cmd_edit(&store, &exercise, name, target, kind, label)
        }
        Some(Commands::Remove { exercise }) => cmd_remove(&store, &exercise),
        Some(Commands::Move { exercise, position }) => cmd_move(&store, &exercise, position),
        Some(Commands::Streak) => cmd_streak(&store, today),
    }
}

fn cmd_onboard(store: &JsonFileStore, exercises: Vec<ExerciseArg>) -> Result<()> {
    let drafts = exercises
        .iter()
        .map(|e| ExerciseDraft::new(&e.name, Target::parse(&e.target), e.kind))
        .collect::<Result<Vec<_>>>()?;

    let count = store.update(|data| {
        if data.onboarded {
            return Err(Error::Other(
                "Routine already set up - use `keepgoing add` or `keepgoing edit`".into(),
            ));
        }
        complete_onboarding(data, drafts)?;
        Ok(data.exercises.len())
    })?;

    println!("✓ Routine created with {} exercises. Let's go!", count);
    Ok(())
}

fn cmd_today(store: &JsonFileStore, today: DateKey) -> Result<()> {
    let data = load_onboarded(store)?;
    display_board(&daily_board(&data, today));
    Ok(())
}

fn cmd_done(
    store: &JsonFileStore,
    selector: &str,
    today: DateKey,
    answer: Option<PromptResponse>,
    config: &Config,
) -> Result<()> {
    let policy = config.progression_policy();

    let (name, outcome) = store.update(|data| {
        let id = require_onboarded(data).and_then(|_| resolve_exercise(data, selector))?;
        let outcome = toggle_exercise(data, &id, today, &policy)?;
        let name = data.exercise(&id).map(|e| e.name.clone()).unwrap_or(id);
        Ok((name, outcome))
    })?;

    if outcome.completed {
        println!("✓ {} done", name);
        if outcome.streak > 0 {
            println!("  🔥 {} day streak", outcome.streak);
        }
    } else {
        println!("○ {} marked not done", name);
    }

    if let Some(prompt) = outcome.prompt {
        display_prompt(&prompt);

        let response = match (&prompt.offer, answer) {
            (PromptOffer::Acknowledge, _) => {
                if answer.is_none() {
                    wait_for_enter()?;
                }
                PromptResponse::Skip
            }
            (_, Some(response)) => response,
            (_, None) => prompt_user_response()?,
        };

        // Applied to whatever target is stored now, not the one shown above
        let new_target = store.update(|data| resolve_prompt(data, &prompt, response, &policy))?;

        match (&prompt.offer, new_target) {
            (_, Some(to)) => {
                println!("\n✓ {} target is now {}", prompt.exercise_name, to);
            }
            (PromptOffer::Increase { .. }, None) => {
                println!("\nNo problem - ask again at the next milestone.");
            }
            (PromptOffer::Acknowledge, None) => {}
        }
    }

    if outcome.routine_complete {
        println!();
        println!("🎉 All done!");
        if outcome.overall_streak > 0 {
            println!("   🔥 {} day streak!", outcome.overall_streak);
        }
    }

    Ok(())
}

fn cmd_add(store: &JsonFileStore, name: &str, target: &str, yoga: bool, label: bool) -> Result<()> {
    let kind = if yoga {
        ExerciseKind::Yoga
    } else {
        ExerciseKind::Weights
    };
    let draft = ExerciseDraft::new(name, parse_target(target, label), kind)?;

    let added = store.update(|data| {
        if !data.onboarded {
            return Err(Error::NotOnboarded);
        }
        Ok(add_exercise(data, draft).clone())
    })?;

    println!("✓ Added {} ({}) at position {}", added.name, added.target, added.order + 1);
    Ok(())
}

fn cmd_edit(
    store: &JsonFileStore,
    selector: &str,
    name: Option<String>,
    target: Option<String>,
    kind: Option<ExerciseKind>,
    label: bool,
) -> Result<()> {
    let patch = ExercisePatch {
        name,
        target: target.map(|t| parse_target(&t, label)),
        kind,
    };

    let updated = store.update(|data| {
        let id = require_onboarded(data).and_then(|_| resolve_exercise(data, selector))?;
        update_exercise(data, &id, patch)?;
        data.exercise(&id)
            .cloned()
            .ok_or(Error::UnknownExercise(id))
    })?;

    println!("✓ Updated {}: {} ({})", updated.name, updated.target, updated.kind);
    Ok(())
}

fn cmd_remove(store: &JsonFileStore, selector: &str) -> Result<()> {
    let removed = store.update(|data| {
        let id = require_onboarded(data).and_then(|_| resolve_exercise(data, selector))?;
        remove_exercise(data, &id)
    })?;

    println!("✓ Removed {}", removed.name);
    Ok(())
}

fn cmd_move(store: &JsonFileStore, selector: &str, position: usize) -> Result<()> {
    let name = store.update(|data| {
        let id = require_onboarded(data).and_then(|_| resolve_exercise(data, selector))?;
        move_exercise(data, &id, position.saturating_sub(1))?;
        Ok(data.exercise(&id).map(|e| e.name.clone()).unwrap_or(id))
    })?;

    println!("✓ Moved {}", name);
    Ok(())
}

fn cmd_streak(store: &JsonFileStore, today: DateKey) -> Result<()> {
    let data = load_onboarded(store)?;
    let board = daily_board(&data, today);

    println!("Overall: {} day streak", board.overall_streak);
    for row in &board.rows {
        println!("  {:<24} {}", row.name, row.streak);
    }
    Ok(())
}

fn load_onboarded(store: &JsonFileStore) -> Result<AppData> {
    let data = store.load();
    require_onboarded(&data)?;
    Ok(data)
}

fn require_onboarded(data: &AppData) -> Result<()> {
    if data.onboarded {
        Ok(())
    } else {
        Err(Error::NotOnboarded)
    }
}

fn parse_target(input: &str, label: bool) -> Target {
    if label {
        Target::label(input)
    } else {
        Target::parse(input)
    }
}

/// Find an exercise by id, 1-based position, or case-insensitive name
fn resolve_exercise(data: &AppData, selector: &str) -> Result<String> {
    let selector = selector.trim();

    if let Some(exercise) = data.exercise(selector) {
        return Ok(exercise.id.clone());
    }

    if let Ok(position) = selector.parse::<usize>() {
        if let Some(exercise) = position.checked_sub(1).and_then(|i| data.exercises.get(i)) {
            return Ok(exercise.id.clone());
        }
    }

    data.exercises
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(selector))
        .map(|e| e.id.clone())
        .ok_or_else(|| Error::UnknownExercise(selector.to_string()))
}

fn display_board(board: &DailyBoard) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY · {}", board.date.date().format("%A, %b %-d"));
    println!("╰─────────────────────────────────────────╯");

    if board.overall_streak > 0 {
        println!("  🔥 {} day streak", board.overall_streak);
    }
    println!();

    for (i, row) in board.rows.iter().enumerate() {
        let check = if row.completed { "[x]" } else { "[ ]" };
        let kind = match row.kind {
            ExerciseKind::Yoga => " (yoga)",
            ExerciseKind::Weights => "",
        };
        let streak = if row.streak > 0 {
            format!("🔥 {}", row.streak)
        } else {
            String::new()
        };
        println!(
            "  {} {}. {:<24} {:<8} {}",
            check,
            i + 1,
            format!("{}{}", row.name, kind),
            row.target.to_string(),
            streak
        );
    }

    println!();
    println!("  {} of {} completed", board.completed_count, board.total);
    if board.all_done() {
        println!("  ✓ Complete!");
    }
    println!();
}

fn display_prompt(prompt: &StreakPrompt) {
    println!();
    println!("💪 Nice work!");
    println!(
        "You've hit a {}-day streak on {}!",
        prompt.streak, prompt.exercise_name
    );

    match prompt.offer {
        PromptOffer::Increase { from, to } => {
            println!("Want to bump up your reps from {} to {}?", from, to);
        }
        PromptOffer::Acknowledge => {
            println!("Keep pushing! You can change your target with `keepgoing edit`.");
        }
    }
}

fn prompt_user_response() -> Result<PromptResponse> {
    print!("'y' + Enter to accept, Enter for not yet > ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let response = match input.trim().to_lowercase().as_str() {
        "y" | "yes" => PromptResponse::Accept,
        _ => PromptResponse::Skip,
    };

    Ok(response)
}

fn wait_for_enter() -> Result<()> {
    print!("Press Enter > ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}
