//! Consensus Swipe - pass-the-device group decision CLI.
//!
//! One line per action. Participants take turns on the same terminal,
//! approving or rejecting titles until everyone has approved the same one.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{info, warn};

use consensus_swipe::adapters::catalog::{StaticCatalog, TmdbCatalog, TmdbConfig};
use consensus_swipe::adapters::storage::FileHistoryStore;
use consensus_swipe::application::{
    arm_celebration_timer, EngineSettings, SessionEngine, SharedEngine,
};
use consensus_swipe::config::{AppConfig, CatalogConfig};
use consensus_swipe::domain::foundation::{Direction, SessionStatus};
use consensus_swipe::domain::session::{
    MatchResolution, RateOutcome, SessionError, SessionSummary, TurnOutcome,
};
use consensus_swipe::ports::ContentSupplier;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add(String),
    Remove(String),
    Start,
    Rate(Direction),
    EndTurn,
    Resolve(MatchResolution),
    ReplaySame,
    ReplayNew,
    Reset,
    Status,
    Summary,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "add" | "remove" if rest.is_empty() => {
                return Err(format!("usage: {} <name>", word));
            }
            "add" => Command::Add(rest.to_string()),
            "remove" => Command::Remove(rest.to_string()),
            "start" => Command::Start,
            "yes" | "y" => Command::Rate(Direction::Approve),
            "no" | "n" => Command::Rate(Direction::Reject),
            "end" | "next" => Command::EndTurn,
            "done" => Command::Resolve(MatchResolution::Finish),
            "keep" => Command::Resolve(MatchResolution::KeepLooking),
            "back" => Command::Resolve(MatchResolution::GoBack),
            "replay" => Command::ReplaySame,
            "new" => Command::ReplayNew,
            "reset" => Command::Reset,
            "status" | "" => Command::Status,
            "summary" => Command::Summary,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

const HELP: &str = "\
setup:     add <name> | remove <name> | start
swiping:   yes | no | end
match:     done | keep | back
afterward: replay | new | reset
anytime:   status | summary | help | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let supplier = build_supplier(&config.catalog);
    let history = Arc::new(FileHistoryStore::new(&config.storage.history_path));
    info!(
        supplier = supplier.name(),
        history_path = %config.storage.history_path.display(),
        "Consensus swipe ready"
    );

    let settings = EngineSettings::from(&config.session);
    let engine: SharedEngine = Arc::new(Mutex::new(SessionEngine::new(supplier, history, settings)));

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&engine, command).await,
            Err(message) => println!("{}", message),
        }
    }
    Ok(())
}

fn build_supplier(config: &CatalogConfig) -> Arc<dyn ContentSupplier> {
    let Some(key) = config.tmdb_api_key.as_ref().filter(|_| config.has_tmdb()) else {
        return Arc::new(StaticCatalog::new());
    };

    let tmdb = TmdbConfig::new(key.clone())
        .with_base_url(&config.tmdb_base_url)
        .with_image_base_url(&config.image_base_url)
        .with_timeout(config.timeout())
        .with_mix(config.movie_count, config.tv_count, config.trending_count);

    match TmdbCatalog::new(tmdb) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            warn!(error = %e, "TMDB catalog unavailable, using the built-in catalog");
            Arc::new(StaticCatalog::new())
        }
    }
}

async fn run(engine: &SharedEngine, command: Command) {
    let mut guard = engine.lock().await;
    let mut matched = false;
    let result = match command {
        Command::Add(name) => guard.add_participant(&name).map(|_| ()),
        Command::Remove(name) => {
            let found = guard
                .session()
                .participants()
                .iter()
                .find(|p| p.has_name(&name))
                .map(|p| p.id);
            match found {
                Some(id) => guard.remove_participant(id).map(|_| ()),
                None => {
                    println!("no participant named '{}'", name);
                    Ok(())
                }
            }
        }
        Command::Start => guard.start_session().await,
        Command::Rate(direction) => {
            let current = guard.current_item().map(|item| item.id.clone());
            match current {
                Some(item_id) => {
                    let outcome = guard.rate(&item_id, direction).await;
                    outcome.map(|outcome| {
                        if let RateOutcome::Matched(item) = outcome {
                            announce_match(&item.title);
                            matched = true;
                        }
                    })
                }
                None => {
                    println!("nothing left in this queue, type 'end' to pass the device");
                    Ok(())
                }
            }
        }
        Command::EndTurn => {
            let outcome = guard.end_turn().await;
            outcome.map(|outcome| match outcome {
                TurnOutcome::Matched(item) => {
                    announce_match(&item.title);
                    matched = true;
                }
                TurnOutcome::RoundExhausted => println!("No title won everyone over this round."),
                TurnOutcome::NextParticipant(_) => {}
            })
        }
        Command::Resolve(resolution) => guard.resolve_celebration(resolution),
        Command::ReplaySame => guard.replay_same_participants().await,
        Command::ReplayNew => {
            guard.replay_new_participants();
            Ok(())
        }
        Command::Reset => {
            guard.reset_session();
            Ok(())
        }
        Command::Status | Command::Quit => Ok(()),
        Command::Summary => {
            if !guard.summary_visible() {
                print_summary(&guard.summary());
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
    };

    if let Err(e) = result {
        println!("{}", describe(&e));
    }
    if guard.summary_visible() {
        print_summary(&guard.summary());
    }
    print_status(&guard);
    guard.take_events();
    drop(guard);

    if matched {
        watch_celebration(engine).await;
    }
}

fn announce_match(title: &str) {
    println!("🎉 It's a match: {}", title);
    println!("done | keep | back");
}

/// Arms the auto-finish timer and prints the summary if it fires.
async fn watch_celebration(engine: &SharedEngine) {
    let Some(handle) = arm_celebration_timer(engine).await else {
        return;
    };
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        if let Ok(true) = handle.await {
            println!("Celebration over.");
            print_summary(&engine.lock().await.summary());
        }
    });
}

fn describe(error: &SessionError) -> String {
    match error {
        SessionError::NotEnoughParticipants { required, actual } => {
            format!("need at least {} participants, have {}", required, actual)
        }
        other => other.to_string(),
    }
}

fn print_status(engine: &SessionEngine) {
    match engine.status() {
        SessionStatus::Setup => {
            let names: Vec<&str> = engine
                .session()
                .participants()
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            println!("[setup] participants: {}", names.join(", "));
        }
        SessionStatus::Swiping => {
            let who = engine
                .active_participant()
                .map(|p| p.name.as_str())
                .unwrap_or("?");
            match engine.current_item() {
                Some(item) => println!(
                    "[{}] {} ({}) - {} left",
                    who,
                    item.title,
                    item.summary_line(),
                    engine.remaining_in_queue()
                ),
                None => println!("[{}] queue finished, type 'end'", who),
            }
        }
        SessionStatus::Completed => match engine.session().matched_item() {
            Some(item) => println!("[completed] match: {}", item.title),
            None => println!("[completed] no match"),
        },
    }
}

fn print_summary(summary: &SessionSummary) {
    println!("── Session {} ──", summary.session_id);
    if let Some(item) = &summary.matched_item {
        println!("Match: {} ({})", item.title, item.summary_line());
    }
    println!(
        "{} ratings: {} yes, {} no",
        summary.total_ratings, summary.approvals, summary.rejections
    );
    for p in &summary.participants {
        println!(
            "  {}: {} rated, {:.0}% yes",
            p.name, p.total, p.approval_percentage
        );
    }
    for (rank, entry) in summary.top_items.iter().enumerate() {
        println!(
            "  #{} {} ({} approvals)",
            rank + 1,
            entry.item.title,
            entry.approvals
        );
    }
}
