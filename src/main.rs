use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use court_captain::config::AppConfig;
use court_captain::models::{
    Actor, Availability, AvailabilityStatus, EntityId, Game, GameStatus, MatchOutcome, PairSlot,
    Phase, Player, PreferredSide, Role, RoundKind, SetScore,
};
use court_captain::recording::{MatchRecorder, RecordingError, ResultSubmission};
use court_captain::scoring::{aggregate_outcomes, is_valid_set, resolve_match};
use court_captain::storage::{JsonlStore, RecordStore, StorageConfig};

#[derive(Parser)]
#[command(name = "court-captain")]
#[command(about = "Match scoring and points engine for a club padel team")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a set score is a valid final score
    CheckSet { own: u32, opponent: u32 },

    /// Resolve a pair's match from its set scores (e.g. 6-2 3-6 7-6)
    Resolve {
        #[arg(num_args = 2..=3, required = true)]
        sets: Vec<SetScore>,
    },

    /// Compute team points for a game
    Points {
        /// Phase label (e.g. "Liga de Clubes", "Meia Final", "Treino")
        #[arg(long)]
        phase: Phase,

        /// One pair's outcome as sets won-lost (repeatable)
        #[arg(long = "outcome")]
        outcomes: Vec<MatchOutcome>,

        #[arg(long)]
        no_show: bool,

        /// Points entered by hand for tournament games
        #[arg(long, allow_negative_numbers = true)]
        manual: Option<i32>,
    },

    /// Add a squad member
    AddPlayer {
        name: String,

        /// Federation ranking points
        #[arg(long, default_value_t = 0)]
        points: u32,

        #[arg(long, value_enum, default_value_t = RoleArg::Player)]
        role: RoleArg,

        #[arg(long, value_enum, default_value_t = SideArg::Both)]
        side: SideArg,

        /// Explicit player ID (derived from the name by default)
        #[arg(long)]
        id: Option<String>,

        /// Admin assigning a role other than player
        #[arg(long)]
        actor: Option<String>,
    },

    /// Update a player's federation ranking points
    SetPoints {
        #[arg(long)]
        player: String,

        #[arg(long)]
        actor: String,

        points: u32,
    },

    /// Change a player's role (admins only)
    SetRole {
        #[arg(long)]
        player: String,

        #[arg(long)]
        actor: String,

        #[arg(value_enum)]
        role: RoleArg,
    },

    /// Remove a player from the active roster
    Deactivate {
        #[arg(long)]
        player: String,

        #[arg(long)]
        actor: String,
    },

    /// Return a player to the active roster
    Activate {
        #[arg(long)]
        player: String,

        #[arg(long)]
        actor: String,
    },

    /// Create a draft game
    CreateGame {
        /// Round number (0 for training, 999 for tournaments)
        #[arg(long)]
        round: u32,

        /// Date and time, RFC 3339 (e.g. 2025-11-08T15:00:00Z)
        #[arg(long)]
        date: DateTime<Utc>,

        #[arg(long)]
        opponent: String,

        #[arg(long)]
        location: String,

        /// Phase label, defaults to the first phase allowed for the round
        #[arg(long)]
        phase: Option<Phase>,

        #[arg(long)]
        actor: String,
    },

    /// Answer the availability call for a game
    Respond {
        #[arg(long)]
        game: String,

        #[arg(long)]
        player: String,

        #[arg(value_enum)]
        status: ResponseArg,
    },

    /// Suggest balanced pairs from the confirmed players
    SuggestPairs {
        #[arg(long)]
        game: String,

        /// Store the suggestion as the game's pairs
        #[arg(long, requires = "actor")]
        accept: bool,

        #[arg(long)]
        actor: Option<String>,
    },

    /// Store a hand-picked pair composition
    ComposePairs {
        #[arg(long)]
        game: String,

        #[arg(long)]
        actor: String,

        /// Pair as two player IDs separated by a comma (repeatable)
        #[arg(long = "pair", required = true)]
        pairs: Vec<String>,
    },

    /// Record results from a JSON submission file and conclude the game
    Record {
        #[arg(long)]
        game: String,

        #[arg(long)]
        actor: String,

        #[arg(long)]
        input: PathBuf,
    },

    /// Open or close the availability call, or cancel a game
    Transition {
        #[arg(long)]
        game: String,

        #[arg(long)]
        actor: String,

        #[arg(value_enum)]
        action: TransitionArg,
    },

    /// Show the result totals of a game
    Summary {
        #[arg(long)]
        game: String,
    },

    /// Show availability counts and available players for a game
    Availability {
        #[arg(long)]
        game: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Player,
    Captain,
    Coordinator,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Player => Role::Player,
            RoleArg::Captain => Role::Captain,
            RoleArg::Coordinator => Role::Coordinator,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
    Both,
}

impl From<SideArg> for PreferredSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => PreferredSide::Left,
            SideArg::Right => PreferredSide::Right,
            SideArg::Both => PreferredSide::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ResponseArg {
    Confirmed,
    Unavailable,
    Maybe,
    NoResponse,
}

impl From<ResponseArg> for AvailabilityStatus {
    fn from(arg: ResponseArg) -> Self {
        match arg {
            ResponseArg::Confirmed => AvailabilityStatus::Confirmed,
            ResponseArg::Unavailable => AvailabilityStatus::Unavailable,
            ResponseArg::Maybe => AvailabilityStatus::Maybe,
            ResponseArg::NoResponse => AvailabilityStatus::NoResponse,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TransitionArg {
    OpenCall,
    CloseCall,
    Cancel,
}

impl From<TransitionArg> for GameStatus {
    fn from(arg: TransitionArg) -> Self {
        match arg {
            TransitionArg::OpenCall => GameStatus::CallOpen,
            TransitionArg::CloseCall => GameStatus::CallClosed,
            TransitionArg::Cancel => GameStatus::Cancelled,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::debug!("Starting court-captain v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());
    let store = JsonlStore::new(StorageConfig::new(data_dir));
    let recorder = MatchRecorder::new(&store, &config.scoring);

    match cli.command {
        Commands::CheckSet { own, opponent } => {
            let score = SetScore::new(own, opponent);
            if is_valid_set(own, opponent) {
                println!("{} is a valid set score", score);
            } else {
                println!("{} is not a valid set score", score);
            }
        }

        Commands::Resolve { sets } => {
            let outcome = resolve_match(sets[0], sets[1], sets.get(2).copied())?;
            print_json(&outcome)?;
        }

        Commands::Points {
            phase,
            outcomes,
            no_show,
            manual,
        } => {
            let points = config
                .scoring
                .points
                .team_points(phase, &outcomes, no_show, manual)?;
            match points {
                Some(points) => {
                    let total = aggregate_outcomes(&outcomes);
                    println!(
                        "{} ({}-{} in sets): {} points",
                        phase, total.sets_won, total.sets_lost, points
                    );
                }
                None => println!("{}: no points awarded", phase),
            }
        }

        Commands::AddPlayer {
            name,
            points,
            role,
            side,
            id,
            actor,
        } => {
            let actor = actor.map(|a| resolve_actor(&store, &a)).transpose()?;
            let mut player = Player::new(name, points)
                .with_role(role.into())
                .with_side(side.into());
            if let Some(id) = id {
                player = player.with_id(id);
            }
            let player = match recorder.register_player(actor.as_ref(), player) {
                Err(RecordingError::PlayerExists(id)) => {
                    bail!("Player {} already exists, pass --id to add a namesake", id)
                }
                other => other?,
            };
            print_json(&player)?;
        }

        Commands::SetPoints {
            player,
            actor,
            points,
        } => {
            let actor = resolve_actor(&store, &actor)?;
            let player = recorder.set_federation_points(&actor, &EntityId::from(player), points)?;
            print_json(&player)?;
        }

        Commands::SetRole {
            player,
            actor,
            role,
        } => {
            let actor = resolve_actor(&store, &actor)?;
            let player = recorder.set_role(&actor, &EntityId::from(player), role.into())?;
            print_json(&player)?;
        }

        Commands::Deactivate { player, actor } => {
            let actor = resolve_actor(&store, &actor)?;
            let player = recorder.deactivate_player(&actor, &EntityId::from(player))?;
            println!("{} is no longer in the active roster", player.name);
        }

        Commands::Activate { player, actor } => {
            let actor = resolve_actor(&store, &actor)?;
            let player = recorder.activate_player(&actor, &EntityId::from(player))?;
            println!("{} is back in the active roster", player.name);
        }

        Commands::CreateGame {
            round,
            date,
            opponent,
            location,
            phase,
            actor,
        } => {
            let actor = resolve_actor(&store, &actor)?;
            let options = RoundKind::from_round_number(round).phase_options();
            let phase = match phase {
                Some(phase) if options.contains(&phase) => phase,
                Some(phase) => bail!(
                    "Phase {} is not available for {}",
                    phase,
                    RoundKind::from_round_number(round).name()
                ),
                None => options[0],
            };

            let game = recorder.create_game(&actor, Game::new(round, date, opponent, location, phase))?;
            print_json(&game)?;
        }

        Commands::Respond {
            game,
            player,
            status,
        } => {
            let game_id = EntityId::from(game);
            if store.game(&game_id)?.is_none() {
                bail!("Game not found: {}", game_id);
            }
            let player = resolve_actor(&store, &player)?;
            let answer = Availability::new(game_id, player.player_id, status.into());
            store.save_availability(&answer)?;
            print_json(&answer)?;
        }

        Commands::SuggestPairs {
            game,
            accept,
            actor,
        } => {
            let game_id = EntityId::from(game);
            match actor {
                Some(actor) if accept => {
                    let actor = resolve_actor(&store, &actor)?;
                    print_json(&recorder.accept_suggestions(&actor, &game_id)?)?;
                }
                _ => print_json(&recorder.suggest_pairs(&game_id)?)?,
            }
        }

        Commands::ComposePairs { game, actor, pairs } => {
            let actor = resolve_actor(&store, &actor)?;
            let slots: Vec<PairSlot> = pairs.iter().map(|p| parse_slot(p)).collect();
            let confirmation = recorder.compose_pairs(&actor, &EntityId::from(game), &slots)?;
            print_json(&confirmation)?;
        }

        Commands::Record { game, actor, input } => {
            let actor = resolve_actor(&store, &actor)?;
            let submission = read_submission(&input)?;
            let confirmation =
                recorder.record_results(&actor, &EntityId::from(game), &submission)?;
            print_json(&confirmation)?;
        }

        Commands::Transition {
            game,
            actor,
            action,
        } => {
            let actor = resolve_actor(&store, &actor)?;
            let game = recorder.transition(&actor, &EntityId::from(game), action.into())?;
            println!("Game {} is now {}", game.id, game.status);
        }

        Commands::Summary { game } => {
            print_json(&recorder.summary(&EntityId::from(game))?)?;
        }

        Commands::Availability { game } => {
            let game_id = EntityId::from(game);
            let summary = recorder.availability_summary(&game_id)?;
            println!(
                "Confirmed: {}  Maybe: {}  Unavailable: {}  No response: {}  (total {})",
                summary.confirmed,
                summary.maybe,
                summary.unavailable,
                summary.no_response,
                summary.total
            );

            for player in recorder.available_players(&game_id)? {
                println!("  {} ({} pts)", player.name, player.federation_points);
            }
        }
    }

    Ok(())
}

/// Look up a roster member and return their capability.
fn resolve_actor(store: &JsonlStore, id: &str) -> Result<Actor> {
    store
        .player(&EntityId::from(id))?
        .map(|p| p.as_actor())
        .with_context(|| format!("Unknown player: {}", id))
}

/// "A,B" is a full pair, "A," or ",B" a half-filled slot.
fn parse_slot(raw: &str) -> PairSlot {
    let (first, second) = raw.split_once(',').unwrap_or((raw, ""));
    let part = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| EntityId::from(s))
    };
    PairSlot {
        player1: part(first),
        player2: part(second),
    }
}

fn read_submission(path: &Path) -> Result<ResultSubmission> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission {:?}", path))?;
    let submission = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid submission in {:?}", path))?;
    Ok(submission)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
