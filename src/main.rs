use pokemon_zones::battle::engine::TurnOutcome;
use pokemon_zones::errors::GameResult;
use pokemon_zones::pokemon::now_millis;
use pokemon_zones::{
    ActionError, EncounterId, GameConfig, GameRng, JsonFileRosterStore, MemoryProvider, MetadataService,
    PokeApiProvider, PokedexProvider, RosterSort, RosterStore, SessionEvent, SortOrder, TrainerId,
    ZoneSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "config/game.toml";
const ENCOUNTERS: usize = 5;
const THROWS_PER_ENCOUNTER: usize = 3;

struct Args {
    config_path: PathBuf,
    data_dir: PathBuf,
    trainer: String,
    zone: u32,
    seed: Option<u64>,
    offline: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG),
        data_dir: PathBuf::from("data"),
        trainer: "red".to_string(),
        zone: 1,
        seed: None,
        offline: false,
    };

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--offline" => args.offline = true,
            "--trainer" => args.trainer = raw.next().unwrap_or(args.trainer),
            "--data-dir" => args.data_dir = raw.next().map(PathBuf::from).unwrap_or(args.data_dir),
            "--zone" => args.zone = raw.next().and_then(|z| z.parse().ok()).unwrap_or(args.zone),
            "--seed" => args.seed = raw.next().and_then(|s| s.parse().ok()),
            path => args.config_path = PathBuf::from(path),
        }
    }
    args
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(parse_args()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> GameResult<()> {
    let config = if args.config_path.exists() {
        GameConfig::load(&args.config_path)?
    } else {
        tracing::warn!(
            "No config at {}, using defaults",
            args.config_path.display()
        );
        GameConfig::default()
    };

    let provider: Arc<dyn PokedexProvider> = if args.offline {
        Arc::new(MemoryProvider::kanto_sample(&config.pokedex.sprite_url))
    } else {
        Arc::new(PokeApiProvider::new(&config.pokedex))
    };
    let metadata = MetadataService::new(provider, &config.pokedex);
    let store: Arc<dyn RosterStore> = Arc::new(JsonFileRosterStore::new(&args.data_dir));
    let rng = match args.seed {
        Some(seed) => GameRng::from_seed(seed),
        None => GameRng::new_random(),
    };

    let trainer = TrainerId::from(args.trainer.as_str());
    let mut session = ZoneSession::start(trainer, config, store, metadata.clone(), rng).await;
    session.wait_for_hydration().await;
    print_zones(&session);

    session.open_zone(args.zone, now_millis()).await?;
    if let Some(theme) = session.theme() {
        println!("Zone theme: {:?}", theme);
    }

    for _ in 0..ENCOUNTERS {
        let Some(encounter_id) = session.encounter().map(|e| e.id) else {
            println!("Nothing lives here.");
            break;
        };
        session.wait_for_hydration().await;
        play_encounter(&mut session)?;
        advance_past(&mut session, encounter_id).await;
    }

    print_roster(&session);
    let stats = metadata.cache_stats();
    tracing::info!(
        "Metadata cache: {} hits, {} misses ({:.0}% hit rate)",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );
    Ok(())
}

fn print_zones(session: &ZoneSession) {
    println!("Zones:");
    for zone in session.zones() {
        let lock = if session.is_zone_unlocked(zone) {
            String::new()
        } else {
            format!(" (needs Lv {})", zone.required_level)
        };
        println!(
            "  {} #{}-#{} Lv {}-{}{}",
            zone.name, zone.start_id, zone.end_id, zone.min_level, zone.max_level, lock
        );
    }
}

/// Fight the active wild if anyone can, then throw until it is caught or
/// gone.
fn play_encounter(session: &mut ZoneSession) -> GameResult<()> {
    if let Some(encounter) = session.encounter() {
        println!(
            "\nA wild {} (Lv {}) appeared!",
            encounter.species.name, encounter.wild_level
        );
    }

    match session.fight(now_millis()) {
        Ok(_) => battle(session)?,
        Err(ActionError::NoEligibleBattler) => println!("Nobody on the team can fight."),
        Err(e) => return Err(e.into()),
    }

    for _ in 0..THROWS_PER_ENCOUNTER {
        if session.encounter().is_none() {
            break;
        }
        match session.attempt_capture(now_millis()) {
            Ok(attempt) => {
                println!("{} ({:.0}%)", attempt.message, attempt.probability * 100.0);
                if attempt.success || attempt.fled {
                    break;
                }
            }
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }
    Ok(())
}

fn battle(session: &mut ZoneSession) -> GameResult<()> {
    let mut printed = 0;
    loop {
        let now = now_millis();
        let report = session.attack(now)?;
        if let Some(battle) = session.battle() {
            let lines = battle.narrative();
            for line in lines.iter().skip(printed) {
                println!("  {}", line);
            }
            printed = lines.len();
        }

        match report.outcome {
            TurnOutcome::Continue => {}
            TurnOutcome::PlayerFainted { .. } => {
                let next = session
                    .roster()
                    .first_battle_ready(now)
                    .map(|e| e.id.clone());
                match next {
                    Some(id) => session.select_battler(&id, now)?,
                    None => break,
                }
            }
            TurnOutcome::Victory(_) | TurnOutcome::Defeat => break,
        }
    }
    Ok(())
}

/// Run scheduled transitions until a different encounter is active.
async fn advance_past(session: &mut ZoneSession, previous: EncounterId) {
    while session.encounter().is_some_and(|e| e.id == previous) || session.encounter().is_none() {
        let Some(due_at) = session.next_transition_at() else {
            break;
        };
        let wait = due_at.saturating_sub(now_millis());
        tokio::time::sleep(Duration::from_millis(wait)).await;

        for event in session.tick(now_millis()) {
            match event {
                SessionEvent::Spawned { species, level, .. } => {
                    tracing::debug!("Next up: {} (Lv {})", species, level)
                }
                SessionEvent::Cleared(id) => tracing::debug!("Encounter {} left", id),
                other => tracing::debug!("{:?}", other),
            }
        }
    }
}

fn print_roster(session: &ZoneSession) {
    println!("\nRoster ({} entries):", session.roster().len());
    for entry in session.roster().sorted(RosterSort::Level, SortOrder::Descending) {
        let team = if entry.in_team { "*" } else { " " };
        println!(
            "  {} {} Lv {} ({} xp) #{}",
            team, entry.name, entry.level, entry.xp, entry.current_species_id
        );
    }
}
