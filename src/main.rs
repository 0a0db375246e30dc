//! Mystic - headless host for the NPC interaction engine
//!
//! Runs the engine against an in-memory sandbox world at the fixed tick rate
//! for a number of ticks given on the command line (default 1200), answering
//! offers from a separate chat thread.

mod sandbox;
mod settings;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec3;
use mystic_core::GameClock;
use mystic_game::NpcRegistry;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sandbox::{LogMessenger, QuestLog, SandboxWorld};
use settings::MysticSettings;

const DEFAULT_TICKS: u64 = 1200;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let ticks = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("Invalid tick count '{}'", arg))?,
        None => DEFAULT_TICKS,
    };

    info!("Starting Mystic for {} ticks...", ticks);
    let settings = MysticSettings::load();
    if !MysticSettings::file_exists() {
        if let Err(e) = settings.save() {
            warn!("Failed to write default settings: {}", e);
        }
    }

    let mut world = SandboxWorld::new(7);
    let targets = vec![
        world.add_target("Ayla", Vec3::new(0.0, 1.0, 0.0)),
        world.add_target("Bram", Vec3::new(60.0, 1.0, 0.0)),
        world.add_target("Cato", Vec3::new(0.0, 1.0, 60.0)),
    ];

    let mut registry = NpcRegistry::new(
        world,
        LogMessenger::default(),
        QuestLog::default(),
        settings.engine.clone(),
    )
    .with_messages(settings.messages.clone())
    .with_archetypes(settings.archetype_table());
    registry.start();

    for target in &targets {
        if let Err(e) = registry.try_spawn_for(*target, None) {
            warn!("Could not spawn for {}: {}", target, e);
        }
    }

    // Players answer from their own thread; the engine picks it up next tick
    let sender = registry.chat_sender();
    let answers: Vec<_> = targets
        .iter()
        .enumerate()
        .map(|(i, target)| (*target, if i % 2 == 0 { "yes" } else { "no thanks" }))
        .collect();
    thread::spawn(move || {
        for (i, (target, reply)) in answers.into_iter().enumerate() {
            thread::sleep(Duration::from_secs(8 + 3 * i as u64));
            if !sender.submit(target, reply) {
                break;
            }
        }
    });

    let mut clock = GameClock::new(settings.engine.clock.clone());
    let mut last_frame = Instant::now();
    while registry.now() < ticks {
        let now = Instant::now();
        let delta = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        for _ in 0..clock.update(delta) {
            registry.world_mut().step();
            registry.tick();
            if registry.now() >= ticks {
                break;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }

    let active = registry.list_active();
    println!("{}", serde_json::to_string_pretty(&active)?);

    for (target, quest) in &registry.quests().grants {
        let name = registry.world().target_name(*target).unwrap_or("?");
        info!("{} received '{}'", name, quest);
    }
    registry.shutdown();
    Ok(())
}
