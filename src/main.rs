//! Delvewright - Entry Point
//!
//! Loads the configuration, opens (or creates) the saved world and reads
//! commands from standard input until `quit`.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use delvewright::combat::{AttackOutcome, TransferOutcome};
use delvewright::game::{CommandStates, Game, GameConfig, MoveOutcome, DEFAULT_CONFIG_FILE};
use delvewright::items::Item;
use delvewright::world::Direction;

const HELP: &str = "\
Commands:
  n, s, e, w      move north, south, east or west
  look            describe this location
  exits           describe the neighbouring locations
  items           list items lying here
  inv             list what you carry
  enemy           show the enemy, if any
  attack          attack the enemy
  take <name>     pick up an item
  drop <name>     drop an item
  story           show the backstory
  save            save the world
  quit            save and leave";

fn init_logging() {
    // Log to file so the log does not interleave with the game text
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("delvewright.log")
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    log::info!("Starting Delvewright v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = GameConfig::load(&config_path)?;

    println!("Summoning the world...");
    let game = Game::bootstrap(&config).await.context("Could not start the game")?;

    println!("{}\n", game.backstory());
    match game.location().await {
        Ok(report) => println!("{}", report.outcome.summary(true)),
        Err(e) => println!("The mist will not lift: {}", e),
    }
    println!("\n{}", HELP);

    let result = run_command_loop(&game).await;

    if let Err(ref e) = result {
        log::error!("Game exited with error: {}", e);
    }
    game.save().await.context("Could not save on exit")?;

    log::info!("Delvewright shut down cleanly");
    result
}

/// Read and run commands until `quit` or end of input
async fn run_command_loop(game: &Game) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt(&game.command_states());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let argument = rest.trim();

        if matches!(verb, "quit" | "q" | "exit") {
            break;
        }

        // Command failures are reported, never fatal
        if let Err(e) = run_command(game, verb, argument).await {
            log::warn!("Command '{}' failed: {}", line, e);
            println!("Something went wrong: {}", e);
        }
    }

    Ok(())
}

async fn run_command(game: &Game, verb: &str, argument: &str) -> Result<()> {
    if let Ok(direction) = verb.parse::<Direction>() {
        let report = game.move_player(direction).await?;
        match report.outcome {
            MoveOutcome::Blocked { enemy } => println!("{} blocks your way.", enemy),
            MoveOutcome::Moved {
                location, encounter, ..
            } => {
                println!("You head {}.\n{}", direction, location.summary(true));
                if let Some(enemy) = encounter {
                    println!("\n{} appears! {}", enemy.name, enemy.description);
                }
            }
        }
        return Ok(());
    }

    match verb {
        "look" | "l" => {
            let report = game.location().await?;
            println!("{} {}", game.position(), report.outcome.summary(true));
        }
        "exits" => println!("{}", game.exits().outcome),
        "items" => print_items("Lying here", &game.local_items().outcome),
        "inv" | "i" => print_items("You carry", &game.inventory().outcome),
        "enemy" => {
            let enemies = game.enemies().outcome;
            if enemies.is_empty() {
                println!("Nothing hostile here.");
            }
            for enemy in enemies {
                println!("{}: {}", enemy.name, enemy.description);
            }
        }
        "attack" | "a" => print_attack(&game.attack().await?.outcome),
        "take" | "t" => print_transfer("take", &game.take(argument).await?.outcome),
        "drop" | "d" => print_transfer("drop", &game.drop(argument).await?.outcome),
        "story" => println!("{}", game.backstory()),
        "save" => {
            game.save().await?;
            println!("Saved.");
        }
        "help" | "?" => println!("{}", HELP),
        other => println!("Unknown command '{}'. Type 'help'.", other),
    }
    Ok(())
}

fn print_prompt(states: &CommandStates) {
    let mut hints = Vec::new();
    if states.movement {
        hints.push("move");
    }
    if states.combat {
        hints.push("attack");
    }
    if states.local_items {
        hints.push("take");
    }
    if states.inventory {
        hints.push("drop");
    }
    println!("\n[{}] >", hints.join(" "));
}

fn print_items(heading: &str, items: &[Item]) {
    if items.is_empty() {
        println!("{}: nothing", heading);
        return;
    }
    println!("{}:", heading);
    for item in items {
        println!("  {} ({}): {}", item.name, item.kind(), item.description);
    }
}

fn print_transfer(verb: &str, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Moved(name) => println!("You {} the {}.", verb, name),
        TransferOutcome::NotFound(name) => println!("There is no '{}' to {}.", name, verb),
    }
}

fn print_attack(outcome: &AttackOutcome) {
    match outcome {
        AttackOutcome::NoEnemy => println!("There is nothing to attack."),
        AttackOutcome::NoPlayerWeapon => println!("You have no weapon."),
        AttackOutcome::Victory { enemy, blow } => {
            println!("You {}. {} falls.", blow.message(), enemy)
        }
        AttackOutcome::NoEnemyWeapon { enemy, blow } => {
            println!("You {}. {} cannot strike back.", blow.message(), enemy)
        }
        AttackOutcome::Exchanged { enemy, blow, counter } => {
            println!("You {}. {} {}.", blow.message(), enemy, counter.message())
        }
        AttackOutcome::Defeat {
            enemy,
            blow,
            counter,
            fresh_world,
        } => {
            println!("You {}. {} {}.\nYou have died.", blow.message(), enemy, counter.message());
            if *fresh_world {
                println!("A new world takes shape around you.");
            } else {
                println!("The next world is still forming.");
            }
        }
    }
}
