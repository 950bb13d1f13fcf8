//! `smartstore` — terminal session driver for the restocking simulation.
//!
//! All state lives in the domain crates; this binary only wires user actions
//! to the store and the advisor and prints what happened.

mod session;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use smartstore_advisor::RestockAdvisor;

use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "smartstore", about = "Retail restocking robot simulation")]
struct Cli {
    /// Run a non-interactive demo of this many rounds (each round empties a
    /// shelf and then restocks one) instead of the interactive prompt.
    #[arg(long, value_name = "ROUNDS")]
    demo: Option<u32>,

    /// Seconds to wait between demo rounds.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..=10))]
    interval_secs: u64,

    /// Seed the randomness source for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    smartstore_observability::init();
    let cli = Cli::parse();

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(RestockAdvisor::from_env(), rng);

    match cli.demo {
        Some(rounds) => run_demo(&mut session, rounds, cli.interval_secs),
        None => run_interactive(&mut session),
    }
}

/// Cooperative auto-simulation: each round re-invokes the same two user
/// actions the interactive mode exposes; stopping the loop is the only
/// cancellation needed.
fn run_demo(session: &mut Session, rounds: u32, interval_secs: u64) -> Result<()> {
    for round in 1..=rounds {
        println!("--- round {round} ---");
        session.mark_empty();
        session.restock()?;
        session.print_status();
        if round < rounds {
            std::thread::sleep(Duration::from_secs(interval_secs));
        }
    }
    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<()> {
    println!("smartstore interactive session; type 'help' for commands");
    session.print_status();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match line.trim() {
            "" => {}
            "empty" => session.mark_empty(),
            "restock" => session.restock()?,
            "reset" => session.reset(),
            "status" => session.print_status(),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command {other:?}; type 'help'"),
        }
    }
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  empty    mark a random shelf empty");
    println!("  restock  ask the robot to restock (advisory or fallback decision)");
    println!("  reset    restore the initial store configuration");
    println!("  status   show shelves, metrics, and the recent action log");
    println!("  quit     leave the session");
}
