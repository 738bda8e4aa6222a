//! Runs one Feige-Fiat-Shamir identification session in process: Peggy
//! generates an identity, Victor challenges her for a fixed number of
//! rounds, and the resulting confidence is printed.
//!
//! Usage:
//!   zkid
//!   zkid --bits 2048 --rounds 8 --verbose

use anyhow::Result;
use clap::Parser;
use rand::rngs::OsRng;
use slog::{error, o, Drain, Level, Logger};
use std::io::Write;
use std::process::ExitCode;
use zkid::{Confidence, KeyPair, Orchestrator, SessionConfig, ZkidError};

#[derive(Parser, Debug)]
#[command(name = "zkid")]
#[command(about = "Feige-Fiat-Shamir zero-knowledge identification over Blum integers")]
struct Args {
    /// Bit length of the public modulus
    #[arg(short, long, default_value_t = 1024)]
    bits: u64,

    /// Secrets per identity, also the challenge width of each round
    #[arg(short = 'k', long, default_value_t = 16)]
    challenge_width: usize,

    /// Number of rounds
    #[arg(short = 't', long, default_value_t = 4)]
    rounds: usize,

    /// Smallest accepted security exponent (k * t)
    #[arg(long, default_value_t = 20)]
    min_confidence: u64,

    /// Miller-Rabin witnesses per prime candidate
    #[arg(long, default_value_t = 20)]
    primality_rounds: usize,

    /// Log protocol phases
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines instead of terminal text
    #[arg(long)]
    json_log: bool,
}

impl From<&Args> for SessionConfig {
    fn from(args: &Args) -> Self {
        SessionConfig {
            modulus_bits: args.bits,
            challenge_width: args.challenge_width,
            rounds: args.rounds,
            min_confidence_bits: args.min_confidence,
            primality_rounds: args.primality_rounds,
        }
    }
}

fn build_logger(json: bool, verbose: bool) -> Logger {
    let level = if verbose { Level::Debug } else { Level::Info };
    if json {
        let drain = slog_json::Json::new(std::io::stderr())
            .add_default_keys()
            .build()
            .fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain.filter_level(level).fuse(), o!())
    } else {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain.filter_level(level).fuse(), o!())
    }
}

fn fatal(err: ZkidError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(kind)
}

/// Public part of the identity: modulus, then the key on one line.
fn write_identity<W: Write>(out: &mut W, key_pair: &KeyPair) -> std::io::Result<()> {
    writeln!(out, "public modulus n: {}", key_pair.n())?;
    writeln!(out, "public key: {}", key_pair.public_key())?;
    out.flush()
}

fn write_confidence<W: Write>(out: &mut W, confidence: &Confidence) -> std::io::Result<()> {
    writeln!(
        out,
        "Peggy and Victor agree with confidence 2 to {} or 1 in {}",
        confidence.bits(),
        confidence.denominator()
    )
}

fn run(args: &Args, logger: &Logger) -> Result<()> {
    let mut rng = OsRng;
    let orchestrator = Orchestrator::new(args.into())
        .map_err(fatal)?
        .with_logger(logger.new(o!("component" => "session")));

    let mut stdout = std::io::stdout().lock();
    let key_pair = orchestrator.generate_identity(&mut rng).map_err(fatal)?;
    write_identity(&mut stdout, &key_pair)?;

    let report = orchestrator.run(&mut rng, &key_pair).map_err(fatal)?;
    write_confidence(&mut stdout, &report.confidence)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let logger = build_logger(args.json_log, args.verbose);
    match run(&args, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(logger, "session failed"; "error" => %err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
