//! Egg Discovery CLI - Replay recorded interaction sessions against a pattern catalog.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use egg_discovery::{
    compute::{
        discovery::{DiscoveryEngine, DiscoveryRecord, EngineStats, NearMiss},
        score_gesture,
        synth::GestureSynth,
    },
    schema::{
        EngineConfig, InteractionEvent, KONAMI_CODE, PatternLibrary, Session, Trigger,
    },
};

/// Session time between cleanup passes during replay.
const CLEANUP_INTERVAL_MS: f64 = 1000.0;
/// Pointer jitter levels (px) for the sensitivity sweep.
const JITTER_LEVELS: [f32; 6] = [0.0, 1.0, 2.0, 5.0, 10.0, 20.0];
/// Synthetic gestures per pattern and jitter level.
const SWEEP_TRIALS: u64 = 32;

struct Args {
    sessions: Vec<PathBuf>,
    patterns: Option<PathBuf>,
    config: Option<PathBuf>,
    sensitivity: bool,
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("egg-discovery", String::as_str);

    if args.iter().any(|a| a == "--example") {
        print_example();
        return;
    }

    let parsed = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!();
        print_usage(program);
        std::process::exit(1);
    });

    let config = match &parsed.config {
        Some(path) => load_config(path),
        None => EngineConfig::default(),
    };
    let library = load_library(parsed.patterns.as_deref());

    if parsed.sensitivity {
        run_sensitivity(&config, &library);
        return;
    }

    if parsed.sessions.is_empty() {
        print_usage(program);
        std::process::exit(1);
    }

    println!("Egg Discovery Replay");
    println!("====================");
    println!("Patterns: {}", library.len());
    println!("Sessions: {}", parsed.sessions.len());
    println!();

    let start = Instant::now();
    let outcomes: Vec<Result<ReplayOutcome, String>> = parsed
        .sessions
        .par_iter()
        .map(|path| replay_file(path, &config, &library))
        .collect();
    let elapsed = start.elapsed();

    let mut failed = 0;
    for outcome in &outcomes {
        match outcome {
            Ok(outcome) => outcome.print(),
            Err(e) => {
                eprintln!("{e}");
                failed += 1;
            }
        }
    }

    let total_events: u64 = outcomes
        .iter()
        .flatten()
        .map(|o| o.stats.events_ingested)
        .sum();
    println!(
        "Replayed {} events in {:.2}s ({:.0} events/s)",
        total_events,
        elapsed.as_secs_f32(),
        total_events as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <session.json>... [--patterns file] [--config file]");
    eprintln!("       {program} --sensitivity [--patterns file] [--config file]");
    eprintln!("       {program} --example");
    eprintln!();
    eprintln!("Replay recorded interaction sessions and report discovered patterns.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  session.json    Recorded session ({{\"events\": [...]}})");
    eprintln!("  --patterns      JSON array of pattern definitions (default: built-in catalog)");
    eprintln!("  --config        Engine configuration JSON (default: built-in defaults)");
    eprintln!("  --sensitivity   Score synthetic gestures at increasing pointer jitter");
    eprintln!("  --example       Print example configuration, patterns and session");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        sessions: Vec::new(),
        patterns: None,
        config: None,
        sensitivity: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--patterns" => {
                let path = iter.next().ok_or("--patterns requires a file")?;
                parsed.patterns = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = iter.next().ok_or("--config requires a file")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--sensitivity" => parsed.sensitivity = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option {flag}")),
            path => parsed.sessions.push(PathBuf::from(path)),
        }
    }

    Ok(parsed)
}

fn load_config(path: &Path) -> EngineConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {e}");
        std::process::exit(1);
    });

    let config: EngineConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {e}");
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {e}");
        std::process::exit(1);
    }
    config
}

fn load_library(path: Option<&Path>) -> PatternLibrary {
    let Some(path) = path else {
        return PatternLibrary::builtin();
    };

    let report = PatternLibrary::load_file(path).unwrap_or_else(|e| {
        eprintln!("Error loading patterns: {e}");
        std::process::exit(1);
    });

    for rejection in &report.rejected {
        eprintln!(
            "Skipping pattern #{} ({}): {}",
            rejection.index,
            rejection.id.as_deref().unwrap_or("<no id>"),
            rejection.reason
        );
    }
    report.library
}

/// Result of replaying one session file.
struct ReplayOutcome {
    path: PathBuf,
    name: Option<String>,
    discoveries: Vec<DiscoveryRecord>,
    near_misses: Vec<NearMiss>,
    stats: EngineStats,
}

impl ReplayOutcome {
    fn print(&self) {
        let label = self.name.as_deref().unwrap_or("unnamed");
        println!("{} ({label})", self.path.display());
        println!(
            "  Events: {}, evaluations: {}, failures: {}",
            self.stats.events_ingested, self.stats.evaluations, self.stats.evaluation_failures
        );

        if self.discoveries.is_empty() {
            println!("  No discoveries");
        }
        for record in &self.discoveries {
            println!(
                "  Discovered {} at {:.0}ms (confidence {:.3}): {}",
                record.pattern_id, record.timestamp, record.confidence, record.reward
            );
        }
        for miss in &self.near_misses {
            println!(
                "  Pending {}: confidence {:.3}, {} near misses",
                miss.pattern_id, miss.current_confidence, miss.near_miss_count
            );
        }
        println!();
    }
}

fn replay_file(
    path: &Path,
    config: &EngineConfig,
    library: &PatternLibrary,
) -> Result<ReplayOutcome, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading session {}: {e}", path.display()))?;
    let session: Session = serde_json::from_str(&content)
        .map_err(|e| format!("Error parsing session {}: {e}", path.display()))?;

    let mut engine = DiscoveryEngine::new(config.clone(), library.clone())
        .map_err(|e| format!("Invalid config: {e}"))?;
    let discoveries = replay(&mut engine, session.events);

    Ok(ReplayOutcome {
        path: path.to_path_buf(),
        name: session.name,
        discoveries,
        near_misses: engine.near_misses(),
        stats: engine.stats(),
    })
}

/// Feed events in order, running cleanup on session time like a host timer.
fn replay(engine: &mut DiscoveryEngine, events: Vec<InteractionEvent>) -> Vec<DiscoveryRecord> {
    let mut discoveries = Vec::new();
    let mut next_cleanup = events.first().map_or(0.0, |e| e.timestamp) + CLEANUP_INTERVAL_MS;

    for event in events {
        while event.timestamp >= next_cleanup {
            engine.cleanup(next_cleanup);
            next_cleanup += CLEANUP_INTERVAL_MS;
        }
        discoveries.extend(engine.ingest(event));
    }
    discoveries
}

fn run_sensitivity(config: &EngineConfig, library: &PatternLibrary) {
    let gestures: Vec<_> = library
        .iter()
        .filter_map(|spec| {
            spec.triggers.iter().find_map(|trigger| match trigger {
                Trigger::Gesture {
                    shape,
                    tolerance,
                    min_points,
                    ..
                } => Some((spec, *shape, *tolerance, *min_points)),
                _ => None,
            })
        })
        .collect();

    if gestures.is_empty() {
        eprintln!("No gesture patterns in the catalog");
        std::process::exit(1);
    }

    println!("Gesture Sensitivity");
    println!("===================");
    println!("Trials per cell: {SWEEP_TRIALS}");
    println!();

    for (spec, shape, tolerance, min_points) in gestures {
        let threshold = config.thresholds.for_tier(spec.difficulty);
        println!("{} ({shape:?}, threshold {threshold:.2})", spec.id);

        for jitter in JITTER_LEVELS {
            let scores: Vec<f32> = (0..SWEEP_TRIALS)
                .into_par_iter()
                .map(|seed| {
                    let Ok(mut synth) = GestureSynth::new(seed, jitter) else {
                        return 0.0;
                    };
                    let events = synth.shape(shape, 0.0);
                    score_gesture(&events, shape, tolerance, min_points).unwrap_or(0.0)
                })
                .collect();

            let mean = scores.iter().sum::<f32>() / scores.len() as f32;
            let passed = scores.iter().filter(|&&s| s >= threshold).count();
            println!(
                "  jitter {jitter:>5.1}px: mean {mean:.3}, passed {passed}/{}",
                scores.len()
            );
        }
        println!();
    }
}

#[derive(Serialize)]
struct ExampleSession<'a> {
    name: &'a str,
    events: Vec<InteractionEvent>,
}

fn print_example() {
    let config = EngineConfig::default();
    let library = PatternLibrary::builtin();
    let patterns: Vec<_> = library.iter().collect();

    let mut events: Vec<InteractionEvent> = KONAMI_CODE
        .iter()
        .enumerate()
        .map(|(i, key)| InteractionEvent::key(*key, i as f64 * 150.0))
        .collect();
    if let Ok(mut synth) = GestureSynth::new(42, 1.0) {
        events.extend(synth.circle((400.0, 300.0), 80.0, 24, 3000.0));
    }
    let session = ExampleSession {
        name: "konami-then-circle",
        events,
    };

    println!("Example configuration (config.json):");
    println!("{}", to_pretty(&config));
    println!();
    println!("Example patterns (patterns.json):");
    println!("{}", to_pretty(&patterns));
    println!();
    println!("Example session (session.json):");
    println!("{}", to_pretty(&session));
}

fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    })
}
