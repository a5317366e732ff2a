use clap::{Parser, Subcommand};
use dominion_solver::card::CardDatabase;
use dominion_solver::game::TurnState;
use dominion_solver::rng::GameRng;
use dominion_solver::simulation::{
    parse_turn_file, run_playouts, DrawEnumeration, SolveReport, Solver, SolverConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dominion-solver")]
#[command(about = "Expected-value solver for the action phase of a Dominion turn", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Card catalog JSON (defaults to the built-in catalog)
    #[arg(short, long)]
    cards: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the best action card to play (default)
    Solve {
        /// Turn file to use
        #[arg(short, long, default_value = "turn.txt")]
        turn: String,

        /// Solver config JSON; flags below override it
        #[arg(long)]
        config: Option<String>,

        /// Disable the memo table
        #[arg(long)]
        no_memo: bool,

        /// Evaluate root candidates in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Maximum action plays along one line
        #[arg(long)]
        max_plays: Option<u32>,

        /// Enumerate ordered draw sequences instead of combinations
        #[arg(long)]
        sequences: bool,

        /// Write a JSON report to this file
        #[arg(long)]
        json: Option<String>,
    },

    /// Check the solver by playing the turn out against random shuffles
    Simulate {
        /// Turn file to use
        #[arg(short, long, default_value = "turn.txt")]
        turn: String,

        /// Number of playouts
        #[arg(short, long, default_value = "1000")]
        num_trials: usize,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write a JSON report, including the playout summary, to this file
        #[arg(long)]
        json: Option<String>,
    },

    /// List the card catalog
    Cards,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db = match load_database(cli.cards.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Solve {
            turn,
            config,
            no_memo,
            parallel,
            max_plays,
            sequences,
            json,
        }) => {
            let mut solver_config = match config {
                Some(path) => match SolverConfig::from_file(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("✗ Failed to load config '{}': {}", path, e);
                        std::process::exit(1);
                    }
                },
                None => SolverConfig::default(),
            };
            if no_memo {
                solver_config.memoize = false;
            }
            if parallel {
                solver_config.parallel = true;
            }
            if max_plays.is_some() {
                solver_config.max_plays = max_plays;
            }
            if sequences {
                solver_config.enumeration = DrawEnumeration::Sequences;
            }
            solve_turn(&db, &turn, solver_config, json.as_deref());
        }
        Some(Commands::Simulate {
            turn,
            num_trials,
            seed,
            json,
        }) => {
            simulate_turn(&db, &turn, num_trials, seed, json.as_deref());
        }
        Some(Commands::Cards) => {
            list_cards(&db);
        }
        None => {
            solve_turn(&db, "turn.txt", SolverConfig::default(), None);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_database(path: Option<&str>) -> Result<CardDatabase, dominion_solver::card::CardDatabaseError> {
    let db = match path {
        Some(path) => CardDatabase::from_file(path)?,
        None => CardDatabase::builtin()?,
    };
    eprintln!("✓ Loaded {} cards", db.card_count());
    Ok(db)
}

fn load_turn(db: &CardDatabase, turn_file: &str) -> TurnState {
    match parse_turn_file(turn_file, db) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("✗ Failed to parse turn file '{}': {}", turn_file, e);
            std::process::exit(1);
        }
    }
}

fn solve_turn(db: &CardDatabase, turn_file: &str, config: SolverConfig, json: Option<&str>) {
    let state = load_turn(db, turn_file);

    println!("\n=== Dominion Turn Solver ===\n");
    println!("Turn: {} ({} cards)", turn_file, state.total_card_count());
    println!("{}", state.describe(db));
    println!();

    let solver = Solver::new(db, config.clone());
    let solution = match solver.solve(&state) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("✗ Solve failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Result ===\n");
    match solution.best.card {
        Some(card) => println!("Best card to play : {}", db.name_of(card)),
        None => println!("Best card to play : (none: go to buy phase)"),
    }
    println!("Expected coins    : {:.4}", solution.best.value);

    if !solution.plays.is_empty() {
        println!("\nCandidate plays:");
        for play in &solution.plays {
            let marker = if Some(play.card) == solution.best.card { "*" } else { " " };
            println!("  {} {:14} {:8.4}", marker, db.name_of(play.card), play.value);
        }
    }

    let stats = &solution.stats;
    println!();
    println!(
        "Searched {} states ({} terminal, {} memo hits, depth {}) in {:.2?} ({:.0} states/sec)",
        stats.nodes,
        stats.terminal_nodes,
        stats.memo_hits,
        stats.max_depth,
        std::time::Duration::from_micros(stats.time_us),
        stats.nodes_per_second()
    );

    if let Some(path) = json {
        let report = SolveReport::new(turn_file, &solution, &config, db);
        match report.save(path) {
            Ok(()) => println!("\nReport saved to: {}", path),
            Err(e) => eprintln!("\n✗ Failed to save report: {}", e),
        }
    }
}

fn simulate_turn(
    db: &CardDatabase,
    turn_file: &str,
    num_trials: usize,
    seed: Option<u64>,
    json: Option<&str>,
) {
    let state = load_turn(db, turn_file);
    let base_seed = seed.unwrap_or_else(|| GameRng::new(None).seed());

    println!("\n=== Dominion Turn Playouts ===\n");
    println!("Turn: {} ({} cards)", turn_file, state.total_card_count());
    println!("Playouts: {}", num_trials);
    println!("Seed: {}", base_seed);
    println!();

    let config = SolverConfig::default();
    let solver = Solver::new(db, config.clone());
    let solution = match solver.solve(&state) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("✗ Solve failed: {}", e);
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(num_trials as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} playouts ({eta})") {
        pb.set_style(style);
    }

    let start = std::time::Instant::now();
    let summary = match run_playouts(&solver, &state, num_trials, base_seed, Some(&pb)) {
        Ok(summary) => summary,
        Err(e) => {
            pb.abandon();
            eprintln!("✗ Playouts failed: {}", e);
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    println!("=== Results ===\n");
    println!(
        "Playout mean     : {:.4} ± {:.4}",
        summary.mean, summary.std_error
    );
    println!("Solver expected  : {:.4}", solution.best.value);
    println!("Range            : {} - {}", summary.min, summary.max);
    println!();

    println!("Coin distribution:");
    for (coins, count) in &summary.distribution {
        let pct = *count as f64 / num_trials as f64 * 100.0;
        let bar = "█".repeat((pct / 2.0) as usize);
        println!("  {:3} coins: {:5.1}% {} ({})", coins, pct, bar, count);
    }

    println!();
    println!(
        "Completed in {:.2?} ({:.0} playouts/sec)",
        elapsed,
        num_trials as f64 / elapsed.as_secs_f64()
    );

    if let Some(path) = json {
        let report = SolveReport::new(turn_file, &solution, &config, db).with_playouts(summary);
        match report.save(path) {
            Ok(()) => println!("\nReport saved to: {}", path),
            Err(e) => eprintln!("\n✗ Failed to save report: {}", e),
        }
    }
}

fn list_cards(db: &CardDatabase) {
    println!("\n=== Card Catalog ===\n");
    println!(
        "{:>4} {:14} {:9} {:>7} {:>4} {:>5} {:>5}",
        "id", "name", "category", "actions", "buys", "coins", "cards"
    );
    println!("{:-<54}", "");
    for card in db.cards() {
        println!(
            "{:>4} {:14} {:9} {:>7} {:>4} {:>5} {:>5}",
            card.id.0,
            card.name,
            format!("{:?}", card.category),
            card.actions,
            card.buys,
            card.coins,
            card.cards
        );
    }
}
