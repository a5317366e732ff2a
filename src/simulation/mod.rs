pub mod combinations;
pub mod config;
pub mod playout;
pub mod report;
pub mod solver;
pub mod stats;
pub mod turn;

pub use combinations::{draw_outcomes, DrawError, Outcome};
pub use config::{ConfigError, DrawEnumeration, SolverConfig};
pub use playout::{run_playout, run_playouts, PlayoutResult, PlayoutSummary};
pub use report::SolveReport;
pub use solver::{BestMove, PlayValue, Solution, SolveError, Solver};
pub use stats::SearchStats;
pub use turn::{parse_turn, parse_turn_file, TurnFileError, SAMPLE_TURN};
