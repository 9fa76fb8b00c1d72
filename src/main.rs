use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use searchai::engine::{Board, Move, Tile, SIZE};
use searchai::expectimax::{Expectimax, ExpectimaxConfig, ExpectimaxParallel, SearchError};

#[derive(Debug, Parser)]
#[command(name = "searchai", about = "Expectimax move selection for 2048")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,

    /// JSON file overriding the search configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the single-threaded search
    #[arg(long, global = true)]
    sequential: bool,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Score the four moves for one board and print the best
    Suggest {
        /// 16 tile values in row-major order, separated by commas or spaces
        board: String,
    },
    /// Play a game against random spawns until no move is left
    Play {
        /// RNG seed for tile spawns (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many moves
        #[arg(long)]
        steps: Option<u64>,
        /// Stop once the highest tile reaches this value
        #[arg(long)]
        stop_tile: Option<Tile>,
        /// Suppress the spinner and per-move board output
        #[arg(long)]
        quiet: bool,
    },
}

enum Selector {
    Seq(Expectimax),
    Par(ExpectimaxParallel),
}

impl Selector {
    fn new(cfg: ExpectimaxConfig, sequential: bool) -> Self {
        if sequential { Selector::Seq(Expectimax::with_config(cfg)) } else { Selector::Par(ExpectimaxParallel::with_config(cfg)) }
    }

    fn find_best_move(&mut self, board: Board) -> Result<Move, SearchError> {
        match self {
            Selector::Seq(ex) => ex.find_best_move(board),
            Selector::Par(ex) => ex.find_best_move(board),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default_level = match args.cmd {
        Cmd::Suggest { .. } => "info",
        Cmd::Play { .. } => "warn",
    };
    let _logger = Logger::try_with_env_or_str(default_level)?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let cfg = load_config(args.config.as_ref())?;
    let mut selector = Selector::new(cfg, args.sequential);

    match args.cmd {
        Cmd::Suggest { board } => suggest(&mut selector, &board),
        Cmd::Play { seed, steps, stop_tile, quiet } => play(&mut selector, seed, steps, stop_tile, quiet),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ExpectimaxConfig> {
    let Some(path) = path else { return Ok(ExpectimaxConfig::default()) };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = ExpectimaxConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("loaded search config from {}", path.display());
    Ok(cfg)
}

fn suggest(selector: &mut Selector, text: &str) -> anyhow::Result<()> {
    let board = parse_board(text)?;
    println!("{}", board);
    let best = selector.find_best_move(board)?;
    println!("best: {} ({})", best, best.index());
    Ok(())
}

fn play(selector: &mut Selector, seed: Option<u64>, steps: Option<u64>, stop_tile: Option<Tile>, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);

    let pb = if !quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Moves: {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let mut move_count: u64 = 0;
    while !board.is_game_over() {
        let dir = selector.find_best_move(board)?;
        board = board.make_move(dir, &mut rng);
        move_count += 1;
        if let Some(pb) = &pb {
            let rate = move_count as f64 / start.elapsed().as_secs_f64().max(1e-6);
            pb.set_message(format!("{} | moves/sec: {:.1} | highest: {}", move_count, rate, board.highest_tile()));
            pb.println(board.to_string());
        }
        if steps.is_some_and(|limit| move_count >= limit) {
            break;
        }
        if stop_tile.is_some_and(|target| board.highest_tile() >= target) {
            break;
        }
    }

    if let Some(pb) = pb { pb.finish_and_clear(); }
    println!("{}", board);
    println!(
        "Moves: {} | moves/sec: {:.1} | highest tile: {} | tile sum: {}",
        move_count,
        move_count as f64 / start.elapsed().as_secs_f64().max(1e-6),
        board.highest_tile(),
        board.tile_sum()
    );
    Ok(())
}

fn parse_board(text: &str) -> anyhow::Result<Board> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Tile>().with_context(|| format!("bad tile value {s:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if values.len() != SIZE * SIZE {
        bail!("expected {} tile values, got {}", SIZE * SIZE, values.len());
    }
    let mut rows = [[0; SIZE]; SIZE];
    for (i, v) in values.into_iter().enumerate() {
        rows[i / SIZE][i % SIZE] = v;
    }
    Ok(Board::from_rows(rows))
}
