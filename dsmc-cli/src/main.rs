use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use dsmc_core::config::{DEFAULT_DATABASE, DEFAULT_ORDER};
use dsmc_core::text::{gutenberg, learn_parallel};
use dsmc_core::{ChainStore, EngineConfig, SharedChain, Voice, read_corpus};
use env_logger::Env;
use log::info;

/// Dead simple Markov chains: learn word sequences, then talk.
#[derive(Parser, Debug)]
#[command(name = "dsmc", author, version, about, long_about = None)]
struct Cli {
	/// Learn from standard input
	#[arg(long)]
	stdin: bool,

	/// Text files to learn from
	#[arg(value_name = "FILE")]
	inputs: Vec<PathBuf>,

	/// Clean Project Gutenberg boilerplate before learning
	#[arg(long)]
	gutenberg: bool,

	/// Markov order for a new database (an existing one keeps its own)
	#[arg(long = "markov", value_name = "NUMBER", default_value_t = DEFAULT_ORDER)]
	order: usize,

	/// Database file (`.bin` for binary snapshots)
	#[arg(long, value_name = "FILENAME", default_value = DEFAULT_DATABASE)]
	database: PathBuf,

	/// Generate sentences to standard output
	#[arg(long)]
	speak: bool,

	/// Number of sentences to generate
	#[arg(short = 'n', value_name = "NUMBER", default_value_t = 1)]
	count: usize,

	/// Random range, 0.1 picks among the top 10% successors (clamped to 1.0)
	#[arg(long = "rand", value_name = "NUMBER", default_value_t = 0.0)]
	randomness: f32,

	/// Maximum tokens per generated sentence
	#[arg(long, value_name = "NUMBER", default_value_t = dsmc_core::chain::DEFAULT_MAX_STEPS)]
	max_steps: usize,

	/// Keep walking from the roots when a chain runs out before a sentence end
	#[arg(long = "continue")]
	continuation: bool,

	/// Print the whole chain
	#[arg(long)]
	dump: bool,

	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, action = ArgAction::Count)]
	verbose: u8,

	/// Decrease verbosity (-q, -qq)
	#[arg(short = 'q', long, action = ArgAction::Count)]
	quiet: u8,
}

impl Cli {
	fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			order: self.order,
			max_steps: self.max_steps,
			continuation: self.continuation,
			database: self.database.clone(),
			..EngineConfig::default()
		}
		.with_randomness(self.randomness)
	}

	fn learns(&self) -> bool {
		self.stdin || !self.inputs.is_empty()
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	if !cli.learns() && !cli.speak && !cli.dump {
		Cli::command().print_help()?;
		return Ok(());
	}

	let config = cli.engine_config();
	config.validate()?;

	let chain = SharedChain::open(&config.database, config.order)
		.with_context(|| format!("failed to load database {}", config.database.display()))?;

	if cli.learns() {
		let corpus = read_inputs(&cli)?;
		let corpus = if cli.gutenberg { gutenberg::clean(&corpus) } else { corpus };

		let order = chain.read(ChainStore::order)?;
		let learned = learn_parallel(&corpus, order)?;
		chain.merge(&learned)?;
		info!("Database now holds {} roots", chain.read(ChainStore::len)?);

		chain
			.save(&config.database)
			.with_context(|| format!("failed to save database {}", config.database.display()))?;
	}

	if cli.dump {
		print!("{}", chain.read(ChainStore::dump)?);
	}

	if cli.speak {
		let voice = Voice::new(config.sampler());
		for sentence in voice.speak(&chain, cli.count, &mut rand::rng())? {
			println!("{sentence}");
		}
	}

	Ok(())
}

fn read_inputs(cli: &Cli) -> Result<String> {
	let mut corpus = String::new();
	if cli.stdin {
		io::stdin().read_to_string(&mut corpus).context("failed to read standard input")?;
	}
	for input in &cli.inputs {
		corpus.push('\n');
		corpus.push_str(&read_corpus(input)?);
	}
	Ok(corpus)
}

fn init_logging(verbose: u8, quiet: u8) {
	use log::LevelFilter;

	let level = match (quiet, verbose) {
		(0, 0) => LevelFilter::Info,
		(0, 1) => LevelFilter::Debug,
		(0, _) => LevelFilter::Trace,
		(1, _) => LevelFilter::Warn,
		_ => LevelFilter::Error,
	};

	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
	builder.format_timestamp_millis();
	builder.filter_level(level);
	let _ = builder.try_init();
}
