use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, post, web};
use clap::Parser;
use dsmc_core::chain::DEFAULT_MAX_STEPS;
use dsmc_core::config::{DEFAULT_DATABASE, DEFAULT_ORDER};
use dsmc_core::{ChainStore, EngineConfig, SharedChain, Voice};
use env_logger::Env;
use log::{error, info};
use serde::{Deserialize, Serialize};

/// Upper bound on sentences per `/v1/generate` request.
const MAX_SENTENCES: usize = 100;

/// Markov chain chat server: learns from posted messages and talks back.
#[derive(Parser, Debug)]
#[command(name = "dsmc-server", author, version, about, long_about = None)]
struct Args {
	/// Database file (`.bin` for binary snapshots)
	#[arg(long, default_value = DEFAULT_DATABASE)]
	database: PathBuf,

	/// Markov order for a new database
	#[arg(long = "markov", default_value_t = DEFAULT_ORDER)]
	order: usize,

	/// Default random range (clamped to 1.0)
	#[arg(long = "rand", default_value_t = 0.0)]
	randomness: f32,

	/// Maximum tokens per generated sentence
	#[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
	max_steps: usize,

	/// Keep walking from the roots when a chain runs out before a sentence end
	#[arg(long = "continue")]
	continuation: bool,

	/// Seconds between database saves
	#[arg(long, default_value_t = 120)]
	delay: u64,

	/// Address to listen on
	#[arg(long, default_value = "127.0.0.1:5000")]
	bind: String,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	n: Option<usize>,
	randomness: Option<f32>,
}

#[derive(Serialize)]
struct Stats {
	order: usize,
	roots: usize,
	nodes: usize,
}

struct SharedData {
	chain: SharedChain,
	config: EngineConfig,
}

/// HTTP POST endpoint `/v1/learn`
///
/// Learns from the text body (one or several chat messages).
#[post("/v1/learn")]
async fn post_learn(data: web::Data<SharedData>, body: String) -> impl Responder {
	match data.chain.learn(&body) {
		Ok(windows) => HttpResponse::Ok().body(format!("{windows} windows learned")),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns `n` generated sentences, one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let count = query.n.unwrap_or(1);
	if count > MAX_SENTENCES {
		return HttpResponse::BadRequest().body(format!("n must be at most {MAX_SENTENCES}"));
	}

	let config = match query.randomness {
		Some(randomness) => data.config.clone().with_randomness(randomness),
		None => data.config.clone(),
	};
	if let Err(e) = config.validate() {
		return HttpResponse::BadRequest().body(e.to_string());
	}

	let voice = Voice::new(config.sampler());
	match voice.speak(&data.chain, count, &mut rand::rng()) {
		Ok(sentences) => HttpResponse::Ok().body(sentences.join("\n")),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	let stats = data.chain.read(|store: &ChainStore| Stats {
		order: store.order(),
		roots: store.len(),
		nodes: store.node_count(),
	});
	match stats {
		Ok(stats) => HttpResponse::Ok().json(stats),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// Saves the chain every `delay` until `stop` is raised.
fn spawn_saver(chain: SharedChain, database: PathBuf, delay: Duration, stop: Arc<AtomicBool>) -> thread::JoinHandle<()> {
	thread::spawn(move || {
		let mut last_save = Instant::now();
		while !stop.load(Ordering::Relaxed) {
			thread::sleep(Duration::from_millis(200));
			if last_save.elapsed() >= delay {
				if let Err(e) = chain.save(&database) {
					error!("Periodic save failed: {e}");
				}
				last_save = Instant::now();
			}
		}
	})
}

/// Main entry point for the server.
///
/// Loads the chain, shares it between the HTTP workers and a saver thread,
/// and saves once more on shutdown (Ctrl-C).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let config = EngineConfig {
		order: args.order,
		max_steps: args.max_steps,
		continuation: args.continuation,
		database: args.database.clone(),
		..EngineConfig::default()
	}
	.with_randomness(args.randomness);
	config.validate().map_err(std::io::Error::other)?;

	let chain = SharedChain::open(&config.database, config.order).map_err(std::io::Error::other)?;
	let stop = Arc::new(AtomicBool::new(false));
	let saver = spawn_saver(chain.clone(), config.database.clone(), Duration::from_secs(args.delay.max(1)), stop.clone());

	let shared_data = web::Data::new(SharedData { chain: chain.clone(), config: config.clone() });

	info!("Listening on {}", args.bind);
	let served = HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.app_data(shared_data.clone())
			.service(post_learn)
			.service(get_generated)
			.service(get_stats)
	})
		.bind(&args.bind)?
		.run()
		.await;

	stop.store(true, Ordering::Relaxed);
	let _ = saver.join();
	info!("Shutting down, saving database");
	chain.save(&config.database).map_err(std::io::Error::other)?;

	served
}
