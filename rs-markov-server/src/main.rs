use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, post, put, web};
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use rs_markov_core::io::{get_filename, list_files, normalize_folder, sentences};
use rs_markov_core::{GenerateOptions, Markov, MarkovError, Sampling, Structure};

/// Largest accepted request body (training text or imported structure).
const PAYLOAD_LIMIT: usize = 16 * 1024 * 1024;

/// Server settings read from the environment.
///
/// - `MARKOV_HOST` (default `127.0.0.1`)
/// - `MARKOV_PORT` (default `5000`)
/// - `MARKOV_DATA_DIR` (default `./data`)
/// - `MARKOV_STATE_SIZE` (default `2`)
#[derive(Debug, Clone)]
struct ServerConfig {
	host: String,
	port: u16,
	data_dir: String,
	state_size: usize,
}

impl ServerConfig {
	fn from_env() -> Self {
		Self {
			host: env::var("MARKOV_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned()),
			port: parse_var("MARKOV_PORT", 5000),
			data_dir: env::var("MARKOV_DATA_DIR").unwrap_or_else(|_| "./data".to_owned()),
			state_size: parse_var("MARKOV_STATE_SIZE", 2),
		}
	}
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
	match env::var(name) {
		Ok(raw) => raw.parse().unwrap_or_else(|_| {
			warn!("invalid value {:?} for {}, using default", raw, name);
			default
		}),
		Err(_) => default,
	}
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_tries: Option<usize>,
	seed: Option<u64>,
	weighted: Option<bool>,
	unique: Option<bool>,
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>,
}

#[derive(Serialize)]
struct Stats {
	state_size: usize,
	start_words: usize,
	end_words: usize,
	states: usize,
	transitions: usize,
	history: usize,
}

struct SharedData {
	model: Markov,
	loaded: Vec<String>,
	config: ServerConfig,
}

impl GenerateParams {
	/// Builds generation options from the query, every field being optional.
	fn options(&self) -> GenerateOptions<'static> {
		let mut options = GenerateOptions::new().with_max_tries(self.max_tries.unwrap_or(0));
		if let Some(seed) = self.seed {
			options = options.with_rng(StdRng::seed_from_u64(seed));
		}
		if self.weighted.unwrap_or(false) {
			options = options.with_sampling(Sampling::Weighted);
		}
		if self.unique.unwrap_or(false) {
			options = options.with_filter(|result| result.reproduces_reference());
		}
		options
	}
}

/// Resolves model names to `.dat` files of `folder`.
///
/// Only names listed by `/v1/models` are accepted, so a name can never point
/// outside the data folder.
fn model_paths(folder: &Path, names: &[&str]) -> Result<Vec<PathBuf>, String> {
	let available = list_files(folder, "dat").map_err(|_| "Failed to list models".to_owned())?;

	names
		.iter()
		.map(|name| {
			let file = format!("{name}.dat");
			let is_plain = !name.contains(['/', '\\']) && !name.contains("..");
			if is_plain && available.contains(&file) {
				Ok(folder.join(file))
			} else {
				Err(format!("Unknown model: {name}"))
			}
		})
		.collect()
}

fn error_response(e: MarkovError) -> HttpResponse {
	match e {
		MarkovError::EmptyCorpus => HttpResponse::Conflict().body(e.to_string()),
		MarkovError::GenerationExhausted { .. } => HttpResponse::UnprocessableEntity().body(e.to_string()),
		_ => {
			error!("{e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sentence from the shared model and returns it as JSON.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.model.generate(query.options()) {
		Ok(result) => HttpResponse::Ok().json(result),
		Err(e) => error_response(e),
	}
}

/// HTTP POST endpoint `/v1/train`
///
/// Trains the shared model on the request body, one sentence per line.
#[post("/v1/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let lines = sentences(body.lines());
	if lines.is_empty() {
		return HttpResponse::BadRequest().body("No sentence to train on");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	shared_data.model.add_data(&lines);
	info!("trained on {} sentences", lines.len());
	HttpResponse::Ok().body(format!("Trained on {} sentences", lines.len()))
}

#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.config.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match list_files(normalize_folder(&data_dir), "dat") {
		Ok(files) => {
			let names: Vec<String> = files.iter().filter_map(|f| get_filename(f).ok()).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.loaded.join("\n"))
}

/// HTTP PUT endpoint `/v1/load_models`
///
/// Replaces the shared model with one trained on the named `.dat` files.
/// A single model reuses its snapshot when present.
#[put("/v1/load_models")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let model_names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	let folder = normalize_folder(&shared_data.config.data_dir);
	let state_size = shared_data.config.state_size;

	let paths = match model_paths(&folder, &model_names) {
		Ok(paths) => paths,
		Err(e) => {
			warn!("{e}");
			return HttpResponse::BadRequest().body(e);
		}
	};
	let model = match Markov::from_files(&paths, state_size) {
		Ok(m) => m,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	shared_data.model = model;
	shared_data.loaded = model_names.iter().map(|s| (*s).to_owned()).collect();
	info!("loaded models: {}", shared_data.loaded.join(", "));

	HttpResponse::Ok().body("Models loaded successfully")
}

#[get("/v1/export")]
async fn get_export(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.model.export())
}

#[put("/v1/import")]
async fn put_import(data: web::Data<Mutex<SharedData>>, structure: web::Json<Structure>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model.import(structure.into_inner());
	shared_data.loaded.clear();
	HttpResponse::Ok().body("Model imported successfully")
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let model = &shared_data.model;
	let structure = model.export();
	HttpResponse::Ok().json(Stats {
		state_size: model.state_size(),
		start_words: structure.start_words.len(),
		end_words: structure.end_words.len(),
		states: structure.corpus.len(),
		transitions: structure.transition_count(),
		history: model.history().len(),
	})
}

/// Main entry point for the server.
///
/// Creates an empty model, wraps it in a `Mutex` for thread safety,
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - Settings come from `ServerConfig::from_env`.
/// - Log level is controlled by `RUST_LOG` (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let config = ServerConfig::from_env();
	info!("starting with {:?}", config);

	let bind = (config.host.clone(), config.port);
	let shared_data = SharedData {
		model: Markov::new(config.state_size),
		loaded: Vec::new(),
		config,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.app_data(web::JsonConfig::default().limit(PAYLOAD_LIMIT))
			.app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
			.service(get_generated)
			.service(post_train)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_models)
			.service(get_export)
			.service(put_import)
			.service(get_stats)
	})
		.bind(bind)?
		.run()
		.await
}
