use std::sync::Mutex;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};

use lexigram_core::io::list_files;
use lexigram_core::model::counts::ModelOrder;
use lexigram_core::model::letter_model::LetterModel;
use lexigram_core::model::repair::DEFAULT_MAX_ROUNDS;
use serde::Deserialize;

/// Query parameters for the `/v1/score` endpoint
#[derive(Deserialize)]
struct ScoreParams {
	word: String,
}

/// Query parameters for the `/v1/repair` endpoint
#[derive(Deserialize)]
struct RepairParams {
	word: String,
	deletions: Option<bool>,
	rounds: Option<usize>,
}

/// Query parameters for the `/v1/load_model` endpoint
#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
	order: Option<usize>,
	smoothing: Option<f64>,
}

struct SharedData {
	model: Option<LetterModel>,
}

/// HTTP GET endpoint `/v1/score`
///
/// Scores a word's log-likelihood under the loaded model and returns it
/// as the response body.
#[get("/v1/score")]
async fn get_score(data: web::Data<Mutex<SharedData>>, query: web::Query<ScoreParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::ServiceUnavailable().body("No model loaded"),
	};

	match model.score(&query.word) {
		Ok(score) => HttpResponse::Ok().body(score.to_string()),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/repair`
///
/// Repairs a word until it stops changing (bounded number of rounds) and
/// returns the repaired word.
#[get("/v1/repair")]
async fn get_repaired(data: web::Data<Mutex<SharedData>>, query: web::Query<RepairParams>) -> impl Responder {
	let allow_deletions = query.deletions.unwrap_or(false);
	let max_rounds = query.rounds.unwrap_or(DEFAULT_MAX_ROUNDS);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::ServiceUnavailable().body("No model loaded"),
	};

	match model.repair_until_fixed(&query.word, allow_deletions, max_rounds) {
		Ok(repaired) => HttpResponse::Ok().body(repaired),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files(&"./data".to_owned(), "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list wordlists"),
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(format!(
			"{} (order {}, smoothing {}, {} words)",
			model.name(),
			model.order().as_usize(),
			model.smoothing(),
			model.word_count()
		)),
		None => HttpResponse::Ok().body("No model loaded"),
	}
}

#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let order = match ModelOrder::from_order(query.order.unwrap_or(1)) {
		Ok(order) => order,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};
	let smoothing = query.smoothing.unwrap_or(1.0);

	let wordlist_path = format!("./data/{}.txt", name);
	match LetterModel::new(&wordlist_path, order, smoothing) {
		Ok(model) => {
			shared_data.model = Some(model);
			HttpResponse::Ok().body("Model loaded successfully")
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	}
}

/// Main entry point for the server.
///
/// Wraps the model slot in a `Mutex` for thread safety and starts an
/// Actix-web HTTP server. A model is loaded through `/v1/load_model`.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Wordlists are looked up under ./data.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { model: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_score)
			.service(get_repaired)
			.service(get_models)
			.service(get_loaded_model)
			.service(put_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
