//! Single binary web server exposing the bracket engine over a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! BRACKET_K_FACTOR, BRACKET_DEFAULT_RATING.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    BracketService, EngineConfig, EntrantMode, Entry, EntryId, MatchId, MemoryStore, Participant,
    SeedingMethod, ServerConfig, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentStore,
};
use serde::Deserialize;
use uuid::Uuid;

type AppState = Data<BracketService<MemoryStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    format: String,
    #[serde(default = "default_seeding")]
    seeding: String,
    #[serde(default)]
    mode: EntrantMode,
    #[serde(default = "default_max_entrants")]
    max_entrants: u32,
    qualifier_threshold: Option<i32>,
}

fn default_seeding() -> String {
    "standard".to_string()
}

fn default_max_entrants() -> u32 {
    64
}

#[derive(Deserialize)]
struct RegisterEntryBody {
    participant: Participant,
    seed: Option<u32>,
    #[serde(default)]
    qualifier_points: i32,
    /// Initial rating for a participant the store does not know yet.
    rating: Option<i32>,
}

#[derive(Deserialize)]
struct QualifierPointsBody {
    points: i32,
}

#[derive(Deserialize)]
struct RecordResultBody {
    home_score: u32,
    away_score: u32,
    winner_id: Option<Uuid>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct EntryPath {
    id: TournamentId,
    entry_id: EntryId,
}

#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_) | TournamentError::MatchNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::Store(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a new tournament in Draft state.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let created = body.format.parse::<TournamentFormat>().and_then(|format| {
        let seeding = body.seeding.parse::<SeedingMethod>()?;
        let mut tournament =
            Tournament::new(body.name, format, seeding, body.mode, body.max_entrants);
        tournament.qualifier_threshold = body.qualifier_threshold;
        state.create_tournament(tournament)
    });
    match created {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Tournament with its current matches.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state
        .tournament(path.id)
        .and_then(|t| Ok((t, state.matches(path.id)?)));
    match result {
        Ok((tournament, matches)) => HttpResponse::Ok().json(serde_json::json!({
            "tournament": tournament,
            "matches": matches,
        })),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournaments/{id}/registration")]
async fn api_open_registration(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.open_registration(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Register an entry (tournament must be in Registration).
#[post("/api/tournaments/{id}/entries")]
async fn api_register_entry(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterEntryBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut entry = Entry::new(path.id, body.participant).with_qualifier_points(body.qualifier_points);
    entry.seed = body.seed;
    let result = state.register_entry(entry).and_then(|entry| {
        if let Some(rating) = body.rating {
            if state.store().rating(entry.participant)?.is_none() {
                state.set_rating(entry.participant, rating)?;
            }
        }
        Ok(entry)
    });
    match result {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => error_response(e),
    }
}

#[put("/api/tournaments/{id}/entries/{entry_id}/qualifier-points")]
async fn api_set_qualifier_points(
    state: AppState,
    path: Path<EntryPath>,
    body: Json<QualifierPointsBody>,
) -> HttpResponse {
    match state.update_qualifier_points(path.id, path.entry_id, body.points) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => error_response(e),
    }
}

/// Generate (or regenerate) the bracket.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.generate_bracket(path.id) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(e),
    }
}

#[delete("/api/tournaments/{id}/bracket")]
async fn api_delete_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.delete_bracket(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.standings(path.id) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(e),
    }
}

/// Record a result; the winner advances and ratings update.
#[post("/api/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    match state.record_result(path.match_id, body.home_score, body.away_score, body.winner_id) {
        Ok(game) => HttpResponse::Ok().json(game),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server = ServerConfig::from_env();
    let engine = EngineConfig::from_env();
    log::info!("Starting server at http://{}:{}", server.host, server.port);
    log::info!(
        "Rating settings: k_factor={}, default_rating={}",
        engine.k_factor,
        engine.default_rating
    );

    let state = Data::new(BracketService::new(MemoryStore::new(), engine));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_open_registration)
            .service(api_register_entry)
            .service(api_set_qualifier_points)
            .service(api_generate_bracket)
            .service(api_delete_bracket)
            .service(api_standings)
            .service(api_record_result)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
