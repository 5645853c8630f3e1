//! HTTP surface: story generation plus the per-user story library.
//!
//! Identity comes from the `x-user-id` header set by the auth layer in front
//! of this service.

use crate::{
    config::Config,
    error::StoryError,
    logger,
    models::{ErrorResult, GenerationRequest, NewStory, StoryQuery},
    storage::StoryStorageManager,
    story::StoryGenerator,
};
use actix_web::{
    guard,
    http::StatusCode,
    middleware::DefaultHeaders,
    web::{self, Bytes},
    App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub generator: StoryGenerator,
    pub storage: StoryStorageManager,
}

impl ResponseError for StoryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(StoryError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(ErrorResult::from(self))
    }
}

type HandlerResult = std::result::Result<HttpResponse, StoryError>;

pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type, x-user-id",
        ))
        .add((
            "Access-Control-Allow-Methods",
            "GET, POST, DELETE, OPTIONS",
        ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{tail:.*}")
            .guard(guard::Options())
            .to(preflight),
    )
    .route("/health", web::get().to(health))
    .route("/generate-story", web::post().to(generate_story))
    .route("/stories", web::get().to(list_stories))
    .route("/stories", web::post().to(save_story))
    .route("/stories/stats", web::get().to(story_stats))
    .route("/stories/{id}", web::get().to(get_story))
    .route("/stories/{id}", web::delete().to(delete_story));
}

pub async fn run(config: Config) -> std::io::Result<()> {
    logger::log_config_info(&config);

    let generator = StoryGenerator::from_config(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let storage = StoryStorageManager::new(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(AppState { generator, storage });

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_headers())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let storage_ok = state.storage.health_check().await.unwrap_or(false);
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "storage": storage_ok,
    }))
}

async fn generate_story(state: web::Data<AppState>, body: Bytes) -> HandlerResult {
    let request: GenerationRequest = serde_json::from_slice(&body)
        .map_err(|e| StoryError::ValidationError(format!("Invalid request body: {}", e)))?;

    let story = state.generator.generate(&request).await?;
    Ok(HttpResponse::Ok().json(story))
}

fn user_id(req: &HttpRequest) -> std::result::Result<String, StoryError> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .ok_or_else(|| StoryError::Unauthorized("User must be authenticated".into()))
}

async fn list_stories(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<StoryQuery>,
) -> HandlerResult {
    let user = user_id(&req)?;
    let stories = state.storage.list(&user, &query).await?;
    Ok(HttpResponse::Ok().json(stories))
}

async fn save_story(
    req: HttpRequest,
    state: web::Data<AppState>,
    story: web::Json<NewStory>,
) -> HandlerResult {
    let user = user_id(&req)?;
    let stored = state.storage.insert(&user, story.into_inner()).await?;
    log::info!("Saved story {} for user {}", stored.id, user);
    Ok(HttpResponse::Created().json(stored))
}

async fn story_stats(req: HttpRequest, state: web::Data<AppState>) -> HandlerResult {
    let user = user_id(&req)?;
    let stats = state.storage.stats(&user).await?;
    Ok(HttpResponse::Ok().json(stats))
}

async fn get_story(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let user = user_id(&req)?;
    let id = path.into_inner();
    match state.storage.get(&user, &id).await? {
        Some(story) => Ok(HttpResponse::Ok().json(story)),
        None => Err(StoryError::NotFound(format!("story {}", id))),
    }
}

async fn delete_story(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HandlerResult {
    let user = user_id(&req)?;
    state.storage.delete(&user, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
