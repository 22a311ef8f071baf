use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use futures::TryStreamExt;

use anime_catalog::Anime;
use anime_core::AnimeId;

use crate::app::dto::AnimeRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/animes", get(list_animes).post(create_anime))
        .route("/animes/batch", post(create_animes))
        .route(
            "/animes/:id",
            get(get_anime).put(update_anime).delete(delete_anime),
        )
}

fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<AnimeId, ApiError> {
    let Path(raw) = path?;
    Ok(raw.parse::<AnimeId>()?)
}

pub async fn list_animes(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Anime>>, ApiError> {
    let animes: Vec<Anime> = services.animes.list_all().try_collect().await?;
    Ok(Json(animes))
}

pub async fn get_anime(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Anime>, ApiError> {
    let id = parse_id(path)?;
    Ok(Json(services.animes.find_by_id(id).await?))
}

pub async fn create_anime(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<AnimeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Anime>), ApiError> {
    let Json(body) = body?;
    let saved = services.animes.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// The whole batch answers 400 if any persisted item fails validation, even though
/// the items before it were already stored.
pub async fn create_animes(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<AnimeRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Anime>>), ApiError> {
    let Json(body) = body?;
    let animes = body.into_iter().map(Anime::from).collect();
    let saved: Vec<Anime> = services.animes.create_batch(animes).try_collect().await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_anime(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<AnimeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    let Json(body) = body?;
    services.animes.update(body.into(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_anime(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    services.animes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
