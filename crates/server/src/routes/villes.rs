use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use service::domain::{Ville, VilleInput};

use super::{csv_attachment, RangeQuery};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Fragment the name must contain
    pub prefix: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MinQuery {
    /// Exclusive lower bound
    pub min: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/villes", get(list).post(create))
        .route("/villes/search", get(search))
        .route("/villes/min", get(greater_than))
        .route("/villes/between", get(between))
        .route("/villes/export", get(export))
        .route("/villes/:id", get(get_one).put(update).delete(delete_one))
}

#[utoipa::path(get, path = "/villes", tag = "villes", responses((status = 200, description = "All villes", body = [crate::openapi::VilleDoc])))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Ville>>, ApiError> {
    Ok(Json(state.villes.list_villes().await?))
}

#[utoipa::path(
    get, path = "/villes/{id}", tag = "villes",
    params(("id" = i32, Path, description = "Ville id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::VilleDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Ville>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.villes.get_ville(id).await?))
}

#[utoipa::path(
    post, path = "/villes", tag = "villes",
    request_body = crate::openapi::VilleInputDoc,
    responses(
        (status = 200, description = "Created", body = String),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Unknown departement")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<VilleInput>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(input) = body?;
    state.villes.add_ville(input).await?;
    Ok("Ville ajoutée")
}

#[utoipa::path(
    put, path = "/villes/{id}", tag = "villes",
    params(("id" = i32, Path, description = "Ville id")),
    request_body = crate::openapi::VilleInputDoc,
    responses(
        (status = 200, description = "Villes after the update", body = [crate::openapi::VilleDoc]),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<VilleInput>, JsonRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    let Json(input) = body?;
    Ok(Json(state.villes.update_ville(id, input).await?))
}

#[utoipa::path(
    delete, path = "/villes/{id}", tag = "villes",
    params(("id" = i32, Path, description = "Ville id")),
    responses((status = 200, description = "Remaining villes", body = [crate::openapi::VilleDoc]))
)]
pub async fn delete_one(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.villes.delete_ville(id).await?))
}

#[utoipa::path(get, path = "/villes/search", tag = "villes", params(SearchQuery), responses((status = 200, description = "Matching villes", body = [crate::openapi::VilleDoc])))]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Query(q) = query?;
    Ok(Json(state.villes.search_by_nom(&q.prefix).await?))
}

#[utoipa::path(get, path = "/villes/min", tag = "villes", params(MinQuery), responses((status = 200, description = "Villes above the threshold", body = [crate::openapi::VilleDoc])))]
pub async fn greater_than(
    State(state): State<AppState>,
    query: Result<Query<MinQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Query(q) = query?;
    Ok(Json(state.villes.population_greater_than(q.min).await?))
}

#[utoipa::path(
    get, path = "/villes/between", tag = "villes",
    params(RangeQuery),
    responses(
        (status = 200, description = "Villes within the range", body = [crate::openapi::VilleDoc]),
        (status = 400, description = "Invalid range")
    )
)]
pub async fn between(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Query(range) = query?;
    Ok(Json(state.villes.population_between(range.min, range.max).await?))
}

#[utoipa::path(get, path = "/villes/export", tag = "villes", responses((status = 200, description = "CSV download", content_type = "text/csv", body = String)))]
pub async fn export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state.villes.export_csv().await?;
    Ok(csv_attachment("villes.csv", csv))
}
