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

use service::domain::{Departement, DepartementInput, Ville, VilleInput};
use service::population::SortOrder;

use super::{csv_attachment, RangeQuery};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SortQuery {
    /// `asc` (default) or `desc`
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub order: SortOrder,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LimitQuery {
    pub limit: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/departements", get(list).post(create).put(update))
        .route("/departements/export", get(export))
        .route("/departements/:id", get(get_one).delete(delete_one))
        .route("/departements/:id/villes", get(list_villes).post(add_ville))
        .route("/departements/:id/villes/between", get(villes_between))
        .route("/departements/:id/villes/sorted", get(villes_sorted))
        .route("/departements/:id/villes/desc", get(villes_top))
        .route(
            "/departements/:id/villes/:ville_id",
            get(get_ville).put(update_ville).delete(remove_ville),
        )
}

#[utoipa::path(get, path = "/departements", tag = "departements", responses((status = 200, description = "All departements", body = [crate::openapi::DepartementDoc]), (status = 400, description = "Fetch failed")))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Departement>>, ApiError> {
    Ok(Json(state.departements.list_departements().await?))
}

#[utoipa::path(
    get, path = "/departements/{id}", tag = "departements",
    params(("id" = i32, Path, description = "Departement id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::DepartementDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Departement>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.departements.get_departement(id).await?))
}

#[utoipa::path(
    post, path = "/departements", tag = "departements",
    request_body = crate::openapi::DepartementInputDoc,
    responses(
        (status = 200, description = "Created", body = String),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<DepartementInput>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(input) = body?;
    state.departements.add_departement(input).await?;
    Ok("Departement ajouté")
}

#[utoipa::path(
    put, path = "/departements", tag = "departements",
    request_body = crate::openapi::DepartementInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::DepartementDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    body: Result<Json<DepartementInput>, JsonRejection>,
) -> Result<Json<Departement>, ApiError> {
    let Json(input) = body?;
    Ok(Json(state.departements.update_departement(input).await?))
}

#[utoipa::path(
    delete, path = "/departements/{id}", tag = "departements",
    params(("id" = i32, Path, description = "Departement id")),
    responses((status = 200, description = "Remaining departements", body = [crate::openapi::DepartementDoc]))
)]
pub async fn delete_one(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Departement>>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.departements.delete_departement(id).await?))
}

#[utoipa::path(get, path = "/departements/export", tag = "departements", responses((status = 200, description = "CSV download", content_type = "text/csv", body = String)))]
pub async fn export(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state.departements.export_csv().await?;
    Ok(csv_attachment("departements.csv", csv))
}

#[utoipa::path(
    get, path = "/departements/{id}/villes", tag = "departements",
    params(("id" = i32, Path, description = "Departement id")),
    responses(
        (status = 200, description = "Villes of the departement", body = [crate::openapi::VilleDoc]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn list_villes(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.departements.list_villes(id).await?))
}

#[utoipa::path(
    get, path = "/departements/{id}/villes/{ville_id}", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), ("ville_id" = i32, Path, description = "Ville id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::VilleDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_ville(
    State(state): State<AppState>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<Ville>, ApiError> {
    let Path((id, ville_id)) = path?;
    Ok(Json(state.departements.get_ville(id, ville_id).await?))
}

#[utoipa::path(
    post, path = "/departements/{id}/villes", tag = "departements",
    params(("id" = i32, Path, description = "Departement id")),
    request_body = crate::openapi::VilleInputDoc,
    responses(
        (status = 200, description = "Created", body = String),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn add_ville(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<VilleInput>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Path(id) = path?;
    let Json(input) = body?;
    state.departements.add_ville(id, input).await?;
    Ok("Ville ajoutée")
}

#[utoipa::path(
    put, path = "/departements/{id}/villes/{ville_id}", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), ("ville_id" = i32, Path, description = "Ville id")),
    request_body = crate::openapi::VilleInputDoc,
    responses(
        (status = 200, description = "Villes after the update", body = [crate::openapi::VilleDoc]),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_ville(
    State(state): State<AppState>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    body: Result<Json<VilleInput>, JsonRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path((id, ville_id)) = path?;
    let Json(input) = body?;
    Ok(Json(state.departements.update_ville(id, ville_id, input).await?))
}

#[utoipa::path(
    delete, path = "/departements/{id}/villes/{ville_id}", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), ("ville_id" = i32, Path, description = "Ville id")),
    responses(
        (status = 200, description = "Villes after the removal", body = [crate::openapi::VilleDoc]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn remove_ville(
    State(state): State<AppState>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path((id, ville_id)) = path?;
    Ok(Json(state.departements.remove_ville(id, ville_id).await?))
}

#[utoipa::path(
    get, path = "/departements/{id}/villes/between", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), RangeQuery),
    responses(
        (status = 200, description = "Villes within the range", body = [crate::openapi::VilleDoc]),
        (status = 400, description = "Invalid range")
    )
)]
pub async fn villes_between(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    let Query(range) = query?;
    Ok(Json(state.departements.filter_villes_by_population(id, range.min, range.max).await?))
}

#[utoipa::path(
    get, path = "/departements/{id}/villes/sorted", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), SortQuery),
    responses((status = 200, description = "Villes sorted by population", body = [crate::openapi::VilleDoc]))
)]
pub async fn villes_sorted(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    let Query(sort) = query?;
    Ok(Json(state.departements.sort_villes_by_population(id, sort.order).await?))
}

#[utoipa::path(
    get, path = "/departements/{id}/villes/desc", tag = "departements",
    params(("id" = i32, Path, description = "Departement id"), LimitQuery),
    responses((status = 200, description = "Most populous villes first", body = [crate::openapi::VilleDoc]))
)]
pub async fn villes_top(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<Ville>>, ApiError> {
    let Path(id) = path?;
    let Query(q) = query?;
    Ok(Json(state.departements.top_villes(id, q.limit).await?))
}
