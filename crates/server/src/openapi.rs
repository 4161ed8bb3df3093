use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct VilleDoc {
    pub id: i32,
    pub nom: String,
    #[schema(rename = "nbHabitants")]
    pub nb_habitants: i32,
    #[schema(rename = "departementId")]
    pub departement_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct DepartementDoc {
    pub id: i32,
    pub nom: String,
    pub code: String,
    pub villes: Vec<VilleDoc>,
}

#[derive(ToSchema)]
pub struct DepartementInputDoc {
    /// Required for PUT, ignored by POST
    pub id: Option<i32>,
    pub nom: String,
    pub code: String,
}

#[derive(ToSchema)]
pub struct VilleInputDoc {
    pub nom: String,
    #[schema(rename = "nbHabitants")]
    pub nb_habitants: i32,
    #[schema(rename = "departementId")]
    pub departement_id: Option<i32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::departements::list,
        crate::routes::departements::get_one,
        crate::routes::departements::create,
        crate::routes::departements::update,
        crate::routes::departements::delete_one,
        crate::routes::departements::export,
        crate::routes::departements::list_villes,
        crate::routes::departements::get_ville,
        crate::routes::departements::add_ville,
        crate::routes::departements::update_ville,
        crate::routes::departements::remove_ville,
        crate::routes::departements::villes_between,
        crate::routes::departements::villes_sorted,
        crate::routes::departements::villes_top,
        crate::routes::villes::list,
        crate::routes::villes::get_one,
        crate::routes::villes::create,
        crate::routes::villes::update,
        crate::routes::villes::delete_one,
        crate::routes::villes::search,
        crate::routes::villes::greater_than,
        crate::routes::villes::between,
        crate::routes::villes::export,
    ),
    components(
        schemas(
            HealthResponse,
            VilleDoc,
            DepartementDoc,
            DepartementInputDoc,
            VilleInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "departements"),
        (name = "villes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/departements",
            "/departements/{id}",
            "/departements/export",
            "/departements/{id}/villes",
            "/departements/{id}/villes/{ville_id}",
            "/departements/{id}/villes/between",
            "/departements/{id}/villes/sorted",
            "/departements/{id}/villes/desc",
            "/villes",
            "/villes/{id}",
            "/villes/search",
            "/villes/min",
            "/villes/between",
            "/villes/export",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
