use crate::api::error::AppError;
use crate::models::{MaterialClass, MaterialResponse};
use crate::services::category_tree::{CategoryNode, CategoryTree};
use crate::services::material_filter;
use crate::utils::validation::normalize_category_id;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    pub category_tag: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassMaterialsQuery {
    /// Category whose subtree to show
    pub category: Option<String>,
    /// Case-insensitive title search
    pub q: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClassPageResponse {
    pub class: String,
    pub name: String,
    pub categories: Vec<CategoryNode>,
    pub materials: Vec<MaterialResponse>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoriesQuery {
    /// Only categories offered for this class
    pub class: Option<String>,
}

#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Known classes", body = Vec<ClassInfo>)
    ),
    tag = "catalog"
)]
pub async fn list_classes() -> Json<Vec<ClassInfo>> {
    Json(
        MaterialClass::ALL
            .iter()
            .map(|c| ClassInfo {
                id: c.as_str().to_string(),
                name: c.display_name().to_string(),
                category_tag: c.category_tag().as_str().to_string(),
            })
            .collect(),
    )
}

fn known_class(class: &str) -> Result<MaterialClass, AppError> {
    class
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown class '{}'", class)))
}

#[utoipa::path(
    get,
    path = "/class/{class}/materials",
    params(
        ("class" = String, Path, description = "Class id, e.g. 12-science"),
        ClassMaterialsQuery
    ),
    responses(
        (status = 200, description = "Filtered materials and the class category tree", body = ClassPageResponse),
        (status = 404, description = "Unknown class")
    ),
    tag = "catalog"
)]
pub async fn class_materials(
    State(state): State<crate::AppState>,
    Path(class): Path<String>,
    Query(query): Query<ClassMaterialsQuery>,
) -> Result<Json<ClassPageResponse>, AppError> {
    let class = known_class(&class)?;
    let listing = state.material_service.class_listing(class).await?;

    let selected = normalize_category_id(query.category.as_deref());
    let search = query.q.as_deref().unwrap_or("").trim();

    let materials = material_filter::filter(
        &listing.materials,
        &listing.categories,
        selected.as_deref(),
        search,
    )
    .into_iter()
    .cloned()
    .map(MaterialResponse::from)
    .collect();

    let offered = CategoryTree::new(&listing.categories).filter_by_class(class.as_str());
    let categories = CategoryTree::new(offered).nested(None, selected.as_deref());

    Ok(Json(ClassPageResponse {
        class: class.as_str().to_string(),
        name: class.display_name().to_string(),
        categories,
        materials,
    }))
}

#[utoipa::path(
    get,
    path = "/categories",
    params(CategoriesQuery),
    responses(
        (status = 200, description = "Nested category forest", body = Vec<CategoryNode>),
        (status = 404, description = "Unknown class")
    ),
    tag = "catalog"
)]
pub async fn category_forest(
    State(state): State<crate::AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    let all = state.category_service.all().await?;
    let tree = CategoryTree::new(&all);

    let forest = match query.class.as_deref().filter(|c| !c.is_empty()) {
        Some(class) => {
            let class = known_class(class)?;
            CategoryTree::new(tree.filter_by_class(class.as_str())).nested(None, None)
        }
        None => tree.nested(None, None),
    };

    Ok(Json(forest))
}
