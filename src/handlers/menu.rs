use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::permission as perm;
use crate::services::menu::{CustomizationChoiceResponse, MenuItemResponse};
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuListQuery {
    pub category: Option<String>,
    pub available: Option<bool>,
}

/// List menu items
#[utoipa::path(
    get,
    path = "/api/v1/menu/items",
    summary = "List menu items",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("available" = Option<bool>, Query, description = "Filter by availability"),
    ),
    responses(
        (status = 200, description = "Menu items retrieved successfully", body = ApiResponse<Vec<MenuItemResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
    Query(query): Query<MenuListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<MenuItemResponse>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }

    let items = state
        .services
        .menu
        .list_items(query.category.as_deref(), query.available)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Get a single menu item
#[utoipa::path(
    get,
    path = "/api/v1/menu/items/{id}",
    summary = "Get menu item",
    params(("id" = i64, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item retrieved successfully", body = ApiResponse<MenuItemResponse>),
        (status = 404, description = "Menu item not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<MenuItemResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }

    let item = state.services.menu.get_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// List customization choices
#[utoipa::path(
    get,
    path = "/api/v1/menu/customizations",
    summary = "List customization choices",
    responses(
        (status = 200, description = "Choices retrieved successfully", body = ApiResponse<Vec<CustomizationChoiceResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_customization_choices(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CustomizationChoiceResponse>>>, ServiceError> {
    if !auth_user.has_permission(perm::MENU_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the menu".to_string(),
        ));
    }

    let choices = state.services.menu.list_choices().await?;
    Ok(Json(ApiResponse::success(choices)))
}
