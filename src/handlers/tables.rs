use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::auth::permission as perm;
use crate::services::tables::TableResponse;
use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

/// List dining tables
#[utoipa::path(
    get,
    path = "/api/v1/tables",
    summary = "List tables",
    responses(
        (status = 200, description = "Tables retrieved successfully", body = ApiResponse<Vec<TableResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_tables(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TableResponse>>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read tables".to_string(),
        ));
    }

    let tables = state.services.tables.list_tables().await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// Get a single table
#[utoipa::path(
    get,
    path = "/api/v1/tables/{id}",
    summary = "Get table",
    params(("id" = i64, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table retrieved successfully", body = ApiResponse<TableResponse>),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<TableResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::TABLES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read tables".to_string(),
        ));
    }

    let table = state.services.tables.get_table(id).await?;
    Ok(Json(ApiResponse::success(table)))
}
