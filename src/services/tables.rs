//! Read access to the dining room layout.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::entities::dining_table::{self, Entity as DiningTable};
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TableResponse {
    pub id: i64,
    pub number: i32,
    pub capacity: i32,
    pub is_occupied: bool,
}

impl From<dining_table::Model> for TableResponse {
    fn from(model: dining_table::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            capacity: model.capacity,
            is_occupied: model.is_occupied,
        }
    }
}

/// Service for browsing dining tables
#[derive(Clone)]
pub struct TableService {
    db: Arc<DatabaseConnection>,
}

impl TableService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists every table, in seating order.
    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<TableResponse>, ServiceError> {
        let tables = DiningTable::find()
            .order_by_asc(dining_table::Column::Number)
            .all(&*self.db)
            .await?;
        Ok(tables.into_iter().map(TableResponse::from).collect())
    }

    /// Retrieves a single table
    #[instrument(skip(self))]
    pub async fn get_table(&self, id: i64) -> Result<TableResponse, ServiceError> {
        DiningTable::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(TableResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", id)))
    }
}
