//! Read access to the menu catalogue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::entities::customization_choice::{self, Entity as CustomizationChoice};
use crate::entities::menu_item::{self, Entity as MenuItem};
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub preparation_time_minutes: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<menu_item::Model> for MenuItemResponse {
    fn from(model: menu_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            preparation_time_minutes: model.preparation_time_minutes,
            is_available: model.is_available,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizationChoiceResponse {
    pub id: i64,
    pub name: String,
    pub price_extra: Decimal,
}

impl From<customization_choice::Model> for CustomizationChoiceResponse {
    fn from(model: customization_choice::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price_extra: model.price_extra,
        }
    }
}

/// Service for browsing menu items and customization choices
#[derive(Clone)]
pub struct MenuService {
    db: Arc<DatabaseConnection>,
}

impl MenuService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists menu items, optionally narrowed to a category or to what is
    /// currently orderable.
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        category: Option<&str>,
        available: Option<bool>,
    ) -> Result<Vec<MenuItemResponse>, ServiceError> {
        let mut query = MenuItem::find().order_by_asc(menu_item::Column::Name);
        if let Some(category) = category {
            query = query.filter(menu_item::Column::Category.eq(category));
        }
        if let Some(available) = available {
            query = query.filter(menu_item::Column::IsAvailable.eq(available));
        }

        let items = query.all(&*self.db).await?;
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }

    /// Retrieves a single menu item
    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i64) -> Result<MenuItemResponse, ServiceError> {
        MenuItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(MenuItemResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))
    }

    /// Lists every customization choice
    #[instrument(skip(self))]
    pub async fn list_choices(&self) -> Result<Vec<CustomizationChoiceResponse>, ServiceError> {
        let choices = CustomizationChoice::find()
            .order_by_asc(customization_choice::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(choices
            .into_iter()
            .map(CustomizationChoiceResponse::from)
            .collect())
    }
}
