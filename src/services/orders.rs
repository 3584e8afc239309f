//! Order lifecycle service.
//!
//! Validates incoming carts and status changes, delegates storage to the
//! repository, and publishes order events after a successful commit. Event
//! publication is best-effort: a full broadcast channel never fails the
//! request that triggered it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::entities::order::OrderStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventBroadcaster};
use crate::repositories::order_repository::{
    NewOrder, NewOrderLine, OrderRepository, OrderSnapshot,
};

pub const MAX_PAGE_SIZE: u64 = 100;

/// Request/Response types for the order service
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub table_id: i64,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItem {
    pub menu_item_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub customization_choice_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderSnapshot>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing the order lifecycle
#[derive(Clone)]
pub struct OrderService {
    repository: Arc<OrderRepository>,
    broadcaster: EventBroadcaster,
}

impl OrderService {
    pub fn new(repository: Arc<OrderRepository>, broadcaster: EventBroadcaster) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    /// Creates a new order from a cart.
    ///
    /// The waiter identity is taken from the authenticated token, never from
    /// the request body.
    #[instrument(skip(self, waiter, request), fields(waiter_id = waiter.waiter_id, table_id = request.table_id))]
    pub async fn create_order(
        &self,
        waiter: &AuthUser,
        request: CreateOrderRequest,
    ) -> Result<OrderSnapshot, ServiceError> {
        request.validate()?;
        for item in &request.items {
            item.validate()?;
        }

        let lines = request
            .items
            .into_iter()
            .map(|item| NewOrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                notes: item.notes,
                customization_choice_ids: dedupe_ids(item.customization_choice_ids),
            })
            .collect();

        let snapshot = self
            .repository
            .create_order(NewOrder {
                table_id: request.table_id,
                waiter_id: waiter.waiter_id,
                waiter_name: waiter.name.clone(),
                notes: request.notes,
                lines,
            })
            .await?;

        info!(
            order_id = snapshot.id,
            total_amount = %snapshot.total_amount,
            "Order created successfully"
        );

        self.broadcaster.publish(Event::OrderCreated(snapshot.clone()));

        Ok(snapshot)
    }

    /// Retrieves an order by ID
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i64) -> Result<OrderSnapshot, ServiceError> {
        self.repository
            .find_snapshot(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Lists orders newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        status: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let status = status.map(OrderStatus::parse).transpose()?;
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);

        let (orders, total) = self.repository.list(status, page, per_page).await?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Updates an order's status.
    ///
    /// Publishes `order_updated` on every accepted request, including the
    /// idempotent re-assertion of the current status.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        order_id: i64,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderSnapshot, ServiceError> {
        request.validate()?;
        let next = OrderStatus::parse(&request.status)?;

        let snapshot = self.repository.update_status(order_id, next).await?;

        info!(order_id, status = %snapshot.status, "Order status updated");

        self.broadcaster.publish(Event::OrderUpdated(snapshot.clone()));

        Ok(snapshot)
    }
}

/// Drop repeated choice ids while keeping the first occurrence's position.
fn dedupe_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_choice_ids_are_collapsed() {
        assert_eq!(dedupe_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert_eq!(dedupe_ids(vec![]), Vec::<i64>::new());
    }

    #[test]
    fn empty_cart_fails_validation() {
        let request = CreateOrderRequest {
            table_id: 1,
            notes: None,
            items: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let item = CreateOrderItem {
            menu_item_id: 1,
            quantity: 0,
            notes: None,
            customization_choice_ids: vec![],
        };
        assert!(item.validate().is_err());
    }
}
