//! Data access for orders.
//!
//! Order creation is a single database transaction: the table, menu items and
//! customization choices are read, prices computed and every row inserted
//! before the commit, so a failing line leaves no partial order behind.
//! Reads always return fully resolved [`OrderSnapshot`]s; callers never see
//! bare entity rows.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::customization_choice::{
    self, Entity as CustomizationChoice, Model as ChoiceModel,
};
use crate::entities::dining_table::Entity as DiningTable;
use crate::entities::menu_item::{self, Entity as MenuItem, Model as MenuItemModel};
use crate::entities::order::{self, Entity as Order, Model as OrderModel, OrderStatus};
use crate::entities::order_item::{self, Entity as OrderItem, Model as OrderItemModel};
use crate::entities::order_item_customization::{self, Entity as OrderItemCustomization};
use crate::errors::ServiceError;
use crate::pricing;
use crate::repositories::{BaseRepository, Repository};

/// A customization choice as it appeared on a line, surcharge included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomizationView {
    pub id: i64,
    pub name: String,
    pub price_extra: Decimal,
}

/// One resolved order line with its frozen prices.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemSnapshot {
    pub id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub notes: Option<String>,
    pub customizations: Vec<CustomizationView>,
}

/// A fully resolved order, as served to REST clients and push-channel
/// subscribers alike.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSnapshot {
    pub id: i64,
    pub table_id: i64,
    pub table_number: i32,
    pub waiter_id: i64,
    pub waiter_name: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub items: Vec<OrderItemSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One validated cart line, ready to be priced and inserted.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
    pub customization_choice_ids: Vec<i64>,
}

/// Everything needed to open an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: i64,
    pub waiter_id: i64,
    pub waiter_name: String,
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// Repository for order operations
#[derive(Debug)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create an order with all of its lines in one transaction.
    ///
    /// Prices are computed here, from the menu rows read inside the same
    /// transaction, and frozen onto the order items. Any unknown or
    /// unavailable reference aborts the whole order.
    pub async fn create_order(&self, data: NewOrder) -> Result<OrderSnapshot, ServiceError> {
        let txn = self.base.get_db().begin().await?;

        let table = DiningTable::find_by_id(data.table_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown table id {}", data.table_id))
            })?;

        let menu_items = load_menu_items(&txn, &data.lines).await?;
        let choices = load_choices(&txn, &data.lines).await?;

        // Price every line up front so the order row carries its final total
        // from the moment it exists.
        let mut priced_lines = Vec::with_capacity(data.lines.len());
        let mut total_amount = Decimal::ZERO;
        for line in &data.lines {
            let menu_item = &menu_items[&line.menu_item_id];
            let surcharges: Vec<Decimal> = line
                .customization_choice_ids
                .iter()
                .map(|id| choices[id].price_extra)
                .collect();
            let price = pricing::compute_line_item(menu_item.price, &surcharges, line.quantity);
            total_amount += price.total_price;
            priced_lines.push((line, price));
        }

        let order = order::ActiveModel {
            table_id: Set(data.table_id),
            waiter_id: Set(data.waiter_id),
            waiter_name: Set(data.waiter_name),
            status: Set(OrderStatus::Pending.to_string()),
            total_amount: Set(total_amount),
            notes: Set(data.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut item_snapshots = Vec::with_capacity(priced_lines.len());
        for (line, price) in priced_lines {
            let item = order_item::ActiveModel {
                order_id: Set(order.id),
                menu_item_id: Set(line.menu_item_id),
                quantity: Set(line.quantity),
                unit_price: Set(price.unit_price),
                total_price: Set(price.total_price),
                notes: Set(line.notes.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            for choice_id in &line.customization_choice_ids {
                order_item_customization::ActiveModel {
                    order_item_id: Set(item.id),
                    customization_choice_id: Set(*choice_id),
                }
                .insert(&txn)
                .await?;
            }

            item_snapshots.push(item_line_snapshot(item, line, &menu_items, &choices));
        }

        txn.commit().await?;

        Ok(order_snapshot(order, table.number, item_snapshots))
    }

    /// Find an order and resolve it into a snapshot.
    pub async fn find_snapshot(&self, id: i64) -> Result<Option<OrderSnapshot>, ServiceError> {
        let Some(order) = Order::find_by_id(id).one(self.base.get_db()).await? else {
            return Ok(None);
        };
        Ok(Some(assemble_snapshot(self.base.get_db(), order).await?))
    }

    /// List orders newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<OrderSnapshot>, u64), ServiceError> {
        let mut query = Order::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(self.base.get_db(), page_size);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut snapshots = Vec::with_capacity(orders.len());
        for order in orders {
            snapshots.push(assemble_snapshot(self.base.get_db(), order).await?);
        }

        Ok((snapshots, total))
    }

    /// Move an order to a new status.
    ///
    /// The read, the state-machine check and the write run in one transaction
    /// with the row locked, so two racing updates validate against each
    /// other's committed state rather than a shared stale read. Re-asserting
    /// the current status is accepted without a write. Returns the refreshed
    /// snapshot.
    pub async fn update_status(
        &self,
        id: i64,
        next: OrderStatus,
    ) -> Result<OrderSnapshot, ServiceError> {
        let txn = self.base.get_db().begin().await?;

        let order = Order::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let current = stored_status(&order)?;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move order {} from {} to {}",
                id, current, next
            )));
        }

        let order = if current == next {
            order
        } else {
            let mut active: order::ActiveModel = order.into();
            active.status = Set(next.to_string());
            active.updated_at = Set(Some(Utc::now()));
            active.update(&txn).await?
        };

        let snapshot = assemble_snapshot(&txn, order).await?;
        txn.commit().await?;
        Ok(snapshot)
    }
}

impl Repository for OrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

fn stored_status(order: &OrderModel) -> Result<OrderStatus, ServiceError> {
    OrderStatus::parse(&order.status)
        .map_err(|_| ServiceError::InternalError(format!("Corrupt status on order {}", order.id)))
}

/// Load and check every menu item referenced by the cart.
async fn load_menu_items<C: ConnectionTrait>(
    conn: &C,
    lines: &[NewOrderLine],
) -> Result<HashMap<i64, MenuItemModel>, ServiceError> {
    let ids: Vec<i64> = lines.iter().map(|l| l.menu_item_id).collect();
    let found: HashMap<i64, MenuItemModel> = MenuItem::find()
        .filter(menu_item::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    for line in lines {
        let item = found.get(&line.menu_item_id).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown menu item id {}", line.menu_item_id))
        })?;
        if !item.is_available {
            return Err(ServiceError::ValidationError(format!(
                "Menu item '{}' is not available",
                item.name
            )));
        }
    }

    Ok(found)
}

/// Load and check every customization choice referenced by the cart.
async fn load_choices<C: ConnectionTrait>(
    conn: &C,
    lines: &[NewOrderLine],
) -> Result<HashMap<i64, ChoiceModel>, ServiceError> {
    let ids: Vec<i64> = lines
        .iter()
        .flat_map(|l| l.customization_choice_ids.iter().copied())
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let found: HashMap<i64, ChoiceModel> = CustomizationChoice::find()
        .filter(customization_choice::Column::Id.is_in(ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    for id in &ids {
        if !found.contains_key(id) {
            return Err(ServiceError::ValidationError(format!(
                "Unknown customization choice id {}",
                id
            )));
        }
    }

    Ok(found)
}

fn item_line_snapshot(
    item: OrderItemModel,
    line: &NewOrderLine,
    menu_items: &HashMap<i64, MenuItemModel>,
    choices: &HashMap<i64, ChoiceModel>,
) -> OrderItemSnapshot {
    OrderItemSnapshot {
        id: item.id,
        menu_item_id: item.menu_item_id,
        menu_item_name: menu_items[&item.menu_item_id].name.clone(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        total_price: item.total_price,
        notes: item.notes,
        customizations: line
            .customization_choice_ids
            .iter()
            .map(|id| {
                let choice = &choices[id];
                CustomizationView {
                    id: choice.id,
                    name: choice.name.clone(),
                    price_extra: choice.price_extra,
                }
            })
            .collect(),
    }
}

fn order_snapshot(
    order: OrderModel,
    table_number: i32,
    items: Vec<OrderItemSnapshot>,
) -> OrderSnapshot {
    OrderSnapshot {
        id: order.id,
        table_id: order.table_id,
        table_number,
        waiter_id: order.waiter_id,
        waiter_name: order.waiter_name,
        status: OrderStatus::parse(&order.status).unwrap_or(OrderStatus::Pending),
        total_amount: order.total_amount,
        notes: order.notes,
        items,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// Resolve a stored order row into a full snapshot.
async fn assemble_snapshot<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> Result<OrderSnapshot, ServiceError> {
    let status = stored_status(&order)?;

    let table = DiningTable::find_by_id(order.table_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("Missing table {} for order {}", order.table_id, order.id))
        })?;

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(conn)
        .await?;

    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let joins = if item_ids.is_empty() {
        Vec::new()
    } else {
        OrderItemCustomization::find()
            .filter(order_item_customization::Column::OrderItemId.is_in(item_ids))
            .all(conn)
            .await?
    };

    let choice_ids: Vec<i64> = joins.iter().map(|j| j.customization_choice_id).collect();
    let choices: HashMap<i64, ChoiceModel> = if choice_ids.is_empty() {
        HashMap::new()
    } else {
        CustomizationChoice::find()
            .filter(customization_choice::Column::Id.is_in(choice_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let menu_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
    let menu_items: HashMap<i64, MenuItemModel> = MenuItem::find()
        .filter(menu_item::Column::Id.is_in(menu_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let item_snapshots = items
        .into_iter()
        .map(|item| {
            let customizations = joins
                .iter()
                .filter(|j| j.order_item_id == item.id)
                .filter_map(|j| choices.get(&j.customization_choice_id))
                .map(|choice| CustomizationView {
                    id: choice.id,
                    name: choice.name.clone(),
                    price_extra: choice.price_extra,
                })
                .collect();

            OrderItemSnapshot {
                id: item.id,
                menu_item_id: item.menu_item_id,
                menu_item_name: menu_items
                    .get(&item.menu_item_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price,
                notes: item.notes,
                customizations,
            }
        })
        .collect();

    let mut snapshot = order_snapshot(order, table.number, item_snapshots);
    snapshot.status = status;
    Ok(snapshot)
}
