use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A tab opened at a table by a waiter.
///
/// `total_amount` is derived: it always equals the sum of the items'
/// `total_price` after any successful mutation and is never set from client
/// input. Orders are not physically deleted; cancellation is a status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub table_id: i64,
    pub waiter_id: i64,
    /// Display name captured from the waiter's token at creation time; the
    /// user store is an external collaborator and cannot be joined against.
    pub waiter_name: String,
    pub status: String,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_table::Entity",
        from = "Column::TableId",
        to = "super::dining_table::Column::Id"
    )]
    Table,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::dining_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Table.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}

/// Lifecycle status of an order.
///
/// The happy path is linear; `cancelled` branches off from every non-terminal
/// state. `paid` and `cancelled` are terminal. Re-asserting the current status
/// is always accepted as a no-op write, which keeps status updates idempotent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    StrumEnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if self == next {
            return true;
        }

        match (self, next) {
            (Pending, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Served, Paid) => true,
            (from, Cancelled) if !from.is_terminal() => true,
            _ => false,
        }
    }

    /// Parse a wire-format status value, rejecting anything outside the enum.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        raw.parse::<OrderStatus>().map_err(|_| {
            ServiceError::InvalidStatus(format!("Unknown order status: {}", raw))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::{self, *};
    use strum::IntoEnumIterator;

    #[test]
    fn happy_path_is_linear() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Served));
        assert!(Served.can_transition_to(Paid));
    }

    #[test]
    fn no_skipping_ahead() {
        assert!(!Pending.can_transition_to(Preparing));
        assert!(!Pending.can_transition_to(Paid));
        assert!(!Confirmed.can_transition_to(Served));
    }

    #[test]
    fn cancelled_reachable_from_every_non_terminal_state() {
        for status in OrderStatus::iter() {
            if status.is_terminal() {
                continue;
            }
            assert!(
                status.can_transition_to(Cancelled),
                "{status} should be cancellable"
            );
        }
    }

    #[test]
    fn terminal_states_only_accept_themselves() {
        for terminal in [Paid, Cancelled] {
            for next in OrderStatus::iter() {
                let allowed = terminal.can_transition_to(next);
                assert_eq!(allowed, terminal == next, "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn self_transition_is_always_allowed() {
        for status in OrderStatus::iter() {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn parse_round_trips_wire_format() {
        assert_eq!(OrderStatus::parse("pending").unwrap(), Pending);
        assert_eq!(OrderStatus::parse("cancelled").unwrap(), Cancelled);
        assert_eq!(Paid.to_string(), "paid");
        assert!(OrderStatus::parse("shipped").is_err());
    }
}
