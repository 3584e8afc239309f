use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A priced add-on selectable for a menu item (e.g. "extra cheese +0.75").
/// Read-only reference data, linked to order items through
/// `order_item_customizations`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customization_choices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,
    pub price_extra: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item_customization::Entity")]
    OrderItemCustomizations,
}

impl Related<super::order_item_customization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItemCustomizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
