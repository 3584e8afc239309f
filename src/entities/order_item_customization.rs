use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join row linking an order item to one selected customization choice.
/// The composite primary key makes duplicate selections structurally
/// impossible at the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_item_customizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_item_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub customization_choice_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_item::Entity",
        from = "Column::OrderItemId",
        to = "super::order_item::Column::Id"
    )]
    OrderItem,
    #[sea_orm(
        belongs_to = "super::customization_choice::Entity",
        from = "Column::CustomizationChoiceId",
        to = "super::customization_choice::Column::Id"
    )]
    CustomizationChoice,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl Related<super::customization_choice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomizationChoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
