pub mod customization_choice;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod order_item_customization;
