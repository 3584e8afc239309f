pub mod menu;
pub mod orders;
pub mod tables;

pub use menu::MenuService;
pub use orders::OrderService;
pub use tables::TableService;
