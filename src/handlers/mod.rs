pub mod menu;
pub mod orders;
pub mod tables;
pub mod ws;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventBroadcaster;
use crate::repositories::order_repository::OrderRepository;
use crate::services::{MenuService, OrderService, TableService};

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub menu: Arc<MenuService>,
    pub tables: Arc<TableService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, broadcaster: EventBroadcaster) -> Self {
        let order_repository = Arc::new(OrderRepository::new(db.clone()));

        Self {
            orders: Arc::new(OrderService::new(order_repository, broadcaster)),
            menu: Arc::new(MenuService::new(db.clone())),
            tables: Arc::new(TableService::new(db)),
        }
    }
}
