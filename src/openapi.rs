use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Comanda API",
        version = "1.0.0",
        description = r#"
# Comanda Restaurant API

Backend for a restaurant point of sale: waiters open orders against tables,
the kitchen and floor staff move them through their lifecycle, and every
change is pushed to connected clients over the `/ws/orders` websocket.

## Authentication

All endpoints require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

The websocket accepts the same token via the `Authorization` header or a
`token` query parameter.

## Order lifecycle

`pending -> confirmed -> preparing -> ready -> served -> paid`, with
`cancelled` reachable from any non-terminal status. Re-asserting the current
status is accepted as a no-op.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Menu", description = "Menu catalogue endpoints"),
        (name = "Tables", description = "Dining table endpoints"),
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order_status,

        // Menu
        crate::handlers::menu::list_menu_items,
        crate::handlers::menu::get_menu_item,
        crate::handlers::menu::list_customization_choices,

        // Tables
        crate::handlers::tables::list_tables,
        crate::handlers::tables::get_table,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Order types
            crate::repositories::order_repository::OrderSnapshot,
            crate::repositories::order_repository::OrderItemSnapshot,
            crate::repositories::order_repository::CustomizationView,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::CreateOrderItem,
            crate::services::orders::UpdateOrderStatusRequest,
            crate::services::orders::OrderListResponse,
            crate::entities::order::OrderStatus,
            crate::events::Event,

            // Catalogue types
            crate::services::menu::MenuItemResponse,
            crate::services::menu::CustomizationChoiceResponse,
            crate::services::tables::TableResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_order_endpoints() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Comanda API"));
        assert!(json.contains("/api/v1/orders"));
        assert!(json.contains("/api/v1/orders/{id}/status"));
    }
}
