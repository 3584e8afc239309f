/*!
 * # Permissions Module
 *
 * Permission strings follow the `resource:action` convention. Staff tokens
 * carry the flattened permission list; this module owns the constants and the
 * wildcard-implication rules used when checking them.
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const ALL: &'static str = "*";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const ORDERS: &'static str = "orders";
    pub const MENU: &'static str = "menu";
    pub const TABLES: &'static str = "tables";
    pub const ADMIN: &'static str = "admin";
}

/// Common permission string constants for compile-time safety
pub mod consts {
    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";

    // Menu catalogue
    pub const MENU_READ: &str = "menu:read";

    // Dining tables
    pub const TABLES_READ: &str = "tables:read";
}

/// Format a permission string
pub fn format_permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

/// Check if a granted permission satisfies a required one.
///
/// Besides an exact match, `resource:*` covers every action on that resource,
/// and `admin:*` or a bare `*` covers everything.
pub fn is_permission_implied(granted: &str, required: &str) -> bool {
    if granted == required || granted == "*" {
        return true;
    }

    let granted_parts: Vec<&str> = granted.split(':').collect();
    let required_parts: Vec<&str> = required.split(':').collect();

    if granted_parts.len() == 2 && required_parts.len() == 2 {
        let (granted_resource, granted_action) = (granted_parts[0], granted_parts[1]);
        let required_resource = required_parts[0];

        if granted_resource == required_resource && granted_action == Actions::ALL {
            return true;
        }

        if granted_resource == Resources::ADMIN && granted_action == Actions::ALL {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_implied() {
        assert!(is_permission_implied(consts::ORDERS_READ, consts::ORDERS_READ));
        assert!(!is_permission_implied(consts::ORDERS_READ, consts::ORDERS_CREATE));
    }

    #[test]
    fn resource_wildcard_covers_all_actions() {
        assert!(is_permission_implied("orders:*", consts::ORDERS_UPDATE));
        assert!(!is_permission_implied("orders:*", consts::MENU_READ));
    }

    #[test]
    fn admin_wildcard_covers_everything() {
        assert!(is_permission_implied("admin:*", consts::TABLES_READ));
        assert!(is_permission_implied("*", consts::ORDERS_CREATE));
    }
}
