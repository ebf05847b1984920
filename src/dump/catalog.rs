//! Entity catalog: which dump tables map to which entities, and which
//! columns need coercion.
//!
//! The built-in lists describe the logistics schema. They are data, not
//! parser logic; callers extend them with the `with_*` builders.

use std::collections::{HashMap, HashSet};

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Canonical record types an import can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum EntityKind {
    Customers,
    Suppliers,
    Products,
    Warehouses,
    Orders,
    OrderItems,
    Shipments,
    PartialShipments,
    Invoices,
    Payments,
    Carriers,
    Drivers,
    Vehicles,
    Users,
}

impl EntityKind {
    /// Entity key used as the logical table and counter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customers => "customers",
            EntityKind::Suppliers => "suppliers",
            EntityKind::Products => "products",
            EntityKind::Warehouses => "warehouses",
            EntityKind::Orders => "orders",
            EntityKind::OrderItems => "orderItems",
            EntityKind::Shipments => "shipments",
            EntityKind::PartialShipments => "partialShipments",
            EntityKind::Invoices => "invoices",
            EntityKind::Payments => "payments",
            EntityKind::Carriers => "carriers",
            EntityKind::Drivers => "drivers",
            EntityKind::Vehicles => "vehicles",
            EntityKind::Users => "users",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const TABLE_ALIASES: &[(&str, EntityKind)] = &[
    ("customers", EntityKind::Customers),
    ("customer", EntityKind::Customers),
    ("clients", EntityKind::Customers),
    ("suppliers", EntityKind::Suppliers),
    ("supplier", EntityKind::Suppliers),
    ("products", EntityKind::Products),
    ("product", EntityKind::Products),
    ("warehouses", EntityKind::Warehouses),
    ("warehouse", EntityKind::Warehouses),
    ("orders", EntityKind::Orders),
    ("order", EntityKind::Orders),
    ("order_items", EntityKind::OrderItems),
    ("orderitems", EntityKind::OrderItems),
    ("orderitem", EntityKind::OrderItems),
    ("shipments", EntityKind::Shipments),
    ("shipment", EntityKind::Shipments),
    ("partial_shipments", EntityKind::PartialShipments),
    ("partialshipments", EntityKind::PartialShipments),
    ("partialshipment", EntityKind::PartialShipments),
    ("invoices", EntityKind::Invoices),
    ("invoice", EntityKind::Invoices),
    ("payments", EntityKind::Payments),
    ("payment", EntityKind::Payments),
    ("carriers", EntityKind::Carriers),
    ("carrier", EntityKind::Carriers),
    ("drivers", EntityKind::Drivers),
    ("driver", EntityKind::Drivers),
    ("vehicles", EntityKind::Vehicles),
    ("vehicle", EntityKind::Vehicles),
    ("users", EntityKind::Users),
    ("user", EntityKind::Users),
];

const BOOLEAN_COLUMNS: &[&str] = &[
    "active",
    "is_active",
    "isActive",
    "is_default",
    "isDefault",
    "is_paid",
    "isPaid",
    "paid",
    "delivered",
    "is_delivered",
    "fragile",
    "hazardous",
    "requires_signature",
    "requiresSignature",
    "is_admin",
    "isAdmin",
    "archived",
];

const JSON_COLUMNS: &[&str] = &[
    "address",
    "shipping_address",
    "shippingAddress",
    "billing_address",
    "billingAddress",
    "dimensions",
    "items",
    "metadata",
    "settings",
    "contact",
    "tracking_events",
    "trackingEvents",
];

// Flags older dumps stored as 0/1 under names outside the generic list
const LEGACY_FLAGS: &[(EntityKind, &str)] = &[
    (EntityKind::Shipments, "isDelivered"),
    (EntityKind::PartialShipments, "invoiced"),
];

/// Table-to-entity mapping and per-column coercion lists.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<String, EntityKind>,
    boolean_columns: HashSet<String>,
    json_columns: HashSet<String>,
    legacy_flags: HashSet<(EntityKind, String)>,
}

impl Default for Catalog {
    fn default() -> Self {
        // Every entity also resolves from its own key
        let tables = EntityKind::iter()
            .map(|kind| (normalize_table_name(kind.as_str()), kind))
            .chain(
                TABLE_ALIASES
                    .iter()
                    .map(|(name, kind)| (name.to_string(), *kind)),
            )
            .collect();
        Catalog {
            tables,
            boolean_columns: BOOLEAN_COLUMNS.iter().map(|c| c.to_string()).collect(),
            json_columns: JSON_COLUMNS.iter().map(|c| c.to_string()).collect(),
            legacy_flags: LEGACY_FLAGS
                .iter()
                .map(|(kind, column)| (*kind, column.to_string()))
                .collect(),
        }
    }
}

impl Catalog {
    /// Maps another dump table name to an entity.
    pub fn with_table(mut self, table: &str, entity: EntityKind) -> Self {
        self.tables.insert(normalize_table_name(table), entity);
        self
    }

    /// Adds a column that is coerced to a boolean for every entity.
    pub fn with_boolean_column(mut self, column: &str) -> Self {
        self.boolean_columns.insert(column.to_string());
        self
    }

    /// Adds a column whose string values are parsed as JSON when they look
    /// like an object or array.
    pub fn with_json_column(mut self, column: &str) -> Self {
        self.json_columns.insert(column.to_string());
        self
    }

    /// Resolves a dump table name to its entity.
    ///
    /// Matching ignores case and backticks. Unknown tables yield `None`.
    pub fn resolve_entity(&self, table: &str) -> Option<EntityKind> {
        self.tables.get(&normalize_table_name(table)).copied()
    }

    /// Whether `column` of `entity` gets the boolean coercion.
    pub fn is_boolean_column(&self, entity: EntityKind, column: &str) -> bool {
        self.boolean_columns.contains(column)
            || self.legacy_flags.contains(&(entity, column.to_string()))
    }

    pub fn is_json_column(&self, column: &str) -> bool {
        self.json_columns.contains(column)
    }
}

fn normalize_table_name(table: &str) -> String {
    table.trim().replace('`', "").to_lowercase()
}
