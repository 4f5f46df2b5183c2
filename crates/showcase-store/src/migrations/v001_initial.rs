//! v001 -- Initial schema creation.
//!
//! Creates the `products` collection.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Products
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS products (
    id          TEXT PRIMARY KEY NOT NULL,         -- UUID v4
    name        TEXT NOT NULL CHECK (length(name) > 0),
    description TEXT NOT NULL,
    price       REAL NOT NULL CHECK (price >= 0),
    image       TEXT NOT NULL,                     -- JSON image document
    created_at  INTEGER NOT NULL                   -- unix microseconds, UTC
);

CREATE INDEX IF NOT EXISTS idx_products_created_at
    ON products(created_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
