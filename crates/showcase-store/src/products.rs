use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use showcase_shared::{NewProduct, Product, ProductId, StoredImage};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Insert a product document. The store assigns the id and stamps the
    /// creation time from the server clock.
    pub fn insert_product(&self, new: &NewProduct) -> Result<Product> {
        self.insert_product_at(new, Utc::now())
    }

    fn insert_product_at(
        &self,
        new: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product> {
        let id = ProductId(Uuid::new_v4());
        let created_micros = created_at.timestamp_micros();
        // Return exactly what a later read will see.
        let created_at =
            DateTime::<Utc>::from_timestamp_micros(created_micros).unwrap_or(created_at);
        let image_doc = serde_json::to_string(&new.image)?;

        self.conn().execute(
            "INSERT INTO products (id, name, description, price, image, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                new.name,
                new.description,
                new.price,
                image_doc,
                created_micros,
            ],
        )?;

        tracing::debug!(id = %id, name = %new.name, "inserted product");

        Ok(Product {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            image: new.image.clone(),
            created_at,
        })
    }

    /// All products, newest first. Products created in the same microsecond
    /// come back in reverse insertion order.
    pub fn list_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, price, image, created_at
             FROM products
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map([], row_to_product)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    pub fn count_products(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let description: String = row.get(2)?;
    let price: f64 = row.get(3)?;
    let image_doc: String = row.get(4)?;
    let created_micros: i64 = row.get(5)?;

    let id = ProductId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let image: StoredImage = serde_json::from_str(&image_doc).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at = DateTime::<Utc>::from_timestamp_micros(created_micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(5, created_micros))?;

    Ok(Product {
        id,
        name,
        description,
        price,
        image,
        created_at,
    })
}
