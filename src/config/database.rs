//! Database configuration module for the storefront.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    CartItem, CheckoutSession, Favorite, Order, OrderItem, Product, ProductImage, Profile,
    Promotion, cart_item, favorite,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema,
    sea_query::Index,
};
use std::path::Path;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file (created on demand) if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory holding a file-backed `SQLite` database, if it has one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_unique_index<E, C>(
    db: &DatabaseConnection,
    name: &str,
    entity: E,
    columns: [C; 2],
) -> Result<()>
where
    E: EntityTrait,
    C: sea_orm::ColumnTrait,
{
    let builder = db.get_database_backend();
    let mut statement = Index::create();
    statement
        .name(name)
        .table(entity.table_ref())
        .unique()
        .if_not_exists();
    for column in columns {
        statement.col(column);
    }
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all storefront tables that do not exist yet.
///
/// Parent tables are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Profile).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, ProductImage).await?;
    create_table(db, &schema, Promotion).await?;
    create_table(db, &schema, CartItem).await?;
    create_table(db, &schema, Favorite).await?;
    create_table(db, &schema, CheckoutSession).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderItem).await?;

    // One cart line and one favorite per (user, product)
    create_unique_index(
        db,
        "idx_cart_items_user_product",
        CartItem,
        [cart_item::Column::UserId, cart_item::Column::ProductId],
    )
    .await?;
    create_unique_index(
        db,
        "idx_favorites_user_product",
        Favorite,
        [favorite::Column::UserId, favorite::Column::ProductId],
    )
    .await?;

    info!("Database tables ensured.");
    Ok(())
}
