//! Ordered, reversible schema migrations.
//!
//! Applied versions are recorded in the `schema_migrations` ledger table.
//! Each migration is either Pending or Applied: `apply` moves it to Applied,
//! `revert` (legal only from Applied) moves it back. Explicitly applying an
//! already-applied migration is rejected without touching the store.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::{MigrationName, MigrationTrait, SchemaManager};
use thiserror::Error;

mod m20241210_070901_create_users;
mod m20241210_070956_create_brands;
mod m20241210_071023_create_categories;
mod m20241210_071101_create_coupons;
mod m20241210_071148_create_products;
mod m20241210_071230_create_carts;
mod m20241210_071311_create_cart_items;

const LEDGER_TABLE: &str = "schema_migrations";

pub struct Migrator;

impl Migrator {
    /// Migrations in application order. Append only; never reorder.
    pub fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241210_070901_create_users::Migration),
            Box::new(m20241210_070956_create_brands::Migration),
            Box::new(m20241210_071023_create_categories::Migration),
            Box::new(m20241210_071101_create_coupons::Migration),
            Box::new(m20241210_071148_create_products::Migration),
            Box::new(m20241210_071230_create_carts::Migration),
            Box::new(m20241210_071311_create_cart_items::Migration),
        ]
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration `{0}` has already been applied")]
    AlreadyApplied(String),

    #[error("migration `{0}` is not applied")]
    NotApplied(String),

    #[error("unknown migration `{0}`")]
    Unknown(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    Pending,
    Applied,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::Pending => write!(f, "Pending"),
            MigrationStatus::Applied => write!(f, "Applied"),
        }
    }
}

/// Apply pending migrations in order, at most `steps` of them (all if None).
/// Returns the names applied.
pub async fn up(
    db: &DatabaseConnection,
    steps: Option<usize>,
) -> Result<Vec<String>, MigrationError> {
    ensure_ledger(db).await?;
    let applied = applied_versions(db).await?;
    let manager = SchemaManager::new(db);

    let mut done = Vec::new();
    for migration in Migrator::migrations() {
        if let Some(steps) = steps {
            if done.len() >= steps {
                break;
            }
        }
        let name = migration.name().to_string();
        if applied.contains(&name) {
            continue;
        }
        tracing::info!(migration = %name, "applying");
        migration.up(&manager).await?;
        record_applied(db, &name).await?;
        done.push(name);
    }
    Ok(done)
}

/// Revert applied migrations in reverse order, at most `steps` of them
/// (all if None). Returns the names reverted.
pub async fn down(
    db: &DatabaseConnection,
    steps: Option<usize>,
) -> Result<Vec<String>, MigrationError> {
    ensure_ledger(db).await?;
    let applied = applied_versions(db).await?;
    let manager = SchemaManager::new(db);

    let mut done = Vec::new();
    for migration in Migrator::migrations().into_iter().rev() {
        if let Some(steps) = steps {
            if done.len() >= steps {
                break;
            }
        }
        let name = migration.name().to_string();
        if !applied.contains(&name) {
            continue;
        }
        tracing::info!(migration = %name, "reverting");
        migration.down(&manager).await?;
        remove_applied(db, &name).await?;
        done.push(name);
    }
    Ok(done)
}

/// Apply a single migration by name. Rejected if it is already applied.
pub async fn apply(db: &DatabaseConnection, name: &str) -> Result<(), MigrationError> {
    ensure_ledger(db).await?;
    let migration = find(name)?;
    if applied_versions(db).await?.contains(&name.to_string()) {
        return Err(MigrationError::AlreadyApplied(name.to_string()));
    }
    let manager = SchemaManager::new(db);
    migration.up(&manager).await?;
    record_applied(db, name).await?;
    Ok(())
}

/// Revert a single migration by name. Rejected unless it is applied.
pub async fn revert(db: &DatabaseConnection, name: &str) -> Result<(), MigrationError> {
    ensure_ledger(db).await?;
    let migration = find(name)?;
    if !applied_versions(db).await?.contains(&name.to_string()) {
        return Err(MigrationError::NotApplied(name.to_string()));
    }
    let manager = SchemaManager::new(db);
    migration.down(&manager).await?;
    remove_applied(db, name).await?;
    Ok(())
}

/// Every migration with its current state, in application order.
pub async fn status(
    db: &DatabaseConnection,
) -> Result<Vec<(String, MigrationStatus)>, MigrationError> {
    ensure_ledger(db).await?;
    let applied = applied_versions(db).await?;
    Ok(Migrator::migrations()
        .iter()
        .map(|m| {
            let name = m.name().to_string();
            let state = if applied.contains(&name) {
                MigrationStatus::Applied
            } else {
                MigrationStatus::Pending
            };
            (name, state)
        })
        .collect())
}

fn find(name: &str) -> Result<Box<dyn MigrationTrait>, MigrationError> {
    Migrator::migrations()
        .into_iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| MigrationError::Unknown(name.to_string()))
}

async fn ensure_ledger(db: &DatabaseConnection) -> Result<(), DbErr> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {LEDGER_TABLE} (\
         version VARCHAR(255) PRIMARY KEY, \
         applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW())"
    );
    db.execute(Statement::from_string(db.get_database_backend(), ddl))
        .await?;
    Ok(())
}

async fn applied_versions(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT version FROM {LEDGER_TABLE} ORDER BY applied_at"),
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "version"))
        .collect()
}

async fn record_applied(db: &DatabaseConnection, name: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        format!("INSERT INTO {LEDGER_TABLE} (version) VALUES ($1)"),
        [name.into()],
    ))
    .await?;
    Ok(())
}

async fn remove_applied(db: &DatabaseConnection, name: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        format!("DELETE FROM {LEDGER_TABLE} WHERE version = $1"),
        [name.into()],
    ))
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len(), "duplicate migration name");
        assert_eq!(sorted, names, "migrations must be declared in version order");
    }

    #[test]
    fn referenced_tables_are_created_first() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let position = |needle: &str| {
            names
                .iter()
                .position(|n| n.contains(needle))
                .unwrap_or_else(|| panic!("missing migration for {needle}"))
        };

        assert!(position("users") < position("carts"));
        assert!(position("coupons") < position("carts"));
        assert!(position("brands") < position("products"));
        assert!(position("categories") < position("products"));
        assert!(position("carts") < position("cart_items"));
        assert!(position("products") < position("cart_items"));
    }
}
