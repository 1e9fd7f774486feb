use axum_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    migrator,
    services::user_service,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    migrator::up(&orm, None).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin123").await?;
    let user_id = ensure_user(&pool, "Demo User", "user@example.com", "user123").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<i32> {
    let password_hash = user_service::hash_password(password)?;

    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (brand_id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO brands (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind("Acme")
    .fetch_one(pool)
    .await?;

    let shoes_id = ensure_category(pool, "Shoes").await?;
    let hats_id = ensure_category(pool, "Hats").await?;

    ensure_product(pool, "Runner Sneaker", 59.99, brand_id, shoes_id).await?;
    ensure_product(pool, "Wool Cap", 19.50, brand_id, hats_id).await?;

    sqlx::query(
        r#"
        INSERT INTO coupons (code, percent) VALUES ($1, $2)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind("WELCOME10")
    .bind(10)
    .execute(pool)
    .await?;

    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<i32> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn ensure_product(
    pool: &sqlx::PgPool,
    name: &str,
    price: f64,
    brand_id: i32,
    category_id: i32,
) -> anyhow::Result<()> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO products (name, price, brand_id, category_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(name)
    .bind(price)
    .bind(brand_id)
    .bind(category_id)
    .execute(pool)
    .await?;

    Ok(())
}
