use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::config::Config;

pub type DbPool = Pool<Postgres>;

/// Connect to Postgres and bring the schema up to date.
pub async fn init_db(config: &Config) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
