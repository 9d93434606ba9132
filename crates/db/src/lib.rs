pub mod models;
pub mod repositories;
pub mod schema;
pub mod tx;

pub use repositories::PgMemberGroupRepository;
pub use tx::{PgTransactionManager, PgUnitOfWork};

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}
