//! Repository implementations for the Products domain

pub mod products;
pub mod publish_history;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use products::ProductRepository;
pub use publish_history::PublishHistoryRepository;
pub use transactions::complete_publish_tx;

/// Combined repository access for the Products domain
#[derive(Clone)]
pub struct ProductsRepositories {
    pool: PgPool,
    pub products: ProductRepository,
    pub publish_history: PublishHistoryRepository,
}

impl ProductsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool.clone()),
            publish_history: PublishHistoryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
