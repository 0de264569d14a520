// Datastore traits and their PostgreSQL / in-memory implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::session_token::SessionTokenHash;
use crate::core::errors::AppError;
use crate::core::models::{
    CatalogRow, NewAccount, NewOrder, PlacedOrder, RegisteredAccount, Session, SessionWithUser,
    User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Companies and user accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the company (or update its social name), the user and the
    /// user's catalog configuration atomically.
    async fn register(&self, account: NewAccount) -> Result<RegisteredAccount, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &SessionTokenHash,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError>;

    async fn find_session(
        &self,
        token_hash: &SessionTokenHash,
    ) -> Result<Option<SessionWithUser>, AppError>;

    /// Deleting a missing session is not an error
    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<(), AppError>;

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Flattened item/subcategory configuration for a user, in insertion order
    async fn list_user_items(&self, user_id: Uuid) -> Result<Vec<CatalogRow>, AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<PlacedOrder, AppError>;
}

/// Everything the HTTP layer needs from persistence
#[async_trait]
pub trait Datastore: AccountStore + SessionStore + CatalogStore + OrderStore {
    async fn ping(&self) -> Result<(), AppError>;
}
