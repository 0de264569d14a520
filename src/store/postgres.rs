// PostgreSQL-backed datastore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::session_token::SessionTokenHash;
use crate::core::errors::AppError;
use crate::core::models::{
    CatalogRow, ItemKind, MealType, NewAccount, NewOrder, PlacedOrder, RegisteredAccount,
    Session, SessionWithUser, User,
};
use crate::store::{AccountStore, CatalogStore, Datastore, OrderStore, SessionStore};

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    company_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            company_id: r.company_id,
            created_at: r.created_at,
        }
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    token_hash: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(r: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: r.id,
            token_hash: SessionTokenHash::from_hash_string(&r.token_hash).map_err(AppError::Store)?,
            user_id: r.user_id,
            expires_at: r.expires_at,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct SessionUserRow {
    id: Uuid,
    token_hash: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    email: String,
    password_hash: String,
    company_id: Uuid,
    user_created_at: DateTime<Utc>,
    social_name: String,
}

#[derive(FromRow)]
struct CatalogDbRow {
    item_name: String,
    meal_type: String,
    item_default_quantity: Option<i32>,
    subcategory_name: Option<String>,
    subcategory_default_quantity: Option<i32>,
}

impl TryFrom<CatalogDbRow> for CatalogRow {
    type Error = AppError;

    fn try_from(r: CatalogDbRow) -> Result<Self, Self::Error> {
        Ok(CatalogRow {
            item: r.item_name.parse::<ItemKind>().map_err(AppError::Store)?,
            meal_type: r.meal_type.parse::<MealType>().map_err(AppError::Store)?,
            item_default_quantity: r.item_default_quantity,
            subcategory: r.subcategory_name,
            subcategory_default_quantity: r.subcategory_default_quantity,
        })
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Store(format!("Migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl AccountStore for PgStore {
    async fn register(&self, account: NewAccount) -> Result<RegisteredAccount, AppError> {
        let mut tx = self.pool.begin().await?;

        let company_id: Uuid = sqlx::query_scalar(
            "INSERT INTO companies (id, cnpj, social_name)
             VALUES ($1, $2, $3)
             ON CONFLICT (cnpj) DO UPDATE SET social_name = EXCLUDED.social_name
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&account.cnpj)
        .bind(&account.social_name)
        .fetch_one(&mut *tx)
        .await?;

        let user_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, company_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(company_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AccountExists
            } else {
                AppError::from(e)
            }
        })?;

        for item in &account.items {
            let meal_type = item.meal_type.unwrap_or_else(|| item.name.default_meal_type());

            // DO UPDATE with a no-op assignment so RETURNING yields the existing id
            let item_id: Uuid = sqlx::query_scalar(
                "INSERT INTO items (id, name, meal_type)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id",
            )
            .bind(Uuid::new_v4())
            .bind(item.name.as_str())
            .bind(meal_type.as_str())
            .fetch_one(&mut *tx)
            .await?;

            let user_item_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO user_item_configs (id, user_id, item_id, default_quantity)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_item_id)
            .bind(user_id)
            .bind(item_id)
            .bind(item.default_quantity)
            .execute(&mut *tx)
            .await?;

            for sub in &item.subcategories {
                let subcategory_id: Uuid = sqlx::query_scalar(
                    "INSERT INTO subcategories (id, name, item_id)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (name, item_id) DO UPDATE SET name = EXCLUDED.name
                     RETURNING id",
                )
                .bind(Uuid::new_v4())
                .bind(&sub.name)
                .bind(item_id)
                .fetch_one(&mut *tx)
                .await?;

                sqlx::query(
                    "INSERT INTO user_subcategory_configs (id, user_item_id, subcategory_id, default_quantity)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(Uuid::new_v4())
                .bind(user_item_id)
                .bind(subcategory_id)
                .bind(sub.default_quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        debug!(user_id = %user_id, company_id = %company_id, "Account registered");
        Ok(RegisteredAccount {
            user_id,
            company_id,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, company_id, created_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &SessionTokenHash,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO sessions (id, token_hash, user_id, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, token_hash, user_id, expires_at, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(token_hash.as_str())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Session::try_from(row)
    }

    async fn find_session(
        &self,
        token_hash: &SessionTokenHash,
    ) -> Result<Option<SessionWithUser>, AppError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            "SELECT s.id, s.token_hash, s.user_id, s.expires_at, s.created_at,
                    u.email, u.password_hash, u.company_id, u.created_at AS user_created_at,
                    c.social_name
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             JOIN companies c ON c.id = u.company_id
             WHERE s.token_hash = $1",
        )
        .bind(token_hash.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let session = Session::try_from(SessionRow {
            id: r.id,
            token_hash: r.token_hash,
            user_id: r.user_id,
            expires_at: r.expires_at,
            created_at: r.created_at,
        })?;
        let user = User {
            id: r.user_id,
            email: r.email,
            password_hash: r.password_hash,
            company_id: r.company_id,
            created_at: r.user_created_at,
        };

        Ok(Some(SessionWithUser {
            session,
            user,
            company_name: r.social_name,
        }))
    }

    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_user_items(&self, user_id: Uuid) -> Result<Vec<CatalogRow>, AppError> {
        let rows = sqlx::query_as::<_, CatalogDbRow>(
            "SELECT i.name AS item_name,
                    i.meal_type,
                    uic.default_quantity AS item_default_quantity,
                    sc.name AS subcategory_name,
                    usc.default_quantity AS subcategory_default_quantity
             FROM user_item_configs uic
             JOIN items i ON i.id = uic.item_id
             LEFT JOIN user_subcategory_configs usc ON usc.user_item_id = uic.id
             LEFT JOIN subcategories sc ON sc.id = usc.subcategory_id
             WHERE uic.user_id = $1
             ORDER BY uic.position, usc.position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CatalogRow::try_from).collect()
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: NewOrder) -> Result<PlacedOrder, AppError> {
        let mut tx = self.pool.begin().await?;
        let order_id = Uuid::new_v4();

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO orders (id, user_id, note)
             VALUES ($1, $2, $3)
             RETURNING created_at",
        )
        .bind(order_id)
        .bind(order.user_id)
        .bind(order.note.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity)
                .map_err(|_| AppError::InvalidInput("Quantity too large".to_string()))?;
            sqlx::query(
                "INSERT INTO order_lines (id, order_id, item, meal_type, subcategory, quantity, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(line.item.as_str())
            .bind(line.meal_type.as_str())
            .bind(line.subcategory.as_deref())
            .bind(quantity)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(PlacedOrder {
            id: order_id,
            user_id: order.user_id,
            note: order.note,
            lines: order.lines,
            created_at,
        })
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
