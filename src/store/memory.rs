// In-memory datastore for development without PostgreSQL and for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::session_token::SessionTokenHash;
use crate::core::errors::AppError;
use crate::core::models::{
    CatalogRow, Company, ItemKind, MealType, NewAccount, NewOrder, PlacedOrder,
    RegisteredAccount, Session, SessionWithUser, User,
};
use crate::store::{AccountStore, CatalogStore, Datastore, OrderStore, SessionStore};

struct ItemRecord {
    id: Uuid,
    name: ItemKind,
    meal_type: MealType,
}

struct SubcategoryRecord {
    id: Uuid,
    name: String,
    item_id: Uuid,
}

struct UserItemRecord {
    id: Uuid,
    user_id: Uuid,
    item_id: Uuid,
    default_quantity: Option<i32>,
}

struct UserSubcategoryRecord {
    user_item_id: Uuid,
    subcategory_id: Uuid,
    default_quantity: Option<i32>,
}

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    sessions: Vec<Session>,
    items: Vec<ItemRecord>,
    subcategories: Vec<SubcategoryRecord>,
    user_items: Vec<UserItemRecord>,
    user_subcategories: Vec<UserSubcategoryRecord>,
    orders: Vec<PlacedOrder>,
}

impl Tables {
    fn upsert_item(&mut self, name: ItemKind, meal_type: MealType) -> Uuid {
        if let Some(existing) = self.items.iter().find(|i| i.name == name) {
            return existing.id;
        }
        let id = Uuid::new_v4();
        self.items.push(ItemRecord { id, name, meal_type });
        id
    }

    fn upsert_subcategory(&mut self, name: &str, item_id: Uuid) -> Uuid {
        if let Some(existing) = self
            .subcategories
            .iter()
            .find(|s| s.name == name && s.item_id == item_id)
        {
            return existing.id;
        }
        let id = Uuid::new_v4();
        self.subcategories.push(SubcategoryRecord {
            id,
            name: name.to_string(),
            item_id,
        });
        id
    }
}

/// Datastore backed by process memory; contents are lost on restart
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn orders_for(&self, user_id: Uuid) -> Vec<PlacedOrder> {
        self.tables
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn register(&self, account: NewAccount) -> Result<RegisteredAccount, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == account.email) {
            return Err(AppError::AccountExists);
        }

        let now = Utc::now();
        let company_id = match tables.companies.iter_mut().find(|c| c.cnpj == account.cnpj) {
            Some(company) => {
                company.social_name = account.social_name.clone();
                company.id
            }
            None => {
                let id = Uuid::new_v4();
                tables.companies.push(Company {
                    id,
                    cnpj: account.cnpj.clone(),
                    social_name: account.social_name.clone(),
                    created_at: now,
                });
                id
            }
        };

        let user_id = Uuid::new_v4();
        tables.users.push(User {
            id: user_id,
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            company_id,
            created_at: now,
        });

        for item in &account.items {
            let meal_type = item.meal_type.unwrap_or_else(|| item.name.default_meal_type());
            let item_id = tables.upsert_item(item.name, meal_type);

            let user_item_id = Uuid::new_v4();
            tables.user_items.push(UserItemRecord {
                id: user_item_id,
                user_id,
                item_id,
                default_quantity: item.default_quantity,
            });

            for sub in &item.subcategories {
                let subcategory_id = tables.upsert_subcategory(&sub.name, item_id);
                tables.user_subcategories.push(UserSubcategoryRecord {
                    user_item_id,
                    subcategory_id,
                    default_quantity: sub.default_quantity,
                });
            }
        }

        Ok(RegisteredAccount {
            user_id,
            company_id,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &SessionTokenHash,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let session = Session {
            id: Uuid::new_v4(),
            token_hash: token_hash.clone(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        };
        self.tables.write().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(
        &self,
        token_hash: &SessionTokenHash,
    ) -> Result<Option<SessionWithUser>, AppError> {
        let tables = self.tables.read().await;

        let Some(session) = tables.sessions.iter().find(|s| &s.token_hash == token_hash) else {
            return Ok(None);
        };
        let user = tables
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .ok_or_else(|| AppError::Store(format!("Session {} has no user", session.id)))?;
        let company = tables
            .companies
            .iter()
            .find(|c| c.id == user.company_id)
            .ok_or_else(|| AppError::Store(format!("User {} has no company", user.id)))?;

        Ok(Some(SessionWithUser {
            session: session.clone(),
            user: user.clone(),
            company_name: company.social_name.clone(),
        }))
    }

    async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .sessions
            .retain(|s| &s.token_hash != token_hash);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_user_items(&self, user_id: Uuid) -> Result<Vec<CatalogRow>, AppError> {
        let tables = self.tables.read().await;
        let mut rows = Vec::new();

        for config in tables.user_items.iter().filter(|c| c.user_id == user_id) {
            let item = tables
                .items
                .iter()
                .find(|i| i.id == config.item_id)
                .ok_or_else(|| AppError::Store(format!("Missing item {}", config.item_id)))?;

            let mut has_subcategories = false;
            for sub_config in tables
                .user_subcategories
                .iter()
                .filter(|s| s.user_item_id == config.id)
            {
                let sub = tables
                    .subcategories
                    .iter()
                    .find(|s| s.id == sub_config.subcategory_id)
                    .ok_or_else(|| {
                        AppError::Store(format!("Missing subcategory {}", sub_config.subcategory_id))
                    })?;
                has_subcategories = true;
                rows.push(CatalogRow {
                    item: item.name,
                    meal_type: item.meal_type,
                    item_default_quantity: config.default_quantity,
                    subcategory: Some(sub.name.clone()),
                    subcategory_default_quantity: sub_config.default_quantity,
                });
            }

            if !has_subcategories {
                rows.push(CatalogRow {
                    item: item.name,
                    meal_type: item.meal_type,
                    item_default_quantity: config.default_quantity,
                    subcategory: None,
                    subcategory_default_quantity: None,
                });
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<PlacedOrder, AppError> {
        let placed = PlacedOrder {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            note: order.note,
            lines: order.lines,
            created_at: Utc::now(),
        };
        self.tables.write().await.orders.push(placed.clone());
        Ok(placed)
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
