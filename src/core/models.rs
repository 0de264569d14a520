// Domain models for companies, accounts, sessions, catalog and orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::session_token::SessionTokenHash;

/// Meal category an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Desjejum,
    Almoco,
    CafeTarde,
    Jantar,
    Ceia,
    Lanche,
    Bebidas,
    CafeNoturno,
    FimSemana,
}

impl MealType {
    pub const ALL: [MealType; 9] = [
        MealType::Desjejum,
        MealType::Almoco,
        MealType::CafeTarde,
        MealType::Jantar,
        MealType::Ceia,
        MealType::Lanche,
        MealType::Bebidas,
        MealType::CafeNoturno,
        MealType::FimSemana,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Desjejum => "DESJEJUM",
            MealType::Almoco => "ALMOCO",
            MealType::CafeTarde => "CAFE_TARDE",
            MealType::Jantar => "JANTAR",
            MealType::Ceia => "CEIA",
            MealType::Lanche => "LANCHE",
            MealType::Bebidas => "BEBIDAS",
            MealType::CafeNoturno => "CAFE_NOTURNO",
            MealType::FimSemana => "FIM_SEMANA",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .iter()
            .copied()
            .find(|meal| meal.as_str() == s)
            .ok_or_else(|| format!("Unknown meal type '{}'", s))
    }
}

/// Orderable item names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Desjejum,
    #[serde(rename = "Almoço")]
    Almoco,
    Jantar,
    Ceia,
    Lanche,
    Bebidas,
    #[serde(rename = "Café da tarde")]
    CafeDaTarde,
    #[serde(rename = "Café noturno")]
    CafeNoturno,
    Outros,
}

impl ItemKind {
    pub const ALL: [ItemKind; 9] = [
        ItemKind::Desjejum,
        ItemKind::Almoco,
        ItemKind::Jantar,
        ItemKind::Ceia,
        ItemKind::Lanche,
        ItemKind::Bebidas,
        ItemKind::CafeDaTarde,
        ItemKind::CafeNoturno,
        ItemKind::Outros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Desjejum => "Desjejum",
            ItemKind::Almoco => "Almoço",
            ItemKind::Jantar => "Jantar",
            ItemKind::Ceia => "Ceia",
            ItemKind::Lanche => "Lanche",
            ItemKind::Bebidas => "Bebidas",
            ItemKind::CafeDaTarde => "Café da tarde",
            ItemKind::CafeNoturno => "Café noturno",
            ItemKind::Outros => "Outros",
        }
    }

    /// Meal type assigned when the item row is first created
    pub fn default_meal_type(&self) -> MealType {
        match self {
            ItemKind::Desjejum => MealType::Desjejum,
            ItemKind::Almoco => MealType::Almoco,
            ItemKind::Jantar => MealType::Jantar,
            ItemKind::Ceia => MealType::Ceia,
            ItemKind::Lanche => MealType::Lanche,
            ItemKind::Bebidas => MealType::Bebidas,
            ItemKind::CafeDaTarde => MealType::CafeTarde,
            ItemKind::CafeNoturno => MealType::CafeNoturno,
            ItemKind::Outros => MealType::FimSemana,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown item '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub cnpj: String,
    pub social_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub token_hash: SessionTokenHash,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Session joined with its user and the user's company name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWithUser {
    pub session: Session,
    pub user: User,
    pub company_name: String,
}

/// Authenticated caller, inserted into request extensions by the session middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub company_id: Uuid,
    pub company_name: String,
}

impl From<&SessionWithUser> for CurrentUser {
    fn from(value: &SessionWithUser) -> Self {
        Self {
            id: value.user.id,
            email: value.user.email.clone(),
            company_id: value.user.company_id,
            company_name: value.company_name.clone(),
        }
    }
}

/// One flattened catalog row: an item configured for a user, optionally
/// joined with one of its configured subcategories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub item: ItemKind,
    pub meal_type: MealType,
    pub item_default_quantity: Option<i32>,
    pub subcategory: Option<String>,
    pub subcategory_default_quantity: Option<i32>,
}

/// Registration input for one catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemConfig {
    pub name: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_quantity: Option<i32>,
    #[serde(default)]
    pub subcategories: Vec<NewSubcategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubcategoryConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_quantity: Option<i32>,
}

/// Validated registration handed to the store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub cnpj: String,
    pub social_name: String,
    pub items: Vec<NewItemConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

/// One persisted order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item: ItemKind,
    pub meal_type: MealType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub note: Option<String>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub note: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}
