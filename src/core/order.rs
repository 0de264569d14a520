//! Order cart aggregation and submission checks.
//!
//! An order holds at most one entry per item. An entry carries either a
//! plain quantity, a list of subcategory quantities, or both. Entries that
//! drop to nothing are removed.
//!
//! An item can only be submitted while its meal type is the current meal.

use serde::{Deserialize, Serialize};

use crate::core::catalog::{find_item, DashboardItem};
use crate::core::errors::AppError;
use crate::core::meal;
use crate::core::models::{ItemKind, OrderLine};

/// Largest quantity a single line may carry; matches the INTEGER column
const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub items: Vec<OrderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub item: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<SubcategoryEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryEntry {
    pub name: String,
    pub quantity: u32,
}

/// Checked submission: persistable lines and their unit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLines {
    pub lines: Vec<OrderLine>,
    pub total_items: u32,
}

impl OrderEntry {
    fn is_empty(&self) -> bool {
        self.quantity.unwrap_or(0) == 0
            && self.subcategories.as_ref().map_or(true, |subs| subs.is_empty())
    }

    /// Units in this entry, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.subcategories
            .iter()
            .flatten()
            .fold(self.quantity.unwrap_or(0), |acc, s| acc.saturating_add(s.quantity))
    }
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn entry(&self, item: ItemKind) -> Option<&OrderEntry> {
        self.items.iter().find(|e| e.item == item)
    }

    /// Add one unit of `item`, or of its subcategory `sub`
    pub fn add(&mut self, item: ItemKind, sub: Option<&str>) {
        let Some(index) = self.items.iter().position(|e| e.item == item) else {
            self.items.push(match sub {
                Some(name) => OrderEntry {
                    item,
                    quantity: None,
                    subcategories: Some(vec![SubcategoryEntry {
                        name: name.to_string(),
                        quantity: 1,
                    }]),
                },
                None => OrderEntry {
                    item,
                    quantity: Some(1),
                    subcategories: None,
                },
            });
            return;
        };

        let entry = &mut self.items[index];
        match sub {
            None => entry.quantity = Some(entry.quantity.unwrap_or(0).saturating_add(1)),
            Some(name) => {
                let subs = entry.subcategories.get_or_insert_with(Vec::new);
                match subs.iter_mut().find(|s| s.name == name) {
                    Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
                    None => subs.push(SubcategoryEntry {
                        name: name.to_string(),
                        quantity: 1,
                    }),
                }
            }
        }
    }

    /// Change a quantity by `delta`, dropping whatever reaches zero
    pub fn update_quantity(&mut self, item: ItemKind, delta: i64, sub: Option<&str>) {
        let Some(index) = self.items.iter().position(|e| e.item == item) else {
            return;
        };

        let entry = &mut self.items[index];
        match sub {
            None => {
                let next = i64::from(entry.quantity.unwrap_or(0)) + delta;
                if next <= 0 {
                    self.items.remove(index);
                    return;
                }
                entry.quantity = Some(u32::try_from(next).unwrap_or(u32::MAX));
            }
            Some(name) => {
                let Some(subs) = entry.subcategories.as_mut() else {
                    return;
                };
                let Some(pos) = subs.iter().position(|s| s.name == name) else {
                    return;
                };
                let next = i64::from(subs[pos].quantity) + delta;
                if next <= 0 {
                    subs.remove(pos);
                } else {
                    subs[pos].quantity = u32::try_from(next).unwrap_or(u32::MAX);
                }
                if subs.is_empty() {
                    entry.subcategories = None;
                }
                if entry.is_empty() {
                    self.items.remove(index);
                }
            }
        }
    }

    /// Units in the cart, saturating at `u32::MAX`
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, entry| acc.saturating_add(entry.total()))
    }

    /// Check the cart against the caller's catalog and the current meal at
    /// `hour`, and flatten it into persistable lines.
    pub fn to_lines(&self, catalog: &[DashboardItem], hour: u32) -> Result<OrderLines, AppError> {
        if self.items.is_empty() {
            return Err(AppError::InvalidInput("Order has no items".to_string()));
        }

        let current = meal::current_meal(hour);
        let mut lines = Vec::new();
        let mut total_items: u32 = 0;
        for (index, entry) in self.items.iter().enumerate() {
            if self.items[..index].iter().any(|e| e.item == entry.item) {
                return Err(AppError::InvalidInput(format!(
                    "Item '{}' listed more than once",
                    entry.item
                )));
            }

            let configured = find_item(catalog, entry.item).ok_or_else(|| {
                AppError::InvalidInput(format!("Item '{}' is not in your catalog", entry.item))
            })?;

            if current != Some(configured.meal_type) {
                return Err(AppError::MealClosed { item: entry.item });
            }

            if entry.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Item '{}' has no quantity",
                    entry.item
                )));
            }

            if let Some(quantity) = entry.quantity.filter(|q| *q > 0) {
                check_quantity(entry.item.as_str(), quantity)?;
                total_items = add_units(total_items, quantity)?;
                lines.push(OrderLine {
                    item: entry.item,
                    meal_type: configured.meal_type,
                    subcategory: None,
                    quantity,
                });
            }

            for sub in entry.subcategories.iter().flatten() {
                if !configured.has_subcategory(&sub.name) {
                    return Err(AppError::InvalidInput(format!(
                        "Subcategory '{}' is not configured for '{}'",
                        sub.name, entry.item
                    )));
                }
                if sub.quantity == 0 {
                    return Err(AppError::InvalidInput(format!(
                        "Subcategory '{}' has no quantity",
                        sub.name
                    )));
                }
                check_quantity(&sub.name, sub.quantity)?;
                total_items = add_units(total_items, sub.quantity)?;
                lines.push(OrderLine {
                    item: entry.item,
                    meal_type: configured.meal_type,
                    subcategory: Some(sub.name.clone()),
                    quantity: sub.quantity,
                });
            }
        }

        Ok(OrderLines { lines, total_items })
    }
}

fn check_quantity(name: &str, quantity: u32) -> Result<(), AppError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::InvalidInput(format!(
            "Quantity for '{}' is too large",
            name
        )));
    }
    Ok(())
}

fn add_units(total: u32, quantity: u32) -> Result<u32, AppError> {
    total
        .checked_add(quantity)
        .ok_or_else(|| AppError::InvalidInput("Order has too many items".to_string()))
}
