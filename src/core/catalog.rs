// Per-user catalog as served to the dashboard

use serde::Serialize;

use crate::core::models::{CatalogRow, ItemKind, MealType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardItem {
    pub name: ItemKind,
    pub meal_type: MealType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<DashboardSubcategory>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSubcategory {
    pub name: String,
    pub default_quantity: Option<i32>,
}

impl DashboardItem {
    pub fn has_subcategory(&self, name: &str) -> bool {
        self.subcategories
            .as_ref()
            .map(|subs| subs.iter().any(|s| s.name == name))
            .unwrap_or(false)
    }
}

/// Group flattened catalog rows by item, keeping first-seen item order.
///
/// Items without subcategories come out with `subcategories: None` so the
/// field is left out of the JSON.
pub fn group_catalog(rows: Vec<CatalogRow>) -> Vec<DashboardItem> {
    let mut items: Vec<DashboardItem> = Vec::new();

    for row in rows {
        let index = match items.iter().position(|i| i.name == row.item) {
            Some(index) => index,
            None => {
                items.push(DashboardItem {
                    name: row.item,
                    meal_type: row.meal_type,
                    default_quantity: row.item_default_quantity,
                    subcategories: None,
                });
                items.len() - 1
            }
        };

        if let Some(name) = row.subcategory {
            items[index]
                .subcategories
                .get_or_insert_with(Vec::new)
                .push(DashboardSubcategory {
                    name,
                    default_quantity: row.subcategory_default_quantity,
                });
        }
    }

    items
}

pub fn find_item(catalog: &[DashboardItem], item: ItemKind) -> Option<&DashboardItem> {
    catalog.iter().find(|i| i.name == item)
}
