// Core domain: models, errors, meal windows, catalog and order logic

pub mod catalog;
pub mod errors;
pub mod meal;
pub mod models;
pub mod order;
