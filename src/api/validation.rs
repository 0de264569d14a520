// Request validation for registration and login payloads

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::core::errors::AppError;
use crate::core::models::NewItemConfig;

const PASSWORD_MIN_CHARS: usize = 5;
const PASSWORD_MAX_CHARS: usize = 50;
const CNPJ_DIGITS: usize = 14;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user: Option<RegisterUser>,
    pub company: Option<RegisterCompany>,
    pub items: Option<Vec<NewItemConfig>>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompany {
    pub cnpj: String,
    pub social_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// Registration after validation; the password is still plaintext here
#[derive(Debug)]
pub struct ValidRegistration {
    pub email: String,
    pub password: SecretString,
    pub cnpj: String,
    pub social_name: String,
    pub items: Vec<NewItemConfig>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no spaces
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn validate_registration(request: RegisterRequest) -> Result<ValidRegistration, AppError> {
    let (Some(user), Some(company), Some(items)) = (request.user, request.company, request.items)
    else {
        return Err(AppError::InvalidInput("Incomplete data".to_string()));
    };
    if items.is_empty() {
        return Err(AppError::InvalidInput("Incomplete data".to_string()));
    }

    let email = normalize_email(&user.email);
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("Invalid email".to_string()));
    }

    let password_chars = user.password.expose_secret().chars().count();
    if password_chars < PASSWORD_MIN_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Password must have at least {} characters",
            PASSWORD_MIN_CHARS
        )));
    }
    if password_chars > PASSWORD_MAX_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Password must have at most {} characters",
            PASSWORD_MAX_CHARS
        )));
    }

    let cnpj = company.cnpj.trim().to_string();
    if cnpj.len() != CNPJ_DIGITS || !cnpj.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidInput("Invalid CNPJ".to_string()));
    }

    let social_name = company.social_name.trim().to_string();
    if social_name.is_empty() {
        return Err(AppError::InvalidInput("Social name is required".to_string()));
    }

    validate_items(&items)?;

    Ok(ValidRegistration {
        email,
        password: user.password,
        cnpj,
        social_name,
        items,
    })
}

fn validate_items(items: &[NewItemConfig]) -> Result<(), AppError> {
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|other| other.name == item.name) {
            return Err(AppError::InvalidInput(format!("Duplicate item '{}'", item.name)));
        }
        if item.default_quantity.is_some_and(|q| q < 0) {
            return Err(AppError::InvalidInput(format!(
                "Default quantity for '{}' cannot be negative",
                item.name
            )));
        }

        for (sub_index, sub) in item.subcategories.iter().enumerate() {
            if sub.name.trim().is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Subcategory of '{}' needs a name",
                    item.name
                )));
            }
            if item.subcategories[..sub_index]
                .iter()
                .any(|other| other.name == sub.name)
            {
                return Err(AppError::InvalidInput(format!(
                    "Duplicate subcategory '{}' in '{}'",
                    sub.name, item.name
                )));
            }
            if sub.default_quantity.is_some_and(|q| q < 0) {
                return Err(AppError::InvalidInput(format!(
                    "Default quantity for '{}' cannot be negative",
                    sub.name
                )));
            }
        }
    }
    Ok(())
}
