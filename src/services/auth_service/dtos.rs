use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::error::{AuthServiceError, Result};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

///
/// Tokens handed back on a successful registration or login. They only
/// exist when the whole operation, transaction included, succeeded.
///
#[derive(Clone, Debug, PartialEq)]
pub struct TokensDto {
    pub access_token: String,
    pub refresh_token: String,
}

impl RegisterDto {
    pub fn validate(&self) -> Result<()> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        email("email", &self.email)?;
        required("password", &self.password)
    }
}

impl LoginDto {
    pub fn validate(&self) -> Result<()> {
        required("email", &self.email)?;
        email("email", &self.email)?;
        required("password", &self.password)
    }
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AuthServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn email(field: &str, value: &str) -> Result<()> {
    if !EMAIL_REGEX.is_match(value) {
        return Err(AuthServiceError::Validation(format!("{} must be a valid email address", field)));
    }
    Ok(())
}
