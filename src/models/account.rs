//! Account types: the user profile, login/refresh responses, and the
//! signup payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Buyer,
    Seller,
}

/// Profile as returned by the login and signup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    pub user_type: UserType,
    /// Seller accounts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_registration_number: Option<String>,
}

/// `POST /accounts/login/` response: token pair plus profile.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// `POST /accounts/token/refresh/` response. The refresh token is only
/// present when the server rotates it.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// `POST /accounts/signup/` payload.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
}

impl SignupRequest {
    pub fn buyer(
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            name: name.into(),
            phone_number: phone_number.into(),
            user_type: UserType::Buyer,
            company_registration_number: None,
            store_name: None,
        }
    }

    pub fn seller(
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
        company_registration_number: impl Into<String>,
        store_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            name: name.into(),
            phone_number: phone_number.into(),
            user_type: UserType::Seller,
            company_registration_number: Some(company_registration_number.into()),
            store_name: Some(store_name.into()),
        }
    }
}
