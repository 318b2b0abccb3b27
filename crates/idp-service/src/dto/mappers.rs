//! Entity to DTO mappers

use idp_common::SessionToken;
use idp_core::Account;

use super::responses::{AccountResponse, LoginResponse};

impl AccountResponse {
    /// Build the owner's view of `account`; `mobile_number` is the decrypted value
    pub fn from_account(account: &Account, mobile_number: String) -> Self {
        Self {
            id: account.id.to_string(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            mobile_number,
            gender: account.gender.as_str().to_string(),
            profile_pic: account.profile_pic.clone(),
            cover_pic: account.cover_pic.clone(),
            date_of_birth: account.date_of_birth,
            is_verified: account.is_verified,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl LoginResponse {
    pub fn new(session: SessionToken, account: AccountResponse) -> Self {
        Self {
            token: session.token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            account,
        }
    }
}
