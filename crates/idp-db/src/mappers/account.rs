//! Account entity <-> model mapper

use chrono::{DateTime, NaiveDate, Utc};
use idp_core::{
    Account, AccountId, AccountPatch, CodeChange, DomainError, OneTimeCode, ProtectedMobile,
};
use uuid::Uuid;

use crate::models::AccountModel;

/// Convert AccountModel to Account entity.
///
/// Fails only if the row holds a gender outside the CHECK constraint.
impl TryFrom<AccountModel> for Account {
    type Error = DomainError;

    fn try_from(model: AccountModel) -> Result<Self, Self::Error> {
        let gender = model
            .gender
            .parse()
            .map_err(|e| DomainError::DatabaseError(format!("Corrupt gender column: {e}")))?;

        Ok(Account {
            id: AccountId::from_uuid(model.id),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            mobile: ProtectedMobile::new(model.mobile_ciphertext, model.mobile_digest),
            password_hash: model.password_hash,
            gender,
            profile_pic: model.profile_pic,
            cover_pic: model.cover_pic,
            date_of_birth: model.date_of_birth,
            is_deleted: model.is_deleted,
            is_verified: model.is_verified,
            otp: OneTimeCode::from_parts(model.otp, model.otp_expires),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Column values for inserting an account
pub struct AccountInsert<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub mobile_ciphertext: &'a str,
    pub mobile_digest: &'a str,
    pub password_hash: &'a str,
    pub gender: &'static str,
    pub is_verified: bool,
    pub otp: Option<&'a str>,
    pub otp_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> AccountInsert<'a> {
    pub fn new(account: &'a Account) -> Self {
        Self {
            id: account.id.into_inner(),
            first_name: &account.first_name,
            last_name: &account.last_name,
            email: &account.email,
            mobile_ciphertext: &account.mobile.ciphertext,
            mobile_digest: &account.mobile.digest,
            password_hash: &account.password_hash,
            gender: account.gender.as_str(),
            is_verified: account.is_verified,
            otp: account.otp.as_ref().map(OneTimeCode::value),
            otp_expires: account.otp.as_ref().map(OneTimeCode::expires_at),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Column values for a partial update.
///
/// `None` binds leave the column unchanged through `COALESCE`. The code
/// columns are driven by `code_action` so that clearing and keeping can be
/// told apart.
pub struct PatchColumns<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub mobile_ciphertext: Option<&'a str>,
    pub mobile_digest: Option<&'a str>,
    pub gender: Option<&'static str>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_pic: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub is_verified: Option<bool>,
    pub code_action: &'static str,
    pub otp: Option<&'a str>,
    pub otp_expires: Option<DateTime<Utc>>,
}

impl<'a> PatchColumns<'a> {
    pub fn new(patch: &'a AccountPatch) -> Self {
        let (code_action, otp, otp_expires) = match &patch.code {
            CodeChange::Keep => ("keep", None, None),
            CodeChange::Issue(code) => ("issue", Some(code.value()), Some(code.expires_at())),
            CodeChange::Clear => ("clear", None, None),
        };

        Self {
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
            mobile_ciphertext: patch.mobile.as_ref().map(|m| m.ciphertext.as_str()),
            mobile_digest: patch.mobile.as_ref().map(|m| m.digest.as_str()),
            gender: patch.gender.map(|g| g.as_str()),
            date_of_birth: patch.date_of_birth,
            profile_pic: patch.profile_pic.as_deref(),
            password_hash: patch.password_hash.as_deref(),
            is_verified: patch.is_verified,
            code_action,
            otp,
            otp_expires,
        }
    }
}
