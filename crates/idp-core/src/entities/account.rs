//! Account entity - the identity and credential record

use chrono::{DateTime, NaiveDate, Utc};

use crate::value_objects::{AccountId, Gender, OneTimeCode, ProtectedMobile};

/// Account record as held by the credential store.
///
/// `password_hash` only ever holds an Argon2 PHC string. The one-time code
/// and its expiry are a single optional value, so they are present or absent
/// together by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: ProtectedMobile,
    pub password_hash: String,
    pub gender: Gender,
    pub profile_pic: Option<String>,
    pub cover_pic: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Carried for schema compatibility; no operation sets it.
    pub is_deleted: bool,
    pub is_verified: bool,
    pub otp: Option<OneTimeCode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied at registration
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: ProtectedMobile,
    pub password_hash: String,
    pub gender: Gender,
}

impl Account {
    /// Create an unverified account carrying its registration code
    pub fn new(id: AccountId, fields: NewAccount, code: OneTimeCode) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            mobile: fields.mobile,
            password_hash: fields.password_hash,
            gender: fields.gender,
            profile_pic: None,
            cover_pic: None,
            date_of_birth: None,
            is_deleted: false,
            is_verified: false,
            otp: Some(code),
            created_at: now,
            updated_at: now,
        }
    }

    /// Only verified accounts may mint session tokens
    #[inline]
    pub fn can_authenticate(&self) -> bool {
        self.is_verified
    }

    /// Check `submitted` against the current code at `now`
    pub fn code_matches(&self, submitted: &str, now: DateTime<Utc>) -> bool {
        self.otp
            .as_ref()
            .is_some_and(|code| code.verify(submitted, now))
    }
}

/// What a partial update does to the one-time code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CodeChange {
    #[default]
    Keep,
    Issue(OneTimeCode),
    Clear,
}

/// Partial update applied by `AccountRepository::update`.
///
/// `None` leaves a field untouched. The password hash is only ever set by
/// [`AccountPatch::password_reset`]; profile updates never carry one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<ProtectedMobile>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_pic: Option<String>,
    pub password_hash: Option<String>,
    pub is_verified: Option<bool>,
    pub code: CodeChange,
}

impl AccountPatch {
    /// Overwrite the current code unconditionally
    pub fn issue_code(code: OneTimeCode) -> Self {
        Self {
            code: CodeChange::Issue(code),
            ..Self::default()
        }
    }

    /// Mark verified and consume the code
    pub fn verified() -> Self {
        Self {
            is_verified: Some(true),
            code: CodeChange::Clear,
            ..Self::default()
        }
    }

    /// Store a new password hash and consume the code
    pub fn password_reset(password_hash: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            code: CodeChange::Clear,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to an in-memory record, bumping `updated_at`
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(first_name) = &self.first_name {
            account.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            account.last_name.clone_from(last_name);
        }
        if let Some(mobile) = &self.mobile {
            account.mobile = mobile.clone();
        }
        if let Some(gender) = self.gender {
            account.gender = gender;
        }
        if let Some(dob) = self.date_of_birth {
            account.date_of_birth = Some(dob);
        }
        if let Some(pic) = &self.profile_pic {
            account.profile_pic = Some(pic.clone());
        }
        if let Some(hash) = &self.password_hash {
            account.password_hash.clone_from(hash);
        }
        if let Some(verified) = self.is_verified {
            account.is_verified = verified;
        }
        match &self.code {
            CodeChange::Keep => {}
            CodeChange::Issue(code) => account.otp = Some(code.clone()),
            CodeChange::Clear => account.otp = None,
        }
        account.updated_at = Utc::now();
    }
}
