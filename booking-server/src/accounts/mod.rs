//! Accounts
//!
//! Users with roles `customer | store | admin`. Emails are unique and
//! case-insensitive; passwords are stored as argon2 PHC strings.
//! Self-registration creates customer or store accounts only. An admin
//! account is bootstrapped from `ADMIN_EMAIL` / `ADMIN_PASSWORD` at startup.

use shared::models::{RegisterRequest, UserInfo, UserRole};

use crate::auth::CurrentUser;
use crate::auth::permissions::get_default_permissions;
use crate::storage::{BookingStorage, StorageError, UserRecord};
use crate::utils::{AppError, AppResult, BusinessClock, ErrorCode};

/// Hash password using argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify password using argon2
pub fn verify_password(hash: &str, password: &str) -> Result<bool, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordVerifier},
    };

    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct AccountService {
    storage: BookingStorage,
    clock: BusinessClock,
}

impl AccountService {
    pub fn new(storage: BookingStorage, clock: BusinessClock) -> Self {
        Self { storage, clock }
    }

    /// Self-registration (customer or store)
    pub fn register(&self, req: RegisterRequest) -> AppResult<UserRecord> {
        if req.role == UserRole::Admin {
            return Err(AppError::validation(
                "Admin accounts cannot be self-registered",
            ));
        }
        self.create_user(&req.email, &req.password, req.name.trim(), req.role)
    }

    fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> AppResult<UserRecord> {
        let email = normalize_email(email);
        let hash_pass = hash_password(password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
        let now = self.clock.now_millis();
        let user = UserRecord {
            id: shared::util::snowflake_id(),
            email,
            name: name.to_string(),
            role,
            hash_pass,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        if self.storage.email_exists_txn(&txn, &user.email)? {
            txn.abort().map_err(StorageError::from)?;
            return Err(AppError::with_message(
                ErrorCode::EmailAlreadyRegistered,
                format!("Email {} is already registered", user.email),
            ));
        }
        self.storage.put_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }

    /// Check credentials. Unknown email and wrong password yield the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email);
        let Some(user) = self.storage.find_user_by_email(&email)? else {
            tracing::warn!(email = %email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        };

        if !user.is_active {
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }

        let valid = verify_password(&user.hash_pass, password)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            tracing::warn!(user_id = user.id, "Login failed - invalid credentials");
            return Err(AppError::invalid_credentials());
        }
        Ok(user)
    }

    pub fn get(&self, id: i64) -> AppResult<UserRecord> {
        self.storage
            .get_user(id)?
            .ok_or_else(|| AppError::not_found(format!("User {}", id)))
    }

    /// Create the bootstrap admin if the email is not registered yet
    pub fn ensure_admin(&self, email: &str, password: &str) -> AppResult<Option<UserRecord>> {
        if self
            .storage
            .find_user_by_email(&normalize_email(email))?
            .is_some()
        {
            return Ok(None);
        }
        let admin = self.create_user(email, password, "admin", UserRole::Admin)?;
        tracing::info!(user_id = admin.id, "Bootstrap admin account created");
        Ok(Some(admin))
    }

    pub fn user_info(user: &UserRecord) -> UserInfo {
        user.to_info(get_default_permissions(user.role))
    }

    pub fn current_user(user: &UserRecord) -> CurrentUser {
        CurrentUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            permissions: get_default_permissions(user.role),
        }
    }
}
