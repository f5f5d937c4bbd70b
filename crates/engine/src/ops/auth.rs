//! Authentication and password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{QueryFilter, prelude::*};

use crate::{AccessScope, EngineError, ResultEngine, Role, users};

use super::Engine;

impl Engine {
    /// Verifies a username/password pair and returns the caller's scope.
    ///
    /// Any credential failure (unknown user, wrong password, unreadable
    /// stored hash) maps to the same generic message, so the response does
    /// not leak which part was wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<AccessScope> {
        let invalid = || EngineError::Unauthorized("invalid username or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|_| invalid())?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| invalid())?;

        let role = Role::try_from(user.role.as_str())?;
        Ok(AccessScope {
            user_id: user.id,
            username: user.username,
            role,
            cost_center_id: user.cost_center_id,
        })
    }
}

/// Hashes a password with a fresh random salt into a PHC string (argon2id).
pub fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidEntry(format!("failed to hash password: {err}")))
}
