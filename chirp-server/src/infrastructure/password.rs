use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier,
        SaltString, rand_core::OsRng,
    },
};

use crate::domain::error::DomainError;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HashCost {
    pub(crate) memory_kib: u32,
    pub(crate) iterations: u32,
    pub(crate) parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted one-way password hashing shared by the auth and admin services.
///
/// The async wrappers move the CPU-bound work onto the blocking pool so no
/// runtime worker (and no store lock) is held while hashing.
#[derive(Debug, Clone)]
pub(crate) struct PasswordHasher {
    cost: HashCost,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashCost::default())
    }
}

impl PasswordHasher {
    pub(crate) fn new(cost: HashCost) -> Self {
        Self { cost }
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        // Parameters come from the PHC string, so hashes made with another
        // cost still verify.
        Argon2::default()
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    pub(crate) async fn hash_password_blocking(
        &self,
        raw_password: String,
    ) -> Result<String, DomainError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&raw_password))
            .await
            .map_err(|err| DomainError::Unexpected(err.to_string()))?
    }

    pub(crate) async fn verify_password_blocking(
        &self,
        raw_password: String,
        password_hash: String,
    ) -> Result<(), DomainError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&raw_password, &password_hash))
            .await
            .map_err(|err| DomainError::Unexpected(err.to_string()))?
    }

    fn argon2(&self) -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.parallelism,
            None,
        )
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
}
