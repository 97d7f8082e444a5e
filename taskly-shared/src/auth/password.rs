/// Password hashing using Argon2id
///
/// # Security
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Default cost**: 64 MB memory, 3 iterations, 4 lanes, 32-byte output
/// - **Salt**: 16 random bytes per hash from the OS RNG
/// - **Format**: PHC string, so parameters and salt travel with the digest
///
/// Verification reads the parameters back out of the digest, so changing the
/// configured cost only affects new hashes.
///
/// # Example
///
/// ```
/// use taskly_shared::auth::password::{PasswordConfig, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(PasswordConfig::default())?;
///
/// let hash = hasher.hash("super_secret_password_123")?;
/// assert!(hasher.verify("super_secret_password_123", &hash));
/// assert!(!hasher.verify("wrong_password", &hash));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Argon2 rejected the configured cost parameters
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MB
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Salted one-way password hasher
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the given cost parameters
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the parameters
    /// (e.g. memory below 8 KiB per lane).
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(32),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password with a fresh random salt
    ///
    /// Two calls with the same plaintext produce different digests; both
    /// verify.
    ///
    /// Example output:
    /// ```text
    /// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored digest
    ///
    /// The comparison is constant time. A digest that cannot be parsed, or
    /// that carries parameters Argon2 refuses, verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        // Parameters come from the parsed hash, not from `self`
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Password verification failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(PasswordConfig {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test parameters are valid")
}
