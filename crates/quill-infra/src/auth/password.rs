//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use quill_core::ports::{AuthError, PasswordService};

/// Argon2id cost parameters. Defaults follow the argon2 crate's
/// recommendations; deployments tune them through the environment.
#[derive(Debug, Clone)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing behind the [`PasswordService`] port.
///
/// Hashes are self-describing PHC strings, so verification works for rows
/// hashed under earlier cost settings after the configuration changes.
pub struct Argon2PasswordService {
    hasher: Argon2<'static>,
}

impl Argon2PasswordService {
    /// Build a service with the given cost parameters. Fails when the
    /// parameters are outside the ranges Argon2 accepts.
    pub fn new(config: &Argon2Config) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low-cost parameters keep the test suite fast; production costs come
    // from Argon2Config::default.
    fn service() -> Argon2PasswordService {
        Argon2PasswordService::new(&Argon2Config {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn verifies_only_the_original_password() {
        let passwords = service();

        let hash = passwords.hash("correct horse battery staple").unwrap();
        assert!(passwords.verify("correct horse battery staple", &hash).unwrap());
        assert!(!passwords.verify("correct horse battery", &hash).unwrap());
    }

    #[test]
    fn cost_parameters_are_embedded_in_the_hash() {
        let hash = service().hash("s3cret-enough").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=4096,t=1,p=1"));
    }

    #[test]
    fn salting_makes_repeated_hashes_differ() {
        let passwords = service();

        let first = passwords.hash("s3cret-enough").unwrap();
        let second = passwords.hash("s3cret-enough").unwrap();
        assert_ne!(first, second);
        assert!(passwords.verify("s3cret-enough", &second).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let result = service().verify("anything", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::HashingError(_))));
    }

    #[test]
    fn out_of_range_cost_is_rejected_at_construction() {
        let result = Argon2PasswordService::new(&Argon2Config {
            memory_kib: 0,
            iterations: 1,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::HashingError(_))));
    }
}
