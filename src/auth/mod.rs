//! Credential verification
//!
//! Stores SHA-256 digests of passwords and answers a single question:
//! do these credentials match? The bounded-retry lockout policy lives
//! here too, so callers only supply a prompt.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// Default login attempts before lockout
pub const MAX_ATTEMPTS: u32 = 3;

/// Verifies usernames and passwords against stored digests
#[derive(Debug, Clone)]
pub struct AuthManager {
    /// Username to SHA-256 hex digest
    users: HashMap<String, String>,
    max_attempts: u32,
}

impl Default for AuthManager {
    fn default() -> Self {
        // Seeded administrator account.
        Self::new().with_user("admin", "Admin@123")
    }
}

impl AuthManager {
    /// Create a manager with no users
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Register a user, replacing any previous password
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users
            .insert(username.to_string(), Self::hash_password(password));
        self
    }

    /// Get the configured attempt limit
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Check a username/password pair
    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(digest) => *digest == Self::hash_password(password),
            None => false,
        }
    }

    /// Run the bounded-retry login flow
    ///
    /// `prompt` is called with the number of attempts remaining and
    /// returns credentials, or `None` to abort. Returns true once a
    /// pair verifies, false on abort or lockout.
    pub fn login<F>(&self, mut prompt: F) -> bool
    where
        F: FnMut(u32) -> Option<(String, String)>,
    {
        for attempt in 0..self.max_attempts {
            let remaining = self.max_attempts - attempt;
            let Some((username, password)) = prompt(remaining) else {
                return false;
            };
            if self.verify(&username, &password) {
                return true;
            }
        }
        false
    }

    fn hash_password(password: &str) -> String {
        format!("{:x}", Sha256::digest(password.as_bytes()))
    }
}
