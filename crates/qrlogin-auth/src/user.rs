//! Static user directory
//!
//! Seeded once at startup and read-only afterwards. Passwords are hashed as
//! they are seeded; plaintext never stays in memory past construction.

use crate::error::{AuthError, AuthResult};
use crate::password::{hash_password, verify_password};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

/// Public user information for API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// One entry of a users seed file
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub id: u64,
    pub username: String,
    pub password: String,
}

impl UserSeed {
    fn new(id: u64, username: &str, password: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Read-only lookup of users by id or username
#[derive(Debug, Default)]
pub struct UserDirectory {
    by_id: HashMap<UserId, User>,
    by_username: HashMap<String, UserId>,
}

impl UserDirectory {
    /// Build a directory from seed entries, hashing each password
    pub fn from_seeds(seeds: impl IntoIterator<Item = UserSeed>) -> AuthResult<Self> {
        let mut directory = Self::default();
        for seed in seeds {
            let id = UserId(seed.id);
            if directory.by_id.contains_key(&id) || directory.by_username.contains_key(&seed.username) {
                return Err(AuthError::DuplicateUser(seed.username));
            }
            let user = User {
                id,
                username: seed.username.clone(),
                password_hash: hash_password(&seed.password)?,
            };
            directory.by_username.insert(seed.username, id);
            directory.by_id.insert(id, user);
        }
        debug!("User directory seeded with {} users", directory.len());
        Ok(directory)
    }

    /// The built-in demo accounts
    pub fn with_default_users() -> AuthResult<Self> {
        Self::from_seeds([UserSeed::new(1, "sun", "111"), UserSeed::new(2, "guang", "222")])
    }

    /// Load seed entries from a JSON array of `{ id, username, password }`
    pub fn from_json_file(path: &Path) -> AuthResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let seeds: Vec<UserSeed> = serde_json::from_str(&contents)?;
        info!("Loaded {} users from {:?}", seeds.len(), path);
        Self::from_seeds(seeds)
    }

    /// Look up a user by ID
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.by_id.get(&id)
    }

    /// Look up a user by username
    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.by_username.get(username).and_then(|id| self.by_id.get(id))
    }

    /// Check a username and password pair
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<&User> {
        let user = self.find_by_username(username).ok_or(AuthError::UnknownUser)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::WrongPassword);
        }
        Ok(user)
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the directory has no users
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_users() {
        let users = UserDirectory::with_default_users().unwrap();
        assert_eq!(users.len(), 2);

        let sun = users.authenticate("sun", "111").unwrap();
        assert_eq!(sun.id, UserId(1));
        assert_ne!(sun.password_hash, "111");

        assert_eq!(users.get(UserId(2)).unwrap().username, "guang");
    }

    #[test]
    fn test_bad_credentials() {
        let users = UserDirectory::with_default_users().unwrap();
        assert!(matches!(
            users.authenticate("sun", "222"),
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            users.authenticate("nobody", "111"),
            Err(AuthError::UnknownUser)
        ));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let result = UserDirectory::from_seeds([
            UserSeed::new(1, "sun", "a"),
            UserSeed::new(2, "sun", "b"),
        ]);
        assert!(matches!(result, Err(AuthError::DuplicateUser(name)) if name == "sun"));
    }

    #[test]
    fn test_profile_hides_hash() {
        let users = UserDirectory::with_default_users().unwrap();
        let profile = UserProfile::from(users.get(UserId(1)).unwrap());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "username": "sun" }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"[{ "id": 10, "username": "ada", "password": "lovelace" }]"#,
        )
        .unwrap();

        let users = UserDirectory::from_json_file(&path).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.authenticate("ada", "lovelace").unwrap().id, UserId(10));
    }
}
