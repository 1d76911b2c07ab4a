use std::collections::HashMap;
use std::sync::RwLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::user::User;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Username already taken: {0}")]
    DuplicateUser(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Argon2id hash of a credential secret, PHC string format.
pub fn hash_secret(secret: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hashing(e.to_string()))
}

/// Constant-time verification against a stored PHC hash. An unparseable
/// stored hash verifies as false rather than erroring.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Opaque admin session token: 16 random bytes, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Credential storage and verification. Secrets cross this boundary only
/// long enough to be hashed or verified.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn register(&self, username: &str, secret: &str, is_admin: bool)
        -> Result<User, IdentityError>;

    async fn authenticate(&self, username: &str, secret: &str)
        -> Result<User, IdentityError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityError>;
}

/// Admin session issuance and validation. Tokens are server-side state with
/// a TTL; a bearer token that was never issued (or has expired) does not
/// validate.
#[async_trait]
pub trait AdminSessions: Send + Sync {
    async fn issue(&self, admin_id: Uuid) -> Result<String, IdentityError>;

    async fn validate(&self, token: &str) -> Result<Option<Uuid>, IdentityError>;
}

/// In-process credential store. Production deployments use the Postgres
/// directory in skylane-store; this one backs the test harnesses.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn register(&self, username: &str, secret: &str, is_admin: bool)
        -> Result<User, IdentityError>
    {
        let password_hash = hash_secret(secret)?;
        let mut users = self.users.write().expect("directory lock poisoned");
        if users.iter().any(|u| u.username == username) {
            return Err(IdentityError::DuplicateUser(username.to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            is_admin,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn authenticate(&self, username: &str, secret: &str)
        -> Result<User, IdentityError>
    {
        let users = self.users.read().expect("directory lock poisoned");
        users
            .iter()
            .find(|u| u.username == username)
            .filter(|u| verify_secret(secret, &u.password_hash))
            .cloned()
            .ok_or(IdentityError::InvalidCredentials)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        let users = self.users.read().expect("directory lock poisoned");
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityError> {
        let users = self.users.read().expect("directory lock poisoned");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

/// In-process session store with the same TTL semantics as the Redis-backed
/// one in skylane-store.
pub struct MemoryAdminSessions {
    ttl_seconds: u64,
    sessions: RwLock<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl MemoryAdminSessions {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AdminSessions for MemoryAdminSessions {
    async fn issue(&self, admin_id: Uuid) -> Result<String, IdentityError> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::seconds(self.ttl_seconds as i64);
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.insert(token.clone(), (admin_id, expires_at));
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<Uuid>, IdentityError> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        Ok(sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(admin_id, _)| *admin_id))
    }
}
