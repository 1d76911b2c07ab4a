use uuid::Uuid;

/// An account in the directory. Riders book seats; admins manage inventory
/// and audit bookings.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2id hash of the credential secret. Never the secret itself.
    pub password_hash: String,
    pub is_admin: bool,
}
