use serde::{Deserialize, Serialize};

/// Represents a signed-in user, the payload of the session record.
///
/// ⚠️ IMPORTANT: this record is the ONLY thing the vault ever persists,
/// and it is always sealed into an envelope first. Credential secrets
/// (passwords, tokens) are never part of it.
///
/// Field names are camelCase on the wire so records persisted by
/// earlier builds keep decrypting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for the user.
    pub id: String,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's phone number.
    pub phone_number: String,
    /// The user's capability tier. A non-negative integer checked
    /// against an allow-set by role-restricted guards, never a name.
    pub role: u32,
}
