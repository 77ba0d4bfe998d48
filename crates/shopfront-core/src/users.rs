use serde::{Deserialize, Serialize};

/// The signed-in user's profile as returned by the auth endpoints.
///
/// The backend sends more fields (`provider`, `confirmed`, timestamps); only
/// these three are kept and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}
