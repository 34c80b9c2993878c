use serde::{Deserialize, Serialize};

/// Access-token claims minted by the external identity service. This
/// service only validates; it never issues tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    #[serde(rename = "https://bookwise.app/claims/business_id")]
    pub business_id: String,

    #[serde(rename = "https://bookwise.app/claims/csrf")]
    pub csrf_token: String,
}

/// The authenticated business owner as seen by handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub business_id: String,
}
