use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use crate::domain::models::auth::{AuthContext, Claims};
use crate::state::AppState;
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub struct AuthUser(pub AuthContext);

fn decoding_key(public_key: &str) -> Option<DecodingKey> {
    if public_key.contains("BEGIN") {
        DecodingKey::from_ed_pem(public_key.as_bytes()).ok()
    } else {
        let der = general_purpose::STANDARD.decode(public_key.trim()).ok()?;
        Some(DecodingKey::from_ed_der(&der))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        // Cookie first (browser clients), Authorization header as the
        // non-browser fallback.
        let (access_token, from_cookie) = match cookies.get("access_token") {
            Some(cookie) => (cookie.value().to_string(), true),
            None => {
                let bearer = parts.headers.get("Authorization")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .ok_or(StatusCode::UNAUTHORIZED)?;
                (bearer.to_string(), false)
            }
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let key = decoding_key(&app_state.config.jwt_public_key)
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&["bookwise-frontend"]);

        let token_data = decode::<Claims>(&access_token, &key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        // Cookie-borne tokens need the double-submit CSRF check on
        // mutating requests.
        let method = &parts.method;
        if from_cookie && method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != token_data.claims.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        let context = AuthContext {
            user_id: token_data.claims.sub.clone(),
            business_id: token_data.claims.business_id.clone(),
        };

        Span::current().record("business_id", &context.business_id);
        Span::current().record("user_id", &context.user_id);

        Ok(AuthUser(context))
    }
}
