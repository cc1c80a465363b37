use crate::{auth::AuthError, now, AppState, Error, Result};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use entity::user::{Capability, Role};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

#[derive(Serialize, Deserialize, Debug)]
pub struct JwtToken {
    // issued at
    pub iat: i64,
    // expiration
    pub exp: i64,
    // data
    pub user_id: i32,
    pub role: Role,
}

impl JwtToken {
    pub fn from_str(token: &str, secret: &[u8]) -> Result<Self, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(
            jsonwebtoken::decode::<JwtToken>(
                token,
                &DecodingKey::from_secret(secret),
                &validation,
            )?
            .claims,
        )
    }

    pub fn generate(
        user_id: i32,
        role: Role,
        expiry: usize,
        secret: &[u8],
    ) -> Result<String, AuthError> {
        let now = now() as i64;
        let payload = JwtToken {
            iat: now,
            exp: now + expiry as i64,
            user_id,
            role,
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(secret),
        )?)
    }
}

/// Caller identity carried by the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthedUser {
    pub id: i32,
    pub role: Role,
}

impl AuthedUser {
    pub fn from_token(token: &str, secret: &[u8]) -> Result<Self, Error> {
        let token = JwtToken::from_str(token, secret)?;
        Ok(Self {
            id: token.user_id,
            role: token.role,
        })
    }

    pub fn require(self, capability: Capability) -> Result<Self> {
        if self.role.allows(capability) {
            Ok(self)
        } else {
            Err(Error::Forbidden("Admin access denied"))
        }
    }

    fn from_req(req: &HttpRequest) -> Result<Self> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or(Error::Str("AppState required"))?;
        if let Some(auth) = req.headers().get(AUTHORIZATION) {
            if let Ok(auth) = auth.to_str() {
                if auth.starts_with("bearer") || auth.starts_with("Bearer") {
                    let token = auth[6..auth.len()].trim();
                    return AuthedUser::from_token(token, state.setting.auth.secret.as_bytes());
                }
            }
        }
        Err(AuthError::Invalid("missing auth token").into())
    }
}

impl FromRequest for AuthedUser {
    type Error = Error;
    type Future = Ready<Result<AuthedUser>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        ready(AuthedUser::from_req(req))
    }
}

/// Authed user holding the administer capability.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthedUser);

impl TryFrom<AuthedUser> for AdminUser {
    type Error = Error;
    fn try_from(user: AuthedUser) -> Result<Self> {
        user.require(Capability::Administer).map(AdminUser)
    }
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<AdminUser>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        ready(AuthedUser::from_req(req).and_then(AdminUser::try_from))
    }
}
