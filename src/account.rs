//! register and login api

use crate::{api::UserRes, auth::JwtToken, AppState, Error, NewUser, Result};
use actix_web::{post, web, HttpResponse, Scope};
use entity::user::Role;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub fn scope() -> Scope {
    web::scope("/auth").service(register).service(login)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterReq {
    name: String,
    email: String,
    password: String,
    role: Role,
    admin_secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoginReq {
    email: String,
    password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRes {
    token: String,
    user: UserRes,
}

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    data: web::Json<RegisterReq>,
) -> Result<HttpResponse, Error> {
    let data = data.into_inner();
    let name = data.name.trim().to_owned();
    let email = data.email.trim().to_owned();
    if name.is_empty() {
        return Err(Error::Validation("name is required".to_owned()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation("a valid email is required".to_owned()));
    }
    let min = state.setting.auth.min_password_len;
    if data.password.chars().count() < min {
        return Err(Error::Validation(format!(
            "password must be at least {} characters",
            min
        )));
    }
    if data.role == Role::Admin {
        state
            .setting
            .auth
            .check_admin_key(data.admin_secret_key.as_deref())?;
    }

    let user = state
        .service
        .create_user(NewUser {
            name,
            email,
            password: data.password,
            role: data.role,
        })
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "msg": "User registered successfully",
        "user": UserRes::from(user),
    })))
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    data: web::Json<LoginReq>,
) -> Result<HttpResponse, Error> {
    let user = state
        .service
        .authenticate(data.email.trim(), &data.password)
        .await?;

    let token = JwtToken::generate(
        user.id,
        user.role,
        state.setting.auth.token_expiry,
        state.setting.auth.secret.as_bytes(),
    )?;

    Ok(HttpResponse::Ok().json(LoginRes {
        token,
        user: UserRes::from(user),
    }))
}
