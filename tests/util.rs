#![allow(unused)]

use actix_http::{header::AUTHORIZATION, Method, Request};
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test::{call_service, read_body, TestRequest},
};
use anyhow::Result;
use givebox::{
    setting::{Gateway, Setting},
    AppState,
};
use migration::{Migrator, MigratorTrait};
use payment_gateway::Local;
use serde_json::{json, Value};

pub const GATEWAY_SECRET: &str = "local test secret";
pub const ADMIN_KEY: &str = "admin123";
pub const PASSWORD: &str = "password123";

pub fn test_setting() -> Setting {
    let mut setting = Setting::default();
    setting.db_url = "sqlite::memory:".to_owned();
    setting.gateway = Gateway::Local;
    setting.local.secret = GATEWAY_SECRET.to_owned();
    setting.auth.admin_secret_key = ADMIN_KEY.to_owned();
    setting
}

pub async fn create_test_state() -> Result<AppState> {
    let state = AppState::from_setting(test_setting()).await?;
    Migrator::fresh(state.service.db()).await?;
    Ok(state)
}

/// the gateway the test state runs with
pub fn gateway() -> Local {
    Local::new(GATEWAY_SECRET)
}

pub fn get_req(path: &str) -> TestRequest {
    TestRequest::with_uri(path)
}

pub fn post_req(path: &str, data: Value) -> TestRequest {
    TestRequest::with_uri(path)
        .method(Method::POST)
        .set_json(data)
}

pub async fn call<S, B>(req: TestRequest, app: &S) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let body = read_body(res).await;
    let val = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    Ok((val, status))
}

pub async fn get<S, B>(app: &S, path: &str) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(get_req(path), app).await
}

pub async fn auth_get<S, B>(app: &S, path: &str, token: &str) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        get_req(path).insert_header((AUTHORIZATION, format!("Bearer {}", token))),
        app,
    )
    .await
}

pub async fn post<S, B>(app: &S, path: &str, data: Value) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(post_req(path, data), app).await
}

pub async fn auth_post<S, B>(app: &S, path: &str, token: &str, data: Value) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        post_req(path, data).insert_header((AUTHORIZATION, format!("Bearer {}", token))),
        app,
    )
    .await
}

/// register then login, returns the token and user id
pub async fn signup<S, B>(app: &S, name: &str, email: &str, role: &str) -> Result<(String, i64)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (val, status) = post(
        app,
        "/api/auth/register",
        json!({
            "name": name,
            "email": email,
            "password": PASSWORD,
            "role": role,
            "adminSecretKey": ADMIN_KEY,
        }),
    )
    .await?;
    assert_eq!(status, 201, "{}", val);

    let (val, status) = post(
        app,
        "/api/auth/login",
        json!({
            "email": email,
            "password": PASSWORD,
        }),
    )
    .await?;
    assert_eq!(status, 200, "{}", val);
    let token = val["token"].as_str().unwrap().to_owned();
    let id = val["user"]["id"].as_i64().unwrap();
    Ok((token, id))
}

/// create an order, returns the gateway order ref
pub async fn create_order<S, B>(app: &S, token: &str, amount: i64) -> Result<String>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (val, status) = auth_post(
        app,
        "/api/payment/create-order",
        token,
        json!({ "amount": amount }),
    )
    .await?;
    assert_eq!(status, 200, "{}", val);
    Ok(val["gatewayOrderRef"].as_str().unwrap().to_owned())
}

/// relay a correctly signed callback
pub async fn pay<S, B>(app: &S, token: &str, order_ref: &str) -> Result<(Value, u16)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let gateway = gateway();
    let payment_ref = gateway.payment_id();
    let signature = gateway.sign(order_ref, &payment_ref);
    auth_post(
        app,
        "/api/payment/verify",
        token,
        json!({
            "gatewayOrderRef": order_ref,
            "gatewayPaymentRef": payment_ref,
            "signature": signature,
        }),
    )
    .await
}
