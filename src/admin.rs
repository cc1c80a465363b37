//! administrator reports

use crate::{
    api::{DonationRes, PageReq, UserRes},
    auth::AdminUser,
    AppState, Error, Result,
};
use actix_web::{get, web, Responder, Scope};
use entity::user::Role;
use serde::{Deserialize, Serialize};
use serde_aux::prelude::deserialize_number_from_string;
use serde_json::json;

pub fn scope() -> Scope {
    web::scope("/admin")
        .service(stats)
        .service(donations)
        .service(users)
        .service(administrators)
        .service(daily)
}

#[get("/stats")]
pub async fn stats(state: web::Data<AppState>, _admin: AdminUser) -> Result<impl Responder, Error> {
    let stats = state.service.stats().await?;
    Ok(web::Json(json!({
        "totalUsers": stats.total_users,
        "totalDonations": stats.total_donations,
        "totalAmount": stats.total_amount,
    })))
}

#[get("/donations")]
pub async fn donations(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageReq>,
) -> Result<impl Responder, Error> {
    let list = state
        .service
        .list_donations(query.into_inner().into())
        .await?;
    let list = list.into_iter().map(DonationRes::from).collect::<Vec<_>>();
    Ok(web::Json(list))
}

#[get("/users")]
pub async fn users(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageReq>,
) -> Result<impl Responder, Error> {
    let list = state
        .service
        .list_users(Role::Donor, query.into_inner().into())
        .await?;
    let list = list.into_iter().map(UserRes::from).collect::<Vec<_>>();
    Ok(web::Json(list))
}

#[get("/administrators")]
pub async fn administrators(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageReq>,
) -> Result<impl Responder, Error> {
    let list = state
        .service
        .list_users(Role::Admin, query.into_inner().into())
        .await?;
    let list = list.into_iter().map(UserRes::from).collect::<Vec<_>>();
    Ok(web::Json(list))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DailyReq {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRes {
    date: String,
    count: u64,
    amount: i64,
}

#[get("/daily")]
pub async fn daily(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<DailyReq>,
) -> Result<impl Responder, Error> {
    let days = if query.days == 0 { 7 } else { query.days };
    let list = state.service.daily_totals(days).await?;
    let list = list
        .into_iter()
        .map(|d| DailyRes {
            date: d.date.format("%Y-%m-%d").to_string(),
            count: d.count,
            amount: d.amount,
        })
        .collect::<Vec<_>>();
    Ok(web::Json(list))
}
