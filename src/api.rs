//! http api

use crate::{account, admin, payment, Page};
use actix_web::{get, web, HttpResponse, Responder, Scope};
use entity::{donation, user};
use serde::{Deserialize, Serialize};
use serde_aux::prelude::deserialize_number_from_string;

pub const CARGO_PKG_VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

fn version() -> String {
    CARGO_PKG_VERSION.map(ToOwned::to_owned).unwrap_or_default()
}

pub fn scope() -> Scope {
    web::scope("/api")
        .service(account::scope())
        .service(payment::scope())
        .service(admin::scope())
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body(format!("Givebox donation api {} is running", version()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PageReq {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub limit: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub offset: u64,
}

impl From<PageReq> for Page {
    fn from(value: PageReq) -> Self {
        // the store binds offsets as signed 64 bit integers
        let mut page = Page {
            offset: value.offset.min(i64::MAX as u64),
            ..Default::default()
        };
        if value.limit > 0 && value.limit < page.limit {
            page.limit = value.limit;
        }
        page
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRes {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: user::Role,
    pub created_at: i64,
}

impl From<user::Model> for UserRes {
    fn from(value: user::Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DonationRes {
    pub id: i32,
    pub user_id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: donation::Status,
    pub gateway_order_ref: String,
    pub payment_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRes>,
}

impl From<donation::Model> for DonationRes {
    fn from(value: donation::Model) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            amount: value.amount,
            currency: value.currency,
            status: value.status,
            gateway_order_ref: value.order_id,
            payment_id: value.payment_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            user: None,
        }
    }
}

impl From<(donation::Model, user::Model)> for DonationRes {
    fn from((donation, user): (donation::Model, user::Model)) -> Self {
        let mut res = DonationRes::from(donation);
        res.user = Some(UserRes::from(user));
        res
    }
}
