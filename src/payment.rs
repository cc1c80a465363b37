//! payment api, order creation and callback verification

use crate::{
    api::{DonationRes, PageReq},
    auth::AuthedUser,
    AppState, Error, Result,
};
use actix_web::{get, post, web, Responder, Scope};
use entity::user::Capability;
use serde::{Deserialize, Serialize};
use serde_aux::prelude::deserialize_number_from_string;
use serde_json::json;

pub fn scope() -> Scope {
    web::scope("/payment")
        .service(create_order)
        .service(verify)
        .service(my_donations)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderReq {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    amount: i64,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRes {
    /// gateway order id, kept as `id` for checkout widgets
    id: String,
    gateway_order_ref: String,
    /// minor units
    amount: u64,
    currency: String,
    receipt: Option<String>,
    donation_id: i32,
}

#[post("/create-order")]
pub async fn create_order(
    state: web::Data<AppState>,
    user: AuthedUser,
    data: web::Json<CreateOrderReq>,
) -> Result<impl Responder, Error> {
    let user = user.require(Capability::Donate)?;
    let currency = data
        .currency
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.setting.donation.currency.clone());
    let (donation, order) = state
        .service
        .create_order(
            user.id,
            data.amount,
            currency,
            state.setting.donation.minor_unit,
        )
        .await?;
    Ok(web::Json(OrderRes {
        id: order.id.clone(),
        gateway_order_ref: order.id,
        amount: order.amount,
        currency: order.currency,
        receipt: order.receipt,
        donation_id: donation.id,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerifyReq {
    #[serde(rename = "gatewayOrderRef", alias = "razorpay_order_id")]
    order_id: String,
    #[serde(rename = "gatewayPaymentRef", alias = "razorpay_payment_id")]
    payment_id: String,
    #[serde(alias = "razorpay_signature")]
    signature: String,
}

#[post("/verify")]
pub async fn verify(
    state: web::Data<AppState>,
    _user: AuthedUser,
    data: web::Json<VerifyReq>,
) -> Result<impl Responder, Error> {
    let transition = state
        .service
        .verify_callback(&data.order_id, &data.payment_id, &data.signature)
        .await?;
    Ok(web::Json(json!({
        "msg": "Payment Success",
        "paymentId": data.payment_id,
        "updated": transition.applied(),
    })))
}

#[get("/my-donations")]
pub async fn my_donations(
    state: web::Data<AppState>,
    user: AuthedUser,
    query: web::Query<PageReq>,
) -> Result<impl Responder, Error> {
    let list = state
        .service
        .list_user_donations(user.id, query.into_inner().into())
        .await?;
    let list = list.into_iter().map(DonationRes::from).collect::<Vec<_>>();
    Ok(web::Json(list))
}
