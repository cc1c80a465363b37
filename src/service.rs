use crate::{
    auth::{hash_password, verify_password},
    now, now_millis, Error, Result,
};
use entity::{
    donation::{self, Status},
    user::{self, Role},
};
use payment_gateway::{Gateway, Order, OrderRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{error, info, warn};

/// new user fields
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Trim and uppercase a currency code, `None` unless it is three ascii letters.
pub fn currency_code(s: &str) -> Option<String> {
    let code = s.trim();
    (code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

/// Offset and limit for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 1000,
        }
    }
}

/// Result of a callback verification that passed the signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// the pending order was moved to its terminal state
    Applied,
    /// no pending order matched, nothing changed
    Noop,
}

impl Transition {
    pub fn applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Orders per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCount {
    pub pending: u64,
    pub success: u64,
    pub failed: u64,
}

/// Donation service
pub struct Service {
    gateway: Box<dyn Gateway + Sync + Send>,
    conn: DbConn,
}

impl Service {
    pub fn new(gateway: Box<dyn Gateway + Sync + Send>, conn: DbConn) -> Self {
        Self { gateway, conn }
    }

    pub fn name(&self) -> &str {
        self.gateway.name()
    }

    pub fn db(&self) -> &DbConn {
        &self.conn
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(self.db()).await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db())
            .await?)
    }

    /// Create a user, the plaintext password is hashed before it is stored.
    pub async fn create_user(&self, new: NewUser) -> Result<user::Model> {
        if self.get_user_by_email(&new.email).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_owned()));
        }
        let password = new.password;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| Error::Message(e.to_string()))??;
        let time = now() as i64;
        let res = user::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            email: Set(new.email),
            password: Set(hash),
            role: Set(new.role),
            created_at: Set(time),
            updated_at: Set(time),
        }
        .insert(self.db())
        .await;
        match res {
            Ok(user) => {
                info!(user_id = user.id, role = user.role.as_str(), "user registered");
                Ok(user)
            }
            // lost the race against a concurrent registration
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(Error::Conflict("User already exists".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check email and password, the same error is returned for both misses.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<user::Model> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| Error::Validation("Invalid Credentials".to_owned()))?;
        let hash = user.password.clone();
        let password = password.to_owned();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Message(e.to_string()))?;
        if ok {
            Ok(user)
        } else {
            Err(Error::Validation("Invalid Credentials".to_owned()))
        }
    }

    pub async fn get_donation(&self, id: i32) -> Result<Option<donation::Model>> {
        Ok(donation::Entity::find_by_id(id).one(self.db()).await?)
    }

    pub async fn get_donation_by_order(&self, order_id: &str) -> Result<Option<donation::Model>> {
        Ok(donation::Entity::find()
            .filter(donation::Column::OrderId.eq(order_id))
            .one(self.db())
            .await?)
    }

    /// Open a gateway order and record it as a pending donation.
    ///
    /// `amount` is in major units, the gateway receives `amount * minor_unit`.
    /// Nothing is stored when the gateway rejects the order.
    pub async fn create_order(
        &self,
        user_id: i32,
        amount: i64,
        currency: String,
        minor_unit: i64,
    ) -> Result<(donation::Model, Order)> {
        if amount <= 0 {
            return Err(Error::Validation(
                "amount must be a positive integer".to_owned(),
            ));
        }
        let minor = amount
            .checked_mul(minor_unit)
            .filter(|m| *m > 0)
            .ok_or_else(|| Error::Validation("amount is too large".to_owned()))?;
        let currency = currency_code(&currency).ok_or_else(|| {
            Error::Validation("currency must be a three letter code".to_owned())
        })?;

        let order = self
            .gateway
            .create_order(OrderRequest {
                amount: minor as u64,
                currency: currency.clone(),
                receipt: format!("receipt_{}", now_millis()),
            })
            .await?;

        let time = now() as i64;
        let res = donation::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            amount: Set(amount),
            currency: Set(currency),
            status: Set(Status::Pending),
            order_id: Set(order.id.clone()),
            payment_id: Set(None),
            created_at: Set(time),
            updated_at: Set(time),
        }
        .insert(self.db())
        .await;

        match res {
            Ok(model) => {
                info!(
                    user_id,
                    amount,
                    order_id = order.id.as_str(),
                    gateway = self.name(),
                    "donation order created"
                );
                Ok((model, order))
            }
            Err(e) => {
                // the gateway order exists without a local record
                error!(
                    error = e.to_string(),
                    order_id = order.id.as_str(),
                    gateway = self.name(),
                    "failed to save donation for gateway order"
                );
                Err(e.into())
            }
        }
    }

    /// Move a pending order to `success` or `failed` according to the callback signature.
    ///
    /// Only a row still in `pending` is touched, so replays and racing callbacks
    /// for the same order become no-ops. A bad signature fails the order and
    /// returns [`Error::InvalidSignature`].
    pub async fn verify_callback(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<Transition> {
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return Err(Error::Validation(
                "order id, payment id and signature are required".to_owned(),
            ));
        }

        let authentic = self
            .gateway
            .verify_signature(order_id, payment_id, signature);

        let update = if authentic {
            donation::ActiveModel {
                status: Set(Status::Success),
                payment_id: Set(Some(payment_id.to_owned())),
                updated_at: Set(now() as i64),
                ..Default::default()
            }
        } else {
            donation::ActiveModel {
                status: Set(Status::Failed),
                updated_at: Set(now() as i64),
                ..Default::default()
            }
        };

        let res = donation::Entity::update_many()
            .set(update)
            .filter(donation::Column::OrderId.eq(order_id))
            .filter(donation::Column::Status.eq(Status::Pending))
            .exec(self.db())
            .await?;

        let transition = if res.rows_affected == 1 {
            Transition::Applied
        } else {
            Transition::Noop
        };

        if authentic {
            info!(
                order_id,
                payment_id,
                applied = transition.applied(),
                "payment callback verified"
            );
            Ok(transition)
        } else {
            warn!(
                order_id,
                payment_id,
                applied = transition.applied(),
                "payment callback signature rejected"
            );
            Err(Error::InvalidSignature)
        }
    }

    /// Donations of one user, newest first.
    pub async fn list_user_donations(
        &self,
        user_id: i32,
        page: Page,
    ) -> Result<Vec<donation::Model>> {
        Ok(donation::Entity::find()
            .filter(donation::Column::UserId.eq(user_id))
            .order_by_desc(donation::Column::CreatedAt)
            .order_by_desc(donation::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db())
            .await?)
    }

    /// Fail every pending order created `older_than` seconds ago or earlier.
    ///
    /// Out of band maintenance for callbacks that never arrived.
    pub async fn expire_pending(&self, older_than: u64) -> Result<u64> {
        let time = now();
        let before = time.saturating_sub(older_than) as i64;
        let res = donation::Entity::update_many()
            .set(donation::ActiveModel {
                status: Set(Status::Failed),
                updated_at: Set(time as i64),
                ..Default::default()
            })
            .filter(donation::Column::Status.eq(Status::Pending))
            .filter(donation::Column::CreatedAt.lte(before))
            .exec(self.db())
            .await?;
        info!(
            updated = res.rows_affected,
            older_than, "expired pending donations"
        );
        Ok(res.rows_affected)
    }

    pub async fn status_count(&self) -> Result<StatusCount> {
        let count = |status: Status| {
            donation::Entity::find()
                .filter(donation::Column::Status.eq(status))
                .count(self.db())
        };
        Ok(StatusCount {
            pending: count(Status::Pending).await?,
            success: count(Status::Success).await?,
            failed: count(Status::Failed).await?,
        })
    }
}
