//! Read only reports for administrators.

use crate::{now, Error, Page, Result, Service};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use entity::{
    donation::{self, Status},
    user::{self, Role},
};
use sea_orm::{
    sea_query::{Alias, Expr},
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

const DAY: i64 = 24 * 60 * 60;

pub const MAX_REPORT_DAYS: u32 = 366;

/// Totals over successful donations by donors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_users: u64,
    pub total_donations: u64,
    pub total_amount: i64,
}

/// One utc day of successful donations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub count: u64,
    pub amount: i64,
}

/// 64 bit integer cast target, `SUM(bigint)` is numeric on postgres and decimal on mysql.
fn bigint(backend: DbBackend) -> Alias {
    match backend {
        DbBackend::MySql => Alias::new("SIGNED"),
        _ => Alias::new("BIGINT"),
    }
}

fn day_of(timestamp: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|t| t.date_naive())
}

/// Bucket `(created_at, amount)` pairs into the `days` utc days ending at `today`, oldest first.
pub fn bucket_daily(today: NaiveDate, days: u32, rows: &[(i64, i64)]) -> Vec<DailyTotal> {
    let days = days.clamp(1, MAX_REPORT_DAYS);
    let first = today - Duration::days(days as i64 - 1);
    let mut list = (0..days)
        .map(|i| DailyTotal {
            date: first + Duration::days(i as i64),
            count: 0,
            amount: 0,
        })
        .collect::<Vec<_>>();
    for (created_at, amount) in rows {
        if let Some(date) = day_of(*created_at) {
            if date < first || date > today {
                continue;
            }
            let idx = (date - first).num_days() as usize;
            if let Some(bucket) = list.get_mut(idx) {
                bucket.count += 1;
                bucket.amount = bucket.amount.saturating_add(*amount);
            }
        }
    }
    list
}

impl Service {
    /// Donor count plus count and sum of donor owned successful donations.
    pub async fn stats(&self) -> Result<Stats> {
        let total_users = user::Entity::find()
            .filter(user::Column::Role.eq(Role::Donor))
            .count(self.db())
            .await?;

        let (count, amount): (i64, Option<i64>) = donation::Entity::find()
            .select_only()
            .column_as(
                Expr::col((donation::Entity, donation::Column::Id)).count(),
                "total_donations",
            )
            .column_as(
                Expr::col((donation::Entity, donation::Column::Amount))
                    .sum()
                    .cast_as(bigint(self.db().get_database_backend())),
                "total_amount",
            )
            .inner_join(user::Entity)
            .filter(user::Column::Role.eq(Role::Donor))
            .filter(donation::Column::Status.eq(Status::Success))
            .into_tuple()
            .one(self.db())
            .await?
            .unwrap_or_default();

        Ok(Stats {
            total_users,
            total_donations: count.max(0) as u64,
            total_amount: amount.unwrap_or_default(),
        })
    }

    /// Donor owned donations with their owner, newest first.
    pub async fn list_donations(&self, page: Page) -> Result<Vec<(donation::Model, user::Model)>> {
        let list = donation::Entity::find()
            .find_also_related(user::Entity)
            .filter(user::Column::Role.eq(Role::Donor))
            .order_by_desc(donation::Column::CreatedAt)
            .order_by_desc(donation::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db())
            .await?;
        Ok(list
            .into_iter()
            .filter_map(|(d, u)| u.map(|u| (d, u)))
            .collect())
    }

    /// Users of one role, newest first.
    pub async fn list_users(&self, role: Role, page: Page) -> Result<Vec<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Role.eq(role))
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db())
            .await?)
    }

    /// Successful donor donations per utc day for the last `days` days, oldest first.
    pub async fn daily_totals(&self, days: u32) -> Result<Vec<DailyTotal>> {
        let days = days.clamp(1, MAX_REPORT_DAYS);
        let time = now() as i64;
        let today = day_of(time).ok_or(Error::Str("invalid system time"))?;
        let since = time - time.rem_euclid(DAY) - (days as i64 - 1) * DAY;

        let rows: Vec<(i64, i64)> = donation::Entity::find()
            .select_only()
            .column(donation::Column::CreatedAt)
            .column(donation::Column::Amount)
            .inner_join(user::Entity)
            .filter(user::Column::Role.eq(Role::Donor))
            .filter(donation::Column::Status.eq(Status::Success))
            .filter(donation::Column::CreatedAt.gte(since))
            .into_tuple()
            .all(self.db())
            .await?;

        Ok(bucket_daily(today, days, &rows))
    }
}
