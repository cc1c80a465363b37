use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    EnumIter, DeriveActiveEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending = 0,
    Success = 1,
    Failed = 2,
}

impl Default for Status {
    fn default() -> Self {
        Self::Pending
    }
}

/// donation orders

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Default)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    /// amount as entered by the donor, in major currency units
    pub amount: i64,

    pub currency: String,

    pub status: Status,

    /// gateway order reference, assigned once at creation
    pub order_id: String,

    /// gateway payment reference, only set on success
    pub payment_id: Option<String>,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
