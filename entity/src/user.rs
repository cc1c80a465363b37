use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Caller capabilities checked by the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// open donation orders and read own history
    Donate,
    /// read aggregate reports and every user's records
    Administer,
}

#[derive(
    EnumIter, DeriveActiveEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Role {
    #[serde(rename = "user", alias = "donor")]
    Donor = 0,
    #[serde(rename = "admin", alias = "administrator")]
    Admin = 1,
}

impl Default for Role {
    fn default() -> Self {
        Self::Donor
    }
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        match (self, capability) {
            (_, Capability::Donate) => true,
            (Role::Admin, Capability::Administer) => true,
            (Role::Donor, Capability::Administer) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Default)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// case-sensitive, unique
    pub email: String,

    /// argon2 phc string
    pub password: String,

    pub role: Role,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::donation::Entity")]
    Donation,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
