//! Profile entity - one row per registered user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
  #[sea_orm(string_value = "user")]
  User,
  #[sea_orm(string_value = "admin")]
  Admin,
}

impl Default for Role {
  fn default() -> Self {
    Self::User
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub email: String,
  pub name: String,
  pub phone: Option<String>,
  pub role: Role,
  /// Mutated only through the ledger, never assigned directly.
  pub total_points: i64,
  pub is_verified: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::bonus_entry::Entity")]
  BonusEntries,
  #[sea_orm(has_many = "super::redemption::Entity")]
  Redemptions,
}

impl Related<super::bonus_entry::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::BonusEntries.def()
  }
}

impl Related<super::redemption::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Redemptions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
