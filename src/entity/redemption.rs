//! Redemption entity - a user's request to exchange points for a prize
//!
//! `point_cost` snapshots the prize cost at request time and is immune to
//! later catalog edits. `user_name`/`prize_name` are display snapshots.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RedemptionStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "redemptions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: i64,
  pub user_name: String,
  pub prize_id: i64,
  pub prize_name: String,
  pub point_cost: i64,
  pub status: RedemptionStatus,
  pub comment: Option<String>,
  pub requested_at: DateTime,
  pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::profile::Entity",
    from = "Column::UserId",
    to = "super::profile::Column::Id"
  )]
  Profile,
  #[sea_orm(
    belongs_to = "super::prize::Entity",
    from = "Column::PrizeId",
    to = "super::prize::Column::Id"
  )]
  Prize,
}

impl Related<super::profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<super::prize::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Prize.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
