//! BonusEntry entity - append-only points ledger
//!
//! `points_awarded` is signed: positive for course bonuses, negative for
//! admin deductions and redemption debits. Rows are never updated or
//! deleted; `user_name` is a display snapshot taken at grant time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bonus_entries")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: i64,
  pub user_name: String,
  pub course_name: String,
  pub price: Option<i64>,
  pub points_awarded: i64,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::profile::Entity",
    from = "Column::UserId",
    to = "super::profile::Column::Id"
  )]
  Profile,
}

impl Related<super::profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
