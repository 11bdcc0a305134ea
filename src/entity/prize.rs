//! Prize entity - redeemable catalog items
//!
//! Inactive prizes are hidden from redemption but kept for the history
//! of redemptions that reference them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub name: String,
  pub description: String,
  pub points: i64,
  pub image_url: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::redemption::Entity")]
  Redemptions,
}

impl Related<super::redemption::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Redemptions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
