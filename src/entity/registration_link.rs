//! RegistrationLink entity - single-use invite tokens
//!
//! A link may carry a welcome bonus and may be bound to one email.
//! Consumption is one-shot: `used_at`/`used_by` are set and `is_active`
//! drops in the same transaction that registers the user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration_links")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub token: String,
  pub points: i64,
  pub is_active: bool,
  pub invited_email: Option<String>,
  pub used_at: Option<DateTime>,
  pub used_by: Option<i64>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::profile::Entity",
    from = "Column::UsedBy",
    to = "super::profile::Column::Id"
  )]
  UsedByProfile,
}

impl ActiveModelBehavior for ActiveModel {}
