//! Shared fixtures for service tests: an in-memory SQLite database built
//! straight from the entities, plus a few row factories.

use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

use crate::{
  entity::{
    bonus_entry, prize, profile, redemption, redemption::RedemptionStatus,
    registration_link,
  },
  prelude::*,
};

pub async fn setup_test_db() -> DatabaseConnection {
  let db = Database::connect("sqlite::memory:").await.unwrap();

  let schema = Schema::new(DbBackend::Sqlite);

  let stmt = schema.create_table_from_entity(profile::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(bonus_entry::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(prize::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(redemption::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(registration_link::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  db
}

pub async fn create_user(
  db: &DatabaseConnection,
  email: &str,
  name: &str,
) -> profile::Model {
  let now = Utc::now().naive_utc();
  profile::ActiveModel {
    email: Set(email.to_string()),
    name: Set(name.to_string()),
    phone: Set(None),
    role: Set(profile::Role::User),
    total_points: Set(0),
    is_verified: Set(true),
    created_at: Set(now),
    ..Default::default()
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn create_prize(
  db: &DatabaseConnection,
  name: &str,
  points: i64,
) -> prize::Model {
  let now = Utc::now().naive_utc();
  prize::ActiveModel {
    name: Set(name.to_string()),
    description: Set(format!("{name} description")),
    points: Set(points),
    image_url: Set(None),
    is_active: Set(true),
    created_at: Set(now),
    ..Default::default()
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn profile_by_id(db: &DatabaseConnection, id: i64) -> profile::Model {
  profile::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

/// Checks the reconciliation invariant: the stored balance equals the sum
/// of ledger entries minus the cost of approved redemptions.
pub async fn assert_reconciled(db: &DatabaseConnection, user_id: i64) {
  let user = profile_by_id(db, user_id).await;

  let entries: i64 = bonus_entry::Entity::find()
    .filter(bonus_entry::Column::UserId.eq(user_id))
    .all(db)
    .await
    .unwrap()
    .iter()
    .map(|entry| entry.points_awarded)
    .sum();

  let redeemed: i64 = redemption::Entity::find()
    .filter(redemption::Column::UserId.eq(user_id))
    .filter(redemption::Column::Status.eq(RedemptionStatus::Approved))
    .all(db)
    .await
    .unwrap()
    .iter()
    .map(|redemption| redemption.point_cost)
    .sum();

  assert_eq!(
    user.total_points,
    entries - redeemed,
    "ledger out of balance for user {user_id}"
  );
}
