use sea_orm::sea_query::Expr;
use serde::Deserialize;

use crate::{
  entity::{prize, profile, redemption, redemption::RedemptionStatus},
  prelude::*,
  sv,
};

/// Admin decision on a pending redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Approved,
  Rejected,
}

/// Redemption workflow: `pending -> approved | rejected`, both terminal.
///
/// Requesting never deducts points; the authoritative balance check happens
/// at approval time, inside the same transaction as the status flip. The
/// flip itself is a compare-and-set on `status = pending`, so of two racing
/// resolvers exactly one wins and the loser sees `AlreadyResolved`.
pub struct Redemption<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Redemption<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Creates a pending redemption with the prize cost snapshotted into
  /// `point_cost`. Later catalog edits do not touch existing requests.
  pub async fn request(
    &self,
    user_id: i64,
    prize_id: i64,
  ) -> Result<redemption::Model> {
    // inactive prizes are hidden from the catalog, so they are
    // indistinguishable from missing ones here
    let prize = prize::Entity::find_by_id(prize_id)
      .one(self.db)
      .await?
      .filter(|prize| prize.is_active)
      .ok_or(Error::PrizeNotFound)?;

    let user = profile::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    if user.total_points < prize.points {
      return Err(Error::InsufficientPoints);
    }

    let now = Utc::now().naive_utc();
    let redemption = redemption::ActiveModel {
      user_id: Set(user.id),
      user_name: Set(user.name),
      prize_id: Set(prize.id),
      prize_name: Set(prize.name),
      point_cost: Set(prize.points),
      status: Set(RedemptionStatus::Pending),
      requested_at: Set(now),
      ..Default::default()
    };

    Ok(redemption.insert(self.db).await?)
  }

  /// Moves a pending redemption to a terminal state.
  ///
  /// Rejection requires a non-empty comment and changes no balance.
  /// Approval re-checks the balance against the snapshotted cost by
  /// debiting through the ledger inside the same transaction; a failed
  /// debit rolls the status flip back and surfaces `InsufficientBalance`.
  pub async fn resolve(
    &self,
    id: i64,
    decision: Decision,
    comment: Option<String>,
  ) -> Result<redemption::Model> {
    let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    if decision == Decision::Rejected && comment.is_none() {
      return Err(Error::CommentRequired);
    }

    let status = match decision {
      Decision::Approved => RedemptionStatus::Approved,
      Decision::Rejected => RedemptionStatus::Rejected,
    };

    let txn = self.db.begin().await?;

    let redemption = redemption::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(Error::RedemptionNotFound)?;

    let now = Utc::now().naive_utc();

    // compare-and-set: only a pending request may turn terminal, and only
    // one resolver may claim it
    let res = redemption::Entity::update_many()
      .col_expr(redemption::Column::Status, Expr::value(status))
      .col_expr(redemption::Column::Comment, Expr::value(comment))
      .col_expr(redemption::Column::UpdatedAt, Expr::value(Some(now)))
      .filter(redemption::Column::Id.eq(id))
      .filter(redemption::Column::Status.eq(RedemptionStatus::Pending))
      .exec(&txn)
      .await?;

    if res.rows_affected == 0 {
      return Err(Error::AlreadyResolved);
    }

    if decision == Decision::Approved {
      // the approved row itself is the ledger record of this debit;
      // a balance below the snapshotted cost rolls everything back
      sv::Ledger::adjust_in(&txn, redemption.user_id, -redemption.point_cost)
        .await?;
    }

    let resolved = redemption::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(Error::RedemptionNotFound)?;

    txn.commit().await?;
    Ok(resolved)
  }

  pub async fn by_user(&self, user_id: i64) -> Result<Vec<redemption::Model>> {
    let redemptions = redemption::Entity::find()
      .filter(redemption::Column::UserId.eq(user_id))
      .order_by_desc(redemption::Column::RequestedAt)
      .all(self.db)
      .await?;
    Ok(redemptions)
  }

  pub async fn pending(&self) -> Result<Vec<redemption::Model>> {
    let redemptions = redemption::Entity::find()
      .filter(redemption::Column::Status.eq(RedemptionStatus::Pending))
      .order_by_asc(redemption::Column::RequestedAt)
      .all(self.db)
      .await?;
    Ok(redemptions)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{sv::Ledger, test_utils::*};

  #[tokio::test]
  async fn test_request_then_approve() {
    let db = setup_test_db().await;
    let user = create_user(&db, "alice@example.com", "Alice").await;
    let prize = create_prize(&db, "Headphones", 300).await;

    Ledger::new(&db).grant(user.id, 500, "Course", None).await.unwrap();

    let sv = Redemption::new(&db);
    let red = sv.request(user.id, prize.id).await.unwrap();

    // request reserves nothing
    assert_eq!(red.status, RedemptionStatus::Pending);
    assert_eq!(red.point_cost, 300);
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 500);

    let red = sv.resolve(red.id, Decision::Approved, None).await.unwrap();
    assert_eq!(red.status, RedemptionStatus::Approved);
    assert!(red.updated_at.is_some());
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 200);

    // second resolution fails, balance unchanged
    assert!(matches!(
      sv.resolve(red.id, Decision::Rejected, Some("late".into())).await,
      Err(Error::AlreadyResolved)
    ));
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 200);
  }

  #[tokio::test]
  async fn test_request_insufficient_points() {
    let db = setup_test_db().await;
    let user = create_user(&db, "bob@example.com", "Bob").await;
    let prize = create_prize(&db, "Headphones", 300).await;

    Ledger::new(&db).grant(user.id, 100, "Course", None).await.unwrap();

    assert!(matches!(
      Redemption::new(&db).request(user.id, prize.id).await,
      Err(Error::InsufficientPoints)
    ));

    // nothing was created
    assert!(Redemption::new(&db).by_user(user.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_request_inactive_prize() {
    let db = setup_test_db().await;
    let user = create_user(&db, "bob@example.com", "Bob").await;
    let prize = create_prize(&db, "Retired Mug", 50).await;

    Ledger::new(&db).grant(user.id, 100, "Course", None).await.unwrap();
    sv::Prize::new(&db).set_active(prize.id, false).await.unwrap();

    assert!(matches!(
      Redemption::new(&db).request(user.id, prize.id).await,
      Err(Error::PrizeNotFound)
    ));
  }

  #[tokio::test]
  async fn test_reject_requires_comment() {
    let db = setup_test_db().await;
    let user = create_user(&db, "carol@example.com", "Carol").await;
    let prize = create_prize(&db, "Mug", 50).await;

    Ledger::new(&db).grant(user.id, 100, "Course", None).await.unwrap();

    let sv = Redemption::new(&db);
    let red = sv.request(user.id, prize.id).await.unwrap();

    assert!(matches!(
      sv.resolve(red.id, Decision::Rejected, None).await,
      Err(Error::CommentRequired)
    ));
    assert!(matches!(
      sv.resolve(red.id, Decision::Rejected, Some("  ".into())).await,
      Err(Error::CommentRequired)
    ));

    let red = sv
      .resolve(red.id, Decision::Rejected, Some("out of stock".into()))
      .await
      .unwrap();
    assert_eq!(red.status, RedemptionStatus::Rejected);
    assert_eq!(red.comment.as_deref(), Some("out of stock"));

    // rejection changes no balance
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 100);
  }

  #[tokio::test]
  async fn test_approval_rechecks_balance() {
    let db = setup_test_db().await;
    let user = create_user(&db, "dave@example.com", "Dave").await;
    let prize = create_prize(&db, "Headphones", 300).await;
    let ledger = Ledger::new(&db);

    ledger.grant(user.id, 400, "Course", None).await.unwrap();

    let sv = Redemption::new(&db);
    let red = sv.request(user.id, prize.id).await.unwrap();

    // balance drops below the snapshotted cost before approval
    ledger.grant(user.id, -200, "deduction", None).await.unwrap();

    assert!(matches!(
      sv.resolve(red.id, Decision::Approved, None).await,
      Err(Error::InsufficientBalance)
    ));

    // the failed approval left the request pending and the balance intact
    let red = redemption::Entity::find_by_id(red.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(red.status, RedemptionStatus::Pending);
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 200);
  }

  #[tokio::test]
  async fn test_snapshot_cost_survives_price_change() {
    let db = setup_test_db().await;
    let user = create_user(&db, "erin@example.com", "Erin").await;
    let prize = create_prize(&db, "Headphones", 300).await;

    Ledger::new(&db).grant(user.id, 500, "Course", None).await.unwrap();

    let sv = Redemption::new(&db);
    let red = sv.request(user.id, prize.id).await.unwrap();

    // catalog price doubles while the request is pending
    sv::Prize::new(&db)
      .update(prize.id, None, None, Some(600), None)
      .await
      .unwrap();

    let red = sv.resolve(red.id, Decision::Approved, None).await.unwrap();
    assert_eq!(red.point_cost, 300);
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 200);
  }

  #[tokio::test]
  async fn test_multiple_pending_allowed() {
    let db = setup_test_db().await;
    let user = create_user(&db, "fred@example.com", "Fred").await;
    let prize = create_prize(&db, "Mug", 300).await;

    Ledger::new(&db).grant(user.id, 400, "Course", None).await.unwrap();

    let sv = Redemption::new(&db);
    let first = sv.request(user.id, prize.id).await.unwrap();
    let second = sv.request(user.id, prize.id).await.unwrap();

    // both fit the balance at request time, only one can be approved
    sv.resolve(first.id, Decision::Approved, None).await.unwrap();
    assert!(matches!(
      sv.resolve(second.id, Decision::Approved, None).await,
      Err(Error::InsufficientBalance)
    ));

    assert_eq!(profile_by_id(&db, user.id).await.total_points, 100);
    assert_reconciled(&db, user.id).await;
  }

  #[tokio::test]
  async fn test_resolve_missing_redemption() {
    let db = setup_test_db().await;

    assert!(matches!(
      Redemption::new(&db).resolve(42, Decision::Approved, None).await,
      Err(Error::RedemptionNotFound)
    ));
  }
}
