use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::{bonus_entry, profile, redemption, redemption::RedemptionStatus},
  prelude::*,
};

/// Admin dashboard aggregates. Derived on every call, never stored.
#[derive(Debug, Serialize)]
pub struct Overview {
  pub total_users: u64,
  /// Sum of positive ledger entries only; deductions are not "granted"
  /// points and show up in balances and the redeemed total instead.
  pub points_granted: i64,
  /// Sum of `point_cost` over approved redemptions.
  pub points_redeemed: i64,
  pub top_users: Vec<TopUser>,
  pub top_prizes: Vec<TopPrize>,
}

#[derive(Debug, Serialize)]
pub struct TopUser {
  pub id: i64,
  pub name: String,
  pub total_points: i64,
}

#[derive(Debug, Serialize)]
pub struct TopPrize {
  pub id: i64,
  pub name: String,
  pub approved: i64,
}

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn overview(&self, top: u64) -> Result<Overview> {
    let total_users = profile::Entity::find().count(self.db).await?;

    let points_granted: Option<Option<i64>> = bonus_entry::Entity::find()
      .select_only()
      .column_as(
        Expr::col(bonus_entry::Column::PointsAwarded).sum(),
        "total",
      )
      .filter(bonus_entry::Column::PointsAwarded.gt(0))
      .into_tuple()
      .one(self.db)
      .await?;

    let points_redeemed: Option<Option<i64>> = redemption::Entity::find()
      .select_only()
      .column_as(Expr::col(redemption::Column::PointCost).sum(), "total")
      .filter(redemption::Column::Status.eq(RedemptionStatus::Approved))
      .into_tuple()
      .one(self.db)
      .await?;

    let top_users = profile::Entity::find()
      .order_by_desc(profile::Column::TotalPoints)
      .limit(top)
      .all(self.db)
      .await?
      .into_iter()
      .map(|user| TopUser {
        id: user.id,
        name: user.name,
        total_points: user.total_points,
      })
      .collect();

    let top_prizes: Vec<(i64, String, i64)> = redemption::Entity::find()
      .select_only()
      .column(redemption::Column::PrizeId)
      .column(redemption::Column::PrizeName)
      .column_as(Expr::col(redemption::Column::Id).count(), "approved")
      .filter(redemption::Column::Status.eq(RedemptionStatus::Approved))
      .group_by(redemption::Column::PrizeId)
      .group_by(redemption::Column::PrizeName)
      .order_by_desc(Expr::cust("approved"))
      .limit(top)
      .into_tuple()
      .all(self.db)
      .await?;

    Ok(Overview {
      total_users,
      points_granted: points_granted.flatten().unwrap_or(0),
      points_redeemed: points_redeemed.flatten().unwrap_or(0),
      top_users,
      top_prizes: top_prizes
        .into_iter()
        .map(|(id, name, approved)| TopPrize { id, name, approved })
        .collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    sv,
    sv::{Ledger, redemption::Decision},
    test_utils::*,
  };

  #[tokio::test]
  async fn test_overview_aggregates() {
    let db = setup_test_db().await;
    let alice = create_user(&db, "alice@example.com", "Alice").await;
    let bob = create_user(&db, "bob@example.com", "Bob").await;
    let mug = create_prize(&db, "Mug", 50).await;
    let shirt = create_prize(&db, "Shirt", 150).await;
    let ledger = Ledger::new(&db);

    ledger.grant(alice.id, 300, "Course A", None).await.unwrap();
    ledger.grant(bob.id, 200, "Course B", None).await.unwrap();
    // a deduction does not count as granted points
    ledger.grant(bob.id, -50, "deduction", None).await.unwrap();

    let redemptions = sv::Redemption::new(&db);
    for _ in 0..2 {
      let red = redemptions.request(alice.id, mug.id).await.unwrap();
      redemptions.resolve(red.id, Decision::Approved, None).await.unwrap();
    }
    let red = redemptions.request(bob.id, shirt.id).await.unwrap();
    redemptions
      .resolve(red.id, Decision::Rejected, Some("no stock".into()))
      .await
      .unwrap();

    let overview = Stats::new(&db).overview(10).await.unwrap();

    assert_eq!(overview.total_users, 2);
    assert_eq!(overview.points_granted, 500);
    // only approved redemptions count
    assert_eq!(overview.points_redeemed, 100);

    assert_eq!(overview.top_users[0].name, "Alice");
    assert_eq!(overview.top_users[0].total_points, 200);

    assert_eq!(overview.top_prizes.len(), 1);
    assert_eq!(overview.top_prizes[0].name, "Mug");
    assert_eq!(overview.top_prizes[0].approved, 2);
  }

  #[tokio::test]
  async fn test_overview_empty_store() {
    let db = setup_test_db().await;

    let overview = Stats::new(&db).overview(5).await.unwrap();
    assert_eq!(overview.total_users, 0);
    assert_eq!(overview.points_granted, 0);
    assert_eq!(overview.points_redeemed, 0);
    assert!(overview.top_users.is_empty());
    assert!(overview.top_prizes.is_empty());
  }
}
