use sea_orm::sea_query::Expr;

use crate::{
  entity::{bonus_entry, profile},
  prelude::*,
};

/// The only legitimate way a profile's `total_points` changes.
///
/// Grants and deductions append a bonus entry and adjust the balance in one
/// transaction; redemption approvals adjust the balance with the approved
/// redemption row as their record. Either way the reconciliation invariant
/// (balance == sum of entries minus approved redemption costs) holds after
/// every commit. The balance adjustment is a conditional
/// `UPDATE ... SET total_points = total_points + ?` checked by affected row
/// count, never a read-modify-write in the caller.
pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Grants (`amount > 0`) or deducts (`amount < 0`) points.
  ///
  /// A deduction requires the current balance to cover it, otherwise
  /// `InsufficientBalance` and nothing is written.
  pub async fn grant(
    &self,
    user_id: i64,
    amount: i64,
    course_name: &str,
    price: Option<i64>,
  ) -> Result<bonus_entry::Model> {
    let txn = self.db.begin().await?;
    let entry =
      Self::grant_in(&txn, user_id, amount, course_name, price).await?;
    txn.commit().await?;
    Ok(entry)
  }

  /// Same as [`grant`](Self::grant) but runs against a caller-supplied
  /// connection, so link consumption can fold the bonus into its own
  /// transaction.
  pub async fn grant_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    amount: i64,
    course_name: &str,
    price: Option<i64>,
  ) -> Result<bonus_entry::Model> {
    let user = profile::Entity::find_by_id(user_id)
      .one(conn)
      .await?
      .ok_or(Error::UserNotFound)?;

    Self::adjust_in(conn, user_id, amount).await?;

    let now = Utc::now().naive_utc();
    let entry = bonus_entry::ActiveModel {
      user_id: Set(user_id),
      user_name: Set(user.name),
      course_name: Set(course_name.to_string()),
      price: Set(price),
      points_awarded: Set(amount),
      created_at: Set(now),
      ..Default::default()
    };

    Ok(entry.insert(conn).await?)
  }

  /// Conditional atomic balance change without a ledger entry.
  ///
  /// Redemption approval records its debit as the approved redemption row
  /// itself, so it calls this directly; everything else goes through
  /// [`grant_in`](Self::grant_in). A negative `delta` only applies while
  /// the balance covers it, which keeps `total_points` non-negative even
  /// against concurrent mutations.
  pub async fn adjust_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    delta: i64,
  ) -> Result<()> {
    let mut update = profile::Entity::update_many()
      .col_expr(
        profile::Column::TotalPoints,
        Expr::col(profile::Column::TotalPoints).add(delta),
      )
      .filter(profile::Column::Id.eq(user_id));

    if delta < 0 {
      update = update.filter(profile::Column::TotalPoints.gte(-delta));
    }

    let res = update.exec(conn).await?;
    if res.rows_affected == 0 {
      return Err(if delta < 0 {
        Error::InsufficientBalance
      } else {
        Error::UserNotFound
      });
    }

    Ok(())
  }

  pub async fn history(&self, user_id: i64) -> Result<Vec<bonus_entry::Model>> {
    let entries = bonus_entry::Entity::find()
      .filter(bonus_entry::Column::UserId.eq(user_id))
      .order_by_desc(bonus_entry::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(entries)
  }
}
