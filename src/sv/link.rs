use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{entity::registration_link, prelude::*, sv};

/// Emails are compared after trimming and ASCII-lowercasing.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}

/// Single-use registration links.
///
/// Consumption is a compare-and-set on `is_active AND used_at IS NULL`, so
/// a retried or concurrent consume of the same token grants the welcome
/// bonus exactly once; every loser sees `LinkInvalid`.
pub struct Link<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Link<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    points: i64,
    invited_email: Option<String>,
  ) -> Result<registration_link::Model> {
    let now = Utc::now().naive_utc();
    let link = registration_link::ActiveModel {
      token: Set(Uuid::new_v4().to_string()),
      points: Set(points),
      is_active: Set(true),
      invited_email: Set(invited_email.as_deref().map(normalize_email)),
      created_at: Set(now),
      ..Default::default()
    };

    Ok(link.insert(self.db).await?)
  }

  pub async fn validate(
    &self,
    token: &str,
    email: Option<&str>,
  ) -> Result<registration_link::Model> {
    Self::validate_in(self.db, token, email).await
  }

  pub async fn validate_in<C: ConnectionTrait>(
    conn: &C,
    token: &str,
    email: Option<&str>,
  ) -> Result<registration_link::Model> {
    let link = registration_link::Entity::find_by_id(token)
      .one(conn)
      .await?
      .ok_or(Error::LinkNotFound)?;

    if !link.is_active || link.used_at.is_some() {
      return Err(Error::LinkInvalid);
    }

    if let Some(invited) = &link.invited_email {
      let supplied = email.map(normalize_email);
      if supplied.as_deref() != Some(invited.as_str()) {
        return Err(Error::LinkInvalid);
      }
    }

    Ok(link)
  }

  /// Marks the link consumed and grants its welcome bonus, all inside the
  /// caller's transaction (registration creates the profile there too).
  pub async fn consume_in<C: ConnectionTrait>(
    conn: &C,
    token: &str,
    new_user_id: i64,
  ) -> Result<()> {
    let link = registration_link::Entity::find_by_id(token)
      .one(conn)
      .await?
      .ok_or(Error::LinkNotFound)?;

    let now = Utc::now().naive_utc();
    let res = registration_link::Entity::update_many()
      .col_expr(registration_link::Column::IsActive, Expr::value(false))
      .col_expr(registration_link::Column::UsedAt, Expr::value(Some(now)))
      .col_expr(
        registration_link::Column::UsedBy,
        Expr::value(Some(new_user_id)),
      )
      .filter(registration_link::Column::Token.eq(token))
      .filter(registration_link::Column::IsActive.eq(true))
      .filter(registration_link::Column::UsedAt.is_null())
      .exec(conn)
      .await?;

    if res.rows_affected == 0 {
      return Err(Error::LinkInvalid);
    }

    if link.points > 0 {
      sv::Ledger::grant_in(
        conn,
        new_user_id,
        link.points,
        "registration bonus",
        None,
      )
      .await?;
    }

    Ok(())
  }

  pub async fn all(&self) -> Result<Vec<registration_link::Model>> {
    let links = registration_link::Entity::find()
      .order_by_desc(registration_link::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(links)
  }
}
