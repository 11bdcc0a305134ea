use crate::{
  entity::{profile, profile::Role},
  prelude::*,
  sv,
  sv::link::normalize_email,
};

pub struct Profile<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Profile<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Self-service registration through an invite link.
  ///
  /// Link validation, profile creation and link consumption (with its
  /// welcome bonus) commit together; a double-submitted token fails the
  /// whole registration with `LinkInvalid` and leaves nothing behind.
  pub async fn register(
    &self,
    token: &str,
    email: &str,
    name: &str,
    phone: Option<String>,
  ) -> Result<profile::Model> {
    let email = normalize_email(email);

    let txn = self.db.begin().await?;

    sv::Link::validate_in(&txn, token, Some(email.as_str())).await?;

    let user = Self::insert_in(&txn, &email, name, phone, Role::User).await?;
    sv::Link::consume_in(&txn, token, user.id).await?;

    txn.commit().await?;

    // re-read: the welcome bonus may have moved the balance
    let user = profile::Entity::find_by_id(user.id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;
    Ok(user)
  }

  /// Admin-created profile, no link involved.
  pub async fn invite(
    &self,
    email: &str,
    name: &str,
    phone: Option<String>,
    role: Role,
  ) -> Result<profile::Model> {
    Self::insert_in(self.db, &normalize_email(email), name, phone, role).await
  }

  async fn insert_in<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    name: &str,
    phone: Option<String>,
    role: Role,
  ) -> Result<profile::Model> {
    let taken = profile::Entity::find()
      .filter(profile::Column::Email.eq(email))
      .one(conn)
      .await?;
    if taken.is_some() {
      return Err(Error::EmailTaken);
    }

    let now = Utc::now().naive_utc();
    let user = profile::ActiveModel {
      email: Set(email.to_string()),
      name: Set(name.to_string()),
      phone: Set(phone),
      role: Set(role),
      total_points: Set(0),
      is_verified: Set(false),
      created_at: Set(now),
      ..Default::default()
    };

    Ok(user.insert(conn).await?)
  }

  pub async fn by_id(&self, id: i64) -> Result<Option<profile::Model>> {
    let user = profile::Entity::find_by_id(id).one(self.db).await?;
    Ok(user)
  }

  #[allow(dead_code)]
  pub async fn by_email(&self, email: &str) -> Result<Option<profile::Model>> {
    let user = profile::Entity::find()
      .filter(profile::Column::Email.eq(normalize_email(email)))
      .one(self.db)
      .await?;
    Ok(user)
  }

  pub async fn all(&self) -> Result<Vec<profile::Model>> {
    let users = profile::Entity::find()
      .order_by_asc(profile::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(users)
  }

  #[allow(dead_code)]
  pub async fn count(&self) -> Result<u64> {
    Ok(profile::Entity::find().count(self.db).await?)
  }

  pub async fn set_verified(&self, id: i64, verified: bool) -> Result<()> {
    let user = profile::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    profile::ActiveModel { is_verified: Set(verified), ..user.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}
