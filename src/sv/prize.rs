use crate::{
  entity::{prize, redemption},
  prelude::*,
};

pub struct Prize<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Prize<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    name: &str,
    description: &str,
    points: i64,
    image_url: Option<String>,
  ) -> Result<prize::Model> {
    let now = Utc::now().naive_utc();
    let prize = prize::ActiveModel {
      name: Set(name.to_string()),
      description: Set(description.to_string()),
      points: Set(points),
      image_url: Set(image_url),
      is_active: Set(true),
      created_at: Set(now),
      ..Default::default()
    };

    Ok(prize.insert(self.db).await?)
  }

  /// Edits the catalog entry. Pending redemptions keep their snapshotted
  /// cost; a price change only affects future requests.
  pub async fn update(
    &self,
    id: i64,
    name: Option<String>,
    description: Option<String>,
    points: Option<i64>,
    image_url: Option<String>,
  ) -> Result<prize::Model> {
    let prize = prize::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PrizeNotFound)?;

    let mut prize: prize::ActiveModel = prize.into();
    if let Some(name) = name {
      prize.name = Set(name);
    }
    if let Some(description) = description {
      prize.description = Set(description);
    }
    if let Some(points) = points {
      prize.points = Set(points);
    }
    if let Some(image_url) = image_url {
      prize.image_url = Set(Some(image_url));
    }

    Ok(prize.update(self.db).await?)
  }

  pub async fn set_active(&self, id: i64, active: bool) -> Result<()> {
    let prize = prize::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PrizeNotFound)?;

    prize::ActiveModel { is_active: Set(active), ..prize.into() }
      .update(self.db)
      .await?;

    Ok(())
  }

  /// Hard delete, only for prizes nobody ever redeemed. Anything with
  /// history must be deactivated instead so old redemptions keep a valid
  /// reference.
  pub async fn delete(&self, id: i64) -> Result<()> {
    let prize = prize::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PrizeNotFound)?;

    let referenced = redemption::Entity::find()
      .filter(redemption::Column::PrizeId.eq(id))
      .count(self.db)
      .await?;
    if referenced > 0 {
      return Err(Error::PrizeInUse);
    }

    prize.delete(self.db).await?;
    Ok(())
  }

  #[allow(dead_code)]
  pub async fn by_id(&self, id: i64) -> Result<Option<prize::Model>> {
    let prize = prize::Entity::find_by_id(id).one(self.db).await?;
    Ok(prize)
  }

  /// The redeemable catalog: active prizes only.
  pub async fn active(&self) -> Result<Vec<prize::Model>> {
    let prizes = prize::Entity::find()
      .filter(prize::Column::IsActive.eq(true))
      .order_by_asc(prize::Column::Points)
      .all(self.db)
      .await?;
    Ok(prizes)
  }

  pub async fn all(&self) -> Result<Vec<prize::Model>> {
    let prizes = prize::Entity::find()
      .order_by_asc(prize::Column::Points)
      .all(self.db)
      .await?;
    Ok(prizes)
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
  async fn test_catalog_hides_inactive() {
    let db = setup_test_db().await;
    let sv = Prize::new(&db);

    let mug = sv.create("Mug", "A mug", 50, None).await.unwrap();
    sv.create("Shirt", "A shirt", 150, None).await.unwrap();

    sv.set_active(mug.id, false).await.unwrap();

    let catalog = sv.active().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Shirt");

    assert_eq!(sv.all().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_delete_unused_prize() {
    let db = setup_test_db().await;
    let sv = Prize::new(&db);

    let prize = sv.create("Typo", "Oops", 10, None).await.unwrap();
    sv.delete(prize.id).await.unwrap();

    assert!(sv.by_id(prize.id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_delete_prize_with_history() {
    let db = setup_test_db().await;
    let user = create_user(&db, "alice@example.com", "Alice").await;
    let prize = create_prize(&db, "Mug", 50).await;

    Ledger::new(&db).grant(user.id, 100, "Course", None).await.unwrap();
    let red =
      sv::Redemption::new(&db).request(user.id, prize.id).await.unwrap();
    sv::Redemption::new(&db)
      .resolve(red.id, Decision::Approved, None)
      .await
      .unwrap();

    assert!(matches!(
      Prize::new(&db).delete(prize.id).await,
      Err(Error::PrizeInUse)
    ));

    // the redemption still shows its snapshot even though the prize can
    // only be retired, not removed
    Prize::new(&db).set_active(prize.id, false).await.unwrap();
    let red = redemption::Entity::find_by_id(red.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(red.prize_name, "Mug");
  }
}
