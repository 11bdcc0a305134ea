use sea_orm_migration::prelude::*;

use super::{
  m20260302_000001_create_profiles::Profiles,
  m20260302_000003_create_prizes::Prizes,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Redemptions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Redemptions::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Redemptions::UserId).big_integer().not_null())
          .col(ColumnDef::new(Redemptions::UserName).string().not_null())
          .col(ColumnDef::new(Redemptions::PrizeId).big_integer().not_null())
          .col(ColumnDef::new(Redemptions::PrizeName).string().not_null())
          .col(
            ColumnDef::new(Redemptions::PointCost).big_integer().not_null(),
          )
          .col(ColumnDef::new(Redemptions::Status).string().not_null())
          .col(ColumnDef::new(Redemptions::Comment).string())
          .col(
            ColumnDef::new(Redemptions::RequestedAt).date_time().not_null(),
          )
          .col(ColumnDef::new(Redemptions::UpdatedAt).date_time())
          .foreign_key(
            ForeignKey::create()
              .name("fk_redemptions_user")
              .from(Redemptions::Table, Redemptions::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_redemptions_prize")
              .from(Redemptions::Table, Redemptions::PrizeId)
              .to(Prizes::Table, Prizes::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_redemptions_status")
          .table(Redemptions::Table)
          .col(Redemptions::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Redemptions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Redemptions {
  Table,
  Id,
  UserId,
  UserName,
  PrizeId,
  PrizeName,
  PointCost,
  Status,
  Comment,
  RequestedAt,
  UpdatedAt,
}
