use sea_orm_migration::prelude::*;

use super::m20260302_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(BonusEntries::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(BonusEntries::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(BonusEntries::UserId).big_integer().not_null())
          .col(ColumnDef::new(BonusEntries::UserName).string().not_null())
          .col(ColumnDef::new(BonusEntries::CourseName).string().not_null())
          .col(ColumnDef::new(BonusEntries::Price).big_integer())
          .col(
            ColumnDef::new(BonusEntries::PointsAwarded)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(BonusEntries::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_bonus_entries_user")
              .from(BonusEntries::Table, BonusEntries::UserId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_bonus_entries_user")
          .table(BonusEntries::Table)
          .col(BonusEntries::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(BonusEntries::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum BonusEntries {
  Table,
  Id,
  UserId,
  UserName,
  CourseName,
  Price,
  PointsAwarded,
  CreatedAt,
}
