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
          .table(RegistrationLinks::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RegistrationLinks::Token)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(RegistrationLinks::Points)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(RegistrationLinks::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(RegistrationLinks::InvitedEmail).string())
          .col(ColumnDef::new(RegistrationLinks::UsedAt).date_time())
          .col(ColumnDef::new(RegistrationLinks::UsedBy).big_integer())
          .col(
            ColumnDef::new(RegistrationLinks::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_registration_links_used_by")
              .from(RegistrationLinks::Table, RegistrationLinks::UsedBy)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RegistrationLinks::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RegistrationLinks {
  Table,
  Token,
  Points,
  IsActive,
  InvitedEmail,
  UsedAt,
  UsedBy,
  CreatedAt,
}
