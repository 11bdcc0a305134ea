use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Prizes::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Prizes::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Prizes::Name).string().not_null())
          .col(ColumnDef::new(Prizes::Description).string().not_null())
          .col(ColumnDef::new(Prizes::Points).big_integer().not_null())
          .col(ColumnDef::new(Prizes::ImageUrl).string())
          .col(
            ColumnDef::new(Prizes::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Prizes::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Prizes::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Prizes {
  Table,
  Id,
  Name,
  Description,
  Points,
  ImageUrl,
  IsActive,
  CreatedAt,
}
