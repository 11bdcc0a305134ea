pub use std::sync::Arc;

pub use chrono::Utc;
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
  QuerySelect, Set, TransactionTrait,
};
pub use tracing::{info, warn};

pub use crate::error::{Error, Result};
