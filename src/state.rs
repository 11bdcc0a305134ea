use tracing::info;

use migration::Migrator;

use crate::{notify::Notifier, prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  /// How many rows the top-N dashboard lists carry.
  pub stats_top: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self { stats_top: 10 }
  }
}

pub struct Services<'a> {
  pub ledger: sv::Ledger<'a>,
  pub link: sv::Link<'a>,
  pub prize: sv::Prize<'a>,
  pub profile: sv::Profile<'a>,
  pub redemption: sv::Redemption<'a>,
  pub stats: sv::Stats<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub notifier: Notifier,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str, notifier: Notifier) -> Self {
    Self::with_config(db_url, notifier, Config::default()).await
  }

  pub async fn with_config(
    db_url: &str,
    notifier: Notifier,
    config: Config,
  ) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, notifier, config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      ledger: sv::Ledger::new(&self.db),
      link: sv::Link::new(&self.db),
      prize: sv::Prize::new(&self.db),
      profile: sv::Profile::new(&self.db),
      redemption: sv::Redemption::new(&self.db),
      stats: sv::Stats::new(&self.db),
    }
  }
}
