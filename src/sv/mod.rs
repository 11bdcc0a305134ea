pub mod ledger;
pub mod link;
pub mod prize;
pub mod profile;
pub mod redemption;
pub mod stats;

pub use ledger::Ledger;
pub use link::Link;
pub use prize::Prize;
pub use profile::Profile;
pub use redemption::Redemption;
pub use stats::Stats;
