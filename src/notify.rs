//! Best-effort notification dispatch.
//!
//! Workflow transitions hand `(recipient, kind, payload)` to an external
//! HTTP collaborator after their transaction commits. Failures are logged
//! and swallowed; they never surface as a failure of the primary operation.

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
  RedemptionApproved,
  RedemptionRejected,
  PointsDeducted,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
  #[error("endpoint returned {0}")]
  Status(reqwest::StatusCode),
  #[error(transparent)]
  Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct Notifier {
  http: reqwest::Client,
  endpoint: Option<String>,
}

impl Notifier {
  /// With no endpoint configured every dispatch is a logged no-op.
  pub fn new(endpoint: Option<String>) -> Self {
    Self { http: reqwest::Client::new(), endpoint }
  }

  pub async fn dispatch(
    &self,
    recipient: &str,
    kind: Kind,
    payload: json::Value,
  ) -> Result<(), NotifyError> {
    let Some(endpoint) = &self.endpoint else {
      debug!(?kind, recipient, "no notification endpoint, skipping");
      return Ok(());
    };

    let body = json::json!({
      "recipient": recipient,
      "kind": kind,
      "payload": payload,
    });

    let res = self.http.post(endpoint).json(&body).send().await?;
    if !res.status().is_success() {
      return Err(NotifyError::Status(res.status()));
    }

    Ok(())
  }

  /// Fire-and-forget: spawned after the caller's transaction committed,
  /// so it can neither block nor revert it.
  pub fn send(&self, recipient: String, kind: Kind, payload: json::Value) {
    let notifier = self.clone();
    tokio::spawn(async move {
      if let Err(err) = notifier.dispatch(&recipient, kind, payload).await {
        warn!(?kind, recipient, "notification failed: {err}");
      }
    });
  }
}
