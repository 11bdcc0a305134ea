//! HTTP surface: thin callers of the service layer.
//!
//! The external auth layer fronts this service and forwards the
//! authenticated identity as `x-user-id` / `x-user-role` headers; the
//! [`Actor`] extractor turns them into explicit parameters so nothing in
//! the service layer reads ambient state.

use axum::{
  Json,
  extract::{FromRequestParts, Path, Query, State},
  http::{StatusCode, request::Parts},
  response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
  entity::{
    bonus_entry, prize, profile, profile::Role, redemption, registration_link,
  },
  notify::Kind,
  prelude::*,
  state::AppState,
  sv::{redemption::Decision, stats::Overview},
};

#[derive(Debug, Clone)]
pub struct Actor {
  pub user_id: i64,
  pub role: Role,
}

fn reject(status: StatusCode, message: &str) -> Response {
  let body = json::json!({ "success": false, "error": message });
  (status, Json(body)).into_response()
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> std::result::Result<Self, Self::Rejection> {
    let user_id = parts
      .headers
      .get("x-user-id")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.parse().ok())
      .ok_or_else(|| {
        reject(StatusCode::UNAUTHORIZED, "Missing or malformed identity")
      })?;

    let role = match parts.headers.get("x-user-role").and_then(|v| v.to_str().ok())
    {
      Some("admin") => Role::Admin,
      _ => Role::User,
    };

    Ok(Actor { user_id, role })
  }
}

/// An [`Actor`] that must carry the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for Admin {
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> std::result::Result<Self, Self::Rejection> {
    let actor = Actor::from_request_parts(parts, state).await?;
    if actor.role != Role::Admin {
      return Err(reject(StatusCode::FORBIDDEN, "Admin role required"));
    }
    Ok(Admin(actor))
  }
}

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}

// --- public surface ---

#[derive(Debug, Deserialize)]
pub struct RegisterReq {
  pub token: String,
  pub email: String,
  pub name: String,
  pub phone: Option<String>,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RegisterReq>,
) -> Result<Json<profile::Model>> {
  let user = app
    .sv()
    .profile
    .register(&req.token, &req.email, &req.name, req.phone)
    .await?;

  info!(user = user.id, "registered through link");
  Ok(Json(user))
}

pub async fn catalog(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<prize::Model>>> {
  Ok(Json(app.sv().prize.active().await?))
}

#[derive(Debug, Deserialize)]
pub struct ValidateLinkReq {
  pub token: String,
  pub email: Option<String>,
}

/// Pre-check for the registration form; consumption still re-validates.
pub async fn validate_link(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ValidateLinkReq>,
) -> Result<Json<json::Value>> {
  let valid =
    match app.sv().link.validate(&req.token, req.email.as_deref()).await {
      Ok(_) => true,
      // only domain rejections mean "invalid"
      Err(err @ Error::Database(_)) => return Err(err),
      Err(_) => false,
    };
  Ok(Json(json::json!({ "valid": valid })))
}

pub async fn my_profile(
  State(app): State<Arc<AppState>>,
  actor: Actor,
) -> Result<Json<profile::Model>> {
  let user =
    app.sv().profile.by_id(actor.user_id).await?.ok_or(Error::UserNotFound)?;
  Ok(Json(user))
}

pub async fn my_ledger(
  State(app): State<Arc<AppState>>,
  actor: Actor,
) -> Result<Json<Vec<bonus_entry::Model>>> {
  Ok(Json(app.sv().ledger.history(actor.user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RedeemReq {
  pub prize_id: i64,
}

pub async fn request_redemption(
  State(app): State<Arc<AppState>>,
  actor: Actor,
  Json(req): Json<RedeemReq>,
) -> Result<Json<redemption::Model>> {
  let redemption =
    app.sv().redemption.request(actor.user_id, req.prize_id).await?;

  info!(
    user = actor.user_id,
    prize = req.prize_id,
    cost = redemption.point_cost,
    "redemption requested"
  );
  Ok(Json(redemption))
}

pub async fn my_redemptions(
  State(app): State<Arc<AppState>>,
  actor: Actor,
) -> Result<Json<Vec<redemption::Model>>> {
  Ok(Json(app.sv().redemption.by_user(actor.user_id).await?))
}

// --- admin surface ---

#[derive(Debug, Deserialize)]
pub struct BonusReq {
  pub user_id: i64,
  pub course_name: String,
  pub price: Option<i64>,
  pub points: i64,
}

pub async fn grant_bonus(
  State(app): State<Arc<AppState>>,
  Admin(admin): Admin,
  Json(req): Json<BonusReq>,
) -> Result<Json<bonus_entry::Model>> {
  let entry = app
    .sv()
    .ledger
    .grant(req.user_id, req.points, &req.course_name, req.price)
    .await?;

  // a negative grant is a deduction and raises the same alert
  if req.points < 0 {
    app.notifier.send(
      format!("admin:{}", admin.user_id),
      Kind::PointsDeducted,
      json::json!({
        "user_id": req.user_id,
        "points": -req.points,
        "reason": req.course_name,
      }),
    );
  }

  Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct DeductReq {
  pub user_id: i64,
  pub points: i64,
  pub reason: String,
}

pub async fn deduct_points(
  State(app): State<Arc<AppState>>,
  Admin(admin): Admin,
  Json(req): Json<DeductReq>,
) -> Result<Json<bonus_entry::Model>> {
  let entry =
    app.sv().ledger.grant(req.user_id, -req.points, &req.reason, None).await?;

  // admin-facing alert, after the deduction committed
  app.notifier.send(
    format!("admin:{}", admin.user_id),
    Kind::PointsDeducted,
    json::json!({
      "user_id": req.user_id,
      "points": req.points,
      "reason": req.reason,
    }),
  );

  Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct InviteReq {
  pub email: String,
  pub name: String,
  pub phone: Option<String>,
  #[serde(default)]
  pub admin: bool,
}

pub async fn invite_user(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Json(req): Json<InviteReq>,
) -> Result<Json<profile::Model>> {
  let role = if req.admin { Role::Admin } else { Role::User };
  let user =
    app.sv().profile.invite(&req.email, &req.name, req.phone, role).await?;
  Ok(Json(user))
}

pub async fn list_users(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
) -> Result<Json<Vec<profile::Model>>> {
  Ok(Json(app.sv().profile.all().await?))
}

#[derive(Debug, Deserialize)]
pub struct VerifiedReq {
  pub is_verified: bool,
}

pub async fn set_user_verified(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Path(id): Path<i64>,
  Json(req): Json<VerifiedReq>,
) -> Result<StatusCode> {
  app.sv().profile.set_verified(id, req.is_verified).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Whole catalog including retired prizes, for the admin panel.
pub async fn list_prizes(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
) -> Result<Json<Vec<prize::Model>>> {
  Ok(Json(app.sv().prize.all().await?))
}

#[derive(Debug, Deserialize)]
pub struct PrizeReq {
  pub name: String,
  pub description: String,
  pub points: i64,
  pub image_url: Option<String>,
}

pub async fn create_prize(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Json(req): Json<PrizeReq>,
) -> Result<Json<prize::Model>> {
  let prize = app
    .sv()
    .prize
    .create(&req.name, &req.description, req.points, req.image_url)
    .await?;
  Ok(Json(prize))
}

#[derive(Debug, Deserialize)]
pub struct PrizePatchReq {
  pub name: Option<String>,
  pub description: Option<String>,
  pub points: Option<i64>,
  pub image_url: Option<String>,
}

pub async fn update_prize(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Path(id): Path<i64>,
  Json(req): Json<PrizePatchReq>,
) -> Result<Json<prize::Model>> {
  let prize = app
    .sv()
    .prize
    .update(id, req.name, req.description, req.points, req.image_url)
    .await?;
  Ok(Json(prize))
}

#[derive(Debug, Deserialize)]
pub struct ActiveReq {
  pub is_active: bool,
}

pub async fn set_prize_active(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Path(id): Path<i64>,
  Json(req): Json<ActiveReq>,
) -> Result<StatusCode> {
  app.sv().prize.set_active(id, req.is_active).await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_prize(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Path(id): Path<i64>,
) -> Result<StatusCode> {
  app.sv().prize.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn pending_redemptions(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
) -> Result<Json<Vec<redemption::Model>>> {
  Ok(Json(app.sv().redemption.pending().await?))
}

#[derive(Debug, Deserialize)]
pub struct ResolveReq {
  pub decision: Decision,
  pub comment: Option<String>,
}

pub async fn resolve_redemption(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Path(id): Path<i64>,
  Json(req): Json<ResolveReq>,
) -> Result<Json<redemption::Model>> {
  let sv = app.sv();
  let redemption = sv.redemption.resolve(id, req.decision, req.comment).await?;

  // user-facing status notification, after the transition committed
  if let Some(user) = sv.profile.by_id(redemption.user_id).await? {
    let kind = match redemption.status {
      redemption::RedemptionStatus::Approved => Kind::RedemptionApproved,
      _ => Kind::RedemptionRejected,
    };
    app.notifier.send(
      user.email,
      kind,
      json::json!({
        "prize": redemption.prize_name,
        "point_cost": redemption.point_cost,
        "comment": redemption.comment,
      }),
    );
  }

  Ok(Json(redemption))
}

#[derive(Debug, Deserialize)]
pub struct LinkReq {
  #[serde(default)]
  pub points: i64,
  pub invited_email: Option<String>,
}

pub async fn create_link(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Json(req): Json<LinkReq>,
) -> Result<Json<registration_link::Model>> {
  let link = app.sv().link.create(req.points, req.invited_email).await?;
  Ok(Json(link))
}

pub async fn list_links(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
) -> Result<Json<Vec<registration_link::Model>>> {
  Ok(Json(app.sv().link.all().await?))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
  pub top: Option<u64>,
}

pub async fn stats(
  State(app): State<Arc<AppState>>,
  Admin(_): Admin,
  Query(query): Query<StatsQuery>,
) -> Result<Json<Overview>> {
  let top = query.top.unwrap_or(app.config.stats_top);
  Ok(Json(app.sv().stats.overview(top).await?))
}

#[cfg(test)]
mod tests {
  use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, header},
    routing::post,
  };
  use tower::ServiceExt;

  use super::*;
  use crate::{
    notify::Notifier,
    state::Config,
    sv::{Ledger, Link},
    test_utils::*,
  };

  fn router(db: DatabaseConnection) -> Router {
    let app = Arc::new(AppState {
      db,
      notifier: Notifier::new(None),
      config: Config::default(),
    });
    Router::new()
      .route("/api/links/validate", post(validate_link))
      .route("/api/admin/bonus", post(grant_bonus))
      .with_state(app)
  }

  fn post_json(uri: &str, body: json::Value) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(uri)
      .header("x-user-id", "1")
      .header("x-user-role", "admin")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  async fn body_json(response: axum::response::Response) -> json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn test_bonus_route_accepts_signed_amounts() {
    let db = setup_test_db().await;
    let user = create_user(&db, "alice@example.com", "Alice").await;
    Ledger::new(&db).grant(user.id, 100, "Course", None).await.unwrap();

    let app = router(db.clone());

    let res = app
      .clone()
      .oneshot(post_json(
        "/api/admin/bonus",
        json::json!({
          "user_id": user.id,
          "course_name": "correction",
          "points": -30,
        }),
      ))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 70);

    // deductions through this route hit the same balance guard
    let res = app
      .oneshot(post_json(
        "/api/admin/bonus",
        json::json!({
          "user_id": user.id,
          "course_name": "correction",
          "points": -500,
        }),
      ))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(profile_by_id(&db, user.id).await.total_points, 70);
  }

  #[tokio::test]
  async fn test_validate_link_reports_validity() {
    let db = setup_test_db().await;
    let link = Link::new(&db).create(50, None).await.unwrap();
    let app = router(db);

    let res = app
      .clone()
      .oneshot(post_json(
        "/api/links/validate",
        json::json!({ "token": link.token }),
      ))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["valid"], json::json!(true));

    let res = app
      .oneshot(post_json(
        "/api/links/validate",
        json::json!({ "token": "no-such-token" }),
      ))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["valid"], json::json!(false));
  }

  #[tokio::test]
  async fn test_validate_link_storage_error_is_not_invalid() {
    // no tables at all, so the lookup fails as a storage error
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let app = router(db);

    let res = app
      .oneshot(post_json(
        "/api/links/validate",
        json::json!({ "token": "whatever" }),
      ))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
