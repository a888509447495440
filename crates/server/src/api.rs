//! JSON API over one owner's wardrobe.
//!
//! Endpoints (all scoped to the `x-wardrobe-owner` header):
//! - `GET    /api/garments?category=`        list garments, newest first
//! - `POST   /api/garments`                  register classified garment metadata
//! - `PUT    /api/garments/{id}/occasions`   replace occasion tags
//! - `DELETE /api/garments/{id}`
//! - `GET    /api/outfits/recommend`         ranked outfit recommendations
//! - `POST   /api/outfits`                   save a chosen outfit
//! - `GET    /api/outfits`                   saved outfits, newest first
//! - `DELETE /api/outfits/{id}`
//! - `GET    /api/me/preferences`, `PUT /api/me/preferences`

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use wardrobe_core::domain::garment::{Garment, GarmentCategory, GarmentId, GarmentSubmission, OwnerId};
use wardrobe_core::domain::outfit::{
    ComboKey, OutfitCandidate, OutfitId, SavedOutfit, DEFAULT_SAVED_SCORE,
};
use wardrobe_core::domain::preferences::{Occasion, Preferences, PreferencesInput};
use wardrobe_core::errors::{ApplicationError, DomainError, InterfaceError};
use wardrobe_core::OutfitEngine;
use wardrobe_db::repositories::{SqlGarmentRepository, SqlOutfitRepository, SqlProfileRepository};
use wardrobe_db::{load_inventory, DbPool, GarmentRepository, OutfitRepository, ProfileRepository};

pub const OWNER_HEADER: &str = "x-wardrobe-owner";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ApiState {
    pub(crate) garments: Arc<dyn GarmentRepository>,
    pub(crate) outfits: Arc<dyn OutfitRepository>,
    pub(crate) profiles: Arc<dyn ProfileRepository>,
    engine: OutfitEngine,
}

impl ApiState {
    pub fn new(
        garments: Arc<dyn GarmentRepository>,
        outfits: Arc<dyn OutfitRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self { garments, outfits, profiles, engine: OutfitEngine::new() }
    }

    pub fn sql(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlGarmentRepository::new(pool.clone())),
            Arc::new(SqlOutfitRepository::new(pool.clone())),
            Arc::new(SqlProfileRepository::new(pool)),
        )
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/garments", get(list_garments).post(register_garment))
        .route("/api/garments/{id}", delete(delete_garment))
        .route("/api/garments/{id}/occasions", put(update_occasions))
        .route("/api/outfits", get(list_outfits).post(save_outfit))
        .route("/api/outfits/recommend", get(recommend_outfits))
        .route("/api/outfits/{id}", delete(delete_outfit))
        .route("/api/me/preferences", get(get_preferences).put(put_preferences))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request context and errors
// ---------------------------------------------------------------------------

/// Caller identity set by the authenticating gateway, plus a correlation id.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub owner: OwnerId,
    pub correlation_id: String,
}

impl RequestContext {
    fn reject(&self, error: impl Into<ApplicationError>) -> ApiError {
        ApiError(error.into().into_interface(self.correlation_id.clone()))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = header_value(parts, CORRELATION_HEADER)
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        match header_value(parts, OWNER_HEADER) {
            Some(owner) => Ok(Self { owner: OwnerId(owner), correlation_id }),
            None => Err(ApiError(InterfaceError::BadRequest {
                message: format!("missing `{OWNER_HEADER}` header"),
                correlation_id,
            })),
        }
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    correlation_id: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(
                event_name = "api.request.failed",
                correlation_id = %self.0.correlation_id(),
                error = %self.0.message(),
                "request failed"
            );
        }

        let body = ErrorBody {
            error: self.0.public_message(),
            correlation_id: self.0.correlation_id(),
        };
        (status, Json(body)).into_response()
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ---------------------------------------------------------------------------
// Garments
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GarmentListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OccasionsRequest {
    #[serde(default)]
    pub occasions: Vec<String>,
}

async fn list_garments(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Query(query): Query<GarmentListQuery>,
) -> Result<Json<Vec<Garment>>, ApiError> {
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match GarmentCategory::parse(raw) {
            Some(category) => Some(category),
            None => {
                return Err(ctx.reject(DomainError::InvariantViolation(format!(
                    "unknown garment category `{raw}`"
                ))))
            }
        },
    };

    let garments =
        state.garments.find_by_owner(&ctx.owner, category).await.map_err(|e| ctx.reject(e))?;
    Ok(Json(garments))
}

async fn register_garment(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Json(submission): Json<GarmentSubmission>,
) -> Result<(StatusCode, Json<Garment>), ApiError> {
    let garment = submission.into_garment(GarmentId(new_id()), ctx.owner.clone(), Utc::now());
    state.garments.save(garment.clone()).await.map_err(|e| ctx.reject(e))?;

    info!(
        event_name = "garments.registered",
        correlation_id = %ctx.correlation_id,
        garment_id = %garment.id,
        category = %garment.category,
        class = %garment.class,
        "garment registered"
    );
    Ok((StatusCode::CREATED, Json(garment)))
}

async fn update_occasions(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(body): Json<OccasionsRequest>,
) -> Result<Json<Garment>, ApiError> {
    let id = GarmentId(id);
    let occasions = Occasion::parse_list(&body.occasions);

    let updated = state
        .garments
        .update_occasions(&ctx.owner, &id, &occasions)
        .await
        .map_err(|e| ctx.reject(e))?;
    if !updated {
        return Err(ctx.reject(garment_not_found(&id)));
    }

    match state.garments.find_by_id(&ctx.owner, &id).await.map_err(|e| ctx.reject(e))? {
        Some(garment) => Ok(Json(garment)),
        None => Err(ctx.reject(garment_not_found(&id))),
    }
}

async fn delete_garment(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = GarmentId(id);
    let deleted = state.garments.delete(&ctx.owner, &id).await.map_err(|e| ctx.reject(e))?;
    if !deleted {
        return Err(ctx.reject(garment_not_found(&id)));
    }

    info!(
        event_name = "garments.deleted",
        correlation_id = %ctx.correlation_id,
        garment_id = %id,
        "garment deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

fn garment_not_found(id: &GarmentId) -> ApplicationError {
    ApplicationError::NotFound { entity: "garment", id: id.0.clone() }
}

// ---------------------------------------------------------------------------
// Outfits
// ---------------------------------------------------------------------------

/// Query string of the recommend endpoint. List values are comma separated and
/// flags accept `true`/`1`/`yes`/`on`.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub colors: Option<String>,
    pub occasion: Option<String>,
    pub style: Option<String>,
    pub include_dress: Option<String>,
    pub include_coat: Option<String>,
    pub top_preference: Option<String>,
    pub layered_top: Option<String>,
    pub exclude: Option<String>,
    pub use_profile: Option<String>,
}

impl RecommendQuery {
    fn uses_profile(&self) -> bool {
        parse_flag(self.use_profile.as_deref()).unwrap_or(false)
    }

    fn into_input(self) -> PreferencesInput {
        PreferencesInput {
            colors: split_list(self.colors.as_deref()),
            occasion: self.occasion,
            style: self.style,
            include_dress: parse_flag(self.include_dress.as_deref()),
            include_coat: parse_flag(self.include_coat.as_deref()),
            top_preference: self.top_preference,
            layered_top: parse_flag(self.layered_top.as_deref()),
            exclude: split_list(self.exclude.as_deref()),
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    value.map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub outfits: Vec<OutfitCandidate>,
    /// Keys to send back as `exclude` to get fresh combinations next time.
    pub next_exclude: String,
}

async fn recommend_outfits(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let base = if query.uses_profile() {
        state.profiles.find(&ctx.owner).await.map_err(|e| ctx.reject(e))?.unwrap_or_default()
    } else {
        Preferences::default()
    };
    let preferences = query.into_input().apply_to(base);

    let inventory = load_inventory(state.garments.as_ref(), &ctx.owner, &preferences)
        .await
        .map_err(|e| ctx.reject(e))?;

    let outfits = match state.engine.generate_with_thread_rng(&inventory, &preferences) {
        Ok(outfits) => outfits,
        Err(error) => {
            warn!(
                event_name = "outfits.recommend.rejected",
                correlation_id = %ctx.correlation_id,
                reason = error.code(),
                inventory_size = inventory.len(),
                "outfit generation rejected"
            );
            return Err(ctx.reject(error));
        }
    };

    info!(
        event_name = "outfits.recommend.generated",
        correlation_id = %ctx.correlation_id,
        inventory_size = inventory.len(),
        excluded = preferences.exclude_keys.len(),
        returned = outfits.len(),
        "outfit recommendations generated"
    );

    let next_exclude = preferences
        .exclude_keys
        .iter()
        .chain(outfits.iter().map(|outfit| &outfit.combo_key))
        .map(ComboKey::as_str)
        .collect::<Vec<_>>()
        .join(",");

    Ok(Json(RecommendResponse { outfits, next_exclude }))
}

#[derive(Debug, Deserialize)]
pub struct SaveOutfitRequest {
    pub top_id: String,
    pub secondary_top_id: Option<String>,
    pub bottom_id: String,
    pub shoes_id: String,
    pub coat_id: Option<String>,
    pub score: Option<i64>,
}

async fn save_outfit(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Json(body): Json<SaveOutfitRequest>,
) -> Result<(StatusCode, Json<SavedOutfit>), ApiError> {
    let outfit = SavedOutfit {
        id: OutfitId(new_id()),
        owner_id: ctx.owner.clone(),
        top_id: GarmentId(body.top_id),
        secondary_top_id: body.secondary_top_id.map(GarmentId),
        bottom_id: GarmentId(body.bottom_id),
        shoes_id: GarmentId(body.shoes_id),
        coat_id: body.coat_id.map(GarmentId),
        score: body.score.map_or(DEFAULT_SAVED_SCORE, |score| score.clamp(0, 100) as u8),
        created_at: Utc::now(),
    };

    for garment_id in outfit.garment_ids() {
        let owned =
            state.garments.find_by_id(&ctx.owner, garment_id).await.map_err(|e| ctx.reject(e))?;
        if owned.is_none() {
            return Err(ctx.reject(garment_not_found(garment_id)));
        }
    }

    state.outfits.save(outfit.clone()).await.map_err(|e| ctx.reject(e))?;

    info!(
        event_name = "outfits.saved",
        correlation_id = %ctx.correlation_id,
        outfit_id = %outfit.id,
        score = outfit.score,
        "outfit saved"
    );
    Ok((StatusCode::CREATED, Json(outfit)))
}

async fn list_outfits(
    State(state): State<ApiState>,
    ctx: RequestContext,
) -> Result<Json<Vec<SavedOutfit>>, ApiError> {
    let outfits = state.outfits.list_for_owner(&ctx.owner).await.map_err(|e| ctx.reject(e))?;
    Ok(Json(outfits))
}

async fn delete_outfit(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = OutfitId(id);
    let deleted = state.outfits.delete(&ctx.owner, &id).await.map_err(|e| ctx.reject(e))?;
    if !deleted {
        return Err(ctx.reject(ApplicationError::NotFound { entity: "outfit", id: id.0 }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Preference profile
// ---------------------------------------------------------------------------

async fn get_preferences(
    State(state): State<ApiState>,
    ctx: RequestContext,
) -> Result<Json<Preferences>, ApiError> {
    let stored = state.profiles.find(&ctx.owner).await.map_err(|e| ctx.reject(e))?;
    Ok(Json(stored.unwrap_or_default()))
}

async fn put_preferences(
    State(state): State<ApiState>,
    ctx: RequestContext,
    Json(input): Json<PreferencesInput>,
) -> Result<Json<Preferences>, ApiError> {
    let stored = state.profiles.find(&ctx.owner).await.map_err(|e| ctx.reject(e))?;
    let preferences = input.apply_to(stored.unwrap_or_default()).without_exclusions();
    state.profiles.upsert(&ctx.owner, &preferences).await.map_err(|e| ctx.reject(e))?;

    info!(
        event_name = "preferences.updated",
        correlation_id = %ctx.correlation_id,
        "preference profile stored"
    );
    Ok(Json(preferences))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wardrobe_core::domain::garment::{
        Garment, GarmentCategory, GarmentClass, GarmentId, OwnerId,
    };
    use wardrobe_db::repositories::{
        InMemoryGarmentRepository, InMemoryOutfitRepository, InMemoryProfileRepository,
    };
    use wardrobe_db::GarmentRepository;

    use super::{router, ApiState, OWNER_HEADER};

    struct Harness {
        garments: Arc<InMemoryGarmentRepository>,
        app: Router,
    }

    fn harness() -> Harness {
        let garments = Arc::new(InMemoryGarmentRepository::default());
        let state = ApiState::new(
            garments.clone(),
            Arc::new(InMemoryOutfitRepository::default()),
            Arc::new(InMemoryProfileRepository::default()),
        );
        Harness { garments, app: router(state) }
    }

    fn garment(
        owner: &str,
        id: &str,
        category: GarmentCategory,
        class: GarmentClass,
        minutes: i64,
    ) -> Garment {
        Garment {
            id: GarmentId(id.to_string()),
            owner_id: OwnerId(owner.to_string()),
            category,
            class,
            color: "black".to_string(),
            confidence: 0.9,
            occasions: Vec::new(),
            image_url: None,
            added_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().expect("timestamp")
                + Duration::minutes(minutes),
        }
    }

    async fn stock_basic_wardrobe(harness: &Harness, owner: &str) {
        for garment in [
            garment(owner, "t1", GarmentCategory::Top, GarmentClass::TShirt, 0),
            garment(owner, "b1", GarmentCategory::Bottom, GarmentClass::Trouser, 1),
            garment(owner, "s1", GarmentCategory::Shoes, GarmentClass::Sneaker, 2),
        ] {
            harness.garments.save(garment).await.expect("save garment");
        }
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        owner: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn missing_owner_header_is_a_bad_request() {
        let harness = harness();

        let (status, body) = send(&harness.app, "GET", "/api/garments", None, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing `x-wardrobe-owner` header");
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn registered_garment_gets_defaults_and_is_listed() {
        let harness = harness();

        let (status, created) = send(
            &harness.app,
            "POST",
            "/api/garments",
            Some("alice"),
            Some(json!({
                "class_name": "Sneaker",
                "category": "shoes",
                "confidence": 1.7,
                "occasions": ["sporty", "gala"]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["color"], "unknown");
        assert_eq!(created["confidence"], 1.0);
        assert_eq!(created["occasions"], json!(["sporty"]));
        assert_eq!(created["id"].as_str().map(str::len), Some(32));

        let (status, listed) =
            send(&harness.app, "GET", "/api/garments?category=shoes", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (_, other_owner) = send(&harness.app, "GET", "/api/garments", Some("bob"), None).await;
        assert_eq!(other_owner, json!([]));
    }

    #[tokio::test]
    async fn unknown_category_filter_is_rejected() {
        let harness = harness();

        let (status, body) =
            send(&harness.app, "GET", "/api/garments?category=hats", Some("alice"), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or("").contains("hats"));
    }

    #[tokio::test]
    async fn occasions_update_and_delete_report_missing_garments() {
        let harness = harness();
        stock_basic_wardrobe(&harness, "alice").await;

        let (status, updated) = send(
            &harness.app,
            "PUT",
            "/api/garments/t1/occasions",
            Some("alice"),
            Some(json!({ "occasions": ["work", "party"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["occasions"], json!(["work", "party"]));

        let (status, _) = send(
            &harness.app,
            "PUT",
            "/api/garments/t1/occasions",
            Some("bob"),
            Some(json!({ "occasions": ["work"] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&harness.app, "DELETE", "/api/garments/t1", Some("alice"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) =
            send(&harness.app, "DELETE", "/api/garments/t1", Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "garment `t1` was not found");
    }

    #[tokio::test]
    async fn recommend_reports_inventory_problems_verbatim() {
        let harness = harness();
        harness
            .garments
            .save(garment("alice", "t1", GarmentCategory::Top, GarmentClass::TShirt, 0))
            .await
            .expect("save");

        let (status, body) =
            send(&harness.app, "GET", "/api/outfits/recommend", Some("alice"), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Not enough garments to generate outfits. You need at least 1 top, 1 bottom and 1 shoe."
        );
    }

    #[tokio::test]
    async fn recommend_returns_single_outfit_then_nothing_once_excluded() {
        let harness = harness();
        stock_basic_wardrobe(&harness, "alice").await;

        let (status, first) =
            send(&harness.app, "GET", "/api/outfits/recommend", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["outfits"].as_array().map(Vec::len), Some(1));
        assert_eq!(first["outfits"][0]["combo_key"], "t1-b1-s1");
        assert_eq!(first["next_exclude"], "t1-b1-s1");

        let (status, second) = send(
            &harness.app,
            "GET",
            "/api/outfits/recommend?exclude=t1-b1-s1",
            Some("alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["outfits"], json!([]));
    }

    #[tokio::test]
    async fn recommend_can_start_from_stored_profile() {
        let harness = harness();
        stock_basic_wardrobe(&harness, "alice").await;

        let (status, _) = send(
            &harness.app,
            "PUT",
            "/api/me/preferences",
            Some("alice"),
            Some(json!({ "layered_top": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &harness.app,
            "GET",
            "/api/outfits/recommend?use_profile=true",
            Some("alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Layered outfit requires at least 1 T-shirt and 1 Pullover.");

        let (status, _) = send(
            &harness.app,
            "GET",
            "/api/outfits/recommend?use_profile=true&layered_top=false",
            Some("alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn saving_outfits_checks_ownership_and_clamps_score() {
        let harness = harness();
        stock_basic_wardrobe(&harness, "alice").await;
        harness
            .garments
            .save(garment("bob", "bob-coat", GarmentCategory::Coat, GarmentClass::Coat, 3))
            .await
            .expect("save");

        let (status, body) = send(
            &harness.app,
            "POST",
            "/api/outfits",
            Some("alice"),
            Some(json!({
                "top_id": "t1", "bottom_id": "b1", "shoes_id": "s1", "coat_id": "bob-coat"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "garment `bob-coat` was not found");

        let (status, saved) = send(
            &harness.app,
            "POST",
            "/api/outfits",
            Some("alice"),
            Some(json!({ "top_id": "t1", "bottom_id": "b1", "shoes_id": "s1", "score": 250 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["score"], 100);

        let (status, default_score) = send(
            &harness.app,
            "POST",
            "/api/outfits",
            Some("alice"),
            Some(json!({ "top_id": "t1", "bottom_id": "b1", "shoes_id": "s1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(default_score["score"], 50);

        let (_, listed) = send(&harness.app, "GET", "/api/outfits", Some("alice"), None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(2));

        let id = saved["id"].as_str().expect("outfit id").to_string();
        let (status, _) =
            send(&harness.app, "DELETE", &format!("/api/outfits/{id}"), Some("bob"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&harness.app, "DELETE", &format!("/api/outfits/{id}"), Some("alice"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn preferences_default_until_stored_and_drop_exclusions() {
        let harness = harness();

        let (status, initial) =
            send(&harness.app, "GET", "/api/me/preferences", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(initial["include_coat"], false);

        let (status, stored) = send(
            &harness.app,
            "PUT",
            "/api/me/preferences",
            Some("alice"),
            Some(json!({
                "colors": ["Navy"],
                "occasion": "work",
                "include_coat": true,
                "exclude": ["t1-b1-s1"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored["occasion"], "work");
        assert!(stored.get("exclude_keys").is_none());

        let (_, fetched) = send(&harness.app, "GET", "/api/me/preferences", Some("alice"), None).await;
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn partial_preference_updates_keep_earlier_fields() {
        let harness = harness();

        let (status, _) = send(
            &harness.app,
            "PUT",
            "/api/me/preferences",
            Some("alice"),
            Some(json!({ "occasion": "work", "colors": ["blue"], "include_coat": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, updated) = send(
            &harness.app,
            "PUT",
            "/api/me/preferences",
            Some("alice"),
            Some(json!({ "layered_top": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["occasion"], "work");
        assert_eq!(updated["include_coat"], true);
        assert_eq!(updated["preferred_colors"], json!(["blue"]));
        assert_eq!(updated["layered_top"], true);

        let (_, fetched) = send(&harness.app, "GET", "/api/me/preferences", Some("bob"), None).await;
        assert_eq!(fetched["occasion"], Value::Null);
    }
}
