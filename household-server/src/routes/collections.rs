//! The family collection endpoints: `/api/calendar`, `/api/expenses`,
//! `/api/shop-list` and `/api/home-chores`.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use household_core::model::{CalendarEvent, Expense, HomeDuty, ShopItem};
use household_core::remote::UpdateBody;
use household_core::{HouseholdError, Record};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(collection::<CalendarEvent>())
        .merge(collection::<Expense>())
        .merge(collection::<ShopItem>())
        .merge(collection::<HomeDuty>())
}

fn collection<R: Record>() -> Router<AppState> {
    let path = format!("/api/{}", R::COLLECTION.path());
    Router::new().route(
        &path,
        get(list::<R>)
            .post(create::<R>)
            .put(update::<R>)
            .delete(remove::<R>),
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyQuery {
    family_id: Option<String>,
}

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn validation(err: HouseholdError) -> AppError {
    match err {
        HouseholdError::Validation(message) => AppError::bad_request(message),
        other => other.into(),
    }
}

/// GET /api/<collection>?familyId= - Rows of one family
async fn list<R: Record>(
    State(state): State<AppState>,
    Query(query): Query<FamilyQuery>,
) -> Result<Json<Vec<R>>, AppError> {
    let family_id = present(query.family_id.as_deref())
        .ok_or_else(|| AppError::bad_request("Missing familyId"))?;

    Ok(Json(state.list::<R>(family_id)?))
}

/// POST /api/<collection> - Create a row, keeping the client's id if given
async fn create<R: Record>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<R>), AppError> {
    if present(body.get("familyId").and_then(Value::as_str)).is_none() {
        return Err(AppError::bad_request("Missing familyId"));
    }

    let mut record: R =
        serde_json::from_value(body).map_err(|e| AppError::bad_request(e.to_string()))?;
    if record.id().is_empty() {
        record.set_id(Uuid::new_v4().to_string());
    }
    record.validate().map_err(validation)?;

    if !state.insert(&record)? {
        return Err(AppError::conflict(format!("'{}' already exists", record.id())));
    }

    tracing::info!(collection = %R::COLLECTION, id = %record.id(), family_id = %record.family_id(), "created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/<collection> - Apply `{id, ...changedFields}`
async fn update<R: Record>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<R>, AppError> {
    if present(body.get("id").and_then(Value::as_str)).is_none() {
        return Err(AppError::bad_request("Missing id"));
    }

    let UpdateBody { id, patch } = serde_json::from_value::<UpdateBody<R::Patch>>(body)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let record = state
        .update::<R>(&id, &patch)
        .map_err(validation)?
        .ok_or_else(|| AppError::not_found(format!("'{id}' not found")))?;

    tracing::info!(collection = %R::COLLECTION, id = %id, "updated");
    Ok(Json(record))
}

/// DELETE /api/<collection>?id=
async fn remove<R: Record>(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, AppError> {
    let id = present(query.id.as_deref()).ok_or_else(|| AppError::bad_request("Missing id"))?;

    if !state.remove::<R>(id) {
        return Err(AppError::not_found(format!("'{id}' not found")));
    }

    tracing::info!(collection = %R::COLLECTION, id = %id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
