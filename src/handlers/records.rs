use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::registry::{Price, Record, RecordId};
use crate::AppState;

use super::AppError;

pub const BASE_PATH: &str = "/api/resources";

/// `Location` header pointing at a single record.
type Located = [(header::HeaderName, String); 1];

// ─── Request body ────────────────────────────────────────────────

/// Body of both create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub name: String,
    pub current_price: Price,
}

impl RecordRequest {
    /// Price range is already enforced by `Price` deserialization; the
    /// name must be a single word of ASCII letters, digits or `_`.
    fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        if !self
            .name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(AppError::BadRequest(format!(
                "name must be alphanumeric, got {:?}",
                self.name
            )));
        }
        Ok(())
    }
}

// ─── GET /api/resources ──────────────────────────────────────────

pub async fn list_records(State(state): State<Arc<AppState>>) -> Json<Vec<Record>> {
    Json(state.registry.list())
}

// ─── GET /api/resources/:id ──────────────────────────────────────

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Record>, AppError> {
    let id = record_id(id?)?;
    Ok(Json(state.registry.get(id)?))
}

// ─── POST /api/resources ─────────────────────────────────────────

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Located, Json<Record>), AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let record = state.registry.create(req.name, req.current_price)?;
    tracing::debug!(id = record.id, name = %record.name, price = %record.price, "record created");

    Ok((StatusCode::CREATED, location(record.id), Json(record)))
}

// ─── PUT /api/resources/:id ──────────────────────────────────────

pub async fn update_record(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<(Located, Json<Record>), AppError> {
    let id = record_id(id?)?;
    let Json(req) = payload?;
    req.validate()?;

    let record = state.registry.update(id, req.name, req.current_price)?;
    tracing::debug!(id, name = %record.name, price = %record.price, "record updated");

    Ok((location(record.id), Json(record)))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Ids are positive; anything else can never exist.
fn record_id(Path(raw): Path<i64>) -> Result<RecordId, AppError> {
    RecordId::try_from(raw)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("record not found by {raw}")))
}

fn location(id: RecordId) -> Located {
    [(header::LOCATION, format!("{BASE_PATH}/{id}"))]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> RecordRequest {
        RecordRequest {
            name: name.into(),
            current_price: Price::from_cents(100),
        }
    }

    #[test]
    fn accepts_word_names() {
        assert!(request("test").validate().is_ok());
        assert!(request("name_42").validate().is_ok());
    }

    #[test]
    fn rejects_empty_or_punctuated_names() {
        assert!(matches!(request("").validate(), Err(AppError::BadRequest(_))));
        assert!(matches!(request("two words").validate(), Err(AppError::BadRequest(_))));
        assert!(matches!(request("semi;colon").validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_positive_ids_are_not_found() {
        assert_eq!(record_id(Path(7)).unwrap(), 7);
        let err = record_id(Path(-123)).unwrap_err();
        assert_eq!(err.to_string(), "record not found by -123");
        assert!(matches!(record_id(Path(0)), Err(AppError::NotFound(_))));
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        assert!(serde_json::from_str::<RecordRequest>(r#"{"currentPrice": 12.45}"#).is_err());
        assert!(serde_json::from_str::<RecordRequest>(r#"{"name": "x"}"#).is_err());
        let ok: RecordRequest =
            serde_json::from_str(r#"{"name": "test", "currentPrice": 12.45}"#).unwrap();
        assert_eq!(ok.current_price.cents(), 1245);
    }
}
