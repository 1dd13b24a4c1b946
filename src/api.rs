//! HTTP gateway over a [`SharedChain`].

use crate::block::{Block, BookCheckout};
use crate::book::Book;
use crate::chain::SharedChain;
use crate::error::LedgerError;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Error returned by the handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request body was not valid JSON for the expected shape.
    Decode(String),
    Ledger(LedgerError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Decode(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Ledger(err) => err,
        };
        let status = match &err {
            LedgerError::LinkageRejected { .. } => StatusCode::CONFLICT,
            LedgerError::Serialization(_) | LedgerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": err.to_string() }))).into_response()
    }
}

/// Build the router with every route bound to `chain`.
pub fn create_router(chain: SharedChain) -> Router {
    Router::new()
        .route("/", get(list_blocks).post(write_block))
        .route("/book", post(create_book))
        .route("/validate", get(validate_chain))
        .route("/health", get(health))
        .with_state(chain)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// GET /
pub async fn list_blocks(State(chain): State<SharedChain>) -> Json<Vec<Block>> {
    Json(chain.snapshot())
}

/// POST / — append a checkout, echoing the payload once it is committed.
pub async fn write_block(
    State(chain): State<SharedChain>,
    body: Bytes,
) -> Result<Json<BookCheckout>, ApiError> {
    let checkout: BookCheckout = decode(&body)?;
    chain.append(checkout.clone())?;
    Ok(Json(checkout))
}

/// POST /book
pub async fn create_book(body: Bytes) -> Result<Json<Book>, ApiError> {
    let book: Book = decode(&body)?;
    Ok(Json(book.with_derived_id()))
}

#[derive(Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub errors: Vec<String>,
}

/// GET /validate — audit every hash and link.
pub async fn validate_chain(State(chain): State<SharedChain>) -> Json<ValidateResp> {
    let errors: Vec<String> = chain.verify().iter().map(ToString::to_string).collect();
    Json(ValidateResp {
        ok: errors.is_empty(),
        errors,
    })
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_maps_to_conflict() {
        let err = ApiError::from(LedgerError::LinkageRejected {
            position: 4,
            reason: "prev_hash does not match head".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn serialization_maps_to_server_error() {
        let serde_err = serde_json::from_str::<BookCheckout>("{").unwrap_err();
        let err = ApiError::from(LedgerError::Serialization(serde_err));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn decode_reports_raw_error() {
        let err = decode::<BookCheckout>(b"not json").unwrap_err();
        match err {
            ApiError::Decode(msg) => assert!(msg.contains("expected")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
