use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the marketplace engines and HTTP routes.
///
/// Guard violations are raised before any write in the surrounding
/// transaction, so returning one of them never leaves partial state behind.
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("It is not your turn to respond to this offer")]
    ForbiddenTurn,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("This offer is already closed")]
    OfferClosed,

    #[error("This listing has already been sold")]
    ListingSold,

    #[error("This demand is closed to further changes")]
    DemandClosed,

    #[error("A broker has already been hired for this demand")]
    AlreadyHired,

    #[error("This broker is not hired for the demand")]
    NotHired,

    #[error("The deal has not been completed yet")]
    DealNotCompleted,

    #[error("You have already reviewed this deal")]
    DuplicateReview,

    #[error("Invalid response type: {0}")]
    InvalidAction(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Price must be greater than zero, at most two decimal places and below 10000000000")]
    InvalidPrice,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("A review must reference exactly one of offer_id or demand_id")]
    InvalidReviewTarget,

    #[error("You cannot make an offer on your own listing")]
    SelfOffer,

    #[error("Price estimation is unavailable")]
    OracleUnavailable,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for MarketError {
    fn from(e: sqlx::Error) -> Self {
        MarketError::Internal(e.into())
    }
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        MarketError::InvalidBody(rejection.body_text())
    }
}

impl MarketError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Unauthenticated => StatusCode::UNAUTHORIZED,
            MarketError::Forbidden(_) | MarketError::ForbiddenTurn => StatusCode::FORBIDDEN,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::OfferClosed
            | MarketError::ListingSold
            | MarketError::DemandClosed
            | MarketError::AlreadyHired
            | MarketError::NotHired
            | MarketError::DealNotCompleted
            | MarketError::DuplicateReview => StatusCode::CONFLICT,
            MarketError::InvalidAction(_)
            | MarketError::InvalidRating(_)
            | MarketError::InvalidPrice
            | MarketError::InvalidBody(_)
            | MarketError::InvalidReviewTarget
            | MarketError::SelfOffer => StatusCode::BAD_REQUEST,
            MarketError::OracleUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Unauthenticated => "unauthenticated",
            MarketError::Forbidden(_) => "forbidden",
            MarketError::ForbiddenTurn => "forbidden_turn",
            MarketError::NotFound(_) => "not_found",
            MarketError::OfferClosed => "offer_closed",
            MarketError::ListingSold => "listing_sold",
            MarketError::DemandClosed => "demand_closed",
            MarketError::AlreadyHired => "already_hired",
            MarketError::NotHired => "not_hired",
            MarketError::DealNotCompleted => "deal_not_completed",
            MarketError::DuplicateReview => "duplicate_review",
            MarketError::InvalidAction(_) => "invalid_action",
            MarketError::InvalidRating(_) => "invalid_rating",
            MarketError::InvalidPrice => "invalid_price",
            MarketError::InvalidBody(_) => "invalid_body",
            MarketError::InvalidReviewTarget => "invalid_review_target",
            MarketError::SelfOffer => "self_offer",
            MarketError::OracleUnavailable => "oracle_unavailable",
            MarketError::Internal(_) => "internal",
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        MarketError::Forbidden(reason.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            MarketError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error while handling request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error,
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
