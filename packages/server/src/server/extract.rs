use axum::extract::FromRequest;

use crate::common::MarketError;

/// `axum::Json` whose rejection is a [`MarketError`], so malformed bodies
/// answer 400 with the usual `{error, code}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(MarketError))]
pub struct ApiJson<T>(pub T);
