//! Order route handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use super::{ok, ApiResult};
use crate::domain::aggregates::Order;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
    pub eligible: bool,
    pub pending_review_count: Option<usize>,
}

impl From<&Order> for ReviewEligibility {
    fn from(order: &Order) -> Self {
        Self { eligible: order.is_review_eligible(), pending_review_count: order.pending_review_count() }
    }
}

#[instrument(skip_all)]
pub async fn review_eligibility(order: Result<Json<Order>, JsonRejection>) -> ApiResult<ReviewEligibility> {
    let Json(order) = order?;
    let eligibility = ReviewEligibility::from(&order);
    tracing::debug!(order_id = %order.id, eligible = eligibility.eligible, "Checked review eligibility");
    ok(eligibility)
}
