use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{RawQuery, State};

use crate::correlation::QueryParams;
use crate::reconcile::ReconcileOutcome;
use crate::state::SharedState;

/// Unauthenticated; the survey service is trusted by network convention.
pub async fn funnelform_webhook(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> ReconcileOutcome {
    let params = parse_query(query.as_deref());
    match body {
        Ok(body) => state.reconciler.reconcile(&body, &params).await,
        Err(rejection) => {
            tracing::warn!("Webhook body unreadable: {rejection}");
            state
                .reconciler
                .reject_unreadable(rejection.status(), &params)
                .await
        }
    }
}

/// Lenient query parsing: malformed pairs never reject the delivery and the
/// last occurrence of a key wins.
fn parse_query(raw: Option<&str>) -> QueryParams {
    raw.map(|q| {
        form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_value_wins() {
        let params = parse_query(Some("submission_id=a&submission_id=b&x"));
        assert_eq!(params["submission_id"], "b");
        assert_eq!(params["x"], "");
    }

    #[test]
    fn absent_query_is_empty() {
        assert!(parse_query(None).is_empty());
    }
}
