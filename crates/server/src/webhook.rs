use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use heymoji_core::errors::DispatchError;
use heymoji_slack::dispatch::ActionDispatcher;
use heymoji_slack::events::{Classified, EventClassifier, EventContext, InboundEvent};

use crate::inflight::InFlightTasks;
use crate::signature::SignatureVerifier;

pub const EVENTS_PATH: &str = "/slack/events";

#[derive(Clone)]
pub struct WebhookState {
    classifier: Arc<EventClassifier>,
    dispatcher: Arc<ActionDispatcher>,
    verifier: Option<Arc<SignatureVerifier>>,
    in_flight: InFlightTasks,
}

impl WebhookState {
    pub fn new(
        classifier: EventClassifier,
        dispatcher: ActionDispatcher,
        verifier: Option<SignatureVerifier>,
        in_flight: InFlightTasks,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            dispatcher: Arc::new(dispatcher),
            verifier: verifier.map(Arc::new),
            in_flight,
        }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route(EVENTS_PATH, post(slack_events)).with_state(state)
}

/// Acknowledges every delivery immediately; dispatch continues on a tracked task.
pub async fn slack_events(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.verifier {
        if let Err(error) = verifier.verify(&headers, &body, Utc::now().timestamp()) {
            warn!(
                event_name = "webhook.signature.rejected",
                error = %error,
                "rejected slack request with invalid signature"
            );
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let payload = match state.classifier.classify(&body) {
        Ok(payload) => payload,
        Err(error) => {
            log_classification_error(&error);
            return StatusCode::OK.into_response();
        }
    };

    let correlation_id = payload.event_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let ctx = EventContext::new(correlation_id);
    let event_type = payload.event_type.as_deref().unwrap_or("challenge");

    match payload.classified {
        Classified::Event(InboundEvent::ChallengeHandshake { challenge }) => {
            info!(
                event_name = "webhook.challenge.replied",
                correlation_id = %ctx.correlation_id,
                "answered url verification challenge"
            );
            (StatusCode::OK, Json(json!({ "challenge": challenge }))).into_response()
        }
        Classified::Dropped(reason) => {
            debug!(
                event_name = "webhook.event.dropped",
                correlation_id = %ctx.correlation_id,
                event_type,
                reason = reason.label(),
                "event dropped by policy"
            );
            StatusCode::OK.into_response()
        }
        Classified::Event(InboundEvent::Reaction(event)) => {
            debug!(
                event_name = "webhook.event.accepted",
                correlation_id = %ctx.correlation_id,
                event_type,
                channel = %event.channel,
                "reaction event accepted"
            );
            let dispatcher = Arc::clone(&state.dispatcher);
            state
                .in_flight
                .spawn(async move {
                    dispatcher.dispatch_reaction(&event, &ctx).await;
                })
                .await;
            StatusCode::OK.into_response()
        }
        Classified::Event(InboundEvent::Mention(event)) => {
            debug!(
                event_name = "webhook.event.accepted",
                correlation_id = %ctx.correlation_id,
                event_type,
                channel = %event.channel,
                "mention event accepted"
            );
            let dispatcher = Arc::clone(&state.dispatcher);
            state
                .in_flight
                .spawn(async move {
                    dispatcher.dispatch_mention(&event, &ctx).await;
                })
                .await;
            StatusCode::OK.into_response()
        }
    }
}

fn log_classification_error(error: &DispatchError) {
    match error {
        DispatchError::UnknownEventType(event_type) => info!(
            event_name = "webhook.event.unknown_type",
            error_class = error.error_class(),
            event_type = %event_type,
            "ignoring unsubscribed event type"
        ),
        other => warn!(
            event_name = "webhook.payload.rejected",
            error_class = other.error_class(),
            error = %other,
            "could not classify webhook payload"
        ),
    }
}
