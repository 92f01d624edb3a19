//! Infrastructure wiring shared by all handlers: document stores, the floor-plan
//! dispatcher, token issuing and the realtime fan-out channel.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::{Mutex, MutexGuard, broadcast};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use eventsphere_auth::{Hs256Jwt, JwtClaims, JwtValidator, TokenError, User};
use eventsphere_chat::Chat;
use eventsphere_core::{
    ChatId, ExhibitorApplicationId, ExpoId, FeedbackId, RegistrationId, SessionId, UserId,
};
use eventsphere_events::EventEnvelope;
use eventsphere_expo::{ExhibitorApplication, Expo, FloorPlan, FloorPlanCommand, Registration, Session};
use eventsphere_feedback::Feedback;
use eventsphere_infra::{
    AppConfig, CommandDispatcher, Dispatched, DispatchError, DocumentStore, InMemoryDocumentStore,
};

pub type Store<K, V> = Arc<dyn DocumentStore<K, V>>;

const FLOOR_PLAN_AGGREGATE: &str = "expo.floor_plan";
const REALTIME_CAPACITY: usize = 1024;

/// Message pushed to SSE subscribers.
#[derive(Debug, Clone)]
pub struct RealtimeMessage {
    /// `None` fans out to every connected user.
    pub recipients: Option<Vec<UserId>>,
    pub topic: String,
    pub payload: JsonValue,
}

impl RealtimeMessage {
    fn is_for(&self, user_id: UserId) -> bool {
        self.recipients
            .as_ref()
            .is_none_or(|users| users.contains(&user_id))
    }
}

struct Stores {
    users: Store<UserId, User>,
    expos: Store<ExpoId, Expo>,
    applications: Store<ExhibitorApplicationId, ExhibitorApplication>,
    registrations: Store<RegistrationId, Registration>,
    sessions: Store<SessionId, Session>,
    feedback: Store<FeedbackId, Feedback>,
    chats: Store<ChatId, Chat>,
    floor_plans: Store<ExpoId, FloorPlan>,
}

pub struct AppServices {
    stores: Stores,
    floor_plans: CommandDispatcher<Store<ExpoId, FloorPlan>>,
    jwt: Arc<Hs256Jwt>,
    token_ttl: chrono::Duration,
    unique_submissions: bool,
    cors_origins: Vec<String>,
    /// Serializes check-then-insert sequences (unique email, duplicate submissions,
    /// capacity-bounded approvals, chat create-or-get).
    serial_writes: Mutex<()>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::assemble(
            Stores {
                users: Arc::new(InMemoryDocumentStore::new()),
                expos: Arc::new(InMemoryDocumentStore::new()),
                applications: Arc::new(InMemoryDocumentStore::new()),
                registrations: Arc::new(InMemoryDocumentStore::new()),
                sessions: Arc::new(InMemoryDocumentStore::new()),
                feedback: Arc::new(InMemoryDocumentStore::new()),
                chats: Arc::new(InMemoryDocumentStore::new()),
                floor_plans: Arc::new(InMemoryDocumentStore::new()),
            },
            config,
        )
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool, config: &AppConfig) -> Self {
        use eventsphere_infra::PostgresDocumentStore;

        Self::assemble(
            Stores {
                users: Arc::new(PostgresDocumentStore::new(pool.clone(), "users")),
                expos: Arc::new(PostgresDocumentStore::new(pool.clone(), "expos")),
                applications: Arc::new(PostgresDocumentStore::new(pool.clone(), "exhibitor_applications")),
                registrations: Arc::new(PostgresDocumentStore::new(pool.clone(), "registrations")),
                sessions: Arc::new(PostgresDocumentStore::new(pool.clone(), "sessions")),
                feedback: Arc::new(PostgresDocumentStore::new(pool.clone(), "feedback")),
                chats: Arc::new(PostgresDocumentStore::new(pool.clone(), "chats")),
                floor_plans: Arc::new(PostgresDocumentStore::new(pool, "floor_plans")),
            },
            config,
        )
    }

    fn assemble(stores: Stores, config: &AppConfig) -> Self {
        let (realtime_tx, _rx) = broadcast::channel(REALTIME_CAPACITY);
        Self {
            floor_plans: CommandDispatcher::new(stores.floor_plans.clone()),
            stores,
            jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
            token_ttl: config.token_ttl,
            unique_submissions: config.unique_submissions,
            cors_origins: config.cors_origins.clone(),
            serial_writes: Mutex::new(()),
            realtime_tx,
        }
    }

    pub fn users(&self) -> &Store<UserId, User> {
        &self.stores.users
    }

    pub fn expos(&self) -> &Store<ExpoId, Expo> {
        &self.stores.expos
    }

    pub fn applications(&self) -> &Store<ExhibitorApplicationId, ExhibitorApplication> {
        &self.stores.applications
    }

    pub fn registrations(&self) -> &Store<RegistrationId, Registration> {
        &self.stores.registrations
    }

    pub fn sessions(&self) -> &Store<SessionId, Session> {
        &self.stores.sessions
    }

    pub fn feedback(&self) -> &Store<FeedbackId, Feedback> {
        &self.stores.feedback
    }

    pub fn chats(&self) -> &Store<ChatId, Chat> {
        &self.stores.chats
    }

    pub fn floor_plans(&self) -> &Store<ExpoId, FloorPlan> {
        &self.stores.floor_plans
    }

    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        self.jwt.clone()
    }

    pub fn unique_submissions(&self) -> bool {
        self.unique_submissions
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub async fn serial_writes(&self) -> MutexGuard<'_, ()> {
        self.serial_writes.lock().await
    }

    pub fn issue_token(&self, user: &User) -> Result<String, TokenError> {
        let claims = JwtClaims::new(user.id, user.role, Utc::now(), self.token_ttl);
        self.jwt.issue(&claims)
    }

    /// Run a floor-plan command and fan the committed events out to subscribers.
    pub async fn dispatch_floor_plan(
        &self,
        expo_id: ExpoId,
        command: FloorPlanCommand,
    ) -> Result<Dispatched<FloorPlan>, DispatchError> {
        let dispatched = self
            .floor_plans
            .dispatch(expo_id, FLOOR_PLAN_AGGREGATE, command, |id| FloorPlan::empty(*id))
            .await?;

        for envelope in &dispatched.events {
            self.publish_event(envelope);
        }
        Ok(dispatched)
    }

    fn publish_event(&self, envelope: &EventEnvelope<JsonValue>) {
        match serde_json::to_value(envelope) {
            Ok(payload) => self.publish(RealtimeMessage {
                recipients: None,
                topic: envelope.event_type().to_string(),
                payload,
            }),
            Err(e) => tracing::warn!(error = %e, "failed to encode event for realtime"),
        }
    }

    /// Best-effort push; no subscribers is not an error.
    pub fn publish(&self, message: RealtimeMessage) {
        let _ = self.realtime_tx.send(message);
    }

    pub fn publish_to<T: Serialize>(&self, recipients: Vec<UserId>, topic: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(payload) => self.publish(RealtimeMessage {
                recipients: Some(recipients),
                topic: topic.to_string(),
                payload,
            }),
            Err(e) => tracing::warn!(error = %e, topic, "failed to encode realtime payload"),
        }
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }
}

/// SSE stream of realtime messages addressed to `user_id`.
///
/// Lagging subscribers skip what they missed.
pub fn user_sse_stream(
    services: Arc<AppServices>,
    user_id: UserId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.is_for(user_id) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_everyone_but_addressed_messages_do_not() {
        let alice = UserId::new();
        let bob = UserId::new();

        let everyone = RealtimeMessage {
            recipients: None,
            topic: "expo.booth.reserved".into(),
            payload: JsonValue::Null,
        };
        assert!(everyone.is_for(alice) && everyone.is_for(bob));

        let direct = RealtimeMessage {
            recipients: Some(vec![alice]),
            topic: "chat.message".into(),
            payload: JsonValue::Null,
        };
        assert!(direct.is_for(alice));
        assert!(!direct.is_for(bob));
    }
}
