use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use chrono::{Duration, NaiveDate};
use miny_api::{ApiState, app};
use miny_core::{
    clock::FixedClock,
    lifecycle::AppointmentService,
    mock::RecordingNotifier,
    store::InMemoryStore,
    validation::LifecycleConfig,
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct horse battery";

/// A server over the in-memory store, pinned to a fixed day.
pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub today: NaiveDate,
}

/// A registered and signed-in owner.
pub struct Owner {
    pub id: String,
    pub slug: String,
    pub token: String,
}

impl TestContext {
    pub fn new() -> Self {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::new(today));

        let service = AppointmentService::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            clock.clone(),
            LifecycleConfig::default(),
        );
        let state = Arc::new(ApiState {
            service,
            accounts: store.clone(),
            clock,
            session_ttl: Duration::hours(1),
            public_url: "https://miny.test".to_string(),
        });

        let server = TestServer::new(app(state)).unwrap();

        Self {
            server,
            store,
            notifier,
            today,
        }
    }

    pub fn day(&self, offset: i64) -> String {
        (self.today + Duration::days(offset)).to_string()
    }

    pub async fn register(&self, name: &str, email: &str) -> Value {
        self.server
            .post("/api/auth/register")
            .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
            .await
            .json::<Value>()
    }

    pub async fn login(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await;
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn owner(&self, name: &str, email: &str) -> Owner {
        let profile = self.register(name, email).await;
        let token = self.login(email).await;
        Owner {
            id: profile["id"].as_str().unwrap().to_string(),
            slug: profile["slug"].as_str().unwrap().to_string(),
            token,
        }
    }

    /// Creates appointments from a JSON form and returns the created list.
    pub async fn create(&self, owner: &Owner, form: Value) -> Vec<Value> {
        let (name, value) = bearer(&owner.token);
        self.server
            .post("/api/appointments")
            .add_header(name, value)
            .json(&form)
            .await
            .json::<Vec<Value>>()
    }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
