#[cfg(test)]
pub mod test_utils {
    use crate::auth::{TokenTableVerifier, issue_token};
    use crate::router::create_router;
    use crate::schemas::{AppState, Clock};
    use async_trait::async_trait;
    use axum::Router;
    use chrono::{NaiveDate, NaiveDateTime};
    use compute::{
        DispatchError, MulticastMessage, MulticastReport, PushDispatcher, SeaOrmSource,
        TokenOutcome,
    };
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Secret the test scheduler authenticates with.
    pub const CRON_SECRET: &str = "test-cron-secret";

    /// 2024-03-10 08:00, the instant every test app is frozen at.
    pub fn test_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Dispatcher that accepts every message and keeps it for inspection.
    #[derive(Debug, Default)]
    pub struct RecordingDispatcher {
        sent: Mutex<Vec<MulticastMessage>>,
    }

    impl RecordingDispatcher {
        pub fn sent(&self) -> Vec<MulticastMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushDispatcher for RecordingDispatcher {
        async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastReport, DispatchError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(MulticastReport {
                responses: message.tokens.iter().map(TokenOutcome::delivered).collect(),
            })
        }
    }

    /// Everything a test needs to drive and observe the app.
    pub struct TestApp {
        pub router: Router,
        pub db: DatabaseConnection,
        pub dispatcher: Arc<RecordingDispatcher>,
        /// Keeps the test subscriber installed while the app is alive.
        _tracing: tracing::subscriber::DefaultGuard,
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> (AppState, Arc<RecordingDispatcher>) {
        let db = setup_test_db().await;
        let dispatcher = Arc::new(RecordingDispatcher::default());

        let state = AppState {
            source: Arc::new(SeaOrmSource::new(db.clone())),
            verifier: Arc::new(TokenTableVerifier::new(db.clone(), Duration::from_secs(60))),
            dispatcher: dispatcher.clone(),
            cron_secret: Some(CRON_SECRET.to_string()),
            clock: Clock::Fixed(test_now()),
            db,
        };
        (state, dispatcher)
    }

    /// Creates a user and returns its id with a valid identity token.
    pub async fn create_user_with_token(db: &DatabaseConnection, username: &str) -> (i32, String) {
        let user = model::entities::user::ActiveModel {
            username: Set(username.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create test user");

        let token = issue_token(db, user.id)
            .await
            .expect("Failed to issue test token");
        (user.id, token)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG and defaults to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> TestApp {
        let tracing_guard = init_test_tracing();

        let (state, dispatcher) = setup_test_app_state().await;
        let db = state.db.clone();
        TestApp {
            router: create_router(state),
            db,
            dispatcher,
            _tracing: tracing_guard,
        }
    }
}
