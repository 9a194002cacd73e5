pub mod error;
pub mod evaluate;
pub mod events;
pub mod session;
pub mod state;

use log::{debug, info};
use serde_json::json;
use uuid::Uuid;

use crate::catalog::{Catalog, EndpointCheck};
use crate::client::{ApiRequest, ApiTransport, HttpMethod};
use crate::utils::config::RoleCredential;

pub use error::CheckError;
pub use events::{ConsoleEventListener, EventEmitter, EventListener, RunEvent};
pub use session::{SessionState, SessionStore};
pub use state::{TestReport, TestResult, TestSummary};

/// Conformance runner: logs every role in, runs the catalog against each
/// logged-in role and keeps an append-only log of results.
///
/// Execution is strictly sequential; a check's outcome is always recorded and
/// never aborts the run.
pub struct Runner {
    transport: Box<dyn ApiTransport>,
    roles: Vec<RoleCredential>,
    catalog: Catalog,
    sessions: SessionStore,
    results: Vec<TestResult>,
    emitter: EventEmitter,
    session_id: String,
    started_at: Option<String>,
    finished_at: Option<String>,
}

impl Runner {
    pub fn new(
        transport: Box<dyn ApiTransport>,
        roles: Vec<RoleCredential>,
        catalog: Catalog,
    ) -> Self {
        Self {
            transport,
            roles,
            catalog,
            sessions: SessionStore::new(),
            results: Vec::new(),
            emitter: EventEmitter::new(),
            session_id: Uuid::new_v4().to_string(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Register a listener for run events
    pub fn with_listener(mut self, listener: impl EventListener + 'static) -> Self {
        self.emitter.add_listener(Box::new(listener));
        self
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Authenticate `role`. Stores the token and records a pass, or records
    /// a failure; returns whether the role is now logged in.
    pub async fn login(&mut self, role: &str) -> bool {
        let name = self.catalog.login.result_name(role);
        let area = self.catalog.login.title.clone();

        let cred = self.roles.iter().find(|c| c.role == role).cloned();
        let cred = match cred {
            Some(cred) => cred,
            None => {
                self.record_error(&area, &name, role, CheckError::UnknownRole(role.to_string()));
                return false;
            }
        };

        let request = ApiRequest::new(HttpMethod::Post, &self.catalog.login.path).with_body(
            json!({
                "email": cred.email,
                "password": cred.password,
            }),
        );

        self.emitter.emit(RunEvent::CheckStarted {
            name: name.clone(),
            request: request.describe(),
        });

        let evaluated = match self.transport.send(&request).await {
            Ok(response) => evaluate::evaluate_login(&self.catalog.login, role, &response),
            Err(e) => Err(CheckError::from(e)),
        };

        match evaluated {
            Ok(login) => {
                info!("logged in as {}", role);
                self.sessions.log_in(role, login.token);
                let outcome = login.outcome;
                self.record(&area, &name, role, true, outcome.message, outcome.details);
                true
            }
            Err(e) => {
                self.record_error(&area, &name, role, e);
                false
            }
        }
    }

    /// Run one endpoint check as `role`. Without a stored token the check is
    /// recorded as failed and no request is made.
    pub async fn check(&mut self, role: &str, check: &EndpointCheck) -> bool {
        let name = check.result_name(role);

        let token = self.sessions.token(role).map(str::to_string);
        let token = match token {
            Some(token) => token,
            None => {
                debug!("skipping {}: {} is not logged in", name, role);
                self.record_error(&check.area, &name, role, CheckError::MissingToken);
                return false;
            }
        };

        let mut request = ApiRequest::new(check.method, &check.path).with_bearer(&token);
        if let Some(body) = &check.body {
            request = request.with_body(body.clone());
        }

        self.emitter.emit(RunEvent::CheckStarted {
            name: name.clone(),
            request: request.describe(),
        });

        let evaluated = match self.transport.send(&request).await {
            Ok(response) => evaluate::evaluate_check(check, role, &response),
            Err(e) => Err(CheckError::from(e)),
        };

        match evaluated {
            Ok(outcome) => {
                self.record(&check.area, &name, role, true, outcome.message, outcome.details);
                true
            }
            Err(e) => {
                self.record_error(&check.area, &name, role, e);
                false
            }
        }
    }

    /// Log every role in, then run each area for every role, in catalog order
    pub async fn run_all(&mut self) {
        let started_at = chrono::Local::now().to_rfc3339();
        self.started_at = Some(started_at.clone());
        self.emitter.emit(RunEvent::RunStarted {
            session_id: self.session_id.clone(),
            title: self.catalog.title.clone(),
            base_url: self.transport.base_url().to_string(),
            started_at,
        });

        let roles: Vec<String> = self.roles.iter().map(|c| c.role.clone()).collect();

        self.emitter.emit(RunEvent::AreaStarted {
            banner: self.catalog.login.banner(),
        });
        for role in &roles {
            self.login(role).await;
        }
        self.emitter.emit(RunEvent::AreaFinished);

        let areas = self.catalog.areas.clone();
        for area in &areas {
            self.emitter.emit(RunEvent::AreaStarted {
                banner: area.banner(),
            });
            for role in &roles {
                for check in &area.checks {
                    self.check(role, check).await;
                }
            }
            self.emitter.emit(RunEvent::AreaFinished);
        }
    }

    /// Close the run and report; returns (passed, failed)
    pub fn summarize(&mut self) -> (usize, usize) {
        let finished_at = chrono::Local::now().to_rfc3339();
        self.finished_at = Some(finished_at.clone());

        let summary = TestSummary::from_results(&self.results);
        let failures = self.results.iter().filter(|r| !r.success).cloned().collect();
        self.emitter.emit(RunEvent::RunFinished {
            summary,
            failures,
            finished_at,
        });

        (summary.passed, summary.failed)
    }

    /// Snapshot of the run for persisted reports
    pub fn report(&self) -> TestReport {
        TestReport {
            session_id: self.session_id.clone(),
            title: self.catalog.title.clone(),
            base_url: self.transport.base_url().to_string(),
            started_at: self.started_at.clone(),
            finished_at: self.finished_at.clone(),
            results: self.results.clone(),
            summary: TestSummary::from_results(&self.results),
        }
    }

    fn record_error(&mut self, area: &str, name: &str, role: &str, error: CheckError) {
        self.record(area, name, role, false, error.message(), error.details());
    }

    fn record(
        &mut self,
        area: &str,
        name: &str,
        role: &str,
        success: bool,
        message: String,
        details: Option<String>,
    ) {
        let result = TestResult::new(name, area, role, success, message, details);
        self.results.push(result.clone());
        self.emitter.emit(RunEvent::ResultRecorded(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiResponse, TransportError};
    use crate::utils::config::Config;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

    /// Scripted in-memory backend that remembers every request it saw
    struct ScriptedTransport {
        handler: Box<Handler>,
        seen: Arc<Mutex<Vec<ApiRequest>>>,
    }

    #[async_trait]
    impl ApiTransport for ScriptedTransport {
        fn base_url(&self) -> &str {
            "http://scripted/api"
        }

        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            (self.handler)(request)
        }
    }

    fn runner_with<F>(handler: F) -> (Runner, Arc<Mutex<Vec<ApiRequest>>>)
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = ScriptedTransport {
            handler: Box::new(handler),
            seen: seen.clone(),
        };
        let runner = Runner::new(
            Box::new(transport),
            Config::default().roles,
            Catalog::builtin().unwrap(),
        );
        (runner, seen)
    }

    /// Healthy backend; the customer's login is rejected
    fn backend(request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        if request.path == "/auth/login" {
            let email = request.body.as_ref().unwrap()["email"].as_str().unwrap();
            let role = match email {
                "admin@smartrep.dk" => "admin",
                "tekniker@smartrep.dk" => "technician",
                _ => return Ok(ApiResponse::new(401, r#"{"error":"Invalid credentials"}"#)),
            };
            let body = json!({
                "token": format!("{}-token", role),
                "user": {"name": role, "role": role, "email": email},
            });
            return Ok(ApiResponse::new(200, body.to_string()));
        }

        let token = request.bearer.as_deref().unwrap_or_default();
        let body = match (request.method, request.path.as_str()) {
            (_, "/companies") if token != "admin-token" => return Ok(ApiResponse::new(401, "")),
            (HttpMethod::Post, "/photoreports") => {
                json!({"id": "pr-1", "status": "draft", "createdByName": "x"})
            }
            (_, "/auth/me") | (_, "/tasks/counts") | (_, "/options") | (_, "/dashboard") => {
                json!({"id": 1, "total": 3})
            }
            _ => json!([{"id": "a", "name": "first"}]),
        };
        Ok(ApiResponse::new(200, body.to_string()))
    }

    #[tokio::test]
    async fn test_login_success_stores_token() {
        let (mut runner, _) = runner_with(backend);

        assert!(runner.login("admin").await);
        assert_eq!(runner.sessions().token("admin"), Some("admin-token"));

        let result = &runner.results()[0];
        assert!(result.success);
        assert_eq!(result.test, "Login (admin)");
        assert_eq!(result.message, "Successfully logged in as admin");
    }

    #[tokio::test]
    async fn test_login_failure_records_without_token() {
        let (mut runner, _) = runner_with(backend);

        assert!(!runner.login("customer").await);
        assert_eq!(runner.sessions().state("customer"), SessionState::NotLoggedIn);

        let result = &runner.results()[0];
        assert!(!result.success);
        assert_eq!(result.message, "HTTP 401");
    }

    #[tokio::test]
    async fn test_login_unknown_role() {
        let (mut runner, seen) = runner_with(backend);

        assert!(!runner.login("auditor").await);
        assert_eq!(runner.results()[0].message, "No credentials configured");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_without_token_makes_no_request() {
        let (mut runner, seen) = runner_with(backend);
        let catalog = Catalog::builtin().unwrap();

        for check in catalog.areas.iter().flat_map(|a| a.checks.iter()) {
            assert!(!runner.check("customer", check).await);
        }

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(runner.results().len(), catalog.check_count());
        for result in runner.results() {
            assert!(!result.success);
            assert_eq!(result.message, "No token available");
            assert_eq!(result.details.as_deref(), Some("Login first"));
        }
    }

    #[tokio::test]
    async fn test_check_sends_bearer_and_body() {
        let (mut runner, seen) = runner_with(backend);
        let post = Catalog::builtin()
            .unwrap()
            .find_check("Photo Reports POST")
            .unwrap()
            .clone();

        runner.login("technician").await;
        assert!(runner.check("technician", &post).await);

        let seen = seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.method, HttpMethod::Post);
        assert_eq!(last.bearer.as_deref(), Some("technician-token"));
        assert_eq!(last.body.as_ref().unwrap()["companyId"], "test-company-id");
    }

    #[tokio::test]
    async fn test_direct_calls_record_their_own_area() {
        let (mut runner, _) = runner_with(backend);
        let catalog = Catalog::builtin().unwrap();

        runner.login("admin").await;
        runner
            .check("admin", catalog.find_check("Companies").unwrap())
            .await;
        runner
            .check("customer", catalog.find_check("Dashboard").unwrap())
            .await;

        let areas: Vec<&str> = runner.results().iter().map(|r| r.area.as_str()).collect();
        assert_eq!(
            areas,
            vec!["AUTHENTICATION TESTS", "COMPANIES TESTS", "DASHBOARD TESTS"]
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded() {
        let (mut runner, _) = runner_with(|request| {
            if request.path == "/auth/login" {
                Err(TransportError::Connect("connection refused".into()))
            } else {
                Ok(ApiResponse::new(200, "[]"))
            }
        });

        assert!(!runner.login("admin").await);
        let result = &runner.results()[0];
        assert_eq!(result.message, "Request failed");
        assert_eq!(
            result.details.as_deref(),
            Some("connection failed: connection refused")
        );
    }

    #[tokio::test]
    async fn test_run_all_order_and_summary() {
        let (mut runner, _) = runner_with(backend);
        runner.run_all().await;

        let names: Vec<&str> = runner.results().iter().map(|r| r.test.as_str()).collect();
        // 3 logins + 9 checks for each of 3 roles
        assert_eq!(names.len(), 30);
        assert_eq!(
            &names[..5],
            &[
                "Login (admin)",
                "Login (customer)",
                "Login (technician)",
                "Auth Me (admin)",
                "Auth Me (customer)",
            ]
        );
        assert_eq!(
            &names[6..12],
            &[
                "Tasks (admin)",
                "Task Counts (admin)",
                "Tasks (customer)",
                "Task Counts (customer)",
                "Tasks (technician)",
                "Task Counts (technician)",
            ]
        );

        let technician_companies = runner
            .results()
            .iter()
            .find(|r| r.test == "Companies (technician)")
            .unwrap();
        assert!(technician_companies.success);
        assert_eq!(technician_companies.area, "COMPANIES TESTS");

        // Customer login failed: 1 + 9 failures
        let (passed, failed) = runner.summarize();
        assert_eq!(failed, 10);
        assert_eq!(passed + failed, runner.results().len());

        let report = runner.report();
        assert_eq!(report.summary.failed, report.failures().count());
        assert!(report.finished_at.is_some());
    }
}
