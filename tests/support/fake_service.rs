// ABOUTME: In-memory DeploymentService for pipeline tests.
// ABOUTME: Scripts per-key upload failures and records every upload and publish.

use async_trait::async_trait;
use parking_lot::Mutex;
use stagepush::service::{DeploymentService, ServiceError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

pub const SITE: &str = "https://site.test";

#[derive(Default)]
struct State {
    /// Remaining scripted failures per key. `usize::MAX` fails forever.
    failures: HashMap<String, usize>,
    fail_all: bool,
    panics: HashSet<String>,
    attempts: HashMap<String, usize>,
    uploaded: HashMap<String, usize>,
    stage_index: Option<String>,
    fetch_fails: bool,
    publish_fails: bool,
    published: Vec<(String, bool)>,
    in_flight: usize,
    peak_in_flight: usize,
}

pub struct FakeService {
    app: String,
    delay: Duration,
    state: Mutex<State>,
}

impl FakeService {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            delay: Duration::from_millis(5),
            state: Mutex::new(State::default()),
        }
    }

    /// Fail the next `times` uploads of `key`.
    pub fn fail_key(self, key: &str, times: usize) -> Self {
        self.state.lock().failures.insert(key.to_string(), times);
        self
    }

    /// Panic inside the next upload of `key`.
    pub fn panic_once(self, key: &str) -> Self {
        self.state.lock().panics.insert(key.to_string());
        self
    }

    pub fn fail_all_uploads(self) -> Self {
        self.state.lock().fail_all = true;
        self
    }

    pub fn with_stage_index(self, document: &str) -> Self {
        self.state.lock().stage_index = Some(document.to_string());
        self
    }

    pub fn fail_fetch(self) -> Self {
        self.state.lock().fetch_fails = true;
        self
    }

    pub fn fail_publish(self) -> Self {
        self.state.lock().publish_fails = true;
        self
    }

    /// Stop failing uploads of `key`.
    pub fn heal(&self, key: &str) {
        self.state.lock().failures.remove(key);
    }

    pub fn attempts(&self, key: &str) -> usize {
        self.state.lock().attempts.get(key).copied().unwrap_or(0)
    }

    pub fn successful_uploads(&self, key: &str) -> usize {
        self.state.lock().uploaded.get(key).copied().unwrap_or(0)
    }

    pub fn total_successful_uploads(&self) -> usize {
        self.state.lock().uploaded.values().sum()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state.lock().uploaded.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Published documents with their update_route flag, oldest first.
    pub fn published(&self) -> Vec<(String, bool)> {
        self.state.lock().published.clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.lock().peak_in_flight
    }

    fn should_fail(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        if state.fail_all {
            return true;
        }
        match state.failures.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining = remaining.saturating_sub(1);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DeploymentService for FakeService {
    async fn put_file(
        &self,
        _version: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), ServiceError> {
        let panic_now = {
            let mut state = self.state.lock();
            *state.attempts.entry(key.to_string()).or_default() += 1;
            state.panics.remove(key)
        };
        if panic_now {
            panic!("storage client crashed on {key}");
        }

        {
            let mut state = self.state.lock();
            state.in_flight += 1;
            state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
        }

        tokio::time::sleep(self.delay).await;
        let fail = self.should_fail(key) || !local_path.is_file();

        let mut state = self.state.lock();
        state.in_flight -= 1;
        if fail {
            return Err(ServiceError::Status {
                status: 503,
                body: format!("could not store {key}"),
            });
        }
        *state.uploaded.entry(key.to_string()).or_default() += 1;
        Ok(())
    }

    async fn put_stage_index(
        &self,
        document: &str,
        update_route: bool,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        if state.publish_fails {
            return Err(ServiceError::Status {
                status: 500,
                body: "index write failed".to_string(),
            });
        }
        state.stage_index = Some(document.to_string());
        state.published.push((document.to_string(), update_route));
        Ok(())
    }

    async fn fetch_stage_index(&self) -> Result<Option<String>, ServiceError> {
        let state = self.state.lock();
        if state.fetch_fails {
            return Err(ServiceError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(state.stage_index.clone())
    }

    fn stage_index_url(&self) -> String {
        format!("{SITE}/_{}/index.html", self.app)
    }

    fn stage_url(&self, version: &str) -> String {
        format!("{SITE}/_{}/{version}/", self.app)
    }
}
