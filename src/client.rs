use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::protocol::{self, AuthResponse, UpdateResponse};
use crate::store::SnapshotStore;
use crate::types::*;
use crate::view::{update_views, ThermostatView};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://mythermostat.info";

/// Setpoint band the vendor app offers. The mutators reject anything
/// outside it before touching the network.
pub const MIN_SETPOINT: Temperature = Temperature::from_centidegrees(500);
pub const MAX_SETPOINT: Temperature = Temperature::from_centidegrees(2500);

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate gate in front of the snapshot fetch. Commands deposit into the
/// budget; budget-funded fetches skip the cadence check entirely and do not
/// stamp the attempt time, so they never push back the regular poll.
struct PollGate {
    interval: Duration,
    last_attempt: Option<Instant>,
    budget: u32,
}

impl PollGate {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
            budget: 0,
        }
    }

    fn should_fetch(&mut self) -> bool {
        if self.budget > 0 {
            self.budget -= 1;
            return true;
        }

        let now = Instant::now();
        if let Some(last) = self.last_attempt
            && now.duration_since(last) <= self.interval
        {
            return false;
        }

        self.last_attempt = Some(now);
        true
    }

    fn grant(&mut self) {
        self.budget += 1;
    }
}

/// Whether `refresh()` actually went to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Fetched,
    Skipped,
}

enum UpdateAttempt {
    Accepted,
    HttpRejected(reqwest::Error),
    /// 2xx with `Success: false` in the body.
    Refused,
}

pub struct Uwg4ClientBuilder {
    email: String,
    password: String,
    base_url: String,
    poll_interval: Duration,
    comfort_hold_minutes: i64,
    request_timeout: Duration,
    snapshot_file: Option<PathBuf>,
}

impl Uwg4ClientBuilder {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            comfort_hold_minutes: protocol::COMFORT_DURATION_MIN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            snapshot_file: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn comfort_hold_minutes(mut self, minutes: i64) -> Self {
        self.comfort_hold_minutes = minutes;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Mirror every validated snapshot to this file, verbatim.
    pub fn snapshot_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_file = Some(path.into());
        self
    }

    pub fn build(self) -> Uwg4Client {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .expect("failed to build HTTP client");

        Uwg4Client {
            http,
            base_url: self.base_url,
            email: self.email,
            password: self.password,
            session_id: None,
            gate: PollGate::new(self.poll_interval),
            comfort_hold_minutes: self.comfort_hold_minutes,
            store: self.snapshot_file.map(SnapshotStore::new),
            raw_snapshot: None,
            snapshot: None,
            views: Vec::new(),
        }
    }
}

pub struct Uwg4Client {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    session_id: Option<String>,
    gate: PollGate,
    comfort_hold_minutes: i64,
    store: Option<SnapshotStore>,
    raw_snapshot: Option<Value>,
    snapshot: Option<Snapshot>,
    views: Vec<ThermostatView>,
}

impl Uwg4Client {
    pub fn builder(email: impl Into<String>, password: impl Into<String>) -> Uwg4ClientBuilder {
        Uwg4ClientBuilder::new(email, password)
    }

    /// Authenticates and stores the session token. Called lazily by the
    /// other operations, so hosts only need it for an eager credential
    /// check. On failure any previously held token is left in place.
    pub async fn login(&mut self) -> Result<()> {
        let url = format!("{}/api/authenticate/user", self.base_url);
        debug!(url = %url, "authenticating");

        let body = protocol::authenticate_body(&self.email, &self.password);
        let text = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let resp: AuthResponse = serde_json::from_str(&text)?;

        if resp.error_code != 0 {
            return Err(Error::Login {
                code: resp.error_code,
            });
        }

        self.session_id = Some(resp.session_id);
        info!("authenticated to {}", self.base_url);
        Ok(())
    }

    /// Polls the vendor for a fresh account snapshot, unless the rate gate
    /// says the cached one is still current. A failed fetch keeps the
    /// previous snapshot and views.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        if !self.gate.should_fetch() {
            debug!("refresh throttled, serving cached state");
            return Ok(RefreshOutcome::Skipped);
        }

        let body = self.fetch_snapshot_body().await?;
        let raw: Value = serde_json::from_str(&body)?;
        let snapshot: Snapshot = serde_json::from_value(raw.clone())?;
        if !snapshot.has_thermostats() {
            error!("account snapshot contained no thermostats, keeping previous state");
            return Err(Error::NoThermostats);
        }

        if let Some(ref store) = self.store {
            store.record(&body);
        }

        update_views(&mut self.views, &snapshot);
        self.raw_snapshot = Some(raw);
        self.snapshot = Some(snapshot);
        Ok(RefreshOutcome::Fetched)
    }

    pub fn views(&self) -> &[ThermostatView] {
        &self.views
    }

    pub fn view(&self, serial: &str) -> Option<&ThermostatView> {
        self.views.iter().find(|v| v.serial_number == serial)
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// The last snapshot exactly as the vendor sent it, for hosts that
    /// want fields the typed records do not carry.
    pub fn raw_snapshot(&self) -> Option<&Value> {
        self.raw_snapshot.as_ref()
    }

    // -- Command methods --

    /// Puts a thermostat into the given regulation mode with the given
    /// target. AUTO ignores the target (the schedule owns its setpoints).
    /// Every outcome grants the next `refresh()` one pass through the rate
    /// gate so the host sees the result promptly.
    pub async fn set_regulation_mode(
        &mut self,
        serial: &str,
        mode: RegulationMode,
        target: Temperature,
    ) -> Result<()> {
        let body = match mode {
            RegulationMode::Auto => protocol::auto_body(),
            RegulationMode::Comfort => {
                protocol::comfort_body(target, Utc::now(), self.comfort_hold_minutes)
            }
            RegulationMode::Manual => protocol::manual_body(target),
            RegulationMode::Vacation => protocol::vacation_body(target),
        };
        self.send_update(serial, body).await
    }

    /// Changes a device's target temperature. A device following its
    /// schedule is switched to a temporary comfort hold; any other mode is
    /// re-sent unchanged with the new target. The cached view's target is
    /// updated in place; its mode is left to the next poll.
    pub async fn set_target_temperature(
        &mut self,
        serial: &str,
        target: Temperature,
    ) -> Result<()> {
        if target < MIN_SETPOINT || target > MAX_SETPOINT {
            return Err(Error::SetpointOutOfRange(target));
        }

        let mode = match self.find_view(serial)?.regulation_mode {
            RegulationMode::Auto => RegulationMode::Comfort,
            other => other,
        };
        self.set_regulation_mode(serial, mode, target).await?;

        if let Some(view) = self.views.iter_mut().find(|v| v.serial_number == serial) {
            view.target = target;
        }
        Ok(())
    }

    /// Switches a device to a new regulation mode, re-sending its current
    /// target temperature. The cached view's mode is updated in place.
    pub async fn set_preset(&mut self, serial: &str, mode: RegulationMode) -> Result<()> {
        let target = self.find_view(serial)?.target;
        self.set_regulation_mode(serial, mode, target).await?;

        if let Some(view) = self.views.iter_mut().find(|v| v.serial_number == serial) {
            view.regulation_mode = mode;
        }
        Ok(())
    }

    // -- Helpers --

    fn find_view(&self, serial: &str) -> Result<&ThermostatView> {
        self.views
            .iter()
            .find(|v| v.serial_number == serial)
            .ok_or_else(|| Error::UnknownThermostat(serial.to_string()))
    }

    /// GET the account snapshot, re-authenticating once if no session is
    /// held or the vendor rejects the one we have.
    async fn fetch_snapshot_body(&mut self) -> Result<String> {
        if let Some(session) = self.session_id.clone() {
            let resp = self.get_thermostats(&session).await?;
            if resp.status().is_success() {
                return Ok(resp.text().await?);
            }
            debug!(status = %resp.status(), "snapshot request rejected, re-authenticating");
        } else {
            debug!("no session yet, authenticating before first snapshot");
        }

        self.relogin().await;

        let session = self.session_id.clone().ok_or(Error::NotAuthenticated)?;
        let resp = self.get_thermostats(&session).await?;
        match resp.error_for_status() {
            Ok(resp) => Ok(resp.text().await?),
            Err(e) => {
                error!("snapshot request failed after re-authentication: {e}");
                Err(e.into())
            }
        }
    }

    async fn get_thermostats(&self, session: &str) -> Result<reqwest::Response> {
        let url = format!("{}/api/thermostats", self.base_url);
        debug!(url = %url, "fetching account snapshot");
        let resp = self
            .http
            .get(&url)
            .query(&[("sessionid", session)])
            .send()
            .await?;
        Ok(resp)
    }

    async fn send_update(&mut self, serial: &str, body: Value) -> Result<()> {
        let result = self.send_update_inner(serial, &body).await;
        // The host will want to see the outcome on its next poll.
        self.gate.grant();
        result
    }

    async fn send_update_inner(&mut self, serial: &str, body: &Value) -> Result<()> {
        if let Some(session) = self.session_id.clone() {
            match self.post_update(&session, serial, body).await? {
                UpdateAttempt::Accepted => return Ok(()),
                UpdateAttempt::HttpRejected(e) => {
                    debug!(serial = %serial, "thermostat update rejected ({e}), re-authenticating");
                }
                UpdateAttempt::Refused => {
                    debug!(serial = %serial, "vendor refused thermostat update, re-authenticating");
                }
            }
        } else {
            debug!("no session yet, authenticating before update");
        }

        self.relogin().await;

        let session = self.session_id.clone().ok_or(Error::NotAuthenticated)?;
        match self.post_update(&session, serial, body).await? {
            UpdateAttempt::Accepted => Ok(()),
            UpdateAttempt::HttpRejected(e) => {
                error!(serial = %serial, "thermostat update failed after re-authentication: {e}");
                Err(e.into())
            }
            UpdateAttempt::Refused => {
                error!(serial = %serial, "vendor refused thermostat update after re-authentication");
                Err(Error::CommandRejected)
            }
        }
    }

    async fn post_update(&self, session: &str, serial: &str, body: &Value) -> Result<UpdateAttempt> {
        let url = format!("{}/api/thermostat", self.base_url);
        debug!(url = %url, serial = %serial, "sending thermostat update");
        let resp = self
            .http
            .post(&url)
            .query(&[("sessionid", session), ("serialnumber", serial)])
            .json(body)
            .send()
            .await?;

        match resp.error_for_status() {
            Err(e) => Ok(UpdateAttempt::HttpRejected(e)),
            Ok(resp) => {
                let text = resp.text().await?;
                let parsed: UpdateResponse = serde_json::from_str(&text)?;
                if parsed.success {
                    Ok(UpdateAttempt::Accepted)
                } else {
                    Ok(UpdateAttempt::Refused)
                }
            }
        }
    }

    /// Re-authentication is best-effort: a failure here is logged and the
    /// retry proceeds with whatever token is still held.
    async fn relogin(&mut self) {
        if let Err(e) = self.login().await {
            error!("re-authentication failed: {e}");
        }
    }
}
