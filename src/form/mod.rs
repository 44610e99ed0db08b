//! Form controller: binds the config and catalog to editable controls,
//! validates edits, saves, and gates the run lifecycle.
//!
//! A controller owns everything a page would otherwise keep in globals: the
//! config of record, the loaded catalog, the bound controls and at most one
//! active run. Rendering goes through the [`FormView`] seam.

pub mod draft;
pub mod schema;
pub mod tags;
pub mod validate;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, ConfigApi};
use crate::model::{Config, GroupBy, IpVersion, LocationCatalog};
use crate::results::ResultsView;
use crate::session::{self, Outcome, RunConnector, RunHandle, RunUpdate};

pub use draft::Draft;
pub use schema::{FieldId, FieldKind, FieldSpec, NumericField, FORM_SCHEMA};
pub use tags::TagSelector;
pub use validate::{validate, Verdict};

pub const LOAD_FAILED_ALERT: &str = "Failed to load the initial configuration; check the engine logs.";
pub const INVALID_ALERT: &str = "The configuration has invalid values; fix them and try again.";
pub const OVERWRITE_PROMPT: &str = "This overwrites the saved configuration file. Continue?";
pub const SAVED_ALERT: &str = "Configuration saved.";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to load initial data: {0}")]
    Load(#[source] ApiError),

    #[error("invalid configuration: {0}")]
    Validation(Verdict),

    #[error("failed to save configuration: {0}")]
    Save(#[source] ApiError),

    #[error("form has not been loaded")]
    NotLoaded,

    #[error("{0} is read-only")]
    ReadOnly(FieldId),

    #[error("{field} does not accept {value:?}")]
    InvalidChoice { field: FieldId, value: String },

    #[error("unknown field {0:?}")]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The user declined the overwrite confirmation.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStart {
    Started(Uuid),
    /// A session is still open; nothing was created.
    AlreadyRunning,
}

/// What a front-end must provide to host the form.
pub trait FormView {
    fn render_form(&mut self, form: &BoundForm);

    /// Replace all inline error annotations with `verdict`'s.
    fn show_field_errors(&mut self, verdict: &Verdict);

    /// Blocking, user-visible message.
    fn alert(&mut self, message: &str);

    fn confirm(&mut self, message: &str) -> bool;

    fn set_run_enabled(&mut self, enabled: bool);

    /// Clear the log panel and hide previous results.
    fn clear_run_output(&mut self);

    fn append_log(&mut self, line: &str);

    fn show_results(&mut self, results: &ResultsView);
}

/// The form's controls: raw numeric inputs, selects, and two tag selectors.
#[derive(Debug, Clone)]
pub struct BoundForm {
    inputs: BTreeMap<NumericField, String>,
    ip_version: IpVersion,
    group_by: GroupBy,
    regions: TagSelector,
    colos: TagSelector,
}

impl BoundForm {
    fn bind(config: &Config, catalog: &LocationCatalog) -> Self {
        let draft = Draft::from(config);
        Self {
            inputs: draft.inputs,
            ip_version: config.ip_version,
            group_by: config.group_by,
            regions: TagSelector::new(&catalog.regions, config.filter_regions.clone()),
            colos: TagSelector::new(&catalog.colos, config.filter_colos.clone()),
        }
    }

    pub fn input(&self, field: NumericField) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn regions(&self) -> &TagSelector {
        &self.regions
    }

    pub fn colos(&self) -> &TagSelector {
        &self.colos
    }

    /// Current control values as a candidate.
    pub fn draft(&self) -> Draft {
        Draft {
            inputs: self.inputs.clone(),
            ip_version: self.ip_version,
            group_by: self.group_by,
            filter_regions: self.regions.get_selected(),
            filter_colos: self.colos.get_selected(),
        }
    }
}

/// Backends and timing a controller needs.
pub struct Backends {
    pub api: Arc<dyn ConfigApi>,
    pub connector: Arc<dyn RunConnector>,
    pub open_timeout: Duration,
}

pub struct FormController<V: FormView> {
    api: Arc<dyn ConfigApi>,
    connector: Arc<dyn RunConnector>,
    open_timeout: Duration,
    view: V,
    record: Option<Config>,
    catalog: Option<LocationCatalog>,
    form: Option<BoundForm>,
    active_run: Option<RunHandle>,
    log: Vec<String>,
    results: Option<ResultsView>,
    run_enabled: bool,
}

impl<V: FormView> FormController<V> {
    pub fn new(backends: Backends, view: V) -> Self {
        Self {
            api: backends.api,
            connector: backends.connector,
            open_timeout: backends.open_timeout,
            view,
            record: None,
            catalog: None,
            form: None,
            active_run: None,
            log: Vec::new(),
            results: None,
            run_enabled: false,
        }
    }

    // -- Load / render --------------------------------------------------------

    /// Fetch the config and the catalog concurrently; render only if both arrive.
    pub async fn load_initial_data(&mut self) -> Result<(), FormError> {
        let fetched = tokio::try_join!(self.api.fetch_config(), self.api.fetch_locations());
        match fetched {
            Ok((config, catalog)) => {
                info!(
                    regions = catalog.regions.len(),
                    colos = catalog.colos.len(),
                    "initial data loaded"
                );
                self.render(config, catalog);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "initial load failed");
                self.view.alert(LOAD_FAILED_ALERT);
                Err(FormError::Load(e))
            }
        }
    }

    /// Bind controls to `config` and `catalog` and draw them.
    pub fn render(&mut self, config: Config, catalog: LocationCatalog) {
        let (regions, colos) = catalog.unknown_keys(&config.filter_regions, &config.filter_colos);
        if !regions.is_empty() || !colos.is_empty() {
            warn!(?regions, ?colos, "selected filters are not in the location catalog");
        }

        let form = BoundForm::bind(&config, &catalog);
        self.view.render_form(&form);
        self.form = Some(form);
        self.record = Some(config);
        self.catalog = Some(catalog);
        if self.active_run.is_none() {
            self.set_run_enabled(true);
        }
    }

    /// Read every control into a fresh config. Stored state is untouched.
    pub fn collect_snapshot(&self) -> Result<Config, FormError> {
        Ok(self.bound()?.draft().to_config())
    }

    // -- Edits ----------------------------------------------------------------

    /// Apply one edit from its textual form. Numeric edits are revalidated and
    /// annotated immediately.
    pub fn set_field(&mut self, field: FieldId, raw: &str) -> Result<(), FormError> {
        let form = self.form.as_mut().ok_or(FormError::NotLoaded)?;
        let invalid = || FormError::InvalidChoice {
            field,
            value: raw.to_string(),
        };
        match field {
            FieldId::Numeric(n) if !n.is_editable() => return Err(FormError::ReadOnly(field)),
            FieldId::Numeric(n) => {
                form.inputs.insert(n, raw.to_string());
                debug!(field = %n, value = raw, "field changed");
                let draft = form.draft();
                self.annotate(&draft);
            }
            FieldId::IpVersion => form.ip_version = IpVersion::parse(raw).ok_or_else(invalid)?,
            FieldId::GroupBy => form.group_by = GroupBy::parse(raw).ok_or_else(invalid)?,
            FieldId::FilterRegions => {
                form.regions.toggle(raw);
            }
            FieldId::FilterColos => {
                form.colos.toggle(raw);
            }
        }
        Ok(())
    }

    /// Same as [`set_field`](Self::set_field), addressed by wire key.
    pub fn set_field_by_key(&mut self, key: &str, raw: &str) -> Result<(), FormError> {
        let field = FieldId::from_key(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        self.set_field(field, raw)
    }

    /// Returns whether `key` is now selected.
    pub fn toggle_region(&mut self, key: &str) -> Result<bool, FormError> {
        let form = self.form.as_mut().ok_or(FormError::NotLoaded)?;
        Ok(form.regions.toggle(key))
    }

    pub fn toggle_colo(&mut self, key: &str) -> Result<bool, FormError> {
        let form = self.form.as_mut().ok_or(FormError::NotLoaded)?;
        Ok(form.colos.toggle(key))
    }

    fn annotate(&mut self, draft: &Draft) -> Verdict {
        let verdict = validate(draft);
        self.view.show_field_errors(&verdict);
        verdict
    }

    /// Validate the controls and refresh inline annotations.
    pub fn validate_form(&mut self) -> Result<Verdict, FormError> {
        let draft = self.bound()?.draft();
        Ok(self.annotate(&draft))
    }

    fn validated_snapshot(&mut self) -> Result<Config, FormError> {
        let verdict = self.validate_form()?;
        if !verdict.is_valid() {
            info!(%verdict, "configuration rejected by validation");
            self.view.alert(INVALID_ALERT);
            return Err(FormError::Validation(verdict));
        }
        self.collect_snapshot()
    }

    // -- Save -----------------------------------------------------------------

    /// Validate, confirm, and save. Only a successful save replaces the config
    /// of record.
    pub async fn save(&mut self) -> Result<SaveOutcome, FormError> {
        let snapshot = self.validated_snapshot()?;
        if !self.view.confirm(OVERWRITE_PROMPT) {
            debug!("save cancelled");
            return Ok(SaveOutcome::Cancelled);
        }
        match self.api.save_config(&snapshot).await {
            Ok(()) => {
                self.record = Some(snapshot);
                self.view.alert(SAVED_ALERT);
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.view.alert(&format!("Failed to save configuration: {}", e));
                Err(FormError::Save(e))
            }
        }
    }

    // -- Run ------------------------------------------------------------------

    /// Start a run with the current controls. No effect while a session is open.
    pub fn run(&mut self) -> Result<RunStart, FormError> {
        if self.active_run.is_some() {
            debug!("run ignored: a session is still open");
            return Ok(RunStart::AlreadyRunning);
        }
        let snapshot = self.validated_snapshot()?;

        self.set_run_enabled(false);
        self.log.clear();
        self.results = None;
        self.view.clear_run_output();

        let handle = session::driver::spawn(self.connector.clone(), &snapshot, self.open_timeout);
        let id = handle.id();
        info!(session_id = %id, "run started");
        self.active_run = Some(handle);
        Ok(RunStart::Started(id))
    }

    /// Wait for and apply the next update of the active run.
    ///
    /// Returns `None` when no run is active.
    pub async fn next_run_update(&mut self) -> Option<RunUpdate> {
        let handle = self.active_run.as_mut()?;
        // A driver that exits without a terminal update still ends the run.
        let update = handle
            .next_update()
            .await
            .unwrap_or(RunUpdate::Finished(Outcome::Error));

        match &update {
            RunUpdate::Log(line) => {
                self.log.push(line.clone());
                self.view.append_log(line);
            }
            RunUpdate::Results(rows) => {
                let results = ResultsView::render(rows);
                self.view.show_results(&results);
                self.results = Some(results);
            }
            RunUpdate::Finished(outcome) => {
                info!(?outcome, "run finished");
                self.active_run = None;
                self.set_run_enabled(true);
            }
        }
        Some(update)
    }

    /// Apply updates until the active run finishes.
    pub async fn wait_for_run(&mut self) -> Option<Outcome> {
        while let Some(update) = self.next_run_update().await {
            if let RunUpdate::Finished(outcome) = update {
                return Some(outcome);
            }
        }
        None
    }

    /// Close the active run's connection from the client side.
    pub fn stop_run(&mut self) {
        if let Some(handle) = self.active_run.as_mut() {
            handle.stop();
        }
    }

    // -- Accessors ------------------------------------------------------------

    fn bound(&self) -> Result<&BoundForm, FormError> {
        self.form.as_ref().ok_or(FormError::NotLoaded)
    }

    fn set_run_enabled(&mut self, enabled: bool) {
        self.run_enabled = enabled;
        self.view.set_run_enabled(enabled);
    }

    pub fn form(&self) -> Option<&BoundForm> {
        self.form.as_ref()
    }

    pub fn config_of_record(&self) -> Option<&Config> {
        self.record.as_ref()
    }

    pub fn catalog(&self) -> Option<&LocationCatalog> {
        self.catalog.as_ref()
    }

    pub fn is_run_enabled(&self) -> bool {
        self.run_enabled
    }

    pub fn is_running(&self) -> bool {
        self.active_run.is_some()
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultsView> {
        self.results.as_mut()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model::CatalogEntry;
    use crate::session::{ChannelError, RunChannel, CLOSED_LOG};

    #[derive(Default)]
    struct FakeApi {
        config: Config,
        fail_locations: bool,
        reject_save: bool,
        saved: Mutex<Vec<Config>>,
    }

    #[async_trait]
    impl ConfigApi for FakeApi {
        async fn fetch_config(&self) -> Result<Config, ApiError> {
            Ok(self.config.clone())
        }

        async fn fetch_locations(&self) -> Result<LocationCatalog, ApiError> {
            if self.fail_locations {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(catalog())
        }

        async fn save_config(&self, config: &Config) -> Result<(), ApiError> {
            if self.reject_save {
                return Err(ApiError::Rejected {
                    status: 500,
                    body: "Failed to save config".into(),
                });
            }
            self.saved.lock().unwrap().push(config.clone());
            Ok(())
        }
    }

    struct ScriptedConnector {
        frames: Vec<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    struct ScriptedChannel {
        frames: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RunConnector for ScriptedConnector {
        async fn connect(&self) -> Result<Box<dyn RunChannel>, ChannelError> {
            Ok(Box::new(ScriptedChannel {
                frames: self.frames.iter().cloned().collect(),
                sent: self.sent.clone(),
            }))
        }
    }

    #[async_trait]
    impl RunChannel for ScriptedChannel {
        async fn send_text(&mut self, text: String) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(text);
            Ok(())
        }

        async fn next_text(&mut self) -> Option<Result<String, ChannelError>> {
            self.frames.pop_front().map(Ok)
        }

        async fn close(&mut self) {}
    }

    #[derive(Default)]
    struct RecordingView {
        renders: usize,
        alerts: Vec<String>,
        confirm_answer: bool,
        last_errors: Option<Verdict>,
        run_enabled: Vec<bool>,
        clears: usize,
        log: Vec<String>,
        results_shown: usize,
    }

    impl FormView for RecordingView {
        fn render_form(&mut self, _form: &BoundForm) {
            self.renders += 1;
        }
        fn show_field_errors(&mut self, verdict: &Verdict) {
            self.last_errors = Some(verdict.clone());
        }
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
        fn confirm(&mut self, _message: &str) -> bool {
            self.confirm_answer
        }
        fn set_run_enabled(&mut self, enabled: bool) {
            self.run_enabled.push(enabled);
        }
        fn clear_run_output(&mut self) {
            self.clears += 1;
        }
        fn append_log(&mut self, line: &str) {
            self.log.push(line.to_string());
        }
        fn show_results(&mut self, _results: &ResultsView) {
            self.results_shown += 1;
        }
    }

    fn catalog() -> LocationCatalog {
        LocationCatalog {
            regions: vec![
                CatalogEntry::new("Europe", "Europe", true),
                CatalogEntry::new("Asia Pacific", "Asia Pacific", true),
            ],
            colos: vec![
                CatalogEntry::new("LAX", "LAX - Los Angeles", true),
                CatalogEntry::new("ZRH", "ZRH - Zurich", false),
            ],
        }
    }

    fn controller(api: FakeApi, frames: &[&str]) -> (FormController<RecordingView>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let connector = ScriptedConnector {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            sent: sent.clone(),
        };
        let backends = Backends {
            api: Arc::new(api),
            connector: Arc::new(connector),
            open_timeout: Duration::from_secs(3),
        };
        let view = RecordingView {
            confirm_answer: true,
            ..Default::default()
        };
        (FormController::new(backends, view), sent)
    }

    #[tokio::test]
    async fn test_load_renders_once_and_enables_run() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();
        assert_eq!(ctl.view().renders, 1);
        assert!(ctl.is_run_enabled());
        assert_eq!(ctl.collect_snapshot().unwrap(), Config::default());
    }

    #[tokio::test]
    async fn test_load_failure_alerts_and_renders_nothing() {
        let api = FakeApi {
            fail_locations: true,
            ..Default::default()
        };
        let (mut ctl, _) = controller(api, &[]);
        assert!(matches!(ctl.load_initial_data().await, Err(FormError::Load(_))));
        assert_eq!(ctl.view().renders, 0);
        assert_eq!(ctl.view().alerts, vec![LOAD_FAILED_ALERT]);
        assert!(matches!(ctl.collect_snapshot(), Err(FormError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_edit_is_validated_immediately() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();

        ctl.set_field(FieldId::Numeric(NumericField::MaxLatency), "-5").unwrap();
        let errors = ctl.view().last_errors.clone().unwrap();
        assert!(errors.error(NumericField::MaxLatency).is_some());

        ctl.set_field(FieldId::Numeric(NumericField::MaxLatency), "300").unwrap();
        assert!(ctl.view().last_errors.as_ref().unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_read_only_and_bad_choice_are_refused() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();

        let dns = FieldId::Numeric(NumericField::DnsConcurrency);
        assert!(matches!(ctl.set_field(dns, "9"), Err(FormError::ReadOnly(_))));
        assert!(matches!(
            ctl.set_field(FieldId::GroupBy, "country"),
            Err(FormError::InvalidChoice { .. })
        ));
        assert!(matches!(
            ctl.set_field_by_key("nope", "1"),
            Err(FormError::UnknownField(_))
        ));

        ctl.set_field_by_key("group_by", "colo").unwrap();
        assert_eq!(ctl.collect_snapshot().unwrap().group_by, GroupBy::Colo);
    }

    #[tokio::test]
    async fn test_toggles_flow_into_snapshot() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();

        assert!(ctl.toggle_region("Europe").unwrap());
        assert!(ctl.toggle_colo("LAX").unwrap());
        assert!(!ctl.toggle_colo("LAX").unwrap());

        let snapshot = ctl.collect_snapshot().unwrap();
        assert!(snapshot.filter_regions.contains("Europe"));
        assert!(snapshot.filter_colos.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_save_alerts_without_saving() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();
        ctl.set_field(FieldId::Numeric(NumericField::MinSpeed), "50").unwrap();
        ctl.set_field(FieldId::Numeric(NumericField::SpeedtestRateLimitMb), "10")
            .unwrap();

        assert!(matches!(ctl.save().await, Err(FormError::Validation(_))));
        assert_eq!(ctl.view().alerts, vec![INVALID_ALERT]);
        assert_eq!(ctl.config_of_record(), Some(&Config::default()));
    }

    #[tokio::test]
    async fn test_declined_save_keeps_record() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();
        ctl.view_mut().confirm_answer = false;
        ctl.set_field(FieldId::Numeric(NumericField::TopNPerGroup), "3").unwrap();

        assert_eq!(ctl.save().await.unwrap(), SaveOutcome::Cancelled);
        assert_eq!(ctl.config_of_record().unwrap().top_n_per_group, Config::default().top_n_per_group);
    }

    #[tokio::test]
    async fn test_successful_save_replaces_record() {
        let (mut ctl, _) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();
        ctl.set_field(FieldId::Numeric(NumericField::TopNPerGroup), "3").unwrap();

        assert_eq!(ctl.save().await.unwrap(), SaveOutcome::Saved);
        assert_eq!(ctl.config_of_record().unwrap().top_n_per_group, 3.0);
        assert_eq!(ctl.view().alerts, vec![SAVED_ALERT]);
    }

    #[tokio::test]
    async fn test_rejected_save_shows_server_message() {
        let api = FakeApi {
            reject_save: true,
            ..Default::default()
        };
        let (mut ctl, _) = controller(api, &[]);
        ctl.load_initial_data().await.unwrap();
        ctl.set_field(FieldId::Numeric(NumericField::TopNPerGroup), "3").unwrap();

        assert!(matches!(ctl.save().await, Err(FormError::Save(_))));
        assert!(ctl.view().alerts[0].contains("Failed to save config"));
        assert_eq!(ctl.config_of_record(), Some(&Config::default()));
    }

    #[tokio::test]
    async fn test_run_streams_logs_and_results() {
        let frames = [
            "plain text",
            r#"{"type":"log","payload":"probing..."}"#,
            r#"{"type":"result","payload":[{"address":"1.1.1.1","delayNanoseconds":1500000,"downloadSpeedKBps":2048,"colo":"LAX"}]}"#,
        ];
        let (mut ctl, sent) = controller(FakeApi::default(), &frames);
        ctl.load_initial_data().await.unwrap();

        assert!(matches!(ctl.run().unwrap(), RunStart::Started(_)));
        assert!(!ctl.is_run_enabled());
        assert_eq!(ctl.run().unwrap(), RunStart::AlreadyRunning);

        assert_eq!(ctl.wait_for_run().await, Some(Outcome::Success));
        assert!(ctl.is_run_enabled());
        assert!(!ctl.is_running());
        assert_eq!(ctl.log(), &["plain text", "probing...", CLOSED_LOG]);
        assert_eq!(ctl.results().unwrap().rows()[0].delay_ms, "1.50");
        assert_eq!(ctl.view().results_shown, 1);

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let sent_config: Config = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(sent_config.max_latency, Config::default().max_latency);
    }

    #[tokio::test]
    async fn test_bad_read_only_value_does_not_block_run() {
        let api = FakeApi {
            config: Config {
                dns_concurrency: -1.0,
                ..Config::default()
            },
            ..Default::default()
        };
        let (mut ctl, _) = controller(api, &[]);
        ctl.load_initial_data().await.unwrap();

        assert!(ctl.validate_form().unwrap().is_valid());
        assert!(matches!(ctl.run().unwrap(), RunStart::Started(_)));
        assert_eq!(ctl.wait_for_run().await, Some(Outcome::Success));
    }

    #[tokio::test]
    async fn test_invalid_run_creates_no_session() {
        let (mut ctl, sent) = controller(FakeApi::default(), &[]);
        ctl.load_initial_data().await.unwrap();
        ctl.set_field(FieldId::Numeric(NumericField::MaxLatency), "abc").unwrap();

        assert!(matches!(ctl.run(), Err(FormError::Validation(_))));
        assert!(!ctl.is_running());
        assert!(ctl.is_run_enabled());
        assert_eq!(ctl.view().clears, 0);
        assert!(sent.lock().unwrap().is_empty());
    }
}
