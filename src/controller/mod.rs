//! Load/save lifecycle orchestration for one record draft.

pub mod event;
pub mod gate;

pub use event::{ControllerEvent, ControllerObserver};
pub use gate::{GateError, SaveGate, SaveState};

use crate::api::{AlertSink, Navigator, RecordStore, RelatedSource, RequestError};
use crate::i18n::{Translator, KEY_RECORD_CREATED, KEY_RECORD_UPDATED};
use crate::model::{RecordDraft, RecordId, RelatedOption};
use crate::validation::{RuleSet, ValidationPolicy, ValidationReport};

/// Resolution of a single `save()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(RecordId),
    /// Dropped because another attempt was in flight.
    Suppressed,
    /// Dropped by the `Blocking` validation policy.
    RejectedByValidation(ValidationReport),
    Failed(RequestError),
}

/// Owns the draft being edited and drives the load-on-entry and
/// save-on-submit flows. Collaborators arrive through the constructor; the
/// controller never looks anything up ambiently.
pub struct RecordEditorController<S, R> {
    store: S,
    related_source: R,
    alerts: Box<dyn AlertSink>,
    navigator: Box<dyn Navigator>,
    translator: Box<dyn Translator>,
    rules: RuleSet,
    policy: ValidationPolicy,
    draft: RecordDraft,
    options: Vec<RelatedOption>,
    validity: ValidationReport,
    gate: SaveGate,
    observers: Vec<Box<dyn ControllerObserver>>,
}

impl<S, R> RecordEditorController<S, R>
where
    S: RecordStore,
    R: RelatedSource,
{
    pub fn new(
        store: S,
        related_source: R,
        alerts: Box<dyn AlertSink>,
        navigator: Box<dyn Navigator>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self {
            store,
            related_source,
            alerts,
            navigator,
            translator,
            rules: RuleSet::new(),
            policy: ValidationPolicy::default(),
            draft: RecordDraft::default(),
            options: Vec::new(),
            validity: ValidationReport::default(),
            gate: SaveGate::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn ControllerObserver>) {
        self.observers.push(observer);
    }

    pub fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    pub fn options(&self) -> &[RelatedOption] {
        &self.options
    }

    pub fn is_saving(&self) -> bool {
        self.gate.is_saving()
    }

    pub fn validity(&self) -> &ValidationReport {
        &self.validity
    }

    /// Entry point. With an identifier, fetches the record and replaces the
    /// draft; a fetch failure is alerted and leaves the draft at its prior
    /// (empty) state. Without one, the draft stays freshly constructed.
    /// Either way the initial validation pass runs once.
    pub async fn activate(&mut self, id: Option<RecordId>) {
        if let Some(id) = id {
            match self.store.find(id).await {
                Ok(record) => {
                    tracing::debug!(%id, "record loaded");
                    self.draft = record;
                    self.emit(ControllerEvent::DraftReplaced { id });
                }
                Err(err) => {
                    tracing::warn!(%id, error = %err, "record load failed");
                    self.alerts.http_error(&err);
                }
            }
        }
        self.validity = self.rules.validate(&self.draft);
    }

    /// Fetches the related-entity list backing the selection control. A
    /// failure leaves the list empty: it is logged and surfaced as an
    /// observer event but never alerted and never propagated.
    pub async fn load_related_options(&mut self) {
        match self.related_source.retrieve().await {
            Ok(options) => {
                let count = options.len();
                tracing::debug!(count, "related options loaded");
                self.options = options;
                self.emit(ControllerEvent::OptionsLoaded { count });
            }
            Err(err) => {
                tracing::warn!(error = %err, "related options fetch failed; keeping empty list");
                self.emit(ControllerEvent::RelatedLoadFailed {
                    detail: err.message(),
                });
            }
        }
    }

    /// Submits the draft, choosing create or update on the presence of its
    /// identifier. On success the gate clears, navigation goes back one step,
    /// and a localized notification names the saved record. On failure the
    /// gate clears, the error is alerted, and the draft is retained so the
    /// user can retry manually. Navigation happens only on success.
    pub async fn save(&mut self) -> SaveOutcome {
        if !self.gate.try_begin() {
            self.emit(ControllerEvent::SaveSuppressed);
            return SaveOutcome::Suppressed;
        }

        if self.policy == ValidationPolicy::Blocking {
            self.validity = self.rules.validate(&self.draft);
            if !self.validity.is_valid() {
                tracing::debug!(
                    violations = self.validity.violations().len(),
                    "save rejected by validation policy"
                );
                self.settle_gate();
                return SaveOutcome::RejectedByValidation(self.validity.clone());
            }
        }

        self.emit(ControllerEvent::SaveStarted);
        let result = match self.draft.id {
            Some(_) => self.store.update(&self.draft).await,
            None => self.store.create(&self.draft.payload_for_create()).await,
        };

        match result {
            Ok(saved) => {
                self.settle_gate();
                match saved.id.or(self.draft.id) {
                    Some(id) => {
                        self.navigator.go_back();
                        self.notify_saved(id);
                        self.emit(ControllerEvent::SaveSucceeded { id });
                        SaveOutcome::Saved(id)
                    }
                    None => {
                        let err =
                            RequestError::transport("save response did not include a record id");
                        tracing::warn!(error = %err, "save response breached contract");
                        self.alerts.http_error(&err);
                        self.emit(ControllerEvent::SaveFailed { status: None });
                        SaveOutcome::Failed(err)
                    }
                }
            }
            Err(err) => {
                self.settle_gate();
                tracing::warn!(status = ?err.status, error = %err, "save failed");
                self.alerts.http_error(&err);
                self.emit(ControllerEvent::SaveFailed { status: err.status });
                SaveOutcome::Failed(err)
            }
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
        self.field_changed(crate::validation::FIELD_CONTENT);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
        self.field_changed(crate::validation::FIELD_DESCRIPTION);
    }

    pub fn set_related(&mut self, related: Option<RecordId>) {
        self.draft.related = related;
        self.field_changed(crate::validation::FIELD_RELATED);
    }

    fn field_changed(&mut self, field: &'static str) {
        self.validity = self.rules.validate(&self.draft);
        self.emit(ControllerEvent::DraftChanged { field });
    }

    fn notify_saved(&self, id: RecordId) {
        let params = [("id", id.to_string())];
        if self.draft.id.is_some() {
            let message = self.translator.translate(KEY_RECORD_UPDATED, &params);
            self.alerts.info(&message);
        } else {
            let message = self.translator.translate(KEY_RECORD_CREATED, &params);
            self.alerts.success(&message);
        }
    }

    /// The gate was claimed by this call, so release cannot fail; a failure
    /// here means the lifecycle invariant broke and is worth a loud log.
    fn settle_gate(&mut self) {
        if let Err(err) = self.gate.finish() {
            tracing::error!(error = %err, "save gate out of sync");
        }
    }

    fn emit(&self, event: ControllerEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestResult;
    use crate::i18n::Catalog;
    use crate::validation::{FieldRule, FIELD_CONTENT};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum StoreCall {
        Find(RecordId),
        Create(RecordDraft),
        Update(RecordDraft),
    }

    #[derive(Clone)]
    struct ScriptedStore {
        calls: Arc<Mutex<Vec<StoreCall>>>,
        find_response: RequestResult<RecordDraft>,
        create_response: RequestResult<RecordDraft>,
        update_response: RequestResult<RecordDraft>,
    }

    impl ScriptedStore {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                find_response: Err(RequestError::transport("find not scripted")),
                create_response: Err(RequestError::transport("create not scripted")),
                update_response: Err(RequestError::transport("update not scripted")),
            }
        }

        fn on_find(mut self, response: RequestResult<RecordDraft>) -> Self {
            self.find_response = response;
            self
        }

        fn on_create(mut self, response: RequestResult<RecordDraft>) -> Self {
            self.create_response = response;
            self
        }

        fn on_update(mut self, response: RequestResult<RecordDraft>) -> Self {
            self.update_response = response;
            self
        }

        fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn find(&self, id: RecordId) -> RequestResult<RecordDraft> {
            self.calls.lock().unwrap().push(StoreCall::Find(id));
            self.find_response.clone()
        }

        async fn create(&self, draft: &RecordDraft) -> RequestResult<RecordDraft> {
            self.calls.lock().unwrap().push(StoreCall::Create(draft.clone()));
            self.create_response.clone()
        }

        async fn update(&self, draft: &RecordDraft) -> RequestResult<RecordDraft> {
            self.calls.lock().unwrap().push(StoreCall::Update(draft.clone()));
            self.update_response.clone()
        }
    }

    #[derive(Clone)]
    struct ScriptedRelated {
        response: RequestResult<Vec<RelatedOption>>,
    }

    #[async_trait]
    impl RelatedSource for ScriptedRelated {
        async fn retrieve(&self) -> RequestResult<Vec<RelatedOption>> {
            self.response.clone()
        }
    }

    fn no_related() -> ScriptedRelated {
        ScriptedRelated {
            response: Ok(Vec::new()),
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Alert {
        Info(String),
        Success(String),
        HttpError(Option<u16>, String),
    }

    #[derive(Clone, Default)]
    struct RecordedAlerts {
        alerts: Arc<Mutex<Vec<Alert>>>,
    }

    impl RecordedAlerts {
        fn recorded(&self) -> Vec<Alert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl AlertSink for RecordedAlerts {
        fn info(&self, message: &str) {
            self.alerts.lock().unwrap().push(Alert::Info(message.to_string()));
        }

        fn success(&self, message: &str) {
            self.alerts
                .lock()
                .unwrap()
                .push(Alert::Success(message.to_string()));
        }

        fn http_error(&self, error: &RequestError) {
            self.alerts
                .lock()
                .unwrap()
                .push(Alert::HttpError(error.status, error.message()));
        }
    }

    #[derive(Clone, Default)]
    struct RecordedNavigator {
        back_calls: Arc<Mutex<usize>>,
    }

    impl RecordedNavigator {
        fn back_calls(&self) -> usize {
            *self.back_calls.lock().unwrap()
        }
    }

    impl Navigator for RecordedNavigator {
        fn go_back(&self) {
            *self.back_calls.lock().unwrap() += 1;
        }
    }

    #[derive(Clone, Default)]
    struct RecordedObserver {
        events: Arc<Mutex<Vec<ControllerEvent>>>,
    }

    impl RecordedObserver {
        fn events(&self) -> Vec<ControllerEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ControllerObserver for RecordedObserver {
        fn on_event(&self, event: &ControllerEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct Harness {
        store: ScriptedStore,
        alerts: RecordedAlerts,
        navigator: RecordedNavigator,
        observer: RecordedObserver,
        controller: RecordEditorController<ScriptedStore, ScriptedRelated>,
    }

    fn harness(store: ScriptedStore, related: ScriptedRelated) -> Harness {
        harness_with(store, related, RuleSet::new(), ValidationPolicy::default())
    }

    fn harness_with(
        store: ScriptedStore,
        related: ScriptedRelated,
        rules: RuleSet,
        policy: ValidationPolicy,
    ) -> Harness {
        let alerts = RecordedAlerts::default();
        let navigator = RecordedNavigator::default();
        let observer = RecordedObserver::default();
        let mut controller = RecordEditorController::new(
            store.clone(),
            related,
            Box::new(alerts.clone()),
            Box::new(navigator.clone()),
            Box::new(Catalog::with_defaults()),
        )
        .with_rules(rules)
        .with_policy(policy);
        controller.subscribe(Box::new(observer.clone()));
        Harness {
            store,
            alerts,
            navigator,
            observer,
            controller,
        }
    }

    #[tokio::test]
    async fn activate_with_id_replaces_draft_with_fetched_record() {
        let fetched = RecordDraft {
            id: Some(RecordId(7)),
            content: "stored body".to_string(),
            description: "stored".to_string(),
            related: Some(RecordId(2)),
        };
        let store = ScriptedStore::new().on_find(Ok(fetched.clone()));
        let mut h = harness(store, no_related());

        h.controller.activate(Some(RecordId(7))).await;

        assert_eq!(h.controller.draft(), &fetched);
        assert_eq!(h.store.calls(), vec![StoreCall::Find(RecordId(7))]);
        assert_eq!(
            h.observer.events(),
            vec![ControllerEvent::DraftReplaced { id: RecordId(7) }]
        );
    }

    #[tokio::test]
    async fn activate_without_id_keeps_fresh_empty_draft() {
        let mut h = harness(ScriptedStore::new(), no_related());

        h.controller.activate(None).await;

        assert_eq!(h.controller.draft(), &RecordDraft::default());
        assert!(h.store.calls().is_empty());
        assert!(h.alerts.recorded().is_empty());
    }

    #[tokio::test]
    async fn activate_load_failure_alerts_and_leaves_draft_untouched() {
        let store =
            ScriptedStore::new().on_find(Err(RequestError::from_status(404, None)));
        let mut h = harness(store, no_related());

        h.controller.activate(Some(RecordId(9))).await;

        assert_eq!(h.controller.draft(), &RecordDraft::default());
        let recorded = h.alerts.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(matches!(recorded[0], Alert::HttpError(Some(404), _)));
    }

    #[tokio::test]
    async fn related_options_populate_on_success() {
        let options = vec![
            RelatedOption {
                id: RecordId(1),
                label: "one".to_string(),
            },
            RelatedOption {
                id: RecordId(2),
                label: "two".to_string(),
            },
        ];
        let related = ScriptedRelated {
            response: Ok(options.clone()),
        };
        let mut h = harness(ScriptedStore::new(), related);

        h.controller.load_related_options().await;

        assert_eq!(h.controller.options(), options.as_slice());
        assert_eq!(
            h.observer.events(),
            vec![ControllerEvent::OptionsLoaded { count: 2 }]
        );
    }

    #[tokio::test]
    async fn related_options_failure_emits_event_without_alert() {
        let related = ScriptedRelated {
            response: Err(RequestError::transport("connection refused")),
        };
        let mut h = harness(ScriptedStore::new(), related);

        h.controller.load_related_options().await;

        assert!(h.controller.options().is_empty());
        assert!(h.alerts.recorded().is_empty());
        assert_eq!(
            h.observer.events(),
            vec![ControllerEvent::RelatedLoadFailed {
                detail: "connection refused".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn save_without_id_creates_with_id_stripped_and_navigates() {
        let store = ScriptedStore::new().on_create(Ok(RecordDraft {
            id: Some(RecordId(42)),
            content: "hello".to_string(),
            ..RecordDraft::default()
        }));
        let mut h = harness(store, no_related());
        h.controller.set_content("hello");

        let outcome = h.controller.save().await;

        assert_eq!(outcome, SaveOutcome::Saved(RecordId(42)));
        let calls = h.store.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            StoreCall::Create(payload) => {
                assert!(payload.id.is_none());
                assert_eq!(payload.content, "hello");
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert_eq!(h.navigator.back_calls(), 1);
        assert_eq!(
            h.alerts.recorded(),
            vec![Alert::Success(
                "A new record was created with identifier 42".to_string()
            )]
        );
        assert!(!h.controller.is_saving());
    }

    #[tokio::test]
    async fn save_with_id_updates_and_reports_the_record() {
        let draft = RecordDraft {
            id: Some(RecordId(7)),
            content: "v2".to_string(),
            ..RecordDraft::default()
        };
        let store = ScriptedStore::new()
            .on_find(Ok(draft.clone()))
            .on_update(Ok(draft.clone()));
        let mut h = harness(store, no_related());
        h.controller.activate(Some(RecordId(7))).await;

        let outcome = h.controller.save().await;

        assert_eq!(outcome, SaveOutcome::Saved(RecordId(7)));
        let calls = h.store.calls();
        assert_eq!(calls[1], StoreCall::Update(draft));
        assert_eq!(h.navigator.back_calls(), 1);
        assert_eq!(
            h.alerts.recorded(),
            vec![Alert::Info("Record 7 was updated".to_string())]
        );
        assert!(!h.controller.is_saving());
    }

    #[tokio::test]
    async fn save_failure_alerts_without_navigating_and_clears_gate() {
        let draft = RecordDraft {
            id: Some(RecordId(7)),
            ..RecordDraft::default()
        };
        let store = ScriptedStore::new()
            .on_find(Ok(draft))
            .on_update(Err(RequestError::from_status(
                500,
                Some("boom".to_string()),
            )));
        let mut h = harness(store, no_related());
        h.controller.activate(Some(RecordId(7))).await;

        let outcome = h.controller.save().await;

        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert_eq!(h.navigator.back_calls(), 0);
        let recorded = h.alerts.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(matches!(recorded[0], Alert::HttpError(Some(500), _)));
        assert!(!h.controller.is_saving());
        // draft retained for manual retry
        assert_eq!(h.controller.draft().id, Some(RecordId(7)));
        assert!(h
            .observer
            .events()
            .contains(&ControllerEvent::SaveFailed { status: Some(500) }));
    }

    #[tokio::test]
    async fn save_while_in_flight_is_suppressed() {
        let store = ScriptedStore::new().on_create(Ok(RecordDraft {
            id: Some(RecordId(1)),
            ..RecordDraft::default()
        }));
        let mut h = harness(store, no_related());

        assert!(h.controller.gate.try_begin());
        let outcome = h.controller.save().await;

        assert_eq!(outcome, SaveOutcome::Suppressed);
        assert!(h.store.calls().is_empty());
        assert_eq!(h.navigator.back_calls(), 0);
        assert_eq!(h.observer.events(), vec![ControllerEvent::SaveSuppressed]);
        assert!(h.controller.is_saving());
    }

    #[tokio::test]
    async fn blocking_policy_rejects_invalid_draft_before_submitting() {
        let mut h = harness_with(
            ScriptedStore::new(),
            no_related(),
            RuleSet::new().rule(FIELD_CONTENT, FieldRule::Required),
            ValidationPolicy::Blocking,
        );

        let outcome = h.controller.save().await;

        assert!(matches!(outcome, SaveOutcome::RejectedByValidation(_)));
        assert!(h.store.calls().is_empty());
        assert!(!h.controller.is_saving());
    }

    #[tokio::test]
    async fn advisory_policy_submits_despite_violations() {
        let store = ScriptedStore::new().on_create(Ok(RecordDraft {
            id: Some(RecordId(5)),
            ..RecordDraft::default()
        }));
        let mut h = harness_with(
            store,
            no_related(),
            RuleSet::new().rule(FIELD_CONTENT, FieldRule::Required),
            ValidationPolicy::Advisory,
        );
        h.controller.activate(None).await;

        let outcome = h.controller.save().await;

        assert_eq!(outcome, SaveOutcome::Saved(RecordId(5)));
        assert!(!h.controller.validity().is_valid());
    }

    #[tokio::test]
    async fn create_response_without_id_is_a_failure_without_navigation() {
        let store = ScriptedStore::new().on_create(Ok(RecordDraft::default()));
        let mut h = harness(store, no_related());

        let outcome = h.controller.save().await;

        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert_eq!(h.navigator.back_calls(), 0);
        assert!(!h.controller.is_saving());
    }

    #[tokio::test]
    async fn field_mutators_revalidate_and_emit_changes() {
        let mut h = harness_with(
            ScriptedStore::new(),
            no_related(),
            RuleSet::new().rule(FIELD_CONTENT, FieldRule::Required),
            ValidationPolicy::Advisory,
        );

        h.controller.activate(None).await;
        assert!(!h.controller.validity().is_valid());

        h.controller.set_content("now present");
        assert!(h.controller.validity().is_valid());
        h.controller.set_related(Some(RecordId(3)));

        assert_eq!(
            h.observer.events(),
            vec![
                ControllerEvent::DraftChanged { field: "content" },
                ControllerEvent::DraftChanged { field: "related" },
            ]
        );
        assert_eq!(h.controller.draft().related, Some(RecordId(3)));
    }
}
