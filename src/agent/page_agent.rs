use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    agent::{
        application::{ApplicationPass, ApplicationReport},
        command::{Command, Notification, Response},
        notify::{Notifier, Unattended, notify_best_effort},
    },
    dom::document::{Document, NodeId, ReadyState},
    locator::{
        descriptor::ElementDescriptor,
        resolve::resolve,
        visibility::{Visibility, apply_visibility},
    },
    session::{
        event::{DomEvent, ESCAPE_KEY, EventOutcome},
        selection::{ClickOutcome, SelectionSession},
    },
    store::site::SiteStore,
    trace::{logger::TraceLogger, trace::TraceEvent},
};

/// Page-embedded side: owns the live document and the selection session.
///
/// Every command gets a structured [`Response`]; failures inside the agent are
/// logged, never propagated to the sender.
pub struct PageAgent {
    host: String,
    document: Document,
    pristine: Document,
    sites: SiteStore,
    notifier: Box<dyn Notifier>,
    tracer: Arc<TraceLogger>,
    pass: ApplicationPass,
    session: Option<SelectionSession>,
    pending_application: bool,
    last_report: Option<ApplicationReport>,
}

impl PageAgent {
    pub fn new(host: &str, document: Document, sites: SiteStore) -> Self {
        Self {
            host: host.to_string(),
            pristine: document.clone(),
            document,
            sites,
            notifier: Box::new(Unattended),
            tracer: Arc::new(TraceLogger::disabled()),
            pass: ApplicationPass::default(),
            session: None,
            pending_application: false,
            last_report: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.pass = ApplicationPass::new(delay);
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Initialize on the page: run the application pass now, or once the
    /// document finishes loading.
    pub fn start(&mut self) -> Option<&ApplicationReport> {
        info!(host = self.host.as_str(), "agent starting");
        match self.document.ready_state() {
            ReadyState::Loading => {
                debug!("document still loading, application deferred");
                self.pending_application = true;
                None
            }
            ReadyState::Complete => self.apply_stored(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn sites(&self) -> &SiteStore {
        &self.sites
    }

    pub fn is_selecting(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SelectionSession> {
        self.session.as_ref()
    }

    pub fn last_report(&self) -> Option<&ApplicationReport> {
        self.last_report.as_ref()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Entry point for raw wire messages. Anything that does not decode to a
    /// [`Command`] is answered with a failure response.
    pub fn handle_message(&mut self, message: serde_json::Value) -> Response {
        match serde_json::from_value::<Command>(message) {
            Ok(command) => self.handle(command),
            Err(e) => {
                warn!(error = %e, "unrecognized message");
                Response::failed(format!("unrecognized message: {e}"))
            }
        }
    }

    pub fn handle(&mut self, command: Command) -> Response {
        debug!(action = command.name(), "command received");
        match command {
            Command::ToggleSelectionMode => {
                let active = self.toggle_selection();
                Response::Mode { active }
            }
            Command::HideElement(descriptor) => {
                self.set_visibility(&descriptor, Visibility::Hidden);
                Response::ok()
            }
            Command::ShowElement(descriptor) => {
                self.set_visibility(&descriptor, Visibility::Shown);
                Response::ok()
            }
            Command::ReloadPage => {
                self.reload();
                Response::ok()
            }
        }
    }

    fn toggle_selection(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.disable(&mut self.document);
                false
            }
            None => {
                self.session = Some(SelectionSession::enable(&mut self.document));
                true
            }
        }
    }

    fn set_visibility(&mut self, descriptor: &ElementDescriptor, visibility: Visibility) {
        let resolution = resolve(&mut self.document, descriptor);
        apply_visibility(&mut self.document, &resolution.nodes, visibility);

        let operation = match visibility {
            Visibility::Hidden => "hide",
            Visibility::Shown => "show",
        };
        self.tracer
            .log(&TraceEvent::now(&self.host, operation, descriptor).with_resolution(&resolution));
    }

    /// Back to the as-loaded document, then initialize again.
    fn reload(&mut self) {
        info!(host = self.host.as_str(), "reloading page");
        self.session = None;
        self.document = self.pristine.clone();
        self.document.set_ready_state(ReadyState::Complete);
        self.pending_application = false;
        self.apply_stored();
    }

    fn apply_stored(&mut self) -> Option<&ApplicationReport> {
        self.pending_application = false;
        match self
            .pass
            .run(&mut self.document, &self.sites, &self.host, &self.tracer)
        {
            Ok(report) => {
                self.last_report = Some(report);
                self.last_report.as_ref()
            }
            Err(e) => {
                warn!(host = self.host.as_str(), error = %e, "could not read stored elements");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn dispatch(&mut self, event: DomEvent) -> EventOutcome {
        match event {
            DomEvent::ContentLoaded => {
                self.document.set_ready_state(ReadyState::Complete);
                if self.pending_application {
                    self.apply_stored();
                }
                EventOutcome::ignored()
            }
            DomEvent::PointerMove { target, x, y } => {
                if let Some(session) = self.session.as_mut() {
                    session.pointer_move(&mut self.document, target, x, y);
                }
                EventOutcome::ignored()
            }
            DomEvent::Click { target } => self.click(target),
            DomEvent::KeyDown { key } => self.key_down(&key),
        }
    }

    fn click(&mut self, target: NodeId) -> EventOutcome {
        let Some(session) = self.session.as_mut() else {
            return EventOutcome::ignored();
        };

        match session.click(&mut self.document, target) {
            ClickOutcome::PassThrough => EventOutcome::ignored(),
            ClickOutcome::Committed(descriptor) => {
                self.commit(&descriptor);
                EventOutcome {
                    default_prevented: true,
                    committed: Some(descriptor),
                    deactivated: false,
                }
            }
        }
    }

    /// Persist a selected descriptor and tell the panel.
    fn commit(&mut self, descriptor: &ElementDescriptor) {
        if let Err(e) = self.sites.append(&self.host, descriptor) {
            warn!(host = self.host.as_str(), error = %e, "could not save hidden element");
        }
        self.tracer
            .log(&TraceEvent::now(&self.host, "select", descriptor).with_matched(1));

        notify_best_effort(
            self.notifier.as_ref(),
            &Notification::ElementHidden {
                element: descriptor.clone(),
            },
        );
    }

    fn key_down(&mut self, key: &str) -> EventOutcome {
        if key != ESCAPE_KEY {
            return EventOutcome::ignored();
        }
        let Some(session) = self.session.take() else {
            return EventOutcome::ignored();
        };

        session.disable(&mut self.document);
        notify_best_effort(self.notifier.as_ref(), &Notification::SelectionModeOff);
        EventOutcome {
            deactivated: true,
            ..EventOutcome::default()
        }
    }
}
