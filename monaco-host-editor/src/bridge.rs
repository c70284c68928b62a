use std::cell::RefCell;

use monaco_host_core::config::BridgeConfig;
use monaco_host_core::readiness::{poll_until_ready, Probe};
use monaco_host_core::transport::{self, FALLBACK_ORDER};
use monaco_host_core::util::is_builtin_theme;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, Mutex};

use crate::protocol::EditorEvent;
use crate::runtime::{decode_bool, decode_json, ScriptRuntime};
use crate::scripts::{self, TextTarget};
use crate::session::{BridgeSession, BridgeState, LoadingOverlay};

/// Plumbing shared by [`EditorView`](crate::EditorView) and
/// [`DiffView`](crate::DiffView): one runtime, one command gate, one session.
///
/// All commands go through [`Bridge::send`], which holds the gate for the
/// whole evaluation, so a control never has two commands in flight.
pub struct Bridge<R: ScriptRuntime> {
    runtime: R,
    config: BridgeConfig,
    gate: Mutex<()>,
    session: RefCell<BridgeSession>,
    event_tx: mpsc::UnboundedSender<EditorEvent>,
}

impl<R: ScriptRuntime> Bridge<R> {
    pub fn new(
        runtime: R,
        config: BridgeConfig,
        event_tx: mpsc::UnboundedSender<EditorEvent>,
    ) -> Self {
        let session = BridgeSession::new(&config.default_language, &config.default_theme);
        Bridge {
            runtime,
            config,
            gate: Mutex::new(()),
            session: RefCell::new(session),
            event_tx,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> BridgeState {
        self.session.borrow().state().clone()
    }

    pub fn overlay(&self) -> LoadingOverlay {
        self.session.borrow().overlay().clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.session.borrow().retry_count()
    }

    pub fn is_ready(&self) -> bool {
        self.session.borrow().is_ready()
    }

    pub fn is_disposed(&self) -> bool {
        *self.session.borrow().state() == BridgeState::Disposed
    }

    pub fn language(&self) -> String {
        self.session
            .borrow()
            .language
            .get()
            .cloned()
            .unwrap_or_else(|| self.config.default_language.clone())
    }

    pub fn theme(&self) -> String {
        self.session
            .borrow()
            .theme
            .get()
            .cloned()
            .unwrap_or_else(|| self.config.default_theme.clone())
    }

    // -----------------------------------------------------------------------
    // Handshake
    // -----------------------------------------------------------------------

    /// Hand the page to the runtime. Only the first call does anything.
    pub fn load(&self, html: &str, loading_message: &str) -> bool {
        if !self.session.borrow_mut().begin_navigation(loading_message) {
            return false;
        }
        log::debug!("loading editor page ({} bytes)", html.len());
        self.runtime.load_html(html, None);
        true
    }

    /// Settle, then probe with backoff until the page reports ready.
    ///
    /// Returns `true` when the caller should run its initialization and
    /// replay, then call [`Bridge::finish_ready`]. Duplicate notifications and
    /// failures return `false`.
    pub async fn await_ready(&self, navigation_succeeded: bool) -> bool {
        if !self
            .session
            .borrow_mut()
            .navigation_completed(navigation_succeeded, &self.config)
        {
            return false;
        }

        tokio::time::sleep(self.config.settle_delay()).await;

        let policy = self.config.readiness_policy();
        let max_attempts = policy.max_attempts;
        let outcome = poll_until_ready(&policy, |attempt| async move {
            if self.is_disposed() {
                return Probe::Abandon;
            }
            let ready = match self.send(scripts::PROBE).await {
                Ok(result) => decode_bool(&result),
                Err(e) => {
                    log::debug!("readiness probe failed: {}", e);
                    false
                }
            };
            if self.is_disposed() {
                return Probe::Abandon;
            }
            if !ready {
                self.session
                    .borrow_mut()
                    .probe_failed(attempt + 1, max_attempts, &self.config);
            }
            Probe::from(ready)
        })
        .await;

        if self.is_disposed() {
            return false;
        }
        if !outcome.ready {
            log::error!(
                "editor did not become ready after {} probes",
                outcome.attempts
            );
            self.session.borrow_mut().fail(&self.config.failure_message);
            return false;
        }
        log::info!("editor ready after {} probe(s)", outcome.attempts);
        true
    }

    pub fn finish_ready(&self) -> bool {
        self.session.borrow_mut().mark_ready()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Evaluate one command with the gate held.
    pub async fn send(&self, script: &str) -> Result<String, String> {
        let _guard = self.gate.lock().await;
        self.runtime.evaluate(script).await
    }

    /// Evaluate a command only when the editor is ready. Failures are logged
    /// and reported as `None`.
    pub async fn query(&self, script: &str) -> Option<String> {
        if !self.is_ready() {
            log::debug!("editor not ready, dropping command");
            return None;
        }
        match self.send(script).await {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!("editor command failed: {}", e);
                None
            }
        }
    }

    pub async fn query_json<T: DeserializeOwned>(&self, script: &str) -> Option<T> {
        let raw = self.query(script).await?;
        match decode_json(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    /// Run an action-style command and report whether it succeeded.
    pub async fn command(&self, script: &str) -> bool {
        self.query(script)
            .await
            .is_some_and(|result| decode_bool(&result) || transport::is_success_marker(&result))
    }

    /// Set already-cleaned text on `target`, trying each encoding in order.
    pub async fn push_text(&self, target: TextTarget, cleaned: &str) -> bool {
        for encoding in FALLBACK_ORDER {
            let payload = transport::encode_cleaned(cleaned, encoding);
            match self.send(&scripts::set_text(target, &payload)).await {
                Ok(result) if transport::is_success_marker(&result) => return true,
                Ok(result) => log::warn!(
                    "setting {} with {:?} encoding was rejected ({} chars): {}",
                    target,
                    encoding,
                    cleaned.len(),
                    result
                ),
                Err(e) => log::warn!(
                    "setting {} with {:?} encoding failed ({} chars): {}",
                    target,
                    encoding,
                    cleaned.len(),
                    e
                ),
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Language / theme
    // -----------------------------------------------------------------------

    pub async fn set_language(&self, language: &str) -> bool {
        let to_apply = {
            let mut session = self.session.borrow_mut();
            if session.state().is_terminal() {
                return false;
            }
            let ready = session.is_ready();
            session.language.write(language.to_string(), ready)
        };
        match to_apply {
            Some(language) => self.apply_language(&language).await,
            None => {
                log::debug!("editor not ready, caching language {}", language);
                true
            }
        }
    }

    pub async fn set_theme(&self, theme: &str) -> bool {
        let to_apply = {
            let mut session = self.session.borrow_mut();
            if session.state().is_terminal() {
                return false;
            }
            let ready = session.is_ready();
            session.theme.write(theme.to_string(), ready)
        };
        match to_apply {
            Some(theme) => self.apply_theme(&theme).await,
            None => {
                log::debug!("editor not ready, caching theme {}", theme);
                true
            }
        }
    }

    pub async fn apply_language(&self, language: &str) -> bool {
        self.apply(&scripts::set_language(language), "language", language)
            .await
    }

    pub async fn apply_theme(&self, theme: &str) -> bool {
        if !is_builtin_theme(theme) {
            log::debug!("applying custom theme {}, it must already be defined", theme);
        }
        self.apply(&scripts::set_theme(theme), "theme", theme).await
    }

    async fn apply(&self, script: &str, what: &str, value: &str) -> bool {
        match self.send(script).await {
            Ok(result) if transport::is_success_marker(&result) => true,
            Ok(result) => {
                log::warn!("setting {} {} returned {}", what, value, result);
                false
            }
            Err(e) => {
                log::warn!("setting {} {} failed: {}", what, value, e);
                false
            }
        }
    }

    /// Take the cached theme and language, in replay order.
    pub fn take_pending_style(&self) -> (Option<String>, Option<String>) {
        let mut session = self.session.borrow_mut();
        (session.theme.flush(), session.language.flush())
    }

    /// Remember a language reported by the editor itself.
    pub fn store_language(&self, language: &str) {
        self.session
            .borrow_mut()
            .language
            .store(language.to_string());
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn emit(&self, event: EditorEvent) {
        if self.event_tx.send(event).is_err() {
            log::debug!("editor event receiver dropped");
        }
    }

    /// Decode a posted message. Malformed messages are logged and dropped.
    pub fn parse_message(&self, json: &str) -> Option<EditorEvent> {
        if self.is_disposed() {
            return None;
        }
        match EditorEvent::from_json(json) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    /// Pull messages the page queued because no message handler was wired.
    pub async fn drain_outbox(&self) -> Vec<String> {
        if self.state().is_terminal() {
            return Vec::new();
        }
        match self.send(scripts::DRAIN_EVENTS).await {
            Ok(raw) => decode_json::<Vec<String>>(&raw)
                .unwrap_or_else(|e| {
                    log::warn!("{}", e);
                    None
                })
                .unwrap_or_default(),
            Err(e) => {
                log::debug!("draining editor events failed: {}", e);
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    pub async fn dispose(&self) {
        let was_loaded = {
            let mut session = self.session.borrow_mut();
            if *session.state() == BridgeState::Disposed {
                return;
            }
            let was_loaded = *session.state() != BridgeState::Uninitialized;
            session.dispose();
            was_loaded
        };
        if was_loaded {
            if let Err(e) = self.send(scripts::DISPOSE).await {
                log::debug!("disposing editor page failed: {}", e);
            }
        }
        log::debug!("editor bridge disposed");
    }
}
