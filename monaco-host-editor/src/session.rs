use monaco_host_core::config::BridgeConfig;
use monaco_host_core::deferred::DeferredProperty;

/// Lifecycle of one embedded editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    NavigationPending,
    ProbingReadiness,
    Ready,
    /// Terminal: navigation failed or readiness was never reached.
    Failed(String),
    /// Terminal: the host disposed the control.
    Disposed,
}

impl BridgeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgeState::Failed(_) | BridgeState::Disposed)
    }
}

/// What the host should draw over the webview while it is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOverlay {
    pub visible: bool,
    pub message: String,
    pub is_error: bool,
}

impl LoadingOverlay {
    fn hidden() -> Self {
        LoadingOverlay {
            visible: false,
            message: String::new(),
            is_error: false,
        }
    }

    fn show(message: impl Into<String>) -> Self {
        LoadingOverlay {
            visible: true,
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        LoadingOverlay {
            visible: true,
            message: message.into(),
            is_error: true,
        }
    }
}

/// Per-control bridge state shared by the editor and diff views: lifecycle,
/// overlay, probe progress and the cached language/theme.
#[derive(Debug, Clone)]
pub struct BridgeSession {
    state: BridgeState,
    overlay: LoadingOverlay,
    retry_count: u32,
    pub language: DeferredProperty<String>,
    pub theme: DeferredProperty<String>,
}

impl BridgeSession {
    pub fn new(language: &str, theme: &str) -> Self {
        BridgeSession {
            state: BridgeState::Uninitialized,
            overlay: LoadingOverlay::hidden(),
            retry_count: 0,
            language: DeferredProperty::with_value(language.to_string()),
            theme: DeferredProperty::with_value(theme.to_string()),
        }
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    pub fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    /// Probe attempts that have failed so far.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn begin_navigation(&mut self, loading_message: &str) -> bool {
        if self.state != BridgeState::Uninitialized {
            log::warn!("ignoring navigation request in state {:?}", self.state);
            return false;
        }
        self.state = BridgeState::NavigationPending;
        self.overlay = LoadingOverlay::show(loading_message);
        true
    }

    /// Record the navigation result. Returns `true` when probing should
    /// start; a duplicate or late notification returns `false`.
    pub fn navigation_completed(&mut self, success: bool, config: &BridgeConfig) -> bool {
        if self.state != BridgeState::NavigationPending {
            log::debug!("ignoring navigation completion in state {:?}", self.state);
            return false;
        }
        if !success {
            log::error!("editor page failed to load");
            self.fail(&config.failure_message);
            return false;
        }
        self.state = BridgeState::ProbingReadiness;
        self.retry_count = 0;
        self.overlay = LoadingOverlay::show(&config.initializing_message);
        true
    }

    /// Record a failed probe and update the progress text.
    pub fn probe_failed(&mut self, attempts: u32, max_attempts: u32, config: &BridgeConfig) {
        if self.state != BridgeState::ProbingReadiness {
            return;
        }
        self.retry_count = attempts;
        self.overlay = LoadingOverlay::show(format!(
            "{} ({}/{})",
            config.initializing_message, attempts, max_attempts
        ));
    }

    pub fn mark_ready(&mut self) -> bool {
        if self.state != BridgeState::ProbingReadiness {
            return false;
        }
        self.state = BridgeState::Ready;
        self.overlay = LoadingOverlay::hidden();
        true
    }

    pub fn fail(&mut self, message: &str) {
        if self.state.is_terminal() {
            return;
        }
        self.state = BridgeState::Failed(message.to_string());
        self.overlay = LoadingOverlay::error(message);
    }

    pub fn dispose(&mut self) {
        self.state = BridgeState::Disposed;
        self.overlay = LoadingOverlay::hidden();
        self.language.clear();
        self.theme.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let config = BridgeConfig::default();
        let mut session = BridgeSession::new("rust", "vs");
        assert_eq!(session.state(), &BridgeState::Uninitialized);

        assert!(session.begin_navigation(&config.loading_message));
        assert!(session.overlay().visible);
        assert_eq!(session.overlay().message, "Loading Monaco Editor...");

        assert!(session.navigation_completed(true, &config));
        session.probe_failed(2, 15, &config);
        assert_eq!(session.overlay().message, "Initializing editor... (2/15)");
        assert_eq!(session.retry_count(), 2);

        assert!(session.mark_ready());
        assert!(session.is_ready());
        assert!(!session.overlay().visible);
    }

    #[test]
    fn duplicate_navigation_completion_is_ignored() {
        let config = BridgeConfig::default();
        let mut session = BridgeSession::new("rust", "vs");
        session.begin_navigation("loading");
        assert!(session.navigation_completed(true, &config));
        assert!(!session.navigation_completed(true, &config));
        assert_eq!(session.state(), &BridgeState::ProbingReadiness);
    }

    #[test]
    fn failed_navigation_shows_error() {
        let config = BridgeConfig::default();
        let mut session = BridgeSession::new("rust", "vs");
        session.begin_navigation("loading");
        assert!(!session.navigation_completed(false, &config));
        assert_eq!(
            session.state(),
            &BridgeState::Failed("Failed to load editor".to_string())
        );
        assert!(session.overlay().is_error);
        assert!(!session.mark_ready());
    }

    #[test]
    fn dispose_is_terminal() {
        let mut session = BridgeSession::new("rust", "vs");
        session.dispose();
        assert!(!session.begin_navigation("loading"));
        session.fail("late failure");
        assert_eq!(session.state(), &BridgeState::Disposed);
        assert_eq!(session.language.get(), None);
    }
}
