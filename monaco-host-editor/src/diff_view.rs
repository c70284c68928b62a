use std::cell::{Cell, RefCell};

use monaco_host_core::config::BridgeConfig;
use monaco_host_core::deferred::DeferredProperty;
use monaco_host_core::transport;
use tokio::sync::mpsc;

use crate::assets::{self, PageOptions};
use crate::bridge::Bridge;
use crate::language::LanguageService;
use crate::options::DiffEditorOptions;
use crate::protocol::{DiffStatistics, EditorEvent, LineChange};
use crate::runtime::{decode_string, ScriptRuntime};
use crate::scripts::{self, TextTarget};
use crate::session::{BridgeState, LoadingOverlay};

/// Host-facing handle for an embedded side-by-side diff editor.
///
/// Same lifecycle as [`EditorView`](crate::EditorView), with two text slots.
/// Replay order on ready: options, theme, language, original, modified.
pub struct DiffView<R: ScriptRuntime> {
    bridge: Bridge<R>,
    original: RefCell<DeferredProperty<String>>,
    modified: RefCell<DeferredProperty<String>>,
    options: RefCell<DiffEditorOptions>,
    options_dirty: Cell<bool>,
    line_changes: RefCell<Vec<LineChange>>,
}

impl<R: ScriptRuntime> DiffView<R> {
    pub fn new(
        runtime: R,
        config: BridgeConfig,
        event_tx: mpsc::UnboundedSender<EditorEvent>,
    ) -> Self {
        DiffView {
            bridge: Bridge::new(runtime, config, event_tx),
            original: RefCell::new(DeferredProperty::new()),
            modified: RefCell::new(DeferredProperty::new()),
            options: RefCell::new(DiffEditorOptions::default()),
            options_dirty: Cell::new(false),
            line_changes: RefCell::new(Vec::new()),
        }
    }

    pub fn runtime(&self) -> &R {
        self.bridge.runtime()
    }

    pub fn state(&self) -> BridgeState {
        self.bridge.state()
    }

    pub fn overlay(&self) -> LoadingOverlay {
        self.bridge.overlay()
    }

    pub fn is_ready(&self) -> bool {
        self.bridge.is_ready()
    }

    pub fn languages(&self) -> LanguageService<'_, R> {
        LanguageService::new(&self.bridge)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn page_html(&self) -> String {
        let page = PageOptions::new(
            self.bridge.config(),
            &self.bridge.language(),
            &self.bridge.theme(),
            serde_json::to_value(&*self.options.borrow()).unwrap_or_default(),
        );
        assets::render_diff_page(&page)
    }

    pub fn load(&self) -> bool {
        let html = self.page_html();
        self.bridge
            .load(&html, &self.bridge.config().diff_loading_message)
    }

    pub async fn on_navigated(&self, success: bool) -> bool {
        if !self.bridge.await_ready(success).await {
            return false;
        }
        self.options_dirty.set(true);
        self.replay_cached().await;
        self.bridge.finish_ready()
    }

    async fn apply_cached_options(&self) {
        let options = self.options.borrow().clone();
        if options.is_empty() {
            return;
        }
        if let Err(e) = self
            .bridge
            .send(&scripts::update_diff_options(&options.to_json()))
            .await
        {
            log::warn!("applying cached diff options failed: {}", e);
        }
    }

    async fn replay_cached(&self) {
        loop {
            let options = self.options_dirty.replace(false);
            let (theme, language) = self.bridge.take_pending_style();
            let original = self.original.borrow_mut().flush();
            let modified = self.modified.borrow_mut().flush();
            if !options
                && theme.is_none()
                && language.is_none()
                && original.is_none()
                && modified.is_none()
            {
                break;
            }
            if options {
                self.apply_cached_options().await;
            }
            if let Some(theme) = theme {
                self.bridge.apply_theme(&theme).await;
            }
            if let Some(language) = language {
                self.bridge.apply_language(&language).await;
            }
            if let Some(original) = original {
                self.apply_text(TextTarget::Original, &original).await;
            }
            if let Some(modified) = modified {
                self.apply_text(TextTarget::Modified, &modified).await;
            }
        }
    }

    pub async fn dispose(&self) {
        self.bridge.dispose().await;
        self.original.borrow_mut().clear();
        self.modified.borrow_mut().clear();
        self.line_changes.borrow_mut().clear();
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    fn slot(&self, target: TextTarget) -> &RefCell<DeferredProperty<String>> {
        match target {
            TextTarget::Original => &self.original,
            _ => &self.modified,
        }
    }

    async fn set_text(&self, target: TextTarget, text: &str) -> bool {
        if self.bridge.state().is_terminal() {
            return false;
        }
        let ready = self.bridge.is_ready();
        let to_apply = self.slot(target).borrow_mut().write(text.to_string(), ready);
        match to_apply {
            Some(text) => self.apply_text(target, &text).await,
            None => {
                log::debug!(
                    "diff editor not ready, caching {} text ({} chars)",
                    target,
                    text.len()
                );
                true
            }
        }
    }

    async fn apply_text(&self, target: TextTarget, text: &str) -> bool {
        let cleaned = transport::clean(text);
        if self.bridge.push_text(target, &cleaned).await {
            return true;
        }
        log::warn!(
            "every encoding failed to set the {} text, keeping it cached ({} chars)",
            target,
            text.len()
        );
        false
    }

    pub async fn set_original(&self, text: &str) -> bool {
        self.set_text(TextTarget::Original, text).await
    }

    pub async fn set_modified(&self, text: &str) -> bool {
        self.set_text(TextTarget::Modified, text).await
    }

    /// Set both sides. Both are attempted even if the first fails.
    pub async fn set_models(&self, original: &str, modified: &str) -> bool {
        let original_ok = self.set_original(original).await;
        let modified_ok = self.set_modified(modified).await;
        original_ok && modified_ok
    }

    async fn get_text(&self, target: TextTarget) -> String {
        if self.bridge.is_ready() {
            if let Some(text) = self
                .bridge
                .query(&scripts::get_text(target))
                .await
                .and_then(|raw| decode_string(&raw))
            {
                self.slot(target).borrow_mut().store(text.clone());
                return text;
            }
        }
        self.cached(target)
    }

    fn cached(&self, target: TextTarget) -> String {
        self.slot(target)
            .borrow()
            .get()
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get_original_value(&self) -> String {
        self.get_text(TextTarget::Original).await
    }

    pub async fn get_modified_value(&self) -> String {
        self.get_text(TextTarget::Modified).await
    }

    pub fn original(&self) -> String {
        self.cached(TextTarget::Original)
    }

    pub fn modified(&self) -> String {
        self.cached(TextTarget::Modified)
    }

    pub async fn set_language(&self, language: &str) -> bool {
        self.bridge.set_language(language).await
    }

    pub fn language(&self) -> String {
        self.bridge.language()
    }

    pub async fn set_theme(&self, theme: &str) -> bool {
        self.bridge.set_theme(theme).await
    }

    pub fn theme(&self) -> String {
        self.bridge.theme()
    }

    // -----------------------------------------------------------------------
    // Options
    // -----------------------------------------------------------------------

    pub fn options(&self) -> DiffEditorOptions {
        self.options.borrow().clone()
    }

    /// Replace the stored options and push them to the diff editor.
    pub async fn update_options(&self, options: DiffEditorOptions) -> bool {
        let json = options.to_json();
        *self.options.borrow_mut() = options;
        self.push_options(json).await
    }

    async fn push_options(&self, json: String) -> bool {
        if !self.bridge.is_ready() {
            if self.bridge.state().is_terminal() {
                return false;
            }
            log::debug!("diff editor not ready, caching options");
            self.options_dirty.set(true);
            return true;
        }
        self.bridge.command(&scripts::update_diff_options(&json)).await
    }

    async fn change_option(&self, change: impl FnOnce(&mut DiffEditorOptions)) -> bool {
        let mut delta = DiffEditorOptions::default();
        change(&mut delta);
        change_into(&mut self.options.borrow_mut(), &delta);
        self.push_options(delta.to_json()).await
    }

    pub async fn set_read_only(&self, read_only: bool) -> bool {
        self.change_option(|o| o.editor.read_only = Some(read_only))
            .await
    }

    pub fn read_only(&self) -> bool {
        self.options.borrow().editor.read_only.unwrap_or(false)
    }

    pub async fn set_render_side_by_side(&self, side_by_side: bool) -> bool {
        self.change_option(|o| o.render_side_by_side = Some(side_by_side))
            .await
    }

    pub fn render_side_by_side(&self) -> bool {
        self.options.borrow().render_side_by_side.unwrap_or(true)
    }

    pub async fn set_ignore_trim_whitespace(&self, ignore: bool) -> bool {
        self.change_option(|o| o.ignore_trim_whitespace = Some(ignore))
            .await
    }

    pub fn ignore_trim_whitespace(&self) -> bool {
        self.options.borrow().ignore_trim_whitespace.unwrap_or(true)
    }

    pub async fn layout(&self, size: Option<(u32, u32)>) -> bool {
        self.bridge.command(&scripts::layout(size)).await
    }

    // -----------------------------------------------------------------------
    // Diff results
    // -----------------------------------------------------------------------

    /// Current change blocks, from the editor when ready, otherwise the last
    /// `DiffUpdated` payload.
    pub async fn get_line_changes(&self) -> Vec<LineChange> {
        if let Some(changes) = self
            .bridge
            .query_json::<Vec<LineChange>>(&scripts::get_line_changes())
            .await
        {
            *self.line_changes.borrow_mut() = changes.clone();
            return changes;
        }
        self.line_changes.borrow().clone()
    }

    pub async fn get_diff_statistics(&self) -> DiffStatistics {
        DiffStatistics::from_line_changes(&self.get_line_changes().await)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn handle_message(&self, json: &str) -> Option<EditorEvent> {
        let event = self.bridge.parse_message(json)?;
        match &event {
            EditorEvent::DiffUpdated { changes } => {
                *self.line_changes.borrow_mut() = changes.clone();
            }
            EditorEvent::OriginalChanged { value } => self.original.borrow_mut().store(value.clone()),
            EditorEvent::ModifiedChanged { value } => self.modified.borrow_mut().store(value.clone()),
            EditorEvent::ModelLanguageChanged { new_language, .. } => {
                self.bridge.store_language(new_language)
            }
            _ => {}
        }
        self.bridge.emit(event.clone());
        Some(event)
    }

    pub async fn drain_events(&self) -> usize {
        self.bridge
            .drain_outbox()
            .await
            .iter()
            .filter(|json| self.handle_message(json).is_some())
            .count()
    }
}

/// Copy every option set in `delta` onto `options`.
fn change_into(options: &mut DiffEditorOptions, delta: &DiffEditorOptions) {
    if delta.render_side_by_side.is_some() {
        options.render_side_by_side = delta.render_side_by_side;
    }
    if delta.ignore_trim_whitespace.is_some() {
        options.ignore_trim_whitespace = delta.ignore_trim_whitespace;
    }
    if delta.editor.read_only.is_some() {
        options.editor.read_only = delta.editor.read_only;
    }
}
