use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use monaco_host_core::config::BridgeConfig;
use monaco_host_core::deferred::DeferredProperty;
use monaco_host_core::transport;
use monaco_host_core::util::language_for_path;
use tokio::sync::mpsc;

use crate::assets::{self, PageOptions};
use crate::bridge::Bridge;
use crate::language::LanguageService;
use crate::options::{EditorOptions, WordWrap};
use crate::protocol::{
    ActionDescriptor, EditorEvent, IdentifiedSingleEditOperation, MarkerData, ModelDecoration,
    ModelDeltaDecoration, ModelInfo, Position, Range, ScrollType, Selection, SupportedAction,
};
use crate::runtime::{decode_string, ScriptRuntime};
use crate::scripts::{self, Reveal, TextTarget};
use crate::session::{BridgeState, LoadingOverlay};

/// Callback for host-registered commands and actions.
pub type CommandHandler = Rc<dyn Fn()>;

const TRIGGER_SOURCE: &str = "monaco-host";

/// Host-facing handle for one embedded Monaco code editor.
///
/// Writes made before the editor is ready are cached and replayed once the
/// readiness handshake completes (theme, then language, then content).
/// Queries made before then answer from the cache. Methods never panic on
/// runtime failures: they log and report `false`/`None`.
pub struct EditorView<R: ScriptRuntime> {
    bridge: Bridge<R>,
    value: RefCell<DeferredProperty<String>>,
    read_only: Cell<bool>,
    options: RefCell<EditorOptions>,
    /// Options changed while not ready and not yet sent.
    options_dirty: Cell<bool>,
    decorations: RefCell<Vec<String>>,
    handlers: RefCell<HashMap<String, CommandHandler>>,
}

impl<R: ScriptRuntime> EditorView<R> {
    pub fn new(
        runtime: R,
        config: BridgeConfig,
        event_tx: mpsc::UnboundedSender<EditorEvent>,
    ) -> Self {
        EditorView {
            bridge: Bridge::new(runtime, config, event_tx),
            value: RefCell::new(DeferredProperty::new()),
            read_only: Cell::new(false),
            options: RefCell::new(EditorOptions::default()),
            options_dirty: Cell::new(false),
            decorations: RefCell::new(Vec::new()),
            handlers: RefCell::new(HashMap::new()),
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

    pub fn retry_count(&self) -> u32 {
        self.bridge.retry_count()
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
        assets::render_editor_page(&page)
    }

    /// Render the editor page and hand it to the runtime.
    pub fn load(&self) -> bool {
        let html = self.page_html();
        self.bridge
            .load(&html, &self.bridge.config().loading_message)
    }

    /// Drive the readiness handshake after the runtime finished navigating.
    /// Returns `true` once the editor is ready and cached writes are applied.
    pub async fn on_navigated(&self, success: bool) -> bool {
        if !self.bridge.await_ready(success).await {
            return false;
        }
        self.options_dirty.set(true);
        self.replay_cached().await;
        self.bridge.finish_ready()
    }

    async fn apply_cached_options(&self) {
        let mut options = self.options.borrow().clone();
        if options.read_only.is_none() && self.read_only.get() {
            options.read_only = Some(true);
        }
        if options.is_empty() {
            return;
        }
        if let Err(e) = self
            .bridge
            .send(&scripts::update_options(&options.to_json()))
            .await
        {
            log::warn!("applying cached editor options failed: {}", e);
        }
    }

    /// Apply options, theme, language and content until a pass finds nothing
    /// left. Writes made while a pass is awaiting land in the next pass.
    async fn replay_cached(&self) {
        loop {
            let options = self.options_dirty.replace(false);
            let (theme, language) = self.bridge.take_pending_style();
            let value = self.value.borrow_mut().flush();
            if !options && theme.is_none() && language.is_none() && value.is_none() {
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
            if let Some(value) = value {
                self.apply_value(&value).await;
            }
        }
    }

    pub async fn dispose(&self) {
        self.bridge.dispose().await;
        self.value.borrow_mut().clear();
        self.decorations.borrow_mut().clear();
        self.handlers.borrow_mut().clear();
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Set the editor text. Before readiness the text is cached and `true`
    /// is returned. When every encoding is rejected the text stays cached and
    /// `false` is returned.
    pub async fn set_value(&self, text: &str) -> bool {
        if self.bridge.state().is_terminal() {
            return false;
        }
        let ready = self.bridge.is_ready();
        let to_apply = self.value.borrow_mut().write(text.to_string(), ready);
        match to_apply {
            Some(text) => self.apply_value(&text).await,
            None => {
                log::debug!("editor not ready, caching value ({} chars)", text.len());
                true
            }
        }
    }

    async fn apply_value(&self, text: &str) -> bool {
        let prepared = if self.bridge.config().detect_base64_content {
            transport::sniff_base64(text)
        } else {
            text.to_string()
        };
        let cleaned = transport::clean(&prepared);
        if self.bridge.push_text(TextTarget::Value, &cleaned).await {
            return true;
        }
        log::warn!(
            "every encoding failed to set the editor value, keeping it cached ({} chars)",
            text.len()
        );
        false
    }

    /// Current text, read from the editor when ready.
    pub async fn get_value(&self) -> String {
        if self.bridge.is_ready() {
            if let Some(text) = self
                .bridge
                .query(&scripts::get_text(TextTarget::Value))
                .await
                .and_then(|raw| decode_string(&raw))
            {
                self.value.borrow_mut().store(text.clone());
                return text;
            }
        }
        self.value()
    }

    /// Last known text, without asking the editor.
    pub fn value(&self) -> String {
        self.value.borrow().get().cloned().unwrap_or_default()
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

    pub async fn set_read_only(&self, read_only: bool) -> bool {
        self.read_only.set(read_only);
        self.options.borrow_mut().read_only = Some(read_only);
        if !self.bridge.is_ready() {
            return self.defer_options();
        }
        self.bridge.command(&scripts::set_read_only(read_only)).await
    }

    pub fn read_only(&self) -> bool {
        self.read_only.get()
    }

    /// Replace the stored options with `options` and push them to the
    /// editor. Fields left `None` keep whatever the editor currently has.
    pub async fn update_options(&self, options: EditorOptions) -> bool {
        if let Some(read_only) = options.read_only {
            self.read_only.set(read_only);
        }
        let json = options.to_json();
        *self.options.borrow_mut() = options;
        if !self.bridge.is_ready() {
            return self.defer_options();
        }
        self.bridge.command(&scripts::update_options(&json)).await
    }

    fn defer_options(&self) -> bool {
        if self.bridge.state().is_terminal() {
            return false;
        }
        log::debug!("editor not ready, caching options");
        self.options_dirty.set(true);
        true
    }

    pub fn options(&self) -> EditorOptions {
        self.options.borrow().clone()
    }

    /// Flip word wrap on top of the current stored options.
    pub async fn toggle_word_wrap(&self) -> bool {
        let next = match self.options.borrow().word_wrap {
            Some(WordWrap::Off) | None => WordWrap::On,
            Some(_) => WordWrap::Off,
        };
        let options = EditorOptions {
            word_wrap: Some(next),
            ..self.options()
        };
        self.update_options(options).await
    }

    // -----------------------------------------------------------------------
    // Model
    // -----------------------------------------------------------------------

    pub async fn get_model(&self) -> Option<ModelInfo> {
        self.bridge.query_json(&scripts::get_model()).await
    }

    /// Replace the editor model. Without a `uri` an in-memory one is made up;
    /// without a `language` it is derived from the uri path.
    pub async fn set_model(&self, text: &str, language: Option<&str>, uri: Option<&str>) -> bool {
        let uri = match uri {
            Some(uri) => match url::Url::parse(uri) {
                Ok(_) => uri.to_string(),
                Err(e) => {
                    log::warn!("invalid model uri {}: {}", uri, e);
                    return false;
                }
            },
            None => format!("inmemory://model/{}", uuid::Uuid::new_v4()),
        };
        let language = match language {
            Some(language) => language.to_string(),
            None => url::Url::parse(&uri)
                .map(|parsed| language_for_path(parsed.path()).to_string())
                .unwrap_or_else(|_| self.bridge.config().default_language.clone()),
        };
        let cleaned = transport::clean(text);
        if !self
            .bridge
            .command(&scripts::set_model(&cleaned, &language, &uri))
            .await
        {
            return false;
        }
        self.value.borrow_mut().store(cleaned);
        self.bridge.store_language(&language);
        self.decorations.borrow_mut().clear();
        true
    }

    pub async fn get_value_in_range(&self, range: &Range) -> Option<String> {
        self.bridge
            .query_json(&scripts::get_value_in_range(range))
            .await
    }

    pub async fn get_line_content(&self, line_number: u32) -> Option<String> {
        self.bridge
            .query_json(&scripts::get_line_content(line_number))
            .await
    }

    pub async fn get_line_count(&self) -> u32 {
        self.bridge
            .query_json(&scripts::get_line_count())
            .await
            .unwrap_or(0)
    }

    pub async fn execute_edits(&self, source: &str, edits: &[IdentifiedSingleEditOperation]) -> bool {
        self.bridge
            .command(&scripts::execute_edits(source, edits))
            .await
    }

    // -----------------------------------------------------------------------
    // Cursor and selection
    // -----------------------------------------------------------------------

    pub async fn get_position(&self) -> Option<Position> {
        self.bridge.query_json(&scripts::get_position()).await
    }

    pub async fn set_position(&self, position: Position) -> bool {
        self.bridge.command(&scripts::set_position(&position)).await
    }

    pub async fn get_selection(&self) -> Option<Selection> {
        self.bridge.query_json(&scripts::get_selection()).await
    }

    pub async fn set_selection(&self, selection: Selection) -> bool {
        self.bridge.command(&scripts::set_selection(&selection)).await
    }

    pub async fn get_selections(&self) -> Vec<Selection> {
        self.bridge
            .query_json(&scripts::get_selections())
            .await
            .unwrap_or_default()
    }

    pub async fn set_selections(&self, selections: &[Selection]) -> bool {
        self.bridge
            .command(&scripts::set_selections(selections))
            .await
    }

    // -----------------------------------------------------------------------
    // Decorations and markers
    // -----------------------------------------------------------------------

    /// Replace `old_ids` with `decorations`, returning the new ids.
    pub async fn delta_decorations(
        &self,
        old_ids: &[String],
        decorations: &[ModelDeltaDecoration],
    ) -> Vec<String> {
        let new_ids: Vec<String> = self
            .bridge
            .query_json(&scripts::delta_decorations(old_ids, decorations))
            .await
            .unwrap_or_default();
        let mut tracked = self.decorations.borrow_mut();
        tracked.retain(|id| !old_ids.contains(id));
        tracked.extend(new_ids.iter().cloned());
        new_ids
    }

    /// Ids of decorations added through this view and not yet removed.
    pub fn decoration_ids(&self) -> Vec<String> {
        self.decorations.borrow().clone()
    }

    pub async fn remove_all_decorations(&self) -> bool {
        let old_ids = self.decoration_ids();
        if old_ids.is_empty() {
            return true;
        }
        if !self.bridge.is_ready() {
            return false;
        }
        self.delta_decorations(&old_ids, &[]).await;
        self.decorations.borrow().is_empty()
    }

    pub async fn get_decorations_in_range(&self, range: &Range) -> Vec<ModelDecoration> {
        self.bridge
            .query_json(&scripts::get_decorations_in_range(range))
            .await
            .unwrap_or_default()
    }

    pub async fn set_model_markers(&self, owner: &str, markers: &[MarkerData]) -> bool {
        self.bridge
            .command(&scripts::set_model_markers(owner, markers))
            .await
    }

    pub async fn get_model_markers(&self, owner: Option<&str>) -> Vec<MarkerData> {
        self.bridge
            .query_json(&scripts::get_model_markers(owner))
            .await
            .unwrap_or_default()
    }

    pub async fn clear_model_markers(&self, owner: &str) -> bool {
        self.set_model_markers(owner, &[]).await
    }

    // -----------------------------------------------------------------------
    // Commands and actions
    // -----------------------------------------------------------------------

    /// Bind `keybinding` (a `KeyMod | KeyCode` chord) to `handler`.
    /// Returns the id reported back in `CommandInvoked`.
    pub async fn add_command(
        &self,
        keybinding: u32,
        context: Option<&str>,
        handler: impl Fn() + 'static,
    ) -> Option<String> {
        if !self.bridge.is_ready() {
            log::warn!("cannot add a command before the editor is ready");
            return None;
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.handlers
            .borrow_mut()
            .insert(id.clone(), Rc::new(handler));
        let registered: Option<String> = self
            .bridge
            .query_json(&scripts::add_command(&id, keybinding, context))
            .await;
        if registered.is_none() {
            self.handlers.borrow_mut().remove(&id);
            return None;
        }
        Some(id)
    }

    pub async fn add_action(
        &self,
        descriptor: ActionDescriptor,
        handler: impl Fn() + 'static,
    ) -> bool {
        if !self.bridge.is_ready() {
            log::warn!("cannot add action {} before the editor is ready", descriptor.id);
            return false;
        }
        self.handlers
            .borrow_mut()
            .insert(descriptor.id.clone(), Rc::new(handler));
        if self.bridge.command(&scripts::add_action(&descriptor)).await {
            return true;
        }
        self.handlers.borrow_mut().remove(&descriptor.id);
        false
    }

    pub async fn run_action(&self, action_id: &str) -> bool {
        self.bridge.command(&scripts::run_action(action_id)).await
    }

    pub async fn get_supported_actions(&self) -> Vec<SupportedAction> {
        self.bridge
            .query_json(&scripts::get_supported_actions())
            .await
            .unwrap_or_default()
    }

    /// `editor.trigger` with an arbitrary handler id.
    pub async fn trigger(&self, handler_id: &str, payload: Option<&serde_json::Value>) -> bool {
        self.bridge
            .command(&scripts::trigger(TRIGGER_SOURCE, handler_id, payload))
            .await
    }

    pub async fn undo(&self) -> bool {
        self.trigger("undo", None).await
    }

    pub async fn redo(&self) -> bool {
        self.trigger("redo", None).await
    }

    pub async fn find(&self) -> bool {
        self.trigger("actions.find", None).await
    }

    pub async fn replace(&self) -> bool {
        self.trigger("editor.action.startFindReplaceAction", None)
            .await
    }

    pub async fn format_document(&self) -> bool {
        self.trigger("editor.action.formatDocument", None).await
    }

    pub async fn format_selection(&self) -> bool {
        self.trigger("editor.action.formatSelection", None).await
    }

    pub async fn goto_line(&self) -> bool {
        self.trigger("editor.action.gotoLine", None).await
    }

    pub async fn toggle_line_comment(&self) -> bool {
        self.trigger("editor.action.commentLine", None).await
    }

    pub async fn select_all(&self) -> bool {
        self.trigger("editor.action.selectAll", None).await
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    pub async fn reveal_line(&self, line_number: u32, reveal: Reveal, scroll: ScrollType) -> bool {
        self.bridge
            .command(&scripts::reveal_line(line_number, reveal, scroll))
            .await
    }

    pub async fn reveal_position(&self, position: Position, reveal: Reveal, scroll: ScrollType) -> bool {
        self.bridge
            .command(&scripts::reveal_position(&position, reveal, scroll))
            .await
    }

    pub async fn reveal_range(&self, range: Range, reveal: Reveal, scroll: ScrollType) -> bool {
        self.bridge
            .command(&scripts::reveal_range(&range, reveal, scroll))
            .await
    }

    pub async fn focus(&self) -> bool {
        self.bridge.command(&scripts::focus()).await
    }

    pub async fn has_text_focus(&self) -> bool {
        self.bridge.command(&scripts::has_text_focus()).await
    }

    pub async fn layout(&self, size: Option<(u32, u32)>) -> bool {
        self.bridge.command(&scripts::layout(size)).await
    }

    pub async fn get_editor_id(&self) -> Option<String> {
        self.bridge.query_json(&scripts::get_editor_id()).await
    }

    pub async fn get_editor_type(&self) -> Option<String> {
        self.bridge.query_json(&scripts::get_editor_type()).await
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Handle one message posted by the page. The decoded event is forwarded
    /// to the event channel and returned.
    pub fn handle_message(&self, json: &str) -> Option<EditorEvent> {
        let event = self.bridge.parse_message(json)?;
        self.process_event(&event);
        self.bridge.emit(event.clone());
        Some(event)
    }

    /// Poll the page for messages it could not post. Returns how many were
    /// handled.
    pub async fn drain_events(&self) -> usize {
        self.bridge
            .drain_outbox()
            .await
            .iter()
            .filter(|json| self.handle_message(json).is_some())
            .count()
    }

    fn process_event(&self, event: &EditorEvent) {
        match event {
            EditorEvent::ContentChanged {
                value: Some(value), ..
            } => self.value.borrow_mut().store(value.clone()),
            EditorEvent::ModelLanguageChanged { new_language, .. } => {
                self.bridge.store_language(new_language)
            }
            EditorEvent::CommandInvoked { id } | EditorEvent::ActionInvoked { id } => {
                let handler = self.handlers.borrow().get(id).cloned();
                match handler {
                    Some(handler) => handler(),
                    None => log::debug!("no handler registered for {}", id),
                }
            }
            EditorEvent::LoadFailed { message } => {
                log::error!("editor page reported a load failure: {}", message)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRuntime;
    use monaco_host_core::transport::Encoding;
    use std::time::Duration;

    fn view(fake: FakeRuntime) -> (EditorView<FakeRuntime>, mpsc::UnboundedReceiver<EditorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EditorView::new(fake, BridgeConfig::default(), tx), rx)
    }

    async fn ready_view() -> (EditorView<FakeRuntime>, mpsc::UnboundedReceiver<EditorEvent>) {
        let (view, rx) = view(FakeRuntime::ready_after(1));
        assert!(view.load());
        assert!(view.on_navigated(true).await);
        (view, rx)
    }

    fn large_text() -> String {
        let mut text = String::new();
        while text.chars().count() < 10_000 {
            text.push_str("let s = \"quoted\" + 'single'; // 🎉 café 中文\n");
        }
        text
    }

    #[tokio::test(start_paused = true)]
    async fn value_cached_before_ready_is_replayed() {
        let (view, _rx) = view(FakeRuntime::ready_after(3));
        let text = large_text();

        assert!(view.load());
        assert!(view.set_value(&text).await);
        assert!(view.runtime().scripts.borrow().is_empty());

        assert!(view.on_navigated(true).await);
        assert_eq!(view.state(), BridgeState::Ready);
        assert_eq!(view.runtime().probes(), 3);
        assert_eq!(view.runtime().text("value").as_deref(), Some(text.as_str()));
        assert_eq!(view.value(), text);
    }

    #[tokio::test(start_paused = true)]
    async fn probing_gives_up_after_budget() {
        let (view, _rx) = view(FakeRuntime::never_ready());
        view.load();
        assert!(!view.on_navigated(true).await);

        assert_eq!(view.runtime().probes(), 15);
        assert_eq!(
            view.state(),
            BridgeState::Failed("Failed to load editor".to_string())
        );
        assert!(view.overlay().is_error);
        assert_eq!(view.retry_count(), 15);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(view.runtime().probes(), 15);
        assert!(!view.set_value("late").await);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_errors_count_as_not_ready() {
        let fake = FakeRuntime::ready_after(1);
        fake.set_failing(true);
        let (view, _rx) = view(fake);
        view.load();
        assert!(!view.on_navigated(true).await);
        assert_eq!(view.runtime().probes(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_navigation_never_probes() {
        let (view, _rx) = view(FakeRuntime::ready_after(1));
        view.load();
        assert!(!view.on_navigated(false).await);
        assert_eq!(view.runtime().probes(), 0);
        assert!(matches!(view.state(), BridgeState::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_navigation_is_ignored() {
        let (view, _rx) = ready_view().await;
        let probes = view.runtime().probes();
        assert!(!view.on_navigated(true).await);
        assert_eq!(view.runtime().probes(), probes);
        assert_eq!(view.state(), BridgeState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn replay_order_and_last_write_wins() {
        let (view, _rx) = view(FakeRuntime::ready_after(2));
        view.load();
        view.set_theme("vs").await;
        view.set_language("python").await;
        view.set_value("a").await;
        view.set_theme("hc-black").await;
        view.set_value("b").await;
        view.set_language("rust").await;

        assert!(view.on_navigated(true).await);
        assert_eq!(
            *view.runtime().applied.borrow(),
            vec!["theme:hc-black", "language:rust", "value:b"]
        );
        assert_eq!(view.language(), "rust");
        assert_eq!(view.theme(), "hc-black");
    }

    #[tokio::test(start_paused = true)]
    async fn primary_encoding_success_sends_no_fallback() {
        let (view, _rx) = ready_view().await;
        assert!(view.set_value("say \"hi\"").await);
        assert_eq!(view.runtime().count_containing("\"raw-escaped\""), 1);
        assert_eq!(view.runtime().count_containing("\"base64\""), 0);
        assert_eq!(view.runtime().text("value").as_deref(), Some("say \"hi\""));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_primary_falls_back_to_base64() {
        let (view, _rx) = ready_view().await;
        view.runtime().reject(Encoding::RawEscaped);
        assert!(view.set_value("fallback ✓\r\nnext").await);
        assert_eq!(view.runtime().count_containing("\"base64\""), 1);
        assert_eq!(
            view.runtime().text("value").as_deref(),
            Some("fallback ✓\nnext")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn all_encodings_rejected_keeps_value_cached() {
        let (view, _rx) = ready_view().await;
        view.runtime().reject(Encoding::RawEscaped);
        view.runtime().reject(Encoding::Base64);
        assert!(!view.set_value("stuck").await);
        assert_eq!(view.value(), "stuck");
        assert_eq!(view.runtime().text("value"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn get_value_reads_editor_when_ready() {
        let (view, _rx) = view(FakeRuntime::ready_after(1));
        view.set_value("cached").await;
        assert_eq!(view.get_value().await, "cached");

        view.load();
        view.on_navigated(true).await;
        view.runtime()
            .texts
            .borrow_mut()
            .insert("value".to_string(), "typed by user".to_string());
        assert_eq!(view.get_value().await, "typed by user");
        assert_eq!(view.value(), "typed by user");
    }

    #[tokio::test(start_paused = true)]
    async fn queries_before_ready_answer_from_cache() {
        let (view, _rx) = view(FakeRuntime::ready_after(1));
        assert_eq!(view.get_position().await, None);
        assert_eq!(view.get_line_count().await, 0);
        assert!(!view.undo().await);
        assert!(view.runtime().scripts.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn structured_queries_decode_results() {
        let (view, _rx) = ready_view().await;
        view.runtime()
            .respond("e.getPosition()", r#"{"lineNumber":4,"column":2}"#);
        view.runtime().respond("m.getLineCount())", "12");
        assert_eq!(view.get_position().await, Some(Position::new(4, 2)));
        assert_eq!(view.get_line_count().await, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn messages_update_cache_and_reach_channel() {
        let (view, mut rx) = ready_view().await;
        let event = view
            .handle_message(r#"{"type":"ContentChanged","versionId":2,"value":"edited"}"#)
            .unwrap();
        assert!(matches!(event, EditorEvent::ContentChanged { .. }));
        assert_eq!(view.value(), "edited");
        assert!(matches!(
            rx.try_recv().unwrap(),
            EditorEvent::ContentChanged { version_id: 2, .. }
        ));

        assert!(view.handle_message("{garbage").is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn command_handlers_run_on_invocation() {
        let (view, _rx) = ready_view().await;
        view.runtime().respond("h.addCommand(", r#""1""#);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = view
            .add_command(2097, None, move || counter.set(counter.get() + 1))
            .await
            .unwrap();

        let message = serde_json::json!({ "type": "CommandInvoked", "id": id }).to_string();
        view.handle_message(&message);
        view.handle_message(&message);
        assert_eq!(hits.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_events_handles_outbox() {
        let (view, mut rx) = ready_view().await;
        view.runtime()
            .outbox
            .borrow_mut()
            .push(r#"{"type":"FocusEditorText"}"#.to_string());
        assert_eq!(view.drain_events().await, 1);
        assert_eq!(rx.try_recv().unwrap(), EditorEvent::FocusEditorText);
    }

    #[tokio::test(start_paused = true)]
    async fn decorations_are_tracked() {
        let (view, _rx) = ready_view().await;
        view.runtime()
            .respond("e.deltaDecorations([], ", r#"["d1","d2"]"#);
        view.runtime()
            .respond(r#"e.deltaDecorations(["d1","d2"], []"#, "[]");
        let decoration = ModelDeltaDecoration {
            range: Range::line(3),
            options: Default::default(),
        };
        let ids = view
            .delta_decorations(&[], &[decoration.clone(), decoration])
            .await;
        assert_eq!(ids, vec!["d1", "d2"]);
        assert_eq!(view.decoration_ids(), vec!["d1", "d2"]);
        assert!(view.remove_all_decorations().await);
        assert!(view.decoration_ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_model_rejects_invalid_uri() {
        let (view, _rx) = ready_view().await;
        let sent = view.runtime().scripts.borrow().len();
        assert!(!view.set_model("x", None, Some("not a uri")).await);
        assert_eq!(view.runtime().scripts.borrow().len(), sent);

        view.runtime().respond("h.setModel(", "success");
        assert!(view.set_model("fn main() {}", None, Some("file:///src/main.rs")).await);
        assert_eq!(view.language(), "rust");
        assert_eq!(view.value(), "fn main() {}");
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_everything() {
        let (view, mut rx) = ready_view().await;
        view.dispose().await;
        assert_eq!(view.state(), BridgeState::Disposed);
        assert_eq!(view.runtime().count_containing("h.dispose()"), 1);
        assert!(!view.set_value("after").await);
        assert!(view.handle_message(r#"{"type":"FocusEditorText"}"#).is_none());
        assert!(rx.try_recv().is_err());

        view.dispose().await;
        assert_eq!(view.runtime().count_containing("h.dispose()"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn read_only_and_options_applied_on_ready() {
        let (view, _rx) = view(FakeRuntime::ready_after(1));
        view.load();
        assert!(view.set_read_only(true).await);
        view.update_options(EditorOptions {
            tab_size: Some(2),
            ..Default::default()
        })
        .await;
        view.on_navigated(true).await;
        let scripts = view.runtime().scripts.borrow();
        let update = scripts
            .iter()
            .find(|s| s.contains("e.updateOptions("))
            .unwrap();
        assert!(update.contains(r#""readOnly":true"#));
        assert!(update.contains(r#""tabSize":2"#));
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_page_carries_initial_settings() {
        let (view, _rx) = view(FakeRuntime::ready_after(1));
        view.set_language("rust").await;
        assert!(view.load());
        assert!(!view.load());
        let loaded = view.runtime().loaded.borrow();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].contains(r#""language":"rust""#));
        assert_eq!(view.overlay().message, "Loading Monaco Editor...");
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        while !done() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn read_only_written_during_replay_reaches_editor() {
        let fake = FakeRuntime::ready_after(1);
        fake.set_latency(Duration::from_millis(10));
        let (view, _rx) = view(fake);
        view.load();
        view.set_theme("hc-black").await;

        let late = async {
            wait_until(|| view.runtime().count_containing("h.setTheme(") > 0).await;
            assert!(!view.is_ready());
            assert!(view.set_read_only(true).await);
        };
        let (ready, ()) = tokio::join!(view.on_navigated(true), late);

        assert!(ready);
        assert!(view.read_only());
        assert_eq!(view.runtime().count_containing(r#""readOnly":true"#), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn theme_written_during_replay_is_applied() {
        let fake = FakeRuntime::ready_after(1);
        fake.set_latency(Duration::from_millis(10));
        let (view, _rx) = view(fake);
        view.load();
        view.set_value("a").await;

        let late = async {
            wait_until(|| view.runtime().count_containing("h.setText(") > 0).await;
            assert!(view.set_theme("vs").await);
        };
        let (ready, ()) = tokio::join!(view.on_navigated(true), late);

        assert!(ready);
        assert_eq!(*view.runtime().applied.borrow(), vec!["value:a", "theme:vs"]);
        assert_eq!(view.theme(), "vs");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_writes_are_serialized_in_order() {
        let (view, _rx) = ready_view().await;
        view.runtime().set_latency(Duration::from_millis(10));

        let (first, second) = tokio::join!(view.set_value("first"), view.set_value("second"));

        assert!(first && second);
        assert_eq!(
            *view.runtime().applied.borrow(),
            vec!["value:first", "value:second"]
        );
        assert_eq!(view.runtime().text("value").as_deref(), Some("second"));
        assert_eq!(view.runtime().max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_during_readiness_wait_stops_polling() {
        let (view, _rx) = view(FakeRuntime::never_ready());
        view.load();
        let start = tokio::time::Instant::now();

        let stop = async {
            wait_until(|| view.runtime().probes() >= 3).await;
            view.dispose().await;
        };
        let (ready, ()) = tokio::join!(view.on_navigated(true), stop);

        assert!(!ready);
        assert_eq!(view.state(), BridgeState::Disposed);
        assert_eq!(view.runtime().probes(), 3);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
