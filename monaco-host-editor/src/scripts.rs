//! Command strings evaluated in the page.
//!
//! Every argument is spliced as a JSON literal, so builders never need to
//! worry about quoting. Queries return `JSON.stringify(...)` output (or
//! `null` when the editor is gone), actions return `true`/`false`.

use monaco_host_core::transport::{js_string, EncodedPayload, Encoding};
use serde::Serialize;

use crate::protocol::{
    ActionDescriptor, IdentifiedSingleEditOperation, MarkerData, ModelDeltaDecoration, Position,
    Range, ScrollType, Selection,
};

/// Side-effect-free readiness check. Evaluates to `true` once the editor and
/// its model exist.
pub const PROBE: &str =
    "(function () { return !!(window.monacoHost && window.monacoHost.isReady()); })()";

pub const DRAIN_EVENTS: &str =
    "(function () { var h = window.monacoHost; return h ? h.drainEvents() : '[]'; })()";

pub const DISPOSE: &str =
    "(function () { var h = window.monacoHost; return h ? h.dispose() : 'success'; })()";

/// Which text model a `setText`/`getText` call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Value,
    Original,
    Modified,
}

impl TextTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            TextTarget::Value => "value",
            TextTarget::Original => "original",
            TextTarget::Modified => "modified",
        }
    }
}

impl std::fmt::Display for TextTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize `value` as a JavaScript expression.
pub fn js_value<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"),
        Err(e) => {
            log::warn!("Failed to serialize script argument: {}", e);
            "null".to_string()
        }
    }
}

/// Wrap `body` so it runs against the active code editor, evaluating to
/// `null` when there is none. `body` must `return` its result.
fn with_editor(body: &str) -> String {
    format!(
        "(function () {{ var h = window.monacoHost; var e = h && h.activeEditor(); \
         if (!e) {{ return null; }} {} }})()",
        body
    )
}

/// Like [`with_editor`] with the editor's model bound to `m`.
fn with_model(body: &str) -> String {
    with_editor(&format!(
        "var m = e.getModel(); if (!m) {{ return null; }} {}",
        body
    ))
}

fn host_call(call: &str) -> String {
    format!(
        "(function () {{ var h = window.monacoHost; if (!h) {{ return 'error: bridge missing'; }} return {}; }})()",
        call
    )
}

// ---------------------------------------------------------------------------
// Core properties
// ---------------------------------------------------------------------------

pub fn set_text(target: TextTarget, payload: &EncodedPayload) -> String {
    let body = match payload.encoding {
        Encoding::RawEscaped => format!("\"{}\"", payload.body),
        Encoding::Base64 => format!("'{}'", payload.body),
    };
    let encoding = match payload.encoding {
        Encoding::RawEscaped => "raw-escaped",
        Encoding::Base64 => "base64",
    };
    host_call(&format!(
        "h.setText(\"{}\", \"{}\", {})",
        target.as_str(),
        encoding,
        body
    ))
}

pub fn get_text(target: TextTarget) -> String {
    format!(
        "(function () {{ var h = window.monacoHost; return h ? JSON.stringify(h.getText(\"{}\")) : null; }})()",
        target.as_str()
    )
}

pub fn set_language(language: &str) -> String {
    host_call(&format!("h.setLanguage({})", js_string(language)))
}

pub fn set_theme(theme: &str) -> String {
    host_call(&format!("h.setTheme({})", js_string(theme)))
}

pub fn update_options(options_json: &str) -> String {
    with_editor(&format!("e.updateOptions({}); return true;", options_json))
}

pub fn update_diff_options(options_json: &str) -> String {
    host_call(&format!("h.updateDiffOptions({})", options_json))
}

pub fn set_read_only(read_only: bool) -> String {
    with_editor(&format!(
        "e.updateOptions({{ readOnly: {} }}); return true;",
        read_only
    ))
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

pub fn get_model() -> String {
    with_model(
        "return JSON.stringify({ uri: m.uri.toString(), languageId: m.getLanguageId(), \
         versionId: m.getVersionId(), lineCount: m.getLineCount(), eol: m.getEOL() });",
    )
}

pub fn set_model(text: &str, language: &str, uri: &str) -> String {
    host_call(&format!(
        "h.setModel({}, {}, {})",
        js_string(text),
        js_string(language),
        js_string(uri)
    ))
}

pub fn get_value_in_range(range: &Range) -> String {
    with_model(&format!(
        "return JSON.stringify(m.getValueInRange({}));",
        js_value(range)
    ))
}

pub fn get_line_content(line_number: u32) -> String {
    with_model(&format!(
        "if ({0} < 1 || {0} > m.getLineCount()) {{ return null; }} return JSON.stringify(m.getLineContent({0}));",
        line_number
    ))
}

pub fn get_line_count() -> String {
    with_model("return JSON.stringify(m.getLineCount());")
}

// ---------------------------------------------------------------------------
// Cursor and selection
// ---------------------------------------------------------------------------

pub fn get_position() -> String {
    with_editor("return JSON.stringify(e.getPosition());")
}

pub fn set_position(position: &Position) -> String {
    with_editor(&format!("e.setPosition({}); return true;", js_value(position)))
}

pub fn get_selection() -> String {
    with_editor("return JSON.stringify(e.getSelection());")
}

pub fn get_selections() -> String {
    with_editor("return JSON.stringify(e.getSelections() || []);")
}

pub fn set_selection(selection: &Selection) -> String {
    with_editor(&format!("e.setSelection({}); return true;", js_value(selection)))
}

pub fn set_selections(selections: &[Selection]) -> String {
    with_editor(&format!(
        "e.setSelections({}); return true;",
        js_value(selections)
    ))
}

pub fn execute_edits(source: &str, edits: &[IdentifiedSingleEditOperation]) -> String {
    with_editor(&format!(
        "return e.executeEdits({}, {}) === true;",
        js_string(source),
        js_value(edits)
    ))
}

// ---------------------------------------------------------------------------
// Decorations and markers
// ---------------------------------------------------------------------------

pub fn delta_decorations(old_ids: &[String], decorations: &[ModelDeltaDecoration]) -> String {
    with_editor(&format!(
        "return JSON.stringify(e.deltaDecorations({}, {}));",
        js_value(old_ids),
        js_value(decorations)
    ))
}

pub fn get_decorations_in_range(range: &Range) -> String {
    with_model(&format!(
        "return JSON.stringify((m.getDecorationsInRange({}) || []).map(function (d) {{ \
         var o = d.options || {{}}; \
         return {{ id: d.id, ownerId: d.ownerId, range: d.range, options: {{ \
         className: o.className || undefined, inlineClassName: o.inlineClassName || undefined, \
         glyphMarginClassName: o.glyphMarginClassName || undefined, \
         isWholeLine: o.isWholeLine || undefined }} }}; }}));",
        js_value(range)
    ))
}

pub fn set_model_markers(owner: &str, markers: &[MarkerData]) -> String {
    with_model(&format!(
        "monaco.editor.setModelMarkers(m, {}, {}); return true;",
        js_string(owner),
        js_value(markers)
    ))
}

pub fn get_model_markers(owner: Option<&str>) -> String {
    let owner = owner.map_or_else(|| "undefined".to_string(), js_string);
    with_model(&format!(
        "return JSON.stringify(monaco.editor.getModelMarkers({{ resource: m.uri, owner: {} }}).map(function (k) {{ \
         return {{ severity: k.severity, message: k.message, \
         startLineNumber: k.startLineNumber, startColumn: k.startColumn, \
         endLineNumber: k.endLineNumber, endColumn: k.endColumn, \
         code: typeof k.code === 'string' ? k.code : (k.code && k.code.value) || undefined, \
         source: k.source || undefined, tags: k.tags || [] }}; }}));",
        owner
    ))
}

// ---------------------------------------------------------------------------
// Commands and actions
// ---------------------------------------------------------------------------

pub fn add_command(id: &str, keybinding: u32, context: Option<&str>) -> String {
    let context = context.map_or_else(|| "null".to_string(), js_string);
    format!(
        "(function () {{ var h = window.monacoHost; return h ? JSON.stringify(h.addCommand({}, {}, {})) : null; }})()",
        js_string(id),
        keybinding,
        context
    )
}

pub fn add_action(descriptor: &ActionDescriptor) -> String {
    host_call(&format!("h.addAction({})", js_value(descriptor)))
}

pub fn trigger(source: &str, handler_id: &str, payload: Option<&serde_json::Value>) -> String {
    let payload = payload.map_or_else(|| "null".to_string(), js_value);
    with_editor(&format!(
        "e.trigger({}, {}, {}); return true;",
        js_string(source),
        js_string(handler_id),
        payload
    ))
}

pub fn run_action(action_id: &str) -> String {
    with_editor(&format!(
        "var a = e.getAction({}); if (!a) {{ return false; }} a.run(); return true;",
        js_string(action_id)
    ))
}

pub fn get_supported_actions() -> String {
    with_editor(
        "return JSON.stringify(e.getSupportedActions().map(function (a) { \
         return { id: a.id, label: a.label, alias: a.alias || '' }; }));",
    )
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Which reveal variant to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Default,
    InCenter,
    InCenterIfOutsideViewport,
}

impl Reveal {
    fn suffix(self) -> &'static str {
        match self {
            Reveal::Default => "",
            Reveal::InCenter => "InCenter",
            Reveal::InCenterIfOutsideViewport => "InCenterIfOutsideViewport",
        }
    }
}

pub fn reveal_line(line_number: u32, reveal: Reveal, scroll: ScrollType) -> String {
    with_editor(&format!(
        "e.revealLine{}({}, {}); return true;",
        reveal.suffix(),
        line_number,
        scroll.code()
    ))
}

pub fn reveal_position(position: &Position, reveal: Reveal, scroll: ScrollType) -> String {
    with_editor(&format!(
        "e.revealPosition{}({}, {}); return true;",
        reveal.suffix(),
        js_value(position),
        scroll.code()
    ))
}

pub fn reveal_range(range: &Range, reveal: Reveal, scroll: ScrollType) -> String {
    with_editor(&format!(
        "e.revealRange{}({}, {}); return true;",
        reveal.suffix(),
        js_value(range),
        scroll.code()
    ))
}

pub fn focus() -> String {
    with_editor("e.focus(); return true;")
}

pub fn has_text_focus() -> String {
    with_editor("return e.hasTextFocus();")
}

/// Re-measure the container, or force the given dimension.
pub fn layout(size: Option<(u32, u32)>) -> String {
    let dimension = match size {
        Some((width, height)) => format!("{{ width: {}, height: {} }}", width, height),
        None => "undefined".to_string(),
    };
    host_call(&format!("h.layout({})", dimension))
}

pub fn get_editor_id() -> String {
    with_editor("return JSON.stringify(e.getId());")
}

pub fn get_editor_type() -> String {
    with_editor("return JSON.stringify(e.getEditorType());")
}

// ---------------------------------------------------------------------------
// Diff editor
// ---------------------------------------------------------------------------

pub fn get_line_changes() -> String {
    "(function () { var h = window.monacoHost; var d = h && h.diffEditor; \
     return d ? JSON.stringify(d.getLineChanges() || []) : null; })()"
        .to_string()
}
