use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events: Monaco → Rust (posted by the page bridge, or drained from its outbox)
// ---------------------------------------------------------------------------

/// Every event kind the page bridge can post, decoded by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum EditorEvent {
    Ready,
    LoadFailed {
        message: String,
    },

    // Content
    ContentChanged {
        #[serde(default)]
        changes: Vec<ContentChange>,
        #[serde(default)]
        eol: String,
        #[serde(default)]
        version_id: u32,
        #[serde(default)]
        is_flush: bool,
        #[serde(default)]
        is_undoing: bool,
        #[serde(default)]
        is_redoing: bool,
        /// Full text after the change, when the bridge includes it.
        #[serde(default)]
        value: Option<String>,
    },
    ModelChanged {
        #[serde(default)]
        old_model_url: Option<String>,
        #[serde(default)]
        new_model_url: Option<String>,
    },
    ModelLanguageChanged {
        #[serde(default)]
        old_language: String,
        #[serde(default)]
        new_language: String,
    },
    ModelOptionsChanged {
        #[serde(default)]
        tab_size: bool,
        #[serde(default)]
        indent_size: bool,
        #[serde(default)]
        insert_spaces: bool,
        #[serde(default)]
        trim_auto_whitespace: bool,
    },
    ModelDecorationsChanged {
        #[serde(default)]
        affects_minimap: bool,
        #[serde(default)]
        affects_overview_ruler: bool,
    },

    // Cursor
    CursorPositionChanged {
        position: Position,
        #[serde(default)]
        secondary_positions: Vec<Position>,
        #[serde(default)]
        reason: u32,
        #[serde(default)]
        source: String,
    },
    CursorSelectionChanged {
        selection: Selection,
        #[serde(default)]
        secondary_selections: Vec<Selection>,
        #[serde(default)]
        model_version_id: u32,
        #[serde(default)]
        old_selections: Option<Vec<Selection>>,
        #[serde(default)]
        old_model_version_id: u32,
        #[serde(default)]
        reason: u32,
        #[serde(default)]
        source: String,
    },

    // Focus
    FocusEditorText,
    BlurEditorText,
    FocusEditorWidget,
    BlurEditorWidget,

    // Layout
    LayoutChanged(LayoutInfo),
    ContentSizeChanged {
        content_width: f64,
        content_height: f64,
        #[serde(default)]
        content_width_changed: bool,
        #[serde(default)]
        content_height_changed: bool,
    },
    ScrollChanged(ScrollInfo),

    // Mouse
    MouseDown(MouseEvent),
    MouseUp(MouseEvent),
    MouseMove(MouseEvent),
    MouseLeave(MouseEvent),
    ContextMenu(MouseEvent),

    // Keyboard
    KeyDown(KeyboardEvent),
    KeyUp(KeyboardEvent),
    CompositionStart,
    CompositionEnd,

    // Other
    Paste {
        range: Range,
        #[serde(default)]
        language_id: Option<String>,
    },
    ConfigurationChanged,

    // Host callbacks
    CommandInvoked {
        id: String,
    },
    ActionInvoked {
        id: String,
    },

    // Diff editor
    DiffUpdated {
        #[serde(default)]
        changes: Vec<LineChange>,
    },
    OriginalChanged {
        value: String,
    },
    ModifiedChanged {
        value: String,
    },
}

impl EditorEvent {
    /// Decode one message posted by the page bridge.
    pub fn from_json(json: &str) -> Result<EditorEvent, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse EditorEvent: {}", e))
    }
}

// ---------------------------------------------------------------------------
// Positions and ranges (1-based, Monaco conventions)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line_number: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line_number: u32, column: u32) -> Self {
        Position {
            line_number,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line_number: u32,
    pub start_column: u32,
    pub end_line_number: u32,
    pub end_column: u32,
}

impl Range {
    pub fn new(start_line_number: u32, start_column: u32, end_line_number: u32, end_column: u32) -> Self {
        Range {
            start_line_number,
            start_column,
            end_line_number,
            end_column,
        }
    }

    /// Whole-line range covering `line`.
    pub fn line(line: u32) -> Self {
        Range::new(line, 1, line, 1)
    }
}

/// A selection keeps the anchor (`selection_start_*`) and the cursor
/// (`position_*`) alongside the normalized range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_start_line_number: u32,
    pub selection_start_column: u32,
    pub position_line_number: u32,
    pub position_column: u32,
    #[serde(default)]
    pub start_line_number: u32,
    #[serde(default)]
    pub start_column: u32,
    #[serde(default)]
    pub end_line_number: u32,
    #[serde(default)]
    pub end_column: u32,
}

impl Selection {
    pub fn new(anchor_line: u32, anchor_column: u32, line: u32, column: u32) -> Self {
        let (start, end) = if (anchor_line, anchor_column) <= (line, column) {
            ((anchor_line, anchor_column), (line, column))
        } else {
            ((line, column), (anchor_line, anchor_column))
        };
        Selection {
            selection_start_line_number: anchor_line,
            selection_start_column: anchor_column,
            position_line_number: line,
            position_column: column,
            start_line_number: start.0,
            start_column: start.1,
            end_line_number: end.0,
            end_column: end.1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selection_start_line_number == self.position_line_number
            && self.selection_start_column == self.position_column
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    pub range: Range,
    #[serde(default)]
    pub range_length: u32,
    #[serde(default)]
    pub range_offset: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedSingleEditOperation {
    pub range: Range,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_move_markers: Option<bool>,
}

// ---------------------------------------------------------------------------
// Decorations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TrackedRangeStickiness {
    AlwaysGrowsWhenTypingAtEdges,
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    GrowsOnlyWhenTypingAfter,
}

impl From<TrackedRangeStickiness> for u8 {
    fn from(value: TrackedRangeStickiness) -> u8 {
        match value {
            TrackedRangeStickiness::AlwaysGrowsWhenTypingAtEdges => 0,
            TrackedRangeStickiness::NeverGrowsWhenTypingAtEdges => 1,
            TrackedRangeStickiness::GrowsOnlyWhenTypingBefore => 2,
            TrackedRangeStickiness::GrowsOnlyWhenTypingAfter => 3,
        }
    }
}

impl TryFrom<u8> for TrackedRangeStickiness {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(TrackedRangeStickiness::AlwaysGrowsWhenTypingAtEdges),
            1 => Ok(TrackedRangeStickiness::NeverGrowsWhenTypingAtEdges),
            2 => Ok(TrackedRangeStickiness::GrowsOnlyWhenTypingBefore),
            3 => Ok(TrackedRangeStickiness::GrowsOnlyWhenTypingAfter),
            other => Err(format!("Unknown decoration stickiness {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OverviewRulerLane {
    Left,
    Center,
    Right,
    Full,
}

impl From<OverviewRulerLane> for u8 {
    fn from(value: OverviewRulerLane) -> u8 {
        match value {
            OverviewRulerLane::Left => 1,
            OverviewRulerLane::Center => 2,
            OverviewRulerLane::Right => 4,
            OverviewRulerLane::Full => 7,
        }
    }
}

impl TryFrom<u8> for OverviewRulerLane {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(OverviewRulerLane::Left),
            2 => Ok(OverviewRulerLane::Center),
            4 => Ok(OverviewRulerLane::Right),
            7 => Ok(OverviewRulerLane::Full),
            other => Err(format!("Unknown overview ruler lane {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRulerOptions {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_color: Option<String>,
    pub position: OverviewRulerLane,
}

/// Markdown shown when hovering a decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownString {
    pub value: String,
    #[serde(default)]
    pub is_trusted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDecorationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickiness: Option<TrackedRangeStickiness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_margin_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_message: Option<MarkdownString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_margin_hover_message: Option<MarkdownString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_whole_line: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if_collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_content_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_content_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_decorations_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_ruler: Option<OverviewRulerOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDeltaDecoration {
    pub range: Range,
    pub options: ModelDecorationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDecoration {
    pub id: String,
    #[serde(default)]
    pub owner_id: u32,
    pub range: Range,
    #[serde(default)]
    pub options: ModelDecorationOptions,
}

// ---------------------------------------------------------------------------
// Markers (diagnostics)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MarkerSeverity {
    Hint,
    Info,
    Warning,
    Error,
}

impl MarkerSeverity {
    /// Map an LSP `DiagnosticSeverity` (1 = Error .. 4 = Hint).
    pub fn from_lsp(severity: u8) -> MarkerSeverity {
        match severity {
            1 => MarkerSeverity::Error,
            2 => MarkerSeverity::Warning,
            4 => MarkerSeverity::Hint,
            _ => MarkerSeverity::Info,
        }
    }
}

impl From<MarkerSeverity> for u8 {
    fn from(value: MarkerSeverity) -> u8 {
        match value {
            MarkerSeverity::Hint => 1,
            MarkerSeverity::Info => 2,
            MarkerSeverity::Warning => 4,
            MarkerSeverity::Error => 8,
        }
    }
}

impl TryFrom<u8> for MarkerSeverity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(MarkerSeverity::Hint),
            2 => Ok(MarkerSeverity::Info),
            4 => Ok(MarkerSeverity::Warning),
            8 => Ok(MarkerSeverity::Error),
            other => Err(format!("Unknown marker severity {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MarkerTag {
    Unnecessary,
    Deprecated,
}

impl From<MarkerTag> for u8 {
    fn from(value: MarkerTag) -> u8 {
        match value {
            MarkerTag::Unnecessary => 1,
            MarkerTag::Deprecated => 2,
        }
    }
}

impl TryFrom<u8> for MarkerTag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(MarkerTag::Unnecessary),
            2 => Ok(MarkerTag::Deprecated),
            other => Err(format!("Unknown marker tag {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInformation {
    pub resource: String,
    pub message: String,
    pub start_line_number: u32,
    pub start_column: u32,
    pub end_line_number: u32,
    pub end_column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerData {
    pub severity: MarkerSeverity,
    pub message: String,
    pub start_line_number: u32,
    pub start_column: u32,
    pub end_line_number: u32,
    pub end_column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<RelatedInformation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<MarkerTag>,
}

// ---------------------------------------------------------------------------
// Commands, actions, navigation
// ---------------------------------------------------------------------------

/// Monaco `ScrollType` for the reveal family of calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollType {
    #[default]
    Smooth,
    Immediate,
}

impl ScrollType {
    pub fn code(self) -> u8 {
        match self {
            ScrollType::Smooth => 0,
            ScrollType::Immediate => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub keybindings: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybinding_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_menu_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_menu_order: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedAction {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub alias: String,
}

/// Snapshot of the editor's current text model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub uri: String,
    pub language_id: String,
    pub version_id: u32,
    pub line_count: u32,
    #[serde(default)]
    pub eol: String,
}

/// Monaco `KeyMod` bits, combined with a key code via `|`.
pub mod key_mod {
    pub const CTRL_CMD: u32 = 2048;
    pub const SHIFT: u32 = 1024;
    pub const ALT: u32 = 512;
    pub const WIN_CTRL: u32 = 256;
}

/// A subset of Monaco `KeyCode` values.
pub mod key_code {
    pub const BACKSPACE: u32 = 1;
    pub const TAB: u32 = 2;
    pub const ENTER: u32 = 3;
    pub const ESCAPE: u32 = 9;
    pub const SPACE: u32 = 10;
    pub const DELETE: u32 = 20;

    /// `Digit0`..`Digit9`.
    pub fn digit(n: u8) -> Option<u32> {
        (n <= 9).then(|| 21 + n as u32)
    }

    /// `KeyA`..`KeyZ` (case-insensitive).
    pub fn letter(c: char) -> Option<u32> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase().then(|| 31 + (c as u32 - 'A' as u32))
    }

    /// `F1`..`F19`.
    pub fn function_key(n: u8) -> Option<u32> {
        (1..=19).contains(&n).then(|| 58 + n as u32)
    }
}

// ---------------------------------------------------------------------------
// Layout, scroll, input payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutInfo {
    pub width: f64,
    pub height: f64,
    pub glyph_margin_left: f64,
    pub glyph_margin_width: f64,
    pub line_numbers_left: f64,
    pub line_numbers_width: f64,
    pub decorations_left: f64,
    pub decorations_width: f64,
    pub content_left: f64,
    pub content_width: f64,
    pub vertical_scrollbar_width: f64,
    pub horizontal_scrollbar_height: f64,
    pub is_word_wrap_minified: bool,
    pub is_viewport_wrapping: bool,
    pub wrapping_column: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollInfo {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub scroll_top_changed: bool,
    pub scroll_left_changed: bool,
    pub scroll_width_changed: bool,
    pub scroll_height_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserMouseEvent {
    pub buttons: u32,
    pub detail: u32,
    pub posx: f64,
    pub posy: f64,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MouseTarget {
    /// Monaco `MouseTargetType`.
    #[serde(rename = "type")]
    pub target_type: u32,
    pub position: Option<Position>,
    pub mouse_column: u32,
    pub range: Option<Range>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MouseEvent {
    pub event: BrowserMouseEvent,
    pub target: Option<MouseTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserKeyboardEvent {
    pub key: String,
    pub code: String,
    pub location: u32,
    pub repeat: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyboardEvent {
    pub key_code: u32,
    pub code: String,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub browser_event: BrowserKeyboardEvent,
}

// ---------------------------------------------------------------------------
// Diff editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharChange {
    pub original_start_line_number: u32,
    pub original_start_column: u32,
    pub original_end_line_number: u32,
    pub original_end_column: u32,
    pub modified_start_line_number: u32,
    pub modified_start_column: u32,
    pub modified_end_line_number: u32,
    pub modified_end_column: u32,
}

/// One change block reported by the diff editor. An end line of 0 means that
/// side of the block is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChange {
    pub original_start_line_number: u32,
    pub original_end_line_number: u32,
    pub modified_start_line_number: u32,
    pub modified_end_line_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_changes: Option<Vec<CharChange>>,
}

impl LineChange {
    pub fn original_lines(&self) -> u32 {
        span(self.original_start_line_number, self.original_end_line_number)
    }

    pub fn modified_lines(&self) -> u32 {
        span(self.modified_start_line_number, self.modified_end_line_number)
    }
}

fn span(start: u32, end: u32) -> u32 {
    if end == 0 || end < start {
        0
    } else {
        end - start + 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStatistics {
    pub additions: u32,
    pub deletions: u32,
    pub modifications: u32,
}

impl DiffStatistics {
    /// Aggregate change blocks: an empty original side counts as additions, an
    /// empty modified side as deletions, anything else as modifications
    /// weighted by the larger side.
    pub fn from_line_changes(changes: &[LineChange]) -> DiffStatistics {
        changes
            .iter()
            .fold(DiffStatistics::default(), |mut stats, change| {
                let original = change.original_lines();
                let modified = change.modified_lines();
                if original == 0 {
                    stats.additions += modified;
                } else if modified == 0 {
                    stats.deletions += original;
                } else {
                    stats.modifications += original.max(modified);
                }
                stats
            })
    }

    pub fn total_changes(&self) -> u32 {
        self.additions + self.deletions + self.modifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(original: (u32, u32), modified: (u32, u32)) -> LineChange {
        LineChange {
            original_start_line_number: original.0,
            original_end_line_number: original.1,
            modified_start_line_number: modified.0,
            modified_end_line_number: modified.1,
            char_changes: None,
        }
    }

    #[test]
    fn diff_statistics_weighting() {
        let changes = vec![
            change((4, 0), (5, 7)),   // 3 added
            change((10, 11), (12, 0)), // 2 deleted
            change((20, 21), (22, 25)), // 2 -> 4 modified
        ];
        let stats = DiffStatistics::from_line_changes(&changes);
        assert_eq!(stats.additions, 3);
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.modifications, 4);
        assert_eq!(stats.total_changes(), 9);
    }

    #[test]
    fn diff_statistics_empty() {
        assert_eq!(DiffStatistics::from_line_changes(&[]).total_changes(), 0);
    }

    #[test]
    fn line_change_parses_monaco_json() {
        let json = r#"{"originalStartLineNumber":3,"originalEndLineNumber":0,
            "modifiedStartLineNumber":4,"modifiedEndLineNumber":4,"charChanges":null}"#;
        let change: LineChange = serde_json::from_str(json).unwrap();
        assert_eq!(change.original_lines(), 0);
        assert_eq!(change.modified_lines(), 1);
    }

    #[test]
    fn event_decoding_by_type_tag() {
        let event = EditorEvent::from_json(
            r#"{"type":"CursorPositionChanged","position":{"lineNumber":3,"column":7},"reason":3,"source":"mouse"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            EditorEvent::CursorPositionChanged {
                position: Position::new(3, 7),
                secondary_positions: vec![],
                reason: 3,
                source: "mouse".to_string(),
            }
        );

        let event = EditorEvent::from_json(r#"{"type":"FocusEditorText"}"#).unwrap();
        assert_eq!(event, EditorEvent::FocusEditorText);
    }

    #[test]
    fn event_decoding_newtype_payloads() {
        let event =
            EditorEvent::from_json(r#"{"type":"ScrollChanged","scrollTop":120.5,"scrollTopChanged":true}"#)
                .unwrap();
        match event {
            EditorEvent::ScrollChanged(info) => {
                assert_eq!(info.scroll_top, 120.5);
                assert!(info.scroll_top_changed);
                assert!(!info.scroll_left_changed);
            }
            other => panic!("unexpected event {:?}", other),
        }

        let event = EditorEvent::from_json(
            r#"{"type":"KeyDown","keyCode":3,"ctrlKey":true,"browserEvent":{"key":"Enter","code":"Enter"}}"#,
        )
        .unwrap();
        match event {
            EditorEvent::KeyDown(key) => {
                assert_eq!(key.key_code, key_code::ENTER);
                assert!(key.ctrl_key);
                assert_eq!(key.browser_event.key, "Enter");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn event_decoding_rejects_unknown_type() {
        assert!(EditorEvent::from_json(r#"{"type":"Teleported"}"#).is_err());
        assert!(EditorEvent::from_json("not json").is_err());
    }

    #[test]
    fn content_changed_round_trip_field_names() {
        let json = r#"{"type":"ContentChanged","versionId":4,"isUndoing":true,"value":"x",
            "changes":[{"range":{"startLineNumber":1,"startColumn":1,"endLineNumber":1,"endColumn":1},"rangeLength":0,"text":"x"}]}"#;
        match EditorEvent::from_json(json).unwrap() {
            EditorEvent::ContentChanged {
                version_id,
                is_undoing,
                value,
                changes,
                ..
            } => {
                assert_eq!(version_id, 4);
                assert!(is_undoing);
                assert_eq!(value.as_deref(), Some("x"));
                assert_eq!(changes[0].text, "x");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn marker_severity_serializes_as_monaco_number() {
        assert_eq!(serde_json::to_string(&MarkerSeverity::Error).unwrap(), "8");
        let parsed: MarkerSeverity = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, MarkerSeverity::Warning);
        assert!(serde_json::from_str::<MarkerSeverity>("3").is_err());
        assert_eq!(MarkerSeverity::from_lsp(1), MarkerSeverity::Error);
        assert_eq!(MarkerSeverity::from_lsp(9), MarkerSeverity::Info);
    }

    #[test]
    fn selection_normalizes_range() {
        let selection = Selection::new(5, 3, 2, 8);
        assert_eq!(
            (selection.start_line_number, selection.start_column),
            (2, 8)
        );
        assert_eq!((selection.end_line_number, selection.end_column), (5, 3));
        assert!(!selection.is_empty());
        assert!(Selection::new(1, 1, 1, 1).is_empty());
    }

    #[test]
    fn key_codes() {
        assert_eq!(key_code::letter('s'), Some(49));
        assert_eq!(key_code::digit(0), Some(21));
        assert_eq!(key_code::function_key(1), Some(59));
        assert_eq!(key_code::letter('1'), None);
        assert_eq!(key_mod::CTRL_CMD | key_code::letter('s').unwrap(), 2097);
    }

    #[test]
    fn action_descriptor_keeps_fractional_menu_order() {
        let json = r#"{"id":"fmt","label":"Format","keybindings":[2097],
                       "contextMenuGroupId":"navigation","contextMenuOrder":1.5}"#;
        let action: ActionDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(action.context_menu_order, Some(1.5));
        assert_eq!(action.keybindings, vec![2097]);

        let back: ActionDescriptor =
            serde_json::from_value(serde_json::to_value(&action).unwrap()).unwrap();
        assert_eq!(back, action);
    }
}
