use serde::{Deserialize, Serialize};

// Every field is optional: only the options the host sets are sent to
// `updateOptions`, everything else keeps Monaco's own default.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineNumbersStyle {
    On,
    Off,
    Relative,
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordWrap {
    Off,
    On,
    WordWrapColumn,
    Bounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderWhitespace {
    None,
    Boundary,
    Selection,
    Trailing,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    Line,
    Block,
    Underline,
    LineThin,
    BlockOutline,
    UnderlineThin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorBlinking {
    Blink,
    Smooth,
    Phase,
    Expand,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderLineHighlight {
    None,
    Gutter,
    Line,
    All,
}

/// Shared by `autoClosingBrackets`, `autoClosingQuotes` and `autoSurround`
/// style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoClosingStrategy {
    Always,
    LanguageDefined,
    BeforeWhitespace,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoIndent {
    None,
    Keep,
    Brackets,
    Advanced,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnOffSmart {
    On,
    Smart,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnippetSuggestions {
    Top,
    Bottom,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShowFoldingControls {
    Always,
    Never,
    Mouseover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchBrackets {
    Never,
    Near,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FoldingStrategy {
    Auto,
    Indentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabCompletion {
    On,
    Off,
    OnlySnippets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollbarVisibility {
    Auto,
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GotoLocationMultiple {
    Peek,
    GotoAndPeek,
    Goto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_slider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollbarOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<ScrollbarVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<ScrollbarVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_shadows: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_scrollbar_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_scrollbar_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_consume_mouse_wheel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_by_page: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_search_string_from_selection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_find_in_selection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_extra_space_on_top: Option<bool>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub wrap_around: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_graceful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets_prevent_quick_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality_bonus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_suggest_selections: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_icons: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_status_bar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_inline_details: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_methods: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_functions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_keywords: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_snippets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_words: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSuggestionsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strings: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterHintsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightbulbOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaddingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketPairColorizationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent_color_pool_per_bracket_type: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidesOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_pairs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indentation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_active_indentation: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoLocationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<GotoLocationMultiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_definitions: Option<GotoLocationMultiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_references: Option<GotoLocationMultiple>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlayHintsOptions {
    /// `"on"`, `"off"`, `"onUnlessPressed"` or `"offUnlessPressed"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyScrollOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_count: Option<u32>,
}

/// Options accepted by `editor.updateOptions` (and the construction options
/// baked into the page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    // ── Layout ───────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_layout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_beyond_last_line: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_beyond_last_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth_scrolling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<PaddingOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimap: Option<MinimapOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrollbar: Option<ScrollbarOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_scroll: Option<StickyScrollOptions>,

    // ── Text ─────────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_ligatures: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_spaces: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_indentation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<WordWrap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_wrap_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapping_indent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_whitespace: Option<RenderWhitespace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_control_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulers: Option<Vec<u32>>,

    // ── Gutter ───────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_numbers: Option<LineNumbersStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_numbers_min_chars: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_margin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folding_strategy: Option<FoldingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_folding_controls: Option<ShowFoldingControls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_line_highlight: Option<RenderLineHighlight>,

    // ── Cursor ───────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_style: Option<CursorStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_blinking: Option<CursorBlinking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_smooth_caret_animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cursor_modifier: Option<String>,

    // ── Editing ──────────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_closing_brackets: Option<AutoClosingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_closing_quotes: Option<AutoClosingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_indent: Option<AutoIndent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_on_paste: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_on_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_and_drop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_brackets: Option<MatchBrackets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_pair_colorization: Option<BracketPairColorizationOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guides: Option<GuidesOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_wheel_zoom: Option<bool>,

    // ── Assistance ───────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_suggestions: Option<QuickSuggestionsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_suggestions_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest_on_trigger_characters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_suggestion_on_enter: Option<OnOffSmart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_completion: Option<TabCompletion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_suggestions: Option<SnippetSuggestions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_based_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<SuggestOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_hints: Option<ParameterHintsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<HoverOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightbulb: Option<LightbulbOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_lens: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlay_hints: Option<InlayHintsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goto_location: Option<GotoLocationOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<FindOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences_highlight: Option<bool>,
}

impl EditorOptions {
    /// The options as a JSON object literal, omitting everything unset.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_empty(&self) -> bool {
        *self == EditorOptions::default()
    }
}

/// Options for the side-by-side diff editor, on top of the regular editor
/// options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEditorOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_side_by_side: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_trim_whitespace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_split_view_resizing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_indicators: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_margin_revert_icon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_overview_ruler: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_computation_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_word_wrap: Option<String>,
    #[serde(flatten)]
    pub editor: EditorOptions,
}

impl DiffEditorOptions {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_empty(&self) -> bool {
        *self == DiffEditorOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_are_omitted() {
        assert_eq!(EditorOptions::default().to_json(), "{}");
        assert!(EditorOptions::default().is_empty());
    }

    #[test]
    fn monaco_option_spelling() {
        let options = EditorOptions {
            word_wrap: Some(WordWrap::WordWrapColumn),
            cursor_style: Some(CursorStyle::LineThin),
            line_numbers: Some(LineNumbersStyle::Relative),
            auto_closing_brackets: Some(AutoClosingStrategy::LanguageDefined),
            minimap: Some(MinimapOptions {
                enabled: Some(false),
                ..Default::default()
            }),
            tab_size: Some(2),
            ..Default::default()
        };
        let value: serde_json::Value = serde_json::from_str(&options.to_json()).unwrap();
        assert_eq!(value["wordWrap"], "wordWrapColumn");
        assert_eq!(value["cursorStyle"], "line-thin");
        assert_eq!(value["lineNumbers"], "relative");
        assert_eq!(value["autoClosingBrackets"], "languageDefined");
        assert_eq!(value["minimap"], serde_json::json!({ "enabled": false }));
        assert_eq!(value["tabSize"], 2);
        assert!(!options.is_empty());
    }

    #[test]
    fn diff_options_flatten_editor_options() {
        let options = DiffEditorOptions {
            render_side_by_side: Some(false),
            editor: EditorOptions {
                read_only: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let value: serde_json::Value = serde_json::from_str(&options.to_json()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "renderSideBySide": false, "readOnly": true })
        );
    }

    #[test]
    fn options_parse_from_host_json() {
        let options: EditorOptions =
            serde_json::from_str(r#"{"fontSize": 14, "renderWhitespace": "boundary"}"#).unwrap();
        assert_eq!(options.font_size, Some(14));
        assert_eq!(options.render_whitespace, Some(RenderWhitespace::Boundary));
    }
}
