use std::collections::BTreeMap;

use monaco_host_core::transport::js_string;
use serde::{Deserialize, Serialize};

use crate::bridge::Bridge;
use crate::protocol::MarkerData;
use crate::runtime::ScriptRuntime;
use crate::scripts::js_value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageExtensionPoint {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filenames: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mimetypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CompletionItemKind {
    Method,
    Function,
    Constructor,
    Field,
    Variable,
    Class,
    Struct,
    Interface,
    Module,
    Property,
    Event,
    Operator,
    Unit,
    Value,
    Constant,
    Enum,
    EnumMember,
    Keyword,
    Text,
    Color,
    File,
    Reference,
    Customcolor,
    Folder,
    TypeParameter,
    User,
    Issue,
    Snippet,
}

const COMPLETION_KINDS: [CompletionItemKind; 28] = [
    CompletionItemKind::Method,
    CompletionItemKind::Function,
    CompletionItemKind::Constructor,
    CompletionItemKind::Field,
    CompletionItemKind::Variable,
    CompletionItemKind::Class,
    CompletionItemKind::Struct,
    CompletionItemKind::Interface,
    CompletionItemKind::Module,
    CompletionItemKind::Property,
    CompletionItemKind::Event,
    CompletionItemKind::Operator,
    CompletionItemKind::Unit,
    CompletionItemKind::Value,
    CompletionItemKind::Constant,
    CompletionItemKind::Enum,
    CompletionItemKind::EnumMember,
    CompletionItemKind::Keyword,
    CompletionItemKind::Text,
    CompletionItemKind::Color,
    CompletionItemKind::File,
    CompletionItemKind::Reference,
    CompletionItemKind::Customcolor,
    CompletionItemKind::Folder,
    CompletionItemKind::TypeParameter,
    CompletionItemKind::User,
    CompletionItemKind::Issue,
    CompletionItemKind::Snippet,
];

impl From<CompletionItemKind> for u8 {
    fn from(kind: CompletionItemKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for CompletionItemKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        COMPLETION_KINDS
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("Unknown completion item kind {}", value))
    }
}

/// A completion offered regardless of context, replacing the word at the
/// cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    pub insert_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub insert_as_snippet: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchemaAssociation {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_match: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiagnosticsOptions {
    pub validate: bool,
    pub allow_comments: bool,
    #[serde(default)]
    pub schemas: Vec<JsonSchemaAssociation>,
    pub enable_schema_request: bool,
}

impl Default for JsonDiagnosticsOptions {
    fn default() -> Self {
        JsonDiagnosticsOptions {
            validate: true,
            allow_comments: false,
            schemas: Vec::new(),
            enable_schema_request: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenThemeRule {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
}

/// Argument of `monaco.editor.defineTheme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeData {
    /// `vs`, `vs-dark`, `hc-black` or `hc-light`.
    pub base: String,
    pub inherit: bool,
    #[serde(default)]
    pub rules: Vec<TokenThemeRule>,
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

fn with_monaco(body: &str) -> String {
    format!(
        "(function () {{ if (typeof monaco === 'undefined') {{ return false; }} {} }})()",
        body
    )
}

/// Registration of languages, tokenizers, completions and themes.
///
/// Borrowed from a view; every call is a no-op returning `false` (or an empty
/// result) until that view is ready.
pub struct LanguageService<'a, R: ScriptRuntime> {
    bridge: &'a Bridge<R>,
}

impl<'a, R: ScriptRuntime> LanguageService<'a, R> {
    pub(crate) fn new(bridge: &'a Bridge<R>) -> Self {
        LanguageService { bridge }
    }

    pub async fn register_language(&self, language: &LanguageExtensionPoint) -> bool {
        self.bridge
            .command(&with_monaco(&format!(
                "monaco.languages.register({}); return true;",
                js_value(language)
            )))
            .await
    }

    pub async fn get_languages(&self) -> Vec<LanguageExtensionPoint> {
        self.bridge
            .query_json(&with_monaco(
                "return JSON.stringify(monaco.languages.getLanguages().map(function (l) { \
                 return { id: l.id, extensions: l.extensions || [], aliases: l.aliases || [], \
                 filenames: l.filenames || [], mimetypes: l.mimetypes || [] }; }));",
            ))
            .await
            .unwrap_or_default()
    }

    /// `configuration` is a Monaco `LanguageConfiguration`; regex-valued
    /// fields may be given as strings.
    pub async fn set_language_configuration(
        &self,
        language_id: &str,
        configuration: &serde_json::Value,
    ) -> bool {
        self.bridge
            .command(&format!(
                "(function () {{ var h = window.monacoHost; return h ? h.setLanguageConfiguration({}, {}) : false; }})()",
                js_string(language_id),
                js_value(configuration)
            ))
            .await
    }

    pub async fn set_monarch_tokens_provider(
        &self,
        language_id: &str,
        definition: &serde_json::Value,
    ) -> bool {
        self.bridge
            .command(&with_monaco(&format!(
                "monaco.languages.setMonarchTokensProvider({}, {}); return true;",
                js_string(language_id),
                js_value(definition)
            )))
            .await
    }

    /// Replace the static completion list for `language_id`.
    pub async fn set_static_completion_items(
        &self,
        language_id: &str,
        items: &[StaticCompletionItem],
    ) -> bool {
        self.bridge
            .command(&format!(
                "(function () {{ var h = window.monacoHost; return h ? h.setStaticCompletions({}, {}) : false; }})()",
                js_string(language_id),
                js_value(items)
            ))
            .await
    }

    pub async fn configure_json_defaults(&self, options: &JsonDiagnosticsOptions) -> bool {
        self.bridge
            .command(&with_monaco(&format!(
                "if (!monaco.languages.json) {{ return false; }} \
                 monaco.languages.json.jsonDefaults.setDiagnosticsOptions({}); return true;",
                js_value(options)
            )))
            .await
    }

    /// Set markers on whichever model has `uri`, not only the shown one.
    pub async fn set_model_markers_for_uri(
        &self,
        uri: &str,
        owner: &str,
        markers: &[MarkerData],
    ) -> bool {
        if let Err(e) = url::Url::parse(uri) {
            log::warn!("invalid model uri {}: {}", uri, e);
            return false;
        }
        self.bridge
            .command(&with_monaco(&format!(
                "var m = monaco.editor.getModel(monaco.Uri.parse({})); if (!m) {{ return false; }} \
                 monaco.editor.setModelMarkers(m, {}, {}); return true;",
                js_string(uri),
                js_string(owner),
                js_value(markers)
            )))
            .await
    }

    pub async fn define_theme(&self, name: &str, theme: &ThemeData) -> bool {
        self.bridge
            .command(&with_monaco(&format!(
                "monaco.editor.defineTheme({}, {}); return true;",
                js_string(name),
                js_value(theme)
            )))
            .await
    }
}
