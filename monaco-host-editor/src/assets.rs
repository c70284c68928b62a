use std::path::{Path, PathBuf};

use fs2::FileExt;
use monaco_host_core::config::BridgeConfig;
use serde::Serialize;

pub const PAGE_HTML: &str = include_str!("../web/page.html");
pub const BRIDGE_JS: &str = include_str!("../web/bridge.js");

/// Bumped with the crate so stale pages on disk get rewritten.
pub const PAGES_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings baked into a rendered page as `window.monacoHostConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    pub monaco_base: String,
    pub language: String,
    pub theme: String,
    pub message_handler: String,
    /// Construction options passed to `monaco.editor.create*`.
    pub options: serde_json::Value,
}

impl PageOptions {
    pub fn new(config: &BridgeConfig, language: &str, theme: &str, options: serde_json::Value) -> Self {
        PageOptions {
            monaco_base: config.monaco_base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            theme: theme.to_string(),
            message_handler: config.message_handler.clone(),
            options,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        PageOptions::new(
            config,
            &config.default_language,
            &config.default_theme,
            serde_json::Value::Object(Default::default()),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageConfig<'a> {
    mode: &'a str,
    #[serde(flatten)]
    page: &'a PageOptions,
}

pub fn render_editor_page(page: &PageOptions) -> String {
    render_page("editor", "Monaco Editor", page)
}

pub fn render_diff_page(page: &PageOptions) -> String {
    render_page("diff", "Monaco Diff Editor", page)
}

fn render_page(mode: &str, title: &str, page: &PageOptions) -> String {
    let config = serde_json::to_string(&PageConfig { mode, page })
        .unwrap_or_else(|_| "{}".to_string());
    fill_template(
        PAGE_HTML,
        &[
            ("TITLE", escape_html(title)),
            ("MONACO_BASE", escape_html(&page.monaco_base)),
            ("CONFIG", script_safe(&config)),
            ("BRIDGE_SCRIPT", BRIDGE_JS.to_string()),
        ],
    )
}

/// Replace `{{KEY}}` placeholders in one pass, so substituted values are
/// never scanned for placeholders themselves.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + BRIDGE_JS.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON placed inside a `<script>` element must not close it.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub fn pages_dir() -> Result<PathBuf, String> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| "Cannot determine data home directory".to_string())?;
    Ok(data_dir.join("monaco-host").join("pages"))
}

/// Write `editor.html` and `diff.html` under `dir/<version>/`, for hosts
/// that load pages from `file://`. Returns the versioned directory.
pub fn ensure_pages_written(dir: &Path, page: &PageOptions) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create pages directory: {}", e))?;

    // Serialize concurrent writers (several windows starting at once).
    let lock_file = std::fs::File::create(dir.join(".write.lock"))
        .map_err(|e| format!("Failed to create lock file: {}", e))?;
    lock_file
        .lock_exclusive()
        .map_err(|e| format!("Failed to acquire pages lock: {}", e))?;

    let pages_dir = dir.join(PAGES_VERSION);
    std::fs::create_dir_all(&pages_dir)
        .map_err(|e| format!("Failed to create {}: {}", pages_dir.display(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&pages_dir, std::fs::Permissions::from_mode(0o700));
    }

    // Always rewritten: the baked-in config may differ between runs.
    std::fs::write(pages_dir.join("editor.html"), render_editor_page(page))
        .map_err(|e| format!("Failed to write editor.html: {}", e))?;
    std::fs::write(pages_dir.join("diff.html"), render_diff_page(page))
        .map_err(|e| format!("Failed to write diff.html: {}", e))?;

    log::debug!("editor pages written to {:?}", pages_dir);
    Ok(pages_dir)
}
