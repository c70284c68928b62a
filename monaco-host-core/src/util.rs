use std::path::Path;

/// Themes that ship with Monaco.
pub const BUILTIN_THEMES: &[&str] = &["vs", "vs-dark", "hc-black", "hc-light"];

/// Determine the Monaco language id for a file path based on its name.
///
/// Returns `"plaintext"` when nothing matches.
pub fn language_for_path(path: &str) -> &'static str {
    let path_obj = Path::new(path);
    if let Some(name) = path_obj.file_name().and_then(|n| n.to_str()) {
        if name.eq_ignore_ascii_case("dockerfile") {
            return "dockerfile";
        }
    }
    let ext = path_obj
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "rs" => "rust",
        "py" | "pyi" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "mts" | "cts" | "tsx" => "typescript",
        "c" | "h" => "c",
        "cpp" | "cxx" | "cc" | "hpp" | "hxx" => "cpp",
        "cs" | "csx" => "csharp",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "less" => "less",
        "json" | "jsonc" => "json",
        "yaml" | "yml" => "yaml",
        "xml" | "xaml" | "csproj" => "xml",
        "md" | "markdown" => "markdown",
        "sql" => "sql",
        "sh" | "bash" | "zsh" => "shell",
        "ps1" | "psm1" => "powershell",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "rb" => "ruby",
        "lua" => "lua",
        "php" => "php",
        "graphql" | "gql" => "graphql",
        "dockerfile" => "dockerfile",
        _ => "plaintext",
    }
}

pub fn is_builtin_theme(theme: &str) -> bool {
    BUILTIN_THEMES.contains(&theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_for_path_common_extensions() {
        assert_eq!(language_for_path("/src/main.rs"), "rust");
        assert_eq!(language_for_path("app.tsx"), "typescript");
        assert_eq!(language_for_path("component.jsx"), "javascript");
        assert_eq!(language_for_path("Program.CS"), "csharp");
    }

    #[test]
    fn language_for_path_special_names() {
        assert_eq!(language_for_path("/repo/Dockerfile"), "dockerfile");
        assert_eq!(language_for_path("/repo/dockerfile"), "dockerfile");
    }

    #[test]
    fn language_for_path_unknown_is_plaintext() {
        assert_eq!(language_for_path("notes.xyz"), "plaintext");
        assert_eq!(language_for_path("Makefile"), "plaintext");
    }

    #[test]
    fn builtin_themes() {
        assert!(is_builtin_theme("hc-black"));
        assert!(!is_builtin_theme("solarized"));
    }
}
