// Extension-based language classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Coarse language tag derived from a file's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Html,
    Css,
    Json,
    Markdown,
    Unknown,
}

impl Language {
    /// Classify a file name. Never fails; unmapped extensions are `Unknown`.
    pub fn classify(file_name: &str) -> Self {
        let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Language::Unknown,
        };

        match ext.as_str() {
            "js" | "jsx" | "ts" | "tsx" => Language::JavaScript,
            "py" => Language::Python,
            "java" => Language::Java,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" => Language::Css,
            "json" => Language::Json,
            "md" | "markdown" => Language::Markdown,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Unknown => "unknown",
        }
    }

    /// Tag with only its first letter upper-cased ("Javascript", "Unknown")
    pub fn capitalized(&self) -> String {
        let tag = self.as_str();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
