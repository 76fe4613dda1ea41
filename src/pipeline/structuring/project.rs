use std::path::Path;

use serde::{Deserialize, Serialize};

const CODE_EXTENSIONS: &[&str] = &["py", "js", "ts", "cpp", "c", "java", "rs", "go"];
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "ini", "conf", "toml"];
const DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst"];

/// File categories of an existing project, derived from a path listing
/// supplied by the caller. The filesystem is never touched here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub code_files: Vec<String>,
    pub config_files: Vec<String>,
    pub documentation: Vec<String>,
    /// Every listed path, classified or not, in listing order.
    pub structure: Vec<String>,
}

impl ProjectContext {
    /// Classify relative paths by extension. Extension matching is
    /// case-insensitive; blank entries are skipped.
    pub fn from_listing<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::default();

        for path in paths {
            let path = path.as_ref().trim();
            if path.is_empty() {
                continue;
            }

            let ext = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            if CODE_EXTENSIONS.contains(&ext.as_str()) {
                context.code_files.push(path.to_string());
            } else if CONFIG_EXTENSIONS.contains(&ext.as_str()) {
                context.config_files.push(path.to_string());
            } else if DOC_EXTENSIONS.contains(&ext.as_str()) {
                context.documentation.push(path.to_string());
            }
            context.structure.push(path.to_string());
        }

        context
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }
}
