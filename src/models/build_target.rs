use camino::Utf8PathBuf;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Pattern the host uses to pull file/line/column/message out of compiler output.
///
/// The Papyrus compiler reports errors as `<script>.psc(<line>,<col>): <message>`.
pub const ERROR_MATCH: &str = r"\n(?<file>[A-Za-z0-9_:\-\.\/ \\]+\.(psc|PSC))\((?<line>[0-9]+),(?<col>[0-9]+)\): (?<message>.+)";

/// Placeholder the host replaces with the path of the active editor file
pub const ACTIVE_FILE_PLACEHOLDER: &str = "{FILE_ACTIVE}";

static ERROR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ERROR_MATCH).expect("Invalid compiler error regex"));

/// A ready-to-run compiler invocation handed to the host build tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTarget {
    pub name: String,
    pub exec: Utf8PathBuf,
    pub cwd: Utf8PathBuf,
    pub args: Vec<String>,
    pub shell: bool,
    pub error_match: String,
}

/// One compiler error extracted from build output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerMessage {
    pub file: String,
    pub line: u32,
    pub col: u32,
    pub message: String,
}

impl BuildTarget {
    /// Extract every compiler error from captured build output.
    ///
    /// Mostly useful to hosts that do not evaluate [`ERROR_MATCH`] themselves.
    pub fn parse_errors(output: &str) -> Vec<CompilerMessage> {
        // The pattern anchors on the preceding newline, so the first line needs one too
        let text = format!("\n{}", output.replace("\r\n", "\n"));
        ERROR_REGEX
            .captures_iter(&text)
            .filter_map(|caps| {
                Some(CompilerMessage {
                    file: caps.name("file")?.as_str().to_string(),
                    line: caps.name("line")?.as_str().parse().ok()?,
                    col: caps.name("col")?.as_str().parse().ok()?,
                    message: caps.name("message")?.as_str().to_string(),
                })
            })
            .collect()
    }
}
