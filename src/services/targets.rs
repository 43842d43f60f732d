use camino::{Utf8Path, Utf8PathBuf};

use crate::models::{BuildTarget, ERROR_MATCH};

/// Build flavours offered for compilers that understand `-release`/`-final`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    Default,
    Release,
    FinalRelease,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 3] = [
        BuildVariant::Default,
        BuildVariant::Release,
        BuildVariant::FinalRelease,
    ];

    /// Compiler switches appended for this variant
    pub fn switches(self) -> &'static [&'static str] {
        match self {
            BuildVariant::Default => &[],
            BuildVariant::Release => &["-release"],
            BuildVariant::FinalRelease => &["-release", "-final"],
        }
    }

    /// Suffix added to the target name
    pub fn label(self) -> &'static str {
        match self {
            BuildVariant::Default => "",
            BuildVariant::Release => " (release)",
            BuildVariant::FinalRelease => " (final release)",
        }
    }

    /// `args` followed by this variant's switches
    pub fn apply(self, args: &[String]) -> Vec<String> {
        args.iter()
            .cloned()
            .chain(self.switches().iter().map(|s| s.to_string()))
            .collect()
    }
}

/// Create a build target for a compiler invocation.
///
/// The working directory is the compiler's own directory, not the project:
/// the Papyrus compiler searches its working directory for imports before the
/// `-import` list, so a project root there could shadow the configured imports.
pub fn make_target(name: impl Into<String>, compiler: &Utf8Path, args: Vec<String>) -> BuildTarget {
    let cwd = compiler
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| Utf8PathBuf::from("."));

    BuildTarget {
        name: name.into(),
        exec: compiler.to_path_buf(),
        cwd,
        args,
        shell: false,
        error_match: ERROR_MATCH.to_string(),
    }
}
