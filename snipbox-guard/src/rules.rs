//! Static denylist rule tables.
//!
//! Patterns are compiled case-insensitively by [`crate::validator`]. Within
//! a language, more specific rules come before the rules they contain
//! (`shell_exec(` before `exec(`), so the first match names the most precise
//! construct.
//!
//! This is a lexical denylist. It rejects known-dangerous spellings and
//! nothing else; isolating untrusted code requires an OS-level sandbox.

use std::fmt;

use serde::Serialize;
use snipbox_core::Language;

use self::RuleCategory::{
    DirectoryTraversal, DynamicEvaluation, Environment, FileSystem, Network, OperatingSystem,
    ProcessExecution, RuntimeInternals, SensitivePath, UnsafeMemory,
};

/// Broad class of a forbidden construct, safe to show to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuleCategory {
    /// Spawning or replacing processes.
    ProcessExecution,
    /// Reading, writing, or listing files.
    FileSystem,
    /// Opening network connections or resolving names.
    Network,
    /// Querying or changing operating-system state.
    OperatingSystem,
    /// Evaluating strings as code.
    DynamicEvaluation,
    /// Reaching into interpreter internals.
    RuntimeInternals,
    /// Reading or writing environment and request containers.
    Environment,
    /// Raw memory access.
    UnsafeMemory,
    /// Relative paths that climb out of the working directory.
    DirectoryTraversal,
    /// Absolute paths to sensitive system locations.
    SensitivePath,
}

impl RuleCategory {
    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RuleCategory::ProcessExecution => "process execution",
            RuleCategory::FileSystem => "filesystem access",
            RuleCategory::Network => "network access",
            RuleCategory::OperatingSystem => "operating system access",
            RuleCategory::DynamicEvaluation => "dynamic code evaluation",
            RuleCategory::RuntimeInternals => "runtime internals access",
            RuleCategory::Environment => "environment access",
            RuleCategory::UnsafeMemory => "unsafe memory access",
            RuleCategory::DirectoryTraversal => "directory traversal",
            RuleCategory::SensitivePath => "sensitive path access",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Uncompiled rule: a description, its category, and a regex source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleDef {
    pub description: &'static str,
    pub category: RuleCategory,
    pub pattern: &'static str,
}

const fn rule(
    description: &'static str,
    category: RuleCategory,
    pattern: &'static str,
) -> RuleDef {
    RuleDef {
        description,
        category,
        pattern,
    }
}

#[rustfmt::skip]
const NODE_RULES: &[RuleDef] = &[
    rule("require('child_process')", ProcessExecution, r#"require\(\s*["']child_process["']\s*\)"#),
    rule("require('fs')", FileSystem, r#"require\(\s*["']fs["']\s*\)"#),
    rule("require('os')", OperatingSystem, r#"require\(\s*["']os["']\s*\)"#),
    rule("require('net')", Network, r#"require\(\s*["']net["']\s*\)"#),
    rule("require('dns')", Network, r#"require\(\s*["']dns["']\s*\)"#),
    rule("require('http')", Network, r#"require\(\s*["']http["']\s*\)"#),
    rule("require('https')", Network, r#"require\(\s*["']https["']\s*\)"#),
    rule("eval()", DynamicEvaluation, r"eval\s*\("),
    rule("exec()", ProcessExecution, r"exec\s*\("),
    rule("Function() with string body", DynamicEvaluation, r#"Function\s*\(\s*["'].*["']\s*\)"#),
    rule(
        "setTimeout() with string body",
        DynamicEvaluation,
        r#"setTimeout\s*\(\s*["'].*["']\s*,?"#,
    ),
    rule(
        "setInterval() with string body",
        DynamicEvaluation,
        r#"setInterval\s*\(\s*["'].*["']\s*,?"#,
    ),
    rule("dynamic import()", DynamicEvaluation, r#"import\(\s*["'].+["']\s*\)"#),
    rule("process object", RuntimeInternals, r"process\."),
    rule("global object", RuntimeInternals, r"global\."),
    rule("__dirname/__filename", FileSystem, r"__dirname|__filename"),
    rule("new ActiveXObject()", ProcessExecution, r"new\s+ActiveXObject\s*\("),
    rule("WScript object", ProcessExecution, r"WScript\."),
];

#[rustfmt::skip]
const PHP_RULES: &[RuleDef] = &[
    rule("shell_exec()", ProcessExecution, r"shell_exec\s*\("),
    rule("pcntl_exec()", ProcessExecution, r"pcntl_exec\s*\("),
    rule("exec()", ProcessExecution, r"exec\s*\("),
    rule("system()", ProcessExecution, r"system\s*\("),
    rule("passthru()", ProcessExecution, r"passthru\s*\("),
    rule("popen()", ProcessExecution, r"popen\s*\("),
    rule("proc_open()", ProcessExecution, r"proc_open\s*\("),
    rule("pcntl_fork()", ProcessExecution, r"pcntl_fork\s*\("),
    rule("dl()", RuntimeInternals, r"dl\s*\("),
    rule("file_get_contents() phar wrapper", FileSystem, r#"file_get_contents\s*\(\s*['"]phar:"#),
    rule(
        "file_get_contents() ssh2 wrapper",
        Network,
        r#"file_get_contents\s*\(\s*['"]ssh2(\.\w+)?:"#,
    ),
    rule(
        "file_get_contents() compress.zlib wrapper",
        FileSystem,
        r#"file_get_contents\s*\(\s*['"]compress\.zlib:"#,
    ),
    rule(
        "file_get_contents() compress.bzip2 wrapper",
        FileSystem,
        r#"file_get_contents\s*\(\s*['"]compress\.bzip2:"#,
    ),
    rule("file_get_contents() glob wrapper", FileSystem, r#"file_get_contents\s*\(\s*['"]glob:"#),
    rule(
        "file_get_contents() data wrapper",
        DynamicEvaluation,
        r#"file_get_contents\s*\(\s*['"]data:"#,
    ),
    rule(
        "file_put_contents() php wrapper",
        FileSystem,
        r#"file_put_contents\s*\(\s*['"]php://.*['"]"#,
    ),
    rule("fopen() php wrapper", FileSystem, r#"fopen\s*\(\s*['"]php://.*['"]"#),
    rule("include phar", FileSystem, r#"include\s+['"]phar:"#),
    rule("include_once phar", FileSystem, r#"include_once\s+['"]phar:"#),
    rule("require phar", FileSystem, r#"require\s+['"]phar:"#),
    rule("require_once phar", FileSystem, r#"require_once\s+['"]phar:"#),
    rule("scandir()", FileSystem, r"scandir\s*\("),
    rule("opendir()", FileSystem, r"opendir\s*\("),
    rule("glob()", FileSystem, r"glob\s*\("),
    rule("superglobal access", Environment, r"\$_(GET|POST|COOKIE|SESSION|SERVER|FILES|ENV)"),
    rule("apache_getenv()", Environment, r"apache_getenv\s*\("),
    rule("apache_setenv()", Environment, r"apache_setenv\s*\("),
    rule("getenv()", Environment, r"getenv\s*\("),
    rule("putenv()", Environment, r"putenv\s*\("),
];

// Import rules match both `import "pkg"` / `import alias "pkg"` and grouped
// `import ( ... "pkg" ... )` blocks spanning several lines.
#[rustfmt::skip]
const GO_RULES: &[RuleDef] = &[
    rule("import \"os\"", OperatingSystem, r#"import\s*(?:\([^)]*"os"[^)]*\)|(?:[\w.]+\s+)?"os")"#),
    rule(
        "import \"os/exec\"",
        ProcessExecution,
        r#"import\s*(?:\([^)]*"os/exec"[^)]*\)|(?:[\w.]+\s+)?"os/exec")"#,
    ),
    rule("import \"net\"", Network, r#"import\s*(?:\([^)]*"net"[^)]*\)|(?:[\w.]+\s+)?"net")"#),
    rule(
        "import \"net/http\"",
        Network,
        r#"import\s*(?:\([^)]*"net/http"[^)]*\)|(?:[\w.]+\s+)?"net/http")"#,
    ),
    rule(
        "import \"syscall\"",
        OperatingSystem,
        r#"import\s*(?:\([^)]*"syscall"[^)]*\)|(?:[\w.]+\s+)?"syscall")"#,
    ),
    rule(
        "import \"unsafe\"",
        UnsafeMemory,
        r#"import\s*(?:\([^)]*"unsafe"[^)]*\)|(?:[\w.]+\s+)?"unsafe")"#,
    ),
    rule(
        "import \"os/user\"",
        OperatingSystem,
        r#"import\s*(?:\([^)]*"os/user"[^)]*\)|(?:[\w.]+\s+)?"os/user")"#,
    ),
    rule("os.Open()", FileSystem, r"os\.Open\s*\("),
    rule("os.Create()", FileSystem, r"os\.Create\s*\("),
    rule("os.Remove()", FileSystem, r"os\.Remove\s*\("),
    rule("os.Mkdir()", FileSystem, r"os\.Mkdir\s*\("),
    rule("os.MkdirAll()", FileSystem, r"os\.MkdirAll\s*\("),
    rule("os.Rename()", FileSystem, r"os\.Rename\s*\("),
    rule("os.Chmod()", FileSystem, r"os\.Chmod\s*\("),
    rule("os.Chown()", FileSystem, r"os\.Chown\s*\("),
    rule("os.Symlink()", FileSystem, r"os\.Symlink\s*\("),
    rule("exec.Command()", ProcessExecution, r"exec\.Command\s*\("),
    rule("http.NewRequest()", Network, r"http\.NewRequest\s*\("),
    rule("http.Get()", Network, r"http\.Get\s*\("),
    rule("http.Post()", Network, r"http\.Post\s*\("),
    rule("http.Do()", Network, r"http\.Do\s*\("),
    rule("syscall package", OperatingSystem, r"syscall\."),
    rule("unsafe package", UnsafeMemory, r"unsafe\."),
    rule("user.Current()", OperatingSystem, r"user\.Current\s*\("),
];

#[rustfmt::skip]
const GLOBAL_RULES: &[RuleDef] = &[
    rule("parent directory traversal", DirectoryTraversal, r"\.\./|\.\.\\"),
    rule("sensitive POSIX path", SensitivePath, r"/etc/|/proc/|/sys/|/dev/"),
    rule(
        "sensitive Windows path",
        SensitivePath,
        r"C:\\Windows\\|C:\\ProgramData\\|C:\\Program Files",
    ),
];

/// Rules specific to `language`, in evaluation order.
pub(crate) const fn language_rules(language: Language) -> &'static [RuleDef] {
    match language {
        Language::Node => NODE_RULES,
        Language::Php => PHP_RULES,
        Language::Go => GO_RULES,
    }
}

/// Rules applied to every language after the language-specific ones.
pub(crate) const fn global_rules() -> &'static [RuleDef] {
    GLOBAL_RULES
}
