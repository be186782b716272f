//! Builtin module allow-lists.
//!
//! A builtin is resolved by the platform/runtime, never by the analyzed tree
//! or its manifests, so it produces neither an edge nor an issue.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::types::Language;

fn node_builtin_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "assert",
            "async_hooks",
            "buffer",
            "child_process",
            "cluster",
            "console",
            "constants",
            "crypto",
            "dgram",
            "diagnostics_channel",
            "dns",
            "domain",
            "events",
            "fs",
            "http",
            "http2",
            "https",
            "inspector",
            "module",
            "net",
            "os",
            "path",
            "perf_hooks",
            "process",
            "punycode",
            "querystring",
            "readline",
            "repl",
            "stream",
            "string_decoder",
            "sys",
            "timers",
            "tls",
            "trace_events",
            "tty",
            "url",
            "util",
            "v8",
            "vm",
            "wasi",
            "worker_threads",
            "zlib",
        ]
        .into_iter()
        .collect()
    })
}

fn python_stdlib_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "__future__",
            "abc",
            "argparse",
            "array",
            "ast",
            "asyncio",
            "atexit",
            "base64",
            "binascii",
            "bisect",
            "builtins",
            "calendar",
            "cmath",
            "codecs",
            "collections",
            "concurrent",
            "configparser",
            "contextlib",
            "contextvars",
            "copy",
            "csv",
            "ctypes",
            "dataclasses",
            "datetime",
            "decimal",
            "difflib",
            "dis",
            "email",
            "enum",
            "errno",
            "fnmatch",
            "fractions",
            "functools",
            "gc",
            "getpass",
            "gettext",
            "glob",
            "gzip",
            "hashlib",
            "heapq",
            "hmac",
            "html",
            "http",
            "importlib",
            "inspect",
            "io",
            "ipaddress",
            "itertools",
            "json",
            "locale",
            "logging",
            "lzma",
            "math",
            "mimetypes",
            "multiprocessing",
            "numbers",
            "operator",
            "os",
            "pathlib",
            "pickle",
            "platform",
            "plistlib",
            "pprint",
            "queue",
            "random",
            "re",
            "sched",
            "secrets",
            "select",
            "shelve",
            "shlex",
            "shutil",
            "signal",
            "socket",
            "sqlite3",
            "ssl",
            "stat",
            "statistics",
            "string",
            "struct",
            "subprocess",
            "sys",
            "sysconfig",
            "tarfile",
            "tempfile",
            "textwrap",
            "threading",
            "time",
            "timeit",
            "tkinter",
            "tomllib",
            "traceback",
            "types",
            "typing",
            "unicodedata",
            "unittest",
            "urllib",
            "uuid",
            "warnings",
            "weakref",
            "xml",
            "xmlrpc",
            "zipfile",
            "zlib",
            "zoneinfo",
        ]
        .into_iter()
        .collect()
    })
}

/// Top-level standard library package roots; `C` is the cgo pseudo-package.
const GO_STD_ROOTS: &[&str] = &[
    "C", "archive", "bufio", "builtin", "bytes", "cmp", "compress", "container", "context",
    "crypto", "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go",
    "hash", "html", "image", "index", "io", "iter", "log", "maps", "math", "mime", "net", "os",
    "path", "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv", "strings",
    "structs", "sync", "syscall", "testing", "text", "time", "unicode", "unique", "unsafe", "weak",
];

const RUST_BUILTIN_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Builtin lookup for one analyzer, extended with configured names.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    extra: HashSet<String>,
}

impl Builtins {
    pub fn new(extra: &[String]) -> Self {
        Self {
            extra: extra.iter().map(|s| s.trim().to_string()).collect(),
        }
    }

    pub fn is_builtin(&self, language: Language, specifier: &str) -> bool {
        if self.extra.contains(specifier) || self.extra.contains(head(language, specifier)) {
            return true;
        }
        match language {
            Language::JavaScript | Language::TypeScript | Language::Css => {
                if specifier.starts_with("node:") || specifier.starts_with("bun:") {
                    return true;
                }
                node_builtin_set().contains(head(language, specifier))
            }
            Language::Python => python_stdlib_set().contains(head(language, specifier)),
            Language::Rust => RUST_BUILTIN_CRATES.contains(&head(language, specifier)),
            Language::Go => GO_STD_ROOTS.contains(&head(language, specifier)),
            Language::C | Language::Cpp | Language::Unknown => false,
        }
    }
}

fn head(language: Language, specifier: &str) -> &str {
    let sep: &[char] = match language {
        Language::Python => &['.'],
        Language::Rust => &[':'],
        _ => &['/'],
    };
    specifier.split(sep).next().unwrap_or(specifier)
}
