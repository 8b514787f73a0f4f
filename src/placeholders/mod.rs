//! Placeholder tokens used by schema defaults and bounds.
//!
//! Two tokens are understood, matched case-insensitively:
//! - `%AppDir%` expands to the application's base directory
//! - `%TotalRAM%` expands to the installed memory in bytes
//!
//! Expansion is a single left-to-right pass, so a token produced by an
//! expansion is never expanded again.

use std::path::{Component, Path, PathBuf};

use lazy_regex::{regex, Captures};
use lazy_static::lazy_static;
use log::{debug, warn};
use sysinfo::System;

lazy_static! {
    /// Installed memory, probed once per process.
    static ref TOTAL_RAM: u64 = probe_total_ram();
}

fn probe_total_ram() -> u64 {
    let mut system = System::new();
    system.refresh_memory();
    let total = system.total_memory();
    debug!("Detected {} bytes of installed memory", total);
    if total == 0 {
        warn!("Could not detect installed memory, %TotalRAM% expands to 0");
    }
    total
}

/// Values substituted for placeholder tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderContext {
    /// Replacement for `%AppDir%`.
    pub app_dir: PathBuf,
    /// Replacement for `%TotalRAM%`, in bytes.
    pub total_ram: u64,
}

impl PlaceholderContext {
    /// Builds a context with explicit values. Mostly useful in tests.
    pub fn new(app_dir: impl Into<PathBuf>, total_ram: u64) -> Self {
        Self {
            app_dir: app_dir.into(),
            total_ram,
        }
    }

    /// Builds a context for the running machine.
    pub fn detect(app_dir: impl Into<PathBuf>) -> Self {
        Self::new(app_dir, *TOTAL_RAM)
    }

    /// Replaces every token in `text`, then trims whitespace and one pair of
    /// surrounding quotes.
    ///
    /// ```
    /// use mycnf::placeholders::PlaceholderContext;
    /// let ctx = PlaceholderContext::new("/opt/mysql", 1024);
    /// assert_eq!(ctx.expand("\"%AppDir%/data\""), "/opt/mysql/data");
    /// assert_eq!(ctx.expand("%totalram%"), "1024");
    /// ```
    pub fn expand(&self, text: &str) -> String {
        let app_dir = self.app_dir.to_string_lossy();
        let replaced = regex!(r"(?i)%(appdir|totalram)%").replace_all(text, |caps: &Captures| {
            if caps[1].eq_ignore_ascii_case("appdir") {
                app_dir.to_string()
            } else {
                self.total_ram.to_string()
            }
        });
        strip_quotes(replaced.trim()).trim().to_string()
    }

    /// Expands `value` and turns it into an absolute, lexically normalised
    /// path. Relative paths are taken relative to `base_dir`.
    pub fn resolve_path(&self, value: &str, base_dir: &Path) -> PathBuf {
        let expanded = PathBuf::from(self.expand(value));
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        };
        normalize(&joined)
    }

    /// Evaluates a numeric bound such as `134217728`, `%TotalRAM%` or
    /// `%TotalRAM%/3`.
    pub fn resolve_bound(&self, expr: &str) -> Option<u64> {
        let expanded = self.expand(expr);
        match expanded.split_once('/') {
            Some((numerator, divisor)) => {
                let numerator: u64 = numerator.trim().parse().ok()?;
                let divisor: u64 = divisor.trim().parse().ok()?;
                numerator.checked_div(divisor)
            }
            None => expanded.trim().parse().ok(),
        }
    }
}

/// Removes one matching pair of surrounding double or single quotes.
pub fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Directory the application treats as `%AppDir%`.
///
/// This is the directory holding the executable. Inside a macOS `.app`
/// bundle it is the directory containing the bundle.
pub fn application_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    match exe_dir {
        Some(dir) if cfg!(target_os = "macos") && dir.ends_with("Contents/MacOS") => dir
            .ancestors()
            .nth(3)
            .map(Path::to_path_buf)
            .unwrap_or(dir),
        Some(dir) => dir,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
