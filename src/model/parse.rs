//! Line scanner for option files.
//!
//! Knows nothing about the schema: it only splits text into sections and
//! entries. Merging with the schema happens in [`super::ConfigModel`].

use lazy_regex::regex_is_match;
use log::trace;

use super::{ConfigEntry, ConfigSection};

/// One `key = value` line, with its disable marker removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub active: bool,
    pub bare: bool,
}

/// Returns the section name if `line` is a `[section]` header.
pub(crate) fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Splits a trimmed line into key and value.
///
/// A leading run of `#` / `;` marks the entry as disabled. The value has one
/// pair of surrounding quotes removed. Lines without `=` are only accepted
/// when they consist of a single option name (`skip-networking`), which
/// MySQL treats as a flag; anything else is not an entry.
pub(crate) fn entry_line(line: &str) -> Option<EntryLine<'_>> {
    let stripped = line.trim_start_matches(['#', ';']);
    let active = stripped.len() == line.len();
    let stripped = stripped.trim();

    match stripped.split_once('=') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(EntryLine {
                key,
                value: crate::placeholders::strip_quotes(value.trim()),
                active,
                bare: false,
            })
        }
        None if regex_is_match!(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$", stripped) => Some(EntryLine {
            key: stripped,
            value: "",
            active,
            bare: true,
        }),
        None => None,
    }
}

/// Whether `line` is a `!include` / `!includedir` style directive.
fn is_directive(line: &str) -> bool {
    line.starts_with('!')
}

/// Scans `text` into the directives before the first header and the
/// sections in file order.
///
/// Section names are matched case-insensitively; the first spelling seen is
/// kept. Directive lines are kept verbatim. Blank lines and other lines
/// before the first header are skipped. A key seen twice keeps the last
/// occurrence.
pub(crate) fn scan(text: &str) -> (Vec<String>, Vec<ConfigSection>) {
    let mut preamble: Vec<String> = Vec::new();
    let mut sections: Vec<ConfigSection> = Vec::new();
    let mut current: Option<usize> = None;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = section_header(line) {
            let idx = match sections
                .iter()
                .position(|s| s.name().eq_ignore_ascii_case(name))
            {
                Some(idx) => idx,
                None => {
                    sections.push(ConfigSection::new(name));
                    sections.len() - 1
                }
            };
            current = Some(idx);
            continue;
        }

        let Some(idx) = current else {
            if is_directive(line) {
                preamble.push(line.to_string());
            } else {
                trace!("Skipping line {} outside any section", number + 1);
            }
            continue;
        };
        let section = &mut sections[idx];
        section.raw_lines.push(line.to_string());

        if is_directive(line) {
            section.directives.push(line.to_string());
            continue;
        }

        match entry_line(line) {
            Some(entry) => section.upsert(ConfigEntry {
                key: entry.key.to_string(),
                value: entry.value.to_string(),
                active: entry.active,
                bare: entry.bare,
            }),
            None => trace!("Skipping line {}: {}", number + 1, line),
        }
    }

    (preamble, sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_header() {
        assert_eq!(section_header("[mysqld]"), Some("mysqld"));
        assert_eq!(section_header("[ MySQLD ]"), Some("MySQLD"));
        assert_eq!(section_header("[]"), None);
        assert_eq!(section_header("mysqld]"), None);
    }

    #[test]
    fn test_entry_splits_on_first_equals() {
        let entry = entry_line("init_connect=SET NAMES=utf8").unwrap();
        assert_eq!(entry.key, "init_connect");
        assert_eq!(entry.value, "SET NAMES=utf8");
        assert!(entry.active);
    }

    #[test]
    fn test_disable_markers() {
        for line in ["#port=3306", ";port=3306", "##port = 3306", "#; port=3306"] {
            let entry = entry_line(line).unwrap();
            assert_eq!(entry.key, "port", "{line}");
            assert!(!entry.active, "{line}");
        }
    }

    #[test]
    fn test_quotes_are_stripped() {
        let entry = entry_line("basedir = \"C:/Program Files/MySQL\"").unwrap();
        assert_eq!(entry.value, "C:/Program Files/MySQL");
    }

    #[test]
    fn test_bare_flags_and_prose() {
        let flag = entry_line("skip-networking").unwrap();
        assert!(flag.bare);
        assert_eq!(flag.value, "");
        assert!(entry_line("# This is a comment about the server").is_none());
        assert!(entry_line("#-----------").is_none());
        assert!(entry_line("= value").is_none());
    }

    #[test]
    fn test_scan_merges_sections_and_last_seen_wins() {
        let text = "\
orphan=1
[mysqld]
port=3306
[client]
port=3307
[MYSQLD]
#port=3308
";
        let (preamble, sections) = scan(text);
        assert!(preamble.is_empty());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name(), "mysqld");
        let port = sections[0].get("PORT").unwrap();
        assert_eq!(port.value, "3308");
        assert!(!port.active);
        assert_eq!(sections[0].entries().count(), 1);
    }

    #[test]
    fn test_scan_keeps_include_directives() {
        let text = "\
!include /etc/mysql/common.cnf
[mysqld]
port=3306
!includedir /etc/mysql/conf.d/
";
        let (preamble, sections) = scan(text);
        assert_eq!(preamble, vec!["!include /etc/mysql/common.cnf".to_string()]);
        assert_eq!(
            sections[0].directives,
            vec!["!includedir /etc/mysql/conf.d/".to_string()]
        );
        assert_eq!(sections[0].entries().count(), 1);
    }
}
