// Copyright (c) 2025 - Cowboy AI, Inc.
//! Ruby Literal Rules
//!
//! A Vagrantfile is Ruby. These helpers turn domain values into Ruby source
//! fragments: escaped double-quoted strings, type-directed option literals,
//! hash keys, comments and heredocs.

use crate::domain::{plugin::is_identifier, ConfigValue};

/// Indentation unit
pub const INDENT: &str = "  ";

/// Escape text for a Ruby double-quoted string
///
/// Backslash first, then the double quote, then the interpolation markers
/// `#{`, `#$` and `#@`. Line breaks become `\n` / `\r` so a literal never
/// spans lines.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Double-quoted Ruby string literal
pub fn quote(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

/// Array of double-quoted strings
pub fn string_array<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<String> = items.iter().map(|s| quote(s.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

/// Type-directed literal for an option value
///
/// Booleans are bare `true`/`false`, strings quoted, lists bracketed, and
/// numbers written as-is.
pub fn literal(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::Number(n) => n.to_string(),
        ConfigValue::String(s) => quote(s),
        ConfigValue::StringList(items) => string_array(items),
    }
}

/// Hash key in keyword style (`key:`), quoted when not a plain identifier
pub fn hash_key(key: &str) -> String {
    if is_identifier(key) {
        format!("{}:", key)
    } else {
        format!("{}:", quote(key))
    }
}

/// `key: literal` pair for an argument list
pub fn hash_pair(key: &str, value: &ConfigValue) -> String {
    format!("{} {}", hash_key(key), literal(value))
}

/// Comment line text with line breaks folded into spaces
pub fn comment(text: &str) -> String {
    let folded: Vec<&str> = text.lines().map(str::trim_end).collect();
    format!("# {}", folded.join(" ").trim_end())
}

/// Heredoc terminator that does not occur as a line of `body`
pub fn heredoc_tag(base: &str, body: &str) -> String {
    let mut tag = base.to_string();
    while body.lines().any(|line| line.trim() == tag) {
        tag.push_str("_END");
    }
    tag
}

/// Opener of a non-interpolating heredoc whose terminator may be indented
///
/// Body lines are emitted raw, so the script text reaches the guest exactly
/// as stored.
pub fn heredoc_open(tag: &str) -> String {
    format!("<<-'{}'", tag)
}

/// Terminator named by a heredoc opener ending `line`
fn opened_heredoc(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let start = line.rfind("<<-'")? + 4;
    let tag = line[start..].strip_suffix('\'')?;
    (!tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')).then_some(tag)
}

/// Prefix every non-empty line with `level` indentation units
///
/// Heredoc bodies are left untouched; their terminators are indented.
pub fn indent(lines: Vec<String>, level: usize) -> Vec<String> {
    let prefix = INDENT.repeat(level);
    let mut open: Option<String> = None;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(tag) = &open {
            if line.trim() != tag {
                out.push(line);
                continue;
            }
            open = None;
        } else {
            open = opened_heredoc(&line).map(String::from);
        }

        if line.is_empty() {
            out.push(line);
        } else {
            out.push(format!("{}{}", prefix, line));
        }
    }
    out
}

/// Heredoc body lines, exactly as they appear in `body`
pub fn heredoc_body(body: &str) -> Vec<String> {
    body.split_terminator('\n').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_order() {
        assert_eq!(escape(r#"a\b"#), r#"a\\b"#);
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape("#{user}"), r"\#{user}");
        assert_eq!(escape("#$HOME #@ivar # plain"), r"\#$HOME \#@ivar # plain");
        assert_eq!(escape("\\\"#{"), "\\\\\\\"\\#{");
    }

    #[test]
    fn test_escape_line_breaks() {
        assert_eq!(escape("a\nb\r\n"), r"a\nb\r\n");
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal(&ConfigValue::Bool(false)), "false");
        assert_eq!(literal(&ConfigValue::from(42i64)), "42");
        assert_eq!(literal(&ConfigValue::from("nfs")), "\"nfs\"");
        assert_eq!(
            literal(&ConfigValue::from(vec!["vers=3", "tcp"])),
            r#"["vers=3", "tcp"]"#
        );
        let float: ConfigValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(literal(&float), "1.5");
    }

    #[test]
    fn test_hash_keys() {
        assert_eq!(hash_key("mount_options"), "mount_options:");
        assert_eq!(hash_key("extra-vars"), "\"extra-vars\":");
    }

    #[test]
    fn test_comment_folds_lines() {
        assert_eq!(comment("Installs docker\nand compose"), "# Installs docker and compose");
    }

    #[test]
    fn test_heredoc_tag_avoids_body_lines() {
        assert_eq!(heredoc_tag("SCRIPT", "echo hi"), "SCRIPT");
        assert_eq!(heredoc_tag("SCRIPT", "echo hi\n  SCRIPT\n"), "SCRIPT_END");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        let lines = indent(vec!["a".into(), String::new(), "b".into()], 2);
        assert_eq!(lines, vec!["    a", "", "    b"]);
    }

    #[test]
    fn test_heredoc_body_is_raw() {
        let script = "    indented\ntrailing   \n\n\tlast";
        assert_eq!(heredoc_body(script), vec!["    indented", "trailing   ", "", "\tlast"]);
    }

    #[test]
    fn test_heredoc_opener_must_end_the_line() {
        assert_eq!(opened_heredoc("$s = <<-'SCRIPT'"), Some("SCRIPT"));
        assert_eq!(opened_heredoc("trigger.info = \"<<-'X' here\""), None);
    }

    #[test]
    fn test_indent_leaves_heredoc_bodies_alone() {
        let lines = vec![
            format!("$s = {}", heredoc_open("SCRIPT")),
            "  keep".to_string(),
            "raw".to_string(),
            "SCRIPT".to_string(),
            "after".to_string(),
        ];
        assert_eq!(
            indent(lines, 1),
            vec!["  $s = <<-'SCRIPT'", "  keep", "raw", "  SCRIPT", "  after"]
        );
    }
}
