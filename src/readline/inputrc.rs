//! inputrc parser
//!
//! Parses the line-oriented readline binding format:
//!
//! ```text
//! # comment
//! $if mode=emacs            (recognized, not applied)
//! set bell-style none       (recognized, not applied)
//! "\C-a": beginning-of-line
//! "\e[A": "macro text"
//! Control-u: unix-line-discard
//! ```
//!
//! Unsupported or unrecognized lines never abort parsing; they are reported
//! as [`Diagnostic`]s alongside the parsed entries.

use std::fmt;
use std::io::{self, Read};
use std::sync::LazyLock;

use regex::Regex;

use super::keymap::{Action, KeySpec};

const ESC: char = '\x1b';

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#.*$").expect("valid regex"));
static CONDITIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$.*$").expect("valid regex"));
static SET_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^set\s+(\S+)\s+(\S+)\s*$").expect("valid regex"));
static BIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"(.*)"|(.*)):\s*(?:"(.*)"|'(.*)'|(\S+))\s*$"#).expect("valid regex")
});

/// A parsed binding line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number
    pub line: usize,
    pub key: KeySpec,
    pub action: Action,
}

/// A line that was recognized but not applied, or not recognized at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `$if`, `$else`, `$endif`, `$include`
    ConditionalIgnored(String),
    /// `set variable value`
    VariableIgnored { name: String, value: String },
    /// Binding whose symbolic key name has no known sequence
    UnknownKeyName(String),
    /// Line matching no pattern
    Unrecognized(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            DiagnosticKind::ConditionalIgnored(text) => {
                write!(f, "conditional not implemented: {}", text)
            }
            DiagnosticKind::VariableIgnored { name, value } => {
                write!(f, "set variable not implemented: {} = {}", name, value)
            }
            DiagnosticKind::UnknownKeyName(name) => write!(f, "unknown key name: {}", name),
            DiagnosticKind::Unrecognized(text) => write!(f, "unrecognized line: {}", text),
        }
    }
}

/// Result of parsing an inputrc document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputrc {
    pub entries: Vec<Entry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse inputrc text
pub fn parse(text: &str) -> Inputrc {
    let mut inputrc = Inputrc::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let next = raw.trim_start();
        if next.trim_end().is_empty() || COMMENT.is_match(next) {
            continue;
        }

        if CONDITIONAL.is_match(next) {
            inputrc.diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::ConditionalIgnored(next.trim_end().to_string()),
            });
        } else if let Some(caps) = SET_VARIABLE.captures(next) {
            inputrc.diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::VariableIgnored {
                    name: caps[1].to_string(),
                    value: caps[2].to_string(),
                },
            });
        } else if let Some(caps) = BIND.captures(next) {
            let action = if let Some(function) = caps.get(5) {
                Action::Function(function.as_str().to_string())
            } else {
                let text = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
                Action::Macro(text.to_string())
            };

            let key = match (caps.get(1), caps.get(2)) {
                (Some(keyseq), _) => KeySpec::Sequence(parse_key_seq(keyseq.as_str())),
                (None, Some(keyname)) => {
                    let keyname = keyname.as_str().trim();
                    match resolve_key_name(keyname) {
                        Some(sequence) => KeySpec::Sequence(sequence),
                        None => {
                            inputrc.diagnostics.push(Diagnostic {
                                line,
                                kind: DiagnosticKind::UnknownKeyName(keyname.to_string()),
                            });
                            KeySpec::Name(keyname.to_string())
                        }
                    }
                }
                (None, None) => continue,
            };

            inputrc.entries.push(Entry { line, key, action });
        } else {
            inputrc.diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::Unrecognized(next.trim_end().to_string()),
            });
        }
    }

    inputrc
}

/// Parse inputrc from a reader
pub fn parse_reader<R: Read>(mut reader: R) -> io::Result<Inputrc> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

/// Parse a quoted key sequence body into codepoints
///
/// Escapes are applied left to right:
///
/// | escape | value |
/// |---|---|
/// | `\C-x` | control form of `x` |
/// | `\M-x` | ESC, then the control form of `x` |
/// | `\e` | ESC |
/// | `\\` `\"` `\'` | the literal character |
/// | `\a \b \d \f \n \r \t \v` | 7, 8, 127, 12, 10, 13, 9, 11 |
/// | `\nnn` | one to three octal digits |
/// | `\xHH` | one or two hex digits |
///
/// Anything else is taken literally.
pub fn parse_key_seq(keyseq: &str) -> Vec<char> {
    let chars: Vec<char> = keyseq.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let rest = &chars[i..];
        if rest[0] != '\\' || rest.len() < 2 {
            out.push(rest[0]);
            i += 1;
            continue;
        }

        let fixed = match rest[1] {
            'C' | 'M' if rest.len() > 3 && rest[2] == '-' => {
                if rest[1] == 'M' {
                    out.push(ESC);
                }
                out.push(control(rest[3]));
                i += 4;
                continue;
            }
            'e' => ESC,
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'a' => '\x07',
            'b' => '\x08',
            'd' => '\x7f',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '0'..='7' => {
                let (value, len) = radix_digits(&rest[1..], 8, 3);
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
                i += 1 + len;
                continue;
            }
            'x' if rest.len() > 2 && rest[2].is_ascii_hexdigit() => {
                let (value, len) = radix_digits(&rest[2..], 16, 2);
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
                i += 2 + len;
                continue;
            }
            _ => {
                out.push('\\');
                i += 1;
                continue;
            }
        };
        out.push(fixed);
        i += 2;
    }

    out
}

/// Control form of a character: `(uppercase(c) - '@') & 0x7F`
fn control(c: char) -> char {
    let upper = c.to_uppercase().next().unwrap_or(c) as u32;
    char::from((upper.wrapping_sub('@' as u32) & 0x7F) as u8)
}

/// Read up to `max` leading digits in `radix`, returning the value and digit count
fn radix_digits(chars: &[char], radix: u32, max: usize) -> (u32, usize) {
    let mut value = 0;
    let mut len = 0;
    for c in chars.iter().take(max) {
        match c.to_digit(radix) {
            Some(d) => {
                value = value * radix + d;
                len += 1;
            }
            None => break,
        }
    }
    (value, len)
}

/// Resolve a symbolic key name such as `Control-u` or `Meta-Rubout`
pub fn resolve_key_name(name: &str) -> Option<Vec<char>> {
    let mut rest = name;
    let mut ctrl = false;
    let mut meta = false;

    loop {
        let lower = rest.to_ascii_lowercase();
        if lower.starts_with("control-") {
            ctrl = true;
            rest = &rest["control-".len()..];
        } else if lower.starts_with("meta-") {
            meta = true;
            rest = &rest["meta-".len()..];
        } else if lower.starts_with("c-") && rest.len() > 2 {
            ctrl = true;
            rest = &rest[2..];
        } else if lower.starts_with("m-") && rest.len() > 2 {
            meta = true;
            rest = &rest[2..];
        } else {
            break;
        }
    }

    let key = match rest.to_ascii_lowercase().as_str() {
        "del" | "rubout" => '\x7f',
        "esc" | "escape" => ESC,
        "lfd" | "newline" => '\n',
        "ret" | "return" => '\r',
        "spc" | "space" => ' ',
        "tab" => '\t',
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return None,
            }
        }
    };

    let key = if ctrl { control(key) } else { key };
    let mut sequence = Vec::with_capacity(2);
    if meta {
        sequence.push(ESC);
    }
    sequence.push(key);
    Some(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<u32> {
        parse_key_seq(s).into_iter().map(|c| c as u32).collect()
    }

    #[test]
    fn test_control_and_meta() {
        assert_eq!(seq("\\C-a"), vec![1]);
        assert_eq!(seq("\\C-A"), vec![1]);
        assert_eq!(seq("\\M-a"), vec![27, 1]);
        assert_eq!(seq("\\C-?"), vec![127]);
        assert_eq!(seq("\\C-@"), vec![0]);
    }

    #[test]
    fn test_fixed_escapes() {
        assert_eq!(seq("\\e"), vec![27]);
        assert_eq!(seq("\\\\"), vec![92]);
        assert_eq!(seq("\\\""), vec![34]);
        assert_eq!(seq("\\'"), vec![39]);
        assert_eq!(
            seq("\\a\\b\\d\\f\\n\\r\\t\\v"),
            vec![7, 8, 127, 12, 10, 13, 9, 11]
        );
    }

    #[test]
    fn test_octal_and_hex() {
        assert_eq!(seq("\\101"), vec![65]);
        assert_eq!(seq("\\0"), vec![0]);
        assert_eq!(seq("\\1012"), vec![65, '2' as u32]);
        assert_eq!(seq("\\x41"), vec![65]);
        assert_eq!(seq("\\x4"), vec![4]);
        assert_eq!(seq("\\x414"), vec![65, '4' as u32]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(seq("ab"), vec![97, 98]);
        assert_eq!(seq("\\e[A"), vec![27, 91, 65]);
        // Incomplete escapes fall back to the literal backslash
        assert_eq!(seq("\\C-"), vec![92, 'C' as u32, '-' as u32]);
        assert_eq!(seq("\\xg"), vec![92, 'x' as u32, 'g' as u32]);
        assert_eq!(seq("\\"), vec![92]);
        assert_eq!(seq("\\q"), vec![92, 'q' as u32]);
    }

    #[test]
    fn test_parse_function_and_macros() {
        let parsed = parse(
            "\"\\C-a\": beginning-of-line\n\"\\eg\": \"git status\"\n\"\\eh\": 'help me'\n",
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(parsed.entries[0].key, KeySpec::Sequence(vec!['\x01']));
        assert_eq!(
            parsed.entries[0].action,
            Action::Function("beginning-of-line".to_string())
        );
        assert_eq!(
            parsed.entries[1].action,
            Action::Macro("git status".to_string())
        );
        assert_eq!(parsed.entries[2].action, Action::Macro("help me".to_string()));
        assert_eq!(parsed.entries[2].line, 3);
    }

    #[test]
    fn test_parse_key_names() {
        let parsed = parse("Control-u: unix-line-discard\nMeta-Rubout: backward-kill-word\n");
        assert_eq!(parsed.entries[0].key, KeySpec::Sequence(vec!['\x15']));
        assert_eq!(parsed.entries[1].key, KeySpec::Sequence(vec!['\x1b', '\x7f']));

        let parsed = parse("Hyper-x: nothing\n");
        assert_eq!(parsed.entries[0].key, KeySpec::Name("Hyper-x".to_string()));
        assert_eq!(
            parsed.diagnostics[0].kind,
            DiagnosticKind::UnknownKeyName("Hyper-x".to_string())
        );
    }

    #[test]
    fn test_ignored_lines() {
        let parsed = parse(
            "# comment\n\n$if mode=emacs\nset bell-style none\n$endif\nthis is not a binding\n",
        );
        assert!(parsed.entries.is_empty());
        let kinds: Vec<_> = parsed.diagnostics.iter().map(|d| (d.line, &d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (
                    3,
                    &DiagnosticKind::ConditionalIgnored("$if mode=emacs".to_string())
                ),
                (
                    4,
                    &DiagnosticKind::VariableIgnored {
                        name: "bell-style".to_string(),
                        value: "none".to_string()
                    }
                ),
                (5, &DiagnosticKind::ConditionalIgnored("$endif".to_string())),
                (
                    6,
                    &DiagnosticKind::Unrecognized("this is not a binding".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_bad_lines_do_not_abort() {
        let parsed = parse("garbage\n\"\\C-e\": end-of-line\r\n");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].key, KeySpec::Sequence(vec!['\x05']));
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn test_parse_reader() {
        let parsed = parse_reader("\"\\C-k\": kill-line\n".as_bytes()).unwrap();
        assert_eq!(parsed.entries.len(), 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            line: 4,
            kind: DiagnosticKind::VariableIgnored {
                name: "bell-style".to_string(),
                value: "none".to_string(),
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "line 4: set variable not implemented: bell-style = none"
        );
    }
}
