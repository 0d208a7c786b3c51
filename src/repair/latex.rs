//! Deep LaTeX repair: reverses silent escape collisions after JSON parsing.
//!
//! A LaTeX command such as `\frac` inside a JSON string is a *valid* escape
//! (`\f`) followed by `rac`, so the parser yields a formfeed followed by the
//! rest of the command name. This module walks a parsed tree and rebuilds the
//! command wherever a control character is immediately followed by one of the
//! known command tails.
//!
//! The built-in tails cover commands seen in practice and can be extended
//! through configuration. Commands missing from the table are left untouched.

use std::borrow::Cow;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON escape letters that collide with LaTeX command initials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlChar {
    Formfeed,
    Tab,
    Newline,
    Backspace,
    CarriageReturn,
}

impl ControlChar {
    pub const ALL: [ControlChar; 5] = [
        ControlChar::Formfeed,
        ControlChar::Tab,
        ControlChar::Newline,
        ControlChar::Backspace,
        ControlChar::CarriageReturn,
    ];

    /// The character the JSON parser produced.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            ControlChar::Formfeed => '\u{0C}',
            ControlChar::Tab => '\t',
            ControlChar::Newline => '\n',
            ControlChar::Backspace => '\u{08}',
            ControlChar::CarriageReturn => '\r',
        }
    }

    /// The backslash plus escape letter that was consumed, e.g. `\f`.
    #[must_use]
    pub fn latex_prefix(self) -> &'static str {
        match self {
            ControlChar::Formfeed => r"\f",
            ControlChar::Tab => r"\t",
            ControlChar::Newline => r"\n",
            ControlChar::Backspace => r"\b",
            ControlChar::CarriageReturn => r"\r",
        }
    }

    fn regex_atom(self) -> &'static str {
        match self {
            ControlChar::Formfeed => r"\x0C",
            ControlChar::Tab => r"\t",
            ControlChar::Newline => r"\n",
            ControlChar::Backspace => r"\x08",
            ControlChar::CarriageReturn => r"\r",
        }
    }
}

/// One command tail: the letters that follow the escape letter.
///
/// `boundary` forbids a letter right after the tail, for short tails that
/// would otherwise match ordinary words (`\to`, `\nu`, `\ni`). Digits,
/// `_`, `^` and punctuation may follow, so `\nu_1` is still rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexTail {
    pub control: ControlChar,
    pub tail: String,
    #[serde(default)]
    pub boundary: bool,
}

impl LatexTail {
    #[must_use]
    pub fn new(control: ControlChar, tail: impl Into<String>, boundary: bool) -> Self {
        Self {
            control,
            tail: tail.into(),
            boundary,
        }
    }

}

const SEED_TAILS: &[(ControlChar, &str, bool)] = &[
    (ControlChar::Formfeed, "rac", false),
    (ControlChar::Formfeed, "lat", false),
    (ControlChar::Formfeed, "loor", false),
    (ControlChar::Formfeed, "orall", false),
    (ControlChar::Tab, "ilde", false),
    (ControlChar::Tab, "heta", false),
    (ControlChar::Tab, "au", false),
    (ControlChar::Tab, "imes", false),
    (ControlChar::Tab, "ext", false),
    (ControlChar::Tab, "o", true),
    (ControlChar::Tab, "op", false),
    (ControlChar::Tab, "riangle", false),
    (ControlChar::Newline, "u", true),
    (ControlChar::Newline, "abla", false),
    (ControlChar::Newline, "eg", false),
    (ControlChar::Newline, "eq", false),
    (ControlChar::Newline, "ot", false),
    (ControlChar::Newline, "i", true),
    (ControlChar::Newline, "subset", false),
    (ControlChar::Newline, "parallel", false),
    (ControlChar::Newline, "rightarrow", false),
    (ControlChar::Backspace, "eta", false),
    (ControlChar::Backspace, "inom", false),
    (ControlChar::Backspace, "ar", false),
    (ControlChar::Backspace, "egin", false),
    (ControlChar::Backspace, "ig", false),
    (ControlChar::Backspace, "oldsymbol", false),
    (ControlChar::CarriageReturn, "ho", false),
    (ControlChar::CarriageReturn, "ightarrow", false),
    (ControlChar::CarriageReturn, "Rightarrow", false),
];

/// The built-in tail table.
#[must_use]
pub fn seed_tails() -> Vec<LatexTail> {
    SEED_TAILS
        .iter()
        .map(|&(control, tail, boundary)| LatexTail::new(control, tail, boundary))
        .collect()
}

#[derive(Debug)]
struct LatexRule {
    control: ControlChar,
    regex: Regex,
    boundary_tails: Vec<String>,
    tail_count: usize,
}

impl LatexRule {
    fn compile(control: ControlChar, tails: &[&LatexTail]) -> Result<Self, regex_lite::Error> {
        // Longest first, so `op` is tried before `o`.
        let mut branches: Vec<&str> = tails.iter().map(|t| t.tail.as_str()).collect();
        branches.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        branches.dedup();
        let alternation: Vec<String> = branches.iter().map(|t| regex_lite::escape(t)).collect();
        let pattern = format!("{}({})", control.regex_atom(), alternation.join("|"));

        Ok(Self {
            control,
            regex: Regex::new(&pattern)?,
            boundary_tails: tails
                .iter()
                .filter(|t| t.boundary)
                .map(|t| t.tail.clone())
                .collect(),
            tail_count: tails.len(),
        })
    }

    fn needs_boundary(&self, tail: &str) -> bool {
        self.boundary_tails.iter().any(|t| t == tail)
    }

    /// Rewritten text, or `None` when no occurrence was rebuilt.
    fn apply(&self, s: &str) -> Option<String> {
        let prefix = self.control.latex_prefix();
        let mut out: Option<String> = None;
        let mut copied = 0usize;

        for caps in self.regex.captures_iter(s) {
            let (Some(whole), Some(tail)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if self.needs_boundary(tail.as_str())
                && s[whole.end()..].starts_with(char::is_alphabetic)
            {
                continue;
            }
            let buf = out.get_or_insert_with(|| String::with_capacity(s.len() + 8));
            buf.push_str(&s[copied..whole.start()]);
            buf.push_str(prefix);
            buf.push_str(tail.as_str());
            copied = whole.end();
        }

        out.map(|mut buf| {
            buf.push_str(&s[copied..]);
            buf
        })
    }
}

/// Compiled, immutable repair table. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct LatexRepairTable {
    rules: Vec<LatexRule>,
}

impl LatexRepairTable {
    /// Build the table from the seed tails only.
    #[must_use]
    pub fn seed() -> Self {
        Self::with_extra_tails(&[]).unwrap_or_else(|err| {
            tracing::error!("built-in LaTeX repair table failed to compile: {err}");
            Self { rules: Vec::new() }
        })
    }

    /// Build the table from the seed tails plus `extra`.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error when an extra tail produces an
    /// invalid pattern.
    pub fn with_extra_tails(extra: &[LatexTail]) -> Result<Self, regex_lite::Error> {
        let mut all = seed_tails();
        for tail in extra {
            if !all.contains(tail) {
                all.push(tail.clone());
            }
        }

        let mut rules = Vec::with_capacity(ControlChar::ALL.len());
        for control in ControlChar::ALL {
            let tails: Vec<&LatexTail> = all.iter().filter(|t| t.control == control).collect();
            if !tails.is_empty() {
                rules.push(LatexRule::compile(control, &tails)?);
            }
        }
        Ok(Self { rules })
    }

    /// Number of tails across all control characters.
    #[must_use]
    pub fn tail_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.tail_count).sum()
    }

    /// Rebuild corrupted LaTeX commands in one string.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    #[must_use]
    pub fn repair_str<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if !s.contains(is_repairable_control) {
            return Cow::Borrowed(s);
        }

        let mut current = Cow::Borrowed(s);
        for rule in &self.rules {
            if !current.contains(rule.control.as_char()) {
                continue;
            }
            if let Some(fixed) = rule.apply(&current) {
                current = Cow::Owned(fixed);
            }
        }
        current
    }

    /// Repair every string value in `value`, recursively, in place.
    ///
    /// Object keys and non-string scalars are left alone. Returns the number
    /// of strings that were rewritten.
    pub fn repair_value(&self, value: &mut Value) -> usize {
        match value {
            Value::String(s) => {
                let fixed = match self.repair_str(s) {
                    Cow::Owned(fixed) => Some(fixed),
                    Cow::Borrowed(_) => None,
                };
                match fixed {
                    Some(fixed) => {
                        *s = fixed;
                        1
                    }
                    None => 0,
                }
            }
            Value::Array(items) => items.iter_mut().map(|item| self.repair_value(item)).sum(),
            Value::Object(map) => map.values_mut().map(|item| self.repair_value(item)).sum(),
            Value::Null | Value::Bool(_) | Value::Number(_) => 0,
        }
    }
}

impl Default for LatexRepairTable {
    fn default() -> Self {
        Self::seed()
    }
}

#[inline]
fn is_repairable_control(c: char) -> bool {
    matches!(c, '\u{0C}' | '\t' | '\n' | '\u{08}' | '\r')
}

#[cfg(test)]
#[path = "latex_tests.rs"]
mod tests;
