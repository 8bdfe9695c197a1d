// src/encoder/docstring.rs

//! Turning a test's documentation text into a one-block description.

/// Fallback for tests without documentation.
pub const NO_DESCRIPTION: &str = "No description";

/// Describe a test from its documentation, or [`NO_DESCRIPTION`].
pub fn describe(doc: Option<&str>) -> String {
    doc.map(trim_docstring)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Normalise documentation text.
///
/// The first line is stripped on its own; the common indentation of the
/// remaining non-blank lines is removed, trailing whitespace is dropped and
/// blank lines at either end are discarded.
pub fn trim_docstring(doc: &str) -> String {
    let expanded = expand_tabs(doc, 8);
    let lines: Vec<&str> = expanded.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min();

    let mut trimmed: Vec<String> = vec![first.trim().to_string()];
    if let Some(indent) = indent {
        for line in rest {
            let dedented: String = line.chars().skip(indent).collect();
            trimmed.push(dedented.trim_end().to_string());
        }
    }

    while trimmed.last().is_some_and(|l| l.is_empty()) {
        trimmed.pop();
    }
    let leading_blank = trimmed.iter().take_while(|l| l.is_empty()).count();
    trimmed.drain(..leading_blank);

    trimmed.join("\n")
}

/// Replace tabs with spaces up to the next multiple of `tab_size` columns.
fn expand_tabs(text: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = tab_size - (column % tab_size);
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
