//! Terminal front-end for the form.
//!
//! Form, log lines and results go to stdout; alerts and field errors go to
//! stderr so they survive output redirection.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::form::{BoundForm, FieldId, FieldKind, FormView, TagSelector, Verdict, FORM_SCHEMA};
use crate::results::ResultsView;

pub struct TerminalView<O: Write, E: Write> {
    out: O,
    err: E,
    assume_yes: bool,
    quiet: bool,
}

impl TerminalView<io::Stdout, io::Stderr> {
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), assume_yes)
    }
}

impl<O: Write, E: Write> TerminalView<O, E> {
    pub fn new(out: O, err: E, assume_yes: bool) -> Self {
        Self {
            out,
            err,
            assume_yes,
            quiet: false,
        }
    }

    /// Suppress the form dump on render.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }

    // Output errors on a terminal have nowhere better to go.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn eline(&mut self, text: &str) {
        let _ = writeln!(self.err, "{}", text);
    }
}

fn tags_line(selector: &TagSelector) -> String {
    let mut parts: Vec<String> = selector
        .tags()
        .map(|t| {
            let mark = if t.selected { "x" } else { " " };
            if t.key == t.display {
                format!("[{}] {}", mark, t.key)
            } else {
                format!("[{}] {} ({})", mark, t.key, t.display)
            }
        })
        .collect();
    for key in selector.get_selected() {
        if !selector.is_offered(&key) {
            parts.push(format!("[x] {} (not in catalog)", key));
        }
    }
    if parts.is_empty() {
        return "(none offered)".to_string();
    }
    parts.join("  ")
}

impl<O: Write, E: Write> FormView for TerminalView<O, E> {
    fn render_form(&mut self, form: &BoundForm) {
        if self.quiet {
            return;
        }
        for spec in FORM_SCHEMA {
            let value = match (spec.id, spec.kind) {
                (FieldId::Numeric(n), FieldKind::Number { editable }) => {
                    let lock = if editable { "" } else { "  (read-only)" };
                    format!("{}{}", form.input(n), lock)
                }
                (FieldId::IpVersion, _) => form.ip_version().as_str().to_string(),
                (FieldId::GroupBy, _) => form.group_by().as_str().to_string(),
                (FieldId::FilterRegions, _) => tags_line(form.regions()),
                (FieldId::FilterColos, _) => tags_line(form.colos()),
                (FieldId::Numeric(n), _) => form.input(n).to_string(),
            };
            let line = format!("{:<26} {:<36} {}", spec.id.key(), spec.label, value);
            self.line(line.trim_end());
            if let FieldKind::Select { choices } = spec.kind {
                let list = choices
                    .iter()
                    .map(|c| format!("{} = {}", c.value, c.text))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.line(&format!("{:<26} choices: {}", "", list));
            }
        }
    }

    fn show_field_errors(&mut self, verdict: &Verdict) {
        for (field, message) in verdict.errors() {
            self.eline(&format!("{}: {}", field.key(), message));
        }
    }

    fn alert(&mut self, message: &str) {
        self.eline(message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let _ = write!(self.err, "{} [y/N] ", message);
        let _ = self.err.flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn set_run_enabled(&mut self, _enabled: bool) {}

    fn clear_run_output(&mut self) {}

    fn append_log(&mut self, line: &str) {
        self.line(line);
    }

    fn show_results(&mut self, results: &ResultsView) {
        let table = results.to_text(Instant::now());
        self.line(table.trim_end());
    }
}
