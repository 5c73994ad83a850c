// Display: renders the coordinator's state as plain lines of text. Every
// function takes a writer so output can be captured in tests.

use crossterm::style::Stylize;
use std::io::Write;

use crate::api::SummaryResult;
use crate::coordinator::UiStatus;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print whatever the current status calls for. Idle and Loading print
/// nothing: the spinner covers Loading.
pub fn print_status(w: &mut dyn Write, status: UiStatus<'_>, color: ColorMode) -> std::io::Result<()> {
    match status {
        UiStatus::Idle | UiStatus::Loading => Ok(()),
        UiStatus::Error(message) => print_error(w, message, color),
        UiStatus::Success(result) => print_result(w, result, color),
    }
}

pub fn print_error(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    let line = format!("⚠ {}", message);
    if color.enabled() {
        writeln!(w, "{}", line.red())
    } else {
        writeln!(w, "{}", line)
    }
}

pub fn print_result(w: &mut dyn Write, result: &SummaryResult, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Summary".bold().underlined())?;
    } else {
        writeln!(w, "Summary")?;
    }
    writeln!(w, "{}", emphasize(&result.highlighted, color))?;

    if let (Some(original), Some(summary)) = (result.original_length, result.summary_length) {
        let line = compression_line(original, summary);
        if color.enabled() {
            writeln!(w, "{}", line.dim())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }

    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Keywords".bold())?;
    } else {
        writeln!(w, "Keywords")?;
    }
    if result.keywords.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for keyword in &result.keywords {
        if color.enabled() {
            writeln!(w, "  - {}", keyword.as_str().cyan())?;
        } else {
            writeln!(w, "  - {}", keyword)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

fn compression_line(original: u64, summary: u64) -> String {
    if original == 0 {
        return format!("{} characters summarized into {}", original, summary);
    }
    let percent = summary as f64 * 100.0 / original as f64;
    format!(
        "{} characters summarized into {} ({:.0}% of the original)",
        original, summary, percent
    )
}

/// Keywords come back wrapped as `*word*`, and the summary itself may use
/// markdown `**bold**`. With color, a run of asterisks opens a span that is
/// closed by the next run of the same length; the span is printed bold and
/// the markers dropped. Markers that open or close on whitespace, or never
/// close, are kept as typed. Without color the text is left exactly as
/// received.
pub fn emphasize(highlighted: &str, color: ColorMode) -> String {
    if !color.enabled() {
        return highlighted.to_string();
    }
    let mut out = String::with_capacity(highlighted.len());
    let mut rest = highlighted;
    while let Some(start) = rest.find('*') {
        out.push_str(&rest[..start]);
        let run = marker_len(&rest[start..]);
        let marker = &rest[start..start + run];
        let after = &rest[start + run..];
        match closing_marker(after, run) {
            Some(end) => {
                out.push_str(&after[..end].bold().to_string());
                rest = &after[end + run..];
            }
            None => {
                out.push_str(marker);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn marker_len(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b'*').count()
}

// Offset of the run of exactly `run` asterisks that closes a span opened
// just before `body`.
fn closing_marker(body: &str, run: usize) -> Option<usize> {
    if body.is_empty() || body.starts_with(char::is_whitespace) {
        return None;
    }
    let mut offset = 0;
    while let Some(pos) = body[offset..].find('*') {
        let at = offset + pos;
        let len = marker_len(&body[at..]);
        if len == run && at > 0 && !body[..at].ends_with(char::is_whitespace) {
            return Some(at);
        }
        offset = at + len;
    }
    None
}
