// UI layer: the interactive menu built on `dialoguer`. It edits the form,
// hands submissions to the coordinator and offers the result actions. The
// flows are small and synchronous to keep them easy to follow.

use anyhow::Result;
use dialoguer::{Editor, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::api::{ApiClient, DownloadKind};
use crate::capabilities::{FileDownload, FolderDownload, SystemSpeaker, TextToSpeech};
use crate::config::Config;
use crate::coordinator::{dispatch, Coordinator, UiStatus};
use crate::display::{print_error, print_status, ColorMode};
use crate::submission::{InputForm, SummaryRequest, UploadFile};

/// Everything one interactive run needs. The capability ports are boxed so
/// another front-end can inject its own.
pub struct Session {
    api: ApiClient,
    form: InputForm,
    coordinator: Coordinator,
    speaker: Box<dyn TextToSpeech>,
    downloads: Box<dyn FileDownload>,
    color: ColorMode,
}

impl Session {
    /// Session with the system speech program and the download folder.
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self::with_capabilities(
            api,
            ColorMode(config.color),
            Box::new(SystemSpeaker::new(config.speech_program.clone())),
            Box::new(FolderDownload::new(config.download_dir.clone())),
        )
    }

    pub fn with_capabilities(
        api: ApiClient,
        color: ColorMode,
        speaker: Box<dyn TextToSpeech>,
        downloads: Box<dyn FileDownload>,
    ) -> Self {
        Session {
            api,
            form: InputForm::new(),
            coordinator: Coordinator::new(),
            speaker,
            downloads,
            color,
        }
    }
}

/// Main interactive menu. Runs a select loop until the user picks "Exit".
pub fn main_menu(mut session: Session) -> Result<()> {
    println!("Gistify - Summarizer ({})", session.api.base_url());
    loop {
        let items = vec![
            format!("Text: {}", preview(session.form.text())),
            format!("PDF URL: {}", preview(session.form.pdf_url())),
            format!(
                "PDF file: {}",
                session.form.file().map_or("(none)", |f| f.file_name.as_str())
            ),
            "Summarize".to_string(),
            "Summarize a web page".to_string(),
            "Clear form".to_string(),
            "Exit".to_string(),
        ];
        let selection = Select::new().items(&items).default(3).interact()?;
        match selection {
            0 => edit_text(&mut session.form)?,
            1 => {
                let url: String = Input::new()
                    .with_prompt("PDF URL")
                    .with_initial_text(session.form.pdf_url())
                    .allow_empty(true)
                    .interact_text()?;
                session.form.set_pdf_url(url.trim());
            }
            2 => choose_file(&mut session.form)?,
            3 => {
                let input = session.form.submit();
                let spinner = spinner("Summarizing...")?;
                session.coordinator.submit(&session.api, &input);
                spinner.finish_and_clear();
                show_outcome(&mut session)?;
            }
            4 => {
                let url: String = Input::new().with_prompt("Web page URL").interact_text()?;
                summarize_web_page(&mut session, url.trim().to_string())?;
            }
            5 => session.form.clear(),
            6 => break,
            _ => {}
        }
    }
    Ok(())
}

/// The web page variant skips the form and goes straight to dispatch.
fn summarize_web_page(session: &mut Session, url: String) -> Result<()> {
    let request = SummaryRequest::WebPage(url);
    let ticket = session.coordinator.begin();
    let spinner = spinner("Summarizing web page...")?;
    let outcome = dispatch(&session.api, &request);
    spinner.finish_and_clear();
    session.coordinator.finish(ticket, outcome);
    show_outcome(session)
}

/// Print the state after a submission and, on success, offer the actions.
fn show_outcome(session: &mut Session) -> Result<()> {
    let mut out = std::io::stdout();
    print_status(&mut out, session.coordinator.status(), session.color)?;
    out.flush()?;
    if matches!(session.coordinator.status(), UiStatus::Success(_)) {
        result_menu(session)?;
    }
    Ok(())
}

/// Actions on a summary: download it in either format or listen to it.
fn result_menu(session: &mut Session) -> Result<()> {
    let Some(summary) = session.coordinator.result().map(|r| r.summary.clone()) else {
        return Ok(());
    };
    loop {
        let items = vec!["Download .txt", "Download .pdf", "Listen", "Back"];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => download(session, DownloadKind::Txt, &summary)?,
            1 => download(session, DownloadKind::Pdf, &summary)?,
            2 => {
                if let Err(e) = session.speaker.speak(&summary) {
                    print_error(&mut std::io::stdout(), &format!("{:#}", e), session.color)?;
                }
            }
            3 => break,
            _ => {}
        }
    }
    Ok(())
}

fn download(session: &Session, kind: DownloadKind, summary: &str) -> Result<()> {
    let spinner = spinner("Downloading...")?;
    let fetched = session.api.download(kind, summary);
    spinner.finish_and_clear();

    let saved = fetched
        .map_err(anyhow::Error::from)
        .and_then(|bytes| session.downloads.save(&bytes, &kind.file_name()));
    match saved {
        Ok(path) => println!("Saved {}", path.display()),
        Err(e) => print_error(&mut std::io::stdout(), &format!("{:#}", e), session.color)?,
    }
    Ok(())
}

/// Short text can be typed inline; long text is easier in $EDITOR.
fn edit_text(form: &mut InputForm) -> Result<()> {
    let items = vec!["Type inline", "Open editor", "Cancel"];
    match Select::new().items(&items).default(0).interact()? {
        0 => {
            let text: String = Input::new()
                .with_prompt("Text")
                .with_initial_text(form.text())
                .allow_empty(true)
                .interact_text()?;
            form.set_text(text);
        }
        1 => {
            // `None` means the editor was closed without saving.
            if let Some(text) = Editor::new().extension(".txt").edit(form.text())? {
                form.set_text(text.trim_end());
            }
        }
        _ => {}
    }
    Ok(())
}

/// Pick a PDF with the native dialog or by typing its path.
fn choose_file(form: &mut InputForm) -> Result<()> {
    let items = vec!["Browse...", "Type a path", "Remove file", "Cancel"];
    let path = match Select::new().items(&items).default(0).interact()? {
        0 => rfd::FileDialog::new()
            .set_title("Choose a PDF")
            .add_filter("PDF", &["pdf"])
            .pick_file(),
        1 => {
            let typed: String = Input::new().with_prompt("PDF file path").interact_text()?;
            Some(PathBuf::from(typed.trim()))
        }
        2 => {
            form.set_file(None);
            return Ok(());
        }
        _ => None,
    };

    let Some(path) = path else {
        return Ok(());
    };
    match UploadFile::from_path(&path) {
        Ok(file) => {
            info!(file = %file.file_name, len = file.bytes.len(), "file selected");
            form.set_file(Some(file));
        }
        Err(e) => println!("Could not use that file: {:#}", e),
    }
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// One-line preview of a form field for the menu.
fn preview(value: &str) -> String {
    const MAX: usize = 40;
    let line = value.lines().next().unwrap_or("");
    if line.is_empty() {
        return "(empty)".to_string();
    }
    let mut shown: String = line.chars().take(MAX).collect();
    if line.chars().count() > MAX || value.lines().nth(1).is_some() {
        shown.push_str("...");
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_truncates() {
        assert_eq!(preview(""), "(empty)");
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first...");
        let long = "x".repeat(50);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(40)));
    }
}
