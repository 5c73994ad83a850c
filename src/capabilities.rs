// Capability ports for the result actions. The interactive shell only sees
// the traits, so tests and other front-ends can plug in their own.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Reads text aloud.
pub trait TextToSpeech {
    fn speak(&self, text: &str) -> Result<()>;
}

/// Offers bytes to the user as a file; returns where they ended up.
pub trait FileDownload {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf>;
}

/// Speaks by running an external program (`say`, `espeak`, ...) with the
/// text as its only argument. Blocks until playback ends.
pub struct SystemSpeaker {
    program: String,
}

impl SystemSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        SystemSpeaker {
            program: program.into(),
        }
    }
}

impl TextToSpeech for SystemSpeaker {
    fn speak(&self, text: &str) -> Result<()> {
        info!(program = %self.program, len = text.len(), "reading summary aloud");
        let status = Command::new(&self.program)
            .arg(text)
            .status()
            .with_context(|| format!("Failed to run speech program '{}'", self.program))?;
        if !status.success() {
            bail!("Speech program '{}' exited with {}", self.program, status);
        }
        Ok(())
    }
}

/// Writes downloads into a fixed folder without ever overwriting.
pub struct FolderDownload {
    dir: PathBuf,
}

impl FolderDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FolderDownload { dir: dir.into() }
    }
}

impl FileDownload for FolderDownload {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = unique_path(&self.dir, filename);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), len = bytes.len(), "download saved");
        Ok(path)
    }
}

/// `name.ext`, or the first free `name (n).ext` if it is taken.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_into_folder_and_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let target = FolderDownload::new(tmp.path().join("downloads"));

        let path = target.save(b"the summary", "summary.txt").unwrap();
        assert_eq!(path, tmp.path().join("downloads").join("summary.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"the summary");
    }

    #[test]
    fn never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let target = FolderDownload::new(tmp.path());

        let first = target.save(b"one", "summary.pdf").unwrap();
        let second = target.save(b"two", "summary.pdf").unwrap();
        let third = target.save(b"three", "summary.pdf").unwrap();

        assert_eq!(first.file_name().unwrap(), "summary.pdf");
        assert_eq!(second.file_name().unwrap(), "summary (1).pdf");
        assert_eq!(third.file_name().unwrap(), "summary (2).pdf");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn unique_path_without_extension() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes"), b"x").unwrap();
        assert_eq!(unique_path(tmp.path(), "notes"), tmp.path().join("notes (1)"));
    }

    #[cfg(unix)]
    #[test]
    fn speaker_reports_exit_status() {
        assert!(SystemSpeaker::new("true").speak("hello").is_ok());
        assert!(SystemSpeaker::new("false").speak("hello").is_err());
    }

    #[test]
    fn speaker_reports_missing_program() {
        let err = SystemSpeaker::new("gistify-no-such-speech-program")
            .speak("hello")
            .unwrap_err();
        assert!(err.to_string().contains("gistify-no-such-speech-program"));
    }
}
