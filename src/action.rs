//! Side-effecting actions taken on the highlighted status.
//!
//! The action is chosen once at startup and held for the whole session;
//! every failure here is recoverable and only surfaces on the status line.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client as HttpClient;
use url::Url;

use crate::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    OpenInBrowser,
    CopyLink,
    DownloadAndEdit,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::OpenInBrowser => "browser",
            ActionKind::CopyLink => "copy",
            ActionKind::DownloadAndEdit => "download-edit",
        }
    }

    /// Short phrase for the status line.
    pub fn describe(&self) -> &'static str {
        match self {
            ActionKind::OpenInBrowser => "open in the browser",
            ActionKind::CopyLink => "copy the link",
            ActionKind::DownloadAndEdit => "download and edit",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action {0:?} (expected browser, copy or download-edit)")]
pub struct UnknownActionError(String);

impl FromStr for ActionKind {
    type Err = UnknownActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "browser" => Ok(ActionKind::OpenInBrowser),
            "copy" => Ok(ActionKind::CopyLink),
            "download-edit" => Ok(ActionKind::DownloadAndEdit),
            other => Err(UnknownActionError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("open browser: {0}")]
    Browser(#[source] io::Error),
    #[error("clipboard: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("write {path}: {source}")]
    Scratch {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("launch editor {command}: {source}")]
    Editor {
        command: String,
        #[source]
        source: io::Error,
    },
}

pub trait Executor {
    fn execute(&self, kind: ActionKind, item: &Item) -> Result<(), ActionError>;
}

/// Executor backed by real external processes: the default browser, the
/// system clipboard and the configured editor.
pub struct ProcessExecutor {
    http: HttpClient,
    editor: String,
    scratch_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(editor: String, scratch_dir: Option<PathBuf>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let scratch_dir = scratch_dir.unwrap_or_else(|| std::env::temp_dir().join("perch"));
        Ok(Self {
            http,
            editor,
            scratch_dir,
        })
    }

    fn open_in_browser(&self, item: &Item) -> Result<(), ActionError> {
        webbrowser::open(&item.url).map_err(ActionError::Browser)
    }

    fn copy_link(&self, item: &Item) -> Result<(), ActionError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(item.url.clone())?;
        Ok(())
    }

    /// The download must finish before the editor is launched; the editor
    /// itself is only spawned, not waited on.
    fn download_and_edit(&self, item: &Item) -> Result<(), ActionError> {
        let bytes = self
            .http
            .get(&item.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|source| ActionError::Download {
                url: item.url.clone(),
                source,
            })?;

        fs::create_dir_all(&self.scratch_dir).map_err(|source| ActionError::Scratch {
            path: self.scratch_dir.display().to_string(),
            source,
        })?;
        let path = self.scratch_dir.join(filename_from_url(&item.url));
        fs::write(&path, &bytes).map_err(|source| ActionError::Scratch {
            path: path.display().to_string(),
            source,
        })?;

        Command::new(&self.editor)
            .arg(&path)
            .spawn()
            .map(|_| ())
            .map_err(|source| ActionError::Editor {
                command: self.editor.clone(),
                source,
            })
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, kind: ActionKind, item: &Item) -> Result<(), ActionError> {
        match kind {
            ActionKind::OpenInBrowser => self.open_in_browser(item),
            ActionKind::CopyLink => self.copy_link(item),
            ActionKind::DownloadAndEdit => self.download_and_edit(item),
        }
    }
}

fn filename_from_url(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|url| {
            url.path_segments().and_then(|segments| {
                segments
                    .rev()
                    .find(|segment| !segment.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| "download".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_known_actions() {
        assert_eq!("browser".parse::<ActionKind>().unwrap(), ActionKind::OpenInBrowser);
        assert_eq!("copy".parse::<ActionKind>().unwrap(), ActionKind::CopyLink);
        assert_eq!(
            "download-edit".parse::<ActionKind>().unwrap(),
            ActionKind::DownloadAndEdit
        );
    }

    #[test]
    fn rejects_unknown_action_names() {
        let err = "gvim".parse::<ActionKind>().unwrap_err();
        assert!(err.to_string().contains("gvim"));
    }

    #[test]
    fn derives_local_filenames_from_the_url_path() {
        assert_eq!(
            filename_from_url("https://example.social/@amy/114"),
            "114"
        );
        assert_eq!(
            filename_from_url("https://example.social/@amy/114/"),
            "114"
        );
        assert_eq!(filename_from_url("https://example.social/"), "download");
        assert_eq!(filename_from_url("not a url"), "download");
    }
}
