//! Translates terminal input lines into app actions.
//!
//! A plain line is a question; commands start with `:`.

use std::path::PathBuf;

use docchat_core::SelectedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputAction {
    Ask(String),
    AddFiles(Vec<SelectedFile>),
    /// Zero-based index into the staged-file list.
    RemoveFile(usize),
    ProcessFiles,
    IndexWebsite {
        url: String,
        max_pages: Option<u32>,
    },
    NewChat,
    ShowSessions,
    /// One-based position in the sidebar listing.
    OpenSession(usize),
    DeleteSession(usize),
    ShowHelp,
    Quit,
    Unknown(String),
}

pub(crate) fn parse_line(line: &str) -> Option<InputAction> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with(':') {
        return Some(InputAction::Ask(trimmed.to_string()));
    }

    let mut words = trimmed.split_whitespace();
    let command = words.next().unwrap_or_default();
    let action = match command {
        ":files" | ":file" => {
            let files: Vec<SelectedFile> = words.map(selected_file).collect();
            if files.is_empty() {
                InputAction::Unknown(command.to_string())
            } else {
                InputAction::AddFiles(files)
            }
        }
        ":remove" => match words.next().and_then(parse_position) {
            Some(position) => InputAction::RemoveFile(position - 1),
            None => InputAction::Unknown(command.to_string()),
        },
        ":process" => InputAction::ProcessFiles,
        ":index" => match words.next() {
            Some(url) => InputAction::IndexWebsite {
                url: url.to_string(),
                max_pages: words.next().and_then(|raw| raw.parse().ok()),
            },
            None => InputAction::Unknown(command.to_string()),
        },
        ":new" => InputAction::NewChat,
        ":sessions" => InputAction::ShowSessions,
        ":open" => match words.next().and_then(parse_position) {
            Some(position) => InputAction::OpenSession(position),
            None => InputAction::Unknown(command.to_string()),
        },
        ":delete" => match words.next().and_then(parse_position) {
            Some(position) => InputAction::DeleteSession(position),
            None => InputAction::Unknown(command.to_string()),
        },
        ":help" | ":h" => InputAction::ShowHelp,
        ":quit" | ":q" => InputAction::Quit,
        other => InputAction::Unknown(other.to_string()),
    };
    Some(action)
}

fn parse_position(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|position| *position > 0)
}

fn selected_file(raw: &str) -> SelectedFile {
    let path = PathBuf::from(raw);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string());
    let content_type = guess_content_type(&name);
    SelectedFile {
        name,
        path,
        content_type,
    }
}

/// Stand-in for the browser's MIME sniffing: type by extension.
fn guess_content_type(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Some("application/pdf".to_string())
    } else if lower.ends_with(".txt") {
        Some("text/plain".to_string())
    } else {
        None
    }
}
