//! Terminal rendering of the core view model.
//!
//! The transcript scrolls, so rendering appends only turns that have not
//! been printed yet; a shrinking transcript means it was replaced (session
//! load or new chat) and triggers a repaint.

use chrono::NaiveDateTime;
use docchat_core::{ChatViewModel, Notice, NoticeLevel, Sources, Speaker};

#[derive(Debug, Default)]
pub(crate) struct Renderer {
    printed_turns: usize,
    last_title: Option<String>,
    last_activity: Option<String>,
    last_notice: Option<Notice>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for this view; call after every dirty update.
    pub fn render(&mut self, view: &ChatViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        if view.transcript.len() < self.printed_turns {
            self.printed_turns = 0;
            lines.push(String::new());
            lines.push(format!("=== {} ===", view.title));
            self.last_title = Some(view.title.clone());
        } else if self.last_title.as_deref() != Some(view.title.as_str()) {
            lines.push(format!("=== {} ===", view.title));
            self.last_title = Some(view.title.clone());
        }

        for turn in &view.transcript[self.printed_turns..] {
            lines.extend(format_turn(turn));
        }
        self.printed_turns = view.transcript.len();

        if view.activity != self.last_activity {
            if let Some(activity) = &view.activity {
                lines.push(format!("* {activity}"));
            }
            self.last_activity = view.activity.clone();
        }

        if view.notice != self.last_notice {
            if let Some(notice) = &view.notice {
                lines.push(format_notice(notice));
            }
            self.last_notice = view.notice.clone();
        }

        lines
    }
}

fn format_turn(turn: &docchat_core::ChatTurn) -> Vec<String> {
    let mut lines = Vec::new();
    let label = match turn.speaker {
        Speaker::User => "You",
        Speaker::Assistant => "Assistant",
    };
    let mut body = turn.body.lines();
    lines.push(format!("{label}: {}", body.next().unwrap_or_default()));
    for continuation in body {
        lines.push(format!("    {continuation}"));
    }

    match &turn.sources {
        Some(Sources::Listed(refs)) => {
            lines.push("    Sources:".to_string());
            for source in refs {
                lines.push(format!("      [{}] {}", source.kind.label(), source.name));
            }
        }
        Some(Sources::Markup(block)) => {
            // Replayed region is re-attached as stored, not re-rendered.
            for raw in block.lines() {
                lines.push(format!("    {raw}"));
            }
        }
        None => {}
    }
    lines
}

fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("[info] {}", notice.text),
        NoticeLevel::Error => format!("[error] {}", notice.text),
    }
}

/// Numbered sidebar listing for `:sessions`.
pub(crate) fn session_rows(view: &ChatViewModel) -> Vec<String> {
    if view.sessions.is_empty() {
        return vec!["No recent conversations".to_string()];
    }
    view.sessions
        .iter()
        .enumerate()
        .map(|(index, session)| {
            format!(
                "{}. {} — {}",
                index + 1,
                session.title,
                format_last_activity(&session.last_activity)
            )
        })
        .collect()
}

fn format_last_activity(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(timestamp) => timestamp.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use docchat_core::{ChatTurn, ChatViewModel, SessionSummary, SourceRef, Sources};

    use super::{format_last_activity, session_rows, Renderer};

    fn view_with_turns(turns: Vec<ChatTurn>) -> ChatViewModel {
        ChatViewModel {
            title: "New conversation".to_string(),
            transcript: turns,
            ..ChatViewModel::default()
        }
    }

    #[test]
    fn only_new_turns_are_printed() {
        let mut renderer = Renderer::new();
        let first = renderer.render(&view_with_turns(vec![ChatTurn::user("hi")]));
        assert!(first.iter().any(|line| line == "You: hi"));

        let second = renderer.render(&view_with_turns(vec![
            ChatTurn::user("hi"),
            ChatTurn::assistant("hello"),
        ]));
        assert!(second.iter().any(|line| line == "Assistant: hello"));
        assert!(!second.iter().any(|line| line == "You: hi"));
    }

    #[test]
    fn replaced_transcript_triggers_repaint() {
        let mut renderer = Renderer::new();
        renderer.render(&view_with_turns(vec![
            ChatTurn::user("one"),
            ChatTurn::assistant("two"),
        ]));

        let repaint = renderer.render(&view_with_turns(vec![ChatTurn::user("fresh")]));
        assert!(repaint.iter().any(|line| line.contains("New conversation")));
        assert!(repaint.iter().any(|line| line == "You: fresh"));
    }

    #[test]
    fn listed_sources_get_kind_badges() {
        let mut renderer = Renderer::new();
        let turn = ChatTurn {
            sources: Some(Sources::Listed(vec![SourceRef::new("guide.pdf")])),
            ..ChatTurn::assistant("see the guide")
        };
        let lines = renderer.render(&view_with_turns(vec![turn]));
        assert!(lines.iter().any(|line| line.contains("[PDF] guide.pdf")));
    }

    #[test]
    fn session_rows_are_numbered_with_formatted_dates() {
        let view = ChatViewModel {
            sessions: vec![SessionSummary {
                id: "s1".to_string(),
                title: "First".to_string(),
                last_activity: "2026-08-01T10:30:00.123456".to_string(),
            }],
            ..ChatViewModel::default()
        };
        assert_eq!(session_rows(&view), vec!["1. First — 2026-08-01 10:30"]);

        let empty = ChatViewModel::default();
        assert_eq!(session_rows(&empty), vec!["No recent conversations"]);
    }

    #[test]
    fn unparseable_timestamps_pass_through() {
        assert_eq!(format_last_activity("whenever"), "whenever");
    }
}
