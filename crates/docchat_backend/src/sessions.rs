use crate::client::ApiClient;
use crate::types::{ApiError, SessionDetail, SessionEntry};

/// Speaker split reconstructed from the stored `role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn from_wire(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// One stored message prepared for replay: prose and the previously
/// rendered sources region, separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMessage {
    pub role: Role,
    pub body: String,
    pub sources_markup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReplay {
    pub id: String,
    pub title: String,
    pub last_activity: String,
    pub messages: Vec<ReplayMessage>,
}

/// Read-side access to server-held conversation sessions.
pub struct SessionRepository<'a> {
    client: &'a ApiClient,
}

impl<'a> SessionRepository<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Most-recent first; server order is trusted and not re-sorted.
    pub async fn list(&self) -> Result<Vec<SessionEntry>, ApiError> {
        self.client.sessions().await
    }

    pub async fn load(&self, id: &str) -> Result<SessionReplay, ApiError> {
        let detail = self.client.session(id).await?;
        Ok(replay_from_detail(detail))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete_session(id).await
    }
}

fn replay_from_detail(detail: SessionDetail) -> SessionReplay {
    let messages = detail
        .messages
        .into_iter()
        .map(|message| match Role::from_wire(&message.role) {
            Role::User => ReplayMessage {
                role: Role::User,
                body: message.content,
                sources_markup: None,
            },
            Role::Assistant => {
                let (body, sources_markup) = split_sources_section(&message.content);
                ReplayMessage {
                    role: Role::Assistant,
                    body,
                    sources_markup,
                }
            }
        })
        .collect();
    SessionReplay {
        id: detail.id,
        title: detail.title,
        last_activity: detail.last_activity,
        messages,
    }
}

const SOURCES_MARKER: &str = "<div class=\"sources-section\">";

/// Carve the rendered sources region out of a stored assistant message so it
/// can be re-attached after the prose instead of re-rendered as text.
///
/// The region ends at its balanced closing tag; an unbalanced region runs to
/// the end of the content.
pub fn split_sources_section(content: &str) -> (String, Option<String>) {
    let Some(start) = content.find(SOURCES_MARKER) else {
        return (content.trim().to_string(), None);
    };
    let end = balanced_div_end(content, start).unwrap_or(content.len());

    let mut prose = String::with_capacity(content.len() - (end - start));
    prose.push_str(&content[..start]);
    prose.push_str(&content[end..]);
    let block = content[start..end].to_string();
    (prose.trim().to_string(), Some(block))
}

/// Byte offset just past the `</div>` matching the `<div` at `start`.
fn balanced_div_end(content: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut cursor = start;
    loop {
        let open = content[cursor..].find("<div");
        let close = content[cursor..].find("</div>");
        match (open, close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                cursor += o + "<div".len();
            }
            (_, Some(c)) => {
                depth = depth.saturating_sub(1);
                cursor += c + "</div>".len();
                if depth == 0 {
                    return Some(cursor);
                }
            }
            (Some(o), None) => {
                depth += 1;
                cursor += o + "<div".len();
            }
            (None, None) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{replay_from_detail, split_sources_section, Role};
    use crate::types::{SessionDetail, SessionMessage};

    #[test]
    fn content_without_marker_is_left_alone() {
        let (prose, block) = split_sources_section("plain answer");
        assert_eq!(prose, "plain answer");
        assert_eq!(block, None);
    }

    #[test]
    fn marked_region_is_extracted_from_prose() {
        let content = "hello<div class=\"sources-section\">guide.pdf</div>";
        let (prose, block) = split_sources_section(content);
        assert_eq!(prose, "hello");
        assert_eq!(
            block.as_deref(),
            Some("<div class=\"sources-section\">guide.pdf</div>")
        );
    }

    #[test]
    fn nested_divs_stay_inside_the_region() {
        let content = concat!(
            "answer text\n",
            "<div class=\"sources-section\">",
            "<div class=\"sources-title\">Sources:</div>",
            "<ul><li>a.pdf</li></ul>",
            "</div>",
            "\ntrailing",
        );
        let (prose, block) = split_sources_section(content);
        assert_eq!(prose, "answer text\n\ntrailing");
        let block = block.unwrap();
        assert!(block.starts_with("<div class=\"sources-section\">"));
        assert!(block.ends_with("</ul></div>"));
        assert!(block.contains("sources-title"));
    }

    #[test]
    fn unbalanced_region_runs_to_the_end() {
        let content = "prose<div class=\"sources-section\"><ul><li>a.txt</li>";
        let (prose, block) = split_sources_section(content);
        assert_eq!(prose, "prose");
        assert_eq!(
            block.as_deref(),
            Some("<div class=\"sources-section\"><ul><li>a.txt</li>")
        );
    }

    #[test]
    fn replay_splits_only_assistant_messages() {
        let detail = SessionDetail {
            id: "s1".to_string(),
            title: "T".to_string(),
            last_activity: "2026-08-01T10:00:00".to_string(),
            messages: vec![
                SessionMessage {
                    role: "user".to_string(),
                    content: "hi <div class=\"sources-section\">not split</div>".to_string(),
                },
                SessionMessage {
                    role: "assistant".to_string(),
                    content: "hello<div class=\"sources-section\">x</div>".to_string(),
                },
            ],
        };
        let replay = replay_from_detail(detail);

        assert_eq!(replay.messages[0].role, Role::User);
        assert!(replay.messages[0].body.contains("sources-section"));
        assert_eq!(replay.messages[0].sources_markup, None);

        assert_eq!(replay.messages[1].role, Role::Assistant);
        assert_eq!(replay.messages[1].body, "hello");
        assert!(replay.messages[1].sources_markup.is_some());
    }
}
