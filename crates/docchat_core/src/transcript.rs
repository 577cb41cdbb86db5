#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// Badge attached to a cited source, derived from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Html,
    Txt,
}

impl SourceKind {
    /// Tag a source by file-extension sniffing on the stored name.
    pub fn sniff(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            SourceKind::Pdf
        } else if lower.ends_with(".html") {
            SourceKind::Html
        } else {
            SourceKind::Txt
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Pdf => "PDF",
            SourceKind::Html => "HTML",
            SourceKind::Txt => "TXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub name: String,
    pub kind: SourceKind,
}

impl SourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = SourceKind::sniff(&name);
        Self { name, kind }
    }
}

/// Citations attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    /// Structured list carried by a live answer.
    Listed(Vec<SourceRef>),
    /// Marked region carved out of a replayed message, re-attached verbatim.
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub body: String,
    pub sources: Option<Sources>,
}

impl ChatTurn {
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            body: body.into(),
            sources: None,
        }
    }

    pub fn assistant(body: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            body: body.into(),
            sources: None,
        }
    }
}

/// One message of a server-held transcript, already split for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedTurn {
    pub speaker: Speaker,
    pub body: String,
    pub sources_markup: Option<String>,
}
