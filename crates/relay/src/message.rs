//! Outbound chat message shape.
//!
//! Serialises to the Slack incoming-webhook payload: top-level text and bot
//! identity plus a single attachment carrying the build details.

use serde::{Deserialize, Serialize};

/// Display name the relay posts as.
pub const BOT_USERNAME: &str = "gcb-bot";

pub const BOT_ICON_EMOJI: &str = ":robot_face:";

pub const ATTACHMENT_TITLE: &str = "Build logs";

pub const FOOTER: &str = "Google Cloud Build";

pub const FOOTER_ICON: &str =
    "https://ssl.gstatic.com/pantheon/images/containerregistry/container_registry_color.png";

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Attachment side-bar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Queued, working, or any unrecognised status.
    Blue,
    /// Success.
    Green,
    /// Failure or internal error.
    Red,
    /// Timeout.
    Yellow,
}

impl Color {
    /// Returns the color as a `#RRGGBB` string.
    pub fn as_hex(self) -> &'static str {
        match self {
            Self::Blue => "#4285F4",
            Self::Green => "#34A853",
            Self::Red => "#EA4335",
            Self::Yellow => "#FBBC05",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_hex())
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A message ready to post to the chat webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message body; Markdown when `mrkdwn` is set.
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrkdwn: Option<bool>,

    /// Display-name override for the posting bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    /// A text-only message with no identity override or attachments.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mrkdwn: None,
            username: None,
            icon_emoji: None,
            attachments: Vec::new(),
        }
    }

    /// The first (and for build messages, only) attachment.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachments.first()
    }

    /// Looks up a field of the first attachment by title.
    pub fn field(&self, title: &str) -> Option<&Field> {
        self.attachment()?.fields.iter().find(|f| f.title == title)
    }
}

/// A colored block below the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// `#RRGGBB`, see [`Color::as_hex`].
    pub color: String,
    pub title: String,
    /// Target of the title link; the build log URL.
    pub title_link: String,
    pub fields: Vec<Field>,
    pub footer: String,
    pub footer_icon: String,

    /// Epoch seconds shown next to the footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

/// One `title: value` pair; `short` fields render two per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    /// A half-width field.
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }
}
