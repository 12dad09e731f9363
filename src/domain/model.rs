use serde::{Deserialize, Serialize};

/// Twitch-purple accent used on every sync embed.
pub const EMBED_COLOR: u32 = 0x6441A5;

/// Marker appended to the embed author name. Messages carrying this suffix
/// are recognized as ours when scanning channel history.
pub const AUTHOR_SUFFIX: &str = "is spelunking!";

/// One live streamer as reported by the streams API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamRecord {
    pub username: String,
    pub twitch: String,
    pub id: String,
    pub logo: String,
    pub url: String,
    pub status: String,
    pub game: String,
}

impl StreamRecord {
    /// Renders this record as the embed posted to the channel. The stream URL
    /// doubles as title, link target and author URL so history scans can key
    /// messages back to streamers.
    pub fn to_embed(&self) -> Embed {
        Embed {
            title: Some(self.url.clone()),
            url: Some(self.url.clone()),
            color: Some(EMBED_COLOR),
            author: Some(EmbedAuthor {
                name: format!("{} {}", self.username, AUTHOR_SUFFIX),
                url: Some(self.url.clone()),
            }),
            thumbnail: Some(EmbedThumbnail {
                url: self.logo.clone(),
            }),
            fields: vec![
                EmbedField {
                    name: "Game".to_string(),
                    value: self.game.clone(),
                    inline: false,
                },
                EmbedField {
                    name: "Stream Title".to_string(),
                    value: self.status.clone(),
                    inline: false,
                },
            ],
        }
    }

    /// Whether an already-posted embed no longer matches this record. Stored
    /// field values are compared against the trimmed record values, so
    /// whitespace-only drift upstream does not trigger edits.
    pub fn embed_outdated(&self, embed: &Embed) -> bool {
        let game = embed.field_value("Game");
        if game != Some(self.game.trim()) {
            tracing::info!(
                "Game changed. Before: {:?}, After: {:?}",
                game,
                self.game.trim()
            );
            return true;
        }

        let status = embed.field_value("Stream Title");
        if status != Some(self.status.trim()) {
            tracing::info!(
                "Status changed. Before: {:?}, After: {:?}",
                status,
                self.status.trim()
            );
            return true;
        }

        false
    }
}

/// Subset of the Discord embed wire object that the bot reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// The stream URL this embed was posted for, if it is one of ours.
    pub fn sync_key(&self) -> Option<&str> {
        let author = self.author.as_ref()?;
        if !author.name.ends_with(&format!(" {}", AUTHOR_SUFFIX)) {
            return None;
        }
        author.url.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Subset of a Discord channel message: enough to attribute it, key it to a
/// streamer, and mutate it later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: String,
    pub author: MessageAuthor,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl ChannelMessage {
    /// A message takes part in syncing only when it was written by the given
    /// user, carries exactly one embed, and that embed bears the marker.
    pub fn sync_key_for(&self, bot_user_id: &str) -> Option<&str> {
        if self.author.id != bot_user_id {
            return None;
        }
        if self.embeds.len() != 1 {
            return None;
        }
        self.embeds[0].sync_key()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    #[serde(default)]
    pub bot: bool,
}

/// Mutations one sync cycle must apply to the channel. Edits pair a message
/// id with the fresh record; deletes pair a message id with the stream URL it
/// was posted for.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub post: Vec<StreamRecord>,
    pub edit: Vec<(String, StreamRecord)>,
    pub delete: Vec<(String, String)>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.post.is_empty() && self.edit.is_empty() && self.delete.is_empty()
    }
}

/// Counts of mutations actually applied in one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub posted: usize,
    pub edited: usize,
    pub deleted: usize,
}
