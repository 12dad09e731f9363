use crate::domain::model::{ChannelMessage, Embed};
use crate::domain::ports::ChannelSink;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::Deserialize;

/// Discord guild text channel type.
const CHANNEL_TYPE_GUILD_TEXT: u8 = 0;

/// How far back we look for previously posted sync messages.
const HISTORY_LIMIT: u8 = 100;

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
}

/// Channel sink backed by the Discord REST API. `connect` resolves the bot's
/// own user id and verifies the target channel up front, so a misconfigured
/// bot fails at startup instead of silently skipping every cycle.
pub struct DiscordRestSink {
    client: Client,
    api_base: String,
    channel: u64,
    bot_user_id: String,
}

impl DiscordRestSink {
    pub async fn connect(api_base: &str, token: &str, channel: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token)).map_err(|_| {
            BotError::ConfigValidationError {
                field: "discord-token".to_string(),
                message: "Token contains characters not valid in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        let sink = Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            channel,
            bot_user_id: String::new(),
        };

        let me: CurrentUser = Self::check(
            sink.client
                .get(format!("{}/users/@me", sink.api_base))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;
        tracing::info!("Logged in as user {}", me.id);

        let chan: Channel = Self::check(
            sink.client
                .get(format!("{}/channels/{}", sink.api_base, channel))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        if chan.kind != CHANNEL_TYPE_GUILD_TEXT {
            return Err(BotError::ChannelError {
                channel,
                reason: format!("Expected a guild text channel, got type {}", chan.kind),
            });
        }
        tracing::debug!("Sync channel {} resolved", chan.id);

        Ok(Self {
            bot_user_id: me.id,
            ..sink
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(BotError::DiscordApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChannelSink for DiscordRestSink {
    async fn sync_messages(&self) -> Result<Vec<ChannelMessage>> {
        let response = self
            .client
            .get(self.messages_url())
            .query(&[("limit", HISTORY_LIMIT.to_string())])
            .send()
            .await?;

        let messages: Vec<ChannelMessage> = Self::check(response).await?.json().await?;
        tracing::debug!("Channel history returned {} messages", messages.len());

        Ok(messages
            .into_iter()
            .filter(|msg| msg.sync_key_for(&self.bot_user_id).is_some())
            .collect())
    }

    async fn post(&self, embed: &Embed) -> Result<()> {
        let response = self
            .client
            .post(self.messages_url())
            .json(&serde_json::json!({ "embeds": [embed] }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn edit(&self, message_id: &str, embed: &Embed) -> Result<()> {
        let response = self
            .client
            .patch(format!("{}/{}", self.messages_url(), message_id))
            .json(&serde_json::json!({ "embeds": [embed] }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, message_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{}", self.messages_url(), message_id))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StreamRecord;
    use httpmock::prelude::*;

    fn mock_identity(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/users/@me");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "111", "bot": true}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/channels/42");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "42", "type": 0}));
        });
    }

    fn record(name: &str) -> StreamRecord {
        StreamRecord {
            username: name.to_string(),
            twitch: name.to_string(),
            id: "1".to_string(),
            logo: format!("https://cdn.example.com/{}.png", name),
            url: format!("https://twitch.tv/{}", name),
            status: "live".to_string(),
            game: "Spelunky 2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_sends_bot_auth_header() {
        let server = MockServer::start();

        let me_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/@me")
                .header("Authorization", "Bot my-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "111"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/channels/42");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "42", "type": 0}));
        });

        let sink = DiscordRestSink::connect(&server.base_url(), "my-token", 42)
            .await
            .unwrap();

        me_mock.assert();
        assert_eq!(sink.bot_user_id, "111");
    }

    #[tokio::test]
    async fn test_connect_rejects_non_text_channel() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/users/@me");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "111"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/channels/42");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "42", "type": 2}));
        });

        let result = DiscordRestSink::connect(&server.base_url(), "t", 42).await;
        assert!(matches!(result, Err(BotError::ChannelError { .. })));
    }

    #[tokio::test]
    async fn test_sync_messages_filters_history() {
        let server = MockServer::start();
        mock_identity(&server);

        let ours = serde_json::json!({
            "id": "900",
            "author": {"id": "111", "bot": true},
            "embeds": [record("dan").to_embed()]
        });
        let foreign = serde_json::json!({
            "id": "901",
            "author": {"id": "222", "bot": false},
            "embeds": [record("dan").to_embed()]
        });
        let no_embed = serde_json::json!({
            "id": "902",
            "author": {"id": "111", "bot": true},
            "embeds": []
        });

        let history_mock = server.mock(|when, then| {
            when.method(GET).path("/channels/42/messages");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([ours, foreign, no_embed]));
        });

        let sink = DiscordRestSink::connect(&server.base_url(), "t", 42)
            .await
            .unwrap();
        let messages = sink.sync_messages().await.unwrap();

        history_mock.assert();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "900");
    }

    #[tokio::test]
    async fn test_post_sends_embed_payload() {
        let server = MockServer::start();
        mock_identity(&server);

        let post_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/channels/42/messages")
                .json_body_partial(
                    r#"{"embeds": [{"title": "https://twitch.tv/dan", "color": 6570405}]}"#,
                );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "903"}));
        });

        let sink = DiscordRestSink::connect(&server.base_url(), "t", 42)
            .await
            .unwrap();
        sink.post(&record("dan").to_embed()).await.unwrap();

        post_mock.assert();
    }

    #[tokio::test]
    async fn test_delete_surfaces_discord_error() {
        let server = MockServer::start();
        mock_identity(&server);

        let delete_mock = server.mock(|when, then| {
            when.method(DELETE).path("/channels/42/messages/904");
            then.status(403).body("Missing Permissions");
        });

        let sink = DiscordRestSink::connect(&server.base_url(), "t", 42)
            .await
            .unwrap();
        let result = sink.delete("904").await;

        delete_mock.assert();
        match result {
            Err(BotError::DiscordApiError { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("Missing Permissions"));
            }
            other => panic!("Expected DiscordApiError, got {:?}", other),
        }
    }
}
