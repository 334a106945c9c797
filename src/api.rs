//! Endpoint callers.
//!
//! Each method is a thin wrapper that validates its identifiers, builds the
//! request, and hands it to the dispatcher or the content downloader.

use crate::{
    message::{Message, MulticastMessage, PushMessage, ReplyMessage},
    metadata::RequestMetadata,
    Client, Error, Result,
};
use http::Method;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REPLY_PATH: &str = "/v2/bot/message/reply";
const PUSH_PATH: &str = "/v2/bot/message/push";
const MULTICAST_PATH: &str = "/v2/bot/message/multicast";

/// A user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub user_id: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// One page of group member IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberIds {
    pub member_ids: Vec<String>,
    /// Continuation token for the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

fn require(parameter: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument(parameter, "is null or empty"));
    }
    Ok(())
}

fn message_content_path(message_id: &str) -> String {
    format!("/v2/bot/message/{message_id}/content")
}

fn rich_menu_content_path(rich_menu_id: &str) -> String {
    format!("/v2/bot/richmenu/{rich_menu_id}/content")
}

impl Client {
    /// Replies to an inbound event. Reply tokens are single use.
    pub async fn reply_message(&self, reply_token: &str, messages: Vec<Message>) -> Result<()> {
        require("reply_token", reply_token)?;
        let body = ReplyMessage {
            reply_token: reply_token.to_string(),
            messages,
        };
        self.post_ignoring_body(REPLY_PATH, &body).await
    }

    /// Pushes messages to a user, group, or room.
    pub async fn push_message(&self, to: &str, messages: Vec<Message>) -> Result<()> {
        require("to", to)?;
        let body = PushMessage {
            to: to.to_string(),
            messages,
        };
        self.post_ignoring_body(PUSH_PATH, &body).await
    }

    /// Sends the same messages to several users.
    pub async fn multicast(&self, to: Vec<String>, messages: Vec<Message>) -> Result<()> {
        if to.is_empty() {
            return Err(Error::invalid_argument("to", "is empty"));
        }
        if to.iter().any(|id| id.is_empty()) {
            return Err(Error::invalid_argument("to", "contains an empty user ID"));
        }
        let body = MulticastMessage { to, messages };
        self.post_ignoring_body(MULTICAST_PATH, &body).await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        require("user_id", user_id)?;
        let response = self.get::<Profile>(format!("/v2/bot/profile/{user_id}")).await?;
        Ok(response.into_data())
    }

    /// Fetches one page of member IDs; pass the previous page's `next` as `start`.
    pub async fn get_group_member_ids(
        &self,
        group_id: &str,
        start: Option<&str>,
    ) -> Result<MemberIds> {
        require("group_id", group_id)?;
        let mut metadata =
            RequestMetadata::new(Method::GET, format!("/v2/bot/group/{group_id}/members/ids"));
        if let Some(start) = start {
            metadata = metadata.with_query_param("start", start);
        }
        Ok(self.call::<MemberIds>(metadata).await?.into_data())
    }

    pub async fn leave_group(&self, group_id: &str) -> Result<()> {
        require("group_id", group_id)?;
        let metadata =
            RequestMetadata::new(Method::POST, format!("/v2/bot/group/{group_id}/leave"));
        self.call_text(metadata).await.map(|_| ())
    }

    pub async fn leave_room(&self, room_id: &str) -> Result<()> {
        require("room_id", room_id)?;
        let metadata = RequestMetadata::new(Method::POST, format!("/v2/bot/room/{room_id}/leave"));
        self.call_text(metadata).await.map(|_| ())
    }

    /// Downloads the content of an image, video, audio, or file message.
    pub async fn get_message_content(&self, message_id: &str) -> Result<Vec<u8>> {
        require("message_id", message_id)?;
        self.fetch_as_bytes(message_content_path(message_id)).await
    }

    /// Downloads message content into `dir` as `<filename><extension>`.
    ///
    /// An empty `message_id` is still a contract violation and is returned as
    /// an error; everything after that is best-effort and reported as
    /// `Ok(None)` (see [`Client::fetch_and_store`]).
    pub async fn get_message_content_and_save(
        &self,
        message_id: &str,
        dir: impl AsRef<Path>,
        filename: &str,
    ) -> Result<Option<PathBuf>> {
        require("message_id", message_id)?;
        Ok(self
            .fetch_and_store(&message_content_path(message_id), dir, filename)
            .await)
    }

    /// Uploads a rich menu image. `format` must be `"jpeg"` or `"png"`.
    pub async fn set_rich_menu_image(
        &self,
        rich_menu_id: &str,
        format: &str,
        image: Vec<u8>,
    ) -> Result<()> {
        require("rich_menu_id", rich_menu_id)?;
        let metadata = RequestMetadata::new(Method::POST, rich_menu_content_path(rich_menu_id))
            .on_data_host()
            .with_image(format, image)?;
        self.call_text(metadata).await.map(|_| ())
    }

    pub async fn get_rich_menu_image(&self, rich_menu_id: &str) -> Result<Vec<u8>> {
        require("rich_menu_id", rich_menu_id)?;
        self.fetch_as_bytes(rich_menu_content_path(rich_menu_id)).await
    }

    async fn post_ignoring_body<T: Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let metadata = RequestMetadata::new(Method::POST, path).with_json(body)?;
        self.call_text(metadata).await.map(|_| ())
    }
}
