//! Messages sent through reply, push, and multicast calls.
//!
//! Like [`Action`], each message's `type` tag comes from its variant. Field
//! limits (text length, URL length, message count per request) are enforced
//! by the platform, not here.

use crate::action::Action;
use serde::{Deserialize, Serialize};

/// A message to send.
///
/// # Examples
///
/// ```
/// use line_messaging::{Action, Message, Template};
///
/// let confirm = Message::template(
///     "Are you sure?",
///     Template::confirm(
///         "Are you sure?",
///         vec![Action::message("Yes", "yes"), Action::message("No", "no")],
///     ),
/// );
///
/// let json = serde_json::to_value(&confirm).unwrap();
/// assert_eq!(json["type"], "template");
/// assert_eq!(json["template"]["type"], "confirm");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Message {
    Text {
        text: String,
    },
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
    Video {
        original_content_url: String,
        preview_image_url: String,
    },
    Audio {
        original_content_url: String,
        /// Length of the audio in milliseconds.
        duration: u64,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
    Sticker {
        package_id: String,
        sticker_id: String,
    },
    Template {
        alt_text: String,
        template: Template,
    },
    Imagemap {
        base_url: String,
        alt_text: String,
        base_size: BaseSize,
        actions: Vec<ImagemapAction>,
    },
    /// Flex message; the container is passed through as raw JSON.
    Flex {
        alt_text: String,
        contents: serde_json::Value,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }

    pub fn image(
        original_content_url: impl Into<String>,
        preview_image_url: impl Into<String>,
    ) -> Self {
        Message::Image {
            original_content_url: original_content_url.into(),
            preview_image_url: preview_image_url.into(),
        }
    }

    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        Message::Sticker {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        }
    }

    pub fn template(alt_text: impl Into<String>, template: Template) -> Self {
        Message::Template {
            alt_text: alt_text.into(),
            template,
        }
    }

    pub fn flex(alt_text: impl Into<String>, contents: serde_json::Value) -> Self {
        Message::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }

    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text { .. } => "text",
            Message::Image { .. } => "image",
            Message::Video { .. } => "video",
            Message::Audio { .. } => "audio",
            Message::Location { .. } => "location",
            Message::Sticker { .. } => "sticker",
            Message::Template { .. } => "template",
            Message::Imagemap { .. } => "imagemap",
            Message::Flex { .. } => "flex",
        }
    }
}

/// Layout of a template message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Template {
    Buttons {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail_image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_aspect_ratio: Option<ImageAspectRatio>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_size: Option<ImageSize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_background_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_action: Option<Action>,
        actions: Vec<Action>,
    },
    /// Two buttons; set exactly two actions.
    Confirm { text: String, actions: Vec<Action> },
    Carousel {
        columns: Vec<CarouselColumn>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_aspect_ratio: Option<ImageAspectRatio>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_size: Option<ImageSize>,
    },
    ImageCarousel { columns: Vec<ImageCarouselColumn> },
}

impl Template {
    /// A buttons template with only text and actions set.
    pub fn buttons(text: impl Into<String>, actions: Vec<Action>) -> Self {
        Template::Buttons {
            thumbnail_image_url: None,
            image_aspect_ratio: None,
            image_size: None,
            image_background_color: None,
            title: None,
            text: text.into(),
            default_action: None,
            actions,
        }
    }

    pub fn confirm(text: impl Into<String>, actions: Vec<Action>) -> Self {
        Template::Confirm {
            text: text.into(),
            actions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAspectRatio {
    Rectangle,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Cover,
    Contain,
}

/// One column of a carousel template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<Action>,
    pub actions: Vec<Action>,
}

/// One column of an image carousel template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCarouselColumn {
    pub image_url: String,
    pub action: Action,
}

/// Width and height of an imagemap's base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSize {
    pub width: u32,
    pub height: u32,
}

/// Tappable region of an imagemap, in base-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagemapArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Action bound to an [`ImagemapArea`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ImagemapAction {
    Uri {
        link_uri: String,
        area: ImagemapArea,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Message {
        text: String,
        area: ImagemapArea,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// Reply to an inbound event using its single-use reply token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMessage {
    pub reply_token: String,
    pub messages: Vec<Message>,
}

/// Message pushed to a user, group, or room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub messages: Vec<Message>,
}

/// Message sent to several users at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticastMessage {
    pub to: Vec<String>,
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DatetimeMode;
    use serde_json::json;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::text("Hello, world"),
            Message::image("https://example.com/original.jpg", "https://example.com/preview.jpg"),
            Message::Video {
                original_content_url: "https://example.com/original.mp4".to_string(),
                preview_image_url: "https://example.com/preview.jpg".to_string(),
            },
            Message::Audio {
                original_content_url: "https://example.com/original.m4a".to_string(),
                duration: 60000,
            },
            Message::Location {
                title: "my location".to_string(),
                address: "Tokyo".to_string(),
                latitude: 35.5,
                longitude: 139.25,
            },
            Message::sticker("446", "1988"),
            Message::template(
                "alt",
                Template::buttons("Please select", vec![Action::postback("Buy", "buy")]),
            ),
            Message::Imagemap {
                base_url: "https://example.com/bot/images/rm001".to_string(),
                alt_text: "This is an imagemap".to_string(),
                base_size: BaseSize {
                    width: 1040,
                    height: 1040,
                },
                actions: vec![ImagemapAction::Message {
                    text: "Hello".to_string(),
                    area: ImagemapArea {
                        x: 520,
                        y: 0,
                        width: 520,
                        height: 1040,
                    },
                    label: None,
                }],
            },
            Message::flex(
                "flex",
                json!({
                    "type": "bubble",
                    "body": {"type": "box", "layout": "vertical", "contents": []}
                }),
            ),
        ]
    }

    #[test]
    fn test_every_variant_has_distinct_tag_matching_kind() {
        let mut tags = std::collections::HashSet::new();
        for message in sample_messages() {
            let json = serde_json::to_value(&message).unwrap();
            assert_eq!(json["type"], message.kind());
            assert!(tags.insert(message.kind()), "duplicate tag {}", message.kind());

            let decoded: Message = serde_json::from_value(json).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_image_fields_are_camel_case() {
        let json = serde_json::to_value(Message::image("o", "p")).unwrap();
        assert_eq!(
            json,
            json!({"type": "image", "originalContentUrl": "o", "previewImageUrl": "p"})
        );
    }

    #[test]
    fn test_buttons_template_omits_absent_fields() {
        let template = Template::buttons("Pick", vec![Action::message("A", "a")]);
        let json = serde_json::to_value(template).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "buttons",
                "text": "Pick",
                "actions": [{"type": "message", "label": "A", "text": "a"}]
            })
        );
    }

    #[test]
    fn test_image_carousel_tag() {
        let template = Template::ImageCarousel {
            columns: vec![ImageCarouselColumn {
                image_url: "https://example.com/item1.jpg".to_string(),
                action: Action::datetime_picker("Select", "id=1", DatetimeMode::Date),
            }],
        };
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["type"], "image_carousel");
        assert_eq!(json["columns"][0]["imageUrl"], "https://example.com/item1.jpg");
        assert_eq!(json["columns"][0]["action"]["mode"], "date");
    }

    #[test]
    fn test_imagemap_action_link_uri() {
        let action = ImagemapAction::Uri {
            link_uri: "https://example.com/".to_string(),
            area: ImagemapArea {
                x: 0,
                y: 0,
                width: 520,
                height: 1040,
            },
            label: Some("Open".to_string()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "uri");
        assert_eq!(json["linkUri"], "https://example.com/");
        assert_eq!(json["area"]["width"], 520);
    }

    #[test]
    fn test_reply_envelope() {
        let reply = ReplyMessage {
            reply_token: "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA".to_string(),
            messages: vec![Message::text("a"), Message::text("b")],
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "messages": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]
            })
        );
    }

    #[test]
    fn test_unknown_message_tag_is_rejected() {
        let result = serde_json::from_value::<Message>(json!({"type": "coupon", "text": "x"}));
        assert!(result.is_err());

        let result = serde_json::from_value::<Message>(json!({"text": "no tag"}));
        assert!(result.is_err());
    }
}
