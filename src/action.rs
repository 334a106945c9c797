//! Actions attached to template messages, quick replies, and rich menus.
//!
//! The `type` tag on the wire is derived from the variant, so a serialized
//! action can never carry a tag that disagrees with its fields.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Character limit for postback data, display text, and message text.
pub const MAX_TEXT_CHARS: usize = 300;

/// Character limit for a URI action's target.
pub const MAX_URI_CHARS: usize = 1000;

/// URI schemes a [`Action::Uri`] may open.
pub const ALLOWED_URI_SCHEMES: &[&str] = &["http", "https", "line", "tel"];

/// An action performed when the user taps a button or area.
///
/// # Examples
///
/// ```
/// use line_messaging::Action;
///
/// let action = Action::postback("Buy", "action=buy&itemid=111").with_display_text("Buy");
/// let json = serde_json::to_value(&action).unwrap();
/// assert_eq!(json["type"], "postback");
/// assert_eq!(json["displayText"], "Buy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Returns `data` to the bot through a postback event.
    Postback {
        label: String,
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_option: Option<InputOption>,
        /// Pre-filled keyboard text; only meaningful with [`InputOption::OpenKeyboard`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_in_text: Option<String>,
    },

    /// Sends `text` as a message from the user.
    Message { label: String, text: String },

    /// Opens `uri`.
    Uri { label: String, uri: String },

    /// Opens a date/time picker and returns the selection through a postback event.
    ///
    /// `min` is expected to be earlier than `max`; the platform enforces it.
    #[serde(rename = "datetimepicker")]
    DatetimePicker {
        label: String,
        data: String,
        mode: DatetimeMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<String>,
    },

    /// Opens the camera.
    Camera { label: String },

    /// Opens the camera roll.
    CameraRoll { label: String },

    /// Opens the location picker.
    Location { label: String },
}

/// What a datetime picker lets the user choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatetimeMode {
    Date,
    Time,
    Datetime,
}

/// How the chat UI reacts after a postback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputOption {
    CloseRichMenu,
    OpenRichMenu,
    OpenKeyboard,
    OpenVoice,
}

impl Action {
    pub fn postback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Action::Postback {
            label: label.into(),
            data: data.into(),
            display_text: None,
            input_option: None,
            fill_in_text: None,
        }
    }

    pub fn message(label: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Message {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn uri(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Action::Uri {
            label: label.into(),
            uri: uri.into(),
        }
    }

    pub fn datetime_picker(
        label: impl Into<String>,
        data: impl Into<String>,
        mode: DatetimeMode,
    ) -> Self {
        Action::DatetimePicker {
            label: label.into(),
            data: data.into(),
            mode,
            initial: None,
            max: None,
            min: None,
        }
    }

    /// Sets the display text of a postback action. Other variants are returned unchanged.
    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        if let Action::Postback { display_text, .. } = &mut self {
            *display_text = Some(text.into());
        }
        self
    }

    /// Sets the input option and pre-filled text of a postback action.
    /// Other variants are returned unchanged.
    pub fn with_input_option(mut self, option: InputOption, fill_in: Option<String>) -> Self {
        if let Action::Postback {
            input_option,
            fill_in_text,
            ..
        } = &mut self
        {
            *input_option = Some(option);
            *fill_in_text = fill_in;
        }
        self
    }

    /// Sets the initial/min/max bounds of a datetime picker.
    /// Other variants are returned unchanged.
    pub fn with_bounds(
        mut self,
        initial_value: Option<String>,
        min_value: Option<String>,
        max_value: Option<String>,
    ) -> Self {
        if let Action::DatetimePicker {
            initial, min, max, ..
        } = &mut self
        {
            *initial = initial_value;
            *min = min_value;
            *max = max_value;
        }
        self
    }

    /// The wire tag of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Postback { .. } => "postback",
            Action::Message { .. } => "message",
            Action::Uri { .. } => "uri",
            Action::DatetimePicker { .. } => "datetimepicker",
            Action::Camera { .. } => "camera",
            Action::CameraRoll { .. } => "cameraRoll",
            Action::Location { .. } => "location",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Action::Postback { label, .. }
            | Action::Message { label, .. }
            | Action::Uri { label, .. }
            | Action::DatetimePicker { label, .. }
            | Action::Camera { label }
            | Action::CameraRoll { label }
            | Action::Location { label } => label,
        }
    }

    /// Checks the documented field limits locally.
    ///
    /// Nothing in the client calls this; the platform remains the authority
    /// and requests are sent unvalidated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first field over its limit,
    /// or a URI whose scheme is not one of [`ALLOWED_URI_SCHEMES`].
    pub fn validate(&self) -> Result<()> {
        match self {
            Action::Postback {
                data, display_text, ..
            } => {
                check_len("data", data, MAX_TEXT_CHARS)?;
                if let Some(text) = display_text {
                    check_len("display_text", text, MAX_TEXT_CHARS)?;
                }
                Ok(())
            }
            Action::Message { text, .. } => check_len("text", text, MAX_TEXT_CHARS),
            Action::Uri { uri, .. } => {
                check_len("uri", uri, MAX_URI_CHARS)?;
                let scheme = uri.split_once(':').map(|(s, _)| s).unwrap_or_default();
                if ALLOWED_URI_SCHEMES
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
                {
                    Ok(())
                } else {
                    Err(Error::invalid_argument(
                        "uri",
                        format!("scheme `{scheme}` is not one of {ALLOWED_URI_SCHEMES:?}"),
                    ))
                }
            }
            Action::DatetimePicker { data, .. } => check_len("data", data, MAX_TEXT_CHARS),
            Action::Camera { .. } | Action::CameraRoll { .. } | Action::Location { .. } => Ok(()),
        }
    }
}

fn check_len(parameter: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::invalid_argument(
            parameter,
            format!("{len} characters exceeds the limit of {max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_postback_wire_shape() {
        let action = Action::postback("Buy", "action=buy&itemid=111")
            .with_input_option(InputOption::OpenKeyboard, Some("qty: ".to_string()));

        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "postback",
                "label": "Buy",
                "data": "action=buy&itemid=111",
                "inputOption": "openKeyboard",
                "fillInText": "qty: "
            })
        );
    }

    #[test]
    fn test_datetime_picker_wire_shape() {
        let action = Action::datetime_picker("Select date", "storeId=12345", DatetimeMode::Datetime)
            .with_bounds(
                Some("2017-12-25t00:00".to_string()),
                Some("2017-01-24t23:59".to_string()),
                Some("2018-01-24t23:59".to_string()),
            );

        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "datetimepicker",
                "label": "Select date",
                "data": "storeId=12345",
                "mode": "datetime",
                "initial": "2017-12-25t00:00",
                "max": "2018-01-24t23:59",
                "min": "2017-01-24t23:59"
            })
        );
    }

    #[test]
    fn test_label_only_variants() {
        let action = Action::CameraRoll {
            label: "Camera roll".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "cameraRoll", "label": "Camera roll"})
        );
    }

    #[test]
    fn test_decode_matches_kind_and_fields() {
        let actions = vec![
            Action::postback("a", "b").with_display_text("c"),
            Action::message("Yes", "yes"),
            Action::uri("View", "https://example.com/page/222"),
            Action::datetime_picker("When", "d", DatetimeMode::Time),
            Action::Camera {
                label: "Camera".to_string(),
            },
            Action::Location {
                label: "Location".to_string(),
            },
        ];

        let mut tags = std::collections::HashSet::new();
        for action in actions {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.kind());
            assert!(tags.insert(action.kind()), "duplicate tag {}", action.kind());

            let decoded: Action = serde_json::from_value(json).unwrap();
            assert_eq!(decoded, action);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result =
            serde_json::from_value::<Action>(json!({"type": "richmenuswitch", "label": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Action::uri("Call", "tel:09001234567").validate().is_ok());
        assert!(Action::uri("Open", "line://nv/camera").validate().is_ok());
        assert!(Action::uri("Bad", "ftp://example.com").validate().is_err());
        assert!(Action::uri("Long", format!("https://{}", "a".repeat(1000)))
            .validate()
            .is_err());

        let err = Action::postback("x", "d".repeat(301)).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { parameter: "data", .. }));
        assert!(Action::message("x", "y".repeat(300)).validate().is_ok());
    }
}
