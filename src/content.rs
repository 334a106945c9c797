//! Media type classification for downloaded content and uploaded images.

use crate::{Error, Result};
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fmt;
use std::str::FromStr;

/// File extension derived from a content's declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Wav,
    Ac3,
    Aac,
    Mp3,
    Ogg,
    Mpa,
    Mp4,
    Gif,
    Jpg,
    Png,
    Pdf,
}

impl Extension {
    /// Returns the extension including its leading dot, e.g. `".png"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Wav => ".wav",
            Extension::Ac3 => ".ac3",
            Extension::Aac => ".aac",
            Extension::Mp3 => ".mp3",
            Extension::Ogg => ".ogg",
            Extension::Mpa => ".mpa",
            Extension::Mp4 => ".mp4",
            Extension::Gif => ".gif",
            Extension::Jpg => ".jpg",
            Extension::Png => ".png",
            Extension::Pdf => ".pdf",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported media types. Lookups are case-insensitive.
const MEDIA_TYPES: &[(&str, Extension)] = &[
    ("audio/wav", Extension::Wav),
    ("audio/wave", Extension::Wav),
    ("audio/x-wav", Extension::Wav),
    ("audio/x-pn-wav", Extension::Wav),
    ("audio/ac3", Extension::Ac3),
    ("audio/aac", Extension::Aac),
    ("audio/x-m4a", Extension::Mp3),
    ("audio/mp3", Extension::Mp3),
    ("audio/mpeg", Extension::Mp3),
    ("audio/ogg", Extension::Ogg),
    ("audio/mpa", Extension::Mpa),
    ("audio/mp4", Extension::Mp4),
    ("video/mp4", Extension::Mp4),
    ("image/gif", Extension::Gif),
    ("image/jpeg", Extension::Jpg),
    ("image/png", Extension::Png),
    ("application/pdf", Extension::Pdf),
];

/// Maps a bare media type (no parameters) to its file extension.
///
/// Returns `None` for anything outside the supported table.
///
/// # Examples
///
/// ```
/// use line_messaging::content::{classify, Extension};
///
/// assert_eq!(classify("IMAGE/PNG"), Some(Extension::Png));
/// assert_eq!(classify("text/unknown"), None);
/// ```
pub fn classify(media_type: &str) -> Option<Extension> {
    let media_type = media_type.trim();
    MEDIA_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(media_type))
        .map(|(_, ext)| *ext)
}

/// Classifies a response by its `Content-Type` header.
///
/// Parameters such as `charset` are ignored. A missing or unparseable header
/// yields `None`.
pub fn classify_headers(headers: &HeaderMap) -> Option<Extension> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let mime: mime::Mime = value.parse().ok()?;
    classify(mime.essence_str())
}

/// Image formats accepted by upload endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Resolves a format name (`"jpeg"`/`"png"`), reporting anything else
    /// against the request path it was meant for.
    pub fn for_path(path: &str, format: &str) -> Result<Self> {
        format
            .parse()
            .map_err(|_| Error::UnsupportedImageFormat {
                path: path.to_string(),
                format: format.to_string(),
            })
    }

    /// The `Content-Type` sent with the image body.
    pub fn content_type(self) -> HeaderValue {
        match self {
            ImageFormat::Jpeg => HeaderValue::from_static("image/jpeg"),
            ImageFormat::Png => HeaderValue::from_static("image/png"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(()),
        }
    }
}
