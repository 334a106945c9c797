//! # line-messaging - a typed LINE Messaging API client
//!
//! Builds typed message and action payloads, sends them over HTTPS with the
//! channel access token attached, and decodes typed responses. Failures come
//! back as an [`Error`] that carries the request path and either the
//! platform's structured error body or a freeform message.
//!
//! ## Quick Start
//!
//! ```no_run
//! use line_messaging::{Action, Client, Message, Template};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), line_messaging::Error> {
//!     let client = Client::new("channel-access-token")?;
//!
//!     let menu = Message::template(
//!         "Pick a size",
//!         Template::buttons(
//!             "Pick a size",
//!             vec![
//!                 Action::postback("Small", "size=s"),
//!                 Action::postback("Large", "size=l"),
//!             ],
//!         ),
//!     );
//!
//!     client.push_message("U4af4980629", vec![Message::text("Hello"), menu]).await?;
//!
//!     let profile = client.get_profile("U4af4980629").await?;
//!     println!("Sent to {}", profile.display_name);
//!     Ok(())
//! }
//! ```
//!
//! ## Two download contracts
//!
//! Content is fetched from a separate content-serving host. The two ways of
//! fetching it fail differently:
//!
//! ```no_run
//! # async fn example(client: line_messaging::Client) -> Result<(), line_messaging::Error> {
//! // Strict: timeouts and non-2xx statuses are errors.
//! let bytes = client.get_message_content("325708").await?;
//!
//! // Best-effort: any failure after argument checks is `None`.
//! if let Some(path) = client.get_message_content_and_save("325708", "/tmp", "325708").await? {
//!     println!("saved {} bytes to {}", bytes.len(), path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Tagged payloads** - message, template, and action variants whose `type` tag comes
//!   from the variant itself
//! - **Single-attempt dispatch** - one try per call with a configurable timeout (10s by
//!   default), no retries
//! - **Typed errors** - structured platform errors, synthesized status messages, and
//!   contract violations
//! - **Content download** - media type classification and atomic write to disk
//! - **Cancellation** - optional watch channel that aborts in-flight calls
//! - **Logging** - `tracing` debug events for each request and response

pub mod action;
mod api;
mod client;
pub mod codec;
pub mod content;
mod credential;
mod download;
mod error;
pub mod message;
pub mod metadata;
mod response;

pub use action::{Action, DatetimeMode, InputOption};
pub use api::{MemberIds, Profile};
pub use client::{
    Client, ClientBuilder, DEFAULT_API_BASE_URL, DEFAULT_DATA_BASE_URL, DEFAULT_TIMEOUT,
};
pub use content::{Extension, ImageFormat};
pub use credential::AccessToken;
pub use error::{Error, ErrorDetail, ErrorResponse, Result, TIMEOUT_MESSAGE};
pub use message::{Message, MulticastMessage, PushMessage, ReplyMessage, Template};
pub use response::Response;
