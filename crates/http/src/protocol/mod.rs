//! Protocol types shared by the codec and the connection.
//!
//! - [`Message`]: what the request decoder yields
//! - [`PayloadSize`]: how much body follows a request head
//! - [`ResponseMessage`]: a response and whether its body is written
//! - [`HttpError`], [`ParseError`], [`SendError`]: transport errors

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

mod message;
pub use message::Message;
pub use message::PayloadSize;
pub use message::ResponseMessage;
