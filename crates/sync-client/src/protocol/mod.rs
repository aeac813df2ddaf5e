//! Workspace wire protocol
//!
//! Defines frame types, the inbound/outbound message formats, the JSON codec
//! and the close codes the server uses.

mod close_codes;
mod codec;
mod inbound;
mod message_type;
mod outbound;

pub use close_codes::CloseCode;
pub use codec::{Codec, CodecError, Decoded};
pub use inbound::{
    ConnectedEvent, ContactCreatedEvent, ContactDeletedEvent, ContactUpdatedEvent,
    CursorPositionEvent, Envelope, ErrorEvent, InboundFrame, InboundMessage, NoteAddedEvent,
    PresenceUpdateEvent, TypingEvent,
};
pub use message_type::MessageType;
pub use outbound::OutboundMessage;
