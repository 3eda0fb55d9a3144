pub mod channel;
pub mod sse;
pub mod transport;

pub use channel::{ChannelState, ConnectionId, PushChannel, PushHandlers};
pub use sse::{SseDecoder, SseFrame};
pub use transport::{FrameStream, HttpPushTransport, PushTransport};
