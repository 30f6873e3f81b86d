// Module declarations
pub mod control;
pub mod frame;
pub mod peer_link;

pub use control::Control;
pub use frame::{Frame, FrameDecoder, Hello, PROTOCOL_VERSION};
pub use peer_link::{Inbound, PeerLink};
