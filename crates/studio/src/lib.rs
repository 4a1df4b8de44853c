//! AI batik studio: prompt expansion, generation session state, relay client and
//! garment texture binding.
//!
//! The session and garment are plain state machines. [`Studio`] wires them to a
//! [`RelayClient`] and an [`assets::TextureLoader`] for the async round trips.

pub mod category;
pub mod driver;
pub mod garment;
pub mod prompt;
pub mod protocol;
pub mod relay;
pub mod session;

pub use category::*;
pub use driver::*;
pub use garment::*;
pub use prompt::*;
pub use protocol::*;
pub use relay::*;
pub use session::*;
