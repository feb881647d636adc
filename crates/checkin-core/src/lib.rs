pub mod errors;
pub mod ids;
pub mod protocol;

pub use errors::ConnectionError;
pub use ids::{CheckInId, ClientId, ConnectionHandle};
pub use protocol::{CheckIn, ClientEntry, Frame, Inbound, StatusUpdate};
