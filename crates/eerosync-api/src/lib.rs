// eerosync-api: async session client for the eero cloud API.
//
// Handles the session cookie, `{meta, data}` envelope decoding, a single
// refresh-and-retry on expired sessions, and optional payload dumps.

pub mod dump;
pub mod envelope;
pub mod error;
pub mod session;
pub mod transport;

pub use dump::ResponseDump;
pub use error::Error;
pub use reqwest::Method;
pub use session::Session;
pub use transport::TransportConfig;
