pub mod config;
pub mod protocol;
pub mod session;
pub mod util;

pub use config::{Config, ConfigError};
pub use protocol::{Command, LineProtocol, Protocol, ProtocolError, Reply};
pub use session::{Session, SessionError};
