//! Brain MCP bridge.
//!
//! Layering, bottom up:
//! - `protocol`: message builders, request ids, handshake constants, envelopes
//! - `transport`: blocking line-delimited JSON-RPC over any reader/writer pair
//! - `process`: spawning, handshake and teardown of the server process
//! - `adapter`: async calls on the blocking pool with deadlines
//! - `facade`: one typed method per Brain MCP tool
//! - `session`: a façade and its process, opened and closed as one unit

mod adapter;
mod connector;
mod facade;
mod process;
pub mod protocol;
mod session;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use adapter::BlockingCallAdapter;
pub use connector::{Connection, Connector, ToolCaller};
pub use facade::{
    BrainClient, BundleQuery, ChangeImpactQuery, DEFAULT_DEPENDENCY_DEPTH,
    DEFAULT_DEPENDENTS_DEPTH, HotspotsQuery,
};
pub use process::{
    BRAIN_ROOT_ENV, ChildProcess, McpSession, ProcessConnector, spawn_connection, spawn_process,
};
pub use protocol::ToolDocument;
pub use session::BridgeSession;
pub use transport::LineTransport;
