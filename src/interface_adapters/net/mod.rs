// Network adapters: spectate endpoint, reconnecting transport and the
// tokio-tungstenite connector behind it.

pub mod endpoint;
pub mod transport;
pub mod ws;

pub use endpoint::{EndpointError, spectate_endpoint};
pub use transport::{
    Connector, Frame, FrameSource, ReconnectingTransport, ScheduledRetry, StatusObserver,
    TransportError, TransportHandle,
};
pub use ws::WsConnector;
