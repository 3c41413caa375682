/// The name given to the container so that it can be stopped later on without knowing its id.
pub const CONTAINER_NAME: &str = "gunash";

/// The host port that the HTTP control plane is always published on.
pub const HOST_HTTP_PORT: u16 = 8545;

/// The host port that the WebSocket control plane is always published on, regardless of the port
/// the node listens on inside of the container.
pub const HOST_WEBSOCKET_PORT: u16 = 8546;
