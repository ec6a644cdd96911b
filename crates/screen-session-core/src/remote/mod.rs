mod http;
mod traits;

pub use {
    http::{DEFAULT_REQUEST_TIMEOUT, HttpRemoteSync},
    traits::{Payload, RemoteReply, RemoteSync},
};
