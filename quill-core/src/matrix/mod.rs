// Matrix protocol layer: request dispatch, the HTTP transport, and the
// client-server endpoints built on top of them.

mod client;
mod dispatch;
mod error;
mod http;
mod unstable;

pub use client::MatrixClient;
pub use dispatch::RequestDispatcher;
pub use error::MatrixError;
pub use http::{ClientConfig, HttpDispatcher};
pub use unstable::{GroupProfile, InviteState, JoinPolicy, UnstableApis};

pub use reqwest::Method;
