pub mod fullscreen;
pub mod http_client;
#[cfg(test)]
pub(crate) mod stub_server;

pub use fullscreen::{CdpFullscreen, FullscreenHost, NoFullscreen};
pub use http_client::{ApiClient, RetryPolicy};
