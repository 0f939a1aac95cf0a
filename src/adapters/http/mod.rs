//! HTTP transport: axum server and reqwest client.

pub mod client;
pub mod server;

pub use client::{ClientError, ClusterServiceClient};
pub use server::ClusterHttpServer;
