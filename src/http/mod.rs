//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Host tier:
//!     TCP connection
//!     → server.rs (request ID, trace span)
//!     → host.rs (weighted pick from the pool)
//!     → client.rs (hyper client) → chosen backend
//!     → response streamed back verbatim
//!
//! Backend tier:
//!     TCP connection
//!     → server.rs (request ID, trace span)
//!     → /logs        → logs.rs (raw log store)
//!     → /static, /assets with static mode → assets.rs → asset origin
//!     → anything else → backend.rs (browser headers) → origin
//!         → rewrite::Interceptor (403 capture, HTML rewrite)
//! ```

pub mod assets;
pub mod backend;
pub mod client;
pub mod host;
pub mod logs;
pub mod request;
pub mod response;
pub mod server;

pub use request::{client_host, RequestIdExt, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
