#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod config;
pub mod env;
pub mod error;
pub mod guard;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use auth::AuthService;
pub use client::{
    ApiClient, HttpTransport, Navigator, Transport, TransportRequest, TransportResponse,
};
pub use config::ApiConfig;
pub use env::{HostSignals, Mode};
pub use error::Error;
pub use guard::{Decision, NavigationGuard, RouteMeta};
pub use store::{FileStore, MemoryStore, SessionStore};
pub use types::{LoginRequest, LoginResponse, Session, UserProfile};
