//! Core library for the gridscale provider.
//!
//! The crate exposes a small REST client for the gridscale API, including the
//! wait loops that follow asynchronous server-side work, and declarative
//! resources (storage templates, managed Kubernetes) that map configuration
//! state onto create, read, update and delete calls.

pub mod client;
pub mod config;
pub mod logging;
pub mod provider;

pub use client::{
    ApiError, Client, ClientError, CreateResponse, DecodePolicy, PollErrorPolicy, Request,
    WaitSettings,
};
pub use config::{ConfigError, GridscaleConfig};
pub use provider::{
    K8sResource, K8sState, Resource, ResourceError, ResourceTimeouts, TemplateResource,
    TemplateState,
};
