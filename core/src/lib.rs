//! Async client for the chats, folders, courses and labs API.
//!
//! # Overview
//! Wraps the remote HTTP JSON API behind typed functions that attach bearer
//! authentication, build query strings and normalize failures into
//! `ApiError`. Each endpoint exists in three forms on `ApiClient`:
//! `build_*` (produces an `HttpRequest`), `parse_*` (consumes an
//! `HttpResponse`) and an async method that runs one through a `Transport`
//! into the other.
//!
//! # Design
//! - `ApiClient` holds only configuration and a transport; no state survives
//!   a call, so calls can be issued concurrently.
//! - I/O is confined to `Transport`. `HttpTransport` uses `reqwest`; tests
//!   plug in their own.
//! - Responses are returned as `serde_json::Value` unless an endpoint shapes
//!   them (time-range labels, the chat-list projection, envelope unwrapping).
//!   The DTOs in `types` decode them when a caller wants structure.
//! - Course updates probe several method/path combinations; see `courses`.

mod chats;
pub mod client;
pub mod config;
pub mod courses;
pub mod envelope;
pub mod error;
mod folders;
pub mod http;
mod labs;
pub mod query;
pub mod time_range;
pub mod types;

pub use client::{ApiClient, ErrorValue};
pub use config::{ClientConfig, CourseApi};
pub use courses::COURSE_UPDATE_ROUTES;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport, TransportError, NETWORK_ERROR};
pub use query::QueryParams;
pub use time_range::{CalendarTimeRange, TimeRangeLabeler};
pub use types::{
    Chat, ChatContext, ChatListItem, ContextType, Course, CourseForm, CourseUpdate, Folder, FolderForm,
    FolderItems, ImportChat, Lab, LabForm, LabUpdate,
};
