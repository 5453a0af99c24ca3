#![forbid(unsafe_code)]

pub mod api;
pub mod csrf;
pub mod error;
pub mod http;
pub mod memory;
pub mod wire;

pub use api::{ExamBackend, ProvisionedQuestion};
pub use csrf::{CSRF_COOKIE_NAME, CSRF_HEADER, csrf_token_from_cookies};
pub use error::BackendError;
pub use http::HttpBackend;
pub use memory::InMemoryBackend;
