//! Sheet music image to guitar tablature
//!
//! Glue between the `sheet-to-midi` and `midi-to-tab` stages: upload
//! handling, the end to end [`Pipeline`], and the HTTP service.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod upload;

pub use config::{ConfigError, ConversionOptions, ServiceConfig};
pub use error::{ConvertError, UploadError};
pub use pipeline::{tab_text, Pipeline, TabOutcome};
pub use server::{router, serve, AppState};
pub use service::{ConvertResponse, ConvertService};
pub use upload::{secure_filename, Upload, UploadRoot, Workspace};
