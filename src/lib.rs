//! Backoffice SDK: catalog-driven list/detail controllers over a REST admin backend.

pub mod case;
pub mod config;
pub mod context;
pub mod controller;
pub mod entities;
pub mod error;
pub mod item;
pub mod query;
pub mod response;
pub mod service;
pub mod state;

pub use config::{builtin_catalog, load_catalog_from_path, resolve, Catalog, ClientSettings, ResolvedResource};
pub use context::{AuthContext, Notification, NotificationLevel, Notifier, RecordingNotifier, StaticToken, TracingNotifier};
pub use controller::{ControllerContext, ListController, OptionLoader};
pub use error::{ClientError, ConfigError};
pub use item::ResourceItem;
pub use service::{FileUpload, FormPayload, HttpApi, ResourceApi, Uploader};
pub use state::{FilterState, ListState};
