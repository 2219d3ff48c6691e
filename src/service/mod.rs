//! REST access, upload pipeline and client-side validation.

mod api;
mod upload;
mod validation;
#[cfg(test)]
pub(crate) mod mock;

pub use api::{HttpApi, ResourceApi};
pub use upload::{normalize_upload_url, FieldValue, FileUpload, FormPayload, PreparedForm, UploadPipeline, Uploader};
pub use validation::RequestValidator;
