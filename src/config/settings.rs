//! Client settings from the environment (`.env` honoured via dotenvy).

use crate::error::ConfigError;
use std::path::PathBuf;

/// Page sizes offered by the list views.
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 20, 50];

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            catalog_path: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientSettings {
    /// Reads `BACKOFFICE_API_URL`, `BACKOFFICE_API_TOKEN`, `BACKOFFICE_CATALOG_PATH`, `BACKOFFICE_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let api_base_url = non_empty("BACKOFFICE_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let page_size = match non_empty("BACKOFFICE_PAGE_SIZE") {
            Some(raw) => {
                let n: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Validation(format!("BACKOFFICE_PAGE_SIZE: not a number: {}", raw)))?;
                if !PAGE_SIZE_OPTIONS.contains(&n) {
                    return Err(ConfigError::Validation(format!(
                        "BACKOFFICE_PAGE_SIZE must be one of {:?}",
                        PAGE_SIZE_OPTIONS
                    )));
                }
                n
            }
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(ClientSettings {
            api_base_url,
            api_token: non_empty("BACKOFFICE_API_TOKEN"),
            catalog_path: non_empty("BACKOFFICE_CATALOG_PATH").map(PathBuf::from),
            page_size,
        })
    }
}
