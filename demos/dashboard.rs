//! Example client: reads settings from env, resolves the catalog (file or builtin), loads the
//! first page of vendors and products and a page of product options.

use backoffice_sdk::{
    builtin_catalog,
    load_catalog_from_path,
    resolve,
    ClientSettings,
    ControllerContext,
    HttpApi,
    ListController,
    OptionLoader,
    StaticToken,
    TracingNotifier,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("backoffice_sdk=info".parse()?))
        .init();

    let settings = ClientSettings::from_env()?;
    let config = match &settings.catalog_path {
        Some(path) => load_catalog_from_path(path).await?,
        None => builtin_catalog(),
    };
    let catalog = resolve(&config)?;

    let ctx = ControllerContext::http(
        HttpApi::new(&settings.api_base_url),
        Arc::new(StaticToken::new(settings.api_token.clone())),
        Arc::new(TracingNotifier),
    );

    for path in ["vendors", "products"] {
        let Some(resource) = catalog.resource(path) else {
            tracing::warn!(resource = path, "not in catalog");
            continue;
        };
        let controller = ListController::new(resource, ctx.clone(), settings.page_size);
        match controller.load().await {
            Ok(state) => {
                tracing::info!(resource = path, page = state.page, total = state.total, "loaded");
                for item in &state.items {
                    let name = item.get("name").and_then(|v| v.as_str()).unwrap_or("-");
                    println!("{:>6}  {}", item.id(), name);
                }
            }
            Err(e) => tracing::error!(resource = path, error = %e, "load failed"),
        }
    }

    if let Some(products) = catalog.resource("products") {
        let options = OptionLoader::new(products, ctx);
        let appended = options.load_more().await?;
        tracing::info!(appended, more = options.has_more(), "product options");
    }
    Ok(())
}
