use std::sync::Arc;

use propdesk::backend::http::HttpBackend;
use propdesk::config::AppConfig;
use propdesk::guard::RouteGuard;
use propdesk::model::format_price;
use propdesk::persist::{SessionCache, TokenCache};
use propdesk::store::property::PropertyStore;
use propdesk::store::session::SessionStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("configuration incomplete");
    let backend = Arc::new(
        HttpBackend::new(
            &config.backend_url,
            &config.backend_api_key,
            config.request_timeout_secs,
            config.connect_timeout_secs,
            config.state_dir.as_ref().map(TokenCache::new),
        )
        .expect("backend client init failed"),
    );

    let cache = config.state_dir.as_ref().map(SessionCache::new);
    let session = Arc::new(SessionStore::new(backend.clone(), cache));
    let properties = PropertyStore::new(backend);
    let guard = RouteGuard::new(session.clone());

    // Same startup sequence the site runs: restore the session, then warm
    // the listing cache.
    let session_state = session.check_session().await;
    tracing::info!(
        authenticated = session_state.is_authenticated,
        error = session_state.error.as_deref().unwrap_or(""),
        "session restored"
    );

    let decision = guard.authorize("/admin/properties").await;
    tracing::info!(?decision, "route guard checked /admin/properties");

    let listing_state = properties.fetch_properties().await;
    match listing_state.error {
        Some(error) => tracing::warn!(%error, "listing fetch failed"),
        None => {
            for row in &listing_state.properties {
                tracing::info!(title = %row.title, price = %format_price(row.price), "listing");
            }
            tracing::info!(count = listing_state.properties.len(), "listing cache warmed");
        }
    }
}
