use ldap_gateway::{api, config, directory::LdapDirectory, logging};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();
    tracing::debug!(
        host = %config.host,
        port = config.port,
        ldap_url = %config.ldap_url,
        bind_dn = ?config.bind_dn,
        "Loaded configuration"
    );

    // Bind or connect failures are unrecoverable startup conditions.
    let service = LdapDirectory::connect(config)
        .await
        .expect("Failed to connect to directory");
    let app = api::create_router(Arc::new(service));

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://{}:{}", config.host, config.port);
    axum::serve(listener, app).await.unwrap();
}
