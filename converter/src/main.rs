use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use common::persistence::tempfiles::sweep_stale;
use converter::{routes::create_router, settings::ConverterSettings, state::ServiceCollection};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt().json().finish();
    tracing::subscriber::set_global_default(subscriber).expect("Could not init tracing.");

    let settings = ConverterSettings::from_env();
    let services = ServiceCollection::build(&settings).expect("Could not build services.");

    let temp_root = settings.temp_root.clone();
    let sweep_interval = settings.sweep_interval;
    let stale_after = settings.stale_after;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            match sweep_stale(&temp_root, stale_after).await {
                Ok(0) => {}
                Ok(removed) => info!("Swept {} stale temp job directories", removed),
                Err(err) => warn!("Sweeping temp job directories failed: {}", err),
            }
        }
    });

    let app = create_router(services, settings.request_timeout);

    let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)), settings.port);
    info!("listening on {}", &addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("Server failed.");
}
