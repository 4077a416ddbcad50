use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use submitter::{routes::create_router, settings::SubmitterSettings, state::ServiceCollection};
use tracing::info;

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt().json().finish();
    tracing::subscriber::set_global_default(subscriber).expect("Could not init tracing.");

    let settings = SubmitterSettings::from_env();
    let services = ServiceCollection::build(&settings).await.expect("Could not build services.");
    info!("Forwarding documents to {}", &settings.converter_url);

    let app = create_router(services);

    let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)), settings.port);
    info!("listening on {}", &addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("Server failed.");
}
