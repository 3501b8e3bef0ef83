use std::sync::Arc;

use auth::TokenPairIssuer;
use session_service::config::Config;
use session_service::domain::session::service::SessionService;
use session_service::inbound::bus::KafkaRequestConsumer;
use session_service::inbound::bus::SessionDispatcher;
use session_service::outbound::bus::BusProducer;
use session_service::outbound::directory::BusUserDirectory;
use session_service::outbound::directory::DirectoryReplyConsumer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        kafka_brokers = %config.kafka.brokers,
        requests_topic = %config.kafka.requests_topic,
        replies_topic = %config.kafka.replies_topic,
        directory_topic = %config.directory.requests_topic,
        "Configuration loaded"
    );

    let producer = Arc::new(BusProducer::new(&config)?);

    let directory = Arc::new(BusUserDirectory::new(&config, Arc::clone(&producer)));
    let reply_consumer = DirectoryReplyConsumer::new(&config, directory.pending())?;

    let token_issuer = TokenPairIssuer::new(
        config.jwt.access_secret.as_bytes(),
        config.jwt.refresh_secret.as_bytes(),
    );
    let session_service = Arc::new(SessionService::new(directory, token_issuer));

    let dispatcher = SessionDispatcher::new(session_service);
    let request_consumer = KafkaRequestConsumer::new(&config, Arc::clone(&producer), dispatcher)?;

    let reply_loop = tokio::spawn(reply_consumer.start_consuming());
    let request_loop = tokio::spawn(request_consumer.start_consuming());

    match tokio::try_join!(reply_loop, request_loop) {
        Ok(_) => tracing::info!("Consumer loops exited"),
        Err(e) => tracing::error!(error = %e, "Consumer task failed"),
    };

    Ok(())
}
