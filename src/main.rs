use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use auction_store::config::StoreConfig;
use auction_store::domain::auction::{
    AddAuction, Amount, Auction, AuctionAdded, BidAccepted, Command, Currency, Event, PlaceBid,
};
use auction_store::metrics::{InstrumentedStore, StoreMetrics};
use auction_store::{FileStore, PostgresStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,auction_store=debug")),
        )
        .init();

    let config = StoreConfig::from_env()?;
    let metrics = Arc::new(StoreMetrics::new()?);
    tracing::info!(?config, "🚀 Starting auction store demo");

    match config {
        StoreConfig::File(file) => {
            let store = FileStore::new(
                file.commands_path,
                file.events_path,
                Command::codec()?,
                Event::codec()?,
            );
            run(&InstrumentedStore::new(store, metrics.clone())).await?;
        }
        StoreConfig::Postgres(pg) => {
            let store = PostgresStore::connect(&pg, Command::codec()?, Event::codec()?).await?;
            let store = InstrumentedStore::new(store, metrics.clone());
            let result = run(&store).await;
            store.inner().close().await;
            result?;
        }
    }

    tracing::info!(
        families = metrics.registry().gather().len(),
        "📊 Demo complete"
    );
    Ok(())
}

/// Seed an empty store with one auction and one bid, then print both logs.
async fn run<S>(store: &S) -> anyhow::Result<()>
where
    S: Store<Command = Command, Event = Event>,
{
    if store.read_commands().await?.is_empty() {
        tracing::info!("📝 Empty store, writing a sample history");

        let now = Utc::now();
        let auction = Auction {
            id: 1,
            title: "Vintage lamp".to_string(),
            seller: Uuid::new_v4(),
            currency: Currency::Sek,
            starts_at: now,
            ends_at: now + Duration::days(7),
        };
        let bid = PlaceBid {
            at: now,
            auction_id: auction.id,
            bidder: Uuid::new_v4(),
            amount: Amount::new(Currency::Sek, 100),
        };

        store
            .write_commands(&[
                Command::AddAuction(AddAuction {
                    at: now,
                    auction: auction.clone(),
                }),
                Command::PlaceBid(bid.clone()),
            ])
            .await?;
        store
            .write_events(&[
                Event::AuctionAdded(AuctionAdded { at: now, auction }),
                Event::BidAccepted(BidAccepted {
                    at: bid.at,
                    auction_id: bid.auction_id,
                    bidder: bid.bidder,
                    amount: bid.amount,
                }),
            ])
            .await?;
    }

    for command in store.read_commands().await? {
        tracing::info!(?command, "Command");
    }
    for event in store.read_events().await? {
        tracing::info!(?event, "Event");
    }

    Ok(())
}
