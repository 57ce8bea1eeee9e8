use anyhow::Result;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::model::ParkingEvent;

#[derive(Clone)]
pub struct MongoRepo {
    database: Database,
    events: Collection<ParkingEvent>,
}

impl MongoRepo {
    /// Builds the client from the configured URI. A URI that fails to parse is
    /// a startup error; an unreachable server is not. The driver connects
    /// lazily, so the gateway starts either way and individual operations fail
    /// until the server becomes reachable.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let database = client.database(&config.mongodb_database);
        let events = database.collection(&config.mongodb_collection);
        Ok(Self { database, events })
    }

    pub async fn insert_event(&self, event: &ParkingEvent) -> Result<(), AppError> {
        self.events.insert_one(event, None).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

/// Pings the store on an interval, backing off exponentially while it is
/// unreachable. Logs each connection state transition; the first iteration
/// doubles as the startup connection-outcome log line.
pub async fn supervise_connection(repo: MongoRepo, config: AppConfig) {
    let mut connected = false;
    let mut backoff = config.reconnect_initial_seconds;
    loop {
        match repo.ping().await {
            Ok(()) => {
                if !connected {
                    info!("mongodb connected");
                    connected = true;
                }
                backoff = config.reconnect_initial_seconds;
                sleep(Duration::from_secs(config.ping_interval_seconds)).await;
            }
            Err(err) => {
                if connected {
                    warn!("mongodb connection lost: {}", err);
                    connected = false;
                } else {
                    warn!("mongodb unreachable, retrying in {}s: {}", backoff, err);
                }
                sleep(Duration::from_secs(backoff)).await;
                backoff = next_backoff(backoff, config.reconnect_max_seconds);
            }
        }
    }
}

fn next_backoff(current: u64, max: u64) -> u64 {
    current.saturating_mul(2).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_the_ceiling() {
        assert_eq!(next_backoff(1, 60), 2);
        assert_eq!(next_backoff(2, 60), 4);
        assert_eq!(next_backoff(32, 60), 60);
        assert_eq!(next_backoff(60, 60), 60);
    }

    #[test]
    fn backoff_does_not_overflow() {
        assert_eq!(next_backoff(u64::MAX, 60), 60);
    }
}
