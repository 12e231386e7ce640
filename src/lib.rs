//! HTTP service for video channels and the comments posted on them.
//!
//! Every route lives under `/channel`. Channels are kept in MySQL (one row per
//! channel, comments as a JSON document) or, for local runs, in memory; see
//! [config::AppConfig] for the knobs.

use std::sync::Arc;

use log::{error, info};
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::{Build, Rocket};

pub mod cmp;
pub mod config;
pub mod database;

use cmp::service::ChannelService;
use cmp::store::{ChannelStore, MemoryStore};
use config::{AppConfig, StoreKind};
use database::{init_database, MySqlStore};

/// Open the store selected by `config`.
pub async fn open_store(
    config: &AppConfig,
) -> Result<Arc<dyn ChannelStore>, Box<dyn std::error::Error + Send + Sync>> {
    match config.store {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::Mysql => {
            let url = config.format_conn_url()?;
            let pool = init_database(&url, config.sql_max_connections).await?;
            Ok(Arc::new(MySqlStore::new(pool)))
        }
    }
}

async fn init_store(rocket: Rocket<Build>) -> fairing::Result {
    let config = match AppConfig::from_figment(rocket.figment()) {
        Ok(config) => config,
        Err(err) => {
            error!("Cannot read configuration: {err}");
            return Err(rocket);
        }
    };
    match open_store(&config).await {
        Ok(store) => {
            info!("Channel store ready ({:?})", config.store);
            Ok(rocket.manage(ChannelService::new(store)))
        }
        Err(err) => {
            error!("Cannot prepare channel store: {err}");
            Err(rocket)
        }
    }
}

/// A server around an already built service.
pub fn build(service: ChannelService) -> Rocket<Build> {
    rocket::build()
        .manage(service)
        .mount("/channel", cmp::routes::routes())
}

/// A server whose store is opened from `figment` at ignition.
pub fn rocket_from(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("Channel store", init_store))
        .mount("/channel", cmp::routes::routes())
}

pub fn rocket() -> Rocket<Build> {
    rocket_from(rocket::Config::figment())
}
