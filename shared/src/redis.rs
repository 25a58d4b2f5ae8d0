use anyhow::Result;
use ::redis::Client;
use tracing::info;

pub type Redis = Client;

pub fn get_redis_client(redis_url: &str) -> Result<Redis> {
    info!("Opening redis client for {}", redis_url);
    let client = Client::open(redis_url)?;
    Ok(client)
}
