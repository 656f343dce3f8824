use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

use crate::config::CONFIG;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| build_http_client(CONFIG.http_timeout_seconds));

pub fn build_http_client(timeout_seconds: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .expect("Failed to build HTTP client")
}

pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
