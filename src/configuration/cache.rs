use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Clone, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub password: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub db: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pool_max_size: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub connect_timeout_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub wait_timeout_seconds: u64,
}

impl RedisConfig {
    pub fn url(&self) -> Secret<String> {
        let url = match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password.expose_secret(),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        };
        Secret::new(url)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_seconds)
    }
}
