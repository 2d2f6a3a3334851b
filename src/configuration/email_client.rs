use std::time::Duration;

use reqwest::Url;
use secrecy::Secret;
use serde::{de, Deserialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::UserEmail;

#[derive(Clone, Debug, Deserialize)]
pub struct EmailClientConfig {
    pub base_url: UrlWrapper,
    pub sender: UserEmail,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Clone, Debug)]
pub struct UrlWrapper(Url);

impl<'de> Deserialize<'de> for UrlWrapper {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Url::parse(&String::deserialize(deserializer)?)
            .map_err(de::Error::custom)
            .map(UrlWrapper)
    }
}

impl From<Url> for UrlWrapper {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl From<UrlWrapper> for Url {
    fn from(wrapper: UrlWrapper) -> Self {
        wrapper.0
    }
}
