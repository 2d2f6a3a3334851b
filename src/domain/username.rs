use serde::{de, Deserialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct Username(String);

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Username {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let forbidden_characters = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        if value.trim().is_empty()
            || value.graphemes(true).count() > 50
            || value.chars().any(|c| forbidden_characters.contains(&c))
        {
            Err(format!("{} is not a valid username", value))
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Self::try_from(String::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Username;

    #[test]
    fn a_valid_username_is_parsed_successfully() {
        let username = "john_doe".to_string();
        assert!(Username::try_from(username).is_ok());
    }

    #[test]
    fn a_50_grapheme_long_username_is_valid() {
        let username = "a".repeat(50);
        assert!(Username::try_from(username).is_ok());
    }

    #[test]
    fn a_username_longer_than_50_graphemes_is_rejected() {
        let username = "a".repeat(51);
        assert!(Username::try_from(username).is_err());
    }

    #[test]
    fn whitespace_only_usernames_are_rejected() {
        let username = " ".to_string();
        assert!(Username::try_from(username).is_err());
    }

    #[test]
    fn empty_string_is_rejected() {
        let username = "".to_string();
        assert!(Username::try_from(username).is_err());
    }

    #[test]
    fn usernames_containing_an_invalid_character_are_rejected() {
        for username in &['/', '(', ')', '"', '<', '>', '\\', '{', '}'] {
            let username = username.to_string();
            assert!(Username::try_from(username).is_err());
        }
    }
}
