//! URL utilities for player asset locators

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static PLAYER_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/s/player/([0-9a-fA-F]{8})/").expect("player id pattern is valid")
});

/// Extract the player build id from a player asset URL
///
/// `https://www.youtube.com/s/player/af7f576f/player_ias.vflset/en_US/base.js`
/// yields `af7f576f`. Relative locators (`/s/player/...`) are accepted too.
pub fn extract_player_id(player_url: &str) -> Option<String> {
    let path = match Url::parse(player_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) if player_url.starts_with('/') => {
            player_url.to_string()
        }
        Err(_) => return None,
    };

    PLAYER_ID_REGEX
        .captures(&path)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_player_id() {
        assert_eq!(
            extract_player_id(
                "https://www.youtube.com/s/player/af7f576f/player_ias.vflset/en_US/base.js"
            ),
            Some("af7f576f".to_string())
        );
        assert_eq!(
            extract_player_id("https://host/s/player/AF7F576F/player_ias.vflset/en_US/base.js"),
            Some("af7f576f".to_string())
        );
        assert_eq!(
            extract_player_id("/s/player/0123abcd/tv-player-ias.vflset/tv-player-ias.js"),
            Some("0123abcd".to_string())
        );
    }

    #[test]
    fn test_extract_player_id_edge_cases() {
        assert_eq!(extract_player_id(""), None);
        assert_eq!(extract_player_id("not a url"), None);
        assert_eq!(extract_player_id("https://www.youtube.com/watch?v=W78n255zM6g"), None);
        // Too short / not hex
        assert_eq!(extract_player_id("https://host/s/player/af7f57/base.js"), None);
        assert_eq!(extract_player_id("https://host/s/player/zzzzzzzz/base.js"), None);
        // Id in the query string does not count
        assert_eq!(extract_player_id("https://host/base.js?p=/s/player/af7f576f/"), None);
    }
}
