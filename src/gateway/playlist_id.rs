//! Parses a playlist reference out of whatever shape a host pastes in:
//! a bare id, a share URL, or a URI (spec §4.2).

use once_cell::sync::Lazy;
use regex::Regex;

static BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{22}$").unwrap());
static URL_FORM: Lazy<Regex> = Lazy::new(|| Regex::new(r"playlist/([A-Za-z0-9]{22})").unwrap());
static URI_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.]+:playlist:([A-Za-z0-9]{22})$").unwrap());

/// Returns the bare 22-character id, or `None` if `input` matches none of
/// the accepted forms.
pub fn parse_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();

    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }
    if let Some(caps) = URL_FORM.captures(input) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = URI_FORM.captures(input) {
        return Some(caps[1].to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_id() {
        let id = "3cEYpjA9oz9GiPac4AsH4n";
        assert_eq!(parse_playlist_id(id), Some(id.to_string()));
    }

    #[test]
    fn accepts_web_url() {
        let url = "https://example.com/playlist/3cEYpjA9oz9GiPac4AsH4n?si=abc";
        assert_eq!(
            parse_playlist_id(url),
            Some("3cEYpjA9oz9GiPac4AsH4n".to_string())
        );
    }

    #[test]
    fn accepts_uri_scheme() {
        let uri = "music:playlist:3cEYpjA9oz9GiPac4AsH4n";
        assert_eq!(
            parse_playlist_id(uri),
            Some("3cEYpjA9oz9GiPac4AsH4n".to_string())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_playlist_id("not a playlist reference"), None);
        assert_eq!(parse_playlist_id("too-short-id"), None);
    }
}
