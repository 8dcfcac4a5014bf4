use derive_more::{Display, From, Into};
use url::Url;

use crate::cookies::CredentialStore;
use crate::error::Error;
use crate::url_params;

/// Fragment key Foursquare uses when redirecting back with a token.
const TOKEN_FRAGMENT: &str = "#access_token=";

/// Foursquare `OAuth2` implicit-grant configuration.
///
/// The client ID and redirect URI are required constructor parameters.
///
/// ```rust,ignore
/// use venue_map::OAuthConfig;
///
/// let config = OAuthConfig::new("my-client-id", "https://my-app.com/".parse()?);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) auth_url: Url,
    pub(crate) redirect_uri: Url,
}

impl OAuthConfig {
    /// Create a new implicit-grant configuration.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri,
            auth_url: "https://foursquare.com/oauth2/authenticate"
                .parse()
                .expect("valid default URL"),
        }
    }

    /// Override the Foursquare authorize endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// `OAuth2` client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Authorization endpoint URL.
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Where Foursquare sends the user back, token in the fragment.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Login link target: the authorize URL asking for `response_type=token`.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        url_params::append_params(
            self.auth_url.as_str(),
            [
                ("client_id", self.client_id.as_str()),
                ("response_type", "token"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
    }
}

/// Opaque Foursquare access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into)]
pub struct AccessToken(pub String);

impl AccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where an acquired token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenSource {
    #[display("cookie")]
    Cookie,
    #[display("redirect fragment")]
    Fragment,
}

/// Extract the token from a redirect URL of the form `<app>#access_token=<token>`.
///
/// The whole href is searched rather than just the fragment, since the
/// fragment may not be populated yet while the page is still loading. The
/// token ends at the next `&`, if any.
#[must_use]
pub fn token_from_redirect(href: &str) -> Option<AccessToken> {
    let start = href.find(TOKEN_FRAGMENT).filter(|&i| i > 0)? + TOKEN_FRAGMENT.len();
    let rest = &href[start..];
    let token = rest.split_once('&').map_or(rest, |(t, _)| t);

    (!token.is_empty()).then(|| AccessToken(token.to_owned()))
}

/// Find the access token: stored cookie first, then the redirect fragment.
///
/// A token taken from the fragment is written to `cookie_name` with
/// `ttl_days` before returning. `Ok(None)` means the user has to log in.
///
/// # Errors
///
/// Returns [`Error::Dom`] if persisting a fragment token fails.
pub fn acquire_token<S: CredentialStore + ?Sized>(
    store: &S,
    cookie_name: &str,
    href: &str,
    ttl_days: Option<u32>,
) -> Result<Option<(AccessToken, TokenSource)>, Error> {
    if let Some(token) = store.read(cookie_name).filter(|t| !t.is_empty()) {
        return Ok(Some((AccessToken(token), TokenSource::Cookie)));
    }

    let Some(token) = token_from_redirect(href) else {
        return Ok(None);
    };
    store.write(cookie_name, token.as_str(), ttl_days)?;

    Ok(Some((token, TokenSource::Fragment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{MemoryCookies, TOKEN_COOKIE_NAME};

    fn test_config() -> OAuthConfig {
        OAuthConfig::new("test-client", "https://example.com/".parse().unwrap())
    }

    #[test]
    fn test_authorization_url_requests_token() {
        let url = test_config().authorization_url();

        assert!(url.starts_with("https://foursquare.com/oauth2/authenticate?client_id=test-client"));
        assert!(url.contains("&response_type=token"));
        assert!(url.contains("&redirect_uri=https%3A%2F%2Fexample.com%2F"));
    }

    #[test]
    fn test_config_with_overrides() {
        let config = test_config()
            .with_auth_url("https://custom.example.com/authorize".parse().unwrap());

        assert_eq!(config.client_id(), "test-client");
        assert_eq!(config.redirect_uri().as_str(), "https://example.com/");
        assert!(
            config
                .authorization_url()
                .starts_with("https://custom.example.com/authorize?")
        );
    }

    #[test]
    fn test_token_from_redirect() {
        assert_eq!(
            token_from_redirect("https://example.com/#access_token=ABC123"),
            Some(AccessToken("ABC123".into()))
        );
        assert_eq!(
            token_from_redirect("https://example.com/#access_token=ABC123&state=x"),
            Some(AccessToken("ABC123".into()))
        );
    }

    #[test]
    fn test_token_from_redirect_rejects_missing_or_empty() {
        assert_eq!(token_from_redirect("https://example.com/"), None);
        assert_eq!(token_from_redirect("https://example.com/#access_token="), None);
        assert_eq!(token_from_redirect("#access_token=ABC"), None);
    }

    #[test]
    fn test_acquire_from_fragment_persists_cookie() {
        let store = MemoryCookies::new();
        let acquired = acquire_token(
            &store,
            TOKEN_COOKIE_NAME,
            "https://example.com/#access_token=ABC123",
            None,
        )
        .unwrap();

        assert_eq!(
            acquired,
            Some((AccessToken("ABC123".into()), TokenSource::Fragment))
        );
        assert_eq!(store.read(TOKEN_COOKIE_NAME).as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_cookie_takes_precedence_over_fragment() {
        let store = MemoryCookies::new();
        store.write(TOKEN_COOKIE_NAME, "FROM_COOKIE", Some(7)).unwrap();

        let acquired = acquire_token(
            &store,
            TOKEN_COOKIE_NAME,
            "https://example.com/#access_token=FROM_URL",
            None,
        )
        .unwrap();

        assert_eq!(
            acquired,
            Some((AccessToken("FROM_COOKIE".into()), TokenSource::Cookie))
        );
    }

    #[test]
    fn test_no_cookie_no_fragment_means_login() {
        let store = MemoryCookies::new();
        let acquired =
            acquire_token(&store, TOKEN_COOKIE_NAME, "https://example.com/", None).unwrap();

        assert_eq!(acquired, None);
        assert_eq!(store.header(), "");
    }
}
