//! Query-string helpers for building request and redirect URLs.
//!
//! These work on plain strings rather than [`url::Url`] so that relative and
//! protocol-relative URLs (`//maps.googleapis.com/...`) pass through untouched.

/// Returns `true` if the query string of `url` already carries a `name=` pair.
///
/// `url` must not contain a fragment. Only whole keys match: `a` is not
/// present in `?ab=1`.
fn has_param(url: &str, name: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };

    query.split('&').any(|pair| {
        pair.strip_prefix(name)
            .is_some_and(|rest| rest.starts_with('='))
    })
}

/// Appends a single `name=value` parameter to `url`.
///
/// The value is percent-encoded and lands in the query, ahead of any
/// `#fragment`. If `url` already has a parameter called `name`, it is
/// returned unchanged.
#[must_use]
pub fn append_param(url: &str, name: &str, value: &str) -> String {
    let (base, fragment) = url
        .split_once('#')
        .map_or((url, None), |(base, fragment)| (base, Some(fragment)));
    if has_param(base, name) {
        return url.to_owned();
    }

    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };
    let mut out = format!("{base}{separator}{name}={}", urlencoding::encode(value));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Appends every `(name, value)` pair to `url` with [`append_param`].
///
/// Each name is handled independently, so iteration order of `params`
/// only affects the textual order of the resulting query.
#[must_use]
pub fn append_params<I, K, V>(url: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .fold(url.to_owned(), |acc, (name, value)| {
            append_param(&acc, name.as_ref(), value.as_ref())
        })
}
