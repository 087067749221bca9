//! Six-component URI decomposition.
//!
//! # Responsibilities
//! - Split a URL or request target into scheme, netloc, path, params, query, fragment
//! - Recompose components into a URL string
//!
//! # Design Decisions
//! - Purely textual: no percent-decoding, no normalization
//! - Params (`;...`) are split from the last path segment only
//! - Relative references are accepted (empty scheme/netloc)

use std::fmt;

/// Schemes whose paths may carry `;params`.
const USES_PARAMS: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtspu", "sip",
    "sips", "mms", "sftp", "tel",
];

/// Schemes that are recomposed with a `//` authority marker.
const USES_NETLOC: &[&str] = &[
    "", "ftp", "http", "gopher", "nntp", "telnet", "imap", "wais", "file", "mms", "https",
    "shttp", "snews", "prospero", "rtsp", "rtspu", "rsync", "svn", "svn+ssh", "sftp", "nfs",
    "git", "git+ssh", "ws", "wss",
];

/// A URI split into its six textual components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UriParts {
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

impl UriParts {
    /// Decompose `url` into components.
    pub fn parse(url: &str) -> Self {
        let (scheme, rest) = split_scheme(url);

        let (netloc, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find(['/', '?', '#']).unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
            None => ("", rest),
        };

        let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let (path, params) = if USES_PARAMS.contains(&scheme.as_str()) && path.contains(';') {
            split_params(path)
        } else {
            (path, "")
        };

        Self {
            scheme,
            netloc: netloc.to_string(),
            path: path.to_string(),
            params: params.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// The raw `path[;params][?query]` form, as seen on a request line.
    pub fn path_params_query(&self) -> String {
        let mut out = self.path.clone();
        if !self.params.is_empty() {
            out.push(';');
            out.push_str(&self.params);
        }
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        out
    }
}

impl fmt::Display for UriParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&unparse(
            &self.scheme,
            &self.netloc,
            &self.path,
            &self.params,
            &self.query,
            &self.fragment,
        ))
    }
}

/// Recompose URI components into a URL string.
pub fn unparse(
    scheme: &str,
    netloc: &str,
    path: &str,
    params: &str,
    query: &str,
    fragment: &str,
) -> String {
    let mut url = String::with_capacity(
        scheme.len() + netloc.len() + path.len() + params.len() + query.len() + fragment.len() + 8,
    );
    if !scheme.is_empty() {
        url.push_str(scheme);
        url.push(':');
    }

    let wants_netloc = !netloc.is_empty()
        || (!scheme.is_empty() && USES_NETLOC.contains(&scheme) && !path.starts_with("//"));
    if wants_netloc {
        url.push_str("//");
        url.push_str(netloc);
        if (!path.is_empty() || !params.is_empty()) && !path.starts_with('/') {
            url.push('/');
        }
    }

    url.push_str(path);
    if !params.is_empty() {
        url.push(';');
        url.push_str(params);
    }
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    if !fragment.is_empty() {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

fn split_scheme(url: &str) -> (String, &str) {
    if let Some(i) = url.find(':') {
        let candidate = &url[..i];
        let valid = candidate
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return (candidate.to_ascii_lowercase(), &url[i + 1..]);
        }
    }
    (String::new(), url)
}

fn split_params(path: &str) -> (&str, &str) {
    let semi = match path.rfind('/') {
        Some(slash) => path[slash..].find(';').map(|i| slash + i),
        None => path.find(';'),
    };
    match semi {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (path, ""),
    }
}
