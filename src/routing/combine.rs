//! Merge a destination template with the incoming request's URI components.
//!
//! # Rules
//! - scheme and netloc come from the destination, never the request
//! - `${path}`, `${params}`, `${query}`, `${fragment}` in the destination's
//!   path, params, query and fragment are replaced by the incoming component
//!   (empty when absent); every placeholder gets the incoming value, in every
//!   field it appears in
//! - consumption is per field: a component substituted into its own field
//!   (`${query}` in the query) is not appended to that field again; filling a
//!   placeholder in some other field does not stop the append
//! - otherwise: incoming fragment replaces the destination's; incoming params
//!   join with `;`; incoming query joins with `&`; the path is never appended to

use std::borrow::Cow;

use crate::routing::uri::{unparse, UriParts};

/// Placeholders one destination field substituted.
#[derive(Debug, Default, Clone, Copy)]
struct Used {
    params: bool,
    query: bool,
    fragment: bool,
}

/// Build the final redirect URL for `incoming` from the `destination` template.
pub fn combine(destination: &UriParts, incoming: &UriParts) -> String {
    let (path, _) = substitute(&destination.path, incoming);
    let (params, params_used) = substitute(&destination.params, incoming);
    let (query, query_used) = substitute(&destination.query, incoming);
    let (fragment, fragment_used) = substitute(&destination.fragment, incoming);

    let fragment = if !incoming.fragment.is_empty() && !fragment_used.fragment {
        Cow::Borrowed(incoming.fragment.as_str())
    } else {
        fragment
    };

    let params = join(params, &incoming.params, params_used.params, ';');
    let query = join(query, &incoming.query, query_used.query, '&');

    unparse(
        &destination.scheme,
        &destination.netloc,
        &path,
        &params,
        &query,
        &fragment,
    )
}

fn join<'a>(base: Cow<'a, str>, extra: &'a str, consumed: bool, sep: char) -> Cow<'a, str> {
    if extra.is_empty() || consumed {
        base
    } else if base.is_empty() {
        Cow::Borrowed(extra)
    } else {
        Cow::Owned(format!("{}{}{}", base, sep, extra))
    }
}

fn substitute<'a>(template: &'a str, incoming: &UriParts) -> (Cow<'a, str>, Used) {
    let mut used = Used::default();
    if !template.contains("${") {
        return (Cow::Borrowed(template), used);
    }

    let mut out = template.to_string();
    let replacements: [(&str, &str, Option<&mut bool>); 4] = [
        ("${path}", &incoming.path, None),
        ("${params}", &incoming.params, Some(&mut used.params)),
        ("${query}", &incoming.query, Some(&mut used.query)),
        ("${fragment}", &incoming.fragment, Some(&mut used.fragment)),
    ];
    for (placeholder, value, flag) in replacements {
        if out.contains(placeholder) {
            out = out.replace(placeholder, value);
            if let Some(flag) = flag {
                *flag = true;
            }
        }
    }
    (Cow::Owned(out), used)
}
