use std::borrow::Cow;

use super::state::UrlProjection;

/// Raw `tab`/`space`/`company` parameters as the router reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedQuery {
    pub tab: Option<String>,
    pub space: Option<String>,
    pub company: Option<String>,
}

impl ObservedQuery {
    pub fn new(tab: Option<&str>, space: Option<&str>, company: Option<&str>) -> Self {
        Self {
            tab: tab.map(str::to_string),
            space: space.map(str::to_string),
            company: company.map(str::to_string),
        }
    }

    /// Accepts a bare query (`tab=x`), a query with its `?`, or a path with a
    /// query (`/dashboard?tab=x`). Fragments are ignored; the first occurrence
    /// of a key wins.
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, rest)) => rest,
            None if input.contains('=') => input,
            None => "",
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut observed = Self::default();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match &*decode(key) {
                "tab" => &mut observed.tab,
                "space" => &mut observed.space,
                "company" => &mut observed.company,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode(value).into_owned());
            }
        }
        observed
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(plus_decoded),
    }
}

/// Canonical query for a projection: `?tab=..[&space=..][&company=..]`.
pub fn render_projection(projection: &UrlProjection, legacy_company_param: bool) -> String {
    let mut url = format!("?tab={}", projection.tab.as_str());
    if let Some(space) = projection.space.as_ref() {
        let encoded = urlencoding::encode(space.as_str());
        url.push_str("&space=");
        url.push_str(&encoded);
        if legacy_company_param {
            url.push_str("&company=");
            url.push_str(&encoded);
        }
    }
    url
}
