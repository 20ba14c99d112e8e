use crate::error::Result;
use crate::portfolio::Holding;
use crate::share::codec;
use crate::share::location::Location;

/// Bridges the token codec to the ambient location.
///
/// The holdings list is the only persisted state and the address is the only
/// store: `<base_path><token>` is the canonical form, and inbound links may
/// instead carry the token in a query parameter (static-hosting fallback
/// redirects arrive that way).
pub struct UrlState<L: Location> {
    location: L,
    base_path: String,
    state_param: String,
}

impl<L: Location> UrlState<L> {
    pub fn new<B, Q>(location: L, base_path: B, state_param: Q) -> Self
    where
        B: Into<String>,
        Q: Into<String>,
    {
        Self {
            location,
            base_path: base_path.into(),
            state_param: state_param.into(),
        }
    }

    /// Read the holdings carried by the current address, if any.
    ///
    /// The carried-state query parameter wins over the path; when it decodes,
    /// the address is rewritten to the canonical path form with the inbound
    /// token embedded as received. Decode failures of either form are "no
    /// usable saved state" (`Ok(None)`); only location I/O can error.
    pub fn read(&mut self) -> Result<Option<Vec<Holding>>> {
        let Some(current) = self.location.current() else {
            return Ok(None);
        };
        let (path, query) = split_uri(&current);

        if let Some(token) = query_param(query, &self.state_param) {
            if let Some(holdings) = codec::decode(&token) {
                self.location
                    .replace(&format!("{}{}", self.base_path, token))?;
                return Ok(Some(holdings));
            }
        }

        let Some(remainder) = path.strip_prefix(self.base_path.as_str()) else {
            return Ok(None);
        };
        if remainder.is_empty() || remainder == "index.html" {
            return Ok(None);
        }
        Ok(codec::decode(remainder))
    }

    /// Persist the holdings list into the address, in place.
    pub fn write(&mut self, holdings: &[Holding]) -> Result<()> {
        if holdings.is_empty() {
            return self.location.replace(&self.base_path);
        }
        let token = codec::encode(holdings)?;
        self.location
            .replace(&format!("{}{}", self.base_path, token))
    }

    /// Point the location at an inbound address (e.g. a pasted share link)
    /// without interpreting it; a following `read` does the interpreting.
    pub fn replace_location(&mut self, uri: &str) -> Result<()> {
        self.location.replace(uri)
    }

    pub fn current_location(&self) -> Option<String> {
        self.location.current()
    }

    /// Full shareable URL for the current state.
    pub fn share_url(&self, origin: &str) -> String {
        let current = self
            .location
            .current()
            .unwrap_or_else(|| self.base_path.clone());
        format!("{}{}", origin.trim_end_matches('/'), current)
    }
}

fn split_uri(uri: &str) -> (&str, Option<&str>) {
    let uri = uri.split_once('#').map_or(uri, |(head, _)| head);
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

/// Raw lookup of a query value. Values pass through verbatim: any
/// percent-encoding or `+` mangling they carry is the codec's to absorb.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}
