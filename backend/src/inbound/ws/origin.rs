//! Origin allow-list for WebSocket upgrades.

use actix_web::http::header::HeaderValue;
use tracing::{error, warn};
use url::{Origin, Url};

/// Origins a browser may open the notification socket from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAllowList {
    origins: Vec<Origin>,
}

impl OriginAllowList {
    /// Parse configured origins such as `https://communityfix.example`.
    pub fn parse<I, S>(origins: I) -> Result<Self, url::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|raw| Url::parse(raw.as_ref().trim()).map(|url| url.origin()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { origins })
    }

    /// True when `origin` matches an entry on scheme, host and port.
    pub fn allows(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        candidate.is_tuple() && self.origins.contains(&candidate)
    }

    /// Validate a raw `Origin` header value.
    pub fn validate(&self, header: &HeaderValue) -> actix_web::Result<()> {
        let value = header.to_str().map_err(|error| {
            error!(error = %error, "Failed to parse Origin header as string");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;
        let origin = Url::parse(value).map_err(|error| {
            error!(error = %error, "Failed to parse Origin header as URL");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;

        if self.allows(&origin) {
            Ok(())
        } else {
            warn!(origin = value, "Rejected WS upgrade due to disallowed Origin");
            Err(actix_web::error::ErrorForbidden("Origin not allowed"))
        }
    }
}
