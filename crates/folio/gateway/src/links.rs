//! Outbound link shaping: advert tracking parameters and media host
//! rewriting.

use crate::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Campaign tracking values attached to an advert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub campaign_id: Option<String>,
}

impl TrackingParams {
    fn pairs(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("utm_source", self.source.as_deref()),
            ("utm_medium", self.medium.as_deref()),
            ("utm_campaign", self.campaign.as_deref()),
            ("utm_id", self.campaign_id.as_deref()),
        ]
    }
}

/// Append tracking parameters to an advert link.
///
/// A parameter already present on the link is left alone. No link gives no
/// result.
pub fn tracking_link(link: Option<&str>, params: &TrackingParams) -> GatewayResult<Option<String>> {
    let Some(link) = link else {
        return Ok(None);
    };
    let mut url = Url::parse(link)
        .map_err(|e| GatewayError::InvalidInput(format!("advert link '{link}': {e}")))?;

    let missing: Vec<(&str, &str)> = params
        .pairs()
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .filter(|(key, _)| !url.query_pairs().any(|(existing, _)| existing == *key))
        .collect();

    if !missing.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in missing {
            query.append_pair(key, value);
        }
    }

    Ok(Some(url.to_string()))
}

/// Move a media URL onto `host`, keeping its path and query.
pub fn rewrite_media_url(original: &str, host: &str) -> GatewayResult<String> {
    let url = Url::parse(original)
        .map_err(|e| GatewayError::InvalidInput(format!("media url '{original}': {e}")))?;

    let mut rewritten = host.trim_end_matches('/').to_string();
    rewritten.push_str(url.path());
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    Ok(rewritten)
}
