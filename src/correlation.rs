//! Locating the submission token inside an incoming survey webhook.
//!
//! The survey service does not send the token in one fixed place. Each
//! strategy below looks in one known location; they are tried in order and
//! the first non-empty hit wins. Transport-level query parameters are tried
//! first because the sender sets them directly.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::token::Token;

pub const TOKEN_PARAM: &str = "submission_id";

pub type QueryParams = BTreeMap<String, String>;

/// A token together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub token: Token,
    pub source: &'static str,
}

pub struct Strategy {
    pub name: &'static str,
    pub extract: fn(&Value, &QueryParams) -> Option<Token>,
}

/// Extraction strategies in priority order.
pub const STRATEGIES: [Strategy; 5] = [
    Strategy {
        name: "query",
        extract: from_query_params,
    },
    Strategy {
        name: "query_string",
        extract: from_query_string,
    },
    Strategy {
        name: "url",
        extract: from_url,
    },
    Strategy {
        name: "analytics_data.query_string",
        extract: from_analytics_query_string,
    },
    Strategy {
        name: "analytics_data.url",
        extract: from_analytics_url,
    },
];

pub fn extract_token(payload: &Value, query: &QueryParams) -> Option<Correlation> {
    STRATEGIES.iter().find_map(|strategy| {
        (strategy.extract)(payload, query).map(|token| {
            tracing::debug!(source = strategy.name, %token, "submission_id resolved");
            Correlation {
                token,
                source: strategy.name,
            }
        })
    })
}

pub fn from_query_params(_payload: &Value, query: &QueryParams) -> Option<Token> {
    query.get(TOKEN_PARAM).and_then(|raw| Token::parse(raw))
}

pub fn from_query_string(payload: &Value, _query: &QueryParams) -> Option<Token> {
    payload.get("query_string").and_then(token_in_query_string)
}

pub fn from_url(payload: &Value, _query: &QueryParams) -> Option<Token> {
    payload.get("url").and_then(token_in_url)
}

pub fn from_analytics_query_string(payload: &Value, _query: &QueryParams) -> Option<Token> {
    payload
        .get("analytics_data")
        .and_then(|analytics| analytics.get("query_string"))
        .and_then(token_in_query_string)
}

pub fn from_analytics_url(payload: &Value, _query: &QueryParams) -> Option<Token> {
    payload
        .get("analytics_data")
        .and_then(|analytics| analytics.get("url"))
        .and_then(token_in_url)
}

fn token_in_query_string(value: &Value) -> Option<Token> {
    let raw = value.as_str()?;
    let query = raw.trim().trim_start_matches('?');
    let query = query.split_once('#').map_or(query, |(before, _)| before);
    token_in_pairs(form_urlencoded::parse(query.as_bytes()))
}

/// Relative URLs are resolved against a placeholder origin. Only the query
/// component is inspected; a `?` inside the fragment does not count.
fn token_in_url(value: &Value) -> Option<Token> {
    let raw = value.as_str()?.trim();
    let url = Url::parse(raw)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(raw)))
        .ok()?;
    token_in_pairs(url.query_pairs())
}

fn token_in_pairs<'a>(
    mut pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
) -> Option<Token> {
    pairs
        .find(|(key, value)| key == TOKEN_PARAM && !value.trim().is_empty())
        .and_then(|(_, value)| Token::parse(&value))
}
