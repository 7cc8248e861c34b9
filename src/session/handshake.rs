//! Connection handshake
//!
//! The pieces of an upgrade request a session lookup may look at.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "sid";

/// Query parameter accepted when a client cannot set cookies
pub const SESSION_QUERY_PARAM: &str = "token";

/// Cookies and query parameters from a connection request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl Handshake {
    /// Collect cookies from the headers and parameters from the raw query
    pub fn from_request(headers: &HeaderMap, query: Option<&str>) -> Self {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| parse_pairs(raw, ';'))
            .collect();
        let query = query.map(|raw| parse_pairs(raw, '&')).unwrap_or_default().into_iter().collect();

        Self { cookies, query }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Session token: the `sid` cookie, else the `token` query parameter
    pub fn session_token(&self) -> Option<&str> {
        self.cookie(SESSION_COOKIE)
            .or_else(|| self.query_param(SESSION_QUERY_PARAM))
            .filter(|token| !token.is_empty())
    }
}

fn parse_pairs(raw: &str, separator: char) -> Vec<(String, String)> {
    raw.split(separator)
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            let value = urlencoding::decode(value.trim()).ok()?;
            Some((key.trim().to_string(), value.into_owned()))
        })
        .collect()
}
