//! Cookie security flag coverage check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

/// A parsed Set-Cookie header. Attribute names are matched
/// case-insensitively; unknown attributes are ignored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<String>,
}

/// Parses a single Set-Cookie header value
pub(crate) fn parse_set_cookie(raw: &str) -> ParsedCookie {
    let mut parts = raw.split(';').map(str::trim);
    let name_value = parts.next().unwrap_or_default();
    let (name, value) = name_value
        .split_once('=')
        .unwrap_or((name_value, ""));

    let mut cookie = ParsedCookie {
        name: name.to_string(),
        value: value.to_string(),
        secure: false,
        http_only: false,
        same_site: None,
        max_age: None,
        expires: None,
    };

    for attr in parts {
        let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
        match key.to_lowercase().as_str() {
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            "samesite" => cookie.same_site = Some(val.to_string()),
            "max-age" => cookie.max_age = val.parse().ok(),
            "expires" => cookie.expires = Some(val.to_string()),
            _ => {}
        }
    }

    cookie
}

/// Flag coverage across all cookies set by the target, as `n/total` ratios
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookiesFinding {
    pub total: usize,
    pub secure: String,
    pub http_only: String,
    pub same_site: String,
}

/// Counts Secure/HttpOnly/SameSite coverage over Set-Cookie headers
pub struct CookiesCheck;

#[async_trait]
impl super::Check for CookiesCheck {
    fn id(&self) -> &'static str {
        "cookies"
    }

    fn description(&self) -> &'static str {
        "Cookie security flags (Secure, HttpOnly, SameSite)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.head(target.as_str()).await?;
        let cookies: Vec<ParsedCookie> = response
            .header_all("set-cookie")
            .iter()
            .map(|raw| parse_set_cookie(raw))
            .collect();

        let total = cookies.len();
        let secure = cookies.iter().filter(|c| c.secure).count();
        let http_only = cookies.iter().filter(|c| c.http_only).count();
        let same_site = cookies.iter().filter(|c| c.same_site.is_some()).count();

        Ok(super::Finding::Cookies(CookiesFinding {
            total,
            secure: format!("{secure}/{total}"),
            http_only: format!("{http_only}/{total}"),
            same_site: format!("{same_site}/{total}"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_attributes() {
        let cookie =
            parse_set_cookie("sessionid=abc123; Secure; HttpOnly; SameSite=Lax; Max-Age=3600");
        assert_eq!(cookie.name, "sessionid");
        assert_eq!(cookie.value, "abc123");
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site.as_deref(), Some("Lax"));
        assert_eq!(cookie.max_age, Some(3600));
    }

    #[test]
    fn bare_cookie_has_no_flags() {
        let cookie = parse_set_cookie("track=1");
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
        assert!(cookie.same_site.is_none());
        assert!(cookie.max_age.is_none());
    }
}
