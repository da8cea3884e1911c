//! HTTP Basic authentication on inbound requests.

use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::pathway::BasicAuth;

/// Credentials carried by an `Authorization: Basic ...` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse the value of an `Authorization` header
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self { username: username.to_string(), password: password.to_string() })
    }

    /// Credentials of `req`, if it carries well-formed Basic auth
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
        Self::parse(header)
    }

    pub fn matches(&self, expected: &BasicAuth) -> bool {
        self.username == expected.username && self.password == expected.password
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn header(user_pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(user_pass))
    }

    #[test]
    fn parses_basic_header() {
        let creds = BasicCredentials::parse(&header("Bearer:abc-123")).unwrap();
        assert_eq!(creds.username, "Bearer");
        assert_eq!(creds.password, "abc-123");
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = BasicCredentials::parse(&header("user:a:b")).unwrap();
        assert_eq!(creds.password, "a:b");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(BasicCredentials::parse("Bearer abc"), None);
        assert_eq!(BasicCredentials::parse("Basic !!!"), None);
        assert_eq!(BasicCredentials::parse(&format!("Basic {}", STANDARD.encode("nocolon"))), None);
        assert_eq!(BasicCredentials::parse(""), None);
    }

    #[test]
    fn reads_from_request() {
        let req = TestRequest::default().insert_header((AUTHORIZATION, header("u:p"))).to_http_request();
        let creds = BasicCredentials::from_request(&req).unwrap();

        assert!(creds.matches(&BasicAuth { username: "u".into(), password: "p".into() }));
        assert!(!creds.matches(&BasicAuth { username: "u".into(), password: "q".into() }));
        assert_eq!(BasicCredentials::from_request(&TestRequest::default().to_http_request()), None);
    }
}
