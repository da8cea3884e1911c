//! Building the callback URL that travels with every probe.
//!
//! The URL comes from a template with the placeholders `{scheme}`,
//! `{address}`, `{name}` and `{token}`. `{{` and `}}` produce literal braces.

use std::str::FromStr;

use url::Url;

use crate::error::{ProbeSetupError, TemplateError};

/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "{scheme}://{address}/callback/{name}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Scheme,
    Address,
    Name,
    Token,
}

/// A parsed response URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    segments: Vec<Segment>,
}

impl FromStr for UrlTemplate {
    type Err = TemplateError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, n)| n == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, n)| n == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                '{' => {
                    let mut ident = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        ident.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }

                    let segment = match ident.trim() {
                        "scheme" => Segment::Scheme,
                        "address" => Segment::Address,
                        "name" => Segment::Name,
                        "token" => Segment::Token,
                        other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }
}

impl UrlTemplate {
    fn render(&self, scheme: &str, address: &str, name: &str, token: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Scheme => out.push_str(scheme),
                Segment::Address => out.push_str(address),
                Segment::Name => out.push_str(name),
                Segment::Token => out.push_str(token),
            }
        }
        out
    }
}

/// Renders callback URLs for the configured service address
#[derive(Debug, Clone)]
pub struct ResponseUrlBuilder {
    template: UrlTemplate,
    address: String,
    scheme: &'static str,
}

impl ResponseUrlBuilder {
    pub fn new(template: UrlTemplate, address: impl Into<String>, https: bool) -> Self {
        Self { template, address: address.into(), scheme: if https { "https" } else { "http" } }
    }

    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Callback URL for the probe `token` on pathway `name`
    pub fn build(&self, name: &str, token: &str) -> Result<Url, ProbeSetupError> {
        let address = public_address(&self.address)?;
        let rendered = self.template.render(self.scheme, &address, name, token);
        Url::parse(&rendered).map_err(|source| ProbeSetupError::ResponseUrl { url: rendered, source })
    }
}

/// Replace a missing or unspecified bind host with this machine's hostname
fn public_address(address: &str) -> Result<String, ProbeSetupError> {
    let port = if address.starts_with(':') {
        address
    } else if let Some(port) = address
        .strip_prefix("0.0.0.0")
        .or_else(|| address.strip_prefix("[::]"))
        .filter(|rest| rest.starts_with(':'))
    {
        port
    } else {
        return Ok(address.to_string());
    };

    let host = gethostname::gethostname()
        .into_string()
        .map_err(|raw| ProbeSetupError::Hostname(format!("hostname is not valid UTF-8: {raw:?}")))?;
    if host.is_empty() {
        return Err(ProbeSetupError::Hostname("hostname is empty".into()));
    }

    Ok(format!("{host}{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(template: &str, address: &str, https: bool) -> ResponseUrlBuilder {
        ResponseUrlBuilder::new(template.parse().unwrap(), address, https)
    }

    #[test]
    fn renders_default_template() {
        let url = builder(DEFAULT_TEMPLATE, "probe.example.com:8080", false).build("checkout", "t-1").unwrap();
        assert_eq!(url.as_str(), "http://probe.example.com:8080/callback/checkout");
    }

    #[test]
    fn https_scheme_is_used_when_requested() {
        let url = builder(DEFAULT_TEMPLATE, "probe.example.com", true).build("a", "t").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn custom_template_can_carry_the_token() {
        let url = builder("{scheme}://{address}/hooks/{ name }?token={token}", "10.0.0.1:80", false)
            .build("orders", "abc")
            .unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.1/hooks/orders?token=abc");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let template: UrlTemplate = "{scheme}://{address}/x{{y}}".parse().unwrap();
        assert_eq!(template.render("http", "h", "n", "t"), "http://h/x{y}");
    }

    #[test]
    fn rejects_bad_templates() {
        assert_eq!(
            "{scheme}://{host}/".parse::<UrlTemplate>(),
            Err(TemplateError::UnknownPlaceholder("host".into()))
        );
        assert_eq!("{scheme://x".parse::<UrlTemplate>(), Err(TemplateError::Unclosed(0)));
        assert_eq!("http://x}".parse::<UrlTemplate>(), Err(TemplateError::UnmatchedClose(8)));
    }

    #[test]
    fn bare_port_gets_the_hostname() {
        let host = gethostname::gethostname().into_string().unwrap();
        assert_eq!(public_address(":8080").unwrap(), format!("{host}:8080"));
        assert_eq!(public_address("0.0.0.0:9000").unwrap(), format!("{host}:9000"));
        assert_eq!(public_address("[::]:9000").unwrap(), format!("{host}:9000"));
        assert_eq!(public_address("127.0.0.1:9000").unwrap(), "127.0.0.1:9000");
    }

    #[test]
    fn unparsable_result_is_a_setup_error() {
        let err = builder("{name}", "h", false).build("not a url", "t").unwrap_err();
        assert!(matches!(err, ProbeSetupError::ResponseUrl { .. }));
    }
}
