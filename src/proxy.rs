use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::ConfigError;

static PROXY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<user>[^:@\s]+):(?P<pass>[^@\s]+)@)?(?P<host>[A-Za-z0-9](?:[A-Za-z0-9.-]*[A-Za-z0-9])?):(?P<port>\d{1,5})$",
    )
    .expect("proxy pattern is a valid regex")
});

/// A validated `host:port` or `user:pass@host:port` proxy address.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    host: String,
    port: u16,
    auth: Option<(String, String)>,
}

impl ProxyAddress {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let invalid = || ConfigError::InvalidProxy(redact(trimmed));

        let caps = PROXY_PATTERN.captures(trimmed).ok_or_else(invalid)?;
        let port = caps["port"]
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(invalid)?;
        let auth = match (caps.name("user"), caps.name("pass")) {
            (Some(user), Some(pass)) => Some((user.as_str().to_string(), pass.as_str().to_string())),
            _ => None,
        };

        Ok(Self {
            host: caps["host"].to_string(),
            port,
            auth,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn to_reqwest(&self) -> reqwest::Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(self.url())?;
        Ok(match &self.auth {
            Some((user, pass)) => proxy.basic_auth(user, pass),
            None => proxy,
        })
    }
}

// Proxy credentials stay out of logs and error messages.
impl fmt::Debug for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAddress")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.auth.is_some() {
            write!(f, "<redacted>@{}:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn redact(raw: &str) -> String {
    match raw.rsplit_once('@') {
        Some((_, rest)) => format!("<redacted>@{rest}"),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::ProxyAddress;
    use crate::error::ConfigError;

    #[test]
    fn parses_proxy_with_credentials() {
        let proxy = ProxyAddress::parse("alice:pw@1.2.3.4:8080").expect("proxy should parse");
        assert_eq!(proxy.host(), "1.2.3.4");
        assert_eq!(proxy.port(), 8080);
        assert!(proxy.has_auth());
        assert_eq!(proxy.url(), "http://1.2.3.4:8080");
    }

    #[test]
    fn parses_proxy_without_credentials() {
        let proxy = ProxyAddress::parse(" proxy.internal:3128 ").expect("proxy should parse");
        assert_eq!(proxy.host(), "proxy.internal");
        assert_eq!(proxy.port(), 3128);
        assert!(!proxy.has_auth());
    }

    #[test]
    fn rejects_malformed_proxies() {
        for raw in [
            "not-a-proxy",
            "",
            "host:",
            ":8080",
            "host:0",
            "host:70000",
            "alice@host:8080",
            "http://host:8080",
            "alice:pw@host",
        ] {
            assert!(
                matches!(ProxyAddress::parse(raw), Err(ConfigError::InvalidProxy(_))),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn rendering_never_exposes_credentials() {
        let proxy = ProxyAddress::parse("alice:secret@10.0.0.1:8080").expect("proxy should parse");
        assert_eq!(proxy.to_string(), "<redacted>@10.0.0.1:8080");
        assert!(!format!("{proxy:?}").contains("secret"));

        let err = ProxyAddress::parse("alice:secret@10.0.0.1:99999").expect_err("port too large");
        assert!(!err.to_string().contains("secret"), "unexpected message: {err}");
    }

    #[test]
    fn converts_to_reqwest_proxy() {
        let proxy = ProxyAddress::parse("alice:pw@1.2.3.4:8080").expect("proxy should parse");
        assert!(proxy.to_reqwest().is_ok());
    }
}
