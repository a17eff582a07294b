//! Gateway configuration.

use std::net::Ipv4Addr;
use std::net::SocketAddr;

use url::Url;

const DEFAULT_UPSTREAM_URL: &str = "https://pokeapi.co/api/v2/pokemon";

/// The gateway configuration.
///
/// Constructed once at startup and immutable afterwards; it is read
/// concurrently without synchronization.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// The socket address the HTTP server binds.
    pub listen: SocketAddr,

    /// Base URL of the upstream entity lookup REST API. The entity id is
    /// appended as the final path segment of each fetch.
    pub upstream_url: Url,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder(visibility = "pub")]
    fn new(listen: Option<SocketAddr>, upstream_url: Option<Url>) -> Self {
        Self {
            listen: listen.unwrap_or_else(default_listen),
            upstream_url: upstream_url.unwrap_or_else(default_upstream_url),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

fn default_upstream_url() -> Url {
    Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let configuration = Configuration::default();
        assert_eq!(configuration.listen.port(), 8080);
        assert_eq!(configuration.upstream_url.as_str(), DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn builder_overrides_defaults() {
        let configuration = Configuration::builder()
            .listen(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 4000)))
            .upstream_url(Url::parse("http://127.0.0.1:9999/api/v2/entity").expect("valid url"))
            .build();
        assert_eq!(configuration.listen.port(), 4000);
        assert_eq!(configuration.upstream_url.path(), "/api/v2/entity");
    }
}
