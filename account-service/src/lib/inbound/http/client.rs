use std::convert::Infallible;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use crate::domain::session::models::ClientMetadata;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Peers allowed to report the client address through `X-Forwarded-For`.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpAddr>>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(Arc::new(proxies))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }
}

/// Client address and user agent of the current request.
///
/// The address is the socket peer address. When that peer is a trusted
/// proxy, the first `X-Forwarded-For` hop is used instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo(pub ClientMetadata);

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let from_proxy = match (peer, parts.extensions.get::<TrustedProxies>()) {
            (Some(peer), Some(proxies)) => proxies.contains(&peer),
            _ => false,
        };

        let forwarded = if from_proxy {
            parts
                .headers
                .get(X_FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|hop| hop.trim().to_string())
                .filter(|hop| !hop.is_empty())
        } else {
            None
        };

        let ip = forwarded.or_else(|| peer.map(|ip| ip.to_string()));

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(ClientInfo(ClientMetadata { ip, user_agent }))
    }
}

impl From<ClientInfo> for ClientMetadata {
    fn from(client: ClientInfo) -> Self {
        client.0
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    const PROXY: [u8; 4] = [10, 0, 0, 5];

    async fn extract(request: Request<()>) -> ClientMetadata {
        let (mut parts, _) = request.into_parts();
        let ClientInfo(client) = ClientInfo::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        client
    }

    fn forwarded_from(peer: [u8; 4]) -> Request<()> {
        let mut request = Request::builder()
            .header(X_FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .header(USER_AGENT, "curl/8.4")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 40000))));
        request
            .extensions_mut()
            .insert(TrustedProxies::new(vec![IpAddr::from(PROXY)]));
        request
    }

    #[tokio::test]
    async fn test_first_forwarded_hop_wins_behind_trusted_proxy() {
        let client = extract(forwarded_from(PROXY)).await;
        assert_eq!(client.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(client.user_agent.as_deref(), Some("curl/8.4"));
    }

    #[tokio::test]
    async fn test_forwarded_header_ignored_from_untrusted_peer() {
        let client = extract(forwarded_from([192, 0, 2, 1])).await;
        assert_eq!(client.ip.as_deref(), Some("192.0.2.1"));
    }

    #[tokio::test]
    async fn test_forwarded_header_ignored_without_peer_address() {
        let mut request = Request::builder()
            .header(X_FORWARDED_FOR, "203.0.113.7")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(TrustedProxies::new(vec![IpAddr::from(PROXY)]));

        let client = extract(request).await;
        assert!(client.ip.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 40000))));

        let client = extract(request).await;
        assert_eq!(client.ip.as_deref(), Some("192.0.2.1"));
        assert!(client.user_agent.is_none());
    }

    #[tokio::test]
    async fn test_no_metadata() {
        let client = extract(Request::builder().body(()).unwrap()).await;
        assert_eq!(client, ClientMetadata::default());
    }
}
