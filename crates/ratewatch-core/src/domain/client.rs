/// Transport-level facts about a request that identify its sender.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Raw `X-Forwarded-For` header value.
    pub forwarded_for: Option<String>,
    /// Peer address reported by the transport.
    pub remote_addr: Option<String>,
}

impl RequestMeta {
    pub fn new(forwarded_for: Option<String>, remote_addr: Option<String>) -> Self {
        Self {
            forwarded_for,
            remote_addr,
        }
    }

    /// Resolve the client identity used as the rate limit key.
    ///
    /// The first hop of `X-Forwarded-For` wins over the peer address. An empty
    /// first hop yields `None` rather than falling through.
    pub fn client_id(&self) -> Option<String> {
        let candidate = match self.forwarded_for.as_deref() {
            Some(forwarded) if !forwarded.is_empty() => forwarded.split(',').next(),
            _ => self.remote_addr.as_deref(),
        };

        candidate
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
    }
}
