use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering}
};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one resource load, handed out by the proxy engine.
/// This is the only key requests and responses are correlated by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ResourceId(u64);

impl ResourceId {
    #[cfg(test)]
    pub(crate) fn new(raw: u64) -> Self {
        ResourceId(raw)
    }

    /// Fresh process-wide identity, never reused.
    pub(crate) fn next() -> Self {
        ResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Header name/value pairs in the order they were received. Repeated names stay repeated.
pub(crate) type HeaderList = Vec<(String, String)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResponseMeta {
    pub(crate) status_code: u16,
    pub(crate) content_type: String,
    pub(crate) headers: HeaderList,
}

/// One captured request, possibly paired with its response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingExchange {
    id: ResourceId,
    method: String,
    uri: String,
    request_headers: HeaderList,
    response: Option<ResponseMeta>,
}

impl PendingExchange {
    pub(crate) fn new(id: ResourceId, method: String, uri: String, request_headers: HeaderList) -> Self {
        PendingExchange {
            id,
            method,
            uri,
            request_headers,
            response: None
        }
    }

    pub(crate) fn id(&self) -> ResourceId {
        self.id
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn uri(&self) -> &str {
        &self.uri
    }

    pub(crate) fn request_headers(&self) -> &[(String, String)] {
        &self.request_headers
    }

    pub(crate) fn response(&self) -> Option<&ResponseMeta> {
        self.response.as_ref()
    }

    /// A later response for the same resource replaces an earlier one.
    pub(crate) fn attach_response(&mut self, response: ResponseMeta) {
        self.response = Some(response);
    }
}
