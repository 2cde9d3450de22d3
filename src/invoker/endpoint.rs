// src/invoker/endpoint.rs
use super::Invoker;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

#[derive(Debug)]
pub struct Endpoint {
    pub id: String,
    pub url: Url,
    available: AtomicBool,
}

impl Endpoint {
    pub fn new(url: Url) -> Self {
        let id = format!(
            "{}:{}",
            url.host_str().unwrap_or("unknown"),
            url.port_or_known_default().unwrap_or(80)
        );

        Self {
            id,
            url,
            available: AtomicBool::new(true),
        }
    }

    pub fn with_availability(self, available: bool) -> Self {
        self.set_available(available);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }
}

impl Invoker for Endpoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_uses_scheme_default_port() {
        let endpoint = Endpoint::new(Url::parse("https://api.internal/v1").unwrap());
        assert_eq!(endpoint.id(), "api.internal:443");

        let endpoint = Endpoint::new(Url::parse("http://10.0.0.7:9000").unwrap());
        assert_eq!(endpoint.id(), "10.0.0.7:9000");
    }

    #[test]
    fn test_availability_toggle() {
        let endpoint = Endpoint::new(Url::parse("http://a:1").unwrap()).with_availability(false);
        assert!(!endpoint.is_available());

        endpoint.set_available(true);
        assert!(endpoint.is_available());
    }
}
