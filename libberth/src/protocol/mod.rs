//! Transport protocol catalogue.
//!
//! Port protocols are never free text: declared codes are resolved against
//! a catalogue supplied by the host, fetched once per session.

use crate::error::Result;
use crate::model::Protocol;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;


/// Read-only list of supported protocols.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolCatalogue {
    entries: Vec<Protocol>,
}

impl ProtocolCatalogue {
    pub fn new(entries: Vec<Protocol>) -> Self {
        Self { entries }
    }

    /// TCP, UDP and SCTP.
    pub fn builtin() -> Self {
        Self::new(
            ["TCP", "UDP", "SCTP"]
                .iter()
                .map(|code| Protocol {
                    id: code.to_ascii_lowercase(),
                    code: code.to_string(),
                })
                .collect(),
        )
    }

    /// Finds the entry whose code matches `code`, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use libberth::protocol::ProtocolCatalogue;
    ///
    /// let catalogue = ProtocolCatalogue::builtin();
    /// assert_eq!(catalogue.resolve("tcp").unwrap().code, "TCP");
    /// assert!(catalogue.resolve("quic").is_none());
    /// ```
    pub fn resolve(&self, code: &str) -> Option<&Protocol> {
        let code = code.trim();
        self.entries
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn entries(&self) -> &[Protocol] {
        &self.entries
    }
}

/// Where the catalogue comes from.
#[async_trait]
pub trait ProtocolSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Protocol>>;
}

/// Source serving [`ProtocolCatalogue::builtin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinProtocols;

#[async_trait]
impl ProtocolSource for BuiltinProtocols {
    async fn fetch(&self) -> Result<Vec<Protocol>> {
        Ok(ProtocolCatalogue::builtin().entries)
    }
}

/// Fetches the catalogue on first use and keeps it for the session.
///
/// A failed fetch is not cached; the next call tries again.
pub struct CachedProtocols {
    source: Arc<dyn ProtocolSource>,
    catalogue: OnceCell<Arc<ProtocolCatalogue>>,
}

impl CachedProtocols {
    pub fn new(source: Arc<dyn ProtocolSource>) -> Self {
        Self {
            source,
            catalogue: OnceCell::new(),
        }
    }

    pub async fn catalogue(&self) -> Result<Arc<ProtocolCatalogue>> {
        self.catalogue
            .get_or_try_init(|| async {
                let entries = self.source.fetch().await?;
                debug!(count = entries.len(), "protocol catalogue loaded");
                Ok(Arc::new(ProtocolCatalogue::new(entries)))
            })
            .await
            .cloned()
    }
}
