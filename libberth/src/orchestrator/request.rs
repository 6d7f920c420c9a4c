//! Registry requests issued by an orchestrator.
//!
//! Requests are plain data: they capture the selection token and the
//! credentials at issue time and can be fetched without borrowing the
//! orchestrator, so a host may run them on any task.

use crate::model::{ImageDescriptor, RegistryCredentials};
use crate::resolver::{RegistryResolver, Resolved, TagSummary, descriptor_or_empty, tags_or_fallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one selection. Responses carrying an older token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionToken(u64);

/// Issues tokens that are unique across every container of a form.
#[derive(Debug, Clone, Default)]
pub struct TokenSource(Arc<AtomicU64>);

impl TokenSource {
    pub fn next(&self) -> SelectionToken {
        SelectionToken(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Tag listing for a freshly selected image.
#[derive(Debug, Clone)]
pub struct TagRequest {
    pub token: SelectionToken,
    pub container_index: usize,
    pub namespace: Option<String>,
    pub image: String,
    /// Tag to fall back to when listing fails.
    pub current_tag: String,
    pub credentials: Option<RegistryCredentials>,
}

impl TagRequest {
    pub async fn fetch(self, resolver: &dyn RegistryResolver) -> TagResponse {
        let tags = tags_or_fallback(
            resolver,
            self.namespace.as_deref(),
            &self.image,
            Some(&self.current_tag),
            self.credentials.as_ref(),
        )
        .await;
        TagResponse {
            request: self,
            tags,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagResponse {
    pub request: TagRequest,
    pub tags: Resolved<Vec<TagSummary>>,
}

/// Descriptor fetch for a settled image:tag.
#[derive(Debug, Clone)]
pub struct DescriptorRequest {
    pub token: SelectionToken,
    pub container_index: usize,
    pub namespace: Option<String>,
    pub image: String,
    pub tag: String,
    /// Key the default-population guard is tracked under.
    pub selection_key: String,
    pub credentials: Option<RegistryCredentials>,
}

impl DescriptorRequest {
    pub async fn fetch(self, resolver: &dyn RegistryResolver) -> DescriptorResponse {
        let descriptor = descriptor_or_empty(
            resolver,
            self.namespace.as_deref(),
            &self.image,
            &self.tag,
            self.credentials.as_ref(),
        )
        .await;
        DescriptorResponse {
            request: self,
            descriptor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorResponse {
    pub request: DescriptorRequest,
    pub descriptor: Resolved<ImageDescriptor>,
}
