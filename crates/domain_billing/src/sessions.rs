//! Caller-keyed resolver sessions
//!
//! Holds one [`SharingConfigResolver`] per caller-supplied [`SessionKey`] so a
//! multi-step configuration can span separate requests. Inserting under an
//! existing key replaces the previous resolver. Removing a session abandons
//! it; nothing it configured has been committed.

use std::collections::HashMap;

use core_kernel::SessionKey;
use crate::sharing::SharingConfigResolver;

/// Resolver store keyed by session
#[derive(Debug, Default)]
pub struct SharingSessions {
    resolvers: HashMap<SessionKey, SharingConfigResolver>,
}

impl SharingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a resolver, returning the one it replaced
    pub fn insert(&mut self, key: SessionKey, resolver: SharingConfigResolver) -> Option<SharingConfigResolver> {
        tracing::debug!(session = %key, "Sharing session stored");
        self.resolvers.insert(key, resolver)
    }

    /// Stores a resolver under a fresh key
    pub fn open(&mut self, resolver: SharingConfigResolver) -> SessionKey {
        let key = SessionKey::new();
        self.insert(key, resolver);
        key
    }

    pub fn get(&self, key: &SessionKey) -> Option<&SharingConfigResolver> {
        self.resolvers.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut SharingConfigResolver> {
        self.resolvers.get_mut(key)
    }

    /// Abandons a session
    pub fn remove(&mut self, key: &SessionKey) -> Option<SharingConfigResolver> {
        let removed = self.resolvers.remove(key);
        if removed.is_some() {
            tracing::debug!(session = %key, "Sharing session abandoned");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
