//! External collaborator lookups
//!
//! Users and listings are owned by other services; the messaging core only
//! reads the handful of fields the sidebar needs. The traits are the seam,
//! the in-memory implementations are fed by the directory sync endpoints.

use async_trait::async_trait;
use bazaar_core::Result;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{ListingSummary, UserProfile};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Public profile for a user; `None` for unknown/deleted accounts.
    async fn profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait ListingCatalog: Send + Sync {
    /// Preview fields for a listing; `None` for unknown/removed listings.
    async fn summary(&self, listing_id: &Uuid) -> Result<Option<ListingSummary>>;
}

pub struct InMemoryUserDirectory {
    profiles: DashMap<Uuid, UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    pub fn upsert(&self, profile: UserProfile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn remove(&self, user_id: &Uuid) {
        self.profiles.remove(user_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryListingCatalog {
    listings: DashMap<Uuid, ListingSummary>,
}

impl InMemoryListingCatalog {
    pub fn new() -> Self {
        Self {
            listings: DashMap::new(),
        }
    }

    pub fn upsert(&self, listing: ListingSummary) {
        self.listings.insert(listing.id, listing);
    }

    pub fn remove(&self, listing_id: &Uuid) {
        self.listings.remove(listing_id);
    }
}

#[async_trait]
impl ListingCatalog for InMemoryListingCatalog {
    async fn summary(&self, listing_id: &Uuid) -> Result<Option<ListingSummary>> {
        Ok(self.listings.get(listing_id).map(|l| l.clone()))
    }
}

impl Default for InMemoryListingCatalog {
    fn default() -> Self {
        Self::new()
    }
}
