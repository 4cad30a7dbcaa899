//! Cached-then-fetch entity lookup

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{Channel, Member, Message, Role, User};
use crate::domain::traits::EntityLookup;

/// Default number of messages kept before the oldest are evicted
pub const DEFAULT_MESSAGE_LIMIT: usize = 1_000;

/// Messages keyed by (channel, id), oldest evicted first once full
struct MessageCache {
    entries: HashMap<(String, String), Message>,
    order: VecDeque<(String, String)>,
    limit: usize,
}

impl MessageCache {
    fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            limit,
        }
    }

    fn get(&self, key: &(String, String)) -> Option<Message> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: (String, String), message: Message) {
        if self.limit == 0 {
            return;
        }
        if self.entries.insert(key.clone(), message).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.limit {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn remove(&mut self, key: &(String, String)) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Wraps a lookup with an in-memory cache. Only found entities are cached.
pub struct CachedLookup<L> {
    inner: L,
    users: RwLock<HashMap<String, User>>,
    members: RwLock<HashMap<(String, String), Member>>,
    channels: RwLock<HashMap<String, Channel>>,
    roles: RwLock<HashMap<(String, String), Role>>,
    messages: RwLock<MessageCache>,
}

impl<L: EntityLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self::with_message_limit(inner, DEFAULT_MESSAGE_LIMIT)
    }

    /// Like `new`, keeping at most `limit` messages; 0 disables message caching
    pub fn with_message_limit(inner: L, limit: usize) -> Self {
        Self {
            inner,
            users: RwLock::new(HashMap::new()),
            members: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashMap::new()),
            messages: RwLock::new(MessageCache::new(limit)),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Seed or refresh a cached user, e.g. from a gateway update
    pub async fn put_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn invalidate_user(&self, id: &str) {
        self.users.write().await.remove(id);
    }

    pub async fn invalidate_member(&self, guild_id: &str, user_id: &str) {
        self.members
            .write()
            .await
            .remove(&(guild_id.to_string(), user_id.to_string()));
    }

    pub async fn invalidate_channel(&self, id: &str) {
        self.channels.write().await.remove(id);
    }

    pub async fn invalidate_role(&self, guild_id: &str, id: &str) {
        self.roles.write().await.remove(&(guild_id.to_string(), id.to_string()));
    }

    /// Drop a message, e.g. after an edit or delete event
    pub async fn invalidate_message(&self, channel_id: &str, id: &str) {
        self.messages
            .write()
            .await
            .remove(&(channel_id.to_string(), id.to_string()));
    }

    pub async fn cached_messages(&self) -> usize {
        self.messages.read().await.entries.len()
    }

    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.members.write().await.clear();
        self.channels.write().await.clear();
        self.roles.write().await.clear();
        self.messages.write().await.clear();
    }
}

async fn cached<K, V>(cache: &RwLock<HashMap<K, V>>, key: &K) -> Option<V>
where
    K: Eq + Hash,
    V: Clone,
{
    cache.read().await.get(key).cloned()
}

async fn remember<K, V>(cache: &RwLock<HashMap<K, V>>, key: K, fetched: Option<V>) -> Option<V>
where
    K: Eq + Hash,
    V: Clone,
{
    if let Some(value) = &fetched {
        cache.write().await.insert(key, value.clone());
    }
    fetched
}

#[async_trait]
impl<L: EntityLookup> EntityLookup for CachedLookup<L> {
    async fn user(&self, id: &str) -> Option<User> {
        let key = id.to_string();
        if let Some(user) = cached(&self.users, &key).await {
            return Some(user);
        }
        debug!(user = id, "User cache miss");
        remember(&self.users, key, self.inner.user(id).await).await
    }

    async fn member(&self, guild_id: &str, user_id: &str) -> Option<Member> {
        let key = (guild_id.to_string(), user_id.to_string());
        if let Some(member) = cached(&self.members, &key).await {
            return Some(member);
        }
        remember(&self.members, key, self.inner.member(guild_id, user_id).await).await
    }

    async fn channel(&self, id: &str) -> Option<Channel> {
        let key = id.to_string();
        if let Some(channel) = cached(&self.channels, &key).await {
            return Some(channel);
        }
        remember(&self.channels, key, self.inner.channel(id).await).await
    }

    async fn role(&self, guild_id: &str, id: &str) -> Option<Role> {
        let key = (guild_id.to_string(), id.to_string());
        if let Some(role) = cached(&self.roles, &key).await {
            return Some(role);
        }
        remember(&self.roles, key, self.inner.role(guild_id, id).await).await
    }

    async fn message(&self, channel_id: &str, id: &str) -> Option<Message> {
        let key = (channel_id.to_string(), id.to_string());
        if let Some(message) = self.messages.read().await.get(&key) {
            return Some(message);
        }
        let fetched = self.inner.message(channel_id, id).await;
        if let Some(message) = &fetched {
            self.messages.write().await.insert(key, message.clone());
        }
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EntityLookup for CountingLookup {
        async fn user(&self, id: &str) -> Option<User> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (id == "42").then(|| User::new("42"))
        }

        async fn member(&self, _guild_id: &str, _user_id: &str) -> Option<Member> {
            None
        }

        async fn channel(&self, _id: &str) -> Option<Channel> {
            None
        }

        async fn role(&self, _guild_id: &str, _id: &str) -> Option<Role> {
            None
        }

        async fn message(&self, channel_id: &str, id: &str) -> Option<Message> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(Message::new(Channel::text(channel_id, "g1"), User::new("42"), "hi").with_id(id))
        }
    }

    #[tokio::test]
    async fn test_hit_skips_inner_lookup() {
        let lookup = CachedLookup::new(CountingLookup::default());
        assert!(lookup.user("42").await.is_some());
        assert!(lookup.user("42").await.is_some());
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let lookup = CachedLookup::new(CountingLookup::default());
        assert!(lookup.user("7").await.is_none());
        assert!(lookup.user("7").await.is_none());
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_seeded_user_is_served_from_cache() {
        let lookup = CachedLookup::new(CountingLookup::default());
        lookup.put_user(User::new("9").with_username("seeded")).await;
        assert_eq!(lookup.user("9").await.and_then(|u| u.username), Some("seeded".to_string()));
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 0);

        lookup.invalidate_user("9").await;
        assert!(lookup.user("9").await.is_none());
    }

    #[tokio::test]
    async fn test_message_cache_evicts_oldest() {
        let lookup = CachedLookup::with_message_limit(CountingLookup::default(), 2);
        lookup.message("c1", "m1").await;
        lookup.message("c1", "m2").await;
        lookup.message("c1", "m3").await;
        assert_eq!(lookup.cached_messages().await, 2);

        // m3 and m2 are served from cache, m1 was evicted
        lookup.message("c1", "m3").await;
        lookup.message("c1", "m2").await;
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 3);
        lookup.message("c1", "m1").await;
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_invalidated_message_is_fetched_again() {
        let lookup = CachedLookup::new(CountingLookup::default());
        assert!(lookup.message("c1", "m1").await.is_some());
        lookup.invalidate_message("c1", "m1").await;
        assert_eq!(lookup.cached_messages().await, 0);
        assert!(lookup.message("c1", "m1").await.is_some());
        assert_eq!(lookup.inner().calls.load(Ordering::SeqCst), 2);
    }
}
