use async_trait::async_trait;
use crate::domain::entities::{Channel, Member, Message, Role, User};

/// Entity lookup by id. Not-found is `None`, never an error.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn user(&self, id: &str) -> Option<User>;

    async fn member(&self, guild_id: &str, user_id: &str) -> Option<Member>;

    async fn channel(&self, id: &str) -> Option<Channel>;

    async fn role(&self, guild_id: &str, id: &str) -> Option<Role>;

    async fn message(&self, channel_id: &str, id: &str) -> Option<Message>;
}

#[async_trait]
impl<T: EntityLookup + ?Sized> EntityLookup for std::sync::Arc<T> {
    async fn user(&self, id: &str) -> Option<User> {
        (**self).user(id).await
    }

    async fn member(&self, guild_id: &str, user_id: &str) -> Option<Member> {
        (**self).member(guild_id, user_id).await
    }

    async fn channel(&self, id: &str) -> Option<Channel> {
        (**self).channel(id).await
    }

    async fn role(&self, guild_id: &str, id: &str) -> Option<Role> {
        (**self).role(guild_id, id).await
    }

    async fn message(&self, channel_id: &str, id: &str) -> Option<Message> {
        (**self).message(channel_id, id).await
    }
}
