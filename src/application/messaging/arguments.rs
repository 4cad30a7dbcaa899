//! Argument resolver - turns text tokens into typed values against a schema

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::dates::parse_date;
use crate::application::errors::{CommandArgumentError, ResolveError};
use crate::domain::entities::{ArgumentDefault, ArgumentType, ArgumentValue, CommandArgument, Message, User};
use crate::domain::traits::EntityLookup;

/// Outcome of one schema step
struct Step {
    value: ArgumentValue,
    consumed: bool,
}

impl Step {
    fn consumed(value: ArgumentValue) -> Self {
        Self { value, consumed: true }
    }

    fn kept(value: ArgumentValue) -> Self {
        Self { value, consumed: false }
    }
}

/// Resolves one message's tokens; one schema entry per step, in order
pub struct ArgumentResolver<'a> {
    lookup: &'a dyn EntityLookup,
    message: &'a Message,
    now: DateTime<Utc>,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(lookup: &'a dyn EntityLookup, message: &'a Message) -> Self {
        Self {
            lookup,
            message,
            now: Utc::now(),
        }
    }

    /// Reference instant for relative dates
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn resolve(
        &self,
        schema: &[CommandArgument],
        tokens: &[String],
    ) -> Result<Vec<ArgumentValue>, ResolveError> {
        let reply_fallback =
            self.message.reference.is_some() && schema.iter().filter(|a| a.kind.is_user_like()).count() == 1;
        let mut tokens: VecDeque<&str> = tokens.iter().map(String::as_str).collect();
        let mut values = Vec::with_capacity(schema.len());

        for arg in schema {
            if arg.is_rest() {
                let joined = tokens.drain(..).collect::<Vec<_>>().join(" ");
                values.push(self.rest(arg, &joined, reply_fallback).await?);
                continue;
            }

            let step = self.step(arg, tokens.front().copied(), reply_fallback).await?;
            if step.consumed {
                tokens.pop_front();
            }
            values.push(step.value);
        }

        Ok(values)
    }

    async fn rest(&self, arg: &CommandArgument, joined: &str, reply_fallback: bool) -> Result<ArgumentValue, ResolveError> {
        if joined.is_empty() {
            return self.fallback(arg, None).map(|step| step.value);
        }
        match arg.kind {
            ArgumentType::String | ArgumentType::Text => {
                self.string(arg, joined).map(|step| step.value)
            }
            _ => self.step(arg, Some(joined), reply_fallback).await.map(|step| step.value),
        }
    }

    async fn step(&self, arg: &CommandArgument, token: Option<&str>, reply_fallback: bool) -> Result<Step, ResolveError> {
        if arg.kind.requires_guild() && !self.message.in_guild() {
            return Err(ResolveError::ScopeRequired {
                argument: arg.name.clone(),
                kind: arg.kind,
            });
        }

        let Some(token) = token else {
            if arg.kind.is_user_like() && reply_fallback {
                if let Some(value) = self.replied_author(arg.kind).await {
                    return Ok(Step::kept(value));
                }
            }
            return self.fallback(arg, None);
        };

        match arg.kind {
            ArgumentType::String | ArgumentType::Text => self.string(arg, token),
            ArgumentType::Number => match token.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Step::consumed(ArgumentValue::Number(n))),
                _ => self.fallback(arg, Some(token)),
            },
            ArgumentType::Boolean => match parse_bool(token) {
                Some(b) => Ok(Step::consumed(ArgumentValue::Boolean(b))),
                None => self.fallback(arg, Some(token)),
            },
            ArgumentType::Date => match parse_date(token, self.now) {
                Some(date) => Ok(Step::consumed(ArgumentValue::Date(date))),
                None => self.fallback(arg, Some(token)),
            },
            ArgumentType::User | ArgumentType::Member => match mention_id(token, &["<@!", "<@"]) {
                Some(id) => match self.user_like(arg.kind, id).await {
                    Some(value) => Ok(Step::consumed(value)),
                    None => self.fallback(arg, Some(token)),
                },
                None => {
                    if reply_fallback {
                        if let Some(value) = self.replied_author(arg.kind).await {
                            return Ok(Step::kept(value));
                        }
                    }
                    self.fallback(arg, Some(token))
                }
            },
            ArgumentType::Channel => {
                let channel = match mention_id(token, &["<#"]) {
                    Some(id) => self.lookup.channel(id).await,
                    None => None,
                };
                match channel {
                    Some(channel) if channel.guild_id.as_deref() == self.message.guild_id() => {
                        Ok(Step::consumed(ArgumentValue::Channel(channel)))
                    }
                    _ => self.fallback(arg, Some(token)),
                }
            }
            ArgumentType::Role => {
                let role = match (mention_id(token, &["<@&"]), self.message.guild_id()) {
                    (Some(id), Some(guild_id)) => self.lookup.role(guild_id, id).await,
                    _ => None,
                };
                match role {
                    Some(role) => Ok(Step::consumed(ArgumentValue::Role(role))),
                    None => self.fallback(arg, Some(token)),
                }
            }
        }
    }

    fn string(&self, arg: &CommandArgument, token: &str) -> Result<Step, ResolveError> {
        if !arg.choices.is_empty() && !arg.choices.iter().any(|c| c == token) {
            return Err(CommandArgumentError::invalid_choice(&arg.name, arg.expected(), token).into());
        }
        Ok(Step::consumed(ArgumentValue::String(token.to_string())))
    }

    async fn user_like(&self, kind: ArgumentType, id: &str) -> Option<ArgumentValue> {
        match kind {
            ArgumentType::Member => {
                let guild_id = self.message.guild_id()?;
                self.lookup.member(guild_id, id).await.map(ArgumentValue::Member)
            }
            _ => self.lookup.user(id).await.map(ArgumentValue::User),
        }
    }

    /// Author of the message being replied to
    async fn replied_author(&self, kind: ArgumentType) -> Option<ArgumentValue> {
        let reference = self.message.reference.as_deref()?;
        let replied = self.lookup.message(&self.message.channel.id, reference).await?;
        match kind {
            ArgumentType::Member => match replied.member {
                Some(member) => Some(ArgumentValue::Member(member)),
                None => self.user_like(kind, &replied.author.id).await,
            },
            _ => Some(ArgumentValue::User(replied.author)),
        }
    }

    /// Default, then `None` for optional arguments, then an error
    fn fallback(&self, arg: &CommandArgument, received: Option<&str>) -> Result<Step, ResolveError> {
        if let Some(value) = arg.default.as_ref().and_then(|d| self.default_value(arg.kind, d)) {
            return Ok(Step::kept(value));
        }
        if !arg.required {
            return Ok(Step::kept(ArgumentValue::None));
        }

        let err = match received {
            None => CommandArgumentError::missing(&arg.name, arg.expected()),
            Some(token) => CommandArgumentError::mismatch(&arg.name, arg.expected(), token),
        };
        Err(err.into())
    }

    fn default_value(&self, kind: ArgumentType, default: &ArgumentDefault) -> Option<ArgumentValue> {
        match default {
            ArgumentDefault::Invoker => match kind {
                ArgumentType::Member => self.message.member.clone().map(ArgumentValue::Member),
                _ => Some(ArgumentValue::User(self.invoker().clone())),
            },
            ArgumentDefault::CurrentChannel => Some(ArgumentValue::Channel(self.message.channel.clone())),
            other => other.value(),
        }
    }

    fn invoker(&self) -> &User {
        &self.message.author
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Raw snowflake id from a mention or a bare id
fn mention_id<'t>(token: &'t str, decorations: &[&str]) -> Option<&'t str> {
    let inner = decorations
        .iter()
        .find_map(|open| token.strip_prefix(open).and_then(|rest| rest.strip_suffix('>')))
        .unwrap_or(token);
    (!inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit())).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ArgumentErrorKind;
    use crate::domain::entities::{Channel, Guild, Member, Role};
    use crate::infrastructure::adapters::console::ConsoleAdapter;
    use chrono::{Duration, TimeZone};

    fn tokens(input: &str) -> Vec<String> {
        input.split_whitespace().map(str::to_string).collect()
    }

    fn lookup() -> ConsoleAdapter {
        let adapter = ConsoleAdapter::new();
        adapter.add_member(Member::new("g1", User::new("42").with_username("target")));
        adapter.add_member(Member::new("g1", User::new("7").with_username("author")));
        adapter.add_channel(Channel::text("c1", "g1").with_name("general"));
        adapter.add_channel(Channel::text("c9", "g2").with_name("elsewhere"));
        adapter.add_role(Role::new("5", "g1", "mods"));
        adapter
    }

    fn guild_message(content: &str) -> Message {
        Message::new(Channel::text("c1", "g1"), User::new("7"), content)
            .with_guild(Guild::new("g1", "Guild"))
            .with_member(Member::new("g1", User::new("7")))
    }

    fn dm_message(content: &str) -> Message {
        Message::new(Channel::direct("d1"), User::new("7"), content)
    }

    fn argument_error(err: ResolveError) -> CommandArgumentError {
        match err {
            ResolveError::Argument(e) => e,
            other => panic!("expected an argument error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_member_then_rest() {
        let lookup = lookup();
        let message = guild_message("!ban <@42> reason text");
        let schema = [CommandArgument::member("target"), CommandArgument::string("reason").rest()];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("<@42> reason text"))
            .await
            .unwrap();

        assert_eq!(values[0].as_member().map(|m| m.id()), Some("42"));
        assert_eq!(values[1].as_str(), Some("reason text"));
    }

    #[tokio::test]
    async fn test_missing_required_member() {
        let lookup = lookup();
        let message = guild_message("!ban");
        let schema = [CommandArgument::member("target"), CommandArgument::string("reason").rest()];

        let err = ArgumentResolver::new(&lookup, &message).resolve(&schema, &[]).await.unwrap_err();
        let err = argument_error(err);
        assert_eq!(err.name, "target");
        assert_eq!(err.kind, ArgumentErrorKind::Missing);
        assert_eq!(err.received, None);
    }

    #[tokio::test]
    async fn test_empty_rest_is_missing_unless_optional() {
        let lookup = lookup();
        let message = guild_message("!say");

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&[CommandArgument::text("body")], &[])
            .await
            .unwrap_err();
        assert_eq!(argument_error(err).kind, ArgumentErrorKind::Missing);

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&[CommandArgument::text("body").optional()], &[])
            .await
            .unwrap();
        assert!(values[0].is_none());

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(
                &[CommandArgument::text("body").with_default(ArgumentDefault::String("hi".into()))],
                &[],
            )
            .await
            .unwrap();
        assert_eq!(values[0].as_str(), Some("hi"));
    }

    #[tokio::test]
    async fn test_number_and_boolean() {
        let lookup = lookup();
        let message = guild_message("");
        let schema = [CommandArgument::number("count"), CommandArgument::boolean("loud")];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("3.5 YES"))
            .await
            .unwrap();
        assert_eq!(values[0].as_number(), Some(3.5));
        assert_eq!(values[1].as_bool(), Some(true));

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("three yes"))
            .await
            .unwrap_err();
        let err = argument_error(err);
        assert_eq!(err.kind, ArgumentErrorKind::TypeMismatch);
        assert_eq!(err.received.as_deref(), Some("three"));

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("3 maybe"))
            .await
            .unwrap_err();
        assert_eq!(argument_error(err).name, "loud");
    }

    #[tokio::test]
    async fn test_substituted_default_does_not_consume_the_token() {
        let lookup = lookup();
        let message = guild_message("");
        let schema = [
            CommandArgument::number("count").with_default(ArgumentDefault::Number(1.0)),
            CommandArgument::string("word"),
        ];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("hello"))
            .await
            .unwrap();
        assert_eq!(values[0].as_number(), Some(1.0));
        assert_eq!(values[1].as_str(), Some("hello"));
    }

    #[tokio::test]
    async fn test_choices() {
        let lookup = lookup();
        let message = guild_message("");
        let schema = [CommandArgument::string("mode").with_choices(["fast", "slow"])];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("slow"))
            .await
            .unwrap();
        assert_eq!(values[0].as_str(), Some("slow"));

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("medium"))
            .await
            .unwrap_err();
        let err = argument_error(err);
        assert_eq!(err.kind, ArgumentErrorKind::InvalidChoice);
        assert_eq!(err.expected, "fast|slow");
    }

    #[tokio::test]
    async fn test_member_outside_guild_is_scope_error() {
        let lookup = lookup();
        let message = dm_message("!ban 42");

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&[CommandArgument::member("target")], &tokens("42"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::ScopeRequired { kind: ArgumentType::Member, .. }));

        // plain users resolve anywhere
        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&[CommandArgument::user("target")], &tokens("<@!42>"))
            .await
            .unwrap();
        assert_eq!(values[0].as_user().map(|u| u.id.as_str()), Some("42"));
    }

    #[tokio::test]
    async fn test_invoker_default() {
        let lookup = lookup();
        let message = guild_message("!avatar");
        let schema = [CommandArgument::user("who").with_default(ArgumentDefault::Invoker)];

        let values = ArgumentResolver::new(&lookup, &message).resolve(&schema, &[]).await.unwrap();
        assert_eq!(values[0].as_user().map(|u| u.id.as_str()), Some("7"));

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("999"))
            .await
            .unwrap();
        assert_eq!(values[0].as_user().map(|u| u.id.as_str()), Some("7"));
    }

    #[tokio::test]
    async fn test_reply_fallback_uses_replied_author() {
        let lookup = lookup();
        let original = Message::new(Channel::text("c1", "g1"), User::new("42"), "spam")
            .with_id("m1")
            .with_guild(Guild::new("g1", "Guild"));
        lookup.add_message(original);

        let message = guild_message("!warn being rude").replying_to("m1");
        let schema = [CommandArgument::member("target"), CommandArgument::text("reason")];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("being rude"))
            .await
            .unwrap();
        assert_eq!(values[0].as_member().map(|m| m.id()), Some("42"));
        // the token was left for the reason
        assert_eq!(values[1].as_str(), Some("being rude"));
    }

    #[tokio::test]
    async fn test_reply_fallback_skipped_when_ambiguous() {
        let lookup = lookup();
        let original = Message::new(Channel::text("c1", "g1"), User::new("42"), "hi").with_id("m1");
        lookup.add_message(original);

        let message = guild_message("!swap").replying_to("m1");
        let schema = [CommandArgument::user("a"), CommandArgument::user("b")];

        let err = ArgumentResolver::new(&lookup, &message).resolve(&schema, &[]).await.unwrap_err();
        assert_eq!(argument_error(err).name, "a");
    }

    #[tokio::test]
    async fn test_channel_and_role() {
        let lookup = lookup();
        let message = guild_message("");
        let schema = [
            CommandArgument::channel("where").with_default(ArgumentDefault::CurrentChannel),
            CommandArgument::role("role"),
        ];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("<#c1> <@&5>"))
            .await;
        // channel ids are numeric snowflakes, "c1" is not one
        assert!(values.is_err());

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("<@&5>"))
            .await
            .unwrap();
        assert_eq!(values[0].as_channel().map(|c| c.id.as_str()), Some("c1"));
        assert_eq!(values[1].as_role().map(|r| r.name.as_str()), Some("mods"));
    }

    #[tokio::test]
    async fn test_channel_from_other_guild_is_unresolved() {
        let lookup = lookup();
        lookup.add_channel(Channel::text("100", "g1"));
        lookup.add_channel(Channel::text("200", "g2"));
        let message = guild_message("");
        let schema = [CommandArgument::channel("where")];

        let values = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("<#100>"))
            .await
            .unwrap();
        assert_eq!(values[0].as_channel().map(|c| c.id.as_str()), Some("100"));

        let err = ArgumentResolver::new(&lookup, &message)
            .resolve(&schema, &tokens("<#200>"))
            .await
            .unwrap_err();
        assert_eq!(argument_error(err).kind, ArgumentErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn test_relative_date_wins_over_clock() {
        let lookup = lookup();
        let message = guild_message("");
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let values = ArgumentResolver::new(&lookup, &message)
            .at(now)
            .resolve(&[CommandArgument::date("when")], &tokens("10"))
            .await
            .unwrap();
        assert_eq!(values[0].as_date(), Some(now + Duration::minutes(10)));
    }

    #[test]
    fn test_mention_id() {
        assert_eq!(mention_id("<@!42>", &["<@!", "<@"]), Some("42"));
        assert_eq!(mention_id("<@42>", &["<@!", "<@"]), Some("42"));
        assert_eq!(mention_id("42", &["<@!", "<@"]), Some("42"));
        assert_eq!(mention_id("<@&42>", &["<@!", "<@"]), None);
        assert_eq!(mention_id("@user", &["<@!", "<@"]), None);
    }
}
