use super::{Channel, Member, Role, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a text command argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentType {
    String,
    Number,
    Boolean,
    User,
    Member,
    Channel,
    Role,
    Date,
    /// Free text, always greedy
    Text,
}

impl ArgumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentType::String => "string",
            ArgumentType::Number => "number",
            ArgumentType::Boolean => "boolean",
            ArgumentType::User => "user",
            ArgumentType::Member => "member",
            ArgumentType::Channel => "channel",
            ArgumentType::Role => "role",
            ArgumentType::Date => "date",
            ArgumentType::Text => "text",
        }
    }

    pub fn is_user_like(&self) -> bool {
        matches!(self, ArgumentType::User | ArgumentType::Member)
    }

    /// Types that can only be resolved inside a guild
    pub fn requires_guild(&self) -> bool {
        matches!(self, ArgumentType::Member | ArgumentType::Channel | ArgumentType::Role)
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default substituted when an argument cannot be read from the input
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentDefault {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    /// The invoking user or member
    Invoker,
    /// The channel the command was sent in
    CurrentChannel,
}

impl ArgumentDefault {
    /// Whether this default may be declared on an argument of `kind`
    pub fn fits(&self, kind: ArgumentType) -> bool {
        match self {
            ArgumentDefault::String(_) => matches!(kind, ArgumentType::String | ArgumentType::Text),
            ArgumentDefault::Number(_) => kind == ArgumentType::Number,
            ArgumentDefault::Boolean(_) => kind == ArgumentType::Boolean,
            ArgumentDefault::Date(_) => kind == ArgumentType::Date,
            ArgumentDefault::Invoker => kind.is_user_like(),
            ArgumentDefault::CurrentChannel => kind == ArgumentType::Channel,
        }
    }

    /// Plain value of the default, for defaults that do not depend on the invocation
    pub fn value(&self) -> Option<ArgumentValue> {
        match self {
            ArgumentDefault::String(s) => Some(ArgumentValue::String(s.clone())),
            ArgumentDefault::Number(n) => Some(ArgumentValue::Number(*n)),
            ArgumentDefault::Boolean(b) => Some(ArgumentValue::Boolean(*b)),
            ArgumentDefault::Date(d) => Some(ArgumentValue::Date(*d)),
            ArgumentDefault::Invoker | ArgumentDefault::CurrentChannel => None,
        }
    }
}

/// One entry of a command's argument schema
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArgument {
    pub name: String,
    pub kind: ArgumentType,
    pub required: bool,
    pub default: Option<ArgumentDefault>,
    pub rest: bool,
    pub choices: Vec<String>,
}

impl CommandArgument {
    pub fn new(name: impl Into<String>, kind: ArgumentType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            rest: false,
            choices: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Boolean)
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::User)
    }

    pub fn member(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Member)
    }

    pub fn channel(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Channel)
    }

    pub fn role(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Role)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Date)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Text)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: ArgumentDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Greedy arguments swallow every remaining token
    pub fn is_rest(&self) -> bool {
        self.rest || self.kind == ArgumentType::Text
    }

    /// Human readable expected type, used in error messages
    pub fn expected(&self) -> String {
        if self.choices.is_empty() {
            self.kind.as_str().to_string()
        } else {
            self.choices.join("|")
        }
    }
}

/// A resolved argument value handed to a text handler
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    String(String),
    Number(f64),
    Boolean(bool),
    User(User),
    Member(Member),
    Channel(Channel),
    Role(Role),
    Date(DateTime<Utc>),
    /// Optional argument that was not supplied
    None,
}

impl ArgumentValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgumentValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            ArgumentValue::User(u) => Some(u),
            ArgumentValue::Member(m) => Some(&m.user),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            ArgumentValue::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            ArgumentValue::Channel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            ArgumentValue::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            ArgumentValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ArgumentValue::None)
    }
}
