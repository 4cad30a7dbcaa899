//! Message parser - Splits prefixed text into a command name and tokens

/// A prefixed command line, before any lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub prefix: String,
    pub name: String,
    pub args: Vec<String>,
}

/// Matches configured prefixes against message content
#[derive(Debug, Clone)]
pub struct MessageParser {
    prefixes: Vec<String>,
}

impl MessageParser {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).filter(|p: &String| !p.is_empty()).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Longest configured prefix the content starts with; ties keep the earlier one
    pub fn match_prefix<'a>(&'a self, content: &str) -> Option<&'a str> {
        let mut best: Option<&str> = None;
        for prefix in &self.prefixes {
            if content.starts_with(prefix.as_str()) && best.map_or(true, |b| prefix.len() > b.len()) {
                best = Some(prefix);
            }
        }
        best
    }

    /// Parse a text message. `None` when no prefix matches or nothing follows it.
    pub fn parse(&self, content: &str) -> Option<ParsedCommand> {
        let prefix = self.match_prefix(content)?;
        let mut tokens = content[prefix.len()..].split_whitespace();
        let name = tokens.next()?.to_string();

        Some(ParsedCommand {
            prefix: prefix.to_string(),
            name,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        let parser = MessageParser::new(["!"]);
        let parsed = parser.parse("!ban  <@42>   reason\ttext").unwrap();
        assert_eq!(parsed.prefix, "!");
        assert_eq!(parsed.name, "ban");
        assert_eq!(parsed.args, vec!["<@42>", "reason", "text"]);
    }

    #[test]
    fn test_not_a_command() {
        let parser = MessageParser::new(["!"]);
        assert!(parser.parse("hello").is_none());
        assert!(parser.parse("!").is_none());
        assert!(parser.parse("!   ").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let parser = MessageParser::new(["!", "!!", "bot "]);
        assert_eq!(parser.match_prefix("!!ping"), Some("!!"));
        assert_eq!(parser.match_prefix("!ping"), Some("!"));
        assert_eq!(parser.parse("bot ping now").unwrap().name, "ping");
        assert_eq!(parser.parse("!!ping").unwrap().name, "ping");
    }

    #[test]
    fn test_space_after_prefix_is_allowed() {
        let parser = MessageParser::new(["?"]);
        let parsed = parser.parse("? help ban").unwrap();
        assert_eq!(parsed.name, "help");
        assert_eq!(parsed.args, vec!["ban"]);
    }
}
