//! Parser for the builder-chain form of legacy selectors, e.g.
//! `new UiSelector().className("android.widget.Button").instance(1)`.

use crate::selector::{LegacySelector, Pattern, SelectorError, MAX_SELECTOR_DEPTH};

enum Arg {
    Str(String),
    Int(usize),
    Bool(bool),
    Selector(LegacySelector),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::Int(_) => "integer",
            Arg::Bool(_) => "boolean",
            Arg::Selector(_) => "selector",
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError::Parse {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), SelectorError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn looking_at(&mut self, word: &str) -> bool {
        self.skip_ws();
        let end = self.pos + word.chars().count();
        end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(word.chars())
    }

    fn string(&mut self) -> Result<String, SelectorError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.error("dangling escape"))?;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn arg(&mut self) -> Result<Arg, SelectorError> {
        self.skip_ws();
        match self.peek() {
            Some('"') => self.string().map(Arg::Str),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                digits
                    .parse()
                    .map(Arg::Int)
                    .map_err(|_| self.error("integer out of range"))
            }
            _ if self.looking_at("new") => self.nested().map(Arg::Selector),
            _ => match self.ident()?.as_str() {
                "true" => Ok(Arg::Bool(true)),
                "false" => Ok(Arg::Bool(false)),
                other => Err(self.error(format!("unexpected token '{other}'"))),
            },
        }
    }

    fn nested(&mut self) -> Result<LegacySelector, SelectorError> {
        if self.depth >= MAX_SELECTOR_DEPTH {
            return Err(SelectorError::TooDeep {
                limit: MAX_SELECTOR_DEPTH,
            });
        }
        self.depth += 1;
        let selector = self.selector();
        self.depth -= 1;
        selector
    }

    fn selector(&mut self) -> Result<LegacySelector, SelectorError> {
        let mut selector = LegacySelector::new();
        let prefixed = self.looking_at("new");
        if prefixed {
            self.ident()?;
            if self.ident()? != "UiSelector" {
                return Err(self.error("expected UiSelector"));
            }
            self.expect('(')?;
            self.expect(')')?;
        }
        let mut first = !prefixed;
        loop {
            if !first && !self.eat('.') {
                return Ok(selector);
            }
            first = false;
            let method_pos = self.pos;
            let method = self.ident()?;
            self.expect('(')?;
            let arg = self.arg()?;
            self.expect(')')?;
            selector = apply(selector, &method, arg).map_err(|e| match e {
                SelectorError::Parse { message, .. } => SelectorError::Parse {
                    position: method_pos,
                    message,
                },
                other => other,
            })?;
        }
    }
}

fn apply(mut s: LegacySelector, method: &str, arg: Arg) -> Result<LegacySelector, SelectorError> {
    let mismatch = |expected: &str, arg: &Arg| SelectorError::Parse {
        position: 0,
        message: format!("{method}() expects a {expected}, got a {}", arg.kind()),
    };
    match (method, arg) {
        ("text", Arg::Str(v)) => s.text = Some(v),
        ("textContains", Arg::Str(v)) => s.text_contains = Some(v),
        ("textStartsWith", Arg::Str(v)) => s.text_starts_with = Some(v),
        ("textMatches", Arg::Str(v)) => s.text_matches = Some(Pattern::new(&v)?),
        ("description", Arg::Str(v)) => s.description = Some(v),
        ("descriptionContains", Arg::Str(v)) => s.description_contains = Some(v),
        ("descriptionStartsWith", Arg::Str(v)) => s.description_starts_with = Some(v),
        ("descriptionMatches", Arg::Str(v)) => s.description_matches = Some(Pattern::new(&v)?),
        ("className", Arg::Str(v)) => s.class_name = Some(v),
        ("classNameMatches", Arg::Str(v)) => s.class_regex = Some(Pattern::new(&v)?),
        ("resourceId", Arg::Str(v)) => s.resource_id = Some(v),
        ("resourceIdMatches", Arg::Str(v)) => s.resource_id_regex = Some(Pattern::new(&v)?),
        ("packageName", Arg::Str(v)) => s.package_name = Some(v),
        ("checkable", Arg::Bool(v)) => s.checkable = Some(v),
        ("checked", Arg::Bool(v)) => s.checked = Some(v),
        ("clickable", Arg::Bool(v)) => s.clickable = Some(v),
        ("enabled", Arg::Bool(v)) => s.enabled = Some(v),
        ("focusable", Arg::Bool(v)) => s.focusable = Some(v),
        ("focused", Arg::Bool(v)) => s.focused = Some(v),
        ("longClickable", Arg::Bool(v)) => s.long_clickable = Some(v),
        ("scrollable", Arg::Bool(v)) => s.scrollable = Some(v),
        ("selected", Arg::Bool(v)) => s.selected = Some(v),
        ("index", Arg::Int(v)) => s.index = Some(v),
        ("instance", Arg::Int(v)) => s.instance = Some(v),
        ("childSelector", Arg::Selector(v)) => s.child = Some(Box::new(v)),
        ("fromParent", Arg::Selector(v)) => s.parent = Some(Box::new(v)),
        (
            "text" | "textContains" | "textStartsWith" | "textMatches" | "description"
            | "descriptionContains" | "descriptionStartsWith" | "descriptionMatches"
            | "className" | "classNameMatches" | "resourceId" | "resourceIdMatches"
            | "packageName",
            arg,
        ) => return Err(mismatch("string", &arg)),
        (
            "checkable" | "checked" | "clickable" | "enabled" | "focusable" | "focused"
            | "longClickable" | "scrollable" | "selected",
            arg,
        ) => return Err(mismatch("boolean", &arg)),
        ("index" | "instance", arg) => return Err(mismatch("integer", &arg)),
        ("childSelector" | "fromParent", arg) => return Err(mismatch("selector", &arg)),
        (other, _) => {
            return Err(SelectorError::Parse {
                position: 0,
                message: format!("unknown selector method '{other}'"),
            })
        }
    }
    Ok(s)
}

/// Parse a legacy selector from its builder-chain source form.
pub fn parse_legacy(source: &str) -> Result<LegacySelector, SelectorError> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let selector = parser.selector()?;
    parser.eat(';');
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(parser.error("trailing input"));
    }
    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_chain() {
        let sel = parse_legacy(
            r#"new UiSelector().className("android.widget.Button").text("OK").instance(1)"#,
        )
        .unwrap();
        assert_eq!(sel.class_name.as_deref(), Some("android.widget.Button"));
        assert_eq!(sel.text.as_deref(), Some("OK"));
        assert_eq!(sel.instance, Some(1));
    }

    #[test]
    fn test_parse_without_prefix() {
        let sel = parse_legacy(r#"resourceId("com.app:id/ok").clickable(true)"#).unwrap();
        assert_eq!(sel.resource_id.as_deref(), Some("com.app:id/ok"));
        assert_eq!(sel.clickable, Some(true));
    }

    #[test]
    fn test_parse_nested_child_and_regex() {
        let sel = parse_legacy(
            r#"new UiSelector().classNameMatches(".*List.*").childSelector(new UiSelector().textContains("Item"));"#,
        )
        .unwrap();
        assert!(sel.uses_class_regex());
        assert_eq!(
            sel.child.as_ref().and_then(|c| c.text_contains.as_deref()),
            Some("Item")
        );
    }

    #[test]
    fn test_parse_escaped_string() {
        let sel = parse_legacy(r#"text("say \"hi\"")"#).unwrap();
        assert_eq!(sel.text.as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_legacy("new UiSelector().bogus(1)"),
            Err(SelectorError::Parse { .. })
        ));
        assert!(matches!(
            parse_legacy(r#"instance("1")"#),
            Err(SelectorError::Parse { .. })
        ));
        assert!(matches!(
            parse_legacy(r#"text("open"#),
            Err(SelectorError::Parse { .. })
        ));
        assert!(matches!(
            parse_legacy(r#"classNameMatches("(")"#),
            Err(SelectorError::InvalidRegex { .. })
        ));
        assert!(matches!(
            parse_legacy(r#"text("a") garbage"#),
            Err(SelectorError::Parse { .. })
        ));
    }

    fn nest(depth: usize) -> String {
        let mut source = String::from("new UiSelector().text(\"leaf\")");
        for _ in 0..depth {
            source = format!("new UiSelector().className(\"x\").childSelector({source})");
        }
        source
    }

    #[test]
    fn test_parse_nesting_limit() {
        let sel = parse_legacy(&nest(MAX_SELECTOR_DEPTH)).unwrap();
        assert_eq!(sel.nesting_depth(), MAX_SELECTOR_DEPTH);
        assert_eq!(
            parse_legacy(&nest(MAX_SELECTOR_DEPTH + 1)).unwrap_err(),
            SelectorError::TooDeep {
                limit: MAX_SELECTOR_DEPTH
            }
        );

        let deep_parent = format!(
            "{}{}",
            "new UiSelector().text(\"a\").fromParent(".repeat(200),
            ")".repeat(200)
        );
        assert!(matches!(
            parse_legacy(&deep_parent),
            Err(SelectorError::TooDeep { .. })
        ));
    }
}
