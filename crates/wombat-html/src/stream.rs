//! Event stream over the tokenizer, for callers that want markup events
//! without building a tree.

use serde::Serialize;
use wombat_dom::AttributesMap;

use crate::tokenizer::{Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts, raw_kind_for};

/// One markup event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StreamEvent {
    /// A start tag.
    Start {
        /// Lowercase tag name.
        name: String,
        /// Attributes in source order.
        attrs: AttributesMap,
    },
    /// An end tag.
    End {
        /// Lowercase tag name.
        name: String,
    },
    /// Character data, with references decoded. Adjacent runs are merged.
    Text(String),
    /// A comment's data.
    Comment(String),
    /// A DOCTYPE's name.
    Doctype(String),
}

#[derive(Debug, Default)]
struct EventCollector {
    events: Vec<StreamEvent>,
}

impl EventCollector {
    fn push_text(&mut self, text: String) {
        if let Some(StreamEvent::Text(previous)) = self.events.last_mut() {
            previous.push_str(&text);
        } else {
            self.events.push(StreamEvent::Text(text));
        }
    }
}

impl TokenSink for EventCollector {
    fn process(&mut self, token: Token) -> TokenSinkResult {
        match token {
            Token::StartTag { name, attrs, .. } => {
                let switch = raw_kind_for(&name);
                self.events.push(StreamEvent::Start { name, attrs });
                if let Some(kind) = switch {
                    return TokenSinkResult::SwitchTo(kind);
                }
            }
            Token::EndTag { name } => self.events.push(StreamEvent::End { name }),
            Token::CharacterRun { text } => self.push_text(text),
            Token::Comment { text } => self.events.push(StreamEvent::Comment(text)),
            Token::Doctype { name, .. } => {
                self.events.push(StreamEvent::Doctype(name.unwrap_or_default()));
            }
            Token::EndOfInput => {}
        }
        TokenSinkResult::Continue
    }
}

/// The markup events of `html` in source order.
///
/// ```
/// use wombat_html::{stream, StreamEvent};
///
/// let events: Vec<StreamEvent> = stream("<b>hi</b>").collect();
/// assert_eq!(events[1], StreamEvent::Text("hi".to_string()));
/// ```
pub fn stream(html: &str) -> impl Iterator<Item = StreamEvent> {
    let mut tokenizer = Tokenizer::new(EventCollector::default(), TokenizerOpts::default());
    tokenizer.run(html);
    let (collector, _) = tokenizer.into_parts();
    collector.events.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_content_is_one_text_event() {
        let events: Vec<StreamEvent> = stream("<style>a<b{}</style>").collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Start {
                    name: "style".to_string(),
                    attrs: AttributesMap::new(),
                },
                StreamEvent::Text("a<b{}".to_string()),
                StreamEvent::End {
                    name: "style".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_doctype_and_comment() {
        let events: Vec<StreamEvent> = stream("<!DOCTYPE html><!--x-->").collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Doctype("html".to_string()),
                StreamEvent::Comment("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_events_serialize_with_ordered_attributes() {
        let events: Vec<StreamEvent> = stream("<a z=1 href=x>t").collect();
        let json = serde_json::to_string(&events).unwrap();
        assert_eq!(
            json,
            r#"[{"Start":{"name":"a","attrs":{"z":"1","href":"x"}}},{"Text":"t"}]"#
        );
    }
}
