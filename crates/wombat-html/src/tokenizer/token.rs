use core::fmt;

use wombat_dom::AttributesMap;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Consecutive characters are delivered as one [`Token::CharacterRun`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name"
        name: String,
        /// "a list of attributes", first occurrence of each name only.
        attrs: AttributesMap,
        /// "a self-closing flag"
        self_closing: bool,
    },

    /// End tag token. Attributes and the self-closing flag are parse errors
    /// on end tags and are dropped.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// A run of character tokens, with character references already decoded
    /// where the content model allows them.
    CharacterRun {
        /// The characters.
        text: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        text: String,
    },

    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string)"
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_id: Option<String>,
        /// "a system identifier"
        system_id: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// End of input. Emitted exactly once, last.
    EndOfInput,
}

impl Token {
    /// "When a DOCTYPE token is created, its name, public identifier, and system
    /// identifier must be marked as missing (which is a distinct state from the
    /// empty string), and the force-quirks flag must be set to off."
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            name: None,
            public_id: None,
            system_id: None,
            force_quirks: false,
        }
    }

    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            attrs: AttributesMap::new(),
            self_closing: false,
        }
    }

    /// An end tag with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// A comment token with the given data.
    #[must_use]
    pub fn new_comment(text: &str) -> Self {
        Self::Comment {
            text: text.to_string(),
        }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// The tag name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c);
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// "Set the self-closing flag of the current tag token."
    pub fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error"
    #[must_use]
    pub fn has_attribute(&self, attr_name: &str) -> bool {
        matches!(self, Self::StartTag { attrs, .. } if attrs.contains_key(attr_name))
    }

    /// Add a finished attribute. Has no effect on anything but a start tag,
    /// or when the name is already present.
    pub fn insert_attribute(&mut self, attr_name: String, value: String) {
        if let Self::StartTag { attrs, .. } = self {
            let _ = attrs.entry(attr_name).or_insert(value);
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// "Append the current input character to the comment token's data."
    pub fn append_to_comment(&mut self, c: char) {
        if let Self::Comment { text } = self {
            text.push(c);
        }
    }

    /// Append several characters to the comment token's data.
    pub fn append_str_to_comment(&mut self, s: &str) {
        if let Self::Comment { text } = self {
            text.push_str(s);
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    ///
    /// "Append the current input character to the current DOCTYPE token's name."
    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    ///
    /// "Set the current DOCTYPE token's public identifier to the empty string
    /// (not missing)"
    pub fn clear_public_id(&mut self) {
        if let Self::Doctype { public_id, .. } = self {
            *public_id = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's
    /// public identifier."
    pub fn append_to_public_id(&mut self, c: char) {
        if let Self::Doctype { public_id, .. } = self {
            public_id.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's system identifier to the empty string
    /// (not missing)"
    pub fn clear_system_id(&mut self) {
        if let Self::Doctype { system_id, .. } = self {
            *system_id = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's
    /// system identifier."
    pub fn append_to_system_id(&mut self, c: char) {
        if let Self::Doctype { system_id, .. } = self {
            system_id.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub fn set_force_quirks(&mut self) {
        if let Self::Doctype { force_quirks, .. } = self {
            *force_quirks = true;
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                write!(f, "<{name}")?;
                for (attr_name, value) in attrs {
                    write!(f, " {attr_name}=\"{value}\"")?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::CharacterRun { text } => write!(f, "Characters({text:?})"),
            Self::Comment { text } => write!(f, "<!--{text}-->"),
            Self::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(id) = public_id {
                    write!(f, " PUBLIC \"{id}\"")?;
                }
                if let Some(id) = system_id {
                    write!(f, " SYSTEM \"{id}\"")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::EndOfInput => write!(f, "EOF"),
        }
    }
}
