//! Document compatibility mode.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use serde::Serialize;
use strum_macros::Display;

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")". Decided once, by the DOCTYPE, and fixed afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
pub enum QuirksMode {
    /// Standards mode.
    #[default]
    #[strum(serialize = "no-quirks")]
    #[serde(rename = "no-quirks")]
    NoQuirks,
    /// Almost-standards mode.
    #[strum(serialize = "limited-quirks")]
    #[serde(rename = "limited-quirks")]
    LimitedQuirks,
    /// Legacy rendering mode.
    #[strum(serialize = "quirks")]
    #[serde(rename = "quirks")]
    Quirks,
}

/// "If the DOCTYPE token's name is not "html", or the token's public
/// identifier is not missing, or the token's system identifier is neither
/// missing nor "about:legacy-compat", then there is a parse error". These
/// historical doctypes are the exceptions, accepted as written.
const ACCEPTABLE_DOCTYPES: &[(&str, Option<&str>, Option<&str>)] = &[
    ("html", None, None),
    ("html", None, Some("about:legacy-compat")),
    ("html", Some("-//W3C//DTD HTML 4.0//EN"), None),
    (
        "html",
        Some("-//W3C//DTD HTML 4.0//EN"),
        Some("http://www.w3.org/TR/REC-html40/strict.dtd"),
    ),
    ("html", Some("-//W3C//DTD HTML 4.01//EN"), None),
    (
        "html",
        Some("-//W3C//DTD HTML 4.01//EN"),
        Some("http://www.w3.org/TR/html4/strict.dtd"),
    ),
    (
        "html",
        Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
        Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"),
    ),
    (
        "html",
        Some("-//W3C//DTD XHTML 1.1//EN"),
        Some("http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd"),
    ),
];

/// "The public identifier starts with: ..." (quirks). Lowercase.
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to: ..." (quirks). Lowercase.
const QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// "The system identifier is set to: ..." (quirks). Lowercase.
const QUIRKY_SYSTEM_MATCHES: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

/// "The public identifier starts with: ..." (limited quirks). Lowercase.
const LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

/// HTML 4.01 Frameset and Transitional: quirks without a system identifier,
/// limited quirks with one. Lowercase.
const HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// Classify a DOCTYPE token.
///
/// Returns whether the DOCTYPE is a parse error (`unknown-doctype`) and the
/// compatibility mode it selects.
///
/// ```
/// use wombat_html::parser::quirks::{doctype_error_and_quirks, QuirksMode};
///
/// let (error, mode) = doctype_error_and_quirks(Some("html"), None, None, false, false);
/// assert!(!error);
/// assert_eq!(mode, QuirksMode::NoQuirks);
/// ```
#[must_use]
pub fn doctype_error_and_quirks(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
    iframe_srcdoc: bool,
) -> (bool, QuirksMode) {
    let name = name.unwrap_or("");
    let parse_error = !ACCEPTABLE_DOCTYPES
        .iter()
        .any(|&(n, public, system)| n == name && public == public_id && system == system_id);

    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public = public.as_deref();
    let system = system.as_deref();
    let public_starts_with = |prefixes: &[&str]| {
        public.is_some_and(|id| prefixes.iter().any(|prefix| id.starts_with(prefix)))
    };

    // "Then, if the document is not an iframe srcdoc document, and the parser
    // cannot change the mode flag is false, and the DOCTYPE token matches one
    // of the conditions in the following list, then set the Document to quirks
    // mode"
    let mode = if force_quirks {
        QuirksMode::Quirks
    } else if iframe_srcdoc {
        QuirksMode::NoQuirks
    } else if name != "html"
        || public.is_some_and(|id| QUIRKY_PUBLIC_MATCHES.contains(&id))
        || system.is_some_and(|id| QUIRKY_SYSTEM_MATCHES.contains(&id))
        || public_starts_with(QUIRKY_PUBLIC_PREFIXES)
    {
        QuirksMode::Quirks
    } else if public_starts_with(LIMITED_QUIRKY_PUBLIC_PREFIXES) {
        QuirksMode::LimitedQuirks
    } else if public_starts_with(HTML4_PUBLIC_PREFIXES) {
        if system.is_none() {
            QuirksMode::Quirks
        } else {
            QuirksMode::LimitedQuirks
        }
    } else {
        QuirksMode::NoQuirks
    };

    (parse_error, mode)
}
