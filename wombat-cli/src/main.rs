//! Wombat CLI - HTML parsing and debugging tool
//!
//! Parses a file or an inline string and prints the repaired tree, the parse
//! errors, the token stream, re-serialized markup, plain text or JSON.

mod output;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Parser;
use wombat_common::encoding::decode;
use wombat_common::warning::set_warnings_enabled;
use wombat_dom::{Namespace, SerializeOptions};
use wombat_html::{Document, FragmentContext, ParseOptions, TokenizerOpts, parse, parse_bytes, tokenize};

/// Wombat - error-tolerant HTML5 parser
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a file
    wombat page.html

    # Parse inline markup and list the parse errors
    wombat --html '<p>a<b>b</p>' --errors

    # Parse a fragment in a table row context
    wombat --html '<td>x' --fragment tr

    # Parse a fragment inside an svg element
    wombat --html '<circle r="1"/>' --fragment svg:svg

    # Dump the tree and errors as JSON
    wombat page.html --json
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to an HTML file (decoded by BOM, then <meta> prescan)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Parse as a fragment; CONTEXT is a tag name, optionally prefixed with
    /// `svg:` or `math:` (default: div)
    #[arg(long, value_name = "CONTEXT", num_args = 0..=1, default_missing_value = "div")]
    fragment: Option<String>,

    /// Print the parse errors after the output
    #[arg(short, long)]
    errors: bool,

    /// Fail on the first parse error
    #[arg(long)]
    strict: bool,

    /// Print the token stream before the output
    #[arg(short, long)]
    tokens: bool,

    /// Print the tree and errors as JSON
    #[arg(short, long)]
    json: bool,

    /// Print the tree re-serialized as HTML
    #[arg(short, long)]
    serialize: bool,

    /// Print the document's text content
    #[arg(long)]
    text: bool,

    /// Do not print notices about approximated parser features
    #[arg(short, long)]
    quiet: bool,
}

/// Where the markup comes from.
enum Input {
    Bytes(Vec<u8>),
    Text(String),
}

impl Input {
    fn load(cli: &Cli) -> Result<Self> {
        if let Some(html) = &cli.html {
            Ok(Self::Text(html.clone()))
        } else if let Some(path) = &cli.path {
            let bytes =
                fs::read(path).with_context(|| format!("reading '{}'", path.display()))?;
            Ok(Self::Bytes(bytes))
        } else {
            bail!("no input: pass a FILE or --html")
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Bytes(bytes) => decode(bytes, None).text,
            Self::Text(text) => text.clone(),
        }
    }
}

/// `div`, `svg:path`, `math:mi`
fn parse_fragment_context(value: &str) -> Result<FragmentContext> {
    match value.split_once(':') {
        Some((prefix, tag_name)) => {
            let namespace = Namespace::from_str(prefix)
                .with_context(|| format!("unknown namespace prefix '{prefix}'"))?;
            Ok(FragmentContext::new(tag_name).with_namespace(namespace))
        }
        None => Ok(FragmentContext::new(value)),
    }
}

fn parse_options(cli: &Cli) -> Result<ParseOptions> {
    let mut opts = ParseOptions::default()
        .with_collect_errors(cli.errors || cli.json)
        .with_strict(cli.strict);
    if let Some(context) = &cli.fragment {
        opts = opts.with_fragment_context(parse_fragment_context(context)?);
    }
    Ok(opts)
}

fn load_document(input: &Input, opts: &ParseOptions) -> Result<Document> {
    let result = match input {
        Input::Bytes(bytes) => parse_bytes(bytes, opts),
        Input::Text(text) => parse(text, opts),
    };
    result.or_else(|error| {
        if let Some(annotated) = error.annotated_source() {
            eprintln!("{annotated}");
        }
        Err(error.into())
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_warnings_enabled(!cli.quiet);

    let input = Input::load(&cli)?;
    let opts = parse_options(&cli)?;

    if cli.tokens {
        let (tokens, _) = tokenize(&input.text(), &TokenizerOpts::default());
        output::print_tokens(&tokens);
    }

    let document = load_document(&input, &opts)?;

    if cli.json {
        output::print_json(&document)?;
        return Ok(());
    }

    if cli.serialize {
        println!("{}", document.to_html(&SerializeOptions::default()));
    } else if cli.text {
        println!("{}", document.to_text("\n", true));
    } else {
        output::print_document(&document);
    }

    if cli.errors {
        output::print_errors(&document.errors);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_context_with_namespace() {
        let context = parse_fragment_context("svg:foreignObject").unwrap();
        assert_eq!(context.tag_name, "foreignobject");
        assert_eq!(context.namespace, Some(Namespace::Svg));
    }

    #[test]
    fn test_fragment_context_plain_tag() {
        let context = parse_fragment_context("TR").unwrap();
        assert_eq!(context.tag_name, "tr");
        assert_eq!(context.namespace, None);
    }

    #[test]
    fn test_unknown_namespace_prefix() {
        assert!(parse_fragment_context("xlink:a").is_err());
    }

    #[test]
    fn test_bare_fragment_flag_defaults_to_div() {
        let cli = Cli::parse_from(["wombat", "--html", "<td>x", "--fragment"]);
        let opts = parse_options(&cli).unwrap();
        assert_eq!(opts.fragment_context, Some(FragmentContext::new("div")));
    }

    #[test]
    fn test_json_collects_errors() {
        let cli = Cli::parse_from(["wombat", "--html", "<p>", "--json"]);
        assert!(parse_options(&cli).unwrap().collect_errors);
    }

    #[test]
    fn test_strict_mode_fails() {
        let cli = Cli::parse_from(["wombat", "--html", "<p>", "--strict"]);
        let input = Input::load(&cli).unwrap();
        let opts = parse_options(&cli).unwrap();
        assert!(load_document(&input, &opts).is_err());
    }
}
