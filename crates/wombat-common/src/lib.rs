//! Common utilities for the Wombat HTML parser.
//!
//! This crate provides shared infrastructure used by the parser crates:
//! - **Warning System** - deduplicated, colored notices for approximated behavior
//! - **Encoding** - byte-to-text decoding with BOM, transport, and `<meta>` sniffing

pub mod encoding;
pub mod warning;
