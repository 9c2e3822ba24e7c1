//! MathML attribute adjustment.

use wombat_dom::AttributesMap;

/// [§ 13.2.6.3 Adjust MathML attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes)
///
/// "if the attribute's name is 'definitionurl', set the attribute's name to
/// 'definitionURL'."
#[must_use]
pub fn adjust_mathml_attributes(attrs: AttributesMap) -> AttributesMap {
    attrs
        .into_iter()
        .map(|(name, value)| {
            if name == "definitionurl" {
                ("definitionURL".to_string(), value)
            } else {
                (name, value)
            }
        })
        .collect()
}
