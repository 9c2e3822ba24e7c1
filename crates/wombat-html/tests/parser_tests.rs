//! Integration tests for tree construction.
//!
//! Trees are compared in the html5lib dump format: one node per line, `| `
//! followed by two spaces per level of depth.

use quickcheck_macros::quickcheck;
use wombat_dom::{Namespace, NodeId};
use wombat_html::{Document, FragmentContext, ParseOptions, QuirksMode, parse};

/// Helper to parse a document without collecting errors
fn document(html: &str) -> Document {
    parse(html, &ParseOptions::default()).expect("non-strict parse")
}

/// Helper to parse and return the tree dump
fn dump(html: &str) -> String {
    document(html).to_test_format()
}

fn fragment_dump(html: &str, context: FragmentContext) -> String {
    parse(html, &ParseOptions::default().with_fragment_context(context))
        .expect("non-strict parse")
        .to_test_format()
}

/// Helper to parse with error collection and return the error codes
fn error_codes(html: &str) -> Vec<String> {
    parse(html, &ParseOptions::default().with_collect_errors(true))
        .expect("non-strict parse")
        .errors
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn lines(lines: &[&str]) -> String {
    lines.join("\n")
}

// ========== Implicit document structure ==========

#[test]
fn test_empty_document_gets_html_head_body() {
    assert_eq!(
        dump(""),
        lines(&["| <html>", "|   <head>", "|   <body>"])
    );
}

#[test]
fn test_text_only_document() {
    assert_eq!(
        dump("Hello"),
        lines(&["| <html>", "|   <head>", "|   <body>", "|     \"Hello\""])
    );
}

#[test]
fn test_doctype_and_explicit_structure() {
    assert_eq!(
        dump("<!DOCTYPE html><html lang=en><head><title>T</title></head><body>x</body></html>"),
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   lang=\"en\"",
            "|   <head>",
            "|     <title>",
            "|       \"T\"",
            "|   <body>",
            "|     \"x\"",
        ])
    );
}

#[test]
fn test_leading_whitespace_and_comments() {
    assert_eq!(
        dump("  <!--a--><!DOCTYPE html><!--b--><p>x"),
        lines(&[
            "| <!-- a -->",
            "| <!DOCTYPE html>",
            "| <!-- b -->",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"x\"",
        ])
    );
}

#[test]
fn test_head_elements_stay_in_head() {
    assert_eq!(
        dump("<meta charset=utf-8><link rel=x><style>p{}</style><p>x"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|     <meta>",
            "|       charset=\"utf-8\"",
            "|     <link>",
            "|       rel=\"x\"",
            "|     <style>",
            "|       \"p{}\"",
            "|   <body>",
            "|     <p>",
            "|       \"x\"",
        ])
    );
}

#[test]
fn test_whitespace_in_head_is_kept() {
    assert_eq!(
        dump("<head> <title>t</title> </head> <body>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|     \" \"",
            "|     <title>",
            "|       \"t\"",
            "|     \" \"",
            "|   \" \"",
            "|   <body>",
        ])
    );
}

#[test]
fn test_head_element_after_head_goes_into_head() {
    let document = document("<head></head><title>late</title><p>x");
    let head = document.tree.head().expect("head");
    let title = document.query("title")[0];
    assert_eq!(document.tree.parent(title), Some(head));
}

#[test]
fn test_stray_html_and_body_attributes_merge() {
    assert_eq!(
        dump("<html lang=en><body id=a><html class=x><body id=b class=c>"),
        lines(&[
            "| <html>",
            "|   class=\"x\"",
            "|   lang=\"en\"",
            "|   <head>",
            "|   <body>",
            "|     class=\"c\"",
            "|     id=\"a\"",
        ])
    );
}

// ========== Body content ==========

#[test]
fn test_p_auto_closes() {
    assert_eq!(
        dump("<p>A<p>B"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"A\"",
            "|     <p>",
            "|       \"B\"",
        ])
    );
}

#[test]
fn test_block_closes_open_p() {
    let document = document("<p>a<div>b</div>");
    let div = document.query("div")[0];
    let body = document.tree.body().expect("body");
    assert_eq!(document.tree.parent(div), Some(body));
}

#[test]
fn test_stray_p_end_tag_creates_empty_p() {
    assert_eq!(
        dump("</p>"),
        lines(&["| <html>", "|   <head>", "|   <body>", "|     <p>"])
    );
}

#[test]
fn test_br_end_tag_becomes_br() {
    assert_eq!(
        dump("a</br>b"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"a\"",
            "|     <br>",
            "|     \"b\"",
        ])
    );
}

#[test]
fn test_unmatched_end_tag_ignored_and_text_merged() {
    assert_eq!(
        dump("<p>a</span>b"),
        lines(&["| <html>", "|   <head>", "|   <body>", "|     <p>", "|       \"ab\""])
    );
    assert!(error_codes("<p>a</span>b").contains(&"unexpected-end-tag".to_string()));
}

#[test]
fn test_end_tag_closes_everything_opened_after() {
    assert_eq!(
        dump("<div><span>x</div>y"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <div>",
            "|       <span>",
            "|         \"x\"",
            "|     \"y\"",
        ])
    );
}

#[test]
fn test_void_and_self_closing_elements_take_no_children() {
    assert_eq!(
        dump("<img src=a>x<div/>y"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <img>",
            "|       src=\"a\"",
            "|     \"x\"",
            "|     <div>",
            "|     \"y\"",
        ])
    );
}

#[test]
fn test_image_is_renamed_img() {
    let document = document("<image src=x>");
    assert_eq!(document.query("img").len(), 1);
    assert!(document.query("image").is_empty());
}

#[test]
fn test_list_items_auto_close() {
    assert_eq!(
        dump("<ul><li>a<li>b</ul>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <ul>",
            "|       <li>",
            "|         \"a\"",
            "|       <li>",
            "|         \"b\"",
        ])
    );
}

#[test]
fn test_list_item_closes_through_div() {
    let document = document("<ul><li><div><li>b");
    let items = document.query("li");
    assert_eq!(items.len(), 2);
    assert_eq!(document.tree.parent(items[0]), document.tree.parent(items[1]));
}

#[test]
fn test_list_item_end_tag_closes_nested_content() {
    assert_eq!(
        dump("<ul><li><div>x</li>y</ul>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <ul>",
            "|       <li>",
            "|         <div>",
            "|           \"x\"",
            "|       \"y\"",
        ])
    );
    let codes = error_codes("<!DOCTYPE html><ul><li><div>x</li>y</ul>");
    assert_eq!(codes, ["unexpected-end-tag"]);
}

#[test]
fn test_list_item_end_tag_out_of_scope_is_ignored() {
    let codes = error_codes("<!DOCTYPE html><li><ul>x</li></ul>");
    assert_eq!(codes, ["unexpected-end-tag"]);
    let document = document("<li><ul>x</li>y</ul>");
    let ul = document.query("ul")[0];
    assert_eq!(document.tree.text_content(ul), "xy");
}

#[test]
fn test_definition_items_auto_close() {
    assert_eq!(
        dump("<dl><dt>a<dd>b<dt>c</dl>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <dl>",
            "|       <dt>",
            "|         \"a\"",
            "|       <dd>",
            "|         \"b\"",
            "|       <dt>",
            "|         \"c\"",
        ])
    );
}

#[test]
fn test_nested_headings_become_siblings() {
    assert_eq!(
        dump("<h1>a<h2>b"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <h1>",
            "|       \"a\"",
            "|     <h2>",
            "|       \"b\"",
        ])
    );
    assert!(error_codes("<h1>a<h2>b").contains(&"unexpected-start-tag".to_string()));
}

#[test]
fn test_mismatched_heading_end_tag_closes_heading() {
    let document = document("<h1>a</h2>b");
    let h1 = document.query("h1")[0];
    assert_eq!(document.tree.text_content(h1), "a");
}

#[test]
fn test_nested_button_closes_previous() {
    let document = document("<button>a<button>b");
    let buttons = document.query("button");
    assert_eq!(buttons.len(), 2);
    assert_eq!(document.tree.next_sibling(buttons[0]), Some(buttons[1]));
}

#[test]
fn test_options_close_each_other() {
    assert_eq!(
        dump("<select><option>a<option>b</select>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|         \"a\"",
            "|       <option>",
            "|         \"b\"",
        ])
    );
}

#[test]
fn test_null_dropped_in_body() {
    assert_eq!(document("a\0b").to_text("", false), "ab");
}

#[test]
fn test_stray_frameset_in_body_is_ignored() {
    let document = document("<p>x<frameset>");
    assert!(document.query("frameset").is_empty());
}

// ========== Text-only elements ==========

#[test]
fn test_pre_drops_leading_newline() {
    assert_eq!(
        dump("<pre>\nx\n</pre>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <pre>",
            "|       \"x",
            "\"",
        ])
    );
}

#[test]
fn test_textarea_drops_leading_newline_and_keeps_markup() {
    assert_eq!(
        dump("<textarea>\n<b>x</b></textarea>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <textarea>",
            "|       \"<b>x</b>\"",
        ])
    );
}

#[test]
fn test_title_decodes_references() {
    let document = document("<title>a &amp; <b></title>");
    let title = document.query("title")[0];
    assert_eq!(document.tree.text_content(title), "a & <b>");
}

#[test]
fn test_script_content_is_raw_text() {
    let document = document("<script>if (a < b) { x = '</p>'; }</script>");
    let script = document.query("script")[0];
    assert_eq!(document.tree.text_content(script), "if (a < b) { x = '</p>'; }");
    assert!(document.query("p").is_empty());
}

#[test]
fn test_plaintext_swallows_rest_of_document() {
    let document = document("<plaintext><b>x</plaintext>");
    let plaintext = document.query("plaintext")[0];
    assert_eq!(document.tree.text_content(plaintext), "<b>x</plaintext>");
    assert!(document.query("b").is_empty());
}

#[test]
fn test_unterminated_title_reports_eof() {
    let codes = error_codes("<!DOCTYPE html><title>x");
    assert!(codes.contains(&"expected-named-closing-tag-but-got-eof".to_string()));
}

// ========== Tables ==========

#[test]
fn test_table_synthesizes_tbody_and_tr() {
    assert_eq!(
        dump("<table><td>x</td></table>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ])
    );
}

#[test]
fn test_cells_close_each_other() {
    assert_eq!(
        dump("<table><tr><td>a<td>b</table>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"a\"",
            "|           <td>",
            "|             \"b\"",
        ])
    );
}

#[test]
fn test_new_row_closes_previous_row() {
    let document = document("<table><tr><td>a<tr><td>b</table>");
    assert_eq!(document.query("tbody").len(), 1);
    let rows = document.query("tr");
    assert_eq!(rows.len(), 2);
    assert_eq!(document.tree.parent(rows[0]), document.tree.parent(rows[1]));
}

#[test]
fn test_explicit_sections_are_kept() {
    let document = document("<table><thead><tr><th>h<tbody><tr><td>d<tfoot><tr><td>f</table>");
    assert_eq!(document.query("thead").len(), 1);
    assert_eq!(document.query("tbody").len(), 1);
    assert_eq!(document.query("tfoot").len(), 1);
    assert_eq!(document.query("tr").len(), 3);
}

#[test]
fn test_table_start_tag_inside_table_closes_it() {
    assert_eq!(
        dump("<table><table>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|     <table>",
        ])
    );
}

#[test]
fn test_table_in_cell_nests() {
    let document = document("<table><td><table><td>inner</table>outer</table>");
    let tables = document.query("table");
    assert_eq!(tables.len(), 2);
    assert!(document.tree.is_descendant_of(tables[1], tables[0]));
    let cells = document.query("td");
    assert_eq!(document.tree.text_content(cells[0]), "innerouter");
}

#[test]
fn test_content_after_table_goes_to_body() {
    let document = document("<table><td>x</table><p>after");
    let p = document.query("p")[0];
    assert_eq!(document.tree.parent(p), document.tree.body());
}

#[test]
fn test_misplaced_table_text_stays_in_table() {
    let document = document("<table>oops<tr><td>x</table>");
    let table = document.query("table")[0];
    let first = document.tree.first_child(table).expect("table child");
    assert_eq!(document.tree.as_text(first), Some("oops"));
}

#[test]
fn test_stray_cell_end_tags_ignored() {
    let codes = error_codes("<!DOCTYPE html><table><tr></td></tr></table>");
    assert_eq!(codes, ["unexpected-end-tag"]);
}

#[test]
fn test_stray_end_tag_in_cell_does_not_close_table() {
    assert_eq!(
        dump("<!DOCTYPE html><div><table><tr><td>x</div>y<td>z</table>"),
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <div>",
            "|       <table>",
            "|         <tbody>",
            "|           <tr>",
            "|             <td>",
            "|               \"xy\"",
            "|             <td>",
            "|               \"z\"",
        ])
    );
    let codes = error_codes("<!DOCTYPE html><div><table><tr><td>x</div>y<td>z</table></div>");
    assert_eq!(codes, ["unexpected-end-tag"]);
}

#[test]
fn test_inline_end_tag_stops_at_cell() {
    let document = document("<span><table><tr><td>a</span>b</table>c");
    let cell = document.query("td")[0];
    assert_eq!(document.tree.text_content(cell), "ab");
    let span = document.query("span")[0];
    assert_eq!(document.tree.text_content(span), "abc");
}

// ========== Formatting elements ==========

#[test]
fn test_well_nested_formatting() {
    assert_eq!(
        dump("<b><i>x</i></b>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       <i>",
            "|         \"x\"",
        ])
    );
}

#[test]
fn test_misnested_formatting_moves_paragraph_out() {
    assert_eq!(
        dump("<b>1<p>2</b>3"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|     <p>",
            "|       \"2\"",
            "|     \"3\"",
        ])
    );
}

#[test]
fn test_misnested_formatting_rewraps_current_node() {
    assert_eq!(
        dump("<b><p><i>x</b>y"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|     <p>",
            "|       <b>",
            "|         <i>",
            "|           \"x\"",
            "|     \"y\"",
        ])
    );
}

#[test]
fn test_misnested_formatting_reports_once() {
    let codes = error_codes("<!DOCTYPE html><b>1<p>2</b>3");
    assert_eq!(
        codes
            .iter()
            .filter(|code| code.as_str() == "adoption-agency-1.3")
            .count(),
        1
    );
}

#[test]
fn test_overlapping_formatting_closes_inner() {
    assert_eq!(
        dump("<a>1<b>2</a>3</b>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       \"1\"",
            "|       <b>",
            "|         \"2\"",
            "|     \"3\"",
        ])
    );
}

// ========== Foreign content ==========

#[test]
fn test_svg_names_are_adjusted() {
    assert_eq!(
        dump(
            "<svg viewbox=\"0 0 1 1\"><clippath></clippath><foreignObject><p>x</p></foreignObject></svg><p>y"
        ),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       viewBox=\"0 0 1 1\"",
            "|       <svg clipPath>",
            "|       <svg foreignObject>",
            "|         <p>",
            "|           \"x\"",
            "|     <p>",
            "|       \"y\"",
        ])
    );
}

#[test]
fn test_html_start_tag_breaks_out_of_svg() {
    assert_eq!(
        dump("<svg><g><p>x"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       <svg g>",
            "|     <p>",
            "|       \"x\"",
        ])
    );
    assert!(error_codes("<svg><p>x").contains(&"unexpected-start-tag".to_string()));
}

#[test]
fn test_font_with_color_breaks_out() {
    let document = document("<svg><font color=red>x</font></svg>");
    let font = document.query("font")[0];
    let element = document.tree.as_element(font).expect("font element");
    assert_eq!(element.namespace, Namespace::Html);
}

#[test]
fn test_mathml_integration_points() {
    assert_eq!(
        dump("<math><mi>x</mi><annotation-xml encoding=\"text/html\"><div>y</div></annotation-xml></math>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <math math>",
            "|       <math mi>",
            "|         \"x\"",
            "|       <math annotation-xml>",
            "|         encoding=\"text/html\"",
            "|         <div>",
            "|           \"y\"",
        ])
    );
}

#[test]
fn test_cdata_is_text_in_svg() {
    assert_eq!(
        dump("<svg><![CDATA[a<b]]></svg>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       \"a<b\"",
        ])
    );
}

#[test]
fn test_self_closing_foreign_element_is_not_left_open() {
    assert_eq!(
        dump("<svg><circle/></svg>x"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       <svg circle>",
            "|     \"x\"",
        ])
    );
}

#[test]
fn test_foreign_end_tag_is_case_insensitive() {
    let document = document("<svg><linearGradient></LINEARGRADIENT>x</svg>");
    let svg = document.query("svg")[0];
    let children = document.tree.children(svg);
    assert_eq!(children.len(), 2);
    assert_eq!(document.tree.tag_name(children[0]), Some("linearGradient"));
    assert_eq!(document.tree.as_text(children[1]), Some("x"));
}

// ========== Templates ==========

#[test]
fn test_template_contents_are_a_fragment() {
    assert_eq!(
        dump("<template><p>a</p></template>"),
        lines(&[
            "| <html>",
            "|   <head>",
            "|     <template>",
            "|       content",
            "|         <p>",
            "|           \"a\"",
            "|   <body>",
        ])
    );
}

#[test]
fn test_template_children_not_in_tree() {
    let document = document("<body><template><span>x</span></template>");
    let template = document.query("template")[0];
    assert!(document.tree.children(template).is_empty());
    let contents = document.tree.template_contents(template).expect("contents");
    assert_eq!(document.tree.text_content(contents), "x");
}

#[test]
fn test_stray_template_end_tag() {
    assert!(error_codes("<body></template>").contains(&"unexpected-end-tag".to_string()));
}

// ========== Framesets ==========

#[test]
fn test_frameset_document() {
    assert_eq!(
        dump("<!DOCTYPE html><frameset><frame src=a></frameset>"),
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <frameset>",
            "|     <frame>",
            "|       src=\"a\"",
        ])
    );
}

#[test]
fn test_text_in_frameset_keeps_only_whitespace() {
    let html = "<!DOCTYPE html><frameset> a </frameset>";
    let document = document(html);
    let frameset = document.query("frameset")[0];
    assert_eq!(document.tree.text_content(frameset), "  ");
    assert_eq!(error_codes(html), ["unexpected-char-in-frameset"]);
}

#[test]
fn test_content_after_frameset_is_dropped() {
    let html = "<!DOCTYPE html><frameset></frameset><p>x</html><!--c-->y";
    let document = document(html);
    assert!(document.query("p").is_empty());
    let last = document.tree.last_child(NodeId::ROOT).expect("root child");
    assert_eq!(document.tree.get(last).map(|n| n.node_type.node_name()), Some("#comment"));
    let codes = error_codes(html);
    assert_eq!(
        codes
            .iter()
            .filter(|code| code.as_str() == "unexpected-token-after-frameset")
            .count(),
        2
    );
}

#[test]
fn test_unclosed_frameset_at_eof() {
    assert!(error_codes("<!DOCTYPE html><frameset>").contains(&"eof-in-frameset".to_string()));
}

// ========== After body ==========

#[test]
fn test_comment_after_body_goes_on_html() {
    assert_eq!(
        dump("<body></body><!--c-->"),
        lines(&["| <html>", "|   <head>", "|   <body>", "|   <!-- c -->"])
    );
}

#[test]
fn test_comment_after_html_goes_on_document() {
    assert_eq!(
        dump("<body></body></html><!--c-->"),
        lines(&["| <html>", "|   <head>", "|   <body>", "| <!-- c -->"])
    );
}

#[test]
fn test_text_after_body_reopens_body() {
    assert_eq!(
        dump("<body>a</body></html>b"),
        lines(&["| <html>", "|   <head>", "|   <body>", "|     \"ab\""])
    );
}

#[test]
fn test_content_after_body_is_reported() {
    let codes = error_codes("<!DOCTYPE html><body></body>x");
    assert_eq!(codes, ["unexpected-char-after-body"]);
    let codes = error_codes("<!DOCTYPE html><body></body></html><p>");
    assert_eq!(codes, ["unexpected-token-after-body"]);
    assert!(error_codes("<!DOCTYPE html><body></body> <!--c-->").is_empty());
}

// ========== Fragments ==========

#[test]
fn test_fragment_has_no_implied_structure() {
    let document = parse("<td>x</td><p>y", &ParseOptions::default().with_fragment())
        .expect("non-strict parse");
    assert!(document.tree.is_fragment());
    assert_eq!(
        document.to_test_format(),
        lines(&["| <td>", "|   \"x\"", "| <p>", "|   \"y\""])
    );
}

#[test]
fn test_textarea_fragment_is_raw_text() {
    assert_eq!(
        fragment_dump("<b>bold</b>", FragmentContext::new("textarea")),
        "| \"<b>bold</b>\""
    );
}

#[test]
fn test_plaintext_fragment() {
    assert_eq!(
        fragment_dump("</plaintext>", FragmentContext::new("PLAINTEXT")),
        "| \"</plaintext>\""
    );
}

#[test]
fn test_svg_fragment_context() {
    assert_eq!(
        fragment_dump(
            "<circle r=\"1\"/><![CDATA[x]]>",
            FragmentContext::new("svg").with_namespace(Namespace::Svg)
        ),
        lines(&["| <svg circle>", "|   r=\"1\"", "| \"x\""])
    );
}

#[test]
fn test_fragment_has_no_doctype_errors() {
    let document = parse(
        "<span>x</span>",
        &ParseOptions::default().with_fragment().with_collect_errors(true),
    )
    .expect("non-strict parse");
    assert!(document.errors.is_empty());
    assert_eq!(document.quirks_mode, QuirksMode::NoQuirks);
}

// ========== Errors ==========

#[test]
fn test_duplicate_attribute_reported_once() {
    let html = r#"<!DOCTYPE html><a href="1" href="2">x</a>"#;
    let document = parse(html, &ParseOptions::default().with_collect_errors(true))
        .expect("non-strict parse");
    assert_eq!(document.errors.len(), 1);
    assert_eq!(document.errors[0].code, "duplicate-attribute");
    let a = document.query("a")[0];
    let element = document.tree.as_element(a).expect("a element");
    assert_eq!(element.attrs.get("href").map(String::as_str), Some("1"));
}

#[test]
fn test_tokenizer_errors_come_first() {
    let codes = error_codes("<a b b>");
    assert_eq!(codes[0], "duplicate-attribute");
    assert_eq!(codes[1], "expected-doctype-but-got-start-tag");
}

#[test]
fn test_unclosed_element_at_eof() {
    let codes = error_codes("<!DOCTYPE html><div>x");
    assert_eq!(codes, ["expected-closing-tag-but-got-eof"]);
    assert!(error_codes("<!DOCTYPE html><p>x").is_empty());
    assert!(error_codes("<!DOCTYPE html><ul><li>x</ul>").is_empty());
}

#[test]
fn test_truncated_start_tag_is_inserted() {
    assert_eq!(
        dump("<!DOCTYPE html><div class=\"a"),
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <div>",
            "|       class=\"a\"",
        ])
    );
    let codes = error_codes("<!DOCTYPE html><div class=\"a");
    assert_eq!(codes[0], "eof-in-tag");
}

#[test]
fn test_truncated_end_tag_is_processed() {
    assert_eq!(
        dump("<!DOCTYPE html><div>x</di"),
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <div>",
            "|       \"x\"",
        ])
    );
    let codes = error_codes("<!DOCTYPE html><div>x</di");
    assert_eq!(codes[0], "eof-in-tag");
    assert!(codes.contains(&"unexpected-end-tag".to_string()));
}

#[test]
fn test_tree_errors_carry_tag_name() {
    let document = parse(
        "<!DOCTYPE html></span>",
        &ParseOptions::default().with_collect_errors(true),
    )
    .expect("non-strict parse");
    assert_eq!(document.errors.len(), 1);
    assert!(document.errors[0].message.contains("span"));
    assert_eq!(document.errors[0].line, None);
}

#[test]
fn test_clean_document_has_no_errors() {
    let html = "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>";
    assert!(error_codes(html).is_empty());
}

// ========== Strict mode ==========

#[test]
fn test_strict_mode_fails_on_first_error() {
    let error = parse("<p>x", &ParseOptions::default().with_strict(true))
        .expect_err("strict parse of a document without a doctype");
    assert_eq!(error.error.code, "expected-doctype-but-got-start-tag");
}

#[test]
fn test_strict_mode_points_at_source_line() {
    let html = "<!DOCTYPE html>\n<a b b>";
    let error = parse(html, &ParseOptions::default().with_strict(true))
        .expect_err("strict parse with a duplicate attribute");
    assert_eq!(error.error.code, "duplicate-attribute");
    assert_eq!(error.error.line, Some(2));
    assert_eq!(error.source_line.as_deref(), Some("<a b b>"));
}

#[test]
fn test_strict_mode_source_line_after_carriage_returns() {
    let html = "<!DOCTYPE html>\r<p>\r\n<a x=1 x=2>";
    let error = parse(html, &ParseOptions::default().with_strict(true))
        .expect_err("strict parse with a duplicate attribute");
    assert_eq!(error.error.code, "duplicate-attribute");
    assert_eq!(error.error.line, Some(3));
    assert_eq!(error.source_line.as_deref(), Some("<a x=1 x=2>"));
}

#[test]
fn test_strict_mode_source_line_without_bom() {
    let html = "\u{FEFF}<a x=1 x=2>";
    let error = parse(html, &ParseOptions::default().with_strict(true))
        .expect_err("strict parse with a duplicate attribute");
    assert_eq!(error.source_line.as_deref(), Some("<a x=1 x=2>"));
    let annotated = error.annotated_source().expect("position is known");
    let caret_line = annotated.lines().nth(1).expect("caret line");
    let column = error.error.column.expect("column");
    assert_eq!(caret_line.find('^'), Some(column - 1));
}

#[test]
fn test_strict_mode_accepts_clean_document() {
    let document = parse(
        "<!DOCTYPE html><title>t</title><p>x</p>",
        &ParseOptions::default().with_strict(true),
    )
    .expect("clean document");
    assert_eq!(document.query("p").len(), 1);
}

// ========== Byte input ==========

#[test]
fn test_parse_bytes_reports_encoding() {
    let bytes = b"<meta charset=windows-1252><p>caf\xE9";
    let document = wombat_html::parse_bytes(bytes, &ParseOptions::default())
        .expect("non-strict parse");
    assert_eq!(document.encoding.as_deref(), Some("windows-1252"));
    let p = document.query("p")[0];
    assert_eq!(document.tree.text_content(p), "caf\u{E9}");
}

#[test]
fn test_parse_bytes_transport_encoding() {
    let document = wombat_html::parse_bytes(
        "<p>\u{E9}".as_bytes(),
        &ParseOptions::default().with_transport_encoding("utf-8"),
    )
    .expect("non-strict parse");
    assert_eq!(document.encoding.as_deref(), Some("UTF-8"));
    assert_eq!(document.to_text("", true), "\u{E9}");
}

#[test]
fn test_parse_leaves_encoding_unset() {
    assert_eq!(document("<p>x").encoding, None);
}

// ========== Properties ==========

#[quickcheck]
fn prop_document_always_has_html_root(input: String) -> bool {
    let document = document(&input);
    document
        .tree
        .document_element()
        .and_then(|html| document.tree.tag_name(html))
        == Some("html")
}

#[quickcheck]
fn prop_fragment_parse_never_fails(input: String) -> bool {
    parse(&input, &ParseOptions::default().with_fragment().with_collect_errors(true))
        .is_ok_and(|document| document.tree.is_fragment())
}

#[quickcheck]
fn prop_text_survives(input: String) -> bool {
    let text: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let html = format!("<!DOCTYPE html><p>{text}</p>");
    document(&html).to_text("", false) == text
}
