//! Integration tests for HTML and XML tree construction.

use std::time::{Duration, Instant};

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use sift_dom::{Attributes, DomTree, ElementData, NodeId, NodeType, QuirksMode, Tag};
use sift_html::{
    Parser, parse_body_fragment, parse_document, parse_fragment, parse_xml_document,
    parse_xml_fragment,
};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html, "")
}

/// Helper to get the first element with a tag name, in document order
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    tree.descendants(from)
        .find(|&id| tree.tag_name(id) == Some(tag))
}

/// Helper to get every element with a tag name, in document order
fn find_all_elements(tree: &DomTree, from: NodeId, tag: &str) -> Vec<NodeId> {
    tree.descendants(from)
        .filter(|&id| tree.tag_name(id) == Some(tag))
        .collect()
}

/// Helper to serialize the children of `body`
fn body_html(html: &str) -> String {
    let tree = parse(html);
    let body = tree.body().expect("document has a body");
    tree.inner_html(body)
}

fn context(name: &str) -> ElementData {
    ElementData::new(Tag::html(name), Attributes::new())
}

// ====================================================================
// Document structure
// ====================================================================

#[test]
fn test_document_structure() {
    let tree = parse("<!DOCTYPE html><title>T</title><p>x");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<!doctype html><html><head><title>T</title></head><body><p>x</p></body></html>"
    );
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|node| &node.node_type),
        Some(NodeType::Document)
    ));
}

#[test]
fn test_empty_input_builds_skeleton() {
    let tree = parse("");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><body></body></html>"
    );
}

#[test]
fn test_comment_before_html_goes_to_document() {
    let tree = parse("<!--a--><html><body></body></html><!--b-->");
    let children = tree.children(NodeId::ROOT);
    assert_eq!(children.len(), 3);
    assert!(matches!(
        tree.get(children[0]).map(|node| &node.node_type),
        Some(NodeType::Comment(text)) if text == "a"
    ));
    assert!(matches!(
        tree.get(children[2]).map(|node| &node.node_type),
        Some(NodeType::Comment(text)) if text == "b"
    ));
}

#[test]
fn test_head_elements_stay_in_head() {
    let tree = parse("<meta charset=utf-8><link rel=x><style>a>b{}</style><p>x");
    let head = tree.head().expect("head");
    assert_eq!(tree.element_children(head).count(), 3);
    let style = find_element(&tree, head, "style").expect("style");
    assert_eq!(tree.data(style), "a>b{}");
}

#[test]
fn test_entities_in_text_and_attributes() {
    let tree = parse("<p title=\"a&amp;b\">&amp;&lt;&copy;</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(tree.text(p), "&<\u{A9}");
    assert_eq!(tree.as_element(p).and_then(|e| e.attr("title")), Some("a&b"));
}

// ====================================================================
// Implied end tags
// ====================================================================

#[test]
fn test_paragraphs_close_each_other() {
    assert_eq!(body_html("<p>a<p>b"), "<p>a</p><p>b</p>");
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        body_html("<ul><li>a<li>b</ul>"),
        "<ul><li>a</li><li>b</li></ul>"
    );
    assert_eq!(
        body_html("<dl><dt>a<dd>b<dt>c</dl>"),
        "<dl><dt>a</dt><dd>b</dd><dt>c</dt></dl>"
    );
}

#[test]
fn test_block_closes_open_paragraph() {
    assert_eq!(body_html("<p>a<div>b</div>"), "<p>a</p><div>b</div>");
}

#[test]
fn test_stray_end_p_in_body_creates_empty_paragraph() {
    assert_eq!(body_html("a</p>x"), "a<p></p>x");

    let tree = parse_body_fragment("</p>x", "");
    assert_eq!(tree.inner_html(tree.body().unwrap()), "<p></p>x");
}

#[test]
fn test_stray_end_p_before_html_is_ignored() {
    assert_eq!(body_html("</p>x"), "x");
}

#[test]
fn test_stray_end_br_becomes_br() {
    assert_eq!(body_html("a</br>b"), "a<br>b");
}

#[test]
fn test_image_becomes_img() {
    assert_eq!(body_html("<image src=a.png>"), "<img src=\"a.png\">");
}

// ====================================================================
// Raw text elements
// ====================================================================

#[test]
fn test_title_is_rcdata() {
    let tree = parse("<title>My <test> &amp; Title</title>");
    let title = find_element(&tree, NodeId::ROOT, "title").expect("title");
    assert_eq!(tree.text(title), "My <test> & Title");
}

#[test]
fn test_script_content_is_data() {
    let tree = parse("<script>if (a<b) { x = '</p>'; }</script>");
    let script = find_element(&tree, NodeId::ROOT, "script").expect("script");
    assert_eq!(tree.data(script), "if (a<b) { x = '</p>'; }");
    assert_eq!(tree.text(script), "");
}

#[test]
fn test_leading_newline_dropped_in_textarea_and_pre() {
    let tree = parse("<textarea>\nx</textarea><pre>\n\ny</pre>");
    let textarea = find_element(&tree, NodeId::ROOT, "textarea").expect("textarea");
    let pre = find_element(&tree, NodeId::ROOT, "pre").expect("pre");
    assert_eq!(tree.inner_html(textarea), "x");
    assert_eq!(tree.inner_html(pre), "\ny");
}

// ====================================================================
// Tables
// ====================================================================

#[test]
fn test_table_gets_tbody() {
    assert_eq!(
        body_html("<table><tr><td>1<td>2</table>"),
        "<table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
    );
}

#[test]
fn test_foster_parenting_of_formatting_element() {
    assert_eq!(
        body_html("<table><b>X</b></table>"),
        "<b>X</b><table></table>"
    );
}

#[test]
fn test_foster_parenting_of_text() {
    assert_eq!(
        body_html("<table>A<tr><td>B</td></tr></table>"),
        "A<table><tbody><tr><td>B</td></tr></tbody></table>"
    );
}

#[test]
fn test_table_whitespace_stays_in_table() {
    assert_eq!(
        body_html("<table> <tr><td>x</td></tr></table>"),
        "<table> <tbody><tr><td>x</td></tr></tbody></table>"
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        body_html("<table><caption>c<col><tr><td>x</table>"),
        "<table><caption>c</caption><colgroup><col></colgroup><tbody><tr><td>x</td></tr></tbody></table>"
    );
}

#[test]
fn test_table_closes_paragraph_unless_quirks() {
    assert_eq!(
        body_html("<!DOCTYPE html><p><table></table>"),
        "<p></p><table></table>"
    );
    assert_eq!(body_html("<p><table></table>"), "<p><table></table></p>");
}

// ====================================================================
// Adoption Agency Algorithm Tests
// ====================================================================

#[test]
fn test_adoption_agency_simple_misnesting() {
    assert_eq!(
        body_html("<p><b>X<i>Y</b>Z</i></p>"),
        "<p><b>X<i>Y</i></b><i>Z</i></p>"
    );
}

#[test]
fn test_adoption_agency_with_furthest_block() {
    assert_eq!(body_html("<a><p>X</a>Y"), "<a></a><p><a>X</a>Y</p>");
}

#[test]
fn test_adoption_agency_no_furthest_block() {
    assert_eq!(
        body_html("<p><b><i>text</b></p>"),
        "<p><b><i>text</i></b></p>"
    );
}

#[test]
fn test_formatting_reconstruction_across_blocks() {
    assert_eq!(
        body_html("<p><b>bold</p><p>still bold</p>"),
        "<p><b>bold</b></p><p><b>still bold</b></p>"
    );
}

#[test]
fn test_nested_anchor_closes_previous() {
    assert_eq!(body_html("<a>1<a>2"), "<a>1</a><a>2</a>");
}

#[test]
fn test_noahs_ark_limits_duplicates() {
    let tree = parse("<p><b><b><b><b><b></p><p>x");
    let ps = find_all_elements(&tree, NodeId::ROOT, "p");
    assert_eq!(ps.len(), 2);
    assert_eq!(find_all_elements(&tree, ps[0], "b").len(), 5);
    // Only three identical entries survive in the list, so three are rebuilt.
    assert_eq!(find_all_elements(&tree, ps[1], "b").len(), 3);
}

#[test]
fn test_adoption_agency_terminates_on_deep_misnesting() {
    let mut html = "<b><i>".repeat(1000);
    html.push('x');
    for _ in 0..1000 {
        html.push_str("</b><p>y</i>");
    }
    let tree = parse(&html);

    // Every parent chain ends at the root within the arena size.
    let limit = tree.len();
    for id in tree.descendants(NodeId::ROOT) {
        assert!(tree.ancestors(id).take(limit + 1).count() <= limit);
        assert!(tree.is_descendant_of(id, NodeId::ROOT) || id == NodeId::ROOT);
    }
    assert!(tree.text(NodeId::ROOT).starts_with('x'));
}

#[test]
fn test_deep_nesting_parses_in_linear_time() {
    let depth = 100_000;
    let start = Instant::now();
    let tree = parse(&"<div>".repeat(depth));
    let elapsed = start.elapsed();

    assert_eq!(find_all_elements(&tree, NodeId::ROOT, "div").len(), depth);
    assert!(
        elapsed < Duration::from_secs(10),
        "parsing {depth} nested divs took {elapsed:?}"
    );
}

#[test]
fn test_scope_checks_stop_at_search_depth() {
    // The outer p is too far down the stack to be closed by </p>.
    let mut html = String::from("<p>");
    html.push_str(&"<span>".repeat(150));
    html.push_str("</p>x");
    let tree = parse(&html);

    assert_eq!(find_all_elements(&tree, NodeId::ROOT, "p").len(), 2);
}

// ====================================================================
// Foreign content
// ====================================================================

#[test]
fn test_svg_names_are_adjusted() {
    assert_eq!(
        body_html("<svg viewbox=\"0 0 1 1\"><foreignobject><p>x</p></foreignobject></svg>"),
        "<svg viewBox=\"0 0 1 1\"><foreignObject><p>x</p></foreignObject></svg>"
    );
}

#[test]
fn test_breakout_tag_leaves_svg() {
    assert_eq!(body_html("<svg><p>x</p></svg>"), "<svg></svg><p>x</p>");
}

#[test]
fn test_cdata_in_foreign_content() {
    assert_eq!(body_html("<svg><![CDATA[a<b]]></svg>"), "<svg>a&lt;b</svg>");
    assert_eq!(body_html("<div><![CDATA[a]]></div>"), "<div><!--[CDATA[a]]--></div>");
}

#[test]
fn test_foreign_elements_get_namespace() {
    let tree = parse("<math><mi>x</mi></math><svg><circle/></svg>");
    let mi = find_element(&tree, NodeId::ROOT, "mi").expect("mi");
    let circle = find_element(&tree, NodeId::ROOT, "circle").expect("circle");
    assert_eq!(
        tree.as_element(mi).map(|e| e.namespace),
        Some(sift_dom::Namespace::MathMl)
    );
    assert_eq!(
        tree.as_element(circle).map(|e| e.namespace),
        Some(sift_dom::Namespace::Svg)
    );
    assert!(tree.children(circle).is_empty());
}

// ====================================================================
// Select, template and frameset
// ====================================================================

#[test]
fn test_select_options() {
    assert_eq!(
        body_html("<select><option>a<option>b</select>"),
        "<select><option>a</option><option>b</option></select>"
    );
    assert_eq!(
        body_html("<select><optgroup><option>a<optgroup><option>b</select>"),
        "<select><optgroup><option>a</option></optgroup><optgroup><option>b</option></optgroup></select>"
    );
}

#[test]
fn test_input_closes_select() {
    assert_eq!(
        body_html("<select><option>a<input>"),
        "<select><option>a</option></select><input>"
    );
}

#[test]
fn test_template_contents() {
    assert_eq!(
        body_html("<body><template><td>x</td></template>"),
        "<template><td>x</td></template>"
    );
}

#[test]
fn test_frameset_replaces_body() {
    let tree = parse("<frameset><frame></frameset>");
    let body = tree.body().expect("frameset");
    assert_eq!(tree.tag_name(body), Some("frameset"));
    assert_eq!(tree.inner_html(body), "<frame>");
    assert!(find_element(&tree, NodeId::ROOT, "body").is_none());
}

// ====================================================================
// Quirks mode
// ====================================================================

#[test]
fn test_quirks_mode_detection() {
    assert_eq!(parse("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#)
            .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
    assert_eq!(
        parse(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#).quirks_mode(),
        QuirksMode::Quirks
    );
}

// ====================================================================
// Fragments
// ====================================================================

#[test]
fn test_body_fragment_nodes() {
    let fragment = parse_fragment("<li>a</li>text<!--c-->", None, "");
    assert_eq!(fragment.nodes.len(), 3);
    assert_eq!(fragment.tree.outer_html(fragment.nodes[0]), "<li>a</li>");
    assert_eq!(fragment.tree.as_text(fragment.nodes[1]), Some("text"));
    assert!(find_element(&fragment.tree, NodeId::ROOT, "html").is_none());
}

#[test]
fn test_fragment_in_row_context() {
    let fragment = parse_fragment("<td>x</td><td>y", Some(&context("tr")), "");
    assert_eq!(fragment.nodes.len(), 2);
    assert_eq!(fragment.tree.outer_html(fragment.nodes[1]), "<td>y</td>");
}

#[test]
fn test_fragment_in_title_context_is_text() {
    let fragment = parse_fragment("<b>x</b>", Some(&context("title")), "");
    assert_eq!(fragment.nodes.len(), 1);
    assert_eq!(fragment.tree.as_text(fragment.nodes[0]), Some("<b>x</b>"));
}

#[test]
fn test_fragment_end_html_is_ignored() {
    let fragment = parse_fragment("a</html>b", None, "");
    assert_eq!(fragment.tree.inner_html(NodeId::ROOT), "ab");
}

#[test]
fn test_parse_body_fragment_builds_shell() {
    let tree = parse_body_fragment("<p>x</p>y", "");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<html><head></head><body><p>x</p>y</body></html>"
    );
    assert!(tree.body().is_some());
}

// ====================================================================
// Errors
// ====================================================================

#[test]
fn test_error_tracking() {
    let mut parser = Parser::html();
    assert!(!parser.is_track_errors());
    let _ = parser.parse_input("<p></b>", "");
    assert!(parser.errors().is_empty());

    let _ = parser.set_track_errors(10);
    assert!(parser.is_track_errors());
    let _ = parser.parse_input("<p></b>", "");
    assert!(!parser.errors().is_empty());
    assert!(
        parser
            .errors()
            .iter()
            .any(|error| error.message.contains("EndTag"))
    );
}

#[test]
fn test_error_tracking_is_bounded() {
    let mut parser = Parser::html();
    let _ = parser.set_track_errors(2);
    let _ = parser.parse_input("</a></b></c></d></e>", "");
    assert_eq!(parser.errors().len(), 2);
}

#[test]
fn test_valid_document_has_no_errors() {
    let mut parser = Parser::html();
    let _ = parser.set_track_errors(10);
    let _ = parser.parse_input(
        "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>",
        "",
    );
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
}

// ====================================================================
// XML
// ====================================================================

#[test]
fn test_xml_document_keeps_structure() {
    let tree = parse_xml_document("<Root><Item/><p><div>x</div></p></Root>", "");
    assert_eq!(
        tree.outer_html(NodeId::ROOT),
        "<Root><Item /><p><div>x</div></p></Root>"
    );
}

#[test]
fn test_xml_fragment_nodes() {
    let fragment = parse_xml_fragment("<a>1</a><b>2</b>", "");
    assert_eq!(fragment.nodes.len(), 2);
    assert_eq!(fragment.tree.tag_name(fragment.nodes[1]), Some("b"));
}

#[test]
fn test_xml_parser_tracks_errors() {
    let mut parser = Parser::xml();
    let _ = parser.set_track_errors(5);
    let _ = parser.parse_input("<a></b></a>", "");
    assert_eq!(parser.errors().len(), 1);
}

// ====================================================================
// Round trip and totality
// ====================================================================

#[test]
fn test_serialize_round_trip() {
    let html = "<!doctype html><html><head><title>T</title></head><body>\
                <div id=\"a\" class=\"x y\"><p>One <b>two</b> &amp; three</p>\
                <ul><li>3</li></ul><img src=\"i.png\" alt=\"\"><br></div></body></html>";
    let first = parse(html).outer_html(NodeId::ROOT);
    let second = parse(&first).outer_html(NodeId::ROOT);
    assert_eq!(first, second);
    assert_eq!(first, html);
}

/// Markup assembled from tag soup pieces, to reach deep into the builder.
#[derive(Debug, Clone)]
struct TagSoup(String);

impl Arbitrary for TagSoup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<a href=x>", "</a>", "<table>",
            "</table>", "<tr>", "<td>", "</td>", "<caption>", "<col>", "<select>", "<option>",
            "</select>", "<template>", "</template>", "<svg>", "</svg>", "<math>", "<mi>",
            "<foreignObject>", "<frameset>", "<frame>", "<li>", "<ul>", "</ul>", "<form>",
            "</form>", "<textarea>", "<title>", "<script>", "</script>", "<!--c-->",
            "<!DOCTYPE html>", "<body>", "</body>", "</html>", "<head>", "x", " ", "&amp;",
            "<![CDATA[z]]>", "<h1>", "</h2>", "<nobr>", "<button>", "<marquee>", "<pre>\n",
        ];
        let length = usize::arbitrary(g) % 40;
        let soup = (0..length)
            .filter_map(|_| g.choose(PIECES).copied())
            .collect();
        Self(soup)
    }
}

#[quickcheck]
fn parse_document_is_total(input: String) -> bool {
    let tree = parse(&input);
    tree.document_element().is_some()
}

#[quickcheck]
fn tag_soup_parses_into_a_tree(soup: TagSoup) -> bool {
    let tree = parse(&soup.0);
    let limit = tree.len();
    tree.document_element().is_some()
        && tree
            .descendants(NodeId::ROOT)
            .all(|id| tree.ancestors(id).take(limit + 1).count() <= limit)
}

#[quickcheck]
fn fragments_are_total(soup: TagSoup, context_name: u8) -> bool {
    const CONTEXTS: &[&str] = &["body", "table", "tr", "select", "template", "title", "svg"];
    let name = CONTEXTS[usize::from(context_name) % CONTEXTS.len()];
    let fragment = parse_fragment(&soup.0, Some(&context(name)), "");
    fragment.nodes.len() == fragment.tree.children(NodeId::ROOT).len()
}
