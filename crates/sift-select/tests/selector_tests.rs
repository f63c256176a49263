//! Integration tests for selector compilation and matching.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use sift_dom::{DomTree, NodeId};
use sift_html::{parse_document, parse_xml_document};
use sift_select::{
    Evaluator, NthKind, SelectorParseError, collect, compile_selector, filter_out, is, select,
    select_all,
};

fn parse(html: &str) -> DomTree {
    parse_document(html, "")
}

/// Helper to run a query from the document root and return the `id` of each match
fn ids(tree: &DomTree, query: &str) -> Vec<String> {
    ids_under(tree, query, tree.root())
}

fn ids_under(tree: &DomTree, query: &str, root: NodeId) -> Vec<String> {
    select(query, tree, root)
        .unwrap()
        .into_iter()
        .map(|id| id_of(tree, id))
        .collect()
}

fn id_of(tree: &DomTree, node: NodeId) -> String {
    tree.as_element(node)
        .and_then(|el| el.id())
        .unwrap_or_default()
        .to_string()
}

/// Helper to find the first element with the given id
fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(tree.root())
        .find(|&node| tree.as_element(node).and_then(|el| el.id()) == Some(id))
        .unwrap()
}

// ====================================================================
// Compilation
// ====================================================================

#[test]
fn test_compile_blank_query_fails() {
    assert_eq!(
        compile_selector("").unwrap_err(),
        SelectorParseError::Empty("query".to_string())
    );
    assert!(matches!(
        compile_selector("   "),
        Err(SelectorParseError::Empty(_))
    ));
}

#[test]
fn test_compile_unterminated_brackets_fail() {
    assert!(matches!(
        compile_selector("div["),
        Err(SelectorParseError::Unbalanced { open: '[', .. })
    ));
    assert!(matches!(
        compile_selector("li:nth-child(2"),
        Err(SelectorParseError::Unbalanced { open: '(', .. })
    ));
}

#[test]
fn test_compile_dangling_combinator_fails() {
    assert!(matches!(
        compile_selector("div >"),
        Err(SelectorParseError::Empty(_))
    ));
    assert!(matches!(
        compile_selector("a > > b"),
        Err(SelectorParseError::Empty(_))
    ));
}

#[test]
fn test_compile_empty_arguments_fail() {
    for query in ["p:has()", "p:not( )", "p:contains()", "p:matches()"] {
        assert!(
            matches!(compile_selector(query), Err(SelectorParseError::Empty(_))),
            "{query} should not compile"
        );
    }
}

#[test]
fn test_compile_bad_arguments_fail() {
    assert!(matches!(
        compile_selector("li:nth-child(x)"),
        Err(SelectorParseError::BadFormula(_))
    ));
    assert!(matches!(
        compile_selector("li:lt(a)"),
        Err(SelectorParseError::BadIndex(_))
    ));
    assert!(matches!(
        compile_selector("p:matches([)"),
        Err(SelectorParseError::InvalidRegex { .. })
    ));
    assert_eq!(
        compile_selector("p:bogus").unwrap_err(),
        SelectorParseError::UnknownPseudo("bogus".to_string())
    );
}

#[test]
fn test_compile_unexpected_tokens_fail() {
    for query in ["a,", "div)", "#", "p..x", "!p"] {
        assert!(
            matches!(
                compile_selector(query),
                Err(SelectorParseError::UnexpectedToken { .. })
            ),
            "{query} should not compile"
        );
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        SelectorParseError::Empty("query".to_string()).to_string(),
        "query must not be empty"
    );
    let err = compile_selector("div)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not parse query 'div)': unexpected token at ')'"
    );
}

#[test]
fn test_compile_builds_nth_evaluator() {
    assert!(matches!(
        compile_selector(":nth-last-of-type(-n+3)").unwrap(),
        Evaluator::Nth {
            kind: NthKind::LastOfType,
            a: -1,
            b: 3
        }
    ));
}

#[test]
fn test_evaluator_is_shareable() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<Evaluator>();
}

// ====================================================================
// Simple selectors
// ====================================================================

#[test]
fn test_tag_id_and_class() {
    let tree =
        parse(r#"<div id=a class="Note wide"></div><p id=b class=note></p><DIV id=c></DIV>"#);
    assert_eq!(ids(&tree, "div"), ["a", "c"]);
    assert_eq!(ids(&tree, "DIV"), ["a", "c"]);
    assert_eq!(ids(&tree, "#b"), ["b"]);
    assert!(ids(&tree, "#B").is_empty());
    assert_eq!(ids(&tree, ".note"), ["a", "b"]);
    assert_eq!(ids(&tree, "div.wide#a"), ["a"]);
    assert!(ids(&tree, "p.wide").is_empty());
}

#[test]
fn test_universal_selector_includes_document_element() {
    let tree = parse("<p></p>");
    let all = select("*", &tree, tree.root()).unwrap();
    let names: Vec<&str> = all.iter().filter_map(|&n| tree.tag_name(n)).collect();
    assert_eq!(names, ["html", "head", "body", "p"]);
}

#[test]
fn test_attribute_selectors() {
    let tree = parse(
        r#"<a id=x href="https://Example.com/a.PNG" data-k=v title="One Two"></a><a id=y></a>"#,
    );
    assert_eq!(ids(&tree, "[href]"), ["x"]);
    assert_eq!(ids(&tree, "[HREF]"), ["x"]);
    assert_eq!(ids(&tree, "[^data-]"), ["x"]);
    assert_eq!(ids(&tree, r#"[title="one two"]"#), ["x"]);
    assert_eq!(ids(&tree, "[title='One Two']"), ["x"]);
    assert_eq!(ids(&tree, "[href^=https]"), ["x"]);
    assert_eq!(ids(&tree, "[href$=.png]"), ["x"]);
    assert_eq!(ids(&tree, "[href*=example]"), ["x"]);
    assert_eq!(ids(&tree, r"[title~=^One\s]"), ["x"]);
    assert!(ids(&tree, "[title~=^one]").is_empty());
}

#[test]
fn test_attribute_not_equal_includes_missing() {
    let tree = parse("<a id=x title=t></a><a id=y></a><a id=z title=u></a>");
    assert_eq!(ids(&tree, "a[title!=t]"), ["y", "z"]);
}

#[test]
fn test_attribute_values_fold_non_ascii_case() {
    let tree = parse("<p id=a title='Émile'></p><p id=b title='émile'></p><p id=c title='Zoë'></p>");
    assert_eq!(ids(&tree, "p[title=Émile]"), ["a", "b"]);
    assert_eq!(ids(&tree, "p[title=ÉMILE]"), ["a", "b"]);
    assert_eq!(ids(&tree, "p[title!=Émile]"), ["c"]);
    assert_eq!(ids(&tree, "p[title=ZOË]"), ["c"]);
    assert_eq!(ids(&tree, "p[title^=Ém]"), ["a", "b"]);
}

#[test]
fn test_namespaced_tags() {
    let tree = parse_xml_document(
        r#"<root><ns:item id="i"/><item id="j"/><other id="k"/></root>"#,
        "",
    );
    assert_eq!(ids(&tree, "ns|item"), ["i"]);
    assert_eq!(ids(&tree, "*|item"), ["i", "j"]);
}

#[test]
fn test_svg_elements_are_selectable() {
    let tree = parse("<svg><circle id=c></circle></svg>");
    assert_eq!(ids(&tree, "svg circle"), ["c"]);
}

// ====================================================================
// Combinators
// ====================================================================

const NESTED: &str = "<div id=outer>
    <p class=note id=a></p>
    <section><p class=note id=b></p></section>
    <p id=c></p>
</div>
<p class=note id=d></p>";

#[test]
fn test_child_combinator() {
    let tree = parse(NESTED);
    assert_eq!(ids(&tree, "div > p.note"), ["a"]);
    assert_eq!(ids(&tree, "div>p"), ["a", "c"]);
}

#[test]
fn test_descendant_combinator() {
    let tree = parse(NESTED);
    assert_eq!(ids(&tree, "div p"), ["a", "b", "c"]);
    assert_eq!(ids(&tree, "body > div section p"), ["b"]);
}

#[test]
fn test_sibling_combinators() {
    let tree = parse("<h1 id=h></h1><p id=p1></p><span id=s></span><p id=p2></p>");
    assert_eq!(ids(&tree, "h1 + p"), ["p1"]);
    assert_eq!(ids(&tree, "h1 ~ p"), ["p1", "p2"]);
    assert_eq!(ids(&tree, "span + p"), ["p2"]);
    assert!(ids(&tree, "p + h1").is_empty());
}

#[test]
fn test_selector_list_is_in_document_order_without_duplicates() {
    let tree = parse("<p id=p1></p><h1 id=h></h1><p id=p2></p>");
    assert_eq!(ids(&tree, "h1, p"), ["p1", "h", "p2"]);
    assert_eq!(ids(&tree, "p, #p1"), ["p1", "p2"]);
}

#[test]
fn test_leading_combinator_is_relative_to_root() {
    let tree = parse(NESTED);
    let outer = by_id(&tree, "outer");
    assert_eq!(ids_under(&tree, "> p", outer), ["a", "c"]);
    assert_eq!(ids_under(&tree, "p", outer), ["a", "b", "c"]);
}

#[test]
fn test_leading_combinator_from_the_document() {
    let tree = parse(NESTED);
    let html = tree.document_element().unwrap();
    assert_eq!(select("> html", &tree, tree.root()).unwrap(), [html]);
    assert!(select("> body", &tree, tree.root()).unwrap().is_empty());
    assert_eq!(select("> body", &tree, html).unwrap(), [tree.body().unwrap()]);

    let top_level = compile_selector("> html").unwrap();
    assert!(is(&top_level, &tree, html));
    assert!(!is(&top_level, &tree, tree.body().unwrap()));
}

#[test]
fn test_descendant_stops_at_root() {
    let tree = parse(NESTED);
    let section = tree.parent(by_id(&tree, "b")).unwrap();
    assert!(ids_under(&tree, "div p", section).is_empty());
    assert_eq!(ids_under(&tree, "section p", section), ["b"]);
}

// ====================================================================
// Pseudo-classes
// ====================================================================

const LIST: &str = "<ul id=u><li id=l1></li><li id=l2></li><li id=l3></li>\
                    <li id=l4></li><li id=l5></li><li id=l6></li></ul>";

#[test]
fn test_nth_child() {
    let tree = parse(LIST);
    assert_eq!(ids(&tree, "li:nth-child(odd)"), ["l1", "l3", "l5"]);
    assert_eq!(ids(&tree, "li:nth-child(2n+1)"), ["l1", "l3", "l5"]);
    assert_eq!(ids(&tree, "li:nth-child(even)"), ["l2", "l4", "l6"]);
    assert_eq!(ids(&tree, "li:nth-child(3)"), ["l3"]);
    assert_eq!(ids(&tree, "li:nth-child(-n+2)"), ["l1", "l2"]);
    assert!(ids(&tree, "li:nth-child(0n+0)").is_empty());
    assert_eq!(ids(&tree, "li:nth-last-child(1)"), ["l6"]);
    assert_eq!(ids(&tree, "li:nth-last-child(-n+2)"), ["l5", "l6"]);
}

#[test]
fn test_index_pseudo_classes() {
    let tree = parse(LIST);
    assert_eq!(ids(&tree, "li:lt(2)"), ["l1", "l2"]);
    assert_eq!(ids(&tree, "li:gt(3)"), ["l5", "l6"]);
    assert_eq!(ids(&tree, "li:eq(0)"), ["l1"]);
}

#[test]
fn test_child_position_pseudo_classes() {
    let tree = parse(
        "<div id=d><p id=p1></p><span id=s1></span><p id=p2></p><span id=s2></span>\
         <em id=e></em></div><section><b id=only></b></section>",
    );
    assert_eq!(ids(&tree, "#d > :first-child"), ["p1"]);
    assert_eq!(ids(&tree, "#d > :last-child"), ["e"]);
    assert_eq!(ids(&tree, "p:first-of-type"), ["p1"]);
    assert_eq!(ids(&tree, "span:last-of-type"), ["s2"]);
    assert_eq!(ids(&tree, "p:nth-of-type(2)"), ["p2"]);
    assert_eq!(ids(&tree, "span:nth-last-of-type(2)"), ["s1"]);
    assert_eq!(ids(&tree, "#d > :only-of-type"), ["e"]);
    assert_eq!(ids(&tree, "b:only-child"), ["only"]);
    assert!(ids(&tree, "em:only-child").is_empty());
}

#[test]
fn test_positions_over_a_long_sibling_list() {
    const COUNT: usize = 20_000;
    let tree = parse(&format!("<ul>{}</ul>", "<li></li>".repeat(COUNT)));

    let started = Instant::now();
    let odd = select("li:nth-of-type(odd)", &tree, tree.root()).unwrap();
    let last = select("li:nth-last-child(1)", &tree, tree.root()).unwrap();
    let early = select("li:lt(3)", &tree, tree.root()).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(odd.len(), COUNT / 2);
    assert_eq!(last.len(), 1);
    assert_eq!(tree.next_sibling(last[0]), None);
    assert_eq!(early.len(), 3);
    assert!(
        elapsed < Duration::from_secs(5),
        "positional queries over {COUNT} siblings should be linear, took {elapsed:?}"
    );
}

#[test]
fn test_document_element_is_not_a_child() {
    let tree = parse("<p></p>");
    assert!(select("html:first-child", &tree, tree.root()).unwrap().is_empty());
    assert!(select("html:nth-child(1)", &tree, tree.root()).unwrap().is_empty());
}

#[test]
fn test_root_pseudo_class() {
    let tree = parse(LIST);
    let roots = select(":root", &tree, tree.root()).unwrap();
    assert_eq!(roots, vec![tree.document_element().unwrap()]);

    let list = by_id(&tree, "u");
    assert_eq!(select(":root", &tree, list).unwrap(), vec![list]);
}

#[test]
fn test_empty_pseudo_class() {
    let tree = parse("<p id=e1></p><p id=e2> </p><p id=e3><!--c--></p><p id=e4>x</p>");
    assert_eq!(ids(&tree, "p:empty"), ["e1", "e3"]);
}

#[test]
fn test_has_and_not() {
    let tree = parse("<div id=a><p class=x></p></div><div id=b><span></span></div>");
    assert_eq!(ids(&tree, "div:has(p.x)"), ["a"]);
    assert_eq!(ids(&tree, "div:has(> span)"), ["b"]);
    assert_eq!(ids(&tree, "div:not(#a)"), ["b"]);
    assert_eq!(ids(&tree, "div:not(:has(span))"), ["a"]);
}

#[test]
fn test_text_pseudo_classes() {
    let tree = parse("<p id=p1>Hello <b>World</b></p><p id=p2>hello</p>");
    assert_eq!(ids(&tree, "p:contains(WORLD)"), ["p1"]);
    assert_eq!(ids(&tree, "p:contains(hello)"), ["p1", "p2"]);
    assert!(ids(&tree, "p:containsOwn(world)").is_empty());
    assert_eq!(ids(&tree, "p:containsOwn(hello)"), ["p1", "p2"]);
    assert_eq!(ids(&tree, "p:matches(^Hello W)"), ["p1"]);
    assert_eq!(ids(&tree, "p:matchesOwn(^hello$)"), ["p2"]);
}

#[test]
fn test_contains_with_escaped_paren() {
    let tree = parse("<p id=a>f(x)</p><p id=b>f</p>");
    assert_eq!(ids(&tree, r"p:contains(x\))"), ["a"]);
}

#[test]
fn test_contains_data() {
    let tree = parse("<script id=s>var x = 1;</script><p id=p>var x = 1;</p>");
    assert_eq!(ids(&tree, "script:containsData(X = 1)"), ["s"]);
    assert!(ids(&tree, "p:containsData(x)").is_empty());
}

// ====================================================================
// Collector helpers
// ====================================================================

#[test]
fn test_collect_includes_root() {
    let tree = parse(NESTED);
    let outer = by_id(&tree, "outer");
    let evaluator = compile_selector("div").unwrap();
    assert_eq!(collect(&evaluator, &tree, outer), vec![outer]);
}

#[test]
fn test_select_all_dedups_overlapping_roots() {
    let tree = parse(NESTED);
    let outer = by_id(&tree, "outer");
    let body = tree.body().unwrap();
    let evaluator = compile_selector("p").unwrap();
    let found: Vec<String> = select_all(&evaluator, &tree, &[outer, body])
        .into_iter()
        .map(|n| id_of(&tree, n))
        .collect();
    assert_eq!(found, ["a", "b", "c", "d"]);
}

#[test]
fn test_filter_out_and_is() {
    let tree = parse(NESTED);
    let paragraphs = select("p", &tree, tree.root()).unwrap();
    let note = compile_selector(".note").unwrap();
    let plain: Vec<String> = filter_out(&note, &tree, tree.root(), &paragraphs)
        .into_iter()
        .map(|n| id_of(&tree, n))
        .collect();
    assert_eq!(plain, ["c"]);

    let in_section = compile_selector("section p").unwrap();
    assert!(is(&in_section, &tree, by_id(&tree, "b")));
    assert!(!is(&in_section, &tree, by_id(&tree, "a")));
}

#[test]
fn test_evaluator_reused_across_trees() {
    let evaluator = compile_selector("li:nth-child(odd)").unwrap();
    let first = parse("<ul><li><li><li></ul>");
    let second = parse("<ol><li><li></ol>");
    assert_eq!(collect(&evaluator, &first, first.root()).len(), 2);
    assert_eq!(collect(&evaluator, &second, second.root()).len(), 1);
}

// ====================================================================
// Properties
// ====================================================================

/// Markup assembled from tag soup pieces.
#[derive(Debug, Clone)]
struct TagSoup(String);

impl Arbitrary for TagSoup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<p>", "</p>", "<b>", "</b>", "<i>", "</i>", "<a href=x>", "</a>", "<table>",
            "</table>", "<tr>", "<td>", "<li>", "<ul>", "</ul>", "<div class=note>", "</div>",
            "<span id=s>", "</span>", "x", " ", "<!--c-->", "<svg>", "</svg>",
        ];
        let length = usize::arbitrary(g) % 40;
        let soup = (0..length)
            .filter_map(|_| g.choose(PIECES).copied())
            .collect();
        Self(soup)
    }
}

#[quickcheck]
fn collect_is_in_document_order(soup: TagSoup, pick: u8) -> bool {
    const QUERIES: &[&str] = &[
        "*", "p, b", "b i", "td + td", "li ~ li", ":nth-child(odd)", "p:has(b), i",
        ":not(p)", "[href], table > tbody", ".note span, #s", "div:contains(x)",
    ];
    let query = QUERIES[usize::from(pick) % QUERIES.len()];
    let tree = parse(&soup.0);
    let order: HashMap<NodeId, usize> = tree
        .descendants(tree.root())
        .enumerate()
        .map(|(position, node)| (node, position))
        .collect();

    let Ok(found) = select(query, &tree, tree.root()) else {
        return false;
    };
    found.windows(2).all(|pair| order[&pair[0]] < order[&pair[1]])
}

#[quickcheck]
fn universal_selector_finds_every_element(soup: TagSoup) -> bool {
    let tree = parse(&soup.0);
    let elements = tree
        .descendants(tree.root())
        .filter(|&node| tree.as_element(node).is_some())
        .count();
    select("*", &tree, tree.root()).is_ok_and(|found| found.len() == elements)
}
