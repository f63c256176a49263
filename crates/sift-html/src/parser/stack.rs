//! [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)

use sift_dom::{ElementData, Namespace, NodeId};

use super::core::{HtmlTreeBuilder, InsertionMode};
use super::formatting::MAX_SCOPE_SEARCH_DEPTH;

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element-type lists that bound a scope check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope": default plus ol and ul.
    ListItem,
    /// "has an element in button scope": default plus button.
    Button,
    /// "has an element in table scope": html, table and template.
    Table,
    /// "has an element in select scope": everything except optgroup and option.
    Select,
}

/// [§ 13.2.6.2 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// "generate all implied end tags thoroughly"
const THOROUGH_IMPLIED_END_TAGS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
    "tbody", "td", "tfoot", "th", "thead", "tr",
];

impl HtmlTreeBuilder {
    // ====================================================================
    // Node queries
    // ====================================================================

    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it (fragment case); otherwise,
    /// the adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        match self.context_element {
            Some(context) if self.stack_of_open_elements.len() == 1 => Some(context),
            _ => self.current_node(),
        }
    }

    pub(super) fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.as_element(id)
    }

    /// Whether `id` is an HTML element named `name`.
    pub(super) fn is_html_named(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|element| element.is_html(name))
    }

    /// Whether `id` is an HTML element with one of `names`.
    pub(super) fn is_html_one_of(&self, id: NodeId, names: &[&str]) -> bool {
        self.element(id).is_some_and(|element| {
            element.namespace == Namespace::Html && names.contains(&element.normal_name())
        })
    }

    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_html_named(id, name))
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_html_one_of(id, names))
    }

    /// Whether an HTML element named `name` is anywhere on the stack.
    pub(super) fn stack_has(&self, name: &str) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&id| self.is_html_named(id, name))
    }

    /// [§ 13.2.4.2 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(super) fn is_special(&self, id: NodeId) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        match element.namespace {
            Namespace::Html => matches!(
                element.normal_name(),
                "address" | "applet" | "area" | "article" | "aside" | "base" | "basefont"
                    | "bgsound" | "blockquote" | "body" | "br" | "button" | "caption"
                    | "center" | "col" | "colgroup" | "dd" | "details" | "dir" | "div" | "dl"
                    | "dt" | "embed" | "fieldset" | "figcaption" | "figure" | "footer"
                    | "form" | "frame" | "frameset" | "h1" | "h2" | "h3" | "h4" | "h5"
                    | "h6" | "head" | "header" | "hgroup" | "hr" | "html" | "iframe" | "img"
                    | "input" | "keygen" | "li" | "link" | "listing" | "main" | "marquee"
                    | "menu" | "meta" | "nav" | "noembed" | "noframes" | "noscript"
                    | "object" | "ol" | "p" | "param" | "plaintext" | "pre" | "script"
                    | "search" | "section" | "select" | "source" | "style" | "summary"
                    | "table" | "tbody" | "td" | "template" | "textarea" | "tfoot" | "th"
                    | "thead" | "title" | "tr" | "track" | "ul" | "wbr" | "xmp"
            ),
            Namespace::MathMl => matches!(
                element.normal_name(),
                "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
            ),
            Namespace::Svg => {
                matches!(element.normal_name(), "foreignobject" | "desc" | "title")
            }
        }
    }

    // ====================================================================
    // Popping
    // ====================================================================

    pub(super) fn pop_current_node(&mut self) {
        let _ = self.stack_of_open_elements.pop();
    }

    /// Pop elements until an HTML element named `name` has been popped.
    pub(super) fn pop_until(&mut self, name: &str) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.is_html_named(id, name) {
                break;
            }
        }
    }

    /// Pop elements until an HTML element with one of `names` has been popped.
    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.is_html_one_of(id, names) {
                break;
            }
        }
    }

    /// Pop elements until `node` has been popped.
    pub(super) fn pop_until_node(&mut self, node: NodeId) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if id == node {
                break;
            }
        }
    }

    pub(super) fn remove_from_stack(&mut self, node: NodeId) {
        if let Some(index) = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| id == node)
        {
            let _ = self.stack_of_open_elements.remove(index);
        }
    }

    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "pop elements from the stack of open elements until the current node is
    /// a" `names` element, "a template, or an html element". Used for the
    /// table, table body and table row contexts.
    pub(super) fn clear_stack_back_to(&mut self, names: &[&str]) {
        while let Some(id) = self.current_node() {
            if self.is_html_one_of(id, names) || self.is_html_one_of(id, &["template", "html"]) {
                break;
            }
            self.pop_current_node();
        }
    }

    // ====================================================================
    // Scope
    // ====================================================================

    fn is_scope_marker(&self, id: NodeId, scope: Scope) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        let name = element.normal_name();
        match (scope, element.namespace) {
            (Scope::Select, Namespace::Html) => !matches!(name, "optgroup" | "option"),
            (Scope::Select, _) => true,
            (Scope::Table, Namespace::Html) => matches!(name, "html" | "table" | "template"),
            (Scope::Table, _) => false,
            (_, Namespace::Html) => {
                matches!(
                    name,
                    "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object"
                        | "template"
                ) || (scope == Scope::ListItem && matches!(name, "ol" | "ul"))
                    || (scope == Scope::Button && name == "button")
            }
            (_, Namespace::MathMl) => {
                matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            (_, Namespace::Svg) => matches!(name, "foreignobject" | "desc" | "title"),
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node of
    ///          the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of open
    ///          elements and return to step 2."
    ///
    /// The walk stops after [`MAX_SCOPE_SEARCH_DEPTH`] entries.
    fn has_in_specific_scope(&self, is_target: impl Fn(NodeId) -> bool, scope: Scope) -> bool {
        for &id in self
            .stack_of_open_elements
            .iter()
            .rev()
            .take(MAX_SCOPE_SEARCH_DEPTH)
        {
            if is_target(id) {
                return true;
            }
            if self.is_scope_marker(id, scope) {
                return false;
            }
        }
        false
    }

    /// Whether an HTML element named `name` is in `scope`.
    pub(super) fn has_element_in_scope(&self, name: &str, scope: Scope) -> bool {
        self.has_in_specific_scope(|id| self.is_html_named(id, name), scope)
    }

    /// Whether an HTML element with one of `names` is in `scope`.
    pub(super) fn has_any_in_scope(&self, names: &[&str], scope: Scope) -> bool {
        self.has_in_specific_scope(|id| self.is_html_one_of(id, names), scope)
    }

    /// Whether `node` itself is in the default scope.
    pub(super) fn has_node_in_scope(&self, node: NodeId) -> bool {
        self.has_in_specific_scope(|id| id == node, Scope::Default)
    }

    // ====================================================================
    // Implied end tags
    // ====================================================================

    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an
    /// rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    ///
    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(id) = self.current_node() {
            let implied = self.element(id).is_some_and(|element| {
                element.namespace == Namespace::Html
                    && IMPLIED_END_TAGS.contains(&element.normal_name())
                    && except != Some(element.normal_name())
            });
            if !implied {
                break;
            }
            self.pop_current_node();
        }
    }

    /// "generate all implied end tags thoroughly"
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current_node_is_one_of(THOROUGH_IMPLIED_END_TAGS) {
            self.pop_current_node();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error("Unexpected end of p element");
        }
        self.pop_until("p");
    }

    /// Close a `p` element if one is in button scope, as many block start
    /// tags do first.
    pub(super) fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_scope("p", Scope::Button) {
            self.close_p_element();
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    pub(super) fn close_the_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.generate_implied_end_tags(None);
        // STEP 2: "If the current node is not now a td element or a th element,
        //          then this is a parse error."
        if !self.current_node_is_one_of(&["td", "th"]) {
            self.parse_error("Cell closed while other elements were still open");
        }
        // STEP 3: "Pop elements from the stack of open elements stack until a
        //          td element or a th element has been popped from the stack."
        self.pop_until_one_of(&["td", "th"]);
        // STEP 4: "Clear the list of active formatting elements up to the last
        //          marker."
        self.clear_active_formatting_elements_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in row"."
        self.insertion_mode = InsertionMode::InRow;
    }

    // ====================================================================
    // Reset the insertion mode
    // ====================================================================

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        let mut index = self.stack_of_open_elements.len();
        while index > 0 {
            index -= 1;
            let mut node = self.stack_of_open_elements[index];

            // STEP 3: "If node is the first node in the stack of open elements,
            //          then set last to true, and, if the parser was created as
            //          part of the HTML fragment parsing algorithm (fragment
            //          case), set node to the context element passed to that
            //          algorithm."
            let last = index == 0;
            if last && let Some(context) = self.context_element {
                node = context;
            }

            let Some(element) = self.element(node) else {
                continue;
            };
            if element.namespace != Namespace::Html {
                if last {
                    break;
                }
                continue;
            }

            let mode = match element.normal_name() {
                // STEP 4: "If node is a select element, run these substeps"
                "select" => Some(self.select_mode_for(index, last)),
                "td" | "th" if !last => Some(InsertionMode::InCell),
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" => Some(InsertionMode::InCaption),
                "colgroup" => Some(InsertionMode::InColumnGroup),
                "table" => Some(InsertionMode::InTable),
                // STEP 11: "If node is a template element, then switch the
                //           insertion mode to the current template insertion
                //           mode and return."
                "template" => Some(
                    self.template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate),
                ),
                "head" if !last => Some(InsertionMode::InHead),
                "body" => Some(InsertionMode::InBody),
                "frameset" => Some(InsertionMode::InFrameset),
                // STEP 15: "If node is an html element, run these substeps"
                "html" => Some(if self.head_element_pointer.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                _ => None,
            };

            if let Some(mode) = mode {
                self.insertion_mode = mode;
                return;
            }
            if last {
                break;
            }
        }

        // STEP 16: "If last is true, then switch the insertion mode to "in
        //           body" and return."
        self.insertion_mode = InsertionMode::InBody;
    }

    /// STEP 4 of resetting the insertion mode, for a `select` at `index`.
    fn select_mode_for(&self, index: usize, last: bool) -> InsertionMode {
        // STEP 4.1: "If last is true, jump to the step below labeled done."
        if !last {
            // STEP 4.2-4.6: walk the ancestors looking for a table before a
            //               template or the top of the stack.
            for &ancestor in self.stack_of_open_elements[..index].iter().rev() {
                if self.is_html_named(ancestor, "template") {
                    break;
                }
                if self.is_html_named(ancestor, "table") {
                    return InsertionMode::InSelectInTable;
                }
            }
        }
        // STEP 4.8: "Done: Switch the insertion mode to "in select" and return."
        InsertionMode::InSelect
    }
}
