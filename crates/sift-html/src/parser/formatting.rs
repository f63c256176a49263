//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//! and [§ 13.2.6.4.7 the adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm).

use sift_dom::{Attributes, Namespace, NodeId};

use super::core::{ActiveFormattingElement, HtmlTreeBuilder};
use crate::tokenizer::Token;

/// Adoption agency outer loop limit: "If outer loop counter is greater than
/// or equal to 8, then return."
pub(super) const ADOPTION_OUTER_LOOP_LIMIT: usize = 8;

/// Adoption agency inner loop limit: "If inner loop counter is greater than 3
/// and node is in the list of active formatting elements, then remove node
/// from the list of active formatting elements."
pub(super) const ADOPTION_INNER_LOOP_LIMIT: usize = 3;

/// Noah's Ark clause: at most this many equal entries after the last marker.
const NOAHS_ARK_LIMIT: usize = 3;

/// Scope checks look at most this many entries down from the current node.
/// Deeper targets count as out of scope.
pub(super) const MAX_SCOPE_SEARCH_DEPTH: usize = 100;

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small, strike,
/// strong, tt, and u."
pub(super) fn is_formatting_element(name: &str) -> bool {
    matches!(
        name,
        "a" | "b"
            | "big"
            | "code"
            | "em"
            | "font"
            | "i"
            | "nobr"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "tt"
            | "u"
    )
}

/// Attribute lists compare equal regardless of order.
fn same_attributes(a: &Attributes, b: &Attributes) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|attribute| b.get(attribute.key()) == Some(attribute.value()))
}

/// Outcome of the adoption agency algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Adoption {
    /// The end tag was handled.
    Done,
    /// "act as described in the "any other end tag" entry"
    AnyOtherEndTag,
}

impl HtmlTreeBuilder {
    fn formatting_position(&self, node: NodeId) -> Option<usize> {
        self.active_formatting_elements.iter().rposition(|entry| {
            matches!(entry, ActiveFormattingElement::Element { node_id, .. } if *node_id == node)
        })
    }

    pub(super) fn in_active_formatting_elements(&self, node: NodeId) -> bool {
        self.formatting_position(node).is_some()
    }

    pub(super) fn remove_from_active_formatting_elements(&mut self, node: NodeId) {
        if let Some(index) = self.formatting_position(node) {
            let _ = self.active_formatting_elements.remove(index);
        }
    }

    pub(super) fn push_marker(&mut self) {
        self.active_formatting_elements
            .push(ActiveFormattingElement::Marker);
    }

    /// The last element named `name` between the end of the list and the last
    /// marker, if any.
    pub(super) fn formatting_element_after_last_marker(&self, name: &str) -> Option<NodeId> {
        for entry in self.active_formatting_elements.iter().rev() {
            match entry {
                ActiveFormattingElement::Marker => return None,
                ActiveFormattingElement::Element { node_id, .. } => {
                    if self.is_html_named(*node_id, name) {
                        return Some(*node_id);
                    }
                }
            }
        }
        None
    }

    /// [§ 13.2.4.3 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    pub(super) fn push_active_formatting_element(&mut self, node: NodeId, token: &Token) {
        // STEP 1: "If there are already three elements in the list of active
        //          formatting elements after the last marker, if any, or
        //          anywhere in the list if there are no markers, that have the
        //          same tag name, namespace, and attributes as element, then
        //          remove the earliest such element from the list of active
        //          formatting elements."
        if let Some(element) = self.element(node) {
            let mut matching = 0;
            let mut earliest = None;
            for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
                let ActiveFormattingElement::Element { node_id, .. } = entry else {
                    break;
                };
                let Some(other) = self.element(*node_id) else {
                    continue;
                };
                if other.namespace == element.namespace
                    && other.normal_name() == element.normal_name()
                    && same_attributes(&other.attrs, &element.attrs)
                {
                    matching += 1;
                    earliest = Some(index);
                }
            }
            if matching >= NOAHS_ARK_LIMIT
                && let Some(index) = earliest
            {
                let _ = self.active_formatting_elements.remove(index);
            }
        }

        // STEP 2: "Add element to the list of active formatting elements."
        self.active_formatting_elements
            .push(ActiveFormattingElement::Element {
                node_id: node,
                token: token.clone(),
            });
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct"
        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct"
        let Some(mut index) = self.active_formatting_elements.len().checked_sub(1) else {
            return;
        };
        if self.is_open_or_marker(index) {
            return;
        }

        // STEP 4-6: Rewind. "If there are no entries before entry in the list
        //           of active formatting elements, then jump to the step
        //           labeled create." / "If entry is neither a marker nor an
        //           element that is also in the stack of open elements, go to
        //           the step labeled rewind."
        while index > 0 {
            index -= 1;
            if self.is_open_or_marker(index) {
                // STEP 7: Advance.
                index += 1;
                break;
            }
        }

        // STEP 8-10: Create. "Insert an HTML element for the token for which
        //            the element entry was created, to obtain new element."
        //            "Replace the entry for entry in the list with an entry for
        //            new element." "If the entry for new element in the list of
        //            active formatting elements is not the last entry in the
        //            list, return to the step labeled advance."
        while index < self.active_formatting_elements.len() {
            if let ActiveFormattingElement::Element { token, .. } =
                self.active_formatting_elements[index].clone()
            {
                let node_id = self.insert_html_element(&token);
                self.active_formatting_elements[index] =
                    ActiveFormattingElement::Element { node_id, token };
            }
            index += 1;
        }
    }

    fn is_open_or_marker(&self, index: usize) -> bool {
        match &self.active_formatting_elements[index] {
            ActiveFormattingElement::Marker => true,
            ActiveFormattingElement::Element { node_id, .. } => {
                self.stack_of_open_elements.contains(node_id)
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "remove entries from the list until a marker has been removed"
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, ActiveFormattingElement::Marker) {
                break;
            }
        }
    }

    /// [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Run for the end tag named `subject`.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> Adoption {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        if let Some(current) = self.current_node()
            && self.is_html_named(current, subject)
            && !self.in_active_formatting_elements(current)
        {
            self.pop_current_node();
            return Adoption::Done;
        }

        // STEP 3-4: outer loop.
        for _ in 0..ADOPTION_OUTER_LOOP_LIMIT {
            // STEP 4.3: "Let formatting element be the last element in the list
            //            of active formatting elements that is between the end
            //            of the list and the last marker in the list, if any, or
            //            the start of the list otherwise, and has the tag name
            //            subject. If there is no such element, then return and
            //            instead act as described in the "any other end tag"
            //            entry above."
            let Some(formatting_element) = self.formatting_element_after_last_marker(subject)
            else {
                return Adoption::AnyOtherEndTag;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_index) = self
                .stack_of_open_elements
                .iter()
                .rposition(|&id| id == formatting_element)
            else {
                self.parse_error("Formatting element is not open");
                self.remove_from_active_formatting_elements(formatting_element);
                return Adoption::Done;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this
            //            is a parse error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error("Formatting element is not in scope");
                return Adoption::Done;
            }

            // STEP 4.6: "If formatting element is not the current node, this is
            //            a parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error("Formatting element is not the current node");
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack of
            //            open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category. There might not be one."
            let furthest_block_index = (formatting_index + 1..self.stack_of_open_elements.len())
                .find(|&index| self.is_special(self.stack_of_open_elements[index]));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element from
            //            the list of active formatting elements, and finally
            //            return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.pop_until_node(formatting_element);
                self.remove_from_active_formatting_elements(formatting_element);
                return Adoption::Done;
            };
            let furthest_block = self.stack_of_open_elements[furthest_block_index];

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .map(|index| self.stack_of_open_elements[index])
            else {
                return Adoption::Done;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting element
            //             in the list of active formatting elements relative to
            //             the elements on either side of it in the list."
            let Some(mut bookmark) = self.formatting_position(formatting_element) else {
                return Adoption::Done;
            };

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.12-4.13: inner loop.
            let mut inner_loop_counter = 0;
            loop {
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                //               in the stack of open elements, or if node is no
                //               longer in the stack of open elements (e.g.
                //               because it got removed by this algorithm), the
                //               element that was immediately above node in the
                //               stack of open elements before node was removed."
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 4.13.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If inner loop counter is greater than 3 and node
                //               is in the list of active formatting elements,
                //               then remove node from the list of active
                //               formatting elements."
                let mut formatting_entry = self.formatting_position(node);
                if inner_loop_counter > ADOPTION_INNER_LOOP_LIMIT
                    && let Some(index) = formatting_entry
                {
                    let _ = self.active_formatting_elements.remove(index);
                    if index < bookmark {
                        bookmark -= 1;
                    }
                    formatting_entry = None;
                }

                // STEP 4.13.5: "If node is not in the list of active formatting
                //               elements, then remove node from the stack of
                //               open elements and continue."
                let Some(entry_index) = formatting_entry else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                //               element node was created, in the HTML
                //               namespace, with common ancestor as the intended
                //               parent; replace the entry for node in the list of
                //               active formatting elements with an entry for the
                //               new element, replace the entry for node in the
                //               stack of open elements with an entry for the new
                //               element, and let node be the new element."
                let ActiveFormattingElement::Element { token, .. } =
                    self.active_formatting_elements[entry_index].clone()
                else {
                    break;
                };
                let replacement = self.create_element_for_token(&token, Namespace::Html);
                self.active_formatting_elements[entry_index] = ActiveFormattingElement::Element {
                    node_id: replacement,
                    token,
                };
                self.stack_of_open_elements[node_index] = replacement;

                // STEP 4.13.7: "If last node is furthest block, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = entry_index + 1;
                }

                // STEP 4.13.8: "Append last node to node."
                self.append_to(replacement, last_node);

                // STEP 4.13.9: "Set last node to node."
                last_node = replacement;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting
            //             a node, but using common ancestor as the override
            //             target."
            self.tree.detach(last_node);
            let location = self.appropriate_place(Some(common_ancestor));
            self.insert_at(location, last_node);

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             furthest block as the intended parent."
            let Some(ActiveFormattingElement::Element { token, .. }) = self
                .formatting_position(formatting_element)
                .map(|index| self.active_formatting_elements[index].clone())
            else {
                return Adoption::Done;
            };
            let new_element = self.create_element_for_token(&token, Namespace::Html);

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            self.move_children(furthest_block, new_element);

            // STEP 4.17: "Append that new element to furthest block."
            self.append_to(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the
            //             position of the aforementioned bookmark."
            if let Some(index) = self.formatting_position(formatting_element) {
                let _ = self.active_formatting_elements.remove(index);
                if index < bookmark {
                    bookmark -= 1;
                }
            }
            let bookmark = bookmark.min(self.active_formatting_elements.len());
            self.active_formatting_elements.insert(
                bookmark,
                ActiveFormattingElement::Element {
                    node_id: new_element,
                    token,
                },
            );

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack
            //             of open elements immediately below the position of
            //             furthest block in that stack."
            self.remove_from_stack(formatting_element);
            if let Some(index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
            {
                self.stack_of_open_elements.insert(index + 1, new_element);
            }
        }

        Adoption::Done
    }
}
