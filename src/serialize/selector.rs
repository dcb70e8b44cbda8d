use std::rc::Rc;

use crate::host::{ObjectRef, Value};

/// Derive a CSS-like selector for the first node of an event target path.
///
/// Walks parent elements up to (not including) the root, qualifying a tag with
/// `:eq(n)` when its parent has more than one child with that tag. Returns an
/// empty string when `start` is absent or has no rendered markup.
pub fn path_to_selector(start: Option<&Value>) -> String {
    let Some(Value::Object(start)) = start else {
        return String::new();
    };
    let has_markup = start
        .node()
        .and_then(|node| node.outer_html())
        .is_some_and(|html| !html.is_empty());
    if !has_markup {
        return String::new();
    }

    let mut path = String::new();
    let mut current: ObjectRef = Rc::clone(start);
    while let Some(parent) = current.parent_element() {
        let Some(tag) = tag_name(&current) else {
            break;
        };

        let same_tag: Vec<ObjectRef> = parent
            .node()
            .map(|node| node.children())
            .unwrap_or_default()
            .into_iter()
            .filter(|sibling| tag_name(sibling).as_deref() == Some(tag.as_str()))
            .collect();

        let mut segment = tag;
        if same_tag.len() > 1 {
            if let Some(index) = same_tag.iter().position(|s| Rc::ptr_eq(s, &current)) {
                segment.push_str(&format!(":eq({index})"));
            }
        }

        path = if path.is_empty() {
            segment
        } else {
            format!("{segment}>{path}")
        };
        current = parent;
    }

    path
}

fn tag_name(object: &ObjectRef) -> Option<String> {
    object
        .node()?
        .local_name()
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
}
