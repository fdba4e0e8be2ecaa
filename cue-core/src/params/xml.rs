//! Markup stage.
//!
//! Expects the CasparCG `templateData` shape:
//!
//! ```text
//! <templateData>
//!   <componentData id="f0"><data id="text" value="Alice"/></componentData>
//! </templateData>
//! ```

use xmltree::{Element, XMLNode};

use crate::error::CueError;
use crate::params::ParamMap;

/// Parse `raw` as an XML parameter document.
///
/// Fails as a whole if the document is malformed or if any child of the
/// root lacks an `id`, a `data` descendant, or that descendant's `value`.
pub fn parse(raw: &str) -> Result<ParamMap, CueError> {
    let root = Element::parse(raw.as_bytes())?;

    let mut params = ParamMap::new();
    for child in element_children(&root) {
        let key = child
            .attributes
            .get("id")
            .ok_or(CueError::MalformedParams("parameter element without id"))?;
        let data = find_descendant(child, "data")
            .ok_or(CueError::MalformedParams("parameter element without data"))?;
        let value = data
            .attributes
            .get("value")
            .ok_or(CueError::MalformedParams("data element without value"))?;
        params.insert(key.clone(), value.clone());
    }
    Ok(params)
}

fn element_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(elem) => Some(elem),
        _ => None,
    })
}

/// Depth-first search for the first descendant named `name`.
fn find_descendant<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element_children(element).find_map(|child| {
        if child.name == name {
            Some(child)
        } else {
            find_descendant(child, name)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casparcg_template_data() {
        let raw = r#"<templateData>
            <componentData id="f0"><data id="text" value="Alice"/></componentData>
            <componentData id="f1"><data id="text" value="Producer"/></componentData>
        </templateData>"#;
        let params = parse(raw).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["f0"], "Alice");
        assert_eq!(params["f1"], "Producer");
    }

    #[test]
    fn data_may_be_nested_deeper() {
        let raw = r#"<root><item id="f0"><wrap><data value="Bob"/></wrap></item></root>"#;
        assert_eq!(parse(raw).unwrap()["f0"], "Bob");
    }

    #[test]
    fn root_without_children_is_empty() {
        assert!(parse("<templateData/>").unwrap().is_empty());
    }

    #[test]
    fn one_bad_child_fails_the_document() {
        let missing_id = r#"<root><item id="f0"><data value="a"/></item><item><data value="b"/></item></root>"#;
        assert!(matches!(parse(missing_id), Err(CueError::MalformedParams(_))));

        let missing_data = r#"<root><item id="f0"/></root>"#;
        assert!(matches!(parse(missing_data), Err(CueError::MalformedParams(_))));

        let missing_value = r#"<root><item id="f0"><data id="text"/></item></root>"#;
        assert!(matches!(parse(missing_value), Err(CueError::MalformedParams(_))));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(matches!(parse(""), Err(CueError::Xml(_))));
        assert!(parse("<root><item id=\"f0\">").is_err());
    }
}
