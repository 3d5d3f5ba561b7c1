use super::{tokenize, TlvNode, TlvTree, TlvValue};
use crate::tag::{FieldPath, Tag, TagRange};
use crate::{NamqrError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which tags hold nested TLV sequences, level by level.
///
/// `ranges` lists the composite tags at this level. `nested` gives the
/// layout used *inside* a particular composite tag. When `recursive` is
/// set, children of any composite tag without a `nested` entry are read
/// with this same layout; otherwise they are plain leaves.
///
/// # Example
///
/// ```
/// use namqr_lib::tlv::TemplateLayout;
/// use namqr_lib::{Tag, TagRange};
///
/// let layout = TemplateLayout::namqr_v5();
/// assert!(layout.is_composite(Tag::new(26).unwrap()));
/// assert!(!layout.is_composite(Tag::new(59).unwrap()));
///
/// let additional = layout.child_layout(Tag::new(62).unwrap()).unwrap();
/// assert!(additional.is_composite(Tag::new(50).unwrap()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLayout {
    /// Composite tags at this level.
    #[serde(default)]
    pub ranges: Vec<TagRange>,
    /// Layouts applied inside specific composite tags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<Tag, TemplateLayout>,
    /// Reuse this layout for children of composite tags without a `nested` entry.
    #[serde(default)]
    pub recursive: bool,
}

impl TemplateLayout {
    /// A single-level layout: composite tags hold leaves only.
    pub fn new(ranges: impl IntoIterator<Item = TagRange>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
            nested: BTreeMap::new(),
            recursive: false,
        }
    }

    /// A layout whose ranges apply at every nesting level.
    pub fn recursive(ranges: impl IntoIterator<Item = TagRange>) -> Self {
        Self {
            recursive: true,
            ..Self::new(ranges)
        }
    }

    /// Set the layout used inside composite tag `tag`.
    pub fn with_nested(mut self, tag: Tag, layout: TemplateLayout) -> Self {
        self.nested.insert(tag, layout);
        self
    }

    /// NAMQR v5.0 layout.
    ///
    /// Root: payment-account templates `02-51`, additional data `62`, payee
    /// language `64` and unreserved templates `80-99`. Inside `62`, sub-tag
    /// `50` (payment link) is itself a template.
    pub fn namqr_v5() -> Self {
        let mut ranges = Vec::new();
        ranges.extend(TagRange::new(2, 51));
        ranges.extend(TagRange::new(62, 62));
        ranges.extend(TagRange::new(64, 64));
        ranges.extend(TagRange::new(80, 99));

        let mut layout = Self::new(ranges);
        if let (Some(additional), Some(link)) = (Tag::new(62), TagRange::new(50, 50)) {
            layout = layout.with_nested(additional, Self::new([link]));
        }
        layout
    }

    /// Whether `tag` is composite at this level.
    pub fn is_composite(&self, tag: Tag) -> bool {
        self.ranges.iter().any(|range| range.contains(tag))
    }

    /// Layout for the children of composite tag `tag`, or `None` if its
    /// children are all leaves.
    pub fn child_layout(&self, tag: Tag) -> Option<&TemplateLayout> {
        match self.nested.get(&tag) {
            Some(layout) => Some(layout),
            None if self.recursive => Some(self),
            None => None,
        }
    }

    /// Check that every `nested` entry is keyed by a composite tag.
    pub fn validate(&self) -> Result<()> {
        for (tag, layout) in &self.nested {
            if !self.is_composite(*tag) {
                return Err(NamqrError::InvalidConfig(format!(
                    "nested layout given for tag {tag}, which is not composite"
                )));
            }
            layout.validate()?;
        }
        Ok(())
    }
}

/// Expand composite leaves of `nodes` into templates.
///
/// Root nodes sit at level 0; the children of a root template at level 1,
/// and so on. Expanding a template whose children would land deeper than
/// `max_depth` fails with [`NamqrError::TemplateTooDeep`], so recursion
/// never goes past `max_depth` frames regardless of the input.
///
/// A template value that does not tokenize is reported as
/// [`NamqrError::InvalidTemplate`]. Errors name the failing template by
/// its root tag and its own tag, so a bad payment link reads `62.50`.
pub fn expand(nodes: Vec<TlvNode>, layout: &TemplateLayout, max_depth: usize) -> Result<TlvTree> {
    let nodes = expand_level(nodes, Some(layout), None, 0, max_depth)?;
    Ok(TlvTree::new(nodes))
}

fn expand_level(
    nodes: Vec<TlvNode>,
    layout: Option<&TemplateLayout>,
    root: Option<Tag>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<TlvNode>> {
    let Some(layout) = layout else {
        return Ok(nodes);
    };

    nodes
        .into_iter()
        .map(|node| {
            if !layout.is_composite(node.tag) {
                return Ok(node);
            }
            let tag = node.tag;
            let raw = match node.value {
                TlvValue::Leaf(raw) => raw,
                value @ TlvValue::Template(_) => return Ok(TlvNode { tag, value }),
            };

            let path = match root {
                Some(parent) => FieldPath::child(parent, tag),
                None => FieldPath::root(tag),
            };
            let child_depth = depth + 1;
            if child_depth > max_depth {
                return Err(NamqrError::TemplateTooDeep { path, max_depth });
            }

            let children = tokenize(&raw).map_err(|err| NamqrError::InvalidTemplate {
                path,
                source: Box::new(err),
            })?;
            let children = expand_level(
                children,
                layout.child_layout(tag),
                Some(root.unwrap_or(tag)),
                child_depth,
                max_depth,
            )?;
            Ok(TlvNode::template(tag, children))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(value: u8) -> Tag {
        Tag::new(value).unwrap()
    }

    #[test]
    fn test_expand_account_template() {
        let nodes = tokenize("26320016na.com.buffr.IPP0108264811@b5303516").unwrap();
        let tree = expand(nodes, &TemplateLayout::namqr_v5(), 2).unwrap();

        let account = tree.find(tag(26)).unwrap();
        let children = account.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_leaf(), Some("na.com.buffr.IPP"));
        assert_eq!(children[1].as_leaf(), Some("264811@b"));

        // Leaves outside composite ranges stay untouched.
        assert_eq!(tree.find(tag(53)).and_then(TlvNode::as_leaf), Some("516"));
    }

    #[test]
    fn test_expand_nested_payment_link() {
        // 62 { 05 "INV1", 50 { 00 "x", 01 "y" } }
        let nodes = tokenize("62220504INV150100001x0101y").unwrap();
        let tree = expand(nodes, &TemplateLayout::namqr_v5(), 2).unwrap();

        let additional = tree.find(tag(62)).unwrap().children().unwrap();
        assert_eq!(additional[0].as_leaf(), Some("INV1"));
        let link = additional[1].children().unwrap();
        assert_eq!(link[1].as_leaf(), Some("y"));
    }

    #[test]
    fn test_non_recursive_children_stay_leaves() {
        // Child 02 of template 26 lies in 02-51 but is an org id, not a template.
        let nodes = tokenize("26160002ab0206123456").unwrap();
        let tree = expand(nodes, &TemplateLayout::namqr_v5(), 2).unwrap();
        let children = tree.find(tag(26)).unwrap().children().unwrap();
        assert_eq!(children[1].as_leaf(), Some("123456"));
    }

    #[test]
    fn test_invalid_template_names_outer_tag() {
        let nodes = tokenize("2605abcde").unwrap();
        let err = expand(nodes, &TemplateLayout::namqr_v5(), 2).unwrap_err();
        match err {
            NamqrError::InvalidTemplate { path, source } => {
                assert_eq!(path, FieldPath::root(tag(26)));
                assert_eq!(*source, NamqrError::InvalidTag { offset: 0 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_nested_template_names_root() {
        // 62 { 50 "PAYLINK" }: the payment link is not TLV.
        let nodes = tokenize("62115007PAYLINK").unwrap();
        let err = expand(nodes, &TemplateLayout::namqr_v5(), 2).unwrap_err();
        assert!(matches!(
            err,
            NamqrError::InvalidTemplate { path, .. } if path == FieldPath::child(tag(62), tag(50))
        ));
        assert!(err.to_string().starts_with("template 62.50 is malformed"));
    }

    #[test]
    fn test_too_deep_names_root() {
        let nodes = tokenize("62105006000201").unwrap();
        let err = expand(nodes, &TemplateLayout::namqr_v5(), 1).unwrap_err();
        assert_eq!(
            err,
            NamqrError::TemplateTooDeep {
                path: FieldPath::child(tag(62), tag(50)),
                max_depth: 1,
            }
        );
    }

    #[test]
    fn test_depth_bound() {
        let layout = TemplateLayout::recursive(TagRange::new(80, 80));
        // 80 { 80 { 80 { 80 { 00 "x" } } } }: four template levels.
        let nodes = tokenize("80178013800980050001x").unwrap();
        assert!(matches!(
            expand(nodes.clone(), &layout, 2),
            Err(NamqrError::TemplateTooDeep { max_depth: 2, .. })
        ));
        assert!(expand(nodes, &layout, 4).is_ok());
    }

    #[test]
    fn test_adversarial_nesting_does_not_recurse_past_limit() {
        let layout = TemplateLayout::recursive(TagRange::new(80, 80));
        // Build 20 levels of 80-in-80 nesting; only the depth check stops it.
        let mut payload = String::from("0000");
        for _ in 0..20 {
            payload = format!("80{:02}{}", payload.len(), payload);
        }
        let nodes = tokenize(&payload).unwrap();
        let err = expand(nodes, &layout, 2).unwrap_err();
        assert!(matches!(err, NamqrError::TemplateTooDeep { .. }));
    }

    #[test]
    fn test_layout_validate() {
        assert!(TemplateLayout::namqr_v5().validate().is_ok());
        let bad = TemplateLayout::new(TagRange::new(80, 80))
            .with_nested(tag(26), TemplateLayout::default());
        assert!(matches!(bad.validate(), Err(NamqrError::InvalidConfig(_))));
    }

    #[test]
    fn test_layout_serde() {
        let layout = TemplateLayout::namqr_v5();
        let json = serde_json::to_string(&layout).unwrap();
        let back: TemplateLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);

        let minimal: TemplateLayout =
            serde_json::from_str(r#"{"ranges":[{"start":"80","end":"99"}]}"#).unwrap();
        assert!(minimal.is_composite(tag(85)));
        assert!(!minimal.recursive);
    }
}
