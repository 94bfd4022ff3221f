//! The mail specification tree and its resolution walk.

use serde::Deserialize;

use crate::config::RetryConfig;
use crate::error::Result;
use crate::mail::fields::MailFields;

/// One node of the mail tree.
///
/// A node with children is internal: its own fields exist purely to be
/// inherited. A node without children is a leaf and produces exactly
/// one resolved mail.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MailNode {
    /// The node's own fields.
    #[serde(flatten)]
    pub fields: MailFields,
    /// Child nodes, in declaration order.
    #[serde(default, rename = "mails")]
    pub children: Vec<MailNode>,
}

/// A fully resolved mail: a leaf's fields merged with everything it
/// inherited. No further inheritance is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMail {
    /// The resolved field set.
    pub fields: MailFields,
}

impl MailNode {
    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Walk the tree depth-first, invoking `visit` once per leaf with
    /// the leaf's resolved mail.
    ///
    /// The root's own fields form the initial context unchanged; every
    /// descendant merges its own fields over the accumulated context.
    /// Each merge produces a fresh field set, so sibling branches never
    /// share partially merged state. Leaves are visited in pre-order,
    /// which is source document order.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(ResolvedMail),
    {
        self.walk_from(None, visit);
    }

    fn walk_from<F>(&self, inherited: Option<&MailFields>, visit: &mut F)
    where
        F: FnMut(ResolvedMail),
    {
        let resolved = match inherited {
            None => self.fields.clone(),
            Some(base) => base.override_with(&self.fields),
        };

        if self.is_leaf() {
            visit(ResolvedMail { fields: resolved });
        } else {
            for child in &self.children {
                child.walk_from(Some(&resolved), visit);
            }
        }
    }

    /// Collect every leaf's resolved mail in traversal order.
    pub fn resolve_all(&self) -> Vec<ResolvedMail> {
        let mut result = Vec::new();
        self.walk(&mut |mail| result.push(mail));
        result
    }

    /// Number of leaves under this node (counting the node itself when
    /// it is a leaf).
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(MailNode::leaf_count).sum()
        }
    }
}

/// The whole source document: the root mail node plus process-wide
/// dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Document {
    /// SendGrid API key, used only by dispatch.
    #[serde(default)]
    pub apikey: String,
    /// Retry policy for dispatch.
    #[serde(default)]
    pub retry: RetryConfig,
    /// The root of the mail tree.
    #[serde(flatten)]
    pub root: MailNode,
}

impl Document {
    /// Parse a document from YAML source.
    pub fn from_yaml(raw: &str) -> Result<Document> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Resolve every leaf of the tree in document order.
    pub fn resolve_all(&self) -> Vec<ResolvedMail> {
        self.root.resolve_all()
    }
}
