//! Directory-scoped tree used for middleware layers and layouts.
//!
//! Nodes are keyed by segment tokens (see [`Segment::token`]). Items stored
//! at a node apply to every route whose pattern lies at or below that node.
//!
//! [`Segment::token`]: super::Segment::token

#[derive(Debug, Clone)]
struct ScopeNode<T> {
    token: String,
    items: Vec<T>,
    children: Vec<ScopeNode<T>>,
}

impl<T> ScopeNode<T> {
    fn new(token: String) -> Self {
        ScopeNode {
            token,
            items: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScopeTree<T> {
    root: ScopeNode<T>,
}

impl<T> Default for ScopeTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopeTree<T> {
    pub fn new() -> Self {
        ScopeTree {
            root: ScopeNode::new(String::new()),
        }
    }

    /// Append `item` to the node at `tokens`, creating intermediate nodes.
    pub fn insert(&mut self, tokens: &[String], item: T) {
        let mut current = &mut self.root;
        for token in tokens {
            let idx = match current.children.iter().position(|c| &c.token == token) {
                Some(idx) => idx,
                None => {
                    current.children.push(ScopeNode::new(token.clone()));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[idx];
        }
        current.items.push(item);
    }

    /// Item groups from the root down to the deepest node on `tokens`'s
    /// path, one slice per visited node (empty nodes included).
    pub fn layers(&self, tokens: &[String]) -> Vec<&[T]> {
        let mut layers = vec![self.root.items.as_slice()];
        let mut current = &self.root;
        for token in tokens {
            match current.children.iter().find(|c| &c.token == token) {
                Some(child) => {
                    layers.push(child.items.as_slice());
                    current = child;
                }
                None => break,
            }
        }
        layers
    }

    /// All items applying to `tokens`, root first.
    pub fn collect(&self, tokens: &[String]) -> Vec<&T> {
        self.layers(tokens).into_iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        fn empty<T>(node: &ScopeNode<T>) -> bool {
            node.items.is_empty() && node.children.iter().all(empty)
        }
        empty(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(path: &str) -> Vec<String> {
        path.split('/').filter(|s| !s.is_empty()).map(String::from).collect()
    }

    #[test]
    fn test_root_first_then_descendants() {
        let mut tree = ScopeTree::new();
        tree.insert(&toks("/"), "root");
        tree.insert(&toks("/layeredMdw"), "layer1");
        tree.insert(&toks("/layeredMdw/layer2"), "layer2");
        tree.insert(&toks("/layeredMdw/layer2/layer3"), "layer3");

        assert_eq!(
            tree.collect(&toks("/layeredMdw/layer2/:id")),
            vec![&"root", &"layer1", &"layer2"]
        );
        assert_eq!(
            tree.collect(&toks("/layeredMdw/layer2/layer3/:id")),
            vec![&"root", &"layer1", &"layer2", &"layer3"]
        );
    }

    #[test]
    fn test_siblings_are_exclusive() {
        let mut tree = ScopeTree::new();
        tree.insert(&toks("/"), "root");
        tree.insert(&toks("/layeredMdw"), "layer1");
        tree.insert(&toks("/layeredMdw/layer2"), "layer2");

        assert_eq!(
            tree.collect(&toks("/layeredMdw/layer2-no-mw/without_mw")),
            vec![&"root", &"layer1"]
        );
        assert_eq!(tree.collect(&toks("/api/middleware_data")), vec![&"root"]);
    }

    #[test]
    fn test_empty_nodes_contribute_nothing() {
        let mut tree: ScopeTree<&str> = ScopeTree::new();
        tree.insert(&toks("/a/b/c"), "deep");
        assert!(tree.collect(&toks("/a/b")).is_empty());
        assert_eq!(tree.layers(&toks("/a/b")).len(), 3);
        assert!(!tree.is_empty());
        assert!(ScopeTree::<u8>::new().is_empty());
    }

    #[test]
    fn test_insertion_order_within_node() {
        let mut tree = ScopeTree::new();
        tree.insert(&toks("/"), 1);
        tree.insert(&toks("/"), 2);
        tree.insert(&toks("/"), 3);
        assert_eq!(tree.collect(&[]), vec![&1, &2, &3]);
    }
}
