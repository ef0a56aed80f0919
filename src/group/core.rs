use crate::handler::{HandlersChain, SharedHandler};

/// Handle to a group inside one [`GroupTree`]
///
/// Only the tree that issued an id can resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// One path-prefix scope with its own middlewares
pub struct RouteGroup {
    prefix: String,
    middlewares: HandlersChain,
    parent: Option<GroupId>,
}

impl RouteGroup {
    /// Full prefix (parent prefix + own suffix)
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Middlewares attached directly to this group
    #[must_use]
    pub fn middlewares(&self) -> &HandlersChain {
        &self.middlewares
    }

    /// Enclosing group; `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }
}

/// Flat, registration-ordered list of every route group
///
/// Groups form a tree through their parent links, but are stored flat so
/// that request-time prefix matching is a single linear scan. Groups are
/// never removed.
pub struct GroupTree {
    groups: Vec<RouteGroup>,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// Create a tree holding only the root group (empty prefix)
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: vec![RouteGroup {
                prefix: String::new(),
                middlewares: HandlersChain::new(),
                parent: None,
            }],
        }
    }

    #[must_use]
    pub fn root(&self) -> GroupId {
        GroupId(0)
    }

    /// Derive a sub-group whose prefix is `parent.prefix + suffix`
    pub fn derive(&mut self, parent: GroupId, suffix: &str) -> GroupId {
        let prefix = format!("{}{}", self.get(parent).prefix, suffix);
        self.groups.push(RouteGroup {
            prefix,
            middlewares: HandlersChain::new(),
            parent: Some(parent),
        });
        GroupId(self.groups.len() - 1)
    }

    /// True when `group` was issued by this tree
    #[must_use]
    pub fn contains(&self, group: GroupId) -> bool {
        group.0 < self.groups.len()
    }

    /// Append middlewares to a group
    ///
    /// # Panics
    ///
    /// If `group` was issued by another tree; check with [`contains`](Self::contains).
    pub fn attach(&mut self, group: GroupId, handlers: impl IntoIterator<Item = SharedHandler>) {
        self.groups[group.0].middlewares.extend(handlers);
    }

    /// # Panics
    ///
    /// If `group` was issued by another tree; check with [`contains`](Self::contains).
    #[must_use]
    pub fn get(&self, group: GroupId) -> &RouteGroup {
        &self.groups[group.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Middlewares of every group whose prefix is a prefix of `path`,
    /// in group-registration order
    #[must_use]
    pub fn middlewares_for(&self, path: &str) -> HandlersChain {
        self.groups
            .iter()
            .filter(|group| path.starts_with(group.prefix.as_str()))
            .flat_map(|group| group.middlewares.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Request};
    use crate::handler::handler;
    use http::Method;
    use std::sync::{Arc, Mutex};

    fn tagger(trace: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> SharedHandler {
        let trace = Arc::clone(trace);
        handler(move |_c: &mut Context| trace.lock().unwrap().push(tag))
    }

    fn run(chain: HandlersChain) {
        let mut ctx = Context::new(Request::new(Method::GET, "/"));
        for h in chain {
            h.handle(&mut ctx);
        }
    }

    #[test]
    fn test_root_has_empty_prefix() {
        let tree = GroupTree::new();
        assert_eq!(tree.get(tree.root()).prefix(), "");
        assert_eq!(tree.get(tree.root()).parent(), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_derive_concatenates_prefixes() {
        let mut tree = GroupTree::new();
        let api = tree.derive(tree.root(), "/api");
        let v1 = tree.derive(api, "/v1");
        assert_eq!(tree.get(api).prefix(), "/api");
        assert_eq!(tree.get(v1).prefix(), "/api/v1");
        assert_eq!(tree.get(v1).parent(), Some(api));
        assert_eq!(tree.get(api).parent(), Some(tree.root()));
    }

    #[test]
    fn test_middlewares_collected_in_registration_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut tree = GroupTree::new();
        let root = tree.root();
        let api = tree.derive(root, "/api");
        let v1 = tree.derive(api, "/v1");
        let other = tree.derive(root, "/other");

        tree.attach(root, [tagger(&trace, "root")]);
        tree.attach(v1, [tagger(&trace, "B")]);
        tree.attach(api, [tagger(&trace, "A")]);
        tree.attach(other, [tagger(&trace, "X")]);

        run(tree.middlewares_for("/api/v1/items"));
        assert_eq!(*trace.lock().unwrap(), vec!["root", "A", "B"]);
    }

    #[test]
    fn test_contains_rejects_foreign_ids() {
        let mut big = GroupTree::new();
        big.derive(big.root(), "/a");
        let foreign = big.derive(big.root(), "/b");

        let small = GroupTree::new();
        assert!(small.contains(small.root()));
        assert!(!small.contains(foreign));
        assert!(big.contains(foreign));
    }

    #[test]
    fn test_prefix_match_is_textual() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut tree = GroupTree::new();
        let api = tree.derive(tree.root(), "/api");
        tree.attach(api, [tagger(&trace, "A")]);

        assert_eq!(tree.middlewares_for("/apiary").len(), 1);
        assert!(tree.middlewares_for("/ap").is_empty());
    }
}
