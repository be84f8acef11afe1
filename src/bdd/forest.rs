use super::node::{Id, Node, F, T};
use std::collections::HashMap;

/// An append-only, canonicalising BDD forest, with an optional read-only
/// "virtual power" projection installed via [`Forest::setpow`].
///
/// Two forests exist in a running program (see [`crate::program::Program`]):
/// one holds the database BDD and is the one virtual power is ever applied
/// to, the other holds rule BDDs and per-step intermediates. Mixing the two
/// would make `|V|` (the node count the virtual-power arithmetic divides by)
/// unstable mid-step, which would silently corrupt the projection.
#[derive(Debug)]
pub struct Forest {
    nodes: Vec<Node>,
    index: HashMap<Node, Id>,
    /// `(root, dim)` of the currently installed virtual-power view.
    /// `dim == 1` means "no projection, view equals storage".
    power: (Id, usize),
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    /// A fresh forest with only the two terminals present.
    pub fn new() -> Forest {
        let nodes = vec![Node::terminal_false(), Node::terminal_true()];
        let mut index = HashMap::new();
        index.insert(nodes[F as usize], F);
        index.insert(nodes[T as usize], T);
        Forest { nodes, index, power: (F, 1) }
    }

    /// Number of physically stored nodes (`|V|` in spec §4.1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // terminals are always present
    }

    /// Insert `n`, or return the id of an equal existing node. If
    /// `n.hi == n.lo` the node is redundant and its child id is returned
    /// directly without growing the forest (invariant I2 of spec §3).
    pub fn add(&mut self, n: Node) -> Id {
        if n.hi == n.lo {
            return n.hi;
        }
        if let Some(&id) = self.index.get(&n) {
            return id;
        }
        let id = self.nodes.len() as Id;
        self.nodes.push(n);
        self.index.insert(n, id);
        id
    }

    /// Install a `dim`-fold virtual-power view rooted at `root`. Returns the
    /// id that refers to the `(dim-1)`-th virtual copy's root — this is what
    /// callers feed into `apply`/`allsat` in place of `root` to see the
    /// `dim`-way join. `dim == 1` disables the projection.
    pub fn setpow(&mut self, root: Id, dim: usize) -> Id {
        self.power = (root, dim);
        if self.is_leaf(root) {
            root
        } else {
            root + self.len() as Id * (dim as Id - 1)
        }
    }

    fn is_leaf(&self, id: Id) -> bool {
        id == F || id == T || self.nodes[id as usize].is_leaf()
    }

    /// Fetch the node `n` refers to, resolving the virtual-power projection
    /// if one is installed and `n` falls outside the physically stored range.
    ///
    /// This never mutates the forest: the projection is a read-only view, and
    /// ids it returns inside `hi`/`lo` must only be fed back into
    /// `getnode`/`apply`/`allsat`, never into [`Forest::add`] directly (spec
    /// §9, "virtual power trick").
    pub fn getnode(&self, n: Id) -> Node {
        let (root, dim) = self.power;
        let size = self.len() as Id;
        if dim == 1 || n < size {
            return self.nodes[n as usize];
        }
        let m = n % size;
        let d = n / size;
        let mut r = self.nodes[m as usize];
        r.hi = self.chain_child(r.hi, root, size, d);
        r.lo = self.chain_child(r.lo, root, size, d);
        r
    }

    /// Rewrite one child of a base node so that the `d`-th virtual copy
    /// chains to the `(d-1)`-th: a `T`-leaf becomes the next-lower copy's
    /// root, a non-leaf is shifted into the current copy, and `F` is left
    /// untouched.
    fn chain_child(&self, child: Id, root: Id, size: Id, d: Id) -> Id {
        if child == T {
            root + size * (d - 1)
        } else if child == F {
            F
        } else {
            child + size * d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminals_have_fixed_ids() {
        let f = Forest::new();
        assert_eq!(f.getnode(F), Node::terminal_false());
        assert_eq!(f.getnode(T), Node::terminal_true());
    }

    #[test]
    fn add_is_canonical() {
        let mut f = Forest::new();
        let n = Node { var: 1, hi: T, lo: F };
        let a = f.add(n);
        let b = f.add(n);
        assert_eq!(a, b);
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn add_collapses_redundant_node() {
        let mut f = Forest::new();
        let before = f.len();
        let id = f.add(Node { var: 1, hi: T, lo: T });
        assert_eq!(id, T);
        assert_eq!(f.len(), before);
    }

    #[test]
    fn setpow_identity_for_dim_one() {
        let mut f = Forest::new();
        let n = f.add(Node { var: 1, hi: T, lo: F });
        let root = f.setpow(n, 1);
        assert_eq!(root, n);
        assert_eq!(f.getnode(n), Node { var: 1, hi: T, lo: F });
    }

    #[test]
    fn setpow_on_leaf_is_identity() {
        let mut f = Forest::new();
        assert_eq!(f.setpow(T, 3), T);
        assert_eq!(f.setpow(F, 3), F);
    }

    #[test]
    fn virtual_power_chains_copies() {
        // single-variable relation "x1" : node(1, T, F)
        let mut f = Forest::new();
        let x = f.add(Node { var: 1, hi: T, lo: F });
        let size = f.len() as Id;
        let view_root = f.setpow(x, 2);
        assert_eq!(view_root, x + size);
        // second copy's node: var unchanged, hi chains to first copy's root (x)
        let top = f.getnode(view_root);
        assert_eq!(top.var, 1);
        assert_eq!(top.hi, x); // chains to the (d-1)=1st copy's root
        assert_eq!(top.lo, F);
        // first copy is untouched (it's the base node, d=0 maps to itself)
        assert_eq!(f.getnode(x), Node { var: 1, hi: T, lo: F });
    }
}
