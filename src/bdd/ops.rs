use super::forest::Forest;
use super::node::{Id, Node, F, T};
use std::collections::BTreeSet;

/// The three binary boolean operators the engine ever folds at a pair of
/// leaves. A closed enum rather than a generic closure parameter (as the
/// teacher's `BDDWorker::apply` takes) because the set of operators is fixed
/// and known at compile time (spec §9, "Polymorphism for BDD operators").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    AndNot,
}

impl BinOp {
    fn eval(self, x: Id, y: Id) -> Id {
        let (x, y) = (x == T, y == T);
        let r = match self {
            BinOp::Or => x || y,
            BinOp::And => x && y,
            BinOp::AndNot => x && !y,
        };
        if r { T } else { F }
    }
}

/// `+infinity` rank for a terminal node's (non-existent) variable, so that
/// `min` between a real variable and a terminal always picks the real one.
fn rank(var: u32) -> u32 {
    if var == 0 { u32::MAX } else { var }
}

/// Binary `apply` where both operands and the result live in the same
/// forest (e.g. `prog.bdd_and(z, r.hsym)`, or combining `add`/`del`/`db`
/// within `dbs`).
pub fn apply_same(f: &mut Forest, x: Id, y: Id, op: BinOp) -> Id {
    let vx = f.getnode(x);
    let vy = f.getnode(y);
    if vx.is_leaf() && vy.is_leaf() {
        return op.eval(vx.hi, vy.hi);
    }
    let v = rank(vx.var).min(rank(vy.var));
    let (a, c) = if rank(vx.var) == v { (vx.hi, vx.lo) } else { (x, x) };
    let (b, d) = if rank(vy.var) == v { (vy.hi, vy.lo) } else { (y, y) };
    let hi = apply_same(f, a, b, op);
    let lo = apply_same(f, c, d, op);
    f.add(Node { var: v, hi, lo })
}

/// Binary `apply` across two distinct forests: `x` is resolved in `dest`
/// (which also receives the result), `y` is resolved in the read-only
/// `other`. Used whenever one operand already lives in the destination
/// forest — the only shape the PFP driver ever needs (spec §4.5 steps b, f).
pub fn apply_cross(dest: &mut Forest, x: Id, other: &Forest, y: Id, op: BinOp) -> Id {
    let vx = dest.getnode(x);
    let vy = other.getnode(y);
    if vx.is_leaf() && vy.is_leaf() {
        return op.eval(vx.hi, vy.hi);
    }
    let v = rank(vx.var).min(rank(vy.var));
    let (a, c) = if rank(vx.var) == v { (vx.hi, vx.lo) } else { (x, x) };
    let (b, d) = if rank(vy.var) == v { (vy.hi, vy.lo) } else { (y, y) };
    let hi = apply_cross(dest, a, other, b, op);
    let lo = apply_cross(dest, c, other, d, op);
    dest.add(Node { var: v, hi, lo })
}

/// Existential quantification over `vars`, folded into a single recursive
/// descent (the "unary apply" of spec §4.2): a node whose variable is being
/// quantified is replaced by the OR of its children, forgetting the
/// variable; everything else is copied unchanged. Quantification recurses
/// into the merged result on the quantified branch too — `BIT`'s layout
/// interleaves quantified and surviving bits at every level, so a single
/// non-recursive OR at the topmost quantified variable would leave
/// lower-level quantified bits stranded in the merged subtree.
pub fn apply_exists(f: &mut Forest, x: Id, vars: &BTreeSet<Id>) -> Id {
    let n = f.getnode(x);
    if n.is_leaf() {
        return x;
    }
    if vars.contains(&(n.var as Id)) {
        let hi = apply_exists(f, n.hi, vars);
        let lo = apply_exists(f, n.lo, vars);
        apply_same(f, hi, lo, BinOp::Or)
    } else {
        let hi = apply_exists(f, n.hi, vars);
        let lo = apply_exists(f, n.lo, vars);
        f.add(Node { var: n.var, hi, lo })
    }
}

/// `permute(b, x, r, m)`: rebuild `x`, remapping each variable `v` present in
/// `m` to `m[v]`, leaving anything else untouched. Relies on the numeric
/// discipline documented in spec §9(a): every target variable `m` can ever
/// produce here is a head-position id, which `BIT` guarantees is numerically
/// `<=` every body-position id, so it is always safe to re-insert it above
/// the recursively rebuilt children.
pub fn permute(f: &mut Forest, x: Id, m: &std::collections::BTreeMap<Id, Id>) -> Id {
    let n = f.getnode(x);
    if n.is_leaf() {
        return x;
    }
    let hi = permute(f, n.hi, m);
    let lo = permute(f, n.lo, m);
    let target = *m.get(&(n.var as Id)).unwrap_or(&(n.var as Id));
    debug_assert!(
        decision_var(f, hi).map_or(true, |v| target as u32 <= v)
            && decision_var(f, lo).map_or(true, |v| target as u32 <= v),
        "permute target variable must stay above its own subtrees"
    );
    ite(f, target, hi, lo)
}

fn decision_var(f: &Forest, id: Id) -> Option<u32> {
    let n = f.getnode(id);
    if n.is_leaf() { None } else { Some(n.var) }
}

/// `from_bit(x, v)`: a single-variable node asserting `var(x) == v`.
pub fn from_bit(f: &mut Forest, var: Id, value: bool) -> Id {
    if value {
        f.add(Node { var, hi: T, lo: F })
    } else {
        f.add(Node { var, hi: F, lo: T })
    }
}

/// `from_eq(x, y) = (bit_x AND bit_y) OR (NOT bit_x AND NOT bit_y)`.
pub fn from_eq(f: &mut Forest, x: Id, y: Id) -> Id {
    let bx = from_bit(f, x, true);
    let by = from_bit(f, y, true);
    let nbx = from_bit(f, x, false);
    let nby = from_bit(f, y, false);
    let both = apply_same(f, bx, by, BinOp::And);
    let neither = apply_same(f, nbx, nby, BinOp::And);
    apply_same(f, both, neither, BinOp::Or)
}

/// `ite(v, t, e) = (bit_v AND t) OR (NOT bit_v AND e)`.
pub fn ite(f: &mut Forest, v: Id, t: Id, e: Id) -> Id {
    let bv = from_bit(f, v, true);
    let nbv = from_bit(f, v, false);
    let then_branch = apply_same(f, bv, t, BinOp::And);
    let else_branch = apply_same(f, nbv, e, BinOp::And);
    apply_same(f, then_branch, else_branch, BinOp::Or)
}

/// Enumerate every assignment of the first `nvars` variables (1-based, in
/// order) that satisfies `x`, as `nvars`-wide bit vectors.
pub fn allsat(f: &Forest, x: Id, nvars: usize) -> Vec<Vec<bool>> {
    let mut out = Vec::new();
    let mut prefix = vec![false; nvars];
    sat(f, 1, nvars as u32, f.getnode(x), &mut prefix, &mut out);
    out
}

fn sat(f: &Forest, v: u32, nvars: u32, n: Node, prefix: &mut Vec<bool>, out: &mut Vec<Vec<bool>>) {
    if n.is_leaf() && !n.is_true_leaf() {
        return;
    }
    if v < n.var {
        // don't-care: variable v doesn't appear below this node yet.
        prefix[(v - 1) as usize] = true;
        sat(f, v + 1, nvars, n, prefix, out);
        prefix[(v - 1) as usize] = false;
        sat(f, v + 1, nvars, n, prefix, out);
    } else if v == nvars + 1 {
        out.push(prefix.clone());
    } else {
        prefix[(v - 1) as usize] = true;
        sat(f, v + 1, nvars, f.getnode(n.hi), prefix, out);
        prefix[(v - 1) as usize] = false;
        sat(f, v + 1, nvars, f.getnode(n.lo), prefix, out);
    }
}
