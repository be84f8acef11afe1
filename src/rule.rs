//! Compilation of a padded raw rule into a BDD-backed [`Rule`] record
//! (spec §4.3).

use crate::bdd::forest::Forest;
use crate::bdd::node::{Id, T};
use crate::bdd::ops::{apply_same, from_bit, from_eq, BinOp};
use std::collections::{BTreeMap, BTreeSet};

/// A padded raw rule: `w + 1` terms (body atoms, then the head last), each
/// `ar + 1` long (a sign followed by `ar` arguments). Positive arguments are
/// symbol ids, negative arguments are variable ids, `0` is padding.
pub type RawTerm = Vec<i64>;
pub type RawRule = Vec<RawTerm>;

/// A compiled rule: a BDD for the body conjunction plus the metadata needed
/// to rebuild the head and apply it to the database under the right virtual
/// power (spec §3, "Rule record").
#[derive(Debug, Clone)]
pub struct Rule {
    pub neg: bool,
    pub h: Id,
    pub hsym: Id,
    pub w: usize,
    pub x: BTreeSet<Id>,
    pub hvars: BTreeMap<Id, Id>,
}

/// The 1-based BDD variable id for body index `i` (0 for the head),
/// argument index `j`, bit index `b` (spec §3, "Variable numbering").
fn bit(i: usize, j: usize, b: usize, bits: usize, ar: usize) -> Id {
    ((i * bits + b) * ar + j + 1) as Id
}

/// Where a symbol/variable value was first seen within a rule: `(body
/// index, argument index)`.
type Occurrence = (usize, usize);

/// Compile a padded raw rule (see [`RawRule`]) into a [`Rule`], using `f` as
/// the forest for all intermediate and final BDD construction.
pub fn compile_rule(f: &mut Forest, mut rule: RawRule, bits: usize, ar: usize) -> Rule {
    let head = rule.pop().expect("a rule always has at least a head term");
    let w = rule.len();
    let neg = head[0] < 0;

    let mut hvars: BTreeMap<i64, usize> = BTreeMap::new();
    let mut hsym = T;
    for j in 1..head.len() {
        let v = head[j];
        if v < 0 {
            // first occurrence wins for a repeated head variable, matching
            // the original's `map::emplace` semantics.
            hvars.entry(v).or_insert(j - 1);
        } else {
            for b in 0..bits {
                hsym = apply_same(f, hsym, from_bit(f, bit(0, j - 1, b, bits, ar), (v >> b) & 1 == 1), BinOp::And);
            }
        }
    }

    let mut h = T;
    let mut x: BTreeSet<Id> = BTreeSet::new();
    let mut r_hvars: BTreeMap<Id, Id> = BTreeMap::new();
    let mut npad = crate::bdd::node::F;
    let mut seen: BTreeMap<i64, Occurrence> = BTreeMap::new();

    for (i, term) in rule.into_iter().enumerate() {
        let bneg = term[0] < 0;
        let mut k = T;
        for j in 1..term.len() {
            let val = term[j];
            if let Some(&(pi, pj)) = seen.get(&val) {
                for b in 0..bits {
                    let eq = from_eq(f, bit(i, j - 1, b, bits, ar), bit(pi, pj, b, bits, ar));
                    k = apply_same(f, k, eq, BinOp::And);
                }
                if hvars.contains_key(&val) {
                    for b in 0..bits {
                        x.insert(bit(i, j - 1, b, bits, ar));
                    }
                }
            } else {
                seen.insert(val, (i, j - 1));
                if val >= 0 {
                    // a symbol, OR a fresh padding slot (val == 0 is the pad
                    // sentinel and is pinned to all-zero bits exactly like any
                    // other symbol): pin every bit, and quantify it away (it
                    // never surfaces in the head).
                    for b in 0..bits {
                        let bv = bit(i, j - 1, b, bits, ar);
                        let fixed = from_bit(f, bv, (val >> b) & 1 == 1);
                        k = apply_same(f, k, fixed, BinOp::And);
                        x.insert(bv);
                    }
                } else {
                    match hvars.get(&val) {
                        None => {
                            // a body-only variable: quantify every bit away.
                            for b in 0..bits {
                                x.insert(bit(i, j - 1, b, bits, ar));
                            }
                        }
                        Some(&jh) => {
                            // first occurrence of a head variable: wire its
                            // bits into hvars so permute can lift them.
                            for b in 0..bits {
                                r_hvars.insert(bit(i, j - 1, b, bits, ar), bit(0, jh, b, bits, ar));
                            }
                        }
                    }
                    // reject the all-zero (padding) value in this position,
                    // so a variable can never accidentally match a pad slot.
                    let mut notpad = T;
                    for b in 0..bits {
                        let zero = from_bit(f, bit(i, j - 1, b, bits, ar), false);
                        notpad = apply_same(f, notpad, zero, BinOp::And);
                    }
                    npad = apply_same(f, npad, notpad, BinOp::Or);
                }
            }
        }
        h = if bneg {
            apply_same(f, h, k, BinOp::AndNot)
        } else {
            apply_same(f, h, k, BinOp::And)
        };
    }

    h = apply_same(f, h, npad, BinOp::AndNot);
    if w == 0 {
        h = hsym;
    }

    Rule { neg, h, hsym, w, x, hvars: r_hvars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::ops::allsat;

    #[test]
    fn fact_compiles_to_hsym() {
        let mut f = Forest::new();
        // e 1 2 . -- a single ground fact, arity 2, bits wide enough for {1,2}
        let bits = 2;
        let ar = 2;
        let raw: RawRule = vec![vec![1, 1, 2]];
        let r = compile_rule(&mut f, raw, bits, ar);
        assert_eq!(r.w, 0);
        assert_eq!(r.h, r.hsym);
        let sols = allsat(&f, r.h, bits * ar);
        assert_eq!(sols.len(), 1);
    }

    #[test]
    fn rule_existential_set_excludes_head_vars() {
        let mut f = Forest::new();
        let bits = 2;
        let ar = 2;
        // t ?x ?y :- e ?x ?y .
        let raw: RawRule = vec![vec![1, -1, -2], vec![1, -1, -2]];
        let r = compile_rule(&mut f, raw, bits, ar);
        // both head variables are wired through hvars, not quantified.
        assert_eq!(r.hvars.len(), bits * 2);
        assert!(r.x.is_empty());
    }

    #[test]
    fn self_join_adds_from_eq_constraint() {
        let mut f = Forest::new();
        let bits = 2;
        let ar = 2;
        // s ?x :- e ?x ?x . (head padded to the body's arity with 0)
        let raw: RawRule = vec![vec![1, -1, -1], vec![1, -1, 0]];
        let r = compile_rule(&mut f, raw, bits, ar);
        assert_eq!(r.hvars.len(), bits);
        // the repeated occurrence contributes an existential, per spec note.
        assert_eq!(r.x.len(), bits);
    }
}
