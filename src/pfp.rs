//! The partial fixed-point driver (spec §4.5), grounded on
//! `lp<K>::step`/`lp<K>::pfp`. Each step applies every rule to the current
//! database under its virtual power, accumulates positive (`add`) and
//! negative (`del`) deltas, and folds them into the database; the outer loop
//! repeats until a previously-seen database id recurs.

use crate::bdd::node::{Id, F};
use crate::bdd::ops::{apply_cross, apply_exists, apply_same, permute, BinOp};
use crate::program::Program;
use std::collections::BTreeSet;

/// Run a single PFP step in place, folding every rule's contribution into
/// `prog.db`.
pub fn step(prog: &mut Program) {
    let mut add = F;
    let mut del = F;

    for (idx, rule) in prog.rules.iter().enumerate() {
        let root_w = prog.dbs.setpow(prog.db, rule.w);
        // join the rule body against the database under this rule's
        // virtual power; the result lives in `prog` alongside `rule.h`.
        let x = apply_cross(&mut prog.prog, rule.h, &prog.dbs, root_w, BinOp::And);
        log::trace!("rule[{idx}]: h={:?} w={} db_view={:?} x={:?}", rule.h, rule.w, root_w, x);

        let y = apply_exists(&mut prog.prog, x, &rule.x);
        let z = permute(&mut prog.prog, y, &rule.hvars);
        let z = apply_same(&mut prog.prog, z, rule.hsym, BinOp::And);
        log::trace!("rule[{idx}]: y={:?} z(&hsym)={:?}", y, z);

        if rule.neg {
            del = apply_cross(&mut prog.dbs, del, &prog.prog, z, BinOp::Or);
        } else {
            add = apply_cross(&mut prog.dbs, add, &prog.prog, z, BinOp::Or);
        }
    }

    let s = apply_same(&mut prog.dbs, add, del, BinOp::AndNot);
    if s == F && add != F {
        // every tuple this step would have added was simultaneously
        // deleted: contradiction, collapse the database to false.
        prog.db = F;
    } else {
        let kept = apply_same(&mut prog.dbs, prog.db, del, BinOp::AndNot);
        prog.db = apply_same(&mut prog.dbs, kept, s, BinOp::Or);
    }
    log::debug!("step done: db={:?} add={:?} del={:?}", prog.db, add, del);
}

/// Iterate [`step`] until the database repeats. Returns `true` if the
/// repetition is a genuine fixed point (the database was already unchanged
/// from the previous step), `false` if it is an oscillation.
pub fn pfp(prog: &mut Program) -> bool {
    pfp_trace(prog, |_, _| {})
}

/// Like [`pfp`], but calls `on_step(prog, step_no)` immediately before
/// running each step, with `prog.db` still holding the pre-step database —
/// the hook the CLI uses to print the per-step trace spec §6 requires
/// (grounded on `lp<K>::pfp`'s `printdb(wcout<<"step: "<<++t<<endl)` call,
/// which runs before `step()` on every iteration).
pub fn pfp_trace(prog: &mut Program, mut on_step: impl FnMut(&Program, u64)) -> bool {
    let mut seen: BTreeSet<Id> = BTreeSet::new();
    let mut iteration = 0u64;
    loop {
        let previous = prog.db;
        seen.insert(previous);
        iteration += 1;
        log::debug!("pfp: step {iteration}, db={:?}", previous);
        on_step(prog, iteration);
        step(prog);
        if seen.contains(&prog.db) {
            return previous == prog.db;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;
    use std::collections::BTreeSet;

    /// The converged database's tuples as a set of rendered lines, so tests
    /// can assert on *which* tuples survive, not just how many.
    fn tuples(p: &Program) -> BTreeSet<String> {
        crate::printer::render_db(&p.dbs, p.db, p.bits, p.ar, &p.dict)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn set(lines: &[&str]) -> BTreeSet<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn facts_only_program_converges_immediately() {
        let mut p = Program::read("e 1 2. e 2 3.").unwrap();
        assert!(pfp(&mut p));
        assert_eq!(tuples(&p), set(&["e 1 2", "e 2 3"]));
    }

    #[test]
    fn transitive_closure_converges_to_expected_tuple_count() {
        let mut p = Program::read(
            "e 1 2. e 2 3. t ?x ?y :- e ?x ?y. t ?x ?z :- t ?x ?y, e ?y ?z.",
        )
        .unwrap();
        assert!(pfp(&mut p));
        assert_eq!(tuples(&p), set(&["e 1 2", "e 2 3", "t 1 2", "t 2 3", "t 1 3"]));
    }

    #[test]
    fn negation_excludes_the_matching_fact() {
        let mut p = Program::read("p 1. p 2. q 1. r ?x :- p ?x, ~q ?x.").unwrap();
        assert!(pfp(&mut p));
        // p 1, p 2, q 1, r 2 -- not r 1.
        assert_eq!(tuples(&p), set(&["p 1", "p 2", "q 1", "r 2"]));
    }

    #[test]
    fn oscillating_program_is_reported_as_not_a_fixed_point() {
        let mut p = Program::read("p. q :- ~p. p :- q.").unwrap();
        assert!(!pfp(&mut p));
    }

    #[test]
    fn self_join_with_repeated_variable_only_matches_the_diagonal() {
        let mut p = Program::read("e 1 1. e 1 2. s ?x :- e ?x ?x.").unwrap();
        assert!(pfp(&mut p));
        // e 1 1, e 1 2, s 1 -- not s 2. `s` is padded to arity 2.
        assert_eq!(tuples(&p), set(&["e 1 1", "e 1 2", "s 1 *"]));
    }
}
