//! Combines the dictionary and parser output into a runnable [`Program`]:
//! computes arity and bit-width, pads every term, and splits facts (folded
//! directly into the database BDD) from rules (compiled and stored). Mirrors
//! `lp<K>::prog_read` and `lp<K>`'s field layout (`dict`, `prog`/`dbs`,
//! `rules`, `db`).

use crate::bdd::forest::Forest;
use crate::bdd::node::{Id, F};
use crate::bdd::ops::BinOp;
use crate::dict::Dict;
use crate::parser::{parse_program, ParseError};
use crate::rule::{compile_rule, Rule};

pub struct Program {
    pub dict: Dict,
    /// Holds the database BDD; the only forest `setpow` is ever applied to.
    pub dbs: Forest,
    /// Holds rule BDDs and per-step intermediates.
    pub prog: Forest,
    pub rules: Vec<Rule>,
    pub db: Id,
    pub bits: usize,
    pub ar: usize,
}

impl Program {
    /// Read, intern, pad and compile an entire program from source text.
    pub fn read(src: &str) -> Result<Program, ParseError> {
        let mut dict = Dict::new();
        let mut raw_rules = parse_program(src, &mut dict)?;

        let mut ar = 0usize;
        for rule in &raw_rules {
            for term in rule {
                ar = ar.max(term.len() - 1);
            }
        }
        for rule in &mut raw_rules {
            for term in rule.iter_mut() {
                term.resize(ar + 1, 0);
            }
        }
        let bits = dict.bits() as usize;

        let mut dbs = Forest::new();
        let mut prog = Forest::new();
        let mut db = F;
        let mut rules = Vec::new();
        for raw in raw_rules {
            if raw.len() == 1 {
                let fact = compile_rule(&mut dbs, raw, bits, ar);
                db = crate::bdd::ops::apply_same(&mut dbs, db, fact.h, BinOp::Or);
            } else {
                rules.push(compile_rule(&mut prog, raw, bits, ar));
            }
        }

        Ok(Program { dict, dbs, prog, rules, db, bits, ar })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_are_folded_into_the_database() {
        let p = Program::read("e 1 2. e 2 3.").unwrap();
        assert!(p.rules.is_empty());
        assert_ne!(p.db, F);
        let sols = crate::bdd::ops::allsat(&p.dbs, p.db, p.bits * p.ar);
        assert_eq!(sols.len(), 2);
    }

    #[test]
    fn rules_are_compiled_and_kept_separate_from_facts() {
        let p = Program::read("e 1 2. t ?x ?y :- e ?x ?y.").unwrap();
        assert_eq!(p.rules.len(), 1);
        assert_eq!(p.rules[0].w, 1);
    }

    #[test]
    fn arity_is_the_max_over_all_terms() {
        let p = Program::read("e 1 2. p 1.").unwrap();
        assert_eq!(p.ar, 2);
    }
}
