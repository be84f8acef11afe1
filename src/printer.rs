//! Tabular database printer (spec §4.6), grounded on the original's free
//! `out<K>()`: enumerate satisfying bit-assignments via `allsat`, reshape
//! each into `ar` integers, and render each one as `*` (padding), a symbol
//! name, or `[k]` for anything else.

use crate::bdd::forest::Forest;
use crate::bdd::node::Id;
use crate::bdd::ops::allsat;
use crate::dict::Dict;
use std::fmt::Write as _;

/// Render every tuple currently satisfying `db` (bit-width `bits*ar`) into
/// one line per tuple, space-separated arguments.
pub fn render_db(dbs: &Forest, db: Id, bits: usize, ar: usize, dict: &Dict) -> String {
    let mut out = String::new();
    for assignment in allsat(dbs, db, bits * ar) {
        let mut args = vec![0i64; ar];
        for (idx, bit) in assignment.iter().enumerate() {
            if *bit {
                let j = idx % ar;
                let b = idx / ar;
                args[j] |= 1 << b;
            }
        }
        for (j, k) in args.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            if *k == 0 {
                out.push('*');
            } else if (*k as usize) <= dict.nsyms() {
                out.push_str(dict.name(*k));
            } else {
                write!(out, "[{k}]").expect("writing to a String never fails");
            }
        }
        out.push('\n');
    }
    out
}
