//! An in-memory evaluator for Datalog-with-negation under partial
//! fixed-point (PFP) semantics, using BDDs as the uniform representation of
//! both the database and compiled rules.

pub mod bdd;
pub mod dict;
pub mod parser;
pub mod pfp;
pub mod printer;
pub mod program;
pub mod rule;

pub use parser::ParseError;
pub use program::Program;

/// Read a program from source text, run it to a fixed point, and render the
/// trace of databases seen per step plus either the final database or the
/// `unsat` marker (spec §6). The single entry point the CLI (and tests)
/// drive the whole engine through.
pub fn run(src: &str) -> Result<String, ParseError> {
    use std::fmt::Write as _;

    let mut prog = Program::read(src)?;
    let mut out = String::new();
    let converged = pfp::pfp_trace(&mut prog, |p, step_no| {
        let _ = writeln!(out, "step: {step_no}");
        out.push_str(&printer::render_db(&p.dbs, p.db, p.bits, p.ar, &p.dict));
    });
    if !converged {
        out.push_str("unsat\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_reports_unsat_on_oscillation() {
        let out = run("p. q :- ~p. p :- q.").unwrap();
        assert!(out.ends_with("unsat\n"));
    }

    #[test]
    fn run_renders_the_converged_database() {
        let out = run("e 1 2. e 2 3.").unwrap();
        // a fact-only program converges in one step: one "step:" header plus
        // two tuple lines, and no "unsat" marker.
        assert!(!out.contains("unsat"));
        assert_eq!(out.lines().filter(|l| l.starts_with("step:")).count(), 1);
        let rendered: Vec<&str> = out.lines().filter(|l| !l.starts_with("step:")).collect();
        assert_eq!(rendered, vec!["e 1 2", "e 2 3"]);
    }

    #[test]
    fn run_traces_every_step_before_converging() {
        let out = run(
            "e 1 2. e 2 3. t ?x ?y :- e ?x ?y. t ?x ?z :- t ?x ?y, e ?y ?z.",
        )
        .unwrap();
        // three steps to reach the fixed point: facts only, one join applied,
        // the join re-applied with no new effect.
        assert_eq!(out.lines().filter(|l| l.starts_with("step:")).count(), 3);
        assert!(!out.contains("unsat"));
        // the transitive tuple only appears once the second join has run.
        assert!(!out.lines().take_while(|l| *l != "step: 3").any(|l| l == "t 1 3"));
        assert!(out.lines().any(|l| l == "t 1 3"));
    }

    #[test]
    fn run_surfaces_parse_errors() {
        let err = run("t ?x ?y :~ e ?x ?y.").unwrap_err();
        assert_eq!(err, ParseError::SeparatorExpected { pos: 8 });
    }
}
