//! Terms and substitutions
//!
//! The interpreter never looks at what a term means. It only instantiates
//! terms, collects their variables and unifies formal module parameters with
//! actual ones, so this is deliberately a small syntactic term language.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/* ===================== Terms ===================== */

/// A first-order term as produced by the program front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Term {
    Var(String),
    Atom(String),
    Num(f64),
    Str(String),
    Compound { functor: String, args: Vec<Term> },
    List(Vec<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound {
            functor: functor.into(),
            args,
        }
    }

    /// Free variables in order of first occurrence, without duplicates
    pub fn free_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    pub(crate) fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Term::Var(name) => {
                if !out.iter().any(|v| v == name) {
                    out.push(name.clone());
                }
            }
            Term::Compound { args, .. } | Term::List(args) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
            Term::Atom(_) | Term::Num(_) | Term::Str(_) => {}
        }
    }

    /// True if the term contains no variables
    pub fn is_closed(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Compound { args, .. } | Term::List(args) => args.iter().all(Term::is_closed),
            Term::Atom(_) | Term::Num(_) | Term::Str(_) => true,
        }
    }

    /// Instantiate the term, following binding chains
    pub fn apply(&self, subst: &Substitution) -> Term {
        match self {
            Term::Var(name) => match subst.get(name) {
                Some(bound) => bound.apply(subst),
                None => self.clone(),
            },
            Term::Compound { functor, args } => Term::Compound {
                functor: functor.clone(),
                args: args.iter().map(|a| a.apply(subst)).collect(),
            },
            Term::List(items) => Term::List(items.iter().map(|i| i.apply(subst)).collect()),
            Term::Atom(_) | Term::Num(_) | Term::Str(_) => self.clone(),
        }
    }

    fn occurs(&self, var: &str) -> bool {
        match self {
            Term::Var(name) => name == var,
            Term::Compound { args, .. } | Term::List(args) => args.iter().any(|a| a.occurs(var)),
            Term::Atom(_) | Term::Num(_) | Term::Str(_) => false,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Integral numbers below this magnitude display without a fraction
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) | Term::Atom(name) => write!(f, "{}", name),
            Term::Num(n) if n.fract() == 0.0 && n.abs() < I64_LIMIT => write!(f, "{}", *n as i64),
            Term::Num(n) => write!(f, "{}", n),
            Term::Str(s) => write!(f, "{:?}", s),
            Term::Compound { functor, args } => {
                write!(f, "{}(", functor)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Term::List(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
        }
    }
}

/* ===================== Substitutions ===================== */

/// Variable to term bindings
///
/// Treated as immutable by the executors: every frame owns its own copy and
/// derives new substitutions with [`Substitution::combine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Substitution {
    bindings: BTreeMap<String, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding, mostly useful in tests
    pub fn with(mut self, var: impl Into<String>, term: Term) -> Self {
        self.bind(var, term);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    pub fn bind(&mut self, var: impl Into<String>, term: Term) {
        self.bindings.insert(var.into(), term);
    }

    pub fn remove(&mut self, var: &str) -> Option<Term> {
        self.bindings.remove(var)
    }

    /// Drop every binding whose variable is not in `vars`
    pub fn retain_vars(&mut self, vars: &[String]) {
        self.bindings.retain(|v, _| vars.contains(v));
    }

    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(v, t)| (v.as_str(), t))
    }

    /// Merge two substitutions, returning None if they bind a variable to
    /// terms that do not unify
    pub fn combine(&self, other: &Substitution) -> Option<Substitution> {
        let mut merged = self.clone();
        for (var, term) in &other.bindings {
            if !unify(&Term::Var(var.clone()), term, &mut merged) {
                return None;
            }
        }
        Some(merged)
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (var, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}/{}", var, term)?;
        }
        write!(f, "]")
    }
}

/* ===================== Unification ===================== */

/// Most general unifier of two terms
pub fn mgu(left: &Term, right: &Term) -> Option<Substitution> {
    let mut subst = Substitution::new();
    unify(left, right, &mut subst).then_some(subst)
}

/// Unify two terms, extending `subst` in place
///
/// On failure `subst` may hold partial bindings; callers discard it.
pub(crate) fn unify(left: &Term, right: &Term, subst: &mut Substitution) -> bool {
    let left = left.apply(subst);
    let right = right.apply(subst);
    match (&left, &right) {
        (Term::Var(a), Term::Var(b)) if a == b => true,
        (Term::Var(var), term) | (term, Term::Var(var)) => {
            if term.occurs(var) {
                return false;
            }
            subst.bind(var.clone(), term.clone());
            true
        }
        (
            Term::Compound { functor: f1, args: a1 },
            Term::Compound { functor: f2, args: a2 },
        ) => {
            f1 == f2
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(l, r)| unify(l, r, subst))
        }
        (Term::List(l1), Term::List(l2)) => {
            l1.len() == l2.len() && l1.iter().zip(l2).all(|(l, r)| unify(l, r, subst))
        }
        _ => left == right,
    }
}
