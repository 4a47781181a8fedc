//! Operator table: maps source operators to target rendering rules

use std::collections::{BTreeSet, HashMap};

/// Binding strength of rendered expressions, loosest first.
///
/// An operand is parenthesized when its precedence is lower than the
/// minimum its position demands.
pub mod precedence {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    /// Comparisons, IS [NOT] NULL, LIKE, BETWEEN
    pub const COMPARISON: u8 = 4;
    pub const CONCAT: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
    pub const UNARY: u8 = 8;
    /// Literals, column references, function calls, CASE, CAST
    pub const ATOM: u8 = 9;
}

/// Number of operands an entry accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{k}"),
            Arity::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            Arity::AtLeast(lo) => write!(f, "{lo}+"),
        }
    }
}

/// One piece of a rewrite template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// Literal output text
    Text(&'static str),
    /// Operand by index, parenthesized when looser than the given precedence
    Arg(usize, u8),
}

/// A fixed rewrite: output text with operand placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub pieces: &'static [Piece],
    /// Precedence of the rendered result
    pub precedence: u8,
}

impl Template {
    /// Human-readable form, e.g. `SUBSTR({0}, {1})`
    pub fn describe(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => (*text).to_string(),
                Piece::Arg(i, _) => format!("{{{i}}}"),
            })
            .collect()
    }
}

/// How a call is rendered in the target dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRule {
    /// `NAME(a, b, ...)` under a target name
    Rename(&'static str),
    /// Fixed rewrite
    Template(Template),
    /// Rewrite selected by operand count
    ArityDispatch(&'static [(usize, Template)]),
    /// Operands joined by a keyword, e.g. `a AND b AND c`
    VariadicInfix {
        keyword: &'static str,
        precedence: u8,
    },
    /// `PREFIX[a, b]`, e.g. `ARRAY[1, 2]`
    Bracketed { prefix: &'static str },
    /// `CAST(x AS <call type>)`
    Cast,
    /// `CASE WHEN c THEN r ... [ELSE e] END` over `[c1, r1, c2, r2, ..., e]`
    Case,
    /// `MAP(ARRAY[k...], ARRAY[v...])` over `[k1, v1, k2, v2, ...]`
    MapConstructor,
}

impl RenderRule {
    pub fn describe(&self) -> String {
        match self {
            RenderRule::Rename(name) => format!("{name}(...)"),
            RenderRule::Template(t) => t.describe(),
            RenderRule::ArityDispatch(arms) => arms
                .iter()
                .map(|(n, t)| format!("[{n}] {}", t.describe()))
                .collect::<Vec<_>>()
                .join("; "),
            RenderRule::VariadicInfix { keyword, .. } => format!("{{0}} {keyword} {{1}} ..."),
            RenderRule::Bracketed { prefix } => format!("{prefix}[...]"),
            RenderRule::Cast => "CAST({0} AS <type>)".to_string(),
            RenderRule::Case => "CASE WHEN ... THEN ... ELSE ... END".to_string(),
            RenderRule::MapConstructor => "MAP(ARRAY[keys], ARRAY[values])".to_string(),
        }
    }
}

/// A registered operator
#[derive(Debug, Clone, Copy)]
pub struct OperatorEntry {
    pub name: &'static str,
    pub arity: Arity,
    pub rule: RenderRule,
}

/// Result of looking up a call in the table
#[derive(Debug)]
pub enum Lookup<'a> {
    /// Registered with a matching arity
    Rule(&'a RenderRule),
    /// Registered, but no entry accepts this many operands
    ArityMismatch(Vec<Arity>),
    /// Not registered; the name is the same in both dialects
    PassThrough,
    /// Not registered and not known to be safe
    Unknown,
}

/// Registry of render rules keyed by upper-cased source name and arity
#[derive(Debug, Default)]
pub struct OperatorTable {
    entries: HashMap<String, Vec<OperatorEntry>>,
    pass_through: BTreeSet<String>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator
    pub fn with(mut self, name: &'static str, arity: Arity, rule: RenderRule) -> Self {
        self.entries
            .entry(name.to_uppercase())
            .or_default()
            .push(OperatorEntry { name, arity, rule });
        self
    }

    /// Register names rendered verbatim as `NAME(args)`
    pub fn with_pass_through(mut self, names: &[&str]) -> Self {
        self.pass_through
            .extend(names.iter().map(|n| n.to_uppercase()));
        self
    }

    /// Find the rule for a call with `arity` operands
    pub fn lookup(&self, name: &str, arity: usize) -> Lookup<'_> {
        let key = name.to_uppercase();
        match self.entries.get(&key) {
            Some(entries) => entries
                .iter()
                .find(|e| e.arity.accepts(arity))
                .map(|e| Lookup::Rule(&e.rule))
                .unwrap_or_else(|| {
                    Lookup::ArityMismatch(entries.iter().map(|e| e.arity).collect())
                }),
            None if self.pass_through.contains(&key) => Lookup::PassThrough,
            None => Lookup::Unknown,
        }
    }

    pub fn is_pass_through(&self, name: &str) -> bool {
        self.pass_through.contains(&name.to_uppercase())
    }

    /// All registered entries sorted by name, then pass-through names
    pub fn entries(&self) -> (Vec<&OperatorEntry>, Vec<&str>) {
        let mut entries: Vec<&OperatorEntry> = self.entries.values().flatten().collect();
        entries.sort_by(|a, b| a.name.cmp(b.name));
        let pass_through = self.pass_through.iter().map(String::as_str).collect();
        (entries, pass_through)
    }
}
