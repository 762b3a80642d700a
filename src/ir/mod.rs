//! The simplified, defunctionalized IR consumed by the backend.
//!
//! Values of these types are produced by an external frontend and arrive
//! either as JSON or as a binary container (see [`crate::binary`]).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier from the frontend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(pub String);

impl Name {
    pub fn new(s: impl Into<String>) -> Self {
        Name(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallKind {
    #[default]
    Normal,
    /// Tail position as reported by the frontend. Lowered like `Normal`.
    Tail,
    /// Application of the enclosing function to itself in tail position.
    /// Only the tail-call normalizer produces this.
    #[serde(skip)]
    SelfTail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var(Name),
    App {
        #[serde(default)]
        call: CallKind,
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    LazyApp {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Lazy(Box<Expr>),
    Force(Box<Expr>),
    Lam {
        params: Vec<Name>,
        body: Box<Expr>,
    },
    Let {
        name: Name,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    Con {
        name: Name,
        args: Vec<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        alts: Vec<Alt>,
    },
    /// Field projection; `index` is zero-based over the constructor's fields.
    Proj {
        expr: Box<Expr>,
        index: usize,
    },
    Const(Const),
    Foreign {
        target: ForeignDesc,
        args: Vec<Expr>,
    },
    Prim {
        op: PrimOp,
        args: Vec<Expr>,
    },
    Error(String),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alt {
    Con {
        name: Name,
        bindings: Vec<Name>,
        body: Expr,
    },
    Const {
        value: Const,
        body: Expr,
    },
    Default {
        body: Expr,
    },
}

impl Alt {
    pub fn body(&self) -> &Expr {
        match self {
            Alt::Con { body, .. } | Alt::Const { body, .. } | Alt::Default { body } => body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        match self {
            Alt::Con { body, .. } | Alt::Const { body, .. } | Alt::Default { body } => body,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Alt::Default { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Const {
    Int(i64),
    /// Arbitrary-precision integer in decimal notation, optionally signed.
    BigInt(String),
    Float(f64),
    Char(char),
    Str(String),
}

/// Numeric kind a primitive operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumKind {
    Int,
    UInt,
    BigInt,
    Float,
    Char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimOp {
    Add(NumKind),
    Sub(NumKind),
    Mul(NumKind),
    Div(NumKind),
    Rem(NumKind),
    Eq(NumKind),
    Lt(NumKind),
    /// Integer width change (truncation, sign/zero extension).
    Resize,
    IntToStr,
    StrToInt,
    StrConcat,
    StrRev,
    StrHead,
    StrTail,
    ReadLine,
    WriteStr,
    // Recognized by the frontend contract but without a translation rule.
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    StrLen,
    StrIndex,
    StrCons,
    External(String),
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimOp::External(name) => write!(f, "external {name}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Description of a foreign call target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForeignDesc {
    Str(String),
    Con(String),
    App { head: String, args: Vec<ForeignDesc> },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Fun {
        name: Name,
        params: Vec<Name>,
        body: Expr,
    },
    Con {
        name: Name,
        #[serde(default)]
        tag: Option<u32>,
        arity: usize,
    },
}

impl Decl {
    pub fn name(&self) -> &Name {
        match self {
            Decl::Fun { name, .. } | Decl::Con { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = (&Name, &[Name], &Expr)> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Fun { name, params, body } => Some((name, params.as_slice(), body)),
            Decl::Con { .. } => None,
        })
    }
}

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var(Name::from(name))
    }

    pub fn app(func: Expr, args: Vec<Expr>) -> Expr {
        Expr::App { call: CallKind::Normal, func: Box::new(func), args }
    }

    pub fn let_in(name: &str, value: Expr, body: Expr) -> Expr {
        Expr::Let { name: Name::from(name), value: Box::new(value), body: Box::new(body) }
    }

    pub fn case(scrutinee: Expr, alts: Vec<Alt>) -> Expr {
        Expr::Case { scrutinee: Box::new(scrutinee), alts }
    }

    pub fn prim(op: PrimOp, args: Vec<Expr>) -> Expr {
        Expr::Prim { op, args }
    }

    pub fn int(n: i64) -> Expr {
        Expr::Const(Const::Int(n))
    }

    /// Free variable names, in sorted order.
    pub fn free_vars(&self) -> BTreeSet<Name> {
        let mut out = BTreeSet::new();
        let mut bound = Vec::new();
        collect_free(self, &mut bound, &mut out);
        out
    }
}

fn collect_free(expr: &Expr, bound: &mut Vec<Name>, out: &mut BTreeSet<Name>) {
    match expr {
        Expr::Var(n) => {
            if !bound.contains(n) {
                out.insert(n.clone());
            }
        }
        Expr::App { func, args, .. } | Expr::LazyApp { func, args } => {
            collect_free(func, bound, out);
            for a in args {
                collect_free(a, bound, out);
            }
        }
        Expr::Lazy(e) | Expr::Force(e) | Expr::Proj { expr: e, .. } => collect_free(e, bound, out),
        Expr::Lam { params, body } => {
            let mark = bound.len();
            bound.extend(params.iter().cloned());
            collect_free(body, bound, out);
            bound.truncate(mark);
        }
        Expr::Let { name, value, body } => {
            collect_free(value, bound, out);
            bound.push(name.clone());
            collect_free(body, bound, out);
            bound.pop();
        }
        Expr::Con { args, .. } | Expr::Foreign { args, .. } | Expr::Prim { args, .. } => {
            for a in args {
                collect_free(a, bound, out);
            }
        }
        Expr::Case { scrutinee, alts } => {
            collect_free(scrutinee, bound, out);
            for alt in alts {
                let mark = bound.len();
                if let Alt::Con { bindings, .. } = alt {
                    bound.extend(bindings.iter().cloned());
                }
                collect_free(alt.body(), bound, out);
                bound.truncate(mark);
            }
        }
        Expr::Const(_) | Expr::Error(_) | Expr::Nothing => {}
    }
}
