use strictjson::Value;

/// `start:end:step` bounds as written; `None` selects the per-direction
/// default at evaluation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UnionEntry {
    Name(String),
    Index(i64),
    Slice(Slice),
    Wildcard,
}

#[derive(Debug, Clone)]
pub(crate) enum StepKind {
    Name(String),
    Wildcard,
    Indices(Vec<i64>),
    Slice(Slice),
    Union(Vec<UnionEntry>),
    Filter(FilterNode),
}

/// One path segment. `recursive` marks a `..` prefix: the working set is
/// expanded to every descendant before the kind is applied.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub kind: StepKind,
    pub recursive: bool,
}

/// A parsed path expression, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    pub(crate) relative: bool,
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Matches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionName {
    /// `length()` and `size()` are aliases.
    Length,
    Count,
}

#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Literal(Value),
    Path(CompiledPath),
    Function(FunctionCall),
}

#[derive(Debug, Clone)]
pub(crate) struct FunctionCall {
    pub name: FunctionName,
    pub args: Vec<Operand>,
}

/// Boolean filter tree for `?(...)` steps. `Exists` is the bare-operand
/// truthiness test.
#[derive(Debug, Clone)]
pub(crate) enum FilterNode {
    Or(Box<FilterNode>, Box<FilterNode>),
    And(Box<FilterNode>, Box<FilterNode>),
    Not(Box<FilterNode>),
    Comparison {
        op: CompareOp,
        lhs: Operand,
        rhs: Operand,
    },
    Exists(Operand),
}
