use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// The category of question. Chosen by the first matching rule in
/// [`crate::intent::classify`]'s ordered rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Average,
    Count,
    Max,
    Min,
    Chart,
    Comparison,
    Filter,
    Summary,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Average => write!(f, "average"),
            Self::Count => write!(f, "count"),
            Self::Max => write!(f, "max"),
            Self::Min => write!(f, "min"),
            Self::Chart => write!(f, "chart"),
            Self::Comparison => write!(f, "comparison"),
            Self::Filter => write!(f, "filter"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            "=" => Some(Self::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gt => write!(f, ">"),
            Self::Lt => write!(f, "<"),
            Self::Ge => write!(f, ">="),
            Self::Le => write!(f, "<="),
            Self::Eq => write!(f, "="),
        }
    }
}

/// A filter value: numeric when the resolved column is number-typed,
/// raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CondValue {
    Number(f64),
    Text(String),
}

impl CondValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for CondValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A structured predicate extracted from free text. Transient per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: CondValue,
}

// ---------------------------------------------------------------------------
// Result descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Area,
}

impl ChartKind {
    /// Bar unless the question names another kind.
    pub fn from_text(text: &str) -> Self {
        let t = text.to_lowercase();
        if t.contains("line") {
            Self::Line
        } else if t.contains("pie") {
            Self::Pie
        } else if t.contains("area") {
            Self::Area
        } else {
            Self::Bar
        }
    }
}

/// One chart series entry. `aggregate` is present only when a numeric
/// column was aggregated per group (comparison charts).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub category: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<f64>,
}

/// Structured payload attached to an answer. The lead-in text is always
/// present on [`Answer`]; table and chart are additive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        title: String,
    },
    Chart {
        kind: ChartKind,
        series: Vec<SeriesPoint>,
        /// Column the categories came from.
        category_key: String,
        /// Which series field the consumer should plot: "count" or "aggregate".
        value_key: String,
        title: String,
    },
}

/// The engine's output contract, consumed by presentation. Every branch
/// of `answer` terminates in one of these; errors never propagate out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Answer {
    pub fn text(content: impl Into<String>) -> Self {
        Answer {
            text: content.into(),
            payload: None,
        }
    }

    pub fn with_payload(content: impl Into<String>, payload: Payload) -> Self {
        Answer {
            text: content.into(),
            payload: Some(payload),
        }
    }
}
