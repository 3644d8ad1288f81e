use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a port as seen from outside the structure that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input)
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("Input"),
            Direction::Output => f.write_str("Output"),
        }
    }
}

/// Signal type carried by a port or node.
///
/// `Auto` marks a type that is left for deduction; this editor never deduces
/// types itself, it only displays what the document declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SignalType {
    #[default]
    Auto,
    Bit,
    Bits(u32),
    UInt(u32),
    SInt(u32),
    Float,
    /// Named fields, in declaration order.
    Bundle(IndexMap<String, SignalType>),
}

impl SignalType {
    /// Convenience constructor for bundles from `(name, type)` pairs.
    pub fn bundle<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, SignalType)>,
        S: Into<String>,
    {
        SignalType::Bundle(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a (possibly nested) bundle field by path.
    pub fn field(&self, path: &[&str]) -> Option<&SignalType> {
        let mut cur = self;
        for name in path {
            match cur {
                SignalType::Bundle(fields) => cur = fields.get(*name)?,
                _ => return None,
            }
        }
        Some(cur)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, SignalType::Auto)
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Auto => f.write_str("Auto"),
            SignalType::Bit => f.write_str("Bit"),
            SignalType::Bits(w) => write!(f, "Bits[{}]", w),
            SignalType::UInt(w) => write!(f, "UInt[{}]", w),
            SignalType::SInt(w) => write!(f, "SInt[{}]", w),
            SignalType::Float => f.write_str("Float"),
            SignalType::Bundle(fields) => {
                f.write_str("Bundle{")?;
                for (i, (name, t)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, t)?;
                }
                f.write_str("}")
            }
        }
    }
}
