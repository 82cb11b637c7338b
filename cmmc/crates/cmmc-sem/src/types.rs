//! Symbol types.

use std::fmt;

use cmmc_par::ast::{DataType, ReturnType};

/// Kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Real,
}

impl ValueKind {
    /// Source spelling of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Real => "real",
        }
    }
}

impl From<DataType> for ValueKind {
    fn from(ty: DataType) -> Self {
        match ty {
            DataType::Int => ValueKind::Int,
            DataType::Real => ValueKind::Real,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar type, including `void` for function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Real,
    Void,
}

impl ScalarType {
    /// The value kind, or `None` for `void`.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            ScalarType::Int => Some(ValueKind::Int),
            ScalarType::Real => Some(ValueKind::Real),
            ScalarType::Void => None,
        }
    }

    /// Source spelling of the type.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Real => "real",
            ScalarType::Void => "void",
        }
    }
}

impl From<ReturnType> for ScalarType {
    fn from(ty: ReturnType) -> Self {
        match ty {
            ReturnType::Void => ScalarType::Void,
            ReturnType::Data(DataType::Int) => ScalarType::Int,
            ReturnType::Data(DataType::Real) => ScalarType::Real,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type of a declared symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymType {
    /// A scalar variable.
    Scalar(ValueKind),

    /// An array variable. The size is absent only where it was not
    /// knowable at the declaring site.
    Array {
        elem: ValueKind,
        size: Option<usize>,
    },

    /// A function: return type and ordered parameter kinds.
    Func {
        ret: ScalarType,
        params: Vec<ValueKind>,
    },
}

impl SymType {
    /// Returns true for function symbols.
    pub fn is_func(&self) -> bool {
        matches!(self, SymType::Func { .. })
    }
}

impl fmt::Display for SymType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymType::Scalar(kind) => write!(f, "{}", kind),
            SymType::Array {
                elem,
                size: Some(size),
            } => write!(f, "{}[{}]", elem, size),
            SymType::Array { elem, size: None } => write!(f, "{}[]", elem),
            SymType::Func { ret, params } => {
                let params: Vec<_> = params.iter().map(|p| p.name()).collect();
                write!(f, "function({}) -> {}", params.join(", "), ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_from_data_type() {
        assert_eq!(ValueKind::from(DataType::Int), ValueKind::Int);
        assert_eq!(ValueKind::from(DataType::Real), ValueKind::Real);
    }

    #[test]
    fn test_scalar_type_value_kind() {
        assert_eq!(ScalarType::Int.value_kind(), Some(ValueKind::Int));
        assert_eq!(ScalarType::Void.value_kind(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SymType::Scalar(ValueKind::Real).to_string(), "real");
        assert_eq!(
            SymType::Array {
                elem: ValueKind::Int,
                size: Some(3)
            }
            .to_string(),
            "int[3]"
        );
        assert_eq!(
            SymType::Array {
                elem: ValueKind::Int,
                size: None
            }
            .to_string(),
            "int[]"
        );
        assert_eq!(
            SymType::Func {
                ret: ScalarType::Void,
                params: vec![ValueKind::Int, ValueKind::Real]
            }
            .to_string(),
            "function(int, real) -> void"
        );
    }
}
