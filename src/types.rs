//! The value-type model: scalar base kinds, vector/matrix shapes,
//! qualifiers, and the promotion rule for binary operations.

use std::fmt;

use bitflags::bitflags;

/// Scalar base kinds, ordered so that the more general numeric kind
/// compares greater (`Bool < Int < Uint < Float`). [`Type::merge`] relies
/// on this ordering for implicit promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum BaseType {
    #[default]
    Void,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Struct,
    Sampler,
    Texture,
}

bitflags! {
    /// Qualifier bits decorating a type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qualifiers: u32 {
        const EXTERN = 1 << 0;
        const STATIC = 1 << 1;
        const UNIFORM = 1 << 2;
        const VOLATILE = 1 << 3;
        const PRECISE = 1 << 4;
        const IN = 1 << 5;
        const OUT = 1 << 6;
        const INOUT = Self::IN.bits() | Self::OUT.bits();
        const CONST = 1 << 8;
        const LINEAR = 1 << 10;
        const NOPERSPECTIVE = 1 << 11;
        const CENTROID = 1 << 12;
        const NOINTERPOLATION = 1 << 13;
    }
}

/// A parsed value type: base kind plus vector/matrix shape, qualifiers and
/// array length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Type {
    pub base: BaseType,
    /// Number of rows: 1 for scalars, N for vectors, M for MxN matrices,
    /// 0 for non-numeric types.
    pub rows: u32,
    /// Number of columns: 1 for scalars and vectors, N for MxN matrices.
    pub cols: u32,
    pub qualifiers: Qualifiers,
    /// 0 when this is not an array; negative for an unsized array.
    pub array_length: i32,
    /// Id of the struct definition when `base` is `Struct`. The definition
    /// itself is owned by the AST, not by the type.
    pub definition: u32,
}

// Qualifiers deliberately do not participate in type identity: a constant
// float3 and a plain float3 are the same type to the expression model.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.rows == other.rows
            && self.cols == other.cols
            && self.array_length == other.array_length
            && self.definition == other.definition
    }
}

impl Eq for Type {}

impl Type {
    pub const fn scalar(base: BaseType) -> Self {
        Self::matrix(base, 1, 1)
    }

    pub const fn vector(base: BaseType, rows: u32) -> Self {
        Self::matrix(base, rows, 1)
    }

    pub const fn matrix(base: BaseType, rows: u32, cols: u32) -> Self {
        Self {
            base,
            rows,
            cols,
            qualifiers: Qualifiers::empty(),
            array_length: 0,
            definition: 0,
        }
    }

    pub fn has(&self, qualifiers: Qualifiers) -> bool {
        self.qualifiers.contains(qualifiers)
    }

    pub fn is_array(&self) -> bool {
        self.array_length != 0
    }
    pub fn is_scalar(&self) -> bool {
        self.is_numeric() && !self.is_array() && !self.is_vector() && !self.is_matrix()
    }
    pub fn is_vector(&self) -> bool {
        self.rows > 1 && self.cols == 1
    }
    pub fn is_matrix(&self) -> bool {
        self.rows >= 1 && self.cols > 1
    }
    pub fn is_numeric(&self) -> bool {
        self.base >= BaseType::Bool && self.base <= BaseType::Float
    }
    pub fn is_integral(&self) -> bool {
        self.base >= BaseType::Bool && self.base <= BaseType::Uint
    }
    pub fn is_floating_point(&self) -> bool {
        self.base == BaseType::Float
    }
    pub fn is_signed(&self) -> bool {
        self.base == BaseType::Int || self.base == BaseType::Float
    }
    pub fn is_boolean(&self) -> bool {
        self.base == BaseType::Bool
    }
    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
    }
    pub fn is_string(&self) -> bool {
        self.base == BaseType::String
    }
    pub fn is_struct(&self) -> bool {
        self.base == BaseType::Struct
    }
    pub fn is_sampler(&self) -> bool {
        self.base == BaseType::Sampler
    }
    pub fn is_texture(&self) -> bool {
        self.base == BaseType::Texture
    }

    pub fn components(&self) -> u32 {
        self.rows * self.cols
    }

    /// Result type of a binary arithmetic or comparison operation between
    /// two operand types.
    ///
    /// The base kind promotes to the more general operand. A scalar operand
    /// broadcasts to the other side's shape; two non-scalar operands
    /// truncate to the smaller shape. Of the qualifiers only `PRECISE`
    /// survives, from either side. Rejecting senseless combinations (a
    /// struct with a scalar, say) is the caller's job before merging.
    pub fn merge(lhs: &Type, rhs: &Type) -> Type {
        let mut result = Type {
            base: lhs.base.max(rhs.base),
            ..Type::default()
        };

        if (lhs.rows == 1 && lhs.cols == 1) || (rhs.rows == 1 && rhs.cols == 1) {
            result.rows = lhs.rows.max(rhs.rows);
            result.cols = lhs.cols.max(rhs.cols);
        } else {
            result.rows = lhs.rows.min(rhs.rows);
            result.cols = lhs.cols.min(rhs.cols);
        }

        result.qualifiers =
            (lhs.qualifiers & Qualifiers::PRECISE) | (rhs.qualifiers & Qualifiers::PRECISE);

        result
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.base {
            BaseType::Void => "void",
            BaseType::Bool => "bool",
            BaseType::Int => "int",
            BaseType::Uint => "uint",
            BaseType::Float => "float",
            BaseType::String => "string",
            BaseType::Struct => "struct",
            BaseType::Sampler => "sampler",
            BaseType::Texture => "texture",
        };
        f.write_str(base)?;

        if self.cols > 1 {
            write!(f, "{}x{}", self.rows, self.cols)?;
        } else if self.rows > 1 {
            write!(f, "{}", self.rows)?;
        }

        if self.array_length > 0 {
            write!(f, "[{}]", self.array_length)?;
        } else if self.array_length < 0 {
            f.write_str("[]")?;
        }

        Ok(())
    }
}
