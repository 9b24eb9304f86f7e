//! The expression model a parser builds postfix syntax on: an access chain
//! of casts, member lookups, indexing and swizzles, plus in-place constant
//! folding.

use smallvec::SmallVec;

use crate::token::{Location, TokenId};
use crate::types::{BaseType, Qualifiers, Type};

// =============================================================================
// 1. Constant values
// =============================================================================

/// A compile-time constant.
///
/// Numeric lanes are stored as raw bits and reinterpreted as float, signed
/// or unsigned through the accessors, exactly like the register unions the
/// language's `asfloat`/`asint`/`asuint` intrinsics operate on. Lanes at
/// and beyond the owning type's `components()` are not meaningful; swizzle
/// and index operations zero them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constant {
    pub bits: [u32; 16],
    /// Payload of string-typed constants.
    pub string_data: String,
    /// Element values when this constant is array-typed.
    pub array_data: Vec<Constant>,
}

impl Constant {
    #[inline]
    pub fn uint(&self, lane: usize) -> u32 {
        self.bits[lane]
    }
    #[inline]
    pub fn int(&self, lane: usize) -> i32 {
        self.bits[lane] as i32
    }
    #[inline]
    pub fn float(&self, lane: usize) -> f32 {
        f32::from_bits(self.bits[lane])
    }

    #[inline]
    pub fn set_uint(&mut self, lane: usize, value: u32) {
        self.bits[lane] = value;
    }
    #[inline]
    pub fn set_int(&mut self, lane: usize, value: i32) {
        self.bits[lane] = value as u32;
    }
    #[inline]
    pub fn set_float(&mut self, lane: usize, value: f32) {
        self.bits[lane] = value.to_bits();
    }
}

/// A literal value used to reset an expression to a constant, together
/// with the type it implies. One [`Expression::reset_to_rvalue_constant`]
/// call site per scalar kind, plus the composite form the parser uses for
/// array and aggregate constants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    Uint(u32),
    Str(String),
    Composite(Constant, Type),
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}
impl From<f32> for ConstantValue {
    fn from(value: f32) -> Self {
        ConstantValue::Float(value)
    }
}
impl From<i32> for ConstantValue {
    fn from(value: i32) -> Self {
        ConstantValue::Int(value)
    }
}
impl From<u32> for ConstantValue {
    fn from(value: u32) -> Self {
        ConstantValue::Uint(value)
    }
}
impl From<String> for ConstantValue {
    fn from(value: String) -> Self {
        ConstantValue::Str(value)
    }
}
impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::Str(value.to_owned())
    }
}
impl From<(Constant, Type)> for ConstantValue {
    fn from((constant, ty): (Constant, Type)) -> Self {
        ConstantValue::Composite(constant, ty)
    }
}

// =============================================================================
// 2. Access chains
// =============================================================================

/// One step of an expression's access chain.
///
/// The code generator replays these against its own value representation;
/// each step carries the types it transitions between, so the chain is
/// self-describing without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOp {
    Cast {
        from: Type,
        to: Type,
    },
    Member {
        from: Type,
        to: Type,
        index: u32,
    },
    ConstantIndex {
        from: Type,
        to: Type,
        index: u32,
    },
    /// `index` is the code-generator id of the value producing the index.
    DynamicIndex {
        from: Type,
        to: Type,
        index: u32,
    },
    /// Lane selectors; -1 marks lanes beyond the swizzle length.
    Swizzle {
        from: Type,
        to: Type,
        mask: [i8; 4],
    },
}

// =============================================================================
// 3. Expressions
// =============================================================================

/// A partially built expression: its current type, the id of the value it
/// denotes (meaningful only to the code generator), and the chain of
/// accesses applied so far.
///
/// The parser resets an expression with one of the `reset_to_*` operations
/// and then appends accesses as it consumes postfix syntax; chain entries
/// are only ever appended until the next reset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub base: u32,
    pub ty: Type,
    pub constant: Constant,
    pub is_lvalue: bool,
    pub is_constant: bool,
    pub location: Location,
    pub chain: SmallVec<[ChainOp; 2]>,
}

impl Expression {
    /// Reset to an l-value denoting the storage identified by `base`.
    pub fn reset_to_lvalue(&mut self, location: Location, base: u32, ty: Type) {
        self.base = base;
        self.ty = ty;
        self.constant = Constant::default();
        self.is_lvalue = true;
        self.is_constant = false;
        self.location = location;
        self.chain.clear();
    }

    /// Reset to an r-value. R-values are read-only, so the type picks up
    /// the `CONST` qualifier.
    pub fn reset_to_rvalue(&mut self, location: Location, base: u32, ty: Type) {
        self.base = base;
        self.ty = Type {
            qualifiers: ty.qualifiers | Qualifiers::CONST,
            ..ty
        };
        self.constant = Constant::default();
        self.is_lvalue = false;
        self.is_constant = false;
        self.location = location;
        self.chain.clear();
    }

    /// Reset to a constant r-value.
    pub fn reset_to_rvalue_constant(&mut self, location: Location, value: impl Into<ConstantValue>) {
        let (constant, ty) = match value.into() {
            ConstantValue::Bool(data) => {
                let mut constant = Constant::default();
                constant.set_uint(0, data as u32);
                (constant, Type::scalar(BaseType::Bool))
            }
            ConstantValue::Float(data) => {
                let mut constant = Constant::default();
                constant.set_float(0, data);
                (constant, Type::scalar(BaseType::Float))
            }
            ConstantValue::Int(data) => {
                let mut constant = Constant::default();
                constant.set_int(0, data);
                (constant, Type::scalar(BaseType::Int))
            }
            ConstantValue::Uint(data) => {
                let mut constant = Constant::default();
                constant.set_uint(0, data);
                (constant, Type::scalar(BaseType::Uint))
            }
            ConstantValue::Str(data) => {
                let constant = Constant {
                    string_data: data,
                    ..Constant::default()
                };
                (constant, Type::matrix(BaseType::String, 0, 0))
            }
            ConstantValue::Composite(constant, ty) => (constant, ty),
        };

        self.base = 0;
        self.ty = Type {
            qualifiers: ty.qualifiers | Qualifiers::CONST,
            ..ty
        };
        self.constant = constant;
        self.is_lvalue = false;
        self.is_constant = true;
        self.location = location;
        self.chain.clear();
    }

    /// Cast the expression to `target`.
    ///
    /// A resize between two column shapes is expressed as a swizzle first:
    /// demotion drops trailing lanes, promotion repeats the last source
    /// lane. Constants are rewritten in place; everything else appends a
    /// `Cast` to the chain. Array types cannot be cast at this layer.
    pub fn add_cast_operation(&mut self, target: Type) {
        if self.ty == target {
            return;
        }

        if (self.ty.is_scalar() || self.ty.is_vector())
            && (target.is_scalar() || target.is_vector())
            && self.ty.rows != target.rows
        {
            let mut mask: [i8; 4] = [0, 1, 2, 3];
            for lane in target.rows as usize..4 {
                mask[lane] = -1;
            }
            for lane in self.ty.rows as usize..target.rows as usize {
                mask[lane] = self.ty.rows as i8 - 1;
            }
            self.add_swizzle_access(mask, target.rows);

            if self.ty == target {
                return; // The resize was the whole cast
            }
        }

        if self.is_constant {
            fn cast_constant(constant: &mut Constant, from: &Type, to: &Type) {
                // Scalar to vector promotion broadcasts the first lane.
                if from.is_scalar() {
                    for lane in 1..to.components() as usize {
                        constant.bits[lane] = constant.bits[0];
                    }
                }

                // Signedness-only changes keep the stored bits; lanes are
                // only rewritten when floating-point-ness flips.
                if from.base == to.base || from.is_floating_point() == to.is_floating_point() {
                    return;
                }

                if to.is_floating_point() {
                    for lane in 0..to.components() as usize {
                        constant.set_float(lane, constant.int(lane) as f32);
                    }
                } else {
                    for lane in 0..to.components() as usize {
                        constant.set_int(lane, constant.float(lane) as i32);
                    }
                }
            }

            let from = self.ty;
            for element in &mut self.constant.array_data {
                cast_constant(element, &from, &target);
            }
            cast_constant(&mut self.constant, &from, &target);
        } else {
            debug_assert!(
                !self.ty.is_array() && !target.is_array(),
                "cast operations cannot involve array types"
            );
            self.chain.push(ChainOp::Cast {
                from: self.ty,
                to: target,
            });
        }

        self.ty = target;
    }

    /// Append a struct member lookup. The expression must currently be of
    /// struct type.
    pub fn add_member_access(&mut self, index: u32, field_type: Type) {
        debug_assert!(self.ty.is_struct(), "member access requires a struct type");

        self.chain.push(ChainOp::Member {
            from: self.ty,
            to: field_type,
            index,
        });

        self.ty = field_type;
        self.is_constant = false;
    }

    /// Index with a value only known at runtime; `index` is the
    /// code-generator id of the indexing value.
    pub fn add_dynamic_index_access(&mut self, index: u32) {
        let mut target = self.ty;
        if target.is_array() {
            target.array_length = 0;
        } else if target.is_matrix() {
            target.rows = target.cols;
            target.cols = 1;
        } else if target.is_vector() {
            target.rows = 1;
        }

        self.chain.push(ChainOp::DynamicIndex {
            from: self.ty,
            to: target,
            index,
        });

        self.ty = target;
        self.is_constant = false;
    }

    /// Index with a compile-time constant. Arrays step down to their
    /// element type, matrices to a row vector, vectors to a scalar. On a
    /// constant expression the indexed value is extracted in place instead
    /// of growing the chain.
    pub fn add_constant_index_access(&mut self, index: u32) {
        debug_assert!(
            self.ty.is_numeric() && !self.ty.is_scalar(),
            "indexing requires a non-scalar numeric type"
        );

        let prev = self.ty;
        if self.ty.is_array() {
            self.ty.array_length = 0;
        } else if self.ty.is_matrix() {
            self.ty.rows = self.ty.cols;
            self.ty.cols = 1;
        } else if self.ty.is_vector() {
            self.ty.rows = 1;
        }

        if self.is_constant {
            if prev.is_array() {
                self.constant = self.constant.array_data[index as usize].clone();
            } else if prev.is_matrix() {
                for lane in 0..4 {
                    self.constant.bits[lane] = self.constant.bits[index as usize * 4 + lane];
                }
                self.constant.bits[4..].fill(0);
            } else {
                self.constant.bits[0] = self.constant.bits[index as usize];
                self.constant.bits[1..].fill(0);
            }
        } else {
            self.chain.push(ChainOp::ConstantIndex {
                from: prev,
                to: self.ty,
                index,
            });
        }
    }

    /// Append a swizzle selecting `length` lanes through `mask`.
    ///
    /// On a constant the lanes are reordered in place. A single-lane
    /// swizzle of a non-constant vector lowers to a `ConstantIndex`
    /// instead: the two are semantically identical and the simpler form is
    /// preferred downstream.
    pub fn add_swizzle_access(&mut self, mask: [i8; 4], length: u32) {
        debug_assert!(
            self.ty.is_numeric() && !self.ty.is_array(),
            "swizzles require a non-array numeric type"
        );

        let prev = self.ty;
        self.ty.rows = length;
        self.ty.cols = 1;

        if self.is_constant {
            debug_assert!(self.constant.array_data.is_empty());

            // Source and destination lanes overlap, so reorder from a
            // snapshot.
            let snapshot = self.constant.bits;
            for lane in 0..length as usize {
                self.constant.bits[lane] = snapshot[mask[lane] as usize];
            }
            self.constant.bits[length as usize..].fill(0);
        } else if length == 1 && prev.is_vector() {
            self.chain.push(ChainOp::ConstantIndex {
                from: prev,
                to: self.ty,
                index: mask[0] as u32,
            });
        } else {
            self.chain.push(ChainOp::Swizzle {
                from: prev,
                to: self.ty,
                mask,
            });
        }
    }

    /// Fold a unary operator into this constant expression in place.
    ///
    /// Returns `false`, leaving the expression untouched, when the
    /// expression is not a constant or the operator is not foldable.
    pub fn evaluate_constant_unary(&mut self, op: TokenId) -> bool {
        if !self.is_constant {
            return false;
        }

        let lanes = self.ty.components() as usize;
        match op {
            TokenId::Bang => {
                for lane in 0..lanes {
                    let value = (self.constant.uint(lane) == 0) as u32;
                    self.constant.set_uint(lane, value);
                }
            }
            TokenId::Minus => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let value = -self.constant.float(lane);
                        self.constant.set_float(lane, value);
                    }
                } else {
                    for lane in 0..lanes {
                        let value = self.constant.int(lane).wrapping_neg();
                        self.constant.set_int(lane, value);
                    }
                }
            }
            TokenId::Tilde => {
                for lane in 0..lanes {
                    let value = !self.constant.uint(lane);
                    self.constant.set_uint(lane, value);
                }
            }
            _ => return false,
        }

        true
    }

    /// Fold a binary operator with a constant right-hand side into this
    /// constant expression in place.
    ///
    /// Integer division or modulo by a zero lane refuses the fold and
    /// leaves the expression untouched; the caller emits the runtime
    /// instruction instead. Float division and modulo follow GPU
    /// semantics: infinity and NaN flow through without trapping. After a
    /// successful comparison fold the expression's base type becomes
    /// `Bool`.
    ///
    /// `LAnd`/`LOr` fold bitwise, identically to `Amp`/`Pipe`: both
    /// operands are fully evaluated constants by the time a fold is
    /// attempted, so short-circuiting (and checking that the right-hand
    /// side really is constant) already happened in the caller.
    pub fn evaluate_constant_binary(&mut self, op: TokenId, rhs: &Constant) -> bool {
        if !self.is_constant {
            return false;
        }

        let lanes = self.ty.components() as usize;
        match op {
            TokenId::Percent => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let divisor = rhs.float(lane);
                        let value = if divisor == 0.0 {
                            // Force the quiet-NaN bit pattern rather than
                            // whatever the host's fmod produces.
                            f32::NAN
                        } else {
                            self.constant.float(lane) % divisor
                        };
                        self.constant.set_float(lane, value);
                    }
                } else if self.ty.is_signed() {
                    if (0..lanes).any(|lane| rhs.int(lane) == 0) {
                        return false;
                    }
                    for lane in 0..lanes {
                        let value = self.constant.int(lane).wrapping_rem(rhs.int(lane));
                        self.constant.set_int(lane, value);
                    }
                } else {
                    if (0..lanes).any(|lane| rhs.uint(lane) == 0) {
                        return false;
                    }
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane) % rhs.uint(lane);
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            TokenId::Star => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let value = self.constant.float(lane) * rhs.float(lane);
                        self.constant.set_float(lane, value);
                    }
                } else {
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane).wrapping_mul(rhs.uint(lane));
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            TokenId::Plus => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let value = self.constant.float(lane) + rhs.float(lane);
                        self.constant.set_float(lane, value);
                    }
                } else {
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane).wrapping_add(rhs.uint(lane));
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            TokenId::Minus => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let value = self.constant.float(lane) - rhs.float(lane);
                        self.constant.set_float(lane, value);
                    }
                } else {
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane).wrapping_sub(rhs.uint(lane));
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            TokenId::Slash => {
                if self.ty.is_floating_point() {
                    for lane in 0..lanes {
                        let value = self.constant.float(lane) / rhs.float(lane);
                        self.constant.set_float(lane, value);
                    }
                } else if self.ty.is_signed() {
                    if (0..lanes).any(|lane| rhs.int(lane) == 0) {
                        return false;
                    }
                    for lane in 0..lanes {
                        let value = self.constant.int(lane).wrapping_div(rhs.int(lane));
                        self.constant.set_int(lane, value);
                    }
                } else {
                    if (0..lanes).any(|lane| rhs.uint(lane) == 0) {
                        return false;
                    }
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane) / rhs.uint(lane);
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            TokenId::Amp | TokenId::LAnd => {
                for lane in 0..lanes {
                    let value = self.constant.uint(lane) & rhs.uint(lane);
                    self.constant.set_uint(lane, value);
                }
            }
            TokenId::Pipe | TokenId::LOr => {
                for lane in 0..lanes {
                    let value = self.constant.uint(lane) | rhs.uint(lane);
                    self.constant.set_uint(lane, value);
                }
            }
            TokenId::Caret => {
                for lane in 0..lanes {
                    let value = self.constant.uint(lane) ^ rhs.uint(lane);
                    self.constant.set_uint(lane, value);
                }
            }
            TokenId::Lt | TokenId::Le | TokenId::Gt | TokenId::Ge => {
                for lane in 0..lanes {
                    let value = if self.ty.is_floating_point() {
                        let (a, b) = (self.constant.float(lane), rhs.float(lane));
                        match op {
                            TokenId::Lt => a < b,
                            TokenId::Le => a <= b,
                            TokenId::Gt => a > b,
                            _ => a >= b,
                        }
                    } else if self.ty.is_signed() {
                        let (a, b) = (self.constant.int(lane), rhs.int(lane));
                        match op {
                            TokenId::Lt => a < b,
                            TokenId::Le => a <= b,
                            TokenId::Gt => a > b,
                            _ => a >= b,
                        }
                    } else {
                        let (a, b) = (self.constant.uint(lane), rhs.uint(lane));
                        match op {
                            TokenId::Lt => a < b,
                            TokenId::Le => a <= b,
                            TokenId::Gt => a > b,
                            _ => a >= b,
                        }
                    };
                    self.constant.set_uint(lane, value as u32);
                }
                // Comparisons produce a boolean result type regardless of
                // the operand type.
                self.ty.base = BaseType::Bool;
            }
            TokenId::EqEq | TokenId::NotEq => {
                for lane in 0..lanes {
                    let equal = if self.ty.is_floating_point() {
                        self.constant.float(lane) == rhs.float(lane)
                    } else {
                        self.constant.uint(lane) == rhs.uint(lane)
                    };
                    let value = equal == (op == TokenId::EqEq);
                    self.constant.set_uint(lane, value as u32);
                }
                self.ty.base = BaseType::Bool;
            }
            TokenId::Shl => {
                for lane in 0..lanes {
                    let value = self.constant.uint(lane).wrapping_shl(rhs.uint(lane));
                    self.constant.set_uint(lane, value);
                }
            }
            TokenId::Shr => {
                if self.ty.is_signed() {
                    for lane in 0..lanes {
                        let value = self.constant.int(lane).wrapping_shr(rhs.uint(lane));
                        self.constant.set_int(lane, value);
                    }
                } else {
                    for lane in 0..lanes {
                        let value = self.constant.uint(lane).wrapping_shr(rhs.uint(lane));
                        self.constant.set_uint(lane, value);
                    }
                }
            }
            _ => return false,
        }

        true
    }
}
