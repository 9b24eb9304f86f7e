use fxlang::expr::{Constant, Expression};
use fxlang::token::{Location, TokenId};
use fxlang::types::{BaseType, Type};

fn loc() -> Location {
    Location::new(1, 1)
}

fn int_expr(value: i32) -> Expression {
    let mut expr = Expression::default();
    expr.reset_to_rvalue_constant(loc(), value);
    expr
}

fn uint_expr(value: u32) -> Expression {
    let mut expr = Expression::default();
    expr.reset_to_rvalue_constant(loc(), value);
    expr
}

fn float_expr(value: f32) -> Expression {
    let mut expr = Expression::default();
    expr.reset_to_rvalue_constant(loc(), value);
    expr
}

fn int_rhs(value: i32) -> Constant {
    let mut constant = Constant::default();
    constant.set_int(0, value);
    constant
}

fn uint_rhs(value: u32) -> Constant {
    let mut constant = Constant::default();
    constant.set_uint(0, value);
    constant
}

fn float_rhs(value: f32) -> Constant {
    let mut constant = Constant::default();
    constant.set_float(0, value);
    constant
}

fn float_vec_expr(values: &[f32]) -> Expression {
    let mut constant = Constant::default();
    for (lane, &value) in values.iter().enumerate() {
        constant.set_float(lane, value);
    }
    let ty = Type::vector(BaseType::Float, values.len() as u32);
    let mut expr = Expression::default();
    expr.reset_to_rvalue_constant(loc(), (constant, ty));
    expr
}

// -----------------------------------------------------------------------------
// Unary folds
// -----------------------------------------------------------------------------

#[test]
fn logical_not_produces_zero_or_one() {
    let mut expr = uint_expr(0);
    assert!(expr.evaluate_constant_unary(TokenId::Bang));
    assert_eq!(expr.constant.uint(0), 1);

    let mut expr = uint_expr(5);
    assert!(expr.evaluate_constant_unary(TokenId::Bang));
    assert_eq!(expr.constant.uint(0), 0);
}

#[test]
fn negate_dispatches_on_floatness() {
    let mut expr = int_expr(3);
    assert!(expr.evaluate_constant_unary(TokenId::Minus));
    assert_eq!(expr.constant.int(0), -3);

    let mut expr = float_expr(2.5);
    assert!(expr.evaluate_constant_unary(TokenId::Minus));
    assert_eq!(expr.constant.float(0), -2.5);
}

#[test]
fn negate_wraps_at_the_integer_edge() {
    let mut expr = int_expr(i32::MIN);
    assert!(expr.evaluate_constant_unary(TokenId::Minus));
    assert_eq!(expr.constant.int(0), i32::MIN);
}

#[test]
fn complement_flips_all_bits() {
    let mut expr = uint_expr(0);
    assert!(expr.evaluate_constant_unary(TokenId::Tilde));
    assert_eq!(expr.constant.uint(0), 0xFFFF_FFFF);
}

#[test]
fn unary_fold_refuses_non_constants() {
    let mut expr = Expression::default();
    expr.reset_to_rvalue(loc(), 1, Type::scalar(BaseType::Int));
    assert!(!expr.evaluate_constant_unary(TokenId::Minus));
}

#[test]
fn unary_fold_refuses_unknown_operators() {
    let mut expr = int_expr(1);
    let before = expr.clone();
    assert!(!expr.evaluate_constant_unary(TokenId::Star));
    assert_eq!(expr, before);
}

// -----------------------------------------------------------------------------
// Binary arithmetic
// -----------------------------------------------------------------------------

#[test]
fn integer_arithmetic() {
    let mut expr = int_expr(7);
    assert!(expr.evaluate_constant_binary(TokenId::Plus, &int_rhs(3)));
    assert_eq!(expr.constant.int(0), 10);

    let mut expr = int_expr(7);
    assert!(expr.evaluate_constant_binary(TokenId::Minus, &int_rhs(10)));
    assert_eq!(expr.constant.int(0), -3);

    let mut expr = int_expr(7);
    assert!(expr.evaluate_constant_binary(TokenId::Star, &int_rhs(6)));
    assert_eq!(expr.constant.int(0), 42);

    let mut expr = int_expr(7);
    assert!(expr.evaluate_constant_binary(TokenId::Slash, &int_rhs(2)));
    assert_eq!(expr.constant.int(0), 3);

    let mut expr = int_expr(7);
    assert!(expr.evaluate_constant_binary(TokenId::Percent, &int_rhs(3)));
    assert_eq!(expr.constant.int(0), 1);
}

#[test]
fn integer_division_by_zero_refuses_the_fold() {
    let mut expr = int_expr(3);
    let before = expr.clone();

    assert!(!expr.evaluate_constant_binary(TokenId::Slash, &int_rhs(0)));
    assert_eq!(expr, before, "a refused fold must leave the expression untouched");

    assert!(!expr.evaluate_constant_binary(TokenId::Percent, &int_rhs(0)));
    assert_eq!(expr, before);

    let mut expr = uint_expr(3);
    assert!(!expr.evaluate_constant_binary(TokenId::Slash, &uint_rhs(0)));
    assert!(!expr.evaluate_constant_binary(TokenId::Percent, &uint_rhs(0)));
}

#[test]
fn any_zero_lane_refuses_the_whole_fold() {
    let mut constant = Constant::default();
    constant.set_int(0, 1);
    constant.set_int(1, 0);

    let mut expr = Expression::default();
    let ty = Type::vector(BaseType::Int, 2);
    let mut lanes = Constant::default();
    lanes.set_int(0, 10);
    lanes.set_int(1, 20);
    expr.reset_to_rvalue_constant(loc(), (lanes, ty));

    let before = expr.clone();
    assert!(!expr.evaluate_constant_binary(TokenId::Slash, &constant));
    assert_eq!(expr, before);
}

#[test]
fn float_division_by_zero_is_infinity() {
    let mut expr = float_expr(3.0);
    assert!(expr.evaluate_constant_binary(TokenId::Slash, &float_rhs(0.0)));
    assert_eq!(expr.constant.float(0), f32::INFINITY);

    let mut expr = float_expr(-3.0);
    assert!(expr.evaluate_constant_binary(TokenId::Slash, &float_rhs(0.0)));
    assert_eq!(expr.constant.float(0), f32::NEG_INFINITY);
}

#[test]
fn float_modulo_by_zero_is_quiet_nan() {
    let mut expr = float_expr(0.0);
    assert!(expr.evaluate_constant_binary(TokenId::Percent, &float_rhs(0.0)));
    assert!(expr.constant.float(0).is_nan());
    // The exact quiet-NaN bit pattern is pinned down.
    assert_eq!(expr.constant.bits[0], f32::NAN.to_bits());

    let mut expr = float_expr(5.0);
    assert!(expr.evaluate_constant_binary(TokenId::Percent, &float_rhs(0.0)));
    assert!(expr.constant.float(0).is_nan());
}

#[test]
fn float_modulo_keeps_the_sign_of_the_dividend() {
    let mut expr = float_expr(-7.0);
    assert!(expr.evaluate_constant_binary(TokenId::Percent, &float_rhs(4.0)));
    assert_eq!(expr.constant.float(0), -3.0);
}

#[test]
fn signed_division_wraps_at_the_edge() {
    let mut expr = int_expr(i32::MIN);
    assert!(expr.evaluate_constant_binary(TokenId::Slash, &int_rhs(-1)));
    assert_eq!(expr.constant.int(0), i32::MIN);
}

#[test]
fn unsigned_arithmetic_wraps() {
    let mut expr = uint_expr(u32::MAX);
    assert!(expr.evaluate_constant_binary(TokenId::Plus, &uint_rhs(1)));
    assert_eq!(expr.constant.uint(0), 0);
}

#[test]
fn vector_folds_are_per_lane() {
    let mut expr = float_vec_expr(&[1.0, 2.0]);
    let mut rhs = Constant::default();
    rhs.set_float(0, 10.0);
    rhs.set_float(1, 20.0);

    assert!(expr.evaluate_constant_binary(TokenId::Plus, &rhs));
    assert_eq!(expr.constant.float(0), 11.0);
    assert_eq!(expr.constant.float(1), 22.0);
}

// -----------------------------------------------------------------------------
// Bitwise and logical
// -----------------------------------------------------------------------------

#[test]
fn bitwise_operations() {
    let mut expr = uint_expr(0b1100);
    assert!(expr.evaluate_constant_binary(TokenId::Amp, &uint_rhs(0b1010)));
    assert_eq!(expr.constant.uint(0), 0b1000);

    let mut expr = uint_expr(0b1100);
    assert!(expr.evaluate_constant_binary(TokenId::Pipe, &uint_rhs(0b1010)));
    assert_eq!(expr.constant.uint(0), 0b1110);

    let mut expr = uint_expr(0b1100);
    assert!(expr.evaluate_constant_binary(TokenId::Caret, &uint_rhs(0b1010)));
    assert_eq!(expr.constant.uint(0), 0b0110);
}

#[test]
fn logical_operators_fold_bitwise_at_this_layer() {
    // Short-circuiting happened upstream; here `&&` is `&`.
    let mut expr = uint_expr(0b01);
    assert!(expr.evaluate_constant_binary(TokenId::LAnd, &uint_rhs(0b10)));
    assert_eq!(expr.constant.uint(0), 0);

    let mut expr = uint_expr(0b01);
    assert!(expr.evaluate_constant_binary(TokenId::LOr, &uint_rhs(0b10)));
    assert_eq!(expr.constant.uint(0), 0b11);
}

// -----------------------------------------------------------------------------
// Comparisons
// -----------------------------------------------------------------------------

#[test]
fn comparisons_force_a_boolean_result_type() {
    let mut expr = int_expr(3);
    assert!(expr.evaluate_constant_binary(TokenId::Lt, &int_rhs(5)));
    assert_eq!(expr.constant.uint(0), 1);
    assert_eq!(expr.ty.base, BaseType::Bool);

    let mut expr = float_expr(1.0);
    assert!(expr.evaluate_constant_binary(TokenId::Ge, &float_rhs(2.0)));
    assert_eq!(expr.constant.uint(0), 0);
    assert_eq!(expr.ty.base, BaseType::Bool);
}

#[test]
fn signedness_matters_for_ordering() {
    // As signed, -1 < 0; the same bits as unsigned compare the other way.
    let mut expr = int_expr(-1);
    assert!(expr.evaluate_constant_binary(TokenId::Lt, &int_rhs(0)));
    assert_eq!(expr.constant.uint(0), 1);

    let mut expr = uint_expr(0xFFFF_FFFF);
    assert!(expr.evaluate_constant_binary(TokenId::Lt, &uint_rhs(0)));
    assert_eq!(expr.constant.uint(0), 0);
}

#[test]
fn equality_is_sign_agnostic() {
    let mut expr = int_expr(-1);
    assert!(expr.evaluate_constant_binary(TokenId::EqEq, &uint_rhs(0xFFFF_FFFF)));
    assert_eq!(expr.constant.uint(0), 1);
    assert_eq!(expr.ty.base, BaseType::Bool);
}

#[test]
fn nan_compares_unequal_to_itself() {
    let mut expr = float_expr(f32::NAN);
    assert!(expr.evaluate_constant_binary(TokenId::EqEq, &float_rhs(f32::NAN)));
    assert_eq!(expr.constant.uint(0), 0);

    let mut expr = float_expr(f32::NAN);
    assert!(expr.evaluate_constant_binary(TokenId::NotEq, &float_rhs(f32::NAN)));
    assert_eq!(expr.constant.uint(0), 1);

    let mut expr = float_expr(f32::NAN);
    assert!(expr.evaluate_constant_binary(TokenId::Lt, &float_rhs(1.0)));
    assert_eq!(expr.constant.uint(0), 0);
}

#[test]
fn vector_comparison_produces_boolean_lanes() {
    let mut expr = float_vec_expr(&[1.0, 5.0]);
    let mut rhs = Constant::default();
    rhs.set_float(0, 2.0);
    rhs.set_float(1, 2.0);

    assert!(expr.evaluate_constant_binary(TokenId::Lt, &rhs));
    assert_eq!(expr.constant.uint(0), 1);
    assert_eq!(expr.constant.uint(1), 0);
    assert_eq!(expr.ty.base, BaseType::Bool);
    assert_eq!(expr.ty.rows, 2);
}

// -----------------------------------------------------------------------------
// Shifts
// -----------------------------------------------------------------------------

#[test]
fn shifts_dispatch_on_signedness() {
    let mut expr = uint_expr(1);
    assert!(expr.evaluate_constant_binary(TokenId::Shl, &uint_rhs(4)));
    assert_eq!(expr.constant.uint(0), 16);

    // Logical shift for unsigned operands.
    let mut expr = uint_expr(0x8000_0000);
    assert!(expr.evaluate_constant_binary(TokenId::Shr, &uint_rhs(4)));
    assert_eq!(expr.constant.uint(0), 0x0800_0000);

    // Arithmetic shift for signed operands.
    let mut expr = int_expr(-8);
    assert!(expr.evaluate_constant_binary(TokenId::Shr, &int_rhs(1)));
    assert_eq!(expr.constant.int(0), -4);
}

#[test]
fn shift_counts_are_masked() {
    let mut expr = uint_expr(1);
    assert!(expr.evaluate_constant_binary(TokenId::Shl, &uint_rhs(33)));
    assert_eq!(expr.constant.uint(0), 2);
}

// -----------------------------------------------------------------------------
// Refusals
// -----------------------------------------------------------------------------

#[test]
fn binary_fold_refuses_non_constants() {
    let mut expr = Expression::default();
    expr.reset_to_rvalue(loc(), 1, Type::scalar(BaseType::Int));
    assert!(!expr.evaluate_constant_binary(TokenId::Plus, &int_rhs(1)));
}

#[test]
fn binary_fold_refuses_unknown_operators() {
    let mut expr = int_expr(1);
    let before = expr.clone();
    assert!(!expr.evaluate_constant_binary(TokenId::Question, &int_rhs(1)));
    assert_eq!(expr, before);
}
