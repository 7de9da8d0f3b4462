// Constant evaluation of initializer expressions
//
// Integer arithmetic is checked: overflow and division by zero are
// evaluation errors rather than wrapped or undefined results.

use rsreflect_ast::{BinaryOp, Expr, UnaryOp};

use crate::error::EvalError;
use crate::types::{DataType, ExportType};

/// Value of an evaluated initializer
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// No initializer, or one that is not a constant
    Uninit,
    Int(i64),
    Float(f64),
    /// Brace initializer
    Vector(Vec<ConstantValue>),
}

/// Reduces an initializer expression to a constant
pub trait ConstantEvaluator {
    fn evaluate(&self, expr: &Expr) -> Result<ConstantValue, EvalError>;
}

/// Evaluator for the literal and operator subset of [`Expr`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn unary(&self, op: UnaryOp, operand: &Expr) -> Result<ConstantValue, EvalError> {
        let value = self.evaluate(operand)?;
        match (op, value) {
            (UnaryOp::Plus, value @ (ConstantValue::Int(_) | ConstantValue::Float(_))) => {
                Ok(value)
            }
            (UnaryOp::Neg, ConstantValue::Int(v)) => v
                .checked_neg()
                .map(ConstantValue::Int)
                .ok_or_else(|| overflow(op)),
            (UnaryOp::Neg, ConstantValue::Float(f)) => Ok(ConstantValue::Float(-f)),
            (UnaryOp::Not, value @ (ConstantValue::Int(_) | ConstantValue::Float(_))) => {
                Ok(ConstantValue::from_bool(!value.is_truthy(&op.to_string())?))
            }
            (UnaryOp::BitNot, ConstantValue::Int(v)) => Ok(ConstantValue::Int(!v)),
            (UnaryOp::BitNot, ConstantValue::Float(_)) => {
                Err(invalid_operand(op, "requires an integer operand"))
            }
            (_, _) => Err(invalid_operand(op, "requires a scalar operand")),
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<ConstantValue, EvalError> {
        // && and || do not evaluate their right operand once the left decides
        if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) {
            let symbol = op.to_string();
            let left = self.evaluate(lhs)?.is_truthy(&symbol)?;
            let result = match (op, left) {
                (BinaryOp::LogicalAnd, false) => false,
                (BinaryOp::LogicalOr, true) => true,
                _ => self.evaluate(rhs)?.is_truthy(&symbol)?,
            };
            return Ok(ConstantValue::from_bool(result));
        }

        let left = self.evaluate(lhs)?;
        let right = self.evaluate(rhs)?;
        match (left, right) {
            (ConstantValue::Int(a), ConstantValue::Int(b)) => int_binary(op, a, b),
            (ConstantValue::Int(a), ConstantValue::Float(b)) => float_binary(op, a as f64, b),
            (ConstantValue::Float(a), ConstantValue::Int(b)) => float_binary(op, a, b as f64),
            (ConstantValue::Float(a), ConstantValue::Float(b)) => float_binary(op, a, b),
            (_, _) => Err(EvalError::InvalidOperand {
                op: op.to_string(),
                reason: "requires scalar operands",
            }),
        }
    }
}

impl ConstantEvaluator for ExprEvaluator {
    fn evaluate(&self, expr: &Expr) -> Result<ConstantValue, EvalError> {
        match expr {
            Expr::IntLiteral(v) => Ok(ConstantValue::Int(*v)),
            Expr::FloatLiteral(f) => Ok(ConstantValue::Float(*f)),
            Expr::BoolLiteral(b) => Ok(ConstantValue::from_bool(*b)),
            Expr::CharLiteral(c) => Ok(ConstantValue::Int(i64::from(u32::from(*c)))),
            Expr::Paren(inner) => self.evaluate(inner),
            Expr::Unary { op, operand } => self.unary(*op, operand),
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::InitList(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<Result<Vec<_>, _>>()
                .map(ConstantValue::Vector),
            Expr::DeclRef(name) => Err(EvalError::NotConstant {
                what: format!("reference to '{}'", name),
            }),
            Expr::Call { callee, .. } => Err(EvalError::NotConstant {
                what: format!("call to '{}'", callee),
            }),
        }
    }
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> Result<ConstantValue, EvalError> {
    let value = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(|| overflow(op))?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(op))?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(op))?,
        BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => a.checked_div(b).ok_or_else(|| overflow(op))?,
        BinaryOp::Rem => a.checked_rem(b).ok_or_else(|| overflow(op))?,
        BinaryOp::Shl | BinaryOp::Shr => {
            let amount = u32::try_from(b)
                .ok()
                .filter(|amount| *amount < i64::BITS)
                .ok_or_else(|| invalid_operand(op, "shift amount out of range"))?;
            if op == BinaryOp::Shl {
                a.checked_shl(amount).ok_or_else(|| overflow(op))?
            } else {
                a.checked_shr(amount).ok_or_else(|| overflow(op))?
            }
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Eq => i64::from(a == b),
        BinaryOp::Ne => i64::from(a != b),
        BinaryOp::Lt => i64::from(a < b),
        BinaryOp::Le => i64::from(a <= b),
        BinaryOp::Gt => i64::from(a > b),
        BinaryOp::Ge => i64::from(a >= b),
        BinaryOp::LogicalAnd => i64::from(a != 0 && b != 0),
        BinaryOp::LogicalOr => i64::from(a != 0 || b != 0),
    };
    Ok(ConstantValue::Int(value))
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Result<ConstantValue, EvalError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Eq => return Ok(ConstantValue::from_bool(a == b)),
        BinaryOp::Ne => return Ok(ConstantValue::from_bool(a != b)),
        BinaryOp::Lt => return Ok(ConstantValue::from_bool(a < b)),
        BinaryOp::Le => return Ok(ConstantValue::from_bool(a <= b)),
        BinaryOp::Gt => return Ok(ConstantValue::from_bool(a > b)),
        BinaryOp::Ge => return Ok(ConstantValue::from_bool(a >= b)),
        BinaryOp::LogicalAnd => return Ok(ConstantValue::from_bool(a != 0.0 && b != 0.0)),
        BinaryOp::LogicalOr => return Ok(ConstantValue::from_bool(a != 0.0 || b != 0.0)),
        BinaryOp::Rem
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor => return Err(invalid_operand(op, "requires integer operands")),
    };
    Ok(ConstantValue::Float(value))
}

fn overflow(op: impl ToString) -> EvalError {
    EvalError::Overflow { op: op.to_string() }
}

fn invalid_operand(op: impl ToString, reason: &'static str) -> EvalError {
    EvalError::InvalidOperand {
        op: op.to_string(),
        reason,
    }
}

impl ConstantValue {
    pub fn from_bool(value: bool) -> Self {
        ConstantValue::Int(i64::from(value))
    }

    pub fn is_uninit(&self) -> bool {
        matches!(self, ConstantValue::Uninit)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstantValue::Float(f) => Some(*f),
            ConstantValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn is_truthy(&self, op: &str) -> Result<bool, EvalError> {
        match self {
            ConstantValue::Int(v) => Ok(*v != 0),
            ConstantValue::Float(f) => Ok(*f != 0.0),
            _ => Err(invalid_operand(op, "requires a scalar operand")),
        }
    }

    fn describe(&self) -> String {
        match self {
            ConstantValue::Uninit => "an uninitialized value".to_string(),
            ConstantValue::Int(v) => format!("integer {}", v),
            ConstantValue::Float(f) => format!("float {}", f),
            ConstantValue::Vector(items) => format!("an initializer list of {} elements", items.len()),
        }
    }

    fn invalid_conversion(&self, target: &str) -> EvalError {
        EvalError::InvalidConversion {
            from: self.describe(),
            to: target.to_string(),
        }
    }

    /// Converts the value to the representation of `target`, the way an
    /// implicit C conversion in an initializer would.
    pub fn convert_to(&self, target: &ExportType) -> Result<ConstantValue, EvalError> {
        if self.is_uninit() {
            return Ok(ConstantValue::Uninit);
        }

        match target {
            ExportType::Primitive(primitive) => self.convert_scalar(primitive.data_type, &primitive.name),
            ExportType::Vector(vector) => {
                let size = vector.size as usize;
                match self {
                    ConstantValue::Vector(items) if items.len() > size => {
                        Err(self.invalid_conversion(&vector.name))
                    }
                    ConstantValue::Vector(items) => {
                        let zero = zero_of(vector.data_type);
                        items
                            .iter()
                            .chain(std::iter::repeat(&zero))
                            .take(size)
                            .map(|item| item.convert_scalar(vector.data_type, &vector.name))
                            .collect::<Result<Vec<_>, _>>()
                            .map(ConstantValue::Vector)
                    }
                    scalar => {
                        let component = scalar.convert_scalar(vector.data_type, &vector.name)?;
                        Ok(ConstantValue::Vector(vec![component; size]))
                    }
                }
            }
            ExportType::Pointer(pointer) => match self {
                ConstantValue::Int(0) => Ok(ConstantValue::Int(0)),
                _ => Err(self.invalid_conversion(&pointer.name)),
            },
            ExportType::ConstantArray(array) => match self {
                ConstantValue::Vector(items) if items.len() as u64 <= array.size => items
                    .iter()
                    .map(|item| item.convert_to(&array.element))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ConstantValue::Vector),
                _ => Err(self.invalid_conversion(&array.name)),
            },
            ExportType::Record(record) => match self {
                ConstantValue::Vector(items) if items.len() <= record.fields.len() => items
                    .iter()
                    .zip(&record.fields)
                    .map(|(item, field)| item.convert_to(&field.ty))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ConstantValue::Vector),
                _ => Err(self.invalid_conversion(&record.name)),
            },
        }
    }

    fn convert_scalar(&self, data_type: DataType, target: &str) -> Result<ConstantValue, EvalError> {
        if data_type.is_rs_object() {
            // Object handles only accept a null initializer
            return match self {
                ConstantValue::Int(0) => Ok(ConstantValue::Int(0)),
                _ => Err(self.invalid_conversion(target)),
            };
        }

        let value = match self {
            ConstantValue::Int(v) => *v,
            ConstantValue::Float(f) if data_type.is_float() => return Ok(ConstantValue::Float(*f)),
            ConstantValue::Float(f) if data_type == DataType::Boolean => {
                return Ok(ConstantValue::from_bool(*f != 0.0));
            }
            // Truncation toward zero
            ConstantValue::Float(f) => f.trunc() as i64,
            _ => return Err(self.invalid_conversion(target)),
        };

        let converted = match data_type {
            DataType::Float16 | DataType::Float32 | DataType::Float64 => {
                return Ok(ConstantValue::Float(value as f64));
            }
            DataType::Boolean => i64::from(value != 0),
            DataType::Signed8 => i64::from(value as i8),
            DataType::Signed16 => i64::from(value as i16),
            DataType::Signed32 => i64::from(value as i32),
            DataType::Unsigned8 => i64::from(value as u8),
            DataType::Unsigned16
            | DataType::Unsigned565
            | DataType::Unsigned5551
            | DataType::Unsigned4444 => i64::from(value as u16),
            DataType::Unsigned32 => i64::from(value as u32),
            // 64-bit values keep their bit pattern
            _ => value,
        };
        Ok(ConstantValue::Int(converted))
    }
}

fn zero_of(data_type: DataType) -> ConstantValue {
    if data_type.is_float() {
        ConstantValue::Float(0.0)
    } else {
        ConstantValue::Int(0)
    }
}
