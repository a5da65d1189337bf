//! # 表达式模块
//!
//! 条件、让步与计算语句中使用的表达式树。
//!
//! 编译器只负责把文本解析为表达式树（见 `parse_expression`），
//! 求值由运行时完成。
//!
//! ## 支持的操作
//!
//! - 赋值: `@var = expr`（仅顶层）
//! - 逻辑: `and` / `&&`, `or` / `||`, `not` / `!`
//! - 比较: `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - 算术: `+`, `-`, `*`, `/`, `%`, 一元 `-`

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// 运算符的源码形式
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// 表达式 AST 节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// 字面量值
    Literal(Value),

    /// 变量引用
    ///
    /// 变量名不包含引用符号前缀
    Variable(String),

    /// 赋值，结果为所赋的值
    Assign { name: String, value: Box<Expr> },

    /// 二元运算
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// 逻辑非
    Not(Box<Expr>),

    /// 取负
    Neg(Box<Expr>),
}

impl Expr {
    /// 创建字符串字面量
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Value::String(s.into()))
    }

    /// 创建布尔字面量
    pub fn bool(b: bool) -> Self {
        Self::Literal(Value::Bool(b))
    }

    /// 创建整数字面量
    pub fn int(n: i64) -> Self {
        Self::Literal(Value::Int(n))
    }

    /// 创建浮点字面量
    pub fn float(x: f64) -> Self {
        Self::Literal(Value::Float(x))
    }

    /// 创建变量引用
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// 创建赋值
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::Assign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    /// 创建二元运算
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// 创建逻辑非
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Self::Not(Box::new(expr))
    }

    /// 创建取负
    #[allow(clippy::should_implement_trait)]
    pub fn neg(expr: Expr) -> Self {
        Self::Neg(Box::new(expr))
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Variable(name) => write!(f, "@{name}"),
            Expr::Assign { name, value } => write!(f, "@{name} = {value}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Not(inner) => write!(f, "not {inner}"),
            Expr::Neg(inner) => write!(f, "-{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let expr = Expr::assign(
            "TestVar",
            Expr::binary(BinaryOp::Add, Expr::int(9), Expr::int(10)),
        );
        assert_eq!(expr.to_string(), "@TestVar = (9 + 10)");

        let expr = Expr::not(Expr::binary(
            BinaryOp::And,
            Expr::var("a"),
            Expr::string("b"),
        ));
        assert_eq!(expr.to_string(), "not (@a and \"b\")");
    }
}
