//! # Value 模块
//!
//! 指令参数与表达式字面量共用的值类型。

use serde::{Deserialize, Serialize};

/// 字面量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 布尔值
    Bool(bool),
}

impl Value {
    /// 按 整数 → 严格布尔 → 文本 的顺序转换行为参数
    ///
    /// 严格布尔只接受小写的 `true` / `false`。
    pub fn coerce(s: &str) -> Self {
        if let Ok(n) = s.parse::<i64>() {
            return Value::Int(n);
        }
        match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}
