//! # Instruction 模块
//!
//! 定义编译器交给运行时的指令与输出容器。
//!
//! ## 约定
//!
//! - 指令序列从 0 开始编号，所有跳转目标都是该序列中的**绝对索引**
//! - 指令只描述"做什么"，执行语义由运行时负责
//! - 所有类型都可序列化，`.node` 文件即 [`NodeTree`] 的 JSON 形式

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::script::Expr;
use crate::value::Value;

/// 运行时指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// 调用宿主注册的行为
    ///
    /// ```text
    /// :action output(10, "hi")  -> Action { name: "output", args: [Int(10), String("hi")] }
    /// ```
    Action { name: String, args: Vec<Value> },

    /// 条件分支：条件为真跳到 `true_destination`，否则跳到 `false_destination`
    Condition {
        condition: Expr,
        true_destination: usize,
        false_destination: usize,
    },

    /// 无条件跳转
    Jump { destination: usize },

    /// 进入块，`block_head` 是块的首条指令
    BlockEntry { block_head: usize },

    /// 块结束
    BlockEnd,

    /// 绑定对象
    Bind { bound_name: String },

    /// 解除绑定
    Unbind { bound_name: Option<String> },

    /// 从当前块返回
    Return,

    /// 停止执行
    Stop,

    /// 让出执行权，可携带一个值
    Yield { expr: Option<Expr> },

    /// 计算表达式（通常是赋值）
    Compute { expr: Expr },
}

impl Instruction {
    /// 跳转目标（如果有）
    pub fn destinations(&self) -> Vec<usize> {
        match self {
            Instruction::Condition {
                true_destination,
                false_destination,
                ..
            } => vec![*true_destination, *false_destination],
            Instruction::Jump { destination } => vec![*destination],
            Instruction::BlockEntry { block_head } => vec![*block_head],
            _ => Vec::new(),
        }
    }
}

/// 输出容器
///
/// 编译完成后不再修改。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    /// 扁平指令序列
    pub nodes: Vec<Instruction>,
    /// 文件名（由 `@file` 设置，默认为空）
    #[serde(default)]
    pub file: String,
    /// 声明的输入（由 `@input` 添加）
    #[serde(default)]
    pub inputs: BTreeSet<String>,
}

impl NodeTree {
    /// 由指令序列创建
    pub fn new(nodes: Vec<Instruction>) -> Self {
        Self {
            nodes,
            file: String::new(),
            inputs: BTreeSet::new(),
        }
    }

    /// 指令数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否没有指令
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 反序列化
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinations() {
        let cond = Instruction::Condition {
            condition: Expr::var("IsTrue"),
            true_destination: 3,
            false_destination: 7,
        };
        assert_eq!(cond.destinations(), vec![3, 7]);
        assert_eq!(Instruction::Jump { destination: 5 }.destinations(), vec![5]);
        assert!(Instruction::Stop.destinations().is_empty());
    }

    #[test]
    fn test_node_tree_json() {
        let mut tree = NodeTree::new(vec![
            Instruction::Action {
                name: "output".to_string(),
                args: vec![Value::Int(10)],
            },
            Instruction::Stop,
        ]);
        tree.file = "TestGAL".to_string();
        tree.inputs.insert("Plum".to_string());

        let json = tree.to_json().unwrap();
        assert!(json.contains("\"file\": \"TestGAL\""));

        let loaded = NodeTree::from_json(&json).unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_node_tree_missing_meta_fields_default() {
        let loaded = NodeTree::from_json(r#"{ "nodes": ["Stop"] }"#).unwrap();
        assert_eq!(loaded.nodes, vec![Instruction::Stop]);
        assert!(loaded.file.is_empty());
        assert!(loaded.inputs.is_empty());
    }
}
