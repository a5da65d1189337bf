//! # Config 模块
//!
//! 编译工具配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (galc.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use gal_compiler::Language;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 编译配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// 语言表名称（`default` / `zh`）
    #[serde(default = "default_lang")]
    pub lang: String,

    /// 文件夹模式下是否递归子目录
    #[serde(default)]
    pub recursive: bool,

    /// 源文件扩展名（不含点）
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// 输出文件扩展名（不含点）
    #[serde(default = "default_target_extension")]
    pub target_extension: String,

    /// 并行编译的线程数
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

// 默认值函数
fn default_lang() -> String {
    "default".to_string()
}

fn default_source_extension() -> String {
    "gal".to_string()
}

fn default_target_extension() -> String {
    "node".to_string()
}

fn default_jobs() -> usize {
    1
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            recursive: false,
            source_extension: default_source_extension(),
            target_extension: default_target_extension(),
            jobs: default_jobs(),
        }
    }
}

impl CompilerConfig {
    /// 默认配置文件名
    pub const FILE_NAME: &'static str = "galc.json";

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置（解析失败时记录警告）。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 选中的语言表
    pub fn language(&self) -> anyhow::Result<&'static Language> {
        Language::by_name(&self.lang)
            .ok_or_else(|| anyhow::anyhow!("未知的语言表: '{}'（可选：default、zh）", self.lang))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        self.language()?;

        if self.jobs == 0 {
            anyhow::bail!("jobs 必须至少为 1");
        }

        for (field, ext) in [
            ("source_extension", &self.source_extension),
            ("target_extension", &self.target_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                anyhow::bail!("{field} 必须是不含点的扩展名: '{ext}'");
            }
        }

        if self.source_extension == self.target_extension {
            anyhow::bail!("源文件与输出文件扩展名相同: '{}'", self.source_extension);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.lang, "default");
        assert_eq!(config.source_extension, "gal");
        assert_eq!(config.target_extension, "node");
        assert_eq!(config.jobs, 1);
        assert!(!config.recursive);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{ "lang": "zh", "jobs": 4 }"#).unwrap();
        assert_eq!(config.lang, "zh");
        assert_eq!(config.jobs, 4);
        assert_eq!(config.source_extension, "gal");
        assert_eq!(config.language().unwrap().name(), "Chinese");
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let config = CompilerConfig::load(dir.path().join(CompilerConfig::FILE_NAME));
        assert_eq!(config, CompilerConfig::default());

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(CompilerConfig::load(&path), CompilerConfig::default());

        let path = dir.path().join("good.json");
        fs::write(&path, r#"{ "recursive": true, "target_extension": "json" }"#).unwrap();
        let config = CompilerConfig::load(&path);
        assert!(config.recursive);
        assert_eq!(config.target_extension, "json");
    }

    #[test]
    fn test_validate_errors() {
        let config = CompilerConfig {
            lang: "klingon".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompilerConfig {
            jobs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompilerConfig {
            target_extension: ".node".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompilerConfig {
            target_extension: "gal".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
