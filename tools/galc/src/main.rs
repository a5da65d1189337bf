//! # galc
//!
//! GAL 编译工具 - 将 *.gal 脚本编译为 *.node 指令文件（JSON）。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p galc -- compile story.gal
//! cargo run -p galc -- compile story.gal -t out/story.node --lang zh
//! cargo run -p galc -- compile scripts --batch folder --recursive --jobs 4
//! cargo run -p galc -- check scripts
//!
//! # 或安装后直接使用
//! cargo install --path tools/galc
//! galc compile scripts --batch folder -t build
//! ```
//!
//! 当前目录下的 `galc.json`（或 `--config` 指定的文件）提供默认配置，
//! 命令行参数优先。

mod batch;
mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use gal_compiler::Language;
use tracing::Level;

use batch::{BatchReport, CompileJob};
use config::CompilerConfig;

#[derive(Parser)]
#[command(name = "galc")]
#[command(about = "GAL 编译工具 - 将 *.gal 脚本编译为 *.node 指令文件")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：当前目录下的 galc.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出更多日志（-v 信息，-vv 调试）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// 只输出错误日志
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 编译脚本
    Compile {
        /// 源文件或源目录
        path: PathBuf,

        /// 输出文件或输出目录（默认：与源文件同处，替换扩展名）
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// 语言表（default / zh）
        #[arg(long)]
        lang: Option<String>,

        /// 批处理模式
        #[arg(long, value_enum, default_value_t = BatchMode::File)]
        batch: BatchMode,

        /// 文件夹模式下递归子目录
        #[arg(short, long)]
        recursive: bool,

        /// 并行编译的线程数
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// 只检查脚本，不写出结果
    Check {
        /// 源文件或源目录
        path: PathBuf,

        /// 语言表（default / zh）
        #[arg(long)]
        lang: Option<String>,

        /// 递归子目录
        #[arg(short, long)]
        recursive: bool,
    },
}

/// 批处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BatchMode {
    /// 编译单个文件
    File,
    /// 编译目录下的全部源文件
    Folder,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = real_main(cli) {
        eprintln!("❌ {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "配置文件不存在: {}", path.display());
            CompilerConfig::load(path)
        }
        None => CompilerConfig::load(CompilerConfig::FILE_NAME),
    };

    match cli.command {
        Commands::Compile {
            path,
            target,
            lang,
            batch,
            recursive,
            jobs,
        } => {
            merge_flags(&mut config, lang, recursive, jobs);
            config.validate()?;
            compile(&path, target.as_deref(), batch, &config)
        }
        Commands::Check {
            path,
            lang,
            recursive,
        } => {
            merge_flags(&mut config, lang, recursive, None);
            config.validate()?;
            check(&path, &config)
        }
    }
}

/// 命令行参数覆盖配置文件
fn merge_flags(
    config: &mut CompilerConfig,
    lang: Option<String>,
    recursive: bool,
    jobs: Option<usize>,
) {
    if let Some(lang) = lang {
        config.lang = lang;
    }
    config.recursive |= recursive;
    if let Some(jobs) = jobs {
        config.jobs = jobs;
    }
}

fn compile(
    path: &Path,
    target: Option<&Path>,
    mode: BatchMode,
    config: &CompilerConfig,
) -> anyhow::Result<()> {
    let language = config.language()?;

    let jobs = match mode {
        BatchMode::File => {
            anyhow::ensure!(path.is_file(), "源文件不存在: {}", path.display());
            let target = target
                .map(Path::to_path_buf)
                .unwrap_or_else(|| batch::default_target(path, &config.target_extension));
            vec![CompileJob {
                source: path.to_path_buf(),
                target,
            }]
        }
        BatchMode::Folder => {
            anyhow::ensure!(path.is_dir(), "源目录不存在: {}", path.display());
            batch::folder_jobs(
                path,
                target.unwrap_or(path),
                &config.source_extension,
                &config.target_extension,
                config.recursive,
            )?
        }
    };

    if jobs.is_empty() {
        println!("⚠️ 没有找到 *.{} 文件: {}", config.source_extension, path.display());
        return Ok(());
    }

    let report = batch::run_jobs(&jobs, language, config.jobs)?;
    for job in &jobs {
        if report.succeeded.contains(&job.source) {
            println!("  ✅ {} -> {}", job.source.display(), job.target.display());
        }
    }
    finish(report, language)
}

fn check(path: &Path, config: &CompilerConfig) -> anyhow::Result<()> {
    let language = config.language()?;

    let sources = if path.is_dir() {
        batch::collect_sources(path, &config.source_extension, config.recursive)?
    } else {
        anyhow::ensure!(path.exists(), "路径不存在: {}", path.display());
        vec![path.to_path_buf()]
    };

    let mut report = BatchReport::default();
    for source in sources {
        match batch::analyze_file(&source, language) {
            Ok(outcome) => {
                println!("  ✅ {} ({} 条指令)", source.display(), outcome.tree.len());
                for warning in &outcome.warnings {
                    println!("     ⚠️ {warning}");
                }
                report.succeeded.push(source);
            }
            Err(e) => report.failed.push((source, e)),
        }
    }
    finish(report, language)
}

/// 打印汇总，有失败时返回错误
fn finish(report: BatchReport, language: &Language) -> anyhow::Result<()> {
    for (source, e) in &report.failed {
        eprintln!("  ❌ {}: {e:#}", source.display());
    }

    println!();
    println!(
        "语言表: {language}，成功 {} 个，失败 {} 个",
        report.succeeded.len(),
        report.failed.len()
    );

    if !report.is_ok() {
        anyhow::bail!("{} 个文件编译失败", report.failed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gal_compiler::NodeTree;
    use std::fs;

    #[test]
    fn test_cli_parses_compile_flags() {
        let cli = Cli::try_parse_from([
            "galc", "compile", "scripts", "--batch", "folder", "-r", "--jobs", "4", "--lang",
            "zh", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compile {
                path,
                batch,
                recursive,
                jobs,
                lang,
                target,
            } => {
                assert_eq!(path, PathBuf::from("scripts"));
                assert_eq!(batch, BatchMode::Folder);
                assert!(recursive);
                assert_eq!(jobs, Some(4));
                assert_eq!(lang.as_deref(), Some("zh"));
                assert!(target.is_none());
            }
            Commands::Check { .. } => panic!("expected compile"),
        }
    }

    #[test]
    fn test_merge_flags_priority() {
        let mut config = CompilerConfig {
            lang: "zh".to_string(),
            jobs: 2,
            ..Default::default()
        };
        merge_flags(&mut config, None, false, None);
        assert_eq!(config.lang, "zh");
        assert_eq!(config.jobs, 2);

        merge_flags(&mut config, Some("default".to_string()), true, Some(8));
        assert_eq!(config.lang, "default");
        assert!(config.recursive);
        assert_eq!(config.jobs, 8);
    }

    #[test]
    fn test_compile_single_file_default_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("story.gal");
        fs::write(&source, "：行为 输出（1）\n").unwrap();

        let config = CompilerConfig {
            lang: "zh".to_string(),
            ..Default::default()
        };
        compile(&source, None, BatchMode::File, &config).unwrap();

        let json = fs::read_to_string(dir.path().join("story.node")).unwrap();
        let tree = NodeTree::from_json(&json).unwrap();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_compile_folder_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.gal"), ":stop\n").unwrap();
        fs::write(dir.path().join("bad.gal"), ":end\n").unwrap();

        let out = dir.path().join("build");
        let err = compile(
            dir.path(),
            Some(&out),
            BatchMode::Folder,
            &CompilerConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains('1'));
        assert!(out.join("good.node").exists());
    }

    #[test]
    fn test_check_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.gal");
        fs::write(&source, ":action output(10)\n").unwrap();

        check(&source, &CompilerConfig::default()).unwrap();
        assert!(!dir.path().join("a.node").exists());
    }
}
