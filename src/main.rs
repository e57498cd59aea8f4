use clap::Parser;

use pvd_hide::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_evaluate, handle_hide, handle_keygen, handle_recover},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据子命令将执行分派到相应的处理函数。
/// 设置 `RUST_LOG=debug` 可以查看扫描统计等诊断信息。
fn main() -> anyhow::Result<()> {
    env_logger::init();

    // 解析命令行参数
    let cli = Cli::parse();

    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Evaluate(args) => handle_evaluate(args),
        Commands::Keygen(args) => handle_keygen(args),
    }
}
