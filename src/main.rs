use clap::Parser;
use tracing::error;

use ipecho::cli::{Cli, Commands};
use ipecho::config::{StaticConfig, get_config, init_config_from};
use ipecho::errors::IpEchoError;
use ipecho::runtime::modes;
use ipecho::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if cli.command == Some(Commands::Config) {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    init_config_from(&cli.config);
    let config = get_config();

    // guard 必须存活到进程结束，保证日志落盘
    let guard = init_logging(&config.logging)?;

    let result = match cli.command {
        None | Some(Commands::Serve) => modes::run_server(&config).await,
        Some(Commands::Fetch) => modes::run_fetch(&config.geoip).await,
        Some(Commands::Lookup { ip }) => modes::run_lookup(&config, &ip).await,
        Some(Commands::Config) => Ok(()),
    };

    // 错误只报告一次，不再交给 main 的默认 Debug 输出
    if let Err(e) = result {
        match e.downcast_ref::<IpEchoError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => error!("{:#}", e),
        }
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
