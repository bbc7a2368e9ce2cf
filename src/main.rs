use anyhow::Result;
use quiz_client::utils::logging;
use quiz_client::{App, Command, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    let log_filter = logging::init(logging::verbose_from_env());

    // 加载配置
    let config = Config::load()?;
    if let Some(handle) = &log_filter {
        logging::set_verbose(handle, config.verbose_logging);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
    };

    // 初始化并运行应用
    App::initialize(config).await?.run(command).await?;

    Ok(())
}
