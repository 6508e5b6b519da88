use clap::Parser;

use salatlink::cli::Cli;
use salatlink::config::{get_config, init_config};
use salatlink::runtime::modes::{Mode, detect_mode};
use salatlink::system::{LogTarget, init_logging};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());
    let config = get_config();

    let mode = detect_mode(&cli);

    // CLI 模式的日志写到 stderr，避免污染命令输出
    let target = match mode {
        #[cfg(feature = "cli")]
        Mode::Cli => LogTarget::Stderr,
        _ => LogTarget::Stdout,
    };
    let _guard = init_logging(&config.logging, target)?;

    match mode {
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = salatlink::runtime::modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        #[cfg(feature = "server")]
        Mode::Server => salatlink::runtime::modes::run_server().await,
        Mode::Unknown => {
            anyhow::bail!("No execution mode available, enable the `server` or `cli` feature")
        }
    }
}
