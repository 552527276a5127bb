//! Shopfront - 商品目录命令行客户端
//!
//! 启动流程: 配置 → 日志 → HTTP 客户端 → 商品服务 → 页面

use std::sync::Arc;

use clap::Parser;
use shopfront::application::ports::HttpClientPort;
use shopfront::application::ProductService;
use shopfront::config::{load_config_with_overrides, print_config, AppConfig, ConfigOverrides};
use shopfront::infrastructure::cli::{run_page, Cli};
use shopfront::infrastructure::http::{FakeHttpClient, ReqwestHttpClient, TokenStore};

fn init_logging(config: &AppConfig) {
    let log_filter = format!("{},shopfront={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // 日志写到 stderr，stdout 只输出页面内容
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let overrides = ConfigOverrides {
        base_url: cli.base_url,
        auth_token: cli.token,
    };
    let config = load_config_with_overrides(cli.config.as_deref(), &overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);
    print_config(&config);

    let client: Arc<dyn HttpClientPort> = if cli.offline {
        tracing::info!("Offline mode: serving built-in demo catalog");
        Arc::new(FakeHttpClient::with_demo_catalog())
    } else {
        let tokens = TokenStore::new(config.api.auth_token.clone());
        Arc::new(ReqwestHttpClient::with_default_interceptors(
            config.api.client_config(),
            tokens,
        )?)
    };
    let service = ProductService::new(client);

    let rendered = run_page(cli.page, &service).await;
    print!("{}", rendered.text);

    if rendered.failed {
        anyhow::bail!("Page finished with an error");
    }
    Ok(())
}
