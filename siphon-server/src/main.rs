use tracing::{error, info, warn};
use tracing_appender::non_blocking;
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() {
    let (non_blocking, _guard) = non_blocking(std::io::stdout());
    fmt()
        .with_writer(non_blocking)
        .with_target(false)
        .pretty()
        .init();

    let status = siphon_kafka::start_hdfs().await;
    if status != siphon_kafka::app::SUCCESS {
        error!("消费服务启动失败：{status}");
        return;
    }
    info!("消费服务启动{status}");

    match siphon_kafka::all_done().await {
        Some(report) if report.clean => info!("消费服务正常退出"),
        Some(report) => warn!(
            workers = report.workers,
            finished = report.finished,
            "消费服务非正常退出"
        ),
        None => (),
    }
}
