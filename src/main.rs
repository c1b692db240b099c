use std::io::IsTerminal;
use std::time::Instant;
use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyCode, KeyModifiers};
use crossterm::{cursor, execute};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use scrapewatch::cli::{self, Command, WatchTarget};
use scrapewatch::config::Config;
use scrapewatch::core::client::HttpStatusClient;
use scrapewatch::core::{MonitorError, PollEnd, StatusKind, StatusPoller};
use scrapewatch::ui::{self, AlertCenter, TaskSummary, TerminalView};
use scrapewatch::utils::logger::{init_logger, Flush};

const EXIT_FAILED: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // 解析参数和配置
    let (args, config) = match cli::Args::parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("参数解析失败: {}", e);
            std::process::exit(1);
        }
    };

    let logger = init_logger(&config).context("日志初始化失败")?;
    log::info!(
        "程序启动 v{} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    );
    log::info!("配置文件路径: {}", args.config);
    log::info!("{}", config.get_summary());

    let command = args.command()?.clone();
    let client = HttpStatusClient::new(&config)?;

    let task_id = match resolve_task_id(&client, &command).await {
        Ok(id) => id,
        Err(e) => {
            log::error!("无法确定任务ID: {}", e);
            ui::print_error(&e.to_string());
            flush(&logger).await;
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    spawn_stop_listeners(&cancel);

    let code = watch(client, &config, &task_id, &cancel).await;
    cancel.cancel();
    flush(&logger).await;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn flush(logger: &Option<actix::Addr<scrapewatch::utils::logger::LoggerActor>>) {
    if let Some(addr) = logger {
        let _ = addr.send(Flush).await;
    }
}

/// 提交表单得到新任务，或从参数 / 结果页中取出任务ID
async fn resolve_task_id(client: &HttpStatusClient, command: &Command) -> Result<String, MonitorError> {
    match command {
        Command::Submit { .. } => {
            let form = command
                .scrape_form()
                .ok_or_else(|| MonitorError::Unknown("缺少表单".to_string()))?;
            let task_id = client.submit(&form).await?;
            ui::print_success(&format!("已创建抓取任务: {}", task_id));
            if let Ok(url) = client.results_url(&task_id) {
                println!("结果页: {}", url);
            }
            Ok(task_id)
        }
        Command::Watch { target } => WatchTarget::parse(target)?.resolve(client).await,
    }
}

/// Ctrl-C 或输入 q 回车都会取消轮询
fn spawn_stop_listeners(cancel: &CancellationToken) {
    let token = cancel.clone();
    actix::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    log::info!("收到 Ctrl-C，停止轮询");
                    token.cancel();
                }
            }
        }
    });

    if !std::io::stdin().is_terminal() {
        return;
    }
    let token = cancel.clone();
    actix::spawn(async move {
        let mut events = EventStream::new();
        loop {
            let event = tokio::select! {
                _ = token.cancelled() => break,
                event = events.next() => event,
            };
            match event {
                Some(Ok(Event::Key(key))) => {
                    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) || ctrl_c {
                        log::info!("用户主动停止轮询");
                        token.cancel();
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("读取键盘输入失败: {}", e);
                    break;
                }
                None => break,
            }
        }
    });
}

/// 轮询并在终端显示，返回进程退出码
async fn watch(client: HttpStatusClient, config: &Config, task_id: &str, cancel: &CancellationToken) -> i32 {
    println!("\n开始查询任务 {} ... (输入 'q' 回车或按 Ctrl-C 停止)", task_id);
    let _ = execute!(std::io::stdout(), cursor::Hide);

    let started = Instant::now();
    let poller = StatusPoller::new(client).with_interval(config.poll_interval());
    let alerts = AlertCenter::new(config.alert_timeout(), config.alert_fade());
    let mut view = TerminalView::new(task_id).with_alerts(alerts);
    let result = poller.run(task_id, &mut view, cancel).await;
    view.close();

    let _ = execute!(std::io::stdout(), cursor::Show);

    match result {
        Ok(report) => match report.end {
            PollEnd::Finished(status) => {
                let failed = status.kind() == StatusKind::Failed;
                let summary = TaskSummary {
                    task_id: task_id.to_string(),
                    status,
                    cycles: report.cycles,
                    elapsed_time: started.elapsed(),
                };
                println!("{}", summary);
                if failed { EXIT_FAILED } else { 0 }
            }
            PollEnd::Cancelled => {
                println!("\n已停止轮询，任务仍在服务端运行");
                EXIT_CANCELLED
            }
        },
        Err(e) if e.is_fetch_failure() => {
            ui::print_error(&format!("查询中断，请稍后重新运行: {}", e));
            1
        }
        Err(e) => {
            ui::print_error(&e.to_string());
            1
        }
    }
}
