use chrono::Local; // 用于获取本地时间
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::{Write, BufWriter};
use std::fs::{File, OpenOptions};
use std::path::Path;
use actix::prelude::*;
use crate::config::Config;
use crate::core::error::MonitorError;

/// 日志消息
pub struct LogMsg {
    pub level: Level,
    pub target: String,
    pub message: String,
}
impl Message for LogMsg { type Result = (); }

/// 刷新缓冲区
pub struct Flush;
impl Message for Flush { type Result = (); }

/// 日志Actor
pub struct LoggerActor {
    pub writer: BufWriter<File>,
    pub level: LevelFilter,
    pub file_path: String,
    pub max_size: u64, // 最大文件大小 (bytes)
    pub current_size: u64,
}

impl LoggerActor {
    /// 创建新的日志Actor
    pub fn new(file_path: &str, level: LevelFilter, max_size: u64) -> Result<Self, std::io::Error> {
        // 确保日志目录存在
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            writer: BufWriter::new(file),
            level,
            file_path: file_path.to_string(),
            max_size,
            current_size,
        })
    }

    /// 检查并执行日志轮转
    fn check_rotation(&mut self) -> Result<(), std::io::Error> {
        if self.current_size > self.max_size {
            self.writer.flush()?;

            let backup_path = format!("{}.backup", self.file_path);
            if Path::new(&backup_path).exists() {
                std::fs::remove_file(&backup_path)?;
            }
            std::fs::rename(&self.file_path, &backup_path)?;

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;

            self.writer = BufWriter::new(file);
            self.current_size = 0;
        }
        Ok(())
    }

    /// 写入日志并处理错误
    fn write_log(&mut self, level: Level, target: &str, message: &str) -> Result<(), std::io::Error> {
        if level <= self.level {
            let log_entry = format!(
                "{} [{}] {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                target,
                message
            );

            self.check_rotation()?;

            self.writer.write_all(log_entry.as_bytes())?;
            self.current_size += log_entry.len() as u64;

            // 错误立即落盘，其余定期刷新
            if level == Level::Error || self.current_size % 1024 < log_entry.len() as u64 {
                self.writer.flush()?;
            }
        }
        Ok(())
    }
}

impl Actor for LoggerActor {
    type Context = Context<Self>;

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let _ = self.writer.flush();
    }
}

impl Handler<LogMsg> for LoggerActor {
    type Result = ();
    fn handle(&mut self, msg: LogMsg, _ctx: &mut Self::Context) {
        if let Err(e) = self.write_log(msg.level, &msg.target, &msg.message) {
            eprintln!("日志写入失败: {}", e);
        }
    }
}

impl Handler<Flush> for LoggerActor {
    type Result = ();
    fn handle(&mut self, _msg: Flush, _ctx: &mut Self::Context) {
        if let Err(e) = self.writer.flush() {
            eprintln!("日志刷新失败: {}", e);
        }
    }
}

/// 把 `log` 宏的记录转发给 LoggerActor
pub struct ActorLogger {
    addr: Addr<LoggerActor>,
    level: LevelFilter,
}

impl Log for ActorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.addr.do_send(LogMsg {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {
        self.addr.do_send(Flush);
    }
}

/// 初始化全局日志。配置了日志文件时写文件（需在 actix System 内调用），
/// 否则用 env_logger 输出到标准错误
pub fn init_logger(config: &Config) -> Result<Option<Addr<LoggerActor>>, MonitorError> {
    let level = config
        .level_filter()
        .ok_or_else(|| MonitorError::ConfigError(format!("未知的日志级别: {}", config.log_level)))?;

    if config.log_file.is_empty() {
        env_logger::Builder::new()
            .filter_level(level)
            .try_init()
            .map_err(|e| MonitorError::ConfigError(e.to_string()))?;
        return Ok(None);
    }

    let addr = LoggerActor::new(&config.log_file, level, config.log_max_size)?.start();
    log::set_boxed_logger(Box::new(ActorLogger { addr: addr.clone(), level }))
        .map_err(|e| MonitorError::ConfigError(e.to_string()))?;
    log::set_max_level(level);
    Ok(Some(addr))
}
