/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anstyle::{AnsiColor, Color, Style};
use chrono::Local;
use flume::Receiver;
use slog::Level;

use gw_types::log::{AsyncLogConfig, AsyncLogger, LogDropReason, LogStats};

mod format;
use format::StdLogFormatter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct StdLogValue {
    level: Level,
    message: String,
    kv_pairs: Vec<(String, String)>,
    location: Option<String>,
}

impl StdLogValue {
    fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

/// Create a slog drain which writes to stderr in a dedicated thread.
pub fn new_async_logger(
    async_conf: &AsyncLogConfig,
    append_code_position: bool,
) -> AsyncLogger<StdLogValue, StdLogFormatter> {
    let (sender, receiver) = flume::bounded::<StdLogValue>(async_conf.channel_capacity);

    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        receiver,
        stats: Arc::clone(&stats),
    };

    let _detached_thread = std::thread::Builder::new()
        .name(async_conf.thread_name.clone())
        .spawn(move || io_thread.run());

    AsyncLogger::new(sender, StdLogFormatter::new(append_code_position), stats)
}

struct AsyncIoThread {
    receiver: Receiver<StdLogValue>,
    stats: Arc<LogStats>,
}

impl AsyncIoThread {
    fn run(self) {
        let stderr = io::stderr();
        let use_color = stderr.is_terminal();
        let mut io = stderr.lock();

        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            self.write_value(&mut io, &mut buf, v, use_color);

            // drain all pending values before the next flush
            while let Ok(v) = self.receiver.try_recv() {
                self.write_value(&mut io, &mut buf, v, use_color);
            }

            let _ = io.flush();
        }
    }

    fn write_value<IO: Write>(&self, io: &mut IO, buf: &mut Vec<u8>, v: StdLogValue, color: bool) {
        buf.clear();
        let styles = if color { &CONSOLE } else { &PLAIN };
        if write_line(buf, &v, styles).is_err() {
            self.stats.add_dropped(LogDropReason::FormatFailed);
            return;
        }
        match io.write_all(buf) {
            Ok(_) => self.stats.add_written(buf.len()),
            Err(_) => self.stats.add_dropped(LogDropReason::WriteFailed),
        }
    }
}

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

/// Styles for each part of a line, all empty when not writing to a terminal.
struct LineStyles {
    levels: [Style; 6],
    key: Style,
    message: Style,
    location: Style,
    kv_sep: &'static str,
}

const PLAIN: LineStyles = LineStyles {
    levels: [Style::new(); 6],
    key: Style::new(),
    message: Style::new(),
    location: Style::new(),
    kv_sep: ": ",
};

const CONSOLE: LineStyles = LineStyles {
    levels: [
        fg(AnsiColor::Magenta),
        fg(AnsiColor::Red),
        fg(AnsiColor::Yellow),
        fg(AnsiColor::Green),
        fg(AnsiColor::Cyan),
        fg(AnsiColor::Blue),
    ],
    key: Style::new().bold(),
    message: Style::new().bold(),
    location: Style::new().italic(),
    kv_sep: "=",
};

impl LineStyles {
    fn level(&self, level: Level) -> Style {
        // slog levels are numbered from 1, Critical first
        self.levels[level.as_usize() - 1]
    }
}

fn write_line<IO: Write>(io: &mut IO, v: &StdLogValue, styles: &LineStyles) -> io::Result<()> {
    let level = styles.level(v.level);
    write!(
        io,
        "{} {level}{}{level:#}",
        Local::now().format(TIME_FORMAT),
        v.level
    )?;
    let key = styles.key;
    for (k, value) in &v.kv_pairs {
        write!(io, " {key}{k}{key:#}{}{value},", styles.kv_sep)?;
    }
    let message = styles.message;
    write!(io, " {message}{}{message:#}", v.message_str())?;
    if let Some(location) = &v.location {
        let style = styles.location;
        write!(io, " <{style}{location}{style:#}>")?;
    }
    writeln!(io)
}
