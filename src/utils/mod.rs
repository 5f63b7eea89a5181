use chrono::{Local, NaiveDate};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "shuati-tracker";

pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn session_path() -> PathBuf {
    app_data_dir().join("session.json")
}

pub fn log_path() -> PathBuf {
    app_data_dir().join("shuati-tracker.log")
}

/// 本地时区的今天，作为打卡和统计的参考日期
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 初始化日志：终端输出 + 可选的日志文件
pub fn init_logger(level: log::LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Warn)
        .level_for("shuati_tracker", level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

/// 把 Markdown 备注压成单行纯文本，超长截断
pub fn notes_preview(markdown: &str, max_chars: usize) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) | Event::End(TagEnd::CodeBlock) => {
                text.push(' ')
            }
            _ => {}
        }
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut truncated: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_preview_strips_markdown() {
        let notes = "**Two pointers**, see `left < right`.\n\n- sort first\n- skip dups";
        assert_eq!(
            notes_preview(notes, 80),
            "Two pointers, see left < right. - sort first - skip dups"
        );
    }

    #[test]
    fn test_notes_preview_truncates() {
        assert_eq!(notes_preview("abcdefghij", 5), "abcd…");
        assert_eq!(notes_preview("abc", 5), "abc");
    }

    #[test]
    fn test_app_paths_share_directory() {
        assert_eq!(session_path().parent(), Some(app_data_dir().as_path()));
        assert_eq!(log_path().parent(), Some(app_data_dir().as_path()));
    }
}
