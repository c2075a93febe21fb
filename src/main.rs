use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use card_query::config::ReplConfig;
use card_query::history::History;
use card_query::lexer::tokenize;
use card_query::{parse_query, plausible_filter_ranges, PartialTerm, Validity};

/// 加载 shell 配置，文件缺失或损坏时使用默认配置
fn load_config() -> ReplConfig {
    let path = ReplConfig::default_path();
    match ReplConfig::from_json_file(&path) {
        Ok(config) => {
            println!("✅ 成功加载配置文件: {}", path.display());
            config
        }
        Err(err) => {
            tracing::debug!(error = %err, "使用默认配置");
            ReplConfig::default()
        }
    }
}

/// 为最后一个子句（光标处）正在输入的值给出候选
fn suggest(input: &str) {
    let Some(span) = plausible_filter_ranges(input).last().copied() else {
        return;
    };
    if span.end != input.len() {
        return;
    }
    let term = PartialTerm::parse(span.slice(input));
    let value = term.value();
    if !value.is_terminated() {
        println!("… 引号尚未闭合: {}", term);
    }
    let Some(filter_type) = term.filter_type() else {
        return;
    };
    let candidates: Vec<_> = filter_type
        .values_with_prefix(value.content())
        .take(8)
        .collect();
    if !candidates.is_empty() {
        println!("[候选值] {}", candidates.join(", "));
    }
}

fn describe(input: &str, config: &ReplConfig, history: &mut History) {
    if config.show_tokens {
        println!("[token 流]");
        for token in tokenize(input) {
            println!("  {:?} {:?}", token.kind, token.span.slice(input));
        }
    }

    if config.show_ranges {
        let ranges: Vec<_> = plausible_filter_ranges(input)
            .iter()
            .map(|span| span.slice(input))
            .collect();
        println!("[子句范围] {:?}", ranges);
    }
    suggest(input);

    let query = match parse_query(input) {
        Ok(query) => query,
        Err(err) => {
            println!("✗ 查询尚未完成: {}", err);
            if let Some(span) = err.span {
                println!("  位置 {}-{}", span.start, span.end);
            }
            return;
        }
    };

    for term in query.leaves() {
        if !term.is_complete() {
            println!("… 正在输入: {}", term);
        }
    }

    let Some(complete) = query.try_map(PartialTerm::complete) else {
        println!("[结构] {}", query);
        return;
    };

    println!("✓ {}", complete);
    for term in complete.leaves() {
        match term.validity() {
            Validity::Valid => {}
            Validity::UnknownField => println!("  ⚠️ 未知字段: {}", term),
            Validity::UnsupportedComparison => {
                println!("  ⚠️ 字段不支持该比较: {}", term)
            }
            Validity::UnknownValue => println!("  ⚠️ 未知取值: {}", term),
        }
    }
    println!("[取反] {}", complete.clone().negated());

    let entry = history.record(&complete);
    if config.show_json {
        match entry.to_json() {
            Ok(json) => println!("[json] {}", json),
            Err(err) => tracing::warn!(error = %err, "无法序列化历史记录"),
        }
    }
}

fn print_history(history: &History) {
    for (index, entry) in history.entries().iter().enumerate() {
        println!("{:>3}. {}", index + 1, entry.text());
    }
    let mut counts: Vec<_> = history.usage_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
    for (term, count) in counts.iter().take(10) {
        println!("     {:>3}× {}", count, term);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config();
    let mut editor = DefaultEditor::new()?;
    if let Some(path) = &config.history_file {
        if let Err(err) = editor.load_history(path) {
            tracing::debug!(error = %err, path = %path.display(), "未加载行历史");
        }
    }

    println!("--- card_query: 输入查询，:history 查看历史，Ctrl-D 退出 ---");
    let mut history = History::default();

    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                editor.add_history_entry(input)?;
                if input == ":history" {
                    print_history(&history);
                } else {
                    describe(input, &config, &mut history);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &config.history_file {
        if let Err(err) = editor.save_history(path) {
            tracing::warn!(error = %err, path = %path.display(), "无法保存行历史");
        }
    }
    Ok(())
}
