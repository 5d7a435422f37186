//! 意图识别模块
//!
//! 代替宿主的意图层：按 locale 目录中的词表与示例句做规则匹配，识别三种意图。
//!
//! ```text
//! locale/en-us/
//! ├── intent/TellMeAPoem.intent     # 示例句，每行一句，支持 (a|b) 备选
//! └── vocab/
//!     ├── HelloWorldKeyword.voc     # 关键词
//!     └── LawKeyword.voc
//! ```
//! 文件缺失时使用内置词表。

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 识别出的意图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "intent")]
pub enum Intent {
    /// 念一首诗
    TellMeAPoem,
    /// 演示用：打招呼
    HelloWorld,
    /// 演示用：机器人三定律，law 为用户提到的序号（first / second / ...）
    RoboticsLaws { law: Option<String> },
}

impl Intent {
    /// 宿主侧的意图名
    pub fn name(&self) -> &'static str {
        match self {
            Intent::TellMeAPoem => "TellMeAPoem.intent",
            Intent::HelloWorld => "HelloWorldIntent",
            Intent::RoboticsLaws { .. } => "RoboticsLawsIntent",
        }
    }
}

const POEM_INTENT_FILE: &str = "intent/TellMeAPoem.intent";
const HELLO_VOCAB_FILE: &str = "vocab/HelloWorldKeyword.voc";
const LAW_VOCAB_FILE: &str = "vocab/LawKeyword.voc";

const BUILTIN_POEM_PHRASES: &[&str] = &[
    "(tell|read|recite|say) me a poem",
    "(tell|read|recite|say) a poem",
    "i want to hear a poem",
    "poem please",
    "(give|share) me a poem",
];
const BUILTIN_HELLO_KEYWORDS: &[&str] = &["hello world", "hello", "greetings"];
const BUILTIN_LAW_KEYWORDS: &[&str] = &["law of robotics", "laws of robotics", "robotics laws"];

/// 意图词表：示例句与关键词（均已归一化）
#[derive(Debug, Clone)]
pub struct Vocabulary {
    poem_phrases: Vec<String>,
    hello_keywords: Vec<String>,
    law_keywords: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            poem_phrases: expand_all(BUILTIN_POEM_PHRASES.iter().copied()),
            hello_keywords: expand_all(BUILTIN_HELLO_KEYWORDS.iter().copied()),
            law_keywords: expand_all(BUILTIN_LAW_KEYWORDS.iter().copied()),
        }
    }
}

impl Vocabulary {
    /// 从语言目录（如 locale/en-us）加载，缺失或为空的文件回退到内置词表
    pub fn load(lang_dir: impl AsRef<Path>) -> Self {
        let lang_dir = lang_dir.as_ref();
        let builtin = Self::default();
        Self {
            poem_phrases: read_phrases(&lang_dir.join(POEM_INTENT_FILE))
                .unwrap_or(builtin.poem_phrases),
            hello_keywords: read_phrases(&lang_dir.join(HELLO_VOCAB_FILE))
                .unwrap_or(builtin.hello_keywords),
            law_keywords: read_phrases(&lang_dir.join(LAW_VOCAB_FILE))
                .unwrap_or(builtin.law_keywords),
        }
    }
}

/// 意图识别器
pub struct IntentRecognizer {
    vocab: Vocabulary,
}

impl IntentRecognizer {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// 识别用户话语；无匹配时返回 None（交给宿主的兜底处理）
    ///
    /// 匹配顺序：念诗示例句 → 定律关键词 → 打招呼关键词
    pub fn recognize(&self, utterance: &str) -> Option<Intent> {
        let text = normalize(utterance);
        if text.is_empty() {
            return None;
        }

        if contains_any(&text, &self.vocab.poem_phrases) {
            return Some(Intent::TellMeAPoem);
        }

        if contains_any(&text, &self.vocab.law_keywords) {
            return Some(Intent::RoboticsLaws {
                law: law_ordinal(&text),
            });
        }

        if contains_any(&text, &self.vocab.hello_keywords) {
            return Some(Intent::HelloWorld);
        }

        None
    }
}

impl Default for IntentRecognizer {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

/// 小写、去撇号、其它标点替换为空格、合并空白
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按整词匹配
fn contains_any(text: &str, phrases: &[String]) -> bool {
    let padded = format!(" {text} ");
    phrases
        .iter()
        .any(|p| !p.is_empty() && padded.contains(&format!(" {p} ")))
}

static LAW_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// 提取定律序号，统一为英文序数词
fn law_ordinal(text: &str) -> Option<String> {
    let re = LAW_RE
        .get_or_init(|| {
            Regex::new(r"\b(zeroth|first|second|third|0th|1st|2nd|3rd)\b|\blaw (?:number )?(zero|one|two|three|[0-3])\b").ok()
        })
        .as_ref()?;
    let caps = re.captures(text)?;
    let word = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let ordinal = match word {
        "zeroth" | "0th" | "zero" | "0" => "zeroth",
        "first" | "1st" | "one" | "1" => "first",
        "second" | "2nd" | "two" | "2" => "second",
        "third" | "3rd" | "three" | "3" => "third",
        _ => return None,
    };
    Some(ordinal.to_string())
}

/// 读取词表文件：跳过空行与 # 注释；文件缺失或无有效行时返回 None
fn read_phrases(path: &Path) -> Option<Vec<String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));
    let phrases = expand_all(lines);
    if phrases.is_empty() {
        tracing::warn!(path = %path.display(), "Vocabulary file has no phrases, using built-in");
        return None;
    }
    Some(phrases)
}

fn expand_all<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        for phrase in expand_alternations(line) {
            let phrase = normalize(&phrase);
            if !phrase.is_empty() && !out.contains(&phrase) {
                out.push(phrase);
            }
        }
    }
    out
}

/// 展开 (a|b) 备选：`(tell|read) me a poem` → `tell me a poem`、`read me a poem`
fn expand_alternations(line: &str) -> Vec<String> {
    let Some(open) = line.find('(') else {
        return vec![line.to_string()];
    };
    let Some(close) = line[open..].find(')').map(|i| open + i) else {
        return vec![line.to_string()];
    };

    let head = &line[..open];
    let tail = expand_alternations(&line[close + 1..]);
    line[open + 1..close]
        .split('|')
        .flat_map(|choice| tail.iter().map(move |t| format!("{head}{choice}{t}")))
        .collect()
}
