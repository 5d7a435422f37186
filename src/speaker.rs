//! 语音输出通道
//!
//! 技能只产出「要说的话」：自由文本或具名对话模板；由宿主决定如何渲染与播报。

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::dialog::DialogRenderer;

/// 一次输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Utterance {
    Text { text: String },
    Dialog {
        name: String,
        data: HashMap<String, String>,
    },
}

/// 宿主提供的输出通道
pub trait Speaker {
    fn speak(&mut self, text: &str);

    fn speak_dialog(&mut self, name: &str, data: &HashMap<String, String>);
}

/// 缓存全部输出，供宿主批量取走（测试也用它断言输出）
#[derive(Debug, Default)]
pub struct BufferedSpeaker {
    utterances: Vec<Utterance>,
}

impl BufferedSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn take(&mut self) -> Vec<Utterance> {
        std::mem::take(&mut self.utterances)
    }
}

impl Speaker for BufferedSpeaker {
    fn speak(&mut self, text: &str) {
        self.utterances.push(Utterance::Text {
            text: text.to_string(),
        });
    }

    fn speak_dialog(&mut self, name: &str, data: &HashMap<String, String>) {
        self.utterances.push(Utterance::Dialog {
            name: name.to_string(),
            data: data.clone(),
        });
    }
}

/// 渲染对话模板后逐行写出（命令行宿主用 stdout）
pub struct WriterSpeaker<W: Write> {
    dialogs: DialogRenderer,
    out: W,
}

impl<W: Write> WriterSpeaker<W> {
    pub fn new(dialogs: DialogRenderer, out: W) -> Self {
        Self { dialogs, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::warn!("Failed to write utterance: {}", e);
        }
    }
}

impl<W: Write> Speaker for WriterSpeaker<W> {
    fn speak(&mut self, text: &str) {
        self.write_line(text);
    }

    fn speak_dialog(&mut self, name: &str, data: &HashMap<String, String>) {
        match self.dialogs.render(name, data) {
            Ok(text) => self.write_line(&text),
            Err(e) => {
                // 模板缺失时念出模板名
                tracing::warn!(dialog = name, "Dialog render failed: {}", e);
                let fallback = name.replace('_', " ");
                self.write_line(&fallback);
            }
        }
    }
}
