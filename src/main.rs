//! Poem Skill - 命令行宿主
//!
//! 入口：初始化日志、加载配置与技能设置、构造技能，然后把命令行参数或标准输入的每一行当作用户话语，
//! 识别意图后交给技能处理，播报内容打印到 stdout。
//!
//! 交互命令：`reload` 重新加载诗集，`stop` 停止，`quit` / `exit` 退出。

use std::path::PathBuf;

use anyhow::Context;
use poem_skill::config::load_config;
use poem_skill::dialog::DialogRenderer;
use poem_skill::observability;
use poem_skill::settings::SkillSettings;
use poem_skill::speaker::{Speaker, WriterSpeaker};
use poem_skill::{IntentRecognizer, TellMeAPoemSkill, Vocabulary};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    // 可选：POEM_SKILL_CONFIG 指定额外的配置文件
    let config_path = std::env::var_os("POEM_SKILL_CONFIG").map(PathBuf::from);
    let cfg = load_config(config_path.as_deref()).context("Failed to load config")?;

    let settings_path = cfg.skill.settings_path();
    let settings = SkillSettings::load(&settings_path)
        .with_context(|| format!("Failed to load skill settings {}", settings_path.display()))?;
    let mut skill = TellMeAPoemSkill::new(settings, cfg.skill.root.clone());
    tracing::info!(poems = skill.corpus().len(), "Skill ready");

    let lang_dir = cfg.skill.lang_dir();
    let recognizer = IntentRecognizer::new(Vocabulary::load(&lang_dir));
    let mut speaker = WriterSpeaker::new(DialogRenderer::new(&lang_dir), std::io::stdout());

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        respond(&skill, &recognizer, &args.join(" "), &mut speaker);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "stop" => {
                skill.stop();
            }
            "reload" => {
                let poems = skill.reload_poems();
                tracing::info!(poems, "Poems reloaded");
            }
            text => respond(&skill, &recognizer, text, &mut speaker),
        }
    }

    Ok(())
}

fn respond(
    skill: &TellMeAPoemSkill,
    recognizer: &IntentRecognizer,
    utterance: &str,
    speaker: &mut dyn Speaker,
) {
    match recognizer.recognize(utterance) {
        Some(intent) => skill.handle(&intent, speaker),
        None => tracing::info!(utterance, "No intent matched"),
    }
}
