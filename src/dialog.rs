//! 对话模板渲染
//!
//! 模板位于 `<lang_dir>/dialog/<name>.dialog`，每行一个备选说法，渲染时随机取一行，
//! 并把 `{key}` 占位符替换为传入的数据；没有数据的占位符连同多余空白一起去掉。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

use crate::core::DialogError;

/// 对话模板渲染器
#[derive(Debug, Clone)]
pub struct DialogRenderer {
    lang_dir: PathBuf,
}

impl DialogRenderer {
    pub fn new(lang_dir: impl AsRef<Path>) -> Self {
        Self {
            lang_dir: lang_dir.as_ref().to_path_buf(),
        }
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.lang_dir.join("dialog").join(format!("{name}.dialog"))
    }

    /// 读取模板全部候选行
    pub fn lines(&self, name: &str) -> Result<Vec<String>, DialogError> {
        let path = self.template_path(name);
        if !path.is_file() {
            return Err(DialogError::NotFound(name.to_string()));
        }
        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(DialogError::Empty(name.to_string()));
        }
        Ok(lines)
    }

    /// 渲染模板：随机取一行并填充占位符
    pub fn render(&self, name: &str, data: &HashMap<String, String>) -> Result<String, DialogError> {
        let lines = self.lines(name)?;
        let line = lines
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| DialogError::Empty(name.to_string()))?;
        Ok(fill_placeholders(line, data))
    }
}

fn fill_placeholders(line: &str, data: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        let key = rest[open + 1..close].trim();
        if let Some(value) = data.get(key) {
            out.push_str(value);
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn renderer_with(name: &str, body: &str) -> (TempDir, DialogRenderer) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dialog")).unwrap();
        std::fs::write(dir.path().join("dialog").join(format!("{name}.dialog")), body).unwrap();
        let renderer = DialogRenderer::new(dir.path());
        (dir, renderer)
    }

    #[test]
    fn test_render_fills_placeholders() {
        let (_dir, renderer) = renderer_with("robotics", "# comment\nThe {law} law, coming up.\n");
        let mut data = HashMap::new();
        data.insert("law".to_string(), "second".to_string());
        assert_eq!(
            renderer.render("robotics", &data).unwrap(),
            "The second law, coming up."
        );
    }

    #[test]
    fn test_missing_placeholder_is_dropped() {
        let (_dir, renderer) = renderer_with("robotics", "The {law} laws, coming up.");
        assert_eq!(
            renderer.render("robotics", &HashMap::new()).unwrap(),
            "The laws, coming up."
        );
    }

    #[test]
    fn test_render_picks_one_of_the_lines() {
        let (_dir, renderer) = renderer_with("hello_world", "Hi there.\nHello!\n\n");
        let lines = renderer.lines("hello_world").unwrap();
        assert_eq!(lines.len(), 2);
        for _ in 0..10 {
            let out = renderer.render("hello_world", &HashMap::new()).unwrap();
            assert!(lines.contains(&out));
        }
    }

    #[test]
    fn test_missing_and_empty_templates() {
        let (_dir, renderer) = renderer_with("blank", "# only a comment\n");
        assert!(matches!(
            renderer.render("nope", &HashMap::new()),
            Err(DialogError::NotFound(_))
        ));
        assert!(matches!(
            renderer.render("blank", &HashMap::new()),
            Err(DialogError::Empty(_))
        ));
    }
}
