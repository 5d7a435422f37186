//! 诗集加载器
//!
//! 读取诗集 JSON 文档（书 → 可选章节 → 诗），展平为 PoemRecord 列表。
//!
//! 文档中每个标量都以数组形式存放，取第一个元素：
//! ```text
//! {"DOC": {
//!   "TITLE": ["书名"], "AUTHOR": ["作者"],
//!   "SECTION": [{"SECTIONTITLE": ["章节"], "POEMS": [{"TITLE": [..], "AUTHOR": [..], "CONTENT": [..]}]}],
//!   "POEMS": [{"TITLE": [..], "CONTENT": [..]}]
//! }}
//! ```
//! 有 SECTION 时只读各章节下的 POEMS，顶层 POEMS 被忽略。

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::LoadError;

/// 诗没有标题时使用的占位标题
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// 单首诗（构造后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRecord {
    pub book_title: String,
    pub book_author: String,
    pub section_title: Option<String>,
    pub poem_title: String,
    pub poem_author: String,
    pub content: String,
}

/// 展平后的诗集，保持文档顺序；只能整体重建，不做增量修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Corpus {
    poems: Vec<PoemRecord>,
}

impl Corpus {
    pub fn new(poems: Vec<PoemRecord>) -> Self {
        Self { poems }
    }

    pub fn len(&self) -> usize {
        self.poems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poems.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PoemRecord> {
        self.poems.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoemRecord> {
        self.poems.iter()
    }

    pub fn as_slice(&self) -> &[PoemRecord] {
        &self.poems
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a PoemRecord;
    type IntoIter = std::slice::Iter<'a, PoemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.poems.iter()
    }
}

impl FromIterator<PoemRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = PoemRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 书级元数据，所有诗共享
struct Book<'a> {
    title: &'a str,
    author: &'a str,
}

/// 诗集加载器
pub struct CorpusLoader;

impl CorpusLoader {
    /// 严格加载：任何失败都以 LoadError 返回（结构错误时带上已解析的部分诗集）
    pub fn load(path: impl AsRef<Path>) -> Result<Corpus, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|e| LoadError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| LoadError::MalformedDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Self::from_document(&document)
    }

    /// 宽松加载：失败时记录一条 error 日志，返回空诗集或已解析的部分诗集，从不报错
    pub fn load_or_empty(path: impl AsRef<Path>) -> Corpus {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(corpus) => {
                tracing::info!(path = %path.display(), poems = corpus.len(), "Loaded poems");
                corpus
            }
            Err(e) => {
                tracing::error!(path = %path.display(), kind = e.kind(), "{}", e);
                e.into_partial()
            }
        }
    }

    /// 从已解析的 JSON 文档展平诗集
    pub fn from_document(document: &Value) -> Result<Corpus, LoadError> {
        let doc = document
            .as_object()
            .and_then(|root| root.get("DOC"))
            .ok_or_else(|| LoadError::InvalidSchema("missing 'DOC'".to_string()))?;
        let doc = doc
            .as_object()
            .ok_or_else(|| LoadError::InvalidSchema("'DOC' is not an object".to_string()))?;

        let mut poems = Vec::new();
        match Self::flatten_into(doc, &mut poems) {
            Ok(()) => Ok(Corpus::new(poems)),
            Err(reason) => Err(LoadError::Structure {
                reason,
                partial: Corpus::new(poems),
            }),
        }
    }

    fn flatten_into(doc: &Map<String, Value>, out: &mut Vec<PoemRecord>) -> Result<(), String> {
        let book = Book {
            title: required_first(doc, "TITLE", "DOC")?,
            author: required_first(doc, "AUTHOR", "DOC")?,
        };

        if let Some(sections) = doc.get("SECTION") {
            let sections = as_array(sections, "DOC.SECTION")?;
            for (i, section) in sections.iter().enumerate() {
                let ctx = format!("DOC.SECTION[{i}]");
                let section = as_object(section, &ctx)?;
                let section_title = optional_first(section, "SECTIONTITLE", &ctx)?;
                let poems = required_array(section, "POEMS", &ctx)?;
                for (j, poem) in poems.iter().enumerate() {
                    let ctx = format!("{ctx}.POEMS[{j}]");
                    out.push(build_record(poem, &book, section_title, &ctx)?);
                }
            }
        } else {
            let poems = required_array(doc, "POEMS", "DOC")?;
            for (j, poem) in poems.iter().enumerate() {
                let ctx = format!("DOC.POEMS[{j}]");
                out.push(build_record(poem, &book, None, &ctx)?);
            }
        }

        Ok(())
    }
}

fn build_record(
    poem: &Value,
    book: &Book<'_>,
    section_title: Option<&str>,
    ctx: &str,
) -> Result<PoemRecord, String> {
    let poem = as_object(poem, ctx)?;
    let content = required_first(poem, "CONTENT", ctx)?;
    if content.trim().is_empty() {
        return Err(format!("{ctx}.CONTENT: empty"));
    }

    Ok(PoemRecord {
        book_title: book.title.to_string(),
        book_author: book.author.to_string(),
        section_title: section_title.map(str::to_string),
        poem_title: optional_first(poem, "TITLE", ctx)?
            .unwrap_or(UNKNOWN_TITLE)
            .to_string(),
        poem_author: optional_first(poem, "AUTHOR", ctx)?
            .unwrap_or(book.author)
            .to_string(),
        content: content.to_string(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(value: &'a Value, ctx: &str) -> Result<&'a Map<String, Value>, String> {
    value
        .as_object()
        .ok_or_else(|| format!("{ctx}: expected object, found {}", type_name(value)))
}

fn as_array<'a>(value: &'a Value, ctx: &str) -> Result<&'a Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("{ctx}: expected array, found {}", type_name(value)))
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    ctx: &str,
) -> Result<&'a Vec<Value>, String> {
    let value = obj
        .get(key)
        .ok_or_else(|| format!("{ctx}.{key}: missing"))?;
    as_array(value, &format!("{ctx}.{key}"))
}

/// 取字段的第一个字符串元素；裸字符串视同单元素数组，空数组与 null 视为缺失
fn optional_first<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    ctx: &str,
) -> Result<Option<&'a str>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(Value::Array(items)) => match items.first() {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(format!(
                "{ctx}.{key}[0]: expected string, found {}",
                type_name(other)
            )),
        },
        Some(other) => Err(format!(
            "{ctx}.{key}: expected array of strings, found {}",
            type_name(other)
        )),
    }
}

fn required_first<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    ctx: &str,
) -> Result<&'a str, String> {
    optional_first(obj, key, ctx)?.ok_or_else(|| format!("{ctx}.{key}: missing"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// 统计 error 级别日志条数
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_errors<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let counter = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&counter)));
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, counter.load(Ordering::SeqCst))
    }

    fn sectioned_doc() -> Value {
        json!({"DOC": {
            "TITLE": ["Collected"],
            "AUTHOR": ["Book Author"],
            "SECTION": [
                {"SECTIONTITLE": ["Spring"], "POEMS": [
                    {"TITLE": ["One"], "CONTENT": ["first"]},
                    {"TITLE": ["Two"], "AUTHOR": ["Guest"], "CONTENT": ["second"]}
                ]},
                {"POEMS": [
                    {"CONTENT": ["third"]}
                ]},
                {"SECTIONTITLE": ["Empty"], "POEMS": []}
            ]
        }})
    }

    #[test]
    fn test_flat_document_scenario() {
        let doc = json!({"DOC":{"TITLE":["X"],"AUTHOR":["Y"],"POEMS":[{"TITLE":["A"],"CONTENT":["hi"]}]}});
        let corpus = CorpusLoader::from_document(&doc).unwrap();
        assert_eq!(
            corpus.as_slice(),
            &[PoemRecord {
                book_title: "X".to_string(),
                book_author: "Y".to_string(),
                section_title: None,
                poem_title: "A".to_string(),
                poem_author: "Y".to_string(),
                content: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn test_sectioned_count_and_order() {
        let corpus = CorpusLoader::from_document(&sectioned_doc()).unwrap();
        assert_eq!(corpus.len(), 3);
        let contents: Vec<&str> = corpus.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(corpus.get(0).unwrap().section_title.as_deref(), Some("Spring"));
        assert_eq!(corpus.get(2).unwrap().section_title, None);
    }

    #[test]
    fn test_defaulting_and_explicit_fields() {
        let corpus = CorpusLoader::from_document(&sectioned_doc()).unwrap();
        let explicit = corpus.get(1).unwrap();
        assert_eq!(explicit.poem_title, "Two");
        assert_eq!(explicit.poem_author, "Guest");

        let defaulted = corpus.get(2).unwrap();
        assert_eq!(defaulted.poem_title, UNKNOWN_TITLE);
        assert_eq!(defaulted.poem_author, "Book Author");
    }

    #[test]
    fn test_sections_win_over_top_level_poems() {
        let doc = json!({"DOC": {
            "TITLE": ["B"], "AUTHOR": ["A"],
            "SECTION": [{"POEMS": [{"CONTENT": ["in section"]}]}],
            "POEMS": [{"CONTENT": ["top level"]}]
        }});
        let corpus = CorpusLoader::from_document(&doc).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(0).unwrap().content, "in section");
    }

    #[test]
    fn test_bare_strings_accepted() {
        let doc = json!({"DOC": {"TITLE": "B", "AUTHOR": "A", "POEMS": [{"TITLE": "T", "CONTENT": "c"}]}});
        let corpus = CorpusLoader::from_document(&doc).unwrap();
        assert_eq!(corpus.get(0).unwrap().poem_title, "T");
        assert_eq!(corpus.get(0).unwrap().book_title, "B");
    }

    #[test]
    fn test_missing_doc_is_invalid_schema() {
        let err = CorpusLoader::from_document(&json!({"BOOK": {}})).unwrap_err();
        assert!(matches!(err, LoadError::InvalidSchema(_)));

        let err = CorpusLoader::from_document(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, LoadError::InvalidSchema(_)));
    }

    #[test]
    fn test_missing_book_title_fails_whole_document() {
        let doc = json!({"DOC": {"AUTHOR": ["A"], "POEMS": [{"CONTENT": ["c"]}]}});
        let err = CorpusLoader::from_document(&doc).unwrap_err();
        assert!(err.to_string().contains("DOC.TITLE"));
        assert!(err.into_partial().is_empty());
    }

    #[test]
    fn test_structure_error_keeps_partial() {
        let doc = json!({"DOC": {"TITLE": ["B"], "AUTHOR": ["A"], "POEMS": [
            {"CONTENT": ["ok one"]},
            {"CONTENT": ["ok two"]},
            {"TITLE": ["no body"]},
            {"CONTENT": ["never reached"]}
        ]}});
        let err = CorpusLoader::from_document(&doc).unwrap_err();
        assert!(err.to_string().contains("DOC.POEMS[2].CONTENT"));
        let partial = err.into_partial();
        assert_eq!(partial.len(), 2);
        assert_eq!(partial.get(1).unwrap().content, "ok two");
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let doc = json!({"DOC": {"TITLE": ["B"], "AUTHOR": ["A"], "POEMS": [{"CONTENT": ["   "]}]}});
        let err = CorpusLoader::from_document(&doc).unwrap_err();
        assert!(matches!(err, LoadError::Structure { .. }));
    }

    #[test]
    fn test_wrong_shape_reports_type() {
        let doc = json!({"DOC": {"TITLE": ["B"], "AUTHOR": ["A"], "SECTION": {"POEMS": []}}});
        let err = CorpusLoader::from_document(&doc).unwrap_err();
        assert!(err.to_string().contains("expected array, found object"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poems.json");
        std::fs::write(&path, sectioned_doc().to_string()).unwrap();

        let corpus = CorpusLoader::load(&path).unwrap();
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_nonexistent_path_logs_one_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(
            CorpusLoader::load(&path),
            Err(LoadError::FileNotFound(_))
        ));

        let (corpus, errors) = count_errors(|| CorpusLoader::load_or_empty(&path));
        assert!(corpus.is_empty());
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = CorpusLoader::load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"DOC\": [").unwrap();

        let err = CorpusLoader::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument { .. }));

        let (corpus, errors) = count_errors(|| CorpusLoader::load_or_empty(&path));
        assert!(corpus.is_empty());
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_load_or_empty_returns_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        let doc = json!({"DOC": {"TITLE": ["B"], "AUTHOR": ["A"], "POEMS": [
            {"CONTENT": ["kept"]}, 42
        ]}});
        std::fs::write(&path, doc.to_string()).unwrap();

        let (corpus, errors) = count_errors(|| CorpusLoader::load_or_empty(&path));
        assert_eq!(corpus.len(), 1);
        assert_eq!(errors, 1);
    }
}
