// ============================================================
// Layer 4 - Dataset & Document Loaders
// ============================================================
// Two loaders:
//
//   load_examples()     - JSON-lines evaluation dataset
//   FileDocumentSource  - one document to summarize, read from
//                         a .docx file (docx-rs) or plain text
//
// Accepted dataset line layouts:
//
//   extraction layout (array):
//     [["sentence 1", "sentence 2", ...], [0, 3], "gold summary"]
//
//   annotated layout (object):
//     {"id": "...", "summary": "gold summary",
//      "text": [{"sentence": "...", "label": 1}, ...]}
//
// Blank lines are skipped. A malformed line is an error that
// names the line number; nothing is silently dropped.
//
// The .docx document tree walked by FileDocumentSource:
//   Document → Paragraph → Run → Text
//
// Reference: docx-rs crate documentation
//            serde untagged enums

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use docx_rs::read_docx;

use crate::data::preprocessor::Preprocessor;
use crate::domain::document::Document;
use crate::domain::example::LabeledExample;
use crate::domain::traits::DocumentSource;

// ─── Dataset lines ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Extracted(Vec<String>, Vec<usize>, String),
    Annotated {
        #[serde(default)]
        id:      Option<serde_json::Value>,
        summary: String,
        text:    Vec<RawSentence>,
    },
}

#[derive(Debug, Deserialize)]
struct RawSentence {
    sentence: String,
    #[serde(default)]
    label:    Option<i64>,
}

impl From<RawRecord> for LabeledExample {
    fn from(raw: RawRecord) -> Self {
        match raw {
            RawRecord::Extracted(sentences, labels, summary) => {
                LabeledExample::new(None, sentences, labels, summary)
            }
            RawRecord::Annotated { id, summary, text } => {
                let id = id.map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                });
                let labels = text
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.label.unwrap_or(0) > 0)
                    .map(|(i, _)| i)
                    .collect();
                let sentences = text.into_iter().map(|s| s.sentence).collect();
                LabeledExample::new(id, sentences, labels, summary)
            }
        }
    }
}

/// Parse a JSON-lines dataset held in memory.
pub fn parse_examples(content: &str) -> Result<Vec<LabeledExample>> {
    let mut examples = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawRecord = serde_json::from_str(line)
            .with_context(|| format!("Malformed dataset record on line {}", i + 1))?;
        examples.push(raw.into());
    }
    Ok(examples)
}

/// Load every example of a JSON-lines dataset file, in file order.
pub fn load_examples(path: impl AsRef<Path>) -> Result<Vec<LabeledExample>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read dataset '{}'", path.display()))?;
    let examples = parse_examples(&content)?;
    tracing::info!("Loaded {} examples from '{}'", examples.len(), path.display());
    Ok(examples)
}

// ─── Single documents ─────────────────────────────────────────────────────────

/// Reads the document to summarize from a file.
/// `.docx` goes through docx-rs, anything else is read as UTF-8.
pub struct FileDocumentSource {
    path: PathBuf,
}

impl FileDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileDocumentSource {
    fn load(&self) -> Result<Document> {
        let is_docx = self.path.extension().and_then(|e| e.to_str()) == Some("docx");
        let raw = if is_docx {
            load_docx_text(&self.path)?
        } else {
            fs::read_to_string(&self.path)
                .with_context(|| format!("Cannot read '{}'", self.path.display()))?
        };

        let source = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let doc = Document::new(source, Preprocessor::new().clean(&raw));
        tracing::debug!("Loaded: {} ({} chars)", doc.source, doc.text.chars().count());
        Ok(doc)
    }
}

/// Paragraph texts of a .docx file joined with newlines.
fn load_docx_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let docx = read_docx(&bytes)
        .map_err(|e| anyhow::anyhow!("docx-rs parse error in '{}': {:?}", path.display(), e))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        use docx_rs::DocumentChild;

        if let DocumentChild::Paragraph(para) = child {
            let text = paragraph_text(para);
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        use docx_rs::ParagraphChild;

        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                use docx_rs::RunChild;

                if let RunChild::Text(t) = rc {
                    parts.push(t.text.clone());
                }
            }
        }
    }
    parts.join("")
}
