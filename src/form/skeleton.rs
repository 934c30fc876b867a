//! Ready-made widgets for custom-skeleton fields.

use std::fs;
use std::path::Path;

use crate::form::render::{CustomWidget, FieldBinding};
use crate::form::value::{FieldValue, FileAttachment};

/// Single choice shown as a row of radio buttons.
#[derive(Debug, Clone)]
pub struct RadioGroup {
    options: Vec<String>,
    selected: Option<String>,
}

impl RadioGroup {
    pub fn new(options: Vec<String>, selected: Option<String>) -> Self {
        Self { options, selected }
    }

    /// Renderer for [`FieldDescriptor::skeleton`](crate::form::FieldDescriptor::skeleton).
    pub fn renderer(
        options: &[&str],
    ) -> impl Fn(&FieldBinding<'_>) -> Box<dyn CustomWidget> + Send + Sync + 'static {
        let options: Vec<String> = options.iter().map(|option| option.to_string()).collect();
        move |binding: &FieldBinding<'_>| {
            let selected = binding
                .value
                .and_then(FieldValue::as_text)
                .map(str::to_string);
            Box::new(RadioGroup::new(options.clone(), selected)) as Box<dyn CustomWidget>
        }
    }
}

impl CustomWidget for RadioGroup {
    fn lines(&self) -> Vec<String> {
        let row: Vec<String> = self
            .options
            .iter()
            .map(|option| {
                let mark = if self.selected.as_deref() == Some(option.as_str()) {
                    '*'
                } else {
                    ' '
                };
                format!("({mark}) {option}")
            })
            .collect();
        vec![row.join("   ")]
    }

    fn interpret(&self, raw: &str) -> Result<FieldValue, String> {
        let key = raw.trim();
        if key.is_empty() {
            if let Some(selected) = &self.selected {
                return Ok(FieldValue::text(selected.clone()));
            }
        }
        let by_index = key
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.options.get(index));
        by_index
            .or_else(|| {
                self.options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(key))
            })
            .map(|option| FieldValue::text(option.clone()))
            .ok_or_else(|| format!("Choose one of: {}", self.options.join(", ")))
    }
}

/// File picker backed by paths on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileUploader {
    files: Vec<FileAttachment>,
}

impl FileUploader {
    pub fn new(files: Vec<FileAttachment>) -> Self {
        Self { files }
    }

    pub fn renderer() -> impl Fn(&FieldBinding<'_>) -> Box<dyn CustomWidget> + Send + Sync + 'static
    {
        |binding: &FieldBinding<'_>| {
            let files = binding
                .value
                .and_then(FieldValue::as_files)
                .map(<[FileAttachment]>::to_vec)
                .unwrap_or_default();
            Box::new(FileUploader::new(files)) as Box<dyn CustomWidget>
        }
    }

    /// Reads one file into an attachment, guessing its content type.
    pub fn load(path: &Path) -> Result<FileAttachment, String> {
        let bytes = fs::read(path).map_err(|err| format!("Cannot read {}: {err}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(FileAttachment::new(file_name, content_type_for(path), bytes))
    }
}

impl CustomWidget for FileUploader {
    fn lines(&self) -> Vec<String> {
        if self.files.is_empty() {
            return vec![
                "Click to upload: enter a file path".to_string(),
                "SVG, PNG, JPG, GIF or PDF".to_string(),
            ];
        }
        self.files
            .iter()
            .map(|file| format!("{} ({}, {} bytes)", file.file_name, file.content_type, file.bytes.len()))
            .collect()
    }

    fn interpret(&self, raw: &str) -> Result<FieldValue, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(FieldValue::Files(self.files.clone()));
        }
        if raw == "-" {
            return Ok(FieldValue::Files(Vec::new()));
        }
        Ok(FieldValue::Files(vec![Self::load(Path::new(raw))?]))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
