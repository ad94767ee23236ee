use anyhow::{Context, Result, bail};
use blockweave_engine::{Document, Format, Registry, deserialize, serialize_with_report};
use std::path::Path;
use std::str::FromStr;

/// What an input file holds, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Markup(Format),
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(InputFormat::Json),
            "" => bail!("Cannot tell the format of '{}' without an extension", path.display()),
            other => Format::from_str(other)
                .map(InputFormat::Markup)
                .map_err(|_| anyhow::anyhow!("Unsupported input extension '.{other}'")),
        }
    }

    /// Output used when `--to` is not given: the "other" markup format.
    pub fn default_output(self) -> OutputFormat {
        match self {
            InputFormat::Markup(Format::Html) => OutputFormat::Markup(Format::Markdown),
            InputFormat::Markup(Format::Markdown) | InputFormat::Json => {
                OutputFormat::Markup(Format::Html)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markup(Format),
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("json") {
            return Ok(OutputFormat::Json);
        }
        Format::from_str(s)
            .map(OutputFormat::Markup)
            .map_err(|e| anyhow::anyhow!("{e} (expected html, markdown or json)"))
    }
}

pub fn read_document(path: &Path, registry: &Registry) -> Result<Document> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    parse_document(&content, format, registry)
        .with_context(|| format!("Failed to load '{}'", path.display()))
}

pub fn parse_document(content: &str, format: InputFormat, registry: &Registry) -> Result<Document> {
    let doc = match format {
        InputFormat::Markup(format) => deserialize(content, registry, format),
        InputFormat::Json => Document::from_json(content)?,
    };
    for unknown in registry.check(&doc) {
        log::warn!("{unknown}");
    }
    Ok(doc)
}

/// Convert `doc`, logging anything the serializer had to recover from.
pub fn write_document(doc: &Document, registry: &Registry, to: OutputFormat) -> Result<String> {
    match to {
        OutputFormat::Json => Ok(doc.to_json()?),
        OutputFormat::Markup(format) => {
            let report = serialize_with_report(doc, registry, format);
            for issue in &report.issues {
                log::warn!("{issue}");
            }
            Ok(report.output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockweave_plugins::stock_registry;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_input_format_from_extension() {
        let cases = [
            ("a.html", InputFormat::Markup(Format::Html)),
            ("a.HTM", InputFormat::Markup(Format::Html)),
            ("a.md", InputFormat::Markup(Format::Markdown)),
            ("a.json", InputFormat::Json),
        ];
        for (path, expected) in cases {
            assert_eq!(InputFormat::from_path(&PathBuf::from(path)).unwrap(), expected);
        }
        assert!(InputFormat::from_path(&PathBuf::from("a.txt")).is_err());
        assert!(InputFormat::from_path(&PathBuf::from("README")).is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "md".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markup(Format::Markdown)
        );
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_markdown_file_converts_to_html() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "## Title\n\n**body**\n").unwrap();
        let registry = stock_registry().unwrap();

        let doc = read_document(&path, &registry).unwrap();
        let format = InputFormat::from_path(&path).unwrap();
        let html = write_document(&doc, &registry, format.default_output()).unwrap();

        assert_eq!(html, "<h2>Title</h2><p><strong>body</strong></p>");
    }

    #[test]
    fn test_json_output_reads_back() {
        let registry = stock_registry().unwrap();
        let doc = parse_document(
            "<p>hello</p>",
            InputFormat::Markup(Format::Html),
            &registry,
        )
        .unwrap();

        let json = write_document(&doc, &registry, OutputFormat::Json).unwrap();

        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }
}
