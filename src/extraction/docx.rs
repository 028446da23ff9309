use super::ExtractionError;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};

/// Body paragraphs joined by line breaks. Tables, headers and footers are not read.
pub(super) fn paragraph_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes).map_err(|error| ExtractionError::Docx(error.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
        .map(|paragraph| {
            let mut line = String::new();
            for child in &paragraph.children {
                let ParagraphChild::Run(run) = child else {
                    continue;
                };
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => line.push_str(&text.text),
                        RunChild::Tab(_) => line.push('\t'),
                        RunChild::Break(_) => line.push('\n'),
                        _ => {}
                    }
                }
            }
            line
        })
        .collect();

    Ok(paragraphs.join("\n"))
}
