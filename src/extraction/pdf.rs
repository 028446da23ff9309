use super::ExtractionError;
use lopdf::Document;

/// Concatenated text layer of every page, one line break after each page that yielded text.
///
/// Pages whose content streams cannot be decoded are skipped; an unreadable document is an error.
pub(super) fn text_layer(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::Pdf(error.to_string()))?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(page = page_number, error = %error, "Skipping unreadable PDF page");
            }
        }
    }
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// One A4 page, with a Courier text run when `text` is given and an empty content stream
    /// otherwise.
    pub(crate) fn single_page_pdf(text: Option<&str>) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => Vec::new(),
        };
        let content = Content { operations };
        let content_id =
            document.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn reads_text_layer() {
        let text = text_layer(&single_page_pdf(Some("Quarterly results"))).unwrap();
        assert!(text.contains("Quarterly results"), "unexpected text: {text:?}");
    }

    #[test]
    fn blank_page_has_no_text() {
        let text = text_layer(&single_page_pdf(None)).unwrap();
        assert!(text.trim().is_empty());
    }
}
