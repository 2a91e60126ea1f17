//! Test helper: build a valid one-page PDF with a text layer using
//! lopdf (the library pdf-extract uses internally).

use lopdf::dictionary;
use lopdf::{Document, Object, Stream};

pub(crate) fn make_test_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    // One Tj per input line so line structure survives extraction
    let body: String = text
        .lines()
        .map(|line| format!("({}) Tj T*\n", line))
        .collect();
    let content = format!("BT /F1 12 Tf 14 TL 72 720 Td\n{body}ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
