//! Generated PDFs shared by the normalizer, cache and crawler tests.

use lopdf::content::{Content, Operation};
use lopdf::xref::XrefType;
use lopdf::{dictionary, Document, Object, Stream};

const FILLER_LINES: usize = 80;

/// A one-page, Flate-compressed PDF that renders `field` among a fixed
/// block of boilerplate text. Two calls with fields of equal length give two
/// documents of the same layout.
pub(crate) fn sample_pdf(field: &str) -> Vec<u8> {
    sample_pdf_with_xref(field, XrefType::CrossReferenceStream)
}

/// [`sample_pdf`] written with the given cross-reference layout.
pub(crate) fn sample_pdf_with_xref(field: &str, xref: XrefType) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 9.into()]),
        Operation::new("Td", vec![40.into(), 800.into()]),
        Operation::new("Tj", vec![Object::string_literal(field)]),
    ];
    for line in 0..FILLER_LINES {
        operations.push(Operation::new("Td", vec![0.into(), (-9).into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(format!(
                "Clause {:03}: the insured party accepts the general conditions of coverage.",
                line
            ))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.reference_table.cross_reference_type = xref;

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Decoded content stream of the first page, lossily as text.
pub(crate) fn page_text(pdf: &[u8]) -> String {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}
