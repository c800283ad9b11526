use lopdf::{Dictionary, Document, Object, Stream};
use pdf_booklet::*;
use std::path::Path;

/// Build a document whose page `i` (1-indexed) is `600 + i` points wide,
/// so page identity survives reordering.
fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 1..=num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600 + i as i64),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn write_pdf(mut doc: Document, path: &Path) {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(path, writer).unwrap();
}

/// Width of every page, in document order
fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            match &media_box[2] {
                Object::Integer(i) => *i,
                Object::Real(r) => r.round() as i64,
                other => panic!("unexpected MediaBox entry {:?}", other),
            }
        })
        .collect()
}

#[tokio::test]
async fn test_count_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.pdf");
    write_pdf(create_test_pdf(7), &path);

    let tools = NativeTools::default();
    assert_eq!(tools.count_pages(&path).await.unwrap(), 7);
}

#[tokio::test]
async fn test_count_pages_not_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.pdf");
    std::fs::write(&path, b"plain text").unwrap();

    assert!(NativeTools::default().count_pages(&path).await.is_err());
}

#[tokio::test]
async fn test_pad_with_blanks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.pdf");
    write_pdf(create_test_pdf(5), &path);

    let tools = NativeTools::default();
    let added = tools.pad_with_blanks(&path, 8, dir.path()).await.unwrap();

    assert_eq!(added, 3);
    assert_eq!(tools.count_pages(&path).await.unwrap(), 8);
    // Blank pages copy the first page's MediaBox
    assert_eq!(page_widths(&path), vec![601, 602, 603, 604, 605, 601, 601, 601]);
}

#[tokio::test]
async fn test_pad_with_blanks_already_at_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.pdf");
    write_pdf(create_test_pdf(8), &path);

    let tools = NativeTools::default();
    assert_eq!(tools.pad_with_blanks(&path, 8, dir.path()).await.unwrap(), 0);
    assert_eq!(tools.pad_with_blanks(&path, 4, dir.path()).await.unwrap(), 0);
    assert_eq!(tools.count_pages(&path).await.unwrap(), 8);
}

#[tokio::test]
async fn test_reorder_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(create_test_pdf(8), &input);

    let order = flatten(&compute_sheets(8, 1));
    NativeTools::default()
        .reorder_pages(&input, &output, &order)
        .await
        .unwrap();

    let expected: Vec<i64> = order.iter().map(|p| 600 + p).collect();
    assert_eq!(page_widths(&output), expected);
}

#[tokio::test]
async fn test_reorder_with_duplicates_and_omissions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(create_test_pdf(4), &input);

    let tools = NativeTools::default();
    tools
        .reorder_pages(&input, &output, &[2, 2, 4])
        .await
        .unwrap();

    assert_eq!(tools.count_pages(&output).await.unwrap(), 3);
    assert_eq!(page_widths(&output), vec![602, 602, 604]);
}

#[tokio::test]
async fn test_reorder_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(create_test_pdf(4), &input);

    let result = NativeTools::default()
        .reorder_pages(&input, &output, &[1, 5])
        .await;
    match result {
        Err(BookletError::Tool { message, .. }) => assert!(message.contains("out of range")),
        _ => panic!("Expected Tool error"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_impose_two_up_landscape() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(create_test_pdf(8), &input);

    NativeTools::new(PaperSize::A4)
        .impose_two_up_landscape(&input, &output)
        .await
        .unwrap();

    let doc = Document::load(&output).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 4);

    for &page_id in pages.values() {
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        // A4 landscape
        assert!((width - 841.89).abs() < 0.5);
        assert!((height - 595.28).abs() < 0.5);

        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(xobjects.len(), 2);
    }
}

#[tokio::test]
async fn test_impose_odd_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    write_pdf(create_test_pdf(3), &input);

    let tools = NativeTools::default();
    tools.impose_two_up_landscape(&input, &output).await.unwrap();
    assert_eq!(tools.count_pages(&output).await.unwrap(), 2);
}

#[tokio::test]
async fn test_impose_honours_rotation_and_crop_box() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");

    // Every page turned a quarter clockwise by the page tree
    let mut doc = create_test_pdf(2);
    let pages_id = doc.catalog().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
    let tree = doc.get_dictionary_mut(pages_id).unwrap();
    tree.set("Rotate", Object::Integer(90));
    let first_page = *doc.get_pages().get(&1).unwrap();
    let page = doc.get_dictionary_mut(first_page).unwrap();
    page.set(
        "CropBox",
        Object::Array(vec![
            Object::Integer(50),
            Object::Integer(50),
            Object::Integer(550),
            Object::Integer(750),
        ]),
    );
    write_pdf(doc, &input);

    NativeTools::new(PaperSize::A4)
        .impose_two_up_landscape(&input, &output)
        .await
        .unwrap();

    let doc = Document::load(&output).unwrap();
    let sheet = *doc.get_pages().get(&1).unwrap();
    let content = String::from_utf8(doc.get_page_content(sheet).unwrap()).unwrap();
    for line in content.lines() {
        // a = 0 and b < 0: drawn turned clockwise
        assert!(line.starts_with("q 0 -"), "unexpected placement: {}", line);
    }

    let resources = doc.get_dictionary(sheet).unwrap().get(b"Resources").unwrap();
    let xobjects = resources.as_dict().unwrap().get(b"XObject").unwrap().as_dict().unwrap();
    let first = xobjects.get(b"P0").unwrap().as_reference().unwrap();
    let bbox: Vec<f32> = doc
        .get_object(first)
        .unwrap()
        .as_stream()
        .unwrap()
        .dict
        .get(b"BBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect();
    assert_eq!(bbox, vec![50.0, 50.0, 550.0, 750.0]);
}
