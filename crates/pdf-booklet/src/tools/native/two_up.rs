//! Two-up landscape imposition
//!
//! Each output sheet holds two consecutive source pages side by side, each
//! scaled to fit its half of the sheet and centred in it. Page rotation and
//! crop boxes are honoured.

use super::LOPDF;
use super::xobject::{PageBox, create_page_xobject, get_page_box, get_page_rotation};
use crate::constants::mm_to_pt;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Pages per output sheet
const PAGES_PER_SIDE: usize = 2;

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Where and how large a source page is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    x: f32,
    y: f32,
    scale: f32,
}

pub(crate) fn impose_two_up(source: &Document, paper: PaperSize) -> Result<Document> {
    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
    if page_ids.is_empty() {
        return Err(BookletError::tool(LOPDF, "document has no pages to impose"));
    }

    let (width_mm, height_mm) = paper.dimensions_with_orientation(Orientation::Landscape);
    let sheet_width = mm_to_pt(width_mm);
    let sheet_height = mm_to_pt(height_mm);
    let cell_width = sheet_width / PAGES_PER_SIDE as f32;

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut page_refs = Vec::new();

    for pair in page_ids.chunks(PAGES_PER_SIDE) {
        let mut xobjects = Dictionary::new();
        let mut content_ops = String::new();

        for (slot, &page_id) in pair.iter().enumerate() {
            let page_box = get_page_box(source, page_id)?;
            let rotation = get_page_rotation(source, page_id)?;
            let cell = Rect {
                x: slot as f32 * cell_width,
                y: 0.0,
                width: cell_width,
                height: sheet_height,
            };
            let placement = fit_to_cell(page_box.displayed_size(rotation), &cell);

            let xobject_name = format!("P{}", slot);
            let xobject_id =
                create_page_xobject(&mut output, source, page_id, page_box, &mut cache)?;
            xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));
            content_ops.push_str(&placement_command(
                &xobject_name,
                &page_box,
                rotation,
                &placement,
            ));
        }

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let content_id = output.add_object(Stream::new(
            Dictionary::new(),
            content_ops.into_bytes(),
        ));

        let page_id = output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_tree_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(sheet_width),
                    Object::Real(sheet_height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));
        page_refs.push(Object::Reference(page_id));
    }

    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Scale a page of the given displayed size to fit the cell, preserving
/// aspect ratio, and centre it
fn fit_to_cell((width, height): (f32, f32), cell: &Rect) -> Placement {
    let scale = (cell.width / width).min(cell.height / height);
    Placement {
        x: cell.x + (cell.width - width * scale) / 2.0,
        y: cell.y + (cell.height - height * scale) / 2.0,
        scale,
    }
}

/// Content stream command drawing an XObject at a placement.
///
/// The matrix maps the page box, turned `rotation` degrees clockwise, onto
/// the placement rectangle. The box origin may not be 0,0.
fn placement_command(
    xobject_name: &str,
    page: &PageBox,
    rotation: u16,
    placement: &Placement,
) -> String {
    let s = placement.scale;
    let (px, py) = (placement.x, placement.y);
    let (ox, oy) = (page.x, page.y);
    let (w, h) = (page.width, page.height);

    let [a, b, c, d, e, f] = match rotation {
        90 => [0.0, -s, s, 0.0, px - s * oy, py + s * (w + ox)],
        180 => [-s, 0.0, 0.0, -s, px + s * (w + ox), py + s * (h + oy)],
        270 => [0.0, s, -s, 0.0, px + s * (h + oy), py - s * ox],
        _ => [s, 0.0, 0.0, s, px - s * ox, py - s * oy],
    };
    format!(
        "q {} {} {} {} {} {} cm /{} Do Q\n",
        a, b, c, d, e, f, xobject_name
    )
}
