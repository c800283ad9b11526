//! Page tree edits: blank padding and reordering

use super::LOPDF;
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Append `count` blank pages, sized like the first page, to the end of the document
pub(crate) fn append_blank_pages(mut doc: Document, count: usize) -> Result<Document> {
    if count == 0 {
        return Ok(doc);
    }

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let media_box = match page_ids.first() {
        Some(&first) => inherited_attribute(&doc, first, b"MediaBox")?
            .unwrap_or_else(default_media_box),
        None => default_media_box(),
    };

    let pages_id = pages_root_id(&doc)?;
    let mut kids = kids_of(&doc, pages_id)?;

    for _ in 0..count {
        let blank_page_id = create_blank_page(&mut doc, &media_box, pages_id);
        kids.push(Object::Reference(blank_page_id));
    }

    set_kids(&mut doc, pages_id, kids, page_ids.len() + count)?;
    Ok(doc)
}

/// Rebuild the document so its pages are those at the 1-indexed positions in
/// `order`, in that order.
///
/// The page tree is flattened under the root. A page that appears more than
/// once is duplicated; pages that do not appear are dropped.
pub(crate) fn reorder_document(mut doc: Document, order: &[i64]) -> Result<Document> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = page_ids.len();

    let mut sources = Vec::with_capacity(order.len());
    for &page in order {
        if page < 1 || page as usize > total {
            return Err(BookletError::tool(
                LOPDF,
                format!("page {} is out of range (document has {} pages)", page, total),
            ));
        }
        sources.push(page_ids[(page - 1) as usize]);
    }

    // Intermediate page tree nodes are about to be detached
    for &page_id in &page_ids {
        materialize_inherited(&mut doc, page_id)?;
    }

    let pages_id = pages_root_id(&doc)?;
    let mut placed = HashSet::new();
    let mut kids = Vec::with_capacity(sources.len());

    for source_id in sources {
        let page_id = if placed.insert(source_id) {
            source_id
        } else {
            let copy = doc.get_dictionary(source_id)?.clone();
            doc.add_object(copy)
        };
        doc.get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len();
    set_kids(&mut doc, pages_id, kids, count)?;
    doc.prune_objects();

    Ok(doc)
}

/// Look up a page attribute, following Parent links for inherited values
pub(crate) fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }

    Ok(None)
}

/// Copy inherited attributes onto the page itself
fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut missing = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key)? {
                    missing.push((key, value));
                }
            }
        }
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in missing {
        page.set(key, value);
    }
    Ok(())
}

fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;
    Ok(catalog.get(b"Pages")?.as_reference()?)
}

fn kids_of(doc: &Document, pages_id: ObjectId) -> Result<Vec<Object>> {
    let pages_dict = doc.get_dictionary(pages_id)?;
    match pages_dict.get(b"Kids") {
        Ok(Object::Array(arr)) => Ok(arr.clone()),
        _ => Err(BookletError::tool(LOPDF, "Pages Kids array not found")),
    }
}

fn set_kids(doc: &mut Document, pages_id: ObjectId, kids: Vec<Object>, count: usize) -> Result<()> {
    let pages_dict = doc.get_dictionary_mut(pages_id)?;
    pages_dict.set("Count", Object::Integer(count as i64));
    pages_dict.set("Kids", Object::Array(kids));
    Ok(())
}

/// Create a blank page with the given media box
fn create_blank_page(doc: &mut Document, media_box: &Object, parent_id: ObjectId) -> ObjectId {
    let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_id));
    page_dict.set("MediaBox", media_box.clone());
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(Dictionary::new()));

    doc.add_object(page_dict)
}

fn default_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.0 as i64),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.1 as i64),
    ])
}
