//! Form XObjects wrapping source pages

use super::pages::inherited_attribute;
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// A page's visible area in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PageBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_PAGE_DIMENSIONS.0,
            height: DEFAULT_PAGE_DIMENSIONS.1,
        }
    }
}

impl PageBox {
    /// Width and height as displayed, after `rotation` degrees clockwise
    pub fn displayed_size(&self, rotation: u16) -> (f32, f32) {
        match rotation {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }

    fn intersect(&self, other: &PageBox) -> Option<PageBox> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        (x1 > x0 && y1 > y0).then_some(PageBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x),
            Object::Real(self.y),
            Object::Real(self.x + self.width),
            Object::Real(self.y + self.height),
        ])
    }
}

/// Copy a source page into `output` as a Form XObject.
///
/// `cache` maps source object ids to their copies so shared resources are
/// only copied once.
pub(crate) fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    page_box: PageBox,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let content_data = get_page_content(source, source.get_dictionary(page_id)?)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", page_box.to_object());
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

/// Visible area of a source page: the CropBox clipped to the MediaBox, or
/// the MediaBox when there is no usable CropBox. Inherited values included.
pub(crate) fn get_page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let media_box = read_box(doc, page_id, b"MediaBox")?.unwrap_or_default();
    let Some(crop_box) = read_box(doc, page_id, b"CropBox")? else {
        return Ok(media_box);
    };
    Ok(crop_box.intersect(&media_box).unwrap_or(media_box))
}

/// Page rotation in degrees clockwise: 0, 90, 180 or 270
pub(crate) fn get_page_rotation(doc: &Document, page_id: ObjectId) -> Result<u16> {
    let degrees = match resolve(doc, inherited_attribute(doc, page_id, b"Rotate")?)? {
        Some(Object::Integer(i)) => i,
        Some(Object::Real(r)) => r.round() as i64,
        _ => return Ok(0),
    };
    Ok(match degrees.rem_euclid(360) {
        90 => 90,
        180 => 180,
        270 => 270,
        _ => 0,
    })
}

fn read_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<PageBox>> {
    let Some(rect) = resolve(doc, inherited_attribute(doc, page_id, key)?)? else {
        return Ok(None);
    };
    let Ok(values) = rect.as_array() else {
        return Ok(None);
    };
    let numbers: Vec<f32> = values.iter().filter_map(extract_number).collect();
    if numbers.len() != 4 {
        return Ok(None);
    }

    let (x0, x1) = (numbers[0].min(numbers[2]), numbers[0].max(numbers[2]));
    let (y0, y1) = (numbers[1].min(numbers[3]), numbers[1].max(numbers[3]));
    if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
        return Ok(None);
    }

    Ok(Some(PageBox {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }))
}

fn resolve(doc: &Document, obj: Option<Object>) -> Result<Option<Object>> {
    match obj {
        Some(Object::Reference(id)) => Ok(Some(doc.get_object(id)?.clone())),
        other => Ok(other),
    }
}

/// Get the decoded content stream data from a page
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    let refs = match contents {
        Object::Reference(id) => vec![*id],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_reference().ok())
            .collect(),
        _ => return Ok(Vec::new()),
    };

    let mut result = Vec::new();
    for id in refs {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            result.extend_from_slice(&content);
            result.push(b'\n');
        }
    }

    Ok(result)
}

/// Deep copy an object from source to output document, following references.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the id first so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
