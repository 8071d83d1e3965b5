//! PDF writing: lay encoded images onto pages following a [`PlacementPlan`].
//!
//! Each distinct image is embedded once as an image XObject. Every page of
//! the plan draws that XObject at the full page width with a `cm` transform
//! shifted by the placement's offset; the page `MediaBox` clips whatever
//! falls outside the page window. A three-page CV therefore stores its
//! pixels once, not three times.

use crate::config::PageGeometry;
use crate::error::CvPressError;
use crate::pipeline::encode::EncodedImage;
use crate::pipeline::paginate::{Placement, PlacementPlan};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Values for the PDF document information dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

fn encode_failed(e: impl std::fmt::Display) -> CvPressError {
    CvPressError::EncodeFailed(e.to_string())
}

/// A PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(s.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

fn image_xobject(image: &EncodedImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        image.data.clone(),
    )
    .with_compression(false)
}

/// Content stream drawing one placement.
fn page_content(placement: &Placement, geometry: &PageGeometry) -> Result<Vec<u8>, CvPressError> {
    let width_pt = geometry.width_mm * PT_PER_MM;
    let height_pt = placement.scaled_height_mm * PT_PER_MM;
    // PDF space grows upward from the bottom edge; offsets grow downward from the top.
    let bottom_mm = geometry.height_mm - (placement.offset_mm + placement.scaled_height_mm);
    let bottom_pt = bottom_mm * PT_PER_MM;

    let operand = |v: f64| Object::Real(v as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    operand(width_pt),
                    operand(0.0),
                    operand(0.0),
                    operand(height_pt),
                    operand(0.0),
                    operand(bottom_pt),
                ],
            ),
            Operation::new(
                "Do",
                vec![Object::Name(image_name(placement.image_index).into_bytes())],
            ),
            Operation::new("Q", vec![]),
        ],
    };
    content.encode().map_err(encode_failed)
}

/// Serialize `images` laid out by `plan` into PDF bytes.
///
/// # Errors
/// `EncodeFailed` if `lopdf` rejects the document; `Internal` if the plan
/// is empty or refers to an image that was not supplied.
pub fn write_pdf(
    images: &[EncodedImage],
    plan: &PlacementPlan,
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, CvPressError> {
    if plan.placements.is_empty() {
        return Err(CvPressError::Internal("Placement plan has no pages".into()));
    }
    if let Some(p) = plan.placements.iter().find(|p| p.image_index >= images.len()) {
        return Err(CvPressError::Internal(format!(
            "Placement on page {} refers to image {} of {}",
            p.page_index + 1,
            p.image_index,
            images.len()
        )));
    }

    let geometry = &plan.geometry;
    let media_box = vec![
        Object::Real(0.0),
        Object::Real(0.0),
        Object::Real((geometry.width_mm * PT_PER_MM) as f32),
        Object::Real((geometry.height_mm * PT_PER_MM) as f32),
    ];

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_ids: Vec<ObjectId> = images
        .iter()
        .map(|image| doc.add_object(image_xobject(image)))
        .collect();

    let mut kids: Vec<Object> = Vec::with_capacity(plan.page_count());
    for placement in &plan.placements {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            page_content(placement, geometry)?,
        ));
        let mut xobjects = Dictionary::new();
        xobjects.set(
            image_name(placement.image_index),
            image_ids[placement.image_index],
        );
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Resources" => dictionary! { "XObject" => xobjects },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Creator" => Object::string_literal("cvpress"),
        "Producer" => Object::string_literal(format!("cvpress {}", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(title) = &metadata.title {
        info.set("Title", text_string(title));
    }
    if let Some(author) = &metadata.author {
        info.set("Author", text_string(author));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(encode_failed)?;
    debug!(
        "Wrote PDF: {} page(s), {} image(s), {} bytes",
        count,
        images.len(),
        bytes.len()
    );
    Ok(bytes)
}
