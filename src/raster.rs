//! Rasterizing strategy: every page is rendered to an image at a zoom factor
//! and the document is rebuilt from those images.
//!
//! Rendering is done by the engine's `png16m` device into a scratch
//! directory. The rebuilt document gets one page per image, each page keeping
//! the physical size of the original, and is saved with Flate-compressed
//! streams.

use crate::constants::{POINTS_PER_INCH, RASTER_PAGE_PATTERN};
use crate::engine::EngineHandle;
use crate::error::{CompressionError, Result};
use crate::processing::{non_interactive_args, run_engine};
use crate::verbose;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const PAGE_IMAGE_NAME: &str = "Im0";

/// Rasterizes `input` at `zoom` (1.0 = 72 DPI) and writes the rebuilt PDF to
/// `output`.
pub fn rasterize_document(engine: &EngineHandle, input: &Path, output: &Path, zoom: f32) -> Result<()> {
    if !(zoom > 0.0 && zoom.is_finite()) {
        return Err(CompressionError::Rasterization(format!(
            "zoom factor must be positive, got {}",
            zoom
        )));
    }

    let scratch = tempfile::Builder::new().prefix("pdf-squeeze-").tempdir()?;
    let args = build_render_args(input, scratch.path(), zoom);
    run_engine(engine, &args)?;

    let pages = collect_rendered_pages(scratch.path())?;
    if pages.is_empty() {
        return Err(CompressionError::Rasterization(
            "engine rendered no pages".to_string(),
        ));
    }
    verbose!("Rendered {} page(s) at zoom {:.2}", pages.len(), zoom);

    let mut doc = assemble_document(&pages, zoom)?;
    doc.compress();
    doc.save(output)?;
    Ok(())
}

pub fn build_render_args(input: &Path, scratch: &Path, zoom: f32) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-sDEVICE=png16m".into(),
        format!("-r{:.2}", POINTS_PER_INCH * zoom).into(),
        "-dTextAlphaBits=4".into(),
        "-dGraphicsAlphaBits=4".into(),
    ];
    args.extend(non_interactive_args());
    args.push("-o".into());
    args.push(scratch.join(RASTER_PAGE_PATTERN).into_os_string());
    args.push(input.as_os_str().to_os_string());
    args
}

/// Rendered page images in page order. The zero-padded file names sort
/// lexically in page order.
fn collect_rendered_pages(scratch: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = fs::read_dir(scratch)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    pages.sort();
    Ok(pages)
}

/// Builds a document with one image-only page per entry of `pages`.
pub fn assemble_document(pages: &[PathBuf], zoom: f32) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for page_path in pages {
        let page_id = add_image_page(&mut doc, pages_id, page_path, zoom)?;
        kids.push(Object::Reference(page_id));
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
    Ok(doc)
}

fn add_image_page(doc: &mut Document, pages_id: ObjectId, page_path: &Path, zoom: f32) -> Result<ObjectId> {
    let rgb = image::open(page_path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        rgb.into_raw(),
    ));

    // Pixels were rendered at 72 * zoom DPI; scale back to the original size in points.
    let page_width = width as f32 / zoom;
    let page_height = height as f32 / zoom;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(PAGE_IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width),
            Object::Real(page_height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                PAGE_IMAGE_NAME => image_id,
            },
        },
    });
    Ok(page_id)
}
