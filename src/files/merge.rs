//! Merge a registration's documents into a single PDF.
//!
//! PDF attachments contribute their pages as-is; image attachments (JPEG,
//! PNG) each become one A4 page with the image scaled to fit and centered.
//! Inputs are combined in the fetch order of the underlying file records.
//! Unlike the upload paths, a single failed download aborts the whole merge.

use crate::error::AppError;
use crate::sep::{DocumentStore, SepStore};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

const A4_WIDTH: f32 = 595.28;
const A4_HEIGHT: f32 = 841.89;

/// Result of a merge-and-download.
#[derive(Debug)]
pub struct MergedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Fetch every document of a registration, merge them and name the result
/// after the patient. Fails if the registration has no documents or any
/// single download fails.
pub async fn merge_sep_documents(
    store: &dyn SepStore,
    documents: &dyn DocumentStore,
    bucket: &str,
    registrasi_id: &str,
    pasien_nama: &str,
) -> Result<MergedDocument, AppError> {
    let rows = store.files_for_registrasi(registrasi_id).await?;
    if rows.is_empty() {
        return Err(AppError::Document(
            "Tidak ada dokumen yang ditemukan untuk registrasi ini.".to_string(),
        ));
    }

    tracing::info!(
        "[Merge] Combining {} documents for registrasi {}",
        rows.len(),
        registrasi_id
    );

    let downloads = rows.iter().map(|row| async move {
        let bytes = documents
            .download(bucket, &row.path_file)
            .await
            .map_err(|_| AppError::upstream(format!("Gagal download file: {}", row.nama_file)))?;
        Ok::<_, AppError>((row.path_file.clone(), bytes))
    });
    let inputs = futures::future::try_join_all(downloads).await?;

    let bytes = merge_documents(&inputs)?;
    let page_count = Document::load_mem(&bytes)
        .map_err(|e| AppError::Document(format!("Hasil merge tidak valid: {}", e)))?
        .get_pages()
        .len();

    Ok(MergedDocument {
        file_name: merged_file_name(pasien_nama, registrasi_id),
        bytes,
        page_count,
    })
}

/// `dokumen_sep_{patient}_{short id}.pdf`, with the patient name lowercased
/// and non-alphanumerics collapsed to underscores.
pub fn merged_file_name(pasien_nama: &str, registrasi_id: &str) -> String {
    let sanitized: String = pasien_nama
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let short_id: String = registrasi_id.chars().take(8).collect();
    format!("dokumen_sep_{}_{}.pdf", sanitized, short_id)
}

/// Combine `(path, bytes)` inputs into one PDF, in input order. Paths are
/// only used to pick a handler by extension; unsupported extensions are
/// skipped with a warning.
pub fn merge_documents(inputs: &[(String, Vec<u8>)]) -> Result<Vec<u8>, AppError> {
    let mut output = Document::with_version("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for (path, bytes) in inputs {
        let ext = path
            .rsplit('.')
            .next()
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => append_pdf(&mut output, &mut page_ids, path, bytes)?,
            "jpg" | "jpeg" => append_image(&mut output, &mut page_ids, path, bytes, true)?,
            "png" => append_image(&mut output, &mut page_ids, path, bytes, false)?,
            other => {
                tracing::warn!("[Merge] Skipping {}: unsupported type '{}'", path, other);
            }
        }
    }

    if page_ids.is_empty() {
        return Err(AppError::Document(
            "Tidak ada halaman yang dapat digabungkan.".to_string(),
        ));
    }

    finalize(&mut output, &page_ids)?;

    let mut bytes = Vec::new();
    output
        .save_to(&mut bytes)
        .map_err(|e| AppError::Document(format!("Gagal menyimpan PDF gabungan: {}", e)))?;
    Ok(bytes)
}

/// Import a PDF's pages into `output`, preserving their order.
fn append_pdf(
    output: &mut Document,
    page_ids: &mut Vec<ObjectId>,
    path: &str,
    bytes: &[u8],
) -> Result<(), AppError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Document(format!("File PDF rusak ({}): {}", path, e)))?;
    doc.renumber_objects_with(output.max_id + 1);
    output.max_id = doc.max_id;

    // Page dicts lose their tree, so attributes inherited from Pages nodes
    // (Resources, MediaBox, ...) must be written onto the pages themselves.
    let pages = doc.get_pages();
    let mut pushed_down: Vec<(ObjectId, Vec<(&[u8], Object)>)> = Vec::new();
    for (_, page_id) in pages.iter() {
        let mut attrs = Vec::new();
        for key in [
            b"Resources".as_slice(),
            b"MediaBox".as_slice(),
            b"CropBox".as_slice(),
            b"Rotate".as_slice(),
        ] {
            let has_own = doc
                .get_object(*page_id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .map(|d| d.has(key))
                .unwrap_or(false);
            if !has_own {
                if let Some(value) = inherited_attr(&doc, *page_id, key) {
                    attrs.push((key, value));
                }
            }
        }
        if !attrs.is_empty() {
            pushed_down.push((*page_id, attrs));
        }
    }
    for (page_id, attrs) in pushed_down {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            for (key, value) in attrs {
                dict.set(key, value);
            }
        }
    }

    for (object_id, object) in std::mem::take(&mut doc.objects) {
        match dict_type(&object) {
            b"Catalog" | b"Pages" | b"Outlines" | b"Outline" => {}
            _ => {
                output.objects.insert(object_id, object);
            }
        }
    }

    page_ids.extend(pages.values());
    Ok(())
}

/// Walk the page's Parent chain for an inherited attribute.
fn inherited_attr(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    loop {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
}

fn dict_type(object: &Object) -> &[u8] {
    object
        .as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(|t| t.as_name())
        .unwrap_or(b"")
}

/// Add one A4 page showing the image scaled to fit and centered. JPEG
/// bytes are embedded as-is behind a DCTDecode filter; PNG is decoded and
/// embedded as raw RGB.
fn append_image(
    output: &mut Document,
    page_ids: &mut Vec<ObjectId>,
    path: &str,
    bytes: &[u8],
    is_jpeg: bool,
) -> Result<(), AppError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AppError::Document(format!("File gambar rusak ({}): {}", path, e)))?;
    let (width, height) = (decoded.width(), decoded.height());

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "BitsPerComponent" => 8,
    };
    let data = if is_jpeg {
        let color_space = match decoded.color() {
            image::ColorType::L8 | image::ColorType::La8 => "DeviceGray",
            _ => "DeviceRGB",
        };
        image_dict.set("ColorSpace", color_space);
        image_dict.set("Filter", "DCTDecode");
        bytes.to_vec()
    } else {
        image_dict.set("ColorSpace", "DeviceRGB");
        decoded.to_rgb8().into_raw()
    };
    let image_id = output.add_object(Object::Stream(Stream::new(image_dict, data)));

    let scale = (A4_WIDTH / width as f32).min(A4_HEIGHT / height as f32);
    let draw_width = width as f32 * scale;
    let draw_height = height as f32 * scale;
    let offset_x = (A4_WIDTH - draw_width) / 2.0;
    let offset_y = (A4_HEIGHT - draw_height) / 2.0;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(draw_width.into()),
                    0.into(),
                    0.into(),
                    Object::Real(draw_height.into()),
                    Object::Real(offset_x.into()),
                    Object::Real(offset_y.into()),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| AppError::Document(format!("Gagal menulis konten halaman: {}", e)))?;
    let content_id = output.add_object(Object::Stream(Stream::new(Dictionary::new(), encoded)));

    let resources = dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    };
    let page_id = output.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(A4_WIDTH.into()),
            Object::Real(A4_HEIGHT.into()),
        ],
        "Resources" => resources,
        "Contents" => content_id,
    });

    page_ids.push(page_id);
    Ok(())
}

/// Build the page tree and catalog over the collected pages.
fn finalize(output: &mut Document, page_ids: &[ObjectId]) -> Result<(), AppError> {
    let pages_id = output.new_object_id();
    for page_id in page_ids {
        if let Ok(Object::Dictionary(dict)) = output.get_object_mut(*page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    output.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_ids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    output.trailer.set("Root", catalog_id);
    output.max_id = output.objects.len() as u32;
    output.renumber_objects();
    Ok(())
}
