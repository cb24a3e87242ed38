//! # PDF Serializer
//!
//! Takes laid-out pages and writes a PDF 1.7 file. The writer is
//! from-scratch and only knows the handful of things a report draws:
//! filled and stroked rectangles, lines, single-line text in the standard
//! Helvetica fonts, and grayscale raster images.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, page tree, fonts, images, pages)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the catalog and the info dictionary
//! %%EOF
//! ```
//!
//! Page-number placeholders left by the layout are replaced here, when the
//! total page count is finally known.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use chrono::NaiveDateTime;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::barcode::RasterImage;
use crate::encoding::winansi_byte;
use crate::error::{ReportError, Result};
use crate::font::{FontContext, StandardFont, TextMeasure};
use crate::layout::{
    DrawCommand, LayoutElement, LayoutPage, TextAnchor, PAGE_NUMBER_PLACEHOLDER,
    TOTAL_PAGES_PLACEHOLDER,
};
use crate::model::Metadata;

const PRODUCER: &str = concat!("shelf ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// (font, object id); the position is the /F resource index.
    font_objects: Vec<(StandardFont, usize)>,
    /// Per page: image XObject ids in element order; the position in the
    /// flattened list is the /Im resource index.
    page_images: Vec<Vec<(usize, usize)>>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata, fonts: &FontContext) -> Result<Vec<u8>> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            page_images: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages)?;

        let total_pages = pages.len();
        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(total_pages);

        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder, fonts, total_pages);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let font_resources = self.build_font_resource_dict(&builder.font_objects);
            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
            };

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(PdfObject {
            data: Self::info_dict(metadata).into_bytes(),
        });

        Ok(self.serialize(&builder, info_obj_id))
    }

    fn info_dict(metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_text(subject));
        }
        if let Some(ref created) = metadata.created_at {
            let _ = write!(info, "/CreationDate ({}) ", Self::pdf_date(created));
        }
        let _ = write!(info, "/Producer ({}) /Creator (shelf) >>", PRODUCER);
        info
    }

    /// `D:20261015140312`
    fn pdf_date(at: &NaiveDateTime) -> String {
        at.format("D:%Y%m%d%H%M%S").to_string()
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
        fonts: &FontContext,
        total_pages: usize,
    ) -> String {
        let mut stream = String::new();
        let mut image_counter = 0usize;
        for element in &page.elements {
            self.write_element(
                &mut stream,
                element,
                page,
                page_idx,
                builder,
                fonts,
                &mut image_counter,
                total_pages,
            );
        }
        stream
    }

    /// Write a single layout element as PDF operators.
    #[allow(clippy::too_many_arguments)]
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
        fonts: &FontContext,
        image_counter: &mut usize,
        total_pages: usize,
    ) {
        let page_height = page.height;
        match &element.draw {
            DrawCommand::Rect { fill, stroke } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                if let Some(c) = fill {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        c.r, c.g, c.b, x, y, element.width, element.height
                    );
                }
                if let Some(s) = stroke {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        s.color.r, s.color.g, s.color.b, s.width, x, y, element.width, element.height
                    );
                }
            }

            DrawCommand::Line { to_x, to_y, stroke } => {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    stroke.color.r,
                    stroke.color.g,
                    stroke.color.b,
                    stroke.width,
                    element.x,
                    page_height - element.y,
                    to_x,
                    page_height - to_y
                );
            }

            DrawCommand::Text {
                text,
                font,
                font_size,
                color,
                anchor,
            } => {
                let text = text
                    .replace(PAGE_NUMBER_PLACEHOLDER, &page.number.to_string())
                    .replace(TOTAL_PAGES_PLACEHOLDER, &total_pages.to_string());
                let x = match anchor {
                    TextAnchor::Start => element.x,
                    TextAnchor::End => element.x - fonts.measure(&text, *font, *font_size),
                };
                let font_idx = self.font_index(*font, &builder.font_objects);
                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    color.r,
                    color.g,
                    color.b,
                    font_idx,
                    font_size,
                    x,
                    page_height - element.y,
                    Self::encode_text(&text)
                );
            }

            DrawCommand::Image { .. } => {
                let idx = *image_counter;
                *image_counter += 1;
                let resource = builder
                    .page_images
                    .get(page_idx)
                    .and_then(|imgs| imgs.get(idx))
                    .map(|(img_idx, _)| *img_idx);
                let x = element.x;
                let y = page_height - element.y - element.height;
                match resource {
                    Some(img_idx) => {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            element.width, element.height, x, y, img_idx
                        );
                    }
                    None => {
                        let _ = write!(
                            stream,
                            "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                            x, y, element.width, element.height
                        );
                    }
                }
            }
        }
    }

    /// Register the standard fonts actually used, in a fixed order.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used: Vec<StandardFont> = pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match &e.draw {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        used.sort();
        used.dedup();
        if used.is_empty() {
            used.push(StandardFont::Helvetica);
        }

        for font in used {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Write every raster as a grayscale XObject, page by page.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) -> Result<()> {
        let mut next_index = 0usize;
        for page in pages {
            let mut images = Vec::new();
            for element in &page.elements {
                if let DrawCommand::Image { raster } = &element.draw {
                    let obj_id = Self::write_image_xobject(builder, raster)?;
                    images.push((next_index, obj_id));
                    next_index += 1;
                }
            }
            builder.page_images.push(images);
        }
        Ok(())
    }

    fn write_image_xobject(builder: &mut PdfBuilder, raster: &RasterImage) -> Result<usize> {
        if !raster.is_consistent() {
            return Err(ReportError::StreamEncoding(format!(
                "raster of {}x{} px carries {} bytes",
                raster.width_px,
                raster.height_px,
                raster.pixels.len()
            )));
        }
        let compressed = compress_to_vec_zlib(&raster.pixels, 6);
        let obj_id = builder.objects.len();
        let mut obj_data: Vec<u8> = Vec::new();
        let _ = write!(
            obj_data,
            "<< /Type /XObject /Subtype /Image \
             /Width {} /Height {} \
             /ColorSpace /DeviceGray \
             /BitsPerComponent 8 \
             /Filter /FlateDecode \
             /Length {} >>\nstream\n",
            raster.width_px,
            raster.height_px,
            compressed.len()
        );
        obj_data.extend_from_slice(&compressed);
        obj_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject { data: obj_data });
        Ok(obj_id)
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        builder
            .page_images
            .get(page_idx)
            .map(|imgs| {
                imgs.iter()
                    .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    fn font_index(&self, font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    /// Encode text for a literal string in a WinAnsi font: escape the
    /// delimiters, octal-escape bytes outside printable ASCII, `?` for
    /// characters the encoding lacks.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let b = winansi_byte(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use chrono::NaiveDate;

    fn page(number: usize, elements: Vec<LayoutElement>) -> LayoutPage {
        LayoutPage {
            number,
            width: 595.28,
            height: 841.89,
            elements,
            rows: vec![],
        }
    }

    fn text(x: f64, y: f64, s: &str, font: StandardFont, anchor: TextAnchor) -> LayoutElement {
        LayoutElement {
            x,
            y,
            width: 0.0,
            height: 8.0,
            draw: DrawCommand::Text {
                text: s.to_string(),
                font,
                font_size: 8.0,
                color: Color::BLACK,
                anchor,
            },
        }
    }

    fn write(pages: &[LayoutPage], metadata: &Metadata) -> Vec<u8> {
        PdfWriter::new().write(pages, metadata, &FontContext::new()).unwrap()
    }

    #[test]
    fn encode_text_escapes() {
        assert_eq!(PdfWriter::encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::encode_text("back\\slash"), "back\\\\slash");
        assert_eq!(PdfWriter::encode_text("Größe"), "Gr\\366\\337e");
        assert_eq!(PdfWriter::encode_text("日"), "?");
    }

    #[test]
    fn empty_document_produces_valid_pdf() {
        let bytes = write(&[page(1, vec![])], &Metadata::default());
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn metadata_in_info_dict() {
        let created = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(14, 3, 12)
            .unwrap();
        let metadata = Metadata {
            title: Some("Stock (Q4)".to_string()),
            author: Some("Back office".to_string()),
            subject: None,
            created_at: Some(created),
        };
        let bytes = write(&[page(1, vec![])], &metadata);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Stock \\(Q4\\))"));
        assert!(text.contains("/Author (Back office)"));
        assert!(text.contains("/CreationDate (D:20261015140312)"));
    }

    #[test]
    fn bold_font_registered_separately() {
        let pages = vec![page(
            1,
            vec![
                text(10.0, 20.0, "A", StandardFont::Helvetica, TextAnchor::Start),
                text(10.0, 40.0, "B", StandardFont::HelveticaBold, TextAnchor::Start),
            ],
        )];
        let bytes = write(&pages, &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn inconsistent_raster_is_a_stream_error() {
        let pages = vec![page(
            1,
            vec![LayoutElement {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                draw: DrawCommand::Image {
                    raster: RasterImage {
                        width_px: 10,
                        height_px: 10,
                        pixels: vec![0; 3],
                    },
                },
            }],
        )];
        let err = PdfWriter::new()
            .write(&pages, &Metadata::default(), &FontContext::new())
            .unwrap_err();
        assert!(matches!(err, ReportError::StreamEncoding(_)));
    }

    #[test]
    fn images_become_gray_xobjects() {
        let pages = vec![page(
            1,
            vec![LayoutElement {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                draw: DrawCommand::Image {
                    raster: RasterImage {
                        width_px: 2,
                        height_px: 1,
                        pixels: vec![0, 255],
                    },
                },
            }],
        )];
        let bytes = write(&pages, &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/ColorSpace /DeviceGray"));
        assert!(text.contains("/XObject << /Im0 "));
    }

    #[test]
    fn output_is_deterministic() {
        let pages = vec![
            page(1, vec![text(10.0, 20.0, "Page {{pageNumber}} of {{totalPages}}", StandardFont::Helvetica, TextAnchor::End)]),
            page(2, vec![text(10.0, 20.0, "x", StandardFont::HelveticaBold, TextAnchor::Start)]),
        ];
        let a = write(&pages, &Metadata::default());
        let b = write(&pages, &Metadata::default());
        assert_eq!(a, b);
        let text = String::from_utf8_lossy(&a);
        assert!(text.contains("/Count 2"));
    }
}
