use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{
    dictionary, Dictionary, Document as PdfDocument, Object, ObjectId, Stream, StringFormat,
};

use crate::errors::EpaperResult;
use crate::layout::page::{Document, DrawOp, Page};
use crate::layout::text::Font;
use crate::layout::typeface::{FaceSet, Typeface, Typesetter};

const MM_TO_PT: f32 = 72.0 / 25.4;
const BFCHAR_BLOCK: usize = 100;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Base-14 fonts only speak WinAnsi; anything outside Latin-1 becomes '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// PDF text string: plain ASCII as is, anything else as UTF-16BE with a BOM.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Literal)
}

fn font_name(font: &Font) -> &'static str {
    if font.bold {
        "F2"
    } else {
        "F1"
    }
}

#[derive(Debug, Default)]
struct UsedGlyph {
    /// Unshaped advance in thousandths of an em.
    width: f32,
    text: String,
}

/// Glyphs drawn with each embedded face, collected while pages are encoded.
struct Embedding<'a> {
    faces: &'a FaceSet,
    used: [BTreeMap<u16, UsedGlyph>; 2],
}

impl<'a> Embedding<'a> {
    fn new(faces: &'a FaceSet) -> Self {
        Self {
            faces,
            used: [BTreeMap::new(), BTreeMap::new()],
        }
    }

    /// `TJ` operand for one line: two-byte glyph ids with kerning numbers
    /// wherever the shaped advance differs from the font's own.
    fn glyph_run(&mut self, slot: usize, text: &str) -> Vec<Object> {
        let face = self.faces.face(slot);
        let mut run = Vec::new();
        let mut pending: Vec<u8> = Vec::new();
        let mut adjust = 0.0f32;

        for glyph in face.shape(text) {
            let width = face.glyph_advance(glyph.glyph_id);
            let used = self.used[slot].entry(glyph.glyph_id).or_insert_with(|| UsedGlyph {
                width,
                text: String::new(),
            });
            if used.text.is_empty() && !glyph.text.is_empty() {
                used.text = glyph.text.clone();
            }

            adjust -= glyph.offset;
            if adjust.abs() > 0.01 {
                if !pending.is_empty() {
                    let glyphs = std::mem::take(&mut pending);
                    run.push(Object::String(glyphs, StringFormat::Hexadecimal));
                }
                run.push(adjust.into());
            }
            pending.extend_from_slice(&glyph.glyph_id.to_be_bytes());
            adjust = width - glyph.advance + glyph.offset;
        }

        if !pending.is_empty() {
            run.push(Object::String(pending, StringFormat::Hexadecimal));
        }
        run
    }

    fn add_fonts(&self, pdf: &mut PdfDocument) -> Dictionary {
        let regular = add_type0_font(pdf, self.faces.face(0), &self.used[0]);
        let bold = if self.faces.has_bold() {
            add_type0_font(pdf, self.faces.face(1), &self.used[1])
        } else {
            regular
        };
        dictionary! {
            "F1" => regular,
            "F2" => bold,
        }
    }
}

fn base_fonts(pdf: &mut PdfDocument) -> Dictionary {
    let regular = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    dictionary! {
        "F1" => regular,
        "F2" => bold,
    }
}

fn to_unicode_cmap(used: &BTreeMap<u16, UsedGlyph>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let mapped: Vec<(&u16, &UsedGlyph)> = used.iter().filter(|(_, g)| !g.text.is_empty()).collect();
    for block in mapped.chunks(BFCHAR_BLOCK) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (glyph_id, glyph) in block {
            let utf16: String = glyph.text.encode_utf16().map(|u| format!("{:04X}", u)).collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", glyph_id, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

/// Embeds the whole TrueType program as a Type0 font with Identity-H
/// encoding, so glyph ids go straight into the content stream.
fn add_type0_font(
    pdf: &mut PdfDocument,
    face: &Typeface,
    used: &BTreeMap<u16, UsedGlyph>,
) -> ObjectId {
    let metrics = face.metrics();
    let program = face.data().to_vec();
    let length = program.len() as i64;
    let file_id = pdf.add_object(Stream::new(dictionary! { "Length1" => length }, program));

    let bbox: Vec<Object> = metrics.bbox.iter().map(|&v| Object::from(v)).collect();
    let descriptor_id = pdf.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => face.name(),
        "Flags" => 32,
        "FontBBox" => bbox,
        "ItalicAngle" => 0,
        "Ascent" => metrics.ascent,
        "Descent" => metrics.descent,
        "CapHeight" => metrics.cap_height,
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let widths: Vec<Object> = used
        .iter()
        .flat_map(|(glyph_id, glyph)| {
            [
                Object::from(i64::from(*glyph_id)),
                Object::Array(vec![glyph.width.round().into()]),
            ]
        })
        .collect();
    let cid_font_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => face.name(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = pdf.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(used).into_bytes(),
    ));
    pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => face.name(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::from(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

fn page_operations(page: &Page, embedding: &mut Option<Embedding<'_>>) -> Vec<Operation> {
    let height = mm_to_pt(page.size.height);
    let mut ops = Vec::new();

    for op in &page.ops {
        match op {
            DrawOp::FillRect { rect, gray } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("g", vec![(*gray).into()]));
                ops.push(Operation::new(
                    "re",
                    vec![
                        mm_to_pt(rect.x).into(),
                        (height - mm_to_pt(rect.bottom())).into(),
                        mm_to_pt(rect.width).into(),
                        mm_to_pt(rect.height).into(),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.push(Operation::new("G", vec![0.into()]));
                ops.push(Operation::new(
                    "m",
                    vec![mm_to_pt(*x1).into(), (height - mm_to_pt(*y1)).into()],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![mm_to_pt(*x2).into(), (height - mm_to_pt(*y2)).into()],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Text {
                x, top, text, font, ..
            } => {
                // Baseline sits one em below the top of the line box.
                let baseline = top + font.size / MM_TO_PT;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font_name(font).into(), font.size.into()],
                ));
                ops.push(Operation::new(
                    "Td",
                    vec![mm_to_pt(*x).into(), (height - mm_to_pt(baseline)).into()],
                ));
                match embedding {
                    Some(embedding) => {
                        let slot = embedding.faces.slot(*font);
                        let run = embedding.glyph_run(slot, text);
                        ops.push(Operation::new("TJ", vec![Object::Array(run)]));
                    }
                    None => {
                        let literal = Object::string_literal(encode_text(text));
                        ops.push(Operation::new("Tj", vec![literal]));
                    }
                }
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops
}

/// Encodes a rendered document as PDF bytes. Text is drawn with the
/// typesetter's embedded fonts when it has any, else with Helvetica.
pub fn encode_pdf(document: &Document, typesetter: &Typesetter) -> EpaperResult<Vec<u8>> {
    let mut pdf = PdfDocument::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let mut embedding = typesetter.faces().map(Embedding::new);
    let mut contents = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = Content {
            operations: page_operations(page, &mut embedding),
        };
        contents.push(content.encode()?);
    }

    let fonts = match &embedding {
        Some(embedding) => embedding.add_fonts(&mut pdf),
        None => base_fonts(&mut pdf),
    };
    let resources_id = pdf.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for (page, content) in document.pages.iter().zip(contents) {
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content));
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            mm_to_pt(page.size.width).into(),
            mm_to_pt(page.size.height).into(),
        ];
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => media_box,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );

    let info_id = pdf.add_object(dictionary! {
        "Title" => text_string(&document.title),
        "Producer" => Object::string_literal("epaper"),
    });
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageSize, Rect};
    use crate::layout::typeface::tests::installed_font;

    fn sample_document(pages: usize, text: &str) -> Document {
        let size = PageSize {
            width: 210.0,
            height: 297.0,
        };
        let pages = (0..pages)
            .map(|i| {
                let mut page = Page::new(size);
                page.fill(Rect::new(10.0, 10.0, 50.0, 20.0), 0.9);
                page.hline(10.0, 200.0, 40.0, 0.5);
                page.text(10.0, 50.0, 30.0, format!("{} {}", text, i + 1), Font::bold(12.0));
                page
            })
            .collect();

        Document {
            title: "Dainik".to_string(),
            pages,
        }
    }

    fn fonts_of_subtype<'a>(pdf: &'a PdfDocument, subtype: &[u8]) -> Vec<&'a Dictionary> {
        pdf.objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .filter(|dict| {
                dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(subtype)
            })
            .collect()
    }

    #[test]
    fn test_encode_produces_loadable_pdf() {
        let bytes = encode_pdf(&sample_document(2, "Page"), &Typesetter::builtin()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let loaded = PdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 2);
        assert_eq!(fonts_of_subtype(&loaded, b"Type1").len(), 2);
    }

    #[test]
    fn test_non_latin_text_is_replaced() {
        assert_eq!(encode_text("Dhaka ঢাকা"), b"Dhaka ????".to_vec());
        assert_eq!(encode_text("31°C"), vec![b'3', b'1', 0xB0, b'C']);
    }

    #[test]
    fn test_bengali_title_is_utf16() {
        match text_string("দৈনিক") {
            Object::String(bytes, _) => {
                assert_eq!(&bytes[..4], &[0xFE, 0xFF, 0x09, 0xA6]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(text_string("Dainik"), Object::String(b, _) if b == b"Dainik"));
    }

    #[test]
    fn test_text_operations_flip_y_axis() {
        let mut page = Page::new(PageSize {
            width: 100.0,
            height: 100.0,
        });
        page.text(0.0, 0.0, 10.0, "top", Font::regular(10.0));
        let ops = page_operations(&page, &mut None);

        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let y = td.operands[1].as_float().unwrap();
        assert!(y < mm_to_pt(100.0));
        assert!(y > mm_to_pt(100.0) - 20.0);
    }

    #[test]
    fn test_embedded_text_is_drawn_by_glyph_id() {
        let Some(face) = installed_font() else {
            return;
        };
        let faces = FaceSet::new(face, None);
        let mut embedding = Embedding::new(&faces);
        let run = embedding.glyph_run(0, "Khabar");

        let Some(Object::String(first, StringFormat::Hexadecimal)) = run.first() else {
            panic!("expected a glyph string, got {:?}", run);
        };
        assert_eq!(first.len() % 2, 0);
        let k = embedding.used[0].values().find(|g| g.text == "K");
        assert!(k.is_some_and(|g| g.width > 0.0));

        let cmap = to_unicode_cmap(&embedding.used[0]);
        assert!(cmap.contains("beginbfchar"));
        assert!(cmap.contains("<004B>"));
    }

    #[test]
    fn test_embedded_font_has_unicode_map() {
        let Some(face) = installed_font() else {
            return;
        };
        let typesetter = Typesetter::embedded(FaceSet::new(face, None));
        let bytes = encode_pdf(&sample_document(1, "খবর Khabar"), &typesetter).unwrap();
        let loaded = PdfDocument::load_mem(&bytes).unwrap();

        let type0 = fonts_of_subtype(&loaded, b"Type0");
        assert_eq!(type0.len(), 1);
        let encoding = type0[0].get(b"Encoding").and_then(Object::as_name).ok();
        assert_eq!(encoding, Some(&b"Identity-H"[..]));
        assert!(type0[0].get(b"ToUnicode").is_ok());
        assert!(fonts_of_subtype(&loaded, b"Type1").is_empty());
        assert_eq!(fonts_of_subtype(&loaded, b"CIDFontType2").len(), 1);
    }
}
