use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use shelf_audit_application::{ApplicationError, Checklist, ChecklistPdfWriter};
use shelf_audit_domain::LocationRecord;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_BLOCK: f32 = 22.0;
const ROW_HEIGHT: f32 = 9.0;
const ROWS_PER_PAGE: usize = 26;

const BOX_X: f32 = MARGIN;
const BOX_SIZE: f32 = 5.0;
const LOCATION_X: f32 = MARGIN + 12.0;
const DESCRIPTION_X: f32 = MARGIN + 55.0;
const QUANTITY_X: f32 = PAGE_WIDTH - MARGIN - 35.0;
const DESCRIPTION_MAX_CHARS: usize = 48;

/// A4 paper checklist: one ruled row per location with an empty box and a quantity line.
#[derive(Debug, Default)]
pub struct PrintPdfChecklistWriter;

impl ChecklistPdfWriter for PrintPdfChecklistWriter {
    fn write_checklist(&self, checklist: &Checklist) -> Result<Vec<u8>, ApplicationError> {
        let title = format!("Location checklist {}", checklist.part_number);
        let (doc, first_page, first_layer) =
            PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "checklist");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let fonts = Fonts { regular, bold };

        let pages = pages_needed(checklist.locations.len());
        let mut chunks = checklist.locations.chunks(ROWS_PER_PAGE);
        for page_number in 1..=pages {
            let layer = if page_number == 1 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "checklist");
                doc.get_page(page).get_layer(layer)
            };
            let rows = chunks.next().unwrap_or_default();
            draw_page(&layer, &fonts, checklist, rows, page_number, pages);
        }

        save(doc)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pages_needed(rows: usize) -> usize {
    rows.div_ceil(ROWS_PER_PAGE).max(1)
}

fn draw_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    checklist: &Checklist,
    rows: &[LocationRecord],
    page_number: usize,
    pages: usize,
) {
    let top = PAGE_HEIGHT - MARGIN;
    layer.use_text(
        format!("Part number: {}", checklist.part_number),
        14.0,
        Mm(MARGIN),
        Mm(top - 6.0),
        &fonts.bold,
    );
    layer.use_text(
        format!(
            "Generated {}  |  {} locations  |  page {page_number}/{pages}",
            checklist.generated_at,
            checklist.locations.len()
        ),
        9.0,
        Mm(MARGIN),
        Mm(top - 13.0),
        &fonts.regular,
    );

    let header_y = top - TITLE_BLOCK;
    layer.use_text("OK", 9.0, Mm(BOX_X), Mm(header_y), &fonts.bold);
    layer.use_text("Location", 9.0, Mm(LOCATION_X), Mm(header_y), &fonts.bold);
    layer.use_text(
        "Description",
        9.0,
        Mm(DESCRIPTION_X),
        Mm(header_y),
        &fonts.bold,
    );
    layer.use_text("Quantity", 9.0, Mm(QUANTITY_X), Mm(header_y), &fonts.bold);
    layer.set_outline_thickness(0.6);
    layer.add_line(segment(
        MARGIN,
        header_y - 2.0,
        PAGE_WIDTH - MARGIN,
        header_y - 2.0,
    ));

    layer.set_outline_thickness(0.3);
    for (index, row) in rows.iter().enumerate() {
        let baseline = header_y - ROW_HEIGHT * (index as f32 + 1.0);
        layer.add_line(square(BOX_X, baseline - 1.0, BOX_SIZE));
        layer.use_text(
            row.location.as_str(),
            10.0,
            Mm(LOCATION_X),
            Mm(baseline),
            &fonts.regular,
        );
        layer.use_text(
            truncate(&row.description, DESCRIPTION_MAX_CHARS),
            9.0,
            Mm(DESCRIPTION_X),
            Mm(baseline),
            &fonts.regular,
        );
        layer.add_line(segment(
            QUANTITY_X,
            baseline - 1.0,
            PAGE_WIDTH - MARGIN,
            baseline - 1.0,
        ));
    }
}

fn segment(x1: f32, y1: f32, x2: f32, y2: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    }
}

fn square(x: f32, y: f32, size: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + size), Mm(y)), false),
            (Point::new(Mm(x + size), Mm(y + size)), false),
            (Point::new(Mm(x), Mm(y + size)), false),
        ],
        is_closed: true,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    shortened.push_str("...");
    shortened
}

fn save(doc: PdfDocumentReference) -> Result<Vec<u8>, ApplicationError> {
    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(error: printpdf::Error) -> ApplicationError {
    ApplicationError::Report(format!("failed to render pdf: {error}"))
}
