//! Lease contract PDF generation
//!
//! Lays out one contract top to bottom on A4 pages: header, parties grid,
//! the numbered articles, particular conditions and the signature blocks.
//! Pages are kept as operation lists until every page exists, so the
//! `Page N sur Total` footer and the optional watermark can be stamped in a
//! second pass before the lopdf document is assembled.

use anyhow::{Context, Result};
use log::{debug, info};
use lopdf::{
    content::{Content, Operation},
    Dictionary, Document, Object, ObjectId, Stream, StringFormat,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::clauses::{particular_conditions, ClauseOverrides, ClauseSet, PARTICULAR_CONDITIONS_TITLE};
use crate::config::{colors, GenerationOptions, LayoutConfig, Rgb};
use crate::error::GenerationError;
use crate::fonts::{FontContext, FontFace, FontWeight, FIRST_CHAR, LAST_CHAR};
use crate::images::{prefetch_images, DefaultImageSource, EmbeddedImage, ImageSource};
use crate::model::{non_blank, ContractData};
use crate::placeholders::{format_date, PlaceholderResolver};
use crate::text_layer::{PageText, PlacedText, TextLayer};
use crate::typography::{sanitize_text, wrap_text};
use crate::validation::validate_contract;

const TITLE: &str = "CONTRAT DE BAIL A USAGE D'HABITATION";
const SUBTITLE: &str = "République du Sénégal";
const INTRO: &str = "IL A ETE CONVENU ET ARRETE CE QUI SUIT :";

const LOGO_HEIGHT: f32 = 40.0;
const LOGO_SPACING: f32 = 20.0;
const TITLE_SIZE: f32 = 14.0;
const SUBTITLE_SIZE: f32 = 10.0;
const TITLE_BOX_PADDING: f32 = 40.0;
const TITLE_BOX_HEIGHT: f32 = 50.0;
const AFTER_HEADER: f32 = 30.0;

const COLUMN_GAP: f32 = 10.0;
const PARTY_HEADING_SIZE: f32 = 10.0;
const PARTY_TEXT_SIZE: f32 = 9.0;
const PARTY_LEADING: f32 = 12.0;
const AFTER_GRID: f32 = 30.0;

const PARTICULAR_GAP: f32 = 20.0;

const SIGNATURE_TITLE_SIZE: f32 = 12.0;
const SIGNATURE_LABEL_SIZE: f32 = 10.0;
const CAPTION_SIZE: f32 = 9.0;
const SIGNATURE_MAX_WIDTH: f32 = 120.0;
const SIGNATURE_MAX_HEIGHT: f32 = 60.0;
const SIGNATURE_IMAGE_OFFSET: f32 = 20.0;

const FOOTER_SIZE: f32 = 9.0;
const FOOTER_TEXT_INSET: f32 = 80.0;
const WATERMARK_STATE: &str = "GSWatermark";

/// A rendered contract.
#[derive(Debug, Clone)]
pub struct GeneratedContract {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub text_layer: TextLayer,
}

impl GeneratedContract {
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Reusable contract generator. Holds no per-document state, so one engine
/// can serve concurrent calls.
pub struct LeaseContractEngine {
    config: LayoutConfig,
    fonts: FontContext,
    clauses: ClauseSet,
    images: Box<dyn ImageSource>,
}

impl LeaseContractEngine {
    /// Engine with the standard clause table and the default image source.
    pub fn new(config: LayoutConfig) -> Result<Self, GenerationError> {
        config.validate().context("invalid layout config")?;
        let fonts = FontContext::initialize_fonts(&config)?;
        let timeout = Duration::from_secs(config.image_fetch_timeout_secs);
        Ok(Self {
            config,
            fonts,
            clauses: ClauseSet::french_residential(),
            images: Box::new(DefaultImageSource::new(timeout)),
        })
    }

    pub fn with_clauses(mut self, clauses: ClauseSet) -> Self {
        self.clauses = clauses;
        self
    }

    pub fn with_image_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.images = Box::new(source);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    /// Validate `data`, then lay out and serialize the contract.
    pub fn generate(
        &self,
        data: &ContractData,
        overrides: &ClauseOverrides,
        options: &GenerationOptions,
    ) -> Result<GeneratedContract, GenerationError> {
        let errors = validate_contract(data);
        if !errors.is_empty() {
            return Err(GenerationError::Validation(errors));
        }

        let logo = non_blank(options.logo_url.as_deref());
        let landlord_signature = non_blank(data.signatures.landlord_signature_url.as_deref());
        let tenant_signature = non_blank(data.signatures.tenant_signature_url.as_deref());
        let fetched = prefetch_images(
            self.images.as_ref(),
            [logo, landlord_signature, tenant_signature].into_iter().flatten(),
        );

        let mut renderer = ContractRenderer::new(&self.config, &self.fonts);
        // Registration order fixes the XObject names.
        for reference in [logo, landlord_signature, tenant_signature].into_iter().flatten() {
            if let Some(image) = fetched.get(reference) {
                renderer.register_image(reference, image.clone());
            }
        }

        renderer.draw_header(logo);
        renderer.draw_parties(data);
        renderer.draw_intro();

        let resolver = PlaceholderResolver::new(data);
        for clause in self.clauses.merged(overrides) {
            let body = resolver.render(&clause.body);
            renderer.draw_article(&clause.title, &body, self.config.article_gap);
        }
        // Free text typed by the parties is drawn as written.
        if let Some(text) = particular_conditions(overrides, &data.additional_clauses) {
            renderer.draw_article(PARTICULAR_CONDITIONS_TITLE, &text, PARTICULAR_GAP);
        }

        renderer.draw_signatures(data, landlord_signature, tenant_signature);

        let contract = renderer
            .finish(options.watermark_text())
            .context("failed to assemble contract PDF")?;
        info!(
            "Generated lease contract: {} page(s), {} bytes",
            contract.page_count,
            contract.bytes.len()
        );
        Ok(contract)
    }
}

/// Generate with the default layout, clause table and image source.
pub fn generate_lease_pdf(
    data: &ContractData,
    overrides: &ClauseOverrides,
    options: &GenerationOptions,
) -> Result<GeneratedContract, GenerationError> {
    LeaseContractEngine::new(LayoutConfig::default())?.generate(data, overrides, options)
}

struct NamedImage {
    name: String,
    image: EmbeddedImage,
}

/// Drawing operations and text of one page.
struct PageCanvas {
    operations: Vec<Operation>,
    text: PageText,
}

impl PageCanvas {
    fn new(number: u32) -> Self {
        Self {
            operations: Vec::new(),
            text: PageText::new(number),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        face: &FontFace,
        weight: FontWeight,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
    ) {
        let text = sanitize_text(text);
        if text.trim().is_empty() {
            return;
        }

        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(font_operation(weight, size));
        self.operations.push(fill_color(color));
        self.operations.push(Operation::new(
            "Td",
            vec![Object::Real(x), Object::Real(y)],
        ));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(face.encode(&text), StringFormat::Literal)],
        ));
        self.operations.push(Operation::new("ET", vec![]));

        self.text.lines.push(PlacedText {
            text,
            x,
            y,
            size,
            bold: weight == FontWeight::Bold,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        self.operations.extend([
            Operation::new("q", vec![]),
            stroke_color(color),
            Operation::new("w", vec![Object::Real(thickness)]),
            Operation::new("m", vec![Object::Real(from.0), Object::Real(from.1)]),
            Operation::new("l", vec![Object::Real(to.0), Object::Real(to.1)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Filled rectangle with a 1pt border.
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb, border: Rgb) {
        self.operations.extend([
            Operation::new("q", vec![]),
            fill_color(fill),
            stroke_color(border),
            Operation::new("w", vec![Object::Real(1.0)]),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("B", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(height),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Translucent text rotated 45 degrees clockwise around (x, y).
    fn watermark(&mut self, face: &FontFace, text: &str, x: f32, y: f32, size: f32) {
        let text = sanitize_text(text);
        let (sin, cos) = (-45.0_f32).to_radians().sin_cos();

        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(WATERMARK_STATE.as_bytes().to_vec())]),
            Operation::new("BT", vec![]),
            font_operation(FontWeight::Bold, size),
            fill_color(colors::WATERMARK),
            Operation::new(
                "Tm",
                vec![
                    Object::Real(cos),
                    Object::Real(sin),
                    Object::Real(-sin),
                    Object::Real(cos),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(face.encode(&text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);

        self.text.lines.push(PlacedText {
            text,
            x,
            y,
            size,
            bold: true,
        });
    }
}

fn font_operation(weight: FontWeight, size: f32) -> Operation {
    Operation::new(
        "Tf",
        vec![
            Object::Name(weight.resource_name().as_bytes().to_vec()),
            Object::Real(size),
        ],
    )
}

fn fill_color(Rgb(r, g, b): Rgb) -> Operation {
    Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

fn stroke_color(Rgb(r, g, b): Rgb) -> Operation {
    Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

/// Per-document layout state: finished pages, the page being drawn and the
/// vertical cursor on it.
struct ContractRenderer<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontContext,
    images: BTreeMap<String, NamedImage>,
    finished: Vec<PageCanvas>,
    current: PageCanvas,
    cursor: f32,
}

impl<'a> ContractRenderer<'a> {
    fn new(config: &'a LayoutConfig, fonts: &'a FontContext) -> Self {
        Self {
            config,
            fonts,
            images: BTreeMap::new(),
            finished: Vec::new(),
            current: PageCanvas::new(1),
            cursor: config.top(),
        }
    }

    fn register_image(&mut self, reference: &str, image: EmbeddedImage) {
        if self.images.contains_key(reference) {
            return;
        }
        let name = format!("Im{}", self.images.len() + 1);
        self.images
            .insert(reference.to_string(), NamedImage { name, image });
    }

    fn new_page(&mut self) {
        let number = self.current.text.number + 1;
        debug!(
            "Page break at y={:.1}, starting page {}",
            self.cursor, number
        );
        let done = std::mem::replace(&mut self.current, PageCanvas::new(number));
        self.finished.push(done);
        self.cursor = self.config.top();
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, weight: FontWeight, color: Rgb) {
        let face = self.fonts.face(weight);
        self.current.text(face, weight, text, x, y, size, color);
    }

    fn draw_header(&mut self, logo: Option<&str>) {
        let config = self.config;
        let mut y = self.cursor;

        if let Some(logo) = logo.and_then(|r| self.images.get(r)) {
            let (width, height) = logo.image.fit_within(config.content_width(), LOGO_HEIGHT);
            let name = logo.name.clone();
            self.current
                .image(&name, config.margin, y - LOGO_HEIGHT, width, height);
            y -= LOGO_HEIGHT + LOGO_SPACING;
        }

        let title_width = self.fonts.text_width(TITLE, TITLE_SIZE, FontWeight::Bold);
        let box_width = title_width + TITLE_BOX_PADDING;
        let box_x = (config.page_width - box_width) / 2.0;
        let box_y = y - TITLE_BOX_HEIGHT;
        self.current.rect(
            box_x,
            box_y,
            box_width,
            TITLE_BOX_HEIGHT,
            colors::LIGHT_GRAY,
            colors::MEDIUM_GRAY,
        );
        self.text(
            TITLE,
            (config.page_width - title_width) / 2.0,
            box_y + 25.0,
            TITLE_SIZE,
            FontWeight::Bold,
            colors::PRIMARY,
        );

        let subtitle_width = self
            .fonts
            .text_width(SUBTITLE, SUBTITLE_SIZE, FontWeight::Bold);
        self.text(
            SUBTITLE,
            (config.page_width - subtitle_width) / 2.0,
            box_y + 10.0,
            SUBTITLE_SIZE,
            FontWeight::Bold,
            colors::SECONDARY,
        );

        self.cursor = box_y - AFTER_HEADER;
    }

    fn draw_parties(&mut self, data: &ContractData) {
        let config = self.config;
        let top = self.cursor;
        let box_height = config.parties_box_height;
        let column_width = (config.content_width() - COLUMN_GAP) / 2.0;

        self.current.rect(
            config.margin,
            top - box_height,
            config.content_width(),
            box_height,
            colors::GRID_FILL,
            colors::GRID_BORDER,
        );

        self.draw_party_column(
            config.margin,
            top,
            column_width,
            "LE BAILLEUR",
            &landlord_fields(data),
        );
        self.draw_party_column(
            config.margin + column_width + COLUMN_GAP,
            top,
            column_width,
            "LE PRENEUR",
            &tenant_fields(data),
        );

        let rule_x = config.margin + column_width + COLUMN_GAP / 2.0;
        self.current.line(
            (rule_x, top - 10.0),
            (rule_x, top - box_height + 10.0),
            1.0,
            colors::MEDIUM_GRAY,
        );

        self.cursor = top - box_height - AFTER_GRID;
    }

    fn draw_party_column(&mut self, x: f32, top: f32, width: f32, heading: &str, fields: &[String]) {
        let text_x = x + 10.0;
        let floor = top - self.config.parties_box_height + 5.0;
        self.text(
            heading,
            text_x,
            top - 20.0,
            PARTY_HEADING_SIZE,
            FontWeight::Bold,
            colors::PRIMARY,
        );

        let mut y = top - 35.0;
        for field in fields {
            for line in wrap_text(field, &self.fonts.regular, PARTY_TEXT_SIZE, width - 20.0) {
                // Overflowing lines are dropped, not spilled out of the grid.
                if y < floor {
                    return;
                }
                self.text(
                    &line,
                    text_x,
                    y,
                    PARTY_TEXT_SIZE,
                    FontWeight::Regular,
                    colors::BODY,
                );
                y -= PARTY_LEADING;
            }
        }
    }

    fn draw_intro(&mut self) {
        let (margin, cursor) = (self.config.margin, self.cursor);
        self.text(INTRO, margin, cursor, 10.0, FontWeight::Bold, colors::TEXT);
        self.cursor -= self.config.line_height * 2.0;
    }

    /// Underlined bold title followed by wrapped body text.
    fn draw_article(&mut self, title: &str, body: &str, gap_after: f32) {
        let config = self.config;
        if self.cursor < config.article_floor {
            self.new_page();
        }

        let y = self.cursor;
        self.text(
            title,
            config.margin,
            y,
            config.article_title_size,
            FontWeight::Bold,
            colors::TEXT,
        );
        let title_width =
            self.fonts
                .text_width(&sanitize_text(title), config.article_title_size, FontWeight::Bold);
        self.current.line(
            (config.margin, y - 2.0),
            (config.margin + title_width, y - 2.0),
            1.0,
            colors::TEXT,
        );
        self.cursor -= config.article_title_gap;

        let lines = wrap_text(
            body,
            &self.fonts.regular,
            config.body_font_size,
            config.content_width(),
        );
        for line in lines {
            if self.cursor < config.line_floor() {
                self.new_page();
            }
            let y = self.cursor;
            self.text(
                &line,
                config.margin,
                y,
                config.body_font_size,
                FontWeight::Regular,
                colors::BODY,
            );
            self.cursor -= config.line_height;
        }
        self.cursor -= gap_after;
    }

    fn draw_signatures(
        &mut self,
        data: &ContractData,
        landlord_signature: Option<&str>,
        tenant_signature: Option<&str>,
    ) {
        let config = self.config;
        if self.cursor - config.margin < config.signature_reserve {
            self.new_page();
        }

        self.cursor -= 30.0;
        let y = self.cursor;
        self.text(
            "SIGNATURES",
            config.margin,
            y,
            SIGNATURE_TITLE_SIZE,
            FontWeight::Bold,
            colors::PRIMARY,
        );
        self.current.line(
            (config.margin, y - 5.0),
            (config.page_width - config.margin, y - 5.0),
            1.0,
            colors::PRIMARY,
        );

        self.cursor -= 20.0;
        let date = format_date(data.signatures.signature_date);
        let place = format!("Fait à {}, le {}", data.signatures.signature_city.trim(), date);
        let y = self.cursor;
        self.text(&place, config.margin, y, CAPTION_SIZE, FontWeight::Regular, colors::TEXT);

        self.cursor -= 20.0;
        let label_y = self.cursor;
        self.draw_signature_block(
            config.margin,
            label_y,
            "LE BAILLEUR (Propriétaire)",
            landlord_signature,
        );
        self.draw_signature_block(
            config.page_width / 2.0 + 20.0,
            label_y,
            "LE PRENEUR (Locataire)",
            tenant_signature,
        );

        self.cursor = label_y - SIGNATURE_IMAGE_OFFSET - SIGNATURE_MAX_HEIGHT;
    }

    fn draw_signature_block(&mut self, x: f32, label_y: f32, label: &str, signature: Option<&str>) {
        self.text(
            label,
            x,
            label_y,
            SIGNATURE_LABEL_SIZE,
            FontWeight::Bold,
            colors::PRIMARY,
        );
        self.text(
            "Lu et approuvé",
            x,
            label_y - 15.0,
            CAPTION_SIZE,
            FontWeight::Regular,
            colors::SECONDARY,
        );

        if let Some(signature) = signature.and_then(|r| self.images.get(r)) {
            let (width, height) = signature
                .image
                .fit_within(SIGNATURE_MAX_WIDTH, SIGNATURE_MAX_HEIGHT);
            let name = signature.name.clone();
            self.current.image(
                &name,
                x,
                label_y - SIGNATURE_IMAGE_OFFSET - height,
                width,
                height,
            );
        }
    }

    /// Stamp footers and the watermark on every page, then build the PDF.
    fn finish(mut self, watermark: Option<&str>) -> Result<GeneratedContract> {
        let last = std::mem::replace(&mut self.current, PageCanvas::new(0));
        self.finished.push(last);
        let mut pages = std::mem::take(&mut self.finished);

        let config = self.config;
        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            page.line(
                (config.margin, config.footer_rule_y),
                (config.page_width - config.margin, config.footer_rule_y),
                0.5,
                colors::MEDIUM_GRAY,
            );
            page.text(
                &self.fonts.regular,
                FontWeight::Regular,
                &format!("Page {} sur {}", index + 1, total),
                config.page_width - config.margin - FOOTER_TEXT_INSET,
                config.footer_text_y,
                FOOTER_SIZE,
                colors::SECONDARY,
            );
        }

        if let Some(text) = watermark {
            for page in pages.iter_mut() {
                page.watermark(
                    &self.fonts.bold,
                    text,
                    config.page_width / 2.0 - 100.0,
                    config.page_height / 2.0,
                    config.watermark_font_size,
                );
            }
        }
        debug!("Laid out {} page(s)", total);

        let bytes = self.assemble(&mut pages, watermark.is_some())?;
        let text_layer = TextLayer::new(pages.into_iter().map(|page| page.text).collect());
        Ok(GeneratedContract {
            bytes,
            page_count: total,
            text_layer,
        })
    }

    fn assemble(&self, pages: &mut [PageCanvas], with_watermark: bool) -> Result<Vec<u8>> {
        let config = self.config;
        let mut document = Document::new();
        let pages_id = document.new_object_id();

        let resources_id = {
            let resources = self.create_resources_dict(&mut document, with_watermark);
            document.add_object(resources)
        };

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages.iter_mut() {
            let content = Content {
                operations: std::mem::take(&mut page.operations),
            };
            let content_id = document.add_object(Stream::new(Dictionary::new(), content.encode()?));

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("Resources", Object::Reference(resources_id));
            page_dict.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(config.page_width),
                    Object::Real(config.page_height),
                ]),
            );
            page_dict.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(document.add_object(page_dict)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        document
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let mut info_dict = Dictionary::new();
        info_dict.set("Title", pdf_text_string("Contrat de bail à usage d'habitation"));
        info_dict.set("Producer", Object::string_literal("Lease Contract PDF Creator"));
        info_dict.set("Creator", Object::string_literal("lease-pdf-creator"));
        let info_id = document.add_object(info_dict);

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(catalog_dict);

        document.trailer.set("Root", Object::Reference(catalog_id));
        document.trailer.set("Info", Object::Reference(info_id));

        if config.compress {
            document.compress();
        }
        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .context("failed to serialize PDF")?;
        Ok(bytes)
    }

    /// Fonts, image XObjects and the watermark graphics state, shared by
    /// every page.
    fn create_resources_dict(&self, document: &mut Document, with_watermark: bool) -> Dictionary {
        let mut font_dict = Dictionary::new();
        for weight in [FontWeight::Regular, FontWeight::Bold] {
            let font_id = add_font_to_document(document, self.fonts.face(weight));
            font_dict.set(weight.resource_name(), Object::Reference(font_id));
        }

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_dict));

        if !self.images.is_empty() {
            let mut xobjects = Dictionary::new();
            let mut ordered: Vec<&NamedImage> = self.images.values().collect();
            ordered.sort_by(|a, b| a.name.cmp(&b.name));
            for named in ordered {
                let image_id = named.image.add_to_document(document);
                xobjects.set(named.name.as_str(), Object::Reference(image_id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        if with_watermark {
            let mut state = Dictionary::new();
            state.set("Type", Object::Name(b"ExtGState".to_vec()));
            state.set("ca", Object::Real(self.config.watermark_opacity));
            state.set("CA", Object::Real(self.config.watermark_opacity));
            let mut states = Dictionary::new();
            states.set(WATERMARK_STATE, Object::Dictionary(state));
            resources.set("ExtGState", Object::Dictionary(states));
        }

        resources
    }
}

fn landlord_fields(data: &ContractData) -> Vec<String> {
    let landlord = &data.landlord;
    let mut fields = Vec::new();
    match non_blank(landlord.company_name.as_deref()) {
        Some(company) => {
            fields.push(format!("Société : {}", company));
            if let Some(ninea) = non_blank(landlord.ninea.as_deref()) {
                fields.push(format!("NINEA : {}", ninea));
            }
        }
        None => fields.push(format!("M./Mme : {}", landlord.full_name())),
    }
    fields.push(format!("Adresse : {}", landlord.address));
    fields.push(format!("Tel : {}", landlord.phone));
    if let Some(email) = non_blank(landlord.email.as_deref()) {
        fields.push(format!("Email : {}", email));
    }
    fields
}

fn tenant_fields(data: &ContractData) -> Vec<String> {
    let tenant = &data.tenant;
    let mut fields = vec![format!("M./Mme : {}", tenant.full_name())];
    if let Some(id) = non_blank(tenant.national_id.as_deref()) {
        fields.push(format!("CNI / Passeport : {}", id));
    }
    fields.push(format!("Tel : {}", tenant.phone));
    if let Some(email) = non_blank(tenant.email.as_deref()) {
        fields.push(format!("Email : {}", email));
    }
    fields
}

/// Standard faces become Type1 references; TrueType faces are embedded
/// as FontFile2 with their WinAnsi widths.
fn add_font_to_document(document: &mut Document, face: &FontFace) -> ObjectId {
    let base_font = face.base_font_name();
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("BaseFont", Object::Name(base_font.clone().into_bytes()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    match face {
        FontFace::Standard { .. } => {
            font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        }
        FontFace::TrueType { font, data, .. } => {
            let (ascent, descent) = font
                .horizontal_line_metrics(1000.0)
                .map(|m| (m.ascent.round() as i64, m.descent.round() as i64))
                .unwrap_or((800, -200));

            let mut stream_dict = Dictionary::new();
            stream_dict.set("Length1", Object::Integer(data.len() as i64));
            let font_file_id = document.add_object(Stream::new(stream_dict, data.clone()));

            let mut descriptor = Dictionary::new();
            descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
            descriptor.set("FontName", Object::Name(base_font.into_bytes()));
            // Nonsymbolic
            descriptor.set("Flags", Object::Integer(32));
            descriptor.set(
                "FontBBox",
                Object::Array(vec![
                    Object::Integer(-200),
                    Object::Integer(descent),
                    Object::Integer(1200),
                    Object::Integer(ascent),
                ]),
            );
            descriptor.set("ItalicAngle", Object::Integer(0));
            descriptor.set("Ascent", Object::Integer(ascent));
            descriptor.set("Descent", Object::Integer(descent));
            descriptor.set("CapHeight", Object::Integer(ascent));
            descriptor.set("StemV", Object::Integer(80));
            descriptor.set("FontFile2", Object::Reference(font_file_id));
            let descriptor_id = document.add_object(descriptor);

            let widths = (FIRST_CHAR..=LAST_CHAR)
                .map(|code| Object::Integer(face.width_units(code) as i64))
                .collect();
            font_dict.set("Subtype", Object::Name(b"TrueType".to_vec()));
            font_dict.set("FirstChar", Object::Integer(FIRST_CHAR as i64));
            font_dict.set("LastChar", Object::Integer(LAST_CHAR as i64));
            font_dict.set("Widths", Object::Array(widths));
            font_dict.set("FontDescriptor", Object::Reference(descriptor_id));
        }
    }

    document.add_object(font_dict)
}

/// UTF-16BE text string with byte order mark, for document metadata.
fn pdf_text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clauses::ClauseTemplate;
    use crate::images::InMemoryImageSource;
    use crate::model::fixtures::dakar_lease;
    use pretty_assertions::assert_eq;

    fn engine() -> LeaseContractEngine {
        LeaseContractEngine::new(LayoutConfig::default())
            .unwrap()
            .with_image_source(InMemoryImageSource::new())
    }

    fn grayscale_png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&vec![0u8; (width * height) as usize])
                .unwrap();
        }
        out
    }

    #[test]
    fn party_fields_follow_landlord_kind() {
        let mut data = dakar_lease();
        assert_eq!(
            landlord_fields(&data),
            vec![
                "Société : Diallo Immobilier SARL",
                "NINEA : 987654321",
                "Adresse : 123 Avenue Cheikh Anta Diop, Dakar, Sénégal",
                "Tel : +221 77 123 45 67",
                "Email : amadou.diallo@example.com",
            ]
        );

        data.landlord.company_name = None;
        data.landlord.email = None;
        assert_eq!(landlord_fields(&data)[0], "M./Mme : Amadou Diallo");
        assert_eq!(landlord_fields(&data).len(), 3);

        assert_eq!(
            tenant_fields(&data),
            vec![
                "M./Mme : Fatou Sene",
                "CNI / Passeport : CNI 1234567890123",
                "Tel : +221 76 987 65 43",
                "Email : fatou.sene@example.com",
            ]
        );
    }

    #[test]
    fn header_and_grid_land_on_first_page() {
        let contract = engine()
            .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();
        let first = contract.text_layer.page(1).unwrap();

        let title = first.lines.iter().find(|l| l.text == TITLE).unwrap();
        // Box bottom at 792 - 50, title baseline 25 above it.
        assert_eq!(title.y, 767.0);
        let heading = first.lines.iter().find(|l| l.text == "LE BAILLEUR").unwrap();
        assert_eq!(heading.y, 712.0 - 20.0);
        let intro = first.lines.iter().find(|l| l.text == INTRO).unwrap();
        assert_eq!(intro.y, 712.0 - 160.0 - 30.0);
    }

    #[test]
    fn logo_pushes_header_down() {
        let engine = LeaseContractEngine::new(LayoutConfig::default())
            .unwrap()
            .with_image_source(InMemoryImageSource::new().with_image("logo.png", grayscale_png(80, 20)));
        let options = GenerationOptions {
            watermark: None,
            logo_url: Some("logo.png".into()),
        };
        let contract = engine
            .generate(&dakar_lease(), &ClauseOverrides::default(), &options)
            .unwrap();
        let first = contract.text_layer.page(1).unwrap();
        let title = first.lines.iter().find(|l| l.text == TITLE).unwrap();
        assert_eq!(title.y, 767.0 - 60.0);
    }

    #[test]
    fn grid_drops_lines_that_overflow_the_box() {
        let mut data = dakar_lease();
        data.landlord.address = "Quartier ".repeat(80);
        let contract = engine()
            .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();
        let first = contract.text_layer.page(1).unwrap();
        let grid_bottom = 712.0 - 160.0;
        let lowest = first
            .lines
            .iter()
            .filter(|l| l.size == PARTY_TEXT_SIZE && l.x == 60.0)
            .map(|l| l.y)
            .fold(f32::MAX, f32::min);
        assert!(lowest >= grid_bottom + 5.0, "lowest grid line at {}", lowest);
    }

    #[test]
    fn body_lines_respect_the_bottom_floor() {
        let config = LayoutConfig::default();
        let contract = engine()
            .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();
        for page in &contract.text_layer.pages {
            for line in page.lines.iter().filter(|l| l.size == config.body_font_size && !l.bold) {
                assert!(line.y >= config.line_floor(), "{:?} below floor", line);
            }
        }
    }

    /// One article whose body is `lines` short rows.
    fn article(key: &str, title: &str, lines: usize) -> ClauseTemplate {
        let body = (1..=lines)
            .map(|i| format!("Ligne {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        ClauseTemplate::new(key, title, body)
    }

    fn generate_with(clauses: Vec<ClauseTemplate>) -> GeneratedContract {
        engine()
            .with_clauses(ClauseSet::new(clauses))
            .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap()
    }

    #[test]
    fn article_below_its_floor_starts_a_new_page() {
        // Intro leaves the cursor at 494; 28 rows end the first article at 72.
        let contract = generate_with(vec![
            article("a", "ARTICLE A", 28),
            article("b", "ARTICLE B", 1),
        ]);
        let layer = &contract.text_layer;
        assert_eq!(layer.pages_containing("Ligne 28"), vec![1]);
        assert_eq!(layer.pages_containing("ARTICLE B"), vec![2]);

        let config = LayoutConfig::default();
        let title = layer
            .page(2)
            .unwrap()
            .lines
            .iter()
            .find(|l| l.text == "ARTICLE B")
            .unwrap();
        assert_eq!(title.y, config.top());
    }

    #[test]
    fn article_titles_never_sit_below_the_floor() {
        let config = LayoutConfig::default();
        let contract = engine()
            .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();
        let titles: Vec<_> = contract
            .text_layer
            .pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .filter(|l| l.bold && l.size == config.article_title_size)
            .collect();
        assert_eq!(titles.len(), ClauseSet::french_residential().len());
        for title in titles {
            assert!(title.y >= config.article_floor, "{:?} below article floor", title);
        }
    }

    #[test]
    fn signatures_move_to_a_fresh_page_without_their_reserve() {
        // 21 rows leave 170, 120 above the margin.
        let contract = generate_with(vec![article("a", "ARTICLE A", 21)]);
        assert_eq!(contract.page_count, 2);
        let layer = &contract.text_layer;
        assert_eq!(layer.pages_containing("Ligne 21"), vec![1]);
        assert_eq!(layer.pages_containing("SIGNATURES"), vec![2]);
        let title = layer
            .page(2)
            .unwrap()
            .lines
            .iter()
            .find(|l| l.text == "SIGNATURES")
            .unwrap();
        assert_eq!(title.y, LayoutConfig::default().top() - 30.0);
    }

    #[test]
    fn signatures_stay_when_the_reserve_fits() {
        // 15 rows leave 254, 204 above the margin.
        let contract = generate_with(vec![article("a", "ARTICLE A", 15)]);
        assert_eq!(contract.page_count, 1);
        let title = contract
            .text_layer
            .page(1)
            .unwrap()
            .lines
            .iter()
            .find(|l| l.text == "SIGNATURES")
            .unwrap();
        assert_eq!(title.y, 224.0);
    }

    #[test]
    fn signature_images_sit_under_their_labels() {
        let mut data = dakar_lease();
        data.signatures.landlord_signature_url = Some("landlord.png".into());
        data.signatures.tenant_signature_url = Some("missing.png".into());
        let engine = LeaseContractEngine::new(LayoutConfig::default())
            .unwrap()
            .with_image_source(
                InMemoryImageSource::new().with_image("landlord.png", grayscale_png(240, 60)),
            );
        let contract = engine
            .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();

        let pdf = Document::load_mem(&contract.bytes).unwrap();
        let pages = pdf.get_pages();
        let last_page = *pages.values().last().unwrap();
        let content = Content::decode(&pdf.get_page_content(last_page).unwrap()).unwrap();
        let placements: Vec<_> = content
            .operations
            .iter()
            .filter(|op| op.operator == "cm")
            .collect();
        assert_eq!(placements.len(), 1);
        // 240x60 fits 120x30.
        assert_eq!(placements[0].operands[0].as_float().unwrap(), 120.0);
        assert_eq!(placements[0].operands[3].as_float().unwrap(), 30.0);
    }

    #[test]
    fn watermark_uses_translucent_graphics_state() {
        let options = GenerationOptions {
            watermark: Some("BROUILLON".into()),
            logo_url: None,
        };
        let contract = engine()
            .generate(&dakar_lease(), &ClauseOverrides::default(), &options)
            .unwrap();
        assert_eq!(
            contract.text_layer.pages_containing("BROUILLON").len(),
            contract.page_count
        );

        let pdf = Document::load_mem(&contract.bytes).unwrap();
        let first = *pdf.get_pages().values().next().unwrap();
        let content = Content::decode(&pdf.get_page_content(first).unwrap()).unwrap();
        assert!(content.operations.iter().any(|op| op.operator == "gs"));
    }

    #[test]
    fn custom_clause_set_is_used() {
        let clauses = ClauseSet::new(vec![ClauseTemplate::new(
            "unique",
            "ARTICLE UNIQUE",
            "Loyer : {{montant_loyer}} FCFA",
        )]);
        let contract = engine()
            .with_clauses(clauses)
            .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
            .unwrap();
        assert_eq!(contract.page_count, 1);
        assert_eq!(contract.text_layer.pages_containing("Loyer : 350 000 FCFA"), vec![1]);
        assert!(contract.text_layer.pages_containing("ARTICLE 2").is_empty());
    }

    #[test]
    fn engine_refuses_zero_line_height() {
        let config = LayoutConfig {
            line_height: 0.0,
            ..LayoutConfig::default()
        };
        match LeaseContractEngine::new(config) {
            Err(GenerationError::Generation(message)) => {
                assert!(message.contains("invalid layout config"), "{}", message)
            }
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("zero line height accepted"),
        }
    }

    #[test]
    fn metadata_title_is_utf16() {
        match pdf_text_string("bail") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0, b'b', 0, b'a', 0, b'i', 0, b'l']);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
