//! # PDF Generation Module
//!
//! Renders a [`Quotation`] to PDF using Typst.
//!
//! ## Architecture
//!
//! - The quotation layout is an embedded Typst template with `{{KEY}}` slots
//! - Repeated rows (line items, services, terms) are built as markup and spliced in
//! - The sizing methodology appendix comes from the equation registry
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use solar_core::calculations::{design_system, SizingInputs};
//! use solar_core::catalog::ReferenceCatalog;
//! use solar_core::pdf::render_quotation_pdf;
//! use solar_core::quotation::{ClientInfo, CompanyProfile, Quotation};
//!
//! let catalog = ReferenceCatalog::builtin().unwrap();
//! let design = design_system(&SizingInputs::with_load(2500.0), catalog).unwrap();
//! let company = CompanyProfile::default();
//! let quote = Quotation::new(design, ClientInfo::new("Ada Obi", "", ""), catalog, &company);
//!
//! let pdf_bytes = render_quotation_pdf(&quote, &company).unwrap();
//! std::fs::write("quotation.pdf", pdf_bytes).unwrap();
//! ```

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::equations::registry::generate_appendix_typst;
use crate::errors::{CalcError, CalcResult};
use crate::quotation::{CompanyProfile, LineAmount, Quotation};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    /// Library (standard functions)
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Fonts bundled with typst-assets (Libertinus, New Computer Modern, DejaVu)
    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Quotation Template
// ============================================================================

/// Pages 1 and 2: executive summary and company profile
const QUOTATION_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[{{COMPANY}} | Quotation {{REFERENCE}}]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{PHONE}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{WEBSITE}}]],
    )
  ]
)

#set text(size: 10pt)
#set par(justify: true)

// Title Block
#align(center)[
  #block(width: 100%, fill: rgb("#fff4d6"), inset: 14pt, radius: 4pt)[
    #text(size: 20pt, weight: "bold")[{{COMPANY}}]
    #v(2pt)
    #text(size: 11pt)[{{TAGLINE}}]
  ]
]

#v(10pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Quotation*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Reference:], [{{REFERENCE}}],
      [Issued:], [{{ISSUED}}],
      [Valid until:], [{{VALID_UNTIL}}],
    )
  ],
  [
    *Prepared for*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Name:], [{{CLIENT_NAME}}],
      [Contact:], [{{CLIENT_CONTACT}}],
      [Address:], [{{CLIENT_ADDRESS}}],
    )
  ]
)

#v(10pt)

Dear {{SALUTATION}},

Thank you for considering {{COMPANY}} for your power needs. The system below is sized for a
{{LOAD_KW}} kW load with {{BACKUP_HOURS}} hours of backup on a {{VOLTAGE}} battery bus.

{{WARNINGS}}

== System Design

#table(
  columns: (auto, auto, 1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left, left, left, right),
  table.header([*Item*], [*Description*], [*Detail*], [*Rated*], [*Amount ({{CURRENCY}})*]),
{{LINE_ITEMS}}
  table.cell(colspan: 4, align: right)[*Total Investment*], [*{{TOTAL}}*],
)

{{PENDING_NOTE}}

== System Analysis

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  [Daily energy generation], [{{DAILY_KWH}} kWh],
  [Backup time at {{LOAD_PERCENT}}% load], [{{BACKUP_AT_LOAD}} h],
  [CO#sub[2] emissions avoided], [{{CO2}} kg],
)

== Warranty

{{WARRANTY}}

#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Company Profile]
  ]
]

#v(10pt)

== About Us

{{ABOUT}}

== Mission

{{MISSION}}

== Vision

{{VISION}}

== Core Values

{{CORE_VALUES}}

== Our Services

#table(
  columns: (auto, 1fr),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left),
{{SERVICES}}
)

#v(8pt)
#text(size: 9pt)[{{EMAIL}} | {{LOCATION}}]
"##;

/// Final page: payment details and terms
const CLOSING_TEMPLATE: &str = r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Payment Details and Terms]
  ]
]

#v(10pt)

== Bank Details

#table(
  columns: (auto, 1fr),
  inset: 6pt,
  stroke: 0.5pt,
  [Account Name], [{{ACCOUNT_NAME}}],
  [Account Number], [{{ACCOUNT_NUMBER}}],
  [Bank], [{{BANK_NAME}}],
  [Branch], [{{BRANCH}}],
)

== Terms and Conditions

{{TERMS}}

#v(24pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 40pt,
  [
    #v(24pt)
    #line(length: 80%, stroke: 0.5pt)
    For {{COMPANY}}
  ],
  [
    #v(24pt)
    #line(length: 80%, stroke: 0.5pt)
    Client acceptance
  ]
)
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Build the complete Typst source for a quotation.
///
/// Every user-provided string is escaped; numbers are rounded here and
/// nowhere earlier.
pub fn quotation_typst_source(quote: &Quotation, company: &CompanyProfile) -> String {
    let sizing = &quote.design.sizing;

    let mut source = QUOTATION_TEMPLATE
        .replace("{{COMPANY}}", &escape_typst(&company.name))
        .replace("{{TAGLINE}}", &escape_typst(&company.tagline))
        .replace("{{PHONE}}", &escape_typst(&company.phone))
        .replace("{{WEBSITE}}", &escape_typst(&company.website))
        .replace("{{EMAIL}}", &escape_typst(&company.email))
        .replace("{{LOCATION}}", &escape_typst(&company.location))
        .replace("{{REFERENCE}}", &escape_typst(&quote.meta.reference))
        .replace("{{ISSUED}}", &quote.meta.issued.format("%d %B %Y").to_string())
        .replace("{{VALID_UNTIL}}", &quote.meta.valid_until.format("%d %B %Y").to_string())
        .replace("{{CLIENT_NAME}}", &escape_typst(&quote.client.full_name))
        .replace("{{CLIENT_CONTACT}}", &escape_typst(&quote.client.contact))
        .replace("{{CLIENT_ADDRESS}}", &escape_typst(&quote.client.address))
        .replace("{{SALUTATION}}", &escape_typst(quote.client.salutation_name()))
        .replace("{{LOAD_KW}}", &format!("{:.2}", sizing.total_energy_kw))
        .replace("{{BACKUP_HOURS}}", &format!("{}", sizing.inputs.backup_hours))
        .replace("{{VOLTAGE}}", &sizing.system_voltage.to_string())
        .replace("{{WARNINGS}}", &warning_blocks(&quote.warnings()))
        .replace("{{CURRENCY}}", &escape_typst(&quote.currency))
        .replace("{{LINE_ITEMS}}", &line_item_rows(quote))
        .replace("{{TOTAL}}", &format_amount(quote.total_investment()))
        .replace(
            "{{PENDING_NOTE}}",
            if quote.has_pending_prices() {
                "#text(size: 9pt, style: \"italic\")[Items marked Site survey are priced after the site assessment and are not included in the total.]"
            } else {
                ""
            },
        )
        .replace("{{DAILY_KWH}}", &format!("{:.2}", quote.estimates.daily_energy_gen_kwh))
        .replace("{{LOAD_PERCENT}}", &quote.estimates.selected_load_percent.to_string())
        .replace("{{BACKUP_AT_LOAD}}", &format!("{:.1}", quote.estimates.backup_hours_at_load))
        .replace("{{CO2}}", &format!("{:.2}", quote.estimates.co2_saved_kg_per_year))
        .replace("{{WARRANTY}}", &bullet_list(&company.warranty))
        .replace("{{ABOUT}}", &paragraphs(&company.about))
        .replace("{{MISSION}}", &paragraphs(&company.mission))
        .replace("{{VISION}}", &escape_typst(&company.vision))
        .replace("{{CORE_VALUES}}", &bullet_list(&company.core_values))
        .replace("{{SERVICES}}", &service_rows(company));

    source.push_str(&generate_appendix_typst(
        Some(&quote.design),
        quote.estimates.emission_factor_kg_per_kwh,
    ));

    source.push_str(
        &CLOSING_TEMPLATE
            .replace("{{ACCOUNT_NAME}}", &escape_typst(&company.bank.account_name))
            .replace("{{ACCOUNT_NUMBER}}", &escape_typst(&company.bank.account_number))
            .replace("{{BANK_NAME}}", &escape_typst(&company.bank.bank_name))
            .replace("{{BRANCH}}", &escape_typst(&company.bank.branch))
            .replace("{{TERMS}}", &numbered_list(&company.terms))
            .replace("{{COMPANY}}", &escape_typst(&company.name)),
    );

    source
}

/// Render a quotation to PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::RenderError)` - If Typst compilation or PDF export fails
pub fn render_quotation_pdf(quote: &Quotation, company: &CompanyProfile) -> CalcResult<Vec<u8>> {
    let source = quotation_typst_source(quote, company);
    let pdf_bytes = compile_pdf(source)?;

    tracing::info!(
        reference = %quote.meta.reference,
        bytes = pdf_bytes.len(),
        "rendered quotation PDF"
    );
    Ok(pdf_bytes)
}

fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    for warning in &warned.warnings {
        tracing::debug!(message = %warning.message, "typst warning");
    }

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::render_error("compile", error_msgs.join("; "))
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::render_error("export", error_msgs.join("; "))
    })
}

/// Escape special Typst characters in user-provided text
pub fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '~' | '/' | '=' | '-'
            | '+' | '{' | '}' => format!("\\{}", c),
            _ => c.to_string(),
        })
        .collect()
}

/// 1234567.891 -> "1,234,567.89"
pub fn format_amount(value: f64) -> String {
    let text = format!("{:.2}", value.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

fn amount_cell(amount: &LineAmount) -> String {
    match amount {
        LineAmount::Priced(value) => format_amount(*value),
        LineAmount::Included => "Included".to_string(),
        LineAmount::SiteSurvey => "Site survey".to_string(),
    }
}

fn line_item_rows(quote: &Quotation) -> String {
    quote
        .line_items
        .iter()
        .map(|line| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&line.item),
                escape_typst(&line.description),
                escape_typst(&line.detail),
                escape_typst(&line.rated),
                amount_cell(&line.amount)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn service_rows(company: &CompanyProfile) -> String {
    company
        .services
        .iter()
        .map(|s| format!("  [*{}*], [{}],", escape_typst(&s.title), escape_typst(&s.description)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn warning_blocks(warnings: &[String]) -> String {
    warnings
        .iter()
        .map(|w| {
            format!(
                "#block(width: 100%, fill: rgb(\"#f8d7da\"), inset: 10pt, radius: 4pt)[*Warning:* {}]\n",
                escape_typst(w)
            )
        })
        .collect()
}

fn paragraphs(lines: &[String]) -> String {
    lines.iter().map(|l| escape_typst(l)).collect::<Vec<_>>().join("\n\n")
}

fn bullet_list(lines: &[String]) -> String {
    lines.iter().map(|l| format!("- {}\n", escape_typst(l))).collect()
}

fn numbered_list(lines: &[String]) -> String {
    lines.iter().map(|l| format!("+ {}\n", escape_typst(l))).collect()
}
