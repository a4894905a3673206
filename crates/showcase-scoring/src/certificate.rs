//! Completion certificates.
//!
//! Rendering happens in two steps: [`render_certificate`] builds a typed
//! [`CertificateDocument`] (which sections exist and what they hold), then
//! [`CertificateDocument::to_html`] turns it into a printable page. Sections
//! with nothing to show are left out of the document entirely.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{round2, CriterionSummary};
use crate::error::ScoringError;
use crate::fingerprint::fingerprint;
use crate::qr::{qr_svg, svg_data_uri};
use crate::types::{Criterion, Person, Product};

/// Printed when a maker profile has no name.
pub const UNKNOWN_MAKER: &str = "Unknown Maker";

/// Printed when a judge profile has no name.
pub const ANONYMOUS_JUDGE: &str = "Anonymous Judge";

/// Closing line of every certificate.
pub const ATTRIBUTION: &str = "Evaluated and verified by the Showcase judging panel";

/// Everything needed to render one certificate.
#[derive(Debug, Clone)]
pub struct CertificateInput {
    pub program_name: String,
    pub completed_on: NaiveDate,
    pub product: Product,
    pub makers: Vec<Person>,
    pub criteria: Vec<Criterion>,
    pub summary: Vec<CriterionSummary>,
    pub judges: Vec<Person>,
    /// Overall score on the 0..=10 scale.
    pub overall_score: f64,
    /// Opaque URL the QR code points at.
    pub verification_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
}

/// A maker or judge as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonEntry {
    pub name: String,
    pub avatar_url: Option<String>,
    pub links: Vec<ProfileLink>,
}

impl PersonEntry {
    fn from_person(person: &Person, fallback: &str) -> Self {
        Self {
            name: person.display_name(fallback).to_string(),
            avatar_url: person
                .avatar_url
                .as_deref()
                .and_then(web_url)
                .map(str::to_string),
            links: person
                .links()
                .into_iter()
                .filter(|(_, url)| web_url(url).is_some())
                .map(|(label, url)| ProfileLink {
                    label: label.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }
}

/// One line of the grading table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    pub criterion: String,
    pub average: f64,
    pub max_value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Title,
    Makers,
    Grades,
    Judges,
    Verification,
    Footer,
}

/// A block of the certificate, in print order.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header {
        program_name: String,
        completed_on: NaiveDate,
    },
    Title {
        product_name: String,
        tagline: Option<String>,
        image_url: Option<String>,
    },
    Makers(Vec<PersonEntry>),
    Grades {
        rows: Vec<GradeRow>,
        overall_score: f64,
    },
    Judges(Vec<PersonEntry>),
    Verification {
        url: String,
        qr_svg: String,
    },
    Footer {
        attribution: String,
    },
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Header { .. } => SectionKind::Header,
            Self::Title { .. } => SectionKind::Title,
            Self::Makers(_) => SectionKind::Makers,
            Self::Grades { .. } => SectionKind::Grades,
            Self::Judges(_) => SectionKind::Judges,
            Self::Verification { .. } => SectionKind::Verification,
            Self::Footer { .. } => SectionKind::Footer,
        }
    }
}

/// Content a verifier can recompute the fingerprint from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePayload {
    pub product_id: Uuid,
    pub product_name: String,
    pub program_name: String,
    pub completed_on: NaiveDate,
    pub makers: Vec<String>,
    pub grades: Vec<GradeRow>,
    pub judges: Vec<String>,
    pub overall_score: f64,
    pub verification_url: String,
}

/// A rendered, not yet serialized, certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDocument {
    pub sections: Vec<Section>,
    pub payload: CertificatePayload,
}

/// Builds the certificate document for one product.
///
/// Never fails on missing optional profile data; the only error is a
/// verification URL too long to fit in a QR code.
pub fn render_certificate(input: &CertificateInput) -> Result<CertificateDocument, ScoringError> {
    let makers: Vec<PersonEntry> = input
        .makers
        .iter()
        .map(|m| PersonEntry::from_person(m, UNKNOWN_MAKER))
        .collect();
    let judges: Vec<PersonEntry> = input
        .judges
        .iter()
        .map(|j| PersonEntry::from_person(j, ANONYMOUS_JUDGE))
        .collect();
    let grades = grade_rows(&input.criteria, &input.summary);
    let overall_score = round2(input.overall_score);

    let mut sections = vec![
        Section::Header {
            program_name: input.program_name.clone(),
            completed_on: input.completed_on,
        },
        Section::Title {
            product_name: input.product.name.clone(),
            tagline: input.product.tagline.clone(),
            image_url: input
                .product
                .image_url
                .as_deref()
                .and_then(web_url)
                .map(str::to_string),
        },
    ];
    if !makers.is_empty() {
        sections.push(Section::Makers(makers.clone()));
    }
    if !grades.is_empty() {
        sections.push(Section::Grades {
            rows: grades.clone(),
            overall_score,
        });
    }
    if !judges.is_empty() {
        sections.push(Section::Judges(judges.clone()));
    }
    sections.push(Section::Verification {
        url: input.verification_url.clone(),
        qr_svg: qr_svg(&input.verification_url)?,
    });
    sections.push(Section::Footer {
        attribution: ATTRIBUTION.to_string(),
    });

    let payload = CertificatePayload {
        product_id: input.product.id,
        product_name: input.product.name.clone(),
        program_name: input.program_name.clone(),
        completed_on: input.completed_on,
        makers: makers.into_iter().map(|m| m.name).collect(),
        grades,
        judges: judges.into_iter().map(|j| j.name).collect(),
        overall_score,
        verification_url: input.verification_url.clone(),
    };

    Ok(CertificateDocument { sections, payload })
}

/// Rating criteria with a computed average, in criteria order.
fn grade_rows(criteria: &[Criterion], summary: &[CriterionSummary]) -> Vec<GradeRow> {
    let averages: HashMap<Uuid, f64> = summary
        .iter()
        .filter_map(|s| s.avg_rating.map(|avg| (s.criterion_id, avg)))
        .collect();

    criteria
        .iter()
        .filter(|c| c.is_rating())
        .filter_map(|c| {
            averages.get(&c.id).map(|avg| GradeRow {
                criterion: c.name.clone(),
                average: *avg,
                max_value: c.max_value,
            })
        })
        .collect()
}

impl CertificateDocument {
    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind() == kind)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    /// `sha256(jcs(payload))`, printed on the certificate and served by the
    /// verification endpoint.
    pub fn fingerprint(&self) -> anyhow::Result<String> {
        fingerprint(&self.payload)
    }

    /// Printable standalone HTML page.
    pub fn to_html(&self) -> anyhow::Result<String> {
        let fingerprint = self.fingerprint()?;
        let mut html = String::with_capacity(8 * 1024);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        writeln!(
            html,
            "<title>Certificate of Completion - {}</title>",
            escape_html(&self.payload.product_name)
        )?;
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n<main class=\"certificate\">\n");

        for section in &self.sections {
            write_section(&mut html, section, &fingerprint)?;
        }

        html.push_str("</main>\n</body>\n</html>\n");
        Ok(html)
    }
}

const STYLE: &str = "<style>\n\
body{font-family:Georgia,serif;background:#f3f4f6;margin:0;padding:2rem}\n\
.certificate{max-width:800px;margin:auto;background:#fff;padding:3rem;border:8px double #111827}\n\
header,footer{text-align:center}\n\
h1{font-size:2.25rem;margin:.5rem 0}\n\
.hero{max-width:100%;border-radius:8px}\n\
.people{display:flex;flex-wrap:wrap;gap:1rem;list-style:none;padding:0}\n\
.avatar{width:48px;height:48px;border-radius:50%}\n\
table{width:100%;border-collapse:collapse}\n\
td,th{border-bottom:1px solid #e5e7eb;padding:.4rem;text-align:left}\n\
.verification{text-align:center;margin-top:2rem}\n\
.fingerprint{font-family:monospace;font-size:.7rem;word-break:break-all}\n\
@media print{body{background:#fff;padding:0}}\n\
</style>\n";

fn write_section(html: &mut String, section: &Section, fingerprint: &str) -> std::fmt::Result {
    match section {
        Section::Header {
            program_name,
            completed_on,
        } => {
            writeln!(
                html,
                "<header>\n<p class=\"program\">{}</p>\n<p>Certificate of Completion</p>\n<p class=\"date\">Completed on {}</p>\n</header>",
                escape_html(program_name),
                completed_on.format("%B %-d, %Y")
            )
        }
        Section::Title {
            product_name,
            tagline,
            image_url,
        } => {
            html.push_str("<section class=\"title\">\n");
            writeln!(html, "<h1>{}</h1>", escape_html(product_name))?;
            if let Some(tagline) = tagline.as_deref().filter(|t| !t.trim().is_empty()) {
                writeln!(html, "<p class=\"tagline\">{}</p>", escape_html(tagline))?;
            }
            if let Some(url) = image_url.as_deref().and_then(web_url) {
                writeln!(
                    html,
                    "<img class=\"hero\" src=\"{}\" alt=\"{}\">",
                    escape_html(url),
                    escape_html(product_name)
                )?;
            }
            html.push_str("</section>\n");
            Ok(())
        }
        Section::Makers(makers) => write_people(html, "makers", "Made by", makers),
        Section::Grades {
            rows,
            overall_score,
        } => {
            html.push_str("<section class=\"grades\">\n<h2>Evaluation</h2>\n<table>\n");
            html.push_str("<tr><th>Criterion</th><th>Average</th></tr>\n");
            for row in rows {
                writeln!(
                    html,
                    "<tr><td>{}</td><td>{:.2} / {}</td></tr>",
                    escape_html(&row.criterion),
                    row.average,
                    row.max_value
                )?;
            }
            writeln!(
                html,
                "<tr class=\"overall\"><th>Overall score</th><th>{:.2} / 10</th></tr>",
                overall_score
            )?;
            html.push_str("</table>\n</section>\n");
            Ok(())
        }
        Section::Judges(judges) => write_people(html, "judges", "Evaluated by", judges),
        Section::Verification { url, qr_svg } => {
            writeln!(
                html,
                "<section class=\"verification\">\n<img class=\"qr\" src=\"{}\" alt=\"Verification QR code\">\n<p><a href=\"{url}\">{url}</a></p>\n<p class=\"fingerprint\">{}</p>\n</section>",
                svg_data_uri(qr_svg),
                fingerprint,
                url = escape_html(url)
            )
        }
        Section::Footer { attribution } => {
            writeln!(html, "<footer>{}</footer>", escape_html(attribution))
        }
    }
}

fn write_people(
    html: &mut String,
    class: &str,
    heading: &str,
    people: &[PersonEntry],
) -> std::fmt::Result {
    writeln!(html, "<section class=\"{class}\">\n<h2>{heading}</h2>\n<ul class=\"people\">")?;
    for person in people {
        html.push_str("<li>");
        if let Some(avatar) = person.avatar_url.as_deref().and_then(web_url) {
            write!(
                html,
                "<img class=\"avatar\" src=\"{}\" alt=\"\"> ",
                escape_html(avatar)
            )?;
        }
        write!(html, "<span class=\"name\">{}</span>", escape_html(&person.name))?;
        for link in person.links.iter().filter(|l| web_url(&l.url).is_some()) {
            write!(
                html,
                " <a href=\"{}\" rel=\"noopener\">{}</a>",
                escape_html(&link.url),
                escape_html(&link.label)
            )?;
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n</section>\n");
    Ok(())
}

/// Returns the trimmed URL when its scheme is `http` or `https`.
///
/// Profile and image URLs are user-supplied; anything else (`javascript:`,
/// `data:`, relative paths) is never written into `href` or `src`.
pub fn web_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let (scheme, rest) = url.split_once(':')?;
    let allowed = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
    (allowed && rest.starts_with("//") && rest.len() > 2).then_some(url)
}

/// Escapes text for HTML element and attribute content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
