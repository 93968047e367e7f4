//! Profile PDF rendering.
//!
//! Layout is computed first as plain lines per page (`layout_pages`), then
//! written out with lopdf using the built-in Helvetica faces. Each member
//! starts on a fresh page; long sections spill onto following pages.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::errors::AppError;
use crate::models::member::MemberProfile;
use crate::models::year::year_label;

// US letter, 0.75" margins.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 54;

const INDENT: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

impl LineStyle {
    fn font(self) -> &'static str {
        match self {
            LineStyle::Title | LineStyle::Heading => "F2",
            LineStyle::Body => "F1",
        }
    }

    fn size(self) -> i64 {
        match self {
            LineStyle::Title => 16,
            LineStyle::Heading => 12,
            LineStyle::Body => 10,
        }
    }

    /// Characters per line in the text column. Helvetica averages about
    /// half its point size per glyph: 95 at 10pt, 80 at 12pt, 60 at 16pt.
    fn wrap_width(self) -> usize {
        match self {
            LineStyle::Title => 60,
            LineStyle::Heading => 80,
            LineStyle::Body => 95,
        }
    }

    fn leading(self) -> i64 {
        match self {
            LineStyle::Title => 24,
            LineStyle::Heading => 18,
            LineStyle::Body => 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub style: LineStyle,
    pub indent: i64,
}

impl PdfLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
            indent: 0,
        }
    }

    fn indented(mut self) -> Self {
        self.indent = INDENT;
        self
    }

    fn blank() -> Self {
        Self::new("", LineStyle::Body)
    }
}

fn push_wrapped(lines: &mut Vec<PdfLine>, text: &str, style: LineStyle) {
    for chunk in wrap(text, style.wrap_width()) {
        lines.push(PdfLine::new(chunk, style));
    }
}

/// Lines describing one member, in reading order.
pub fn profile_lines(profile: &MemberProfile) -> Vec<PdfLine> {
    let member = &profile.member;
    let mut lines = Vec::new();
    push_wrapped(&mut lines, &member.name, LineStyle::Title);
    push_wrapped(&mut lines, &format!("Email: {}", member.email), LineStyle::Body);
    if let Some(domain) = &member.domain {
        push_wrapped(&mut lines, &format!("Domain: {domain}"), LineStyle::Body);
    }
    push_wrapped(
        &mut lines,
        &format!("Year: {}", year_label(member.year_of_study)),
        LineStyle::Body,
    );
    if !member.resume_url.is_empty() {
        push_wrapped(&mut lines, &format!("Resume: {}", member.resume_url), LineStyle::Body);
    }

    if !profile.skills.is_empty() {
        lines.push(PdfLine::blank());
        lines.push(PdfLine::new("Skills", LineStyle::Heading));
        push_wrapped(&mut lines, &profile.skills.join(", "), LineStyle::Body);
    }

    if !profile.experiences.is_empty() {
        lines.push(PdfLine::blank());
        lines.push(PdfLine::new("Experience", LineStyle::Heading));
        for exp in &profile.experiences {
            let start = exp
                .start_date
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_default();
            let end = if exp.is_current {
                "Present".to_string()
            } else {
                exp.end_date
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_default()
            };
            let period = match (start.is_empty(), end.is_empty()) {
                (true, true) => String::new(),
                (false, true) => format!(" ({start})"),
                (true, false) => format!(" (until {end})"),
                (false, false) => format!(" ({start} - {end})"),
            };
            push_wrapped(
                &mut lines,
                &format!("{} at {}{}", exp.role, exp.company, period),
                LineStyle::Body,
            );
            if let Some(description) = exp.description.as_deref().filter(|d| !d.trim().is_empty()) {
                for chunk in wrap(description, LineStyle::Body.wrap_width() - 4) {
                    lines.push(PdfLine::new(chunk, LineStyle::Body).indented());
                }
            }
        }
    }

    if !profile.achievements.is_empty() {
        lines.push(PdfLine::blank());
        lines.push(PdfLine::new("Achievements", LineStyle::Heading));
        for achievement in &profile.achievements {
            for (i, chunk) in wrap(&achievement.title, LineStyle::Body.wrap_width() - 2).into_iter().enumerate() {
                let text = if i == 0 { format!("- {chunk}") } else { format!("  {chunk}") };
                lines.push(PdfLine::new(text, LineStyle::Body));
            }
        }
    }

    if !profile.links.is_empty() {
        lines.push(PdfLine::blank());
        lines.push(PdfLine::new("Links", LineStyle::Heading));
        for link in &profile.links {
            push_wrapped(&mut lines, &format!("{}: {}", link.name, link.url), LineStyle::Body);
        }
    }

    lines
}

/// Splits profiles into pages. Every profile starts a new page.
pub fn layout_pages(profiles: &[MemberProfile]) -> Vec<Vec<PdfLine>> {
    let usable = PAGE_HEIGHT - 2 * MARGIN;
    let mut pages: Vec<Vec<PdfLine>> = Vec::new();

    for profile in profiles {
        let mut page: Vec<PdfLine> = Vec::new();
        let mut used = 0;
        for line in profile_lines(profile) {
            let leading = line.style.leading();
            if used + leading > usable && !page.is_empty() {
                pages.push(std::mem::take(&mut page));
                used = 0;
            }
            used += leading;
            page.push(line);
        }
        pages.push(page);
    }

    if pages.is_empty() {
        pages.push(vec![PdfLine::new("No matching profiles", LineStyle::Heading)]);
    }
    pages
}

/// Renders profiles into a PDF document.
pub fn render_profiles_pdf(profiles: &[MemberProfile]) -> Result<Vec<u8>, AppError> {
    let pages = layout_pages(profiles);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content = Content {
            operations: page_operations(lines),
        };
        let encoded = content
            .encode()
            .map_err(|e| AppError::Pdf(format!("Failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AppError::Pdf(format!("Failed to write PDF: {e}")))?;
    Ok(out)
}

fn page_operations(lines: &[PdfLine]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(lines.len() * 5);
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        y -= line.style.leading();
        if line.text.is_empty() {
            continue;
        }
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(line.style.font().as_bytes().to_vec()),
                Object::Integer(line.style.size()),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(MARGIN + line.indent), Object::Integer(y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi_bytes(&line.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    ops
}

/// Latin-1 subset of WinAnsi; anything outside it prints as '?'.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            // 0x80..=0x9F are C1 controls in Unicode but other glyphs in WinAnsi.
            Ok(b) if (0x20..0x7F).contains(&b) || b >= 0xA0 => b,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap on whitespace. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::{AchievementRow, ExperienceRow, LinkRow, MemberRow};
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(name: &str, achievements: usize) -> MemberProfile {
        let id = Uuid::new_v4();
        MemberProfile {
            member: MemberRow {
                id,
                name: name.to_string(),
                email: format!("{}@uni.edu", name.to_lowercase()),
                picture_url: String::new(),
                domain: Some("Data Science".into()),
                year_of_study: Some(2),
                resume_url: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            skills: vec!["Python".into(), "PyTorch".into()],
            achievements: (0..achievements)
                .map(|i| AchievementRow {
                    id: Uuid::new_v4(),
                    member_id: id,
                    title: format!("Achievement number {i}"),
                    description: None,
                    date: None,
                    created_at: Utc::now(),
                })
                .collect(),
            experiences: vec![ExperienceRow {
                id: Uuid::new_v4(),
                member_id: id,
                company: "Acme".into(),
                role: "ML Intern".into(),
                description: Some("Built a recommender".into()),
                start_date: "2024-06-01".parse().ok(),
                end_date: None,
                is_current: true,
            }],
            links: vec![LinkRow {
                id: Uuid::new_v4(),
                member_id: id,
                name: "GitHub".into(),
                url: "https://github.com/jane".into(),
            }],
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("abcdefghijkl", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_profile_lines_contain_sections() {
        let lines = profile_lines(&profile("Jane", 1));
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts[0], "Jane");
        assert!(texts.contains(&"Year: 2nd"));
        assert!(texts.contains(&"Skills"));
        assert!(texts.contains(&"ML Intern at Acme (Jun 2024 - Present)"));
        assert!(texts.contains(&"- Achievement number 0"));
        assert!(texts.contains(&"GitHub: https://github.com/jane"));
    }

    #[test]
    fn test_every_line_fits_its_style() {
        let mut long = profile("Jane", 2);
        long.member.name = "Maximiliana Alexandrina Konstantinopoulou-Vanderbilt de la Cruz".into();
        long.member.email = format!("{}@students.university-of-somewhere.example.edu", "x".repeat(70));
        long.member.domain = Some("Artificial Intelligence and Machine Learning ".repeat(4));
        long.member.resume_url = format!("http://localhost:9000/pointblank/resumes/{}.pdf", "a".repeat(120));
        long.links[0].url = format!("https://github.com/{}", "b".repeat(150));

        let lines = profile_lines(&long);
        for line in &lines {
            assert!(
                line.text.chars().count() <= line.style.wrap_width(),
                "{:?} line too wide: {}",
                line.style,
                line.text
            );
        }
        let titles = lines.iter().filter(|l| l.style == LineStyle::Title).count();
        assert_eq!(titles, 2);
        assert!(lines.iter().any(|l| l.text.starts_with("Resume: ")));
    }

    #[test]
    fn test_each_member_starts_a_page() {
        let pages = layout_pages(&[profile("Jane", 1), profile("John", 1)]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1][0].text, "John");
    }

    #[test]
    fn test_long_profiles_paginate() {
        let pages = layout_pages(&[profile("Jane", 120)]);
        assert!(pages.len() >= 2);
        let usable = PAGE_HEIGHT - 2 * MARGIN;
        for page in &pages {
            let height: i64 = page.iter().map(|l| l.style.leading()).sum();
            assert!(height <= usable);
        }
    }

    #[test]
    fn test_empty_export_still_has_a_page() {
        assert_eq!(layout_pages(&[]).len(), 1);
    }

    #[test]
    fn test_rendered_pdf_loads_back() {
        let bytes = render_profiles_pdf(&[profile("Jane", 3), profile("José", 80)]).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }

    #[test]
    fn test_win_ansi_replaces_unsupported_chars() {
        assert_eq!(win_ansi_bytes("José ✓"), vec![b'J', b'o', b's', 0xE9, b' ', b'?']);
    }

    #[test]
    fn test_win_ansi_masks_c1_controls() {
        assert_eq!(win_ansi_bytes("a\u{80}b\u{9F}\u{7F}"), b"a?b??".to_vec());
    }
}
