use tracing::debug;

use crate::domain::{Article, LayoutStrategy, Rect, Section, SectionType, Template};
use crate::layout::distributor::Distribution;
use crate::layout::page::Page;
use crate::layout::text::{plain_text, truncate_preview, Font};
use crate::layout::typeface::Typesetter;

const PADDING: f32 = 2.0;
const GUTTER: f32 = 4.0;
const ARTICLE_GAP: f32 = 3.0;
const RULE_SPACE: f32 = 2.5;

const HEADING_FONT: Font = Font::bold(9.0);
const BODY_FONT: Font = Font::regular(9.0);
const DATE_FONT: Font = Font::regular(10.0);
const FOOTER_FONT: Font = Font::regular(8.0);
const MASTHEAD_SIZES: [f32; 6] = [28.0, 24.0, 20.0, 16.0, 13.0, 11.0];

const BREAKING_BAND_GRAY: f32 = 0.92;
const WEATHER_EAR_WIDTH: f32 = 45.0;

/// Static weather block shown in the masthead ear.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub location: String,
    pub temperature_c: i32,
    pub condition: String,
    pub humidity: u8,
}

impl Weather {
    pub fn sample() -> Self {
        Self {
            location: "Dhaka".to_string(),
            temperature_c: 31,
            condition: "Partly cloudy".to_string(),
            humidity: 78,
        }
    }
}

/// Static text shared by the masthead and footer.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub date_label: &'a str,
    pub site_name: &'a str,
    pub weather: Option<&'a Weather>,
    pub page_number: usize,
}

fn title_font(strategy: LayoutStrategy) -> Font {
    match strategy {
        LayoutStrategy::Single => Font::bold(12.0),
        LayoutStrategy::Double => Font::bold(11.0),
        LayoutStrategy::Triple | LayoutStrategy::Grid => Font::bold(10.0),
    }
}

/// Draws sections into their own rectangles. Nothing is ever drawn outside
/// the rectangle of the section being rendered.
#[derive(Debug, Clone, Default)]
pub struct SectionRenderer {
    typesetter: Typesetter,
}

impl SectionRenderer {
    /// Renderer measuring with the PDF base fonts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_typesetter(typesetter: Typesetter) -> Self {
        Self { typesetter }
    }

    pub fn typesetter(&self) -> &Typesetter {
        &self.typesetter
    }

    fn wrap(&self, text: &str, width: f32, font: Font) -> Vec<String> {
        self.typesetter.wrap(text, width, font)
    }

    fn width(&self, text: &str, font: Font) -> f32 {
        self.typesetter.text_width(text, font)
    }

    fn put(&self, page: &mut Page, x: f32, top: f32, text: String, font: Font) {
        let width = self.width(&text, font);
        page.text(x, top, width, text, font);
    }

    /// Renders every section of `template` onto one page and returns it with
    /// the number of articles actually drawn.
    pub fn render_page(
        &self,
        template: &Template,
        distribution: &Distribution<'_>,
        ctx: &PageContext<'_>,
    ) -> (Page, usize) {
        let mut page = Page::new(template.page);
        let mut drawn = 0;

        for section in &template.sections {
            match section.section_type {
                SectionType::Header => self.render_header(section, ctx, &mut page),
                SectionType::Footer => self.render_footer(section, ctx, &mut page),
                _ => {
                    let articles = distribution.get(section.section_type);
                    drawn += self.render_section(section, articles, &mut page)
                }
            }
        }

        let header = template.section(SectionType::Header);
        if let (Some(weather), Some(header)) = (ctx.weather, header) {
            self.render_weather(header, weather, &mut page);
        }

        (page, drawn)
    }

    /// Lays out assigned articles and returns how many made it onto the page.
    /// Empty input draws nothing.
    pub fn render_section(
        &self,
        section: &Section,
        articles: &[&Article],
        page: &mut Page,
    ) -> usize {
        if articles.is_empty() || section.section_type.is_static() {
            return 0;
        }

        let area = section.rect.inset(PADDING);
        if section.section_type == SectionType::Breaking {
            page.fill(section.rect, BREAKING_BAND_GRAY);
        }

        let mut cursor = area.y;
        if let Some(heading) = section.section_type.heading() {
            if cursor + HEADING_FONT.line_height() <= area.bottom() {
                self.put(page, area.x, cursor, heading.to_string(), HEADING_FONT);
                cursor += HEADING_FONT.line_height() + 1.0;
            }
        }
        let body = Rect::new(area.x, cursor, area.width, (area.bottom() - cursor).max(0.0));

        let drawn = match section.strategy {
            LayoutStrategy::Single => self.render_stack(section, articles, body, page),
            LayoutStrategy::Double => {
                let rows = section.max_articles.max(1).div_ceil(2);
                self.render_cells(section, articles, body, 2, rows, page)
            }
            LayoutStrategy::Triple => self.render_cells(section, articles, body, 3, 1, page),
            LayoutStrategy::Grid => self.render_cells(section, articles, body, 2, 2, page),
        };

        if drawn < articles.len() {
            debug!(
                section = %section.section_type,
                assigned = articles.len(),
                drawn,
                "Articles dropped for lack of space"
            );
        }
        drawn
    }

    fn render_stack(
        &self,
        section: &Section,
        articles: &[&Article],
        area: Rect,
        page: &mut Page,
    ) -> usize {
        let title_font = title_font(section.strategy);
        let budget = section.strategy.truncation_budget();
        let mut cursor = area.y;
        let mut drawn = 0;

        for article in articles {
            let title_lines = self.wrap(&article.title, area.width, title_font);
            let preview = truncate_preview(&plain_text(&article.content), budget);
            let body_lines = self.wrap(&preview, area.width, BODY_FONT);

            let height = title_lines.len() as f32 * title_font.line_height()
                + body_lines.len() as f32 * BODY_FONT.line_height();
            if cursor + height > area.bottom() {
                break;
            }

            for line in title_lines {
                self.put(page, area.x, cursor, line, title_font);
                cursor += title_font.line_height();
            }
            for line in body_lines {
                self.put(page, area.x, cursor, line, BODY_FONT);
                cursor += BODY_FONT.line_height();
            }
            cursor += ARTICLE_GAP;
            drawn += 1;
        }

        drawn
    }

    fn render_cells(
        &self,
        section: &Section,
        articles: &[&Article],
        area: Rect,
        columns: usize,
        rows: usize,
        page: &mut Page,
    ) -> usize {
        let cell_width = (area.width - GUTTER * (columns - 1) as f32) / columns as f32;
        let cell_height = (area.height - GUTTER * (rows - 1) as f32) / rows as f32;
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return 0;
        }

        let title_font = title_font(section.strategy);
        let budget = section.strategy.truncation_budget();
        let mut drawn = 0;

        for (index, article) in articles.iter().take(columns * rows).enumerate() {
            let column = index % columns;
            let row = index / columns;
            let cell = Rect::new(
                area.x + column as f32 * (cell_width + GUTTER),
                area.y + row as f32 * (cell_height + GUTTER),
                cell_width,
                cell_height,
            );

            let preview = truncate_preview(&plain_text(&article.content), budget);
            let lines = self
                .wrap(&article.title, cell.width, title_font)
                .into_iter()
                .map(|line| (line, title_font))
                .chain(
                    self.wrap(&preview, cell.width, BODY_FONT)
                        .into_iter()
                        .map(|line| (line, BODY_FONT)),
                );

            let mut cursor = cell.y;
            let mut any = false;
            for (line, font) in lines {
                if cursor + font.line_height() > cell.bottom() {
                    break;
                }
                self.put(page, cell.x, cursor, line, font);
                cursor += font.line_height();
                any = true;
            }
            if any {
                drawn += 1;
            }
        }

        drawn
    }

    /// Masthead: title, date and a double rule. Leaves the right ear free
    /// when a weather block will be drawn.
    pub fn render_header(&self, section: &Section, ctx: &PageContext<'_>, page: &mut Page) {
        let area = section.rect.inset(PADDING);
        let ear = if ctx.weather.is_some() {
            WEATHER_EAR_WIDTH.min(area.width * 0.3)
        } else {
            0.0
        };
        let title_width = (area.width - 2.0 * ear).max(0.0);
        let title_bottom = area.bottom() - DATE_FONT.line_height() - RULE_SPACE;

        let font = MASTHEAD_SIZES
            .iter()
            .map(|&size| Font::bold(size))
            .find(|&f| {
                self.width(ctx.title, f) <= title_width && area.y + f.line_height() <= title_bottom
            })
            .unwrap_or(Font::bold(MASTHEAD_SIZES[MASTHEAD_SIZES.len() - 1]));

        let mut cursor = area.y;
        for line in self.wrap(ctx.title, title_width, font) {
            if cursor + font.line_height() > title_bottom {
                break;
            }
            let width = self.width(&line, font);
            let x = area.x + (area.width - width) / 2.0;
            page.text(x, cursor, width, line, font);
            cursor += font.line_height();
        }

        if cursor + DATE_FONT.line_height() <= area.bottom() - RULE_SPACE {
            let date = self.wrap(ctx.date_label, title_width, DATE_FONT).into_iter().next();
            if let Some(date) = date {
                let width = self.width(&date, DATE_FONT);
                let x = area.x + (area.width - width) / 2.0;
                page.text(x, cursor, width, date, DATE_FONT);
            }
        }

        page.hline(area.x, area.right(), area.bottom() - 1.5, 0.8);
        page.hline(area.x, area.right(), area.bottom() - 0.5, 0.3);
    }

    /// Weather block in the right ear of the masthead.
    pub fn render_weather(&self, header: &Section, weather: &Weather, page: &mut Page) {
        let area = header.rect.inset(PADDING);
        let ear_width = WEATHER_EAR_WIDTH.min(area.width * 0.3);
        let ear = Rect::new(area.right() - ear_width, area.y, ear_width, area.height - RULE_SPACE);

        let location = Font::bold(8.0);
        let detail = Font::regular(7.0);
        let lines = [
            (weather.location.clone(), location),
            (format!("{}°C {}", weather.temperature_c, weather.condition), detail),
            (format!("Humidity {}%", weather.humidity), detail),
        ];

        let mut cursor = ear.y;
        for (text, font) in lines {
            for line in self.wrap(&text, ear.width, font) {
                if cursor + font.line_height() > ear.bottom() {
                    return;
                }
                self.put(page, ear.x, cursor, line, font);
                cursor += font.line_height();
            }
        }
    }

    /// Footer: top rule, attribution, page number and date.
    pub fn render_footer(&self, section: &Section, ctx: &PageContext<'_>, page: &mut Page) {
        let area = section.rect.inset(1.0);
        page.hline(area.x, area.right(), area.y, 0.5);

        let top = area.y + 1.0;
        if top + FOOTER_FONT.line_height() > area.bottom() {
            return;
        }

        let third = area.width / 3.0;
        let attribution = format!("© {}", ctx.site_name);
        let page_label = format!("Page {}", ctx.page_number);
        let first_line = |text: &str| self.wrap(text, third, FOOTER_FONT).into_iter().next();

        if let Some(text) = first_line(&attribution) {
            self.put(page, area.x, top, text, FOOTER_FONT);
        }
        if let Some(text) = first_line(&page_label) {
            let width = self.width(&text, FOOTER_FONT);
            let x = area.x + (area.width - width) / 2.0;
            page.text(x, top, width, text, FOOTER_FONT);
        }
        if let Some(text) = first_line(ctx.date_label) {
            let width = self.width(&text, FOOTER_FONT);
            page.text(area.right() - width, top, width, text, FOOTER_FONT);
        }
    }
}
