//! Newspaper layouts shipped with the generator.
//!
//! Geometry is in millimetres from the top-left corner of the page.

use crate::domain::{LayoutStrategy, Margins, PageSize, Rect, Section, SectionType, Template};

use LayoutStrategy::{Double, Grid, Single, Triple};
use SectionType::{Breaking, Footer, Header, Main, Secondary, Sidebar};

/// Broadsheet: masthead, breaking band, wide main column with a sidebar,
/// a three-column strip underneath.
pub fn traditional() -> Template {
    Template {
        id: "traditional".to_string(),
        name: "Traditional".to_string(),
        description: "Classic broadsheet with a main column, sidebar and a three-column strip"
            .to_string(),
        page: PageSize {
            width: 297.0,
            height: 420.0,
        },
        margins: Margins::uniform(10.0),
        sections: vec![
            Section::new(Header, Rect::new(10.0, 10.0, 277.0, 40.0), 0, Single),
            Section::new(Breaking, Rect::new(10.0, 55.0, 277.0, 25.0), 1, Single),
            Section::new(Main, Rect::new(10.0, 85.0, 185.0, 170.0), 3, Single),
            Section::new(Sidebar, Rect::new(200.0, 85.0, 87.0, 170.0), 4, Single),
            Section::new(Secondary, Rect::new(10.0, 260.0, 277.0, 120.0), 3, Triple),
            Section::new(Footer, Rect::new(10.0, 385.0, 277.0, 25.0), 0, Single),
        ],
    }
}

/// A4 with full-width sections, a two-column body and a 2x2 grid.
pub fn modern() -> Template {
    Template {
        id: "modern".to_string(),
        name: "Modern".to_string(),
        description: "Full-width sections with a two-column body and a grid of highlights"
            .to_string(),
        page: PageSize {
            width: 210.0,
            height: 297.0,
        },
        margins: Margins::uniform(15.0),
        sections: vec![
            Section::new(Header, Rect::new(15.0, 15.0, 180.0, 30.0), 0, Single),
            Section::new(Breaking, Rect::new(15.0, 50.0, 180.0, 24.0), 1, Single),
            Section::new(Main, Rect::new(15.0, 76.0, 180.0, 110.0), 4, Double),
            Section::new(Secondary, Rect::new(15.0, 190.0, 180.0, 78.0), 4, Grid),
            Section::new(Footer, Rect::new(15.0, 272.0, 180.0, 10.0), 0, Single),
        ],
    }
}

/// A5 single column for narrow screens.
pub fn compact() -> Template {
    Template {
        id: "compact".to_string(),
        name: "Compact".to_string(),
        description: "Small single-column page tuned for narrow viewing".to_string(),
        page: PageSize {
            width: 148.0,
            height: 210.0,
        },
        margins: Margins::uniform(8.0),
        sections: vec![
            Section::new(Header, Rect::new(8.0, 8.0, 132.0, 22.0), 0, Single),
            Section::new(Breaking, Rect::new(8.0, 33.0, 132.0, 26.0), 1, Single),
            Section::new(Main, Rect::new(8.0, 62.0, 132.0, 120.0), 3, Single),
            Section::new(Footer, Rect::new(8.0, 186.0, 132.0, 16.0), 0, Single),
        ],
    }
}

pub fn all() -> Vec<Template> {
    vec![traditional(), modern(), compact()]
}
