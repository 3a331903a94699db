//! remindful-report — HTML and CSV renderings of session reports.
//!
//! JSON persistence and the markdown summary live with the report types in
//! `remindful-core`; this crate adds the viewable and longitudinal formats.

pub mod csv;
pub mod html;
