//! Featured posts region of the sidebar wiki page.
//!
//! The region is every line after the start marker line up to (not
//! including) the end marker line. Replacing it keeps both marker lines and
//! everything outside them byte for byte.

use std::fmt;
use std::ops::Range;

use tracing::{debug, error};

pub const DEFAULT_START_MARKER: &str = "# Featured Posts";
pub const DEFAULT_END_MARKER: &str = "# Announcements";

/// Inserted between the start marker and the new entries.
const LEADING_WHITESPACE: &str = "\n";
/// Inserted between the new entries and the end marker.
const TRAILING_WHITESPACE: &str = "\n\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarMarkers {
    pub start: String,
    pub end: String,
}

impl Default for SidebarMarkers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarError {
    MissingStartMarker(String),
    MissingEndMarker(String),
    /// The end marker only occurs above the start marker.
    EndBeforeStart { start: String, end: String },
}

impl fmt::Display for SidebarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidebarError::MissingStartMarker(m) => {
                write!(f, "sidebar has no line containing start marker {m:?}")
            }
            SidebarError::MissingEndMarker(m) => {
                write!(f, "sidebar has no line containing end marker {m:?}")
            }
            SidebarError::EndBeforeStart { start, end } => write!(
                f,
                "end marker {end:?} appears before start marker {start:?} and never after it"
            ),
        }
    }
}

impl std::error::Error for SidebarError {}

/// Locate the replaceable region as a range of line indices.
///
/// Uses the first line containing the start marker and the first line after
/// it containing the end marker.
pub fn locate_region<S: AsRef<str>>(
    lines: &[S],
    markers: &SidebarMarkers,
) -> Result<Range<usize>, SidebarError> {
    let start_line = lines
        .iter()
        .position(|l| l.as_ref().contains(&markers.start))
        .ok_or_else(|| SidebarError::MissingStartMarker(markers.start.clone()))?;

    let region_start = start_line + 1;
    match lines[region_start..]
        .iter()
        .position(|l| l.as_ref().contains(&markers.end))
    {
        Some(offset) => Ok(region_start..region_start + offset),
        None if lines[..start_line]
            .iter()
            .any(|l| l.as_ref().contains(&markers.end)) =>
        {
            Err(SidebarError::EndBeforeStart {
                start: markers.start.clone(),
                end: markers.end.clone(),
            })
        }
        None => Err(SidebarError::MissingEndMarker(markers.end.clone())),
    }
}

/// Replace the featured posts region of `sidebar` with `new_lines`.
///
/// The result is: everything up to and including the start marker line, one
/// blank line, the new lines in order, three newlines, then the end marker
/// line and the rest of the document.
pub fn replace_region<S: AsRef<str>>(
    sidebar: &str,
    new_lines: &[S],
    markers: &SidebarMarkers,
) -> Result<String, SidebarError> {
    let lines: Vec<&str> = sidebar.split_inclusive('\n').collect();
    let region = locate_region(&lines, markers).map_err(|e| {
        error!(error = %e, "Could not locate featured posts region in sidebar");
        e
    })?;
    debug!(
        start = region.start,
        end = region.end,
        removed = region.len(),
        inserted = new_lines.len(),
        "Replacing featured posts region"
    );

    let mut out = String::with_capacity(sidebar.len());
    lines[..region.start].iter().for_each(|l| out.push_str(l));
    out.push_str(LEADING_WHITESPACE);
    new_lines.iter().for_each(|l| out.push_str(l.as_ref()));
    out.push_str(TRAILING_WHITESPACE);
    lines[region.end..].iter().for_each(|l| out.push_str(l));
    Ok(out)
}
