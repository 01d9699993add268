use std::fmt;

use crate::contract::TextAreaWidget;

pub const DEFAULT_WIDGET_NAME: &str = "Featured Posts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    NotFound(String),
    /// More than one sidebar textarea carries the display name.
    Ambiguous { name: String, count: usize },
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::NotFound(name) => {
                write!(f, "no sidebar text widget named {name:?}")
            }
            WidgetError::Ambiguous { name, count } => {
                write!(f, "{count} sidebar text widgets are named {name:?}, expected exactly one")
            }
        }
    }
}

impl std::error::Error for WidgetError {}

/// The single textarea widget displayed as `name`.
pub fn find_widget<'a>(
    widgets: &'a [TextAreaWidget],
    name: &str,
) -> Result<&'a TextAreaWidget, WidgetError> {
    let mut matches = widgets.iter().filter(|w| w.short_name == name);
    match (matches.next(), matches.count()) {
        (Some(widget), 0) => Ok(widget),
        (Some(_), extra) => Err(WidgetError::Ambiguous {
            name: name.to_string(),
            count: extra + 1,
        }),
        (None, _) => Err(WidgetError::NotFound(name.to_string())),
    }
}
