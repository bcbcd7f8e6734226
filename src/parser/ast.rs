// Syntax tree for the widget expression language

use crate::config::{SettingsPatch, WidgetKind};

/// One widget expression, e.g. `bar(x: city, y: [sales, cost])`
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDecl {
    pub kind: WidgetKind,
    /// Settings given in the expression; omitted ones keep their seeded defaults
    pub patch: SettingsPatch,
}
