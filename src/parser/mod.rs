// Widget expression language used by the command line

pub mod ast;
pub mod lexer;
pub mod widget;

// Public API re-exports
pub use ast::WidgetDecl;
pub use widget::{parse_dashboard, parse_widget, parse_widgets};
