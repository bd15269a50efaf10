pub mod builder;
pub mod facet_panel;
pub mod paginator;
pub mod parser;
