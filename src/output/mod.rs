pub mod formatter;

pub use formatter::{
    format_category, format_json, format_report, format_summary_table, format_tsv,
    should_use_colors,
};
