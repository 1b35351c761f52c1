//! `formfill sanitize <label>` – show the field name for a form label.

use formfill_core::record::sanitize_field_name;

pub fn run_sanitize(label: &str) {
    let name = sanitize_field_name(label.trim());
    if name.is_empty() {
        println!("(no usable field name; the item would be dropped)");
    } else {
        println!("{name}");
    }
}
