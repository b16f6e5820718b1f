//! Column label normalization.

use sheetline_model::CellValue;

/// Normalize a column label into a canonical field key.
///
/// The key is lowercase, every run of non-alphanumeric characters becomes a
/// single underscore, and leading/trailing underscores are dropped:
///
/// ```
/// use sheetline_transform::normalize_header;
///
/// assert_eq!(normalize_header("  Tanggal Transaksi (WIB) "), "tanggal_transaksi_wib");
/// assert_eq!(normalize_header("__Order--ID__"), "order_id");
/// ```
///
/// Normalizing an already normalized key returns it unchanged.
pub fn normalize_header(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.chars() {
        let mut lowered = ch
            .to_lowercase()
            .filter(|c| c.is_alphanumeric())
            .peekable();
        if !ch.is_alphanumeric() || lowered.peek().is_none() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !key.is_empty() {
            key.push('_');
        }
        pending_separator = false;
        key.extend(lowered);
    }
    key
}

/// Normalize a non-text label (numeric or boolean headers) by coercing it to
/// text first.
pub fn normalize_header_value(label: &CellValue) -> String {
    normalize_header(&label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(normalize_header("Customer Name"), "customer_name");
        assert_eq!(normalize_header("NO. INVOICE"), "no_invoice");
        assert_eq!(normalize_header("Qty/Unit"), "qty_unit");
    }

    #[test]
    fn collapses_mixed_separator_runs() {
        assert_eq!(normalize_header("a - _ b"), "a_b");
        assert_eq!(normalize_header("a__b"), "a_b");
        assert_eq!(normalize_header("__EMPTY_1"), "empty_1");
    }

    #[test]
    fn empty_and_symbol_only_labels() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("  "), "");
        assert_eq!(normalize_header("#%&"), "");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize_header("Straße Nr"), "straße_nr");
        assert_eq!(normalize_header("Çiğdem Öz"), "çiğdem_öz");
    }

    #[test]
    fn numeric_labels_are_coerced() {
        assert_eq!(normalize_header_value(&CellValue::Number(2024.0)), "2024");
        assert_eq!(normalize_header_value(&CellValue::Number(1.5)), "1_5");
        assert_eq!(normalize_header_value(&CellValue::Bool(false)), "false");
    }
}
