use crate::config::ValueMappingTable;

/// Maps raw semantic values onto the display values the target expects.
#[derive(Debug, Clone, Default)]
pub struct ValueNormalizer {
    table: ValueMappingTable,
}

impl ValueNormalizer {
    pub fn new(table: ValueMappingTable) -> Self {
        Self { table }
    }

    /// The mapped display value, or `raw` unchanged when the table has no entry.
    pub fn normalize(&self, canonical: &str, raw: &str) -> String {
        match self.table.display(canonical, raw) {
            Some(shown) => {
                tracing::debug!(canonical, raw, display = %shown, "mapped value");
                shown.to_string()
            }
            None => {
                if self.table.has_property(canonical) {
                    tracing::debug!(canonical, raw, "no value mapping, passing through");
                }
                raw.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ValueNormalizer {
        ValueNormalizer::new(ValueMappingTable::builtin())
    }

    #[test]
    fn maps_known_tokens() {
        assert_eq!(normalizer().normalize("padding", "6"), "6 (24px)");
        assert_eq!(normalizer().normalize("borderRadius", "xl"), "xl (12px)");
        assert_eq!(normalizer().normalize("variant", "outline"), "outlined");
    }

    #[test]
    fn unknown_values_pass_through() {
        assert_eq!(normalizer().normalize("padding", "12"), "12");
        assert_eq!(normalizer().normalize("intent", "primary"), "primary");
    }

    #[test]
    fn normalizing_a_display_value_is_stable() {
        let n = normalizer();
        for (canonical, raw) in [("padding", "6"), ("borderRadius", "xl"), ("Elevation", "on-top-of-bg")] {
            let once = n.normalize(canonical, raw);
            assert_eq!(n.normalize(canonical, &once), once);
        }
    }
}
