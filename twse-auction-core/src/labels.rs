//! Field name → human label translation.

use std::collections::BTreeMap;

use crate::constants::FIELD_LABELS;

/// Translation table from upstream field names to display labels.
///
/// Known fields keep their fixed display order. Fields without a translation
/// are shown under their raw name.
#[derive(Debug, Clone)]
pub struct FieldLabels {
    order: Vec<(String, String)>,
}

impl Default for FieldLabels {
    fn default() -> Self {
        FieldLabels {
            order: FIELD_LABELS
                .iter()
                .map(|(field, label)| (field.to_string(), label.to_string()))
                .collect(),
        }
    }
}

impl FieldLabels {
    /// Default table with some labels replaced. Overrides for fields outside the
    /// default table are appended after the known fields.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut labels = FieldLabels::default();
        for (field, label) in overrides {
            match labels.order.iter_mut().find(|(f, _)| f == field) {
                Some(entry) => entry.1 = label.clone(),
                None => labels.order.push((field.clone(), label.clone())),
            }
        }
        labels
    }

    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.order
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, label)| label.as_str())
            .unwrap_or(field)
    }

    /// Position of a field in the display order, `None` for untranslated fields.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.order.iter().position(|(f, _)| f == field)
    }

    /// Known fields with their labels, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().map(|(f, l)| (f.as_str(), l.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fields;

    #[test]
    fn test_unknown_field_uses_raw_name() {
        let labels = FieldLabels::default();
        assert_eq!(labels.label("name"), "name");
        assert_eq!(labels.position("name"), None);
    }

    #[test]
    fn test_default_translation() {
        let labels = FieldLabels::default();
        assert_eq!(labels.label(fields::LISTING_DATE), "撥券日期");
        assert_eq!(labels.position(fields::NAME), Some(0));
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut overrides = BTreeMap::new();
        overrides.insert(fields::NAME.to_string(), "名稱".to_string());
        overrides.insert("備註".to_string(), "附註".to_string());

        let labels = FieldLabels::with_overrides(&overrides);

        assert_eq!(labels.label(fields::NAME), "名稱");
        assert_eq!(labels.position(fields::NAME), Some(0), "Override keeps position");
        assert_eq!(labels.label("備註"), "附註");
        assert_eq!(labels.position("備註"), Some(FIELD_LABELS.len()));
    }
}
