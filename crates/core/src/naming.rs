//! Canonical field naming.
//!
//! Form labels on the approval platform are free text ("申请日期",
//! "Purchase date (required)", ...). [`FieldNameNormalizer`] maps them onto
//! canonical business keys using an ordered table of substring rules. The
//! first matching rule wins; unmatched labels pass through unchanged so new
//! form fields are never dropped.

/// One normalization rule: if a label contains any marker, it becomes `canonical`.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pub markers: &'static [&'static str],
    pub canonical: &'static str,
}

/// Rules for top-level form fields.
pub const FORM_FIELD_RULES: &[NameRule] = &[
    NameRule {
        markers: &["日期", "date"],
        canonical: "application_date",
    },
    NameRule {
        markers: &["编号", "serial"],
        canonical: "form_number",
    },
    NameRule {
        markers: &["申请人", "applicant"],
        canonical: "applicant",
    },
    NameRule {
        markers: &["部门", "department"],
        canonical: "department",
    },
    NameRule {
        markers: &["总计", "总额", "总金额", "total"],
        canonical: "total_amount",
    },
];

/// Rules for cells inside line-item (`fieldList`) rows.
///
/// `unit_price` precedes `unit`: "unit price" contains "unit".
pub const LINE_ITEM_RULES: &[NameRule] = &[
    NameRule {
        markers: &["物品名称", "item name"],
        canonical: "item_name",
    },
    NameRule {
        markers: &["规格", "spec"],
        canonical: "specification",
    },
    NameRule {
        markers: &["类别", "category"],
        canonical: "category",
    },
    NameRule {
        markers: &["数量", "quantity", "qty"],
        canonical: "quantity",
    },
    NameRule {
        markers: &["单价", "unit price"],
        canonical: "unit_price",
    },
    NameRule {
        markers: &["单位", "unit"],
        canonical: "unit",
    },
    NameRule {
        markers: &["图片", "image"],
        canonical: "images",
    },
    NameRule {
        markers: &["链接", "link", "url"],
        canonical: "purchase_link",
    },
];

/// Applies an ordered rule table to raw labels.
#[derive(Debug, Clone, Copy)]
pub struct FieldNameNormalizer {
    rules: &'static [NameRule],
}

/// Normalizer for top-level form fields.
pub const FORM_FIELDS: FieldNameNormalizer = FieldNameNormalizer::new(FORM_FIELD_RULES);

/// Normalizer for line-item cells.
pub const LINE_ITEMS: FieldNameNormalizer = FieldNameNormalizer::new(LINE_ITEM_RULES);

impl FieldNameNormalizer {
    pub const fn new(rules: &'static [NameRule]) -> Self {
        Self { rules }
    }

    /// Return the canonical name for `label`, or `label` itself when no rule matches.
    ///
    /// ASCII markers match case-insensitively.
    pub fn normalize(&self, label: &str) -> String {
        self.canonical_for(label)
            .map(str::to_owned)
            .unwrap_or_else(|| label.to_owned())
    }

    /// The canonical name of the first matching rule, if any.
    pub fn canonical_for(&self, label: &str) -> Option<&'static str> {
        let lowered = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.markers.iter().any(|m| lowered.contains(m)))
            .map(|rule| rule.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_label_maps_to_application_date() {
        assert_eq!(FORM_FIELDS.normalize("申请日期"), "application_date");
        assert_eq!(FORM_FIELDS.normalize("Request Date"), "application_date");
    }

    #[test]
    fn test_total_variants() {
        assert_eq!(FORM_FIELDS.normalize("总金额"), "total_amount");
        assert_eq!(FORM_FIELDS.normalize("合计总额"), "total_amount");
        assert_eq!(FORM_FIELDS.normalize("费用总计"), "total_amount");
    }

    #[test]
    fn test_first_rule_wins() {
        // Contains both the date marker and the applicant marker.
        assert_eq!(FORM_FIELDS.normalize("申请人填写日期"), "application_date");
    }

    #[test]
    fn test_unmatched_label_passes_through() {
        assert_eq!(FORM_FIELDS.normalize("采购事由"), "采购事由");
        assert_eq!(FORM_FIELDS.canonical_for("采购事由"), None);
    }

    #[test]
    fn test_passthrough_keeps_original_case() {
        assert_eq!(FORM_FIELDS.normalize("Reason"), "Reason");
    }

    #[test]
    fn test_line_item_rules() {
        assert_eq!(LINE_ITEMS.normalize("物品名称"), "item_name");
        assert_eq!(LINE_ITEMS.normalize("数量"), "quantity");
        assert_eq!(LINE_ITEMS.normalize("单价(元)"), "unit_price");
        assert_eq!(LINE_ITEMS.normalize("计量单位"), "unit");
        assert_eq!(LINE_ITEMS.normalize("商品图片"), "images");
        assert_eq!(LINE_ITEMS.normalize("购买链接"), "purchase_link");
    }

    #[test]
    fn test_unit_price_beats_unit_for_ascii_labels() {
        assert_eq!(LINE_ITEMS.normalize("Unit Price"), "unit_price");
        assert_eq!(LINE_ITEMS.normalize("Unit"), "unit");
    }

    #[test]
    fn test_markers_match_inside_longer_words() {
        // Matching is plain substring containment, with no word boundaries.
        assert_eq!(FORM_FIELDS.normalize("Update reason"), "application_date");
        assert_eq!(LINE_ITEMS.normalize("Inspection"), "specification");
    }

    #[test]
    fn test_tables_are_independent() {
        assert_eq!(FORM_FIELDS.normalize("数量"), "数量");
        assert_eq!(LINE_ITEMS.normalize("申请日期"), "申请日期");
    }
}
