//! Synonym labels used by the fallback text parser.
//!
//! [`KEYWORD_MAP`] is an ordered list: when a label contains synonyms of more
//! than one field, the field listed first wins. For example `规格型号`
//! resolves to [`Field::Model`] because `型号` is checked before `规格`.

use crate::schema::Field;

/// Ordered (field, synonyms) pairs. Synonyms are matched as substrings of the
/// lower-cased label, so English entries must be lower case.
pub static KEYWORD_MAP: &[(Field, &[&str])] = &[
    (
        Field::ProductName,
        &[
            "产品名称",
            "品名",
            "货物名称",
            "商品名称",
            "物料名称",
            "product_name",
            "product name",
        ],
    ),
    (Field::Model, &["型号", "model"]),
    (
        Field::Specification,
        &["规格", "尺寸", "specification", "specs", "spec."],
    ),
    (
        Field::Manufacturer,
        &[
            "生产厂家",
            "制造商",
            "生产企业",
            "出品方",
            "生产公司",
            "manufacturer",
        ],
    ),
    (
        Field::ProductionDate,
        &[
            "生产日期",
            "制造日期",
            "生产时间",
            "production_date",
            "production date",
        ],
    ),
    (
        Field::ShipmentDate,
        &[
            "出厂日期",
            "发货日期",
            "出货日期",
            "发运日期",
            "shipment_date",
            "shipment date",
        ],
    ),
    (
        Field::BatchNumber,
        &["批号", "批次", "batch_number", "batch number", "batch no"],
    ),
];

/// Resolve a normalized (trimmed, lower-cased) label to the first field
/// whose synonym set has a member contained in it.
pub fn match_label(label: &str) -> Option<Field> {
    KEYWORD_MAP
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| label.contains(s)))
        .map(|(field, _)| *field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_synonyms() {
        for field in Field::ALL {
            let entry = KEYWORD_MAP.iter().find(|(f, _)| *f == field);
            assert!(entry.is_some_and(|(_, s)| !s.is_empty()), "{field}");
        }
    }

    #[test]
    fn test_english_synonyms_are_lower_case() {
        for (_, synonyms) in KEYWORD_MAP {
            for s in synonyms.iter() {
                assert_eq!(*s, s.to_lowercase());
            }
        }
    }

    #[test]
    fn test_match_chinese_labels() {
        assert_eq!(match_label("产品名称"), Some(Field::ProductName));
        assert_eq!(match_label("型号"), Some(Field::Model));
        assert_eq!(match_label("生产厂家"), Some(Field::Manufacturer));
        assert_eq!(match_label("出厂日期"), Some(Field::ShipmentDate));
        assert_eq!(match_label("生产批号"), Some(Field::BatchNumber));
    }

    #[test]
    fn test_first_listed_field_wins() {
        assert_eq!(match_label("规格型号"), Some(Field::Model));
    }

    #[test]
    fn test_english_spec_labels() {
        assert_eq!(match_label("specs"), Some(Field::Specification));
        assert_eq!(match_label("spec."), Some(Field::Specification));
        assert_eq!(match_label("inspection date"), None);
        assert_eq!(match_label("inspection"), None);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(match_label("备注"), None);
    }
}
