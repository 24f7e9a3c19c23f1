//! The extraction instruction sent with each image.
//!
//! The prompt asks for the strict format (a JSON array keyed by the canonical
//! field names). Models do not always comply, which is what the fallback
//! parser is for.

use crate::schema::Field;

/// Human label for a field, as printed on Chinese shipping documents.
pub fn label(field: Field) -> &'static str {
    match field {
        Field::ProductName => "产品名称",
        Field::Model => "型号",
        Field::Specification => "规格",
        Field::Manufacturer => "生产厂家",
        Field::ProductionDate => "生产日期",
        Field::ShipmentDate => "出厂日期",
        Field::BatchNumber => "批号",
    }
}

/// Build the default extraction prompt.
///
/// # Example
///
/// ```
/// use shipdoc_recognizer::prompt::extraction_prompt;
///
/// let prompt = extraction_prompt();
/// assert!(prompt.contains("\"batch_number\""));
/// ```
pub fn extraction_prompt() -> String {
    let fields = Field::ALL
        .iter()
        .map(|f| format!("- \"{}\": {}", f.key(), label(*f)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "识别这张单据中的产品名称、型号、规格、生产厂家、生产日期、出厂日期和批号。\n\
         如果图片中有多张单据，每张单据输出一个对象。\n\
         只输出一个 JSON 数组，不要输出任何其他文字，不要使用代码块标记。\n\
         每个对象包含以下键：\n{}\n\
         无法识别的字段填空字符串。日期使用 YYYY-MM-DD 格式。",
        fields
    )
}
