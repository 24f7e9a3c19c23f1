//! Mapping between records and the recognition form shown to users.
//!
//! The web form uses its own field names (`nameResult`, `specResult`, ...).
//! [`FormResult`] carries a record in that shape; [`FormResult::into_record`]
//! maps a form the user edited and saved back into a record.

use serde::{Deserialize, Serialize};

use crate::pipeline::{Interpretation, Warning};
use crate::schema::{DocumentRecord, Field};

/// One record in the outward-facing form shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResult {
    #[serde(default)]
    pub name_result: Option<String>,
    #[serde(default)]
    pub model_result: Option<String>,
    #[serde(default)]
    pub spec_result: Option<String>,
    #[serde(default)]
    pub manufacturer_result: Option<String>,
    #[serde(default)]
    pub production_date_result: Option<String>,
    #[serde(default)]
    pub shipment_date_result: Option<String>,
    #[serde(default)]
    pub batch_number_result: Option<String>,
    #[serde(default)]
    pub remark_result: Option<String>,
}

impl FormResult {
    pub fn from_record(record: &DocumentRecord, remark: Option<String>) -> Self {
        Self {
            name_result: Some(record.product_name.clone()),
            model_result: Some(record.model.clone()),
            spec_result: Some(record.specification.clone()),
            manufacturer_result: Some(record.manufacturer.clone()),
            production_date_result: Some(record.production_date.clone()),
            shipment_date_result: Some(record.shipment_date.clone()),
            batch_number_result: Some(record.batch_number.clone()),
            remark_result: remark,
        }
    }

    /// Map a saved form back to a record. Missing or blank required values
    /// become the sentinel; missing dates become empty.
    pub fn into_record(self) -> DocumentRecord {
        let mut record = DocumentRecord::defaults();
        let pairs = [
            (Field::ProductName, self.name_result),
            (Field::Model, self.model_result),
            (Field::Specification, self.spec_result),
            (Field::Manufacturer, self.manufacturer_result),
            (Field::ProductionDate, self.production_date_result),
            (Field::ShipmentDate, self.shipment_date_result),
            (Field::BatchNumber, self.batch_number_result),
        ];
        for (field, value) in pairs {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                record.set(field, value);
            }
        }
        record
    }
}

/// Everything the result page needs for one recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionView {
    pub results: Vec<FormResult>,
    /// Show the "partially recognized" indicator.
    pub partial: bool,
    pub warning: Option<String>,
}

impl RecognitionView {
    pub fn new(records: &[DocumentRecord], warning: Option<Warning>) -> Self {
        let remark = warning.map(remark_for);
        Self {
            results: records
                .iter()
                .map(|r| FormResult::from_record(r, remark.clone()))
                .collect(),
            partial: warning.is_some(),
            warning: warning.map(|w| w.to_string()),
        }
    }
}

impl From<&Interpretation> for RecognitionView {
    fn from(interp: &Interpretation) -> Self {
        Self::new(&interp.records, interp.warning)
    }
}

fn remark_for(warning: Warning) -> String {
    match warning {
        Warning::UsedFallback => "部分识别：模型未按格式返回，请核对".to_string(),
        Warning::NoValidRecords => "未识别到有效单据".to_string(),
        Warning::Unparseable => "识别失败，请重试".to_string(),
    }
}
