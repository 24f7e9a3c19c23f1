//! Example: recognizing an image against MockBackend, without a live model.
//!
//! Run with: `RUST_LOG=debug cargo run --example mock_recognition`

use shipdoc_recognizer::{
    Event, FnEventHandler, ImageFormat, MockBackend, Recognizer, RecognizerConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // First reply ignores the JSON instruction; second one follows it.
    let mock = MockBackend::new(vec![
        "好的，识别结果如下：\n产品名称：热轧钢板\n规格型号：Q235B\n批号：A240301".to_string(),
        r#"[{"product_name": "镀锌卷", "model": "DX51D", "specification": "1.0*1250",
            "manufacturer": "丙钢铁公司", "production_date": "2024-05-02",
            "shipment_date": "", "batch_number": "Z0502"}]"#
            .to_string(),
    ]);

    let recognizer = Recognizer::builder(RecognizerConfig::default())
        .backend(Arc::new(mock))
        .event_handler(Arc::new(FnEventHandler(|event: Event| {
            if let Event::FallbackUsed { source, reason } = event {
                println!("[{source}] fallback parser used: {reason}");
            }
        })))
        .build()?;

    for source in ["delivery-note.jpg", "certificate.png"] {
        let format = if source.ends_with(".png") {
            ImageFormat::Png
        } else {
            ImageFormat::Jpeg
        };
        let result = recognizer
            .recognize_bytes(source, b"not really an image", format)
            .await?;

        println!("{source}:");
        if let Some(warning) = result.warning {
            println!("  warning: {warning}");
        }
        let view = result.view();
        println!("{}", serde_json::to_string_pretty(&view)?);
        println!("  strategy: {:?}", result.diagnostics.strategy);
    }

    Ok(())
}
