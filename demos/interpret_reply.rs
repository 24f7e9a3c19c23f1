//! Example: interpreting raw model replies without any network call.
//!
//! Run with: `cargo run --example interpret_reply [FILE]`
//!
//! With a file argument the file's contents are interpreted; otherwise a few
//! built-in replies are.

use shipdoc_recognizer::{interpret, Field};
use tracing_subscriber::EnvFilter;

const SAMPLES: &[&str] = &[
    "<think>用户需要JSON</think>\n```json\n[{\"product_name\": \"无缝钢管\", \"model\": \"20#\", \
     \"specification\": \"Φ89*6\", \"manufacturer\": \"\", \"production_date\": \"2024-02-18\", \
     \"shipment_date\": null, \"batch_number\": \"G2402\"}]\n```",
    "品名: 螺纹钢\n生产厂家：丁钢铁公司\n批次: \"R-17\",",
    "[{\"product_name\": \"盘条\"}]",
    "图片模糊，无法识别",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let replies: Vec<String> = match std::env::args().nth(1) {
        Some(path) => vec![std::fs::read_to_string(path)?],
        None => SAMPLES.iter().map(|s| s.to_string()).collect(),
    };

    for reply in &replies {
        let result = interpret(reply);
        println!("---");
        match result.warning {
            Some(w) => println!("warning: {w}"),
            None => println!("parsed cleanly"),
        }
        for (i, record) in result.records.iter().enumerate() {
            println!("record {}:", i + 1);
            for field in Field::ALL {
                println!("  {:<16} {}", field.key(), record.get(field));
            }
        }
        println!("diagnostics: {:?}", result.diagnostics);
    }

    Ok(())
}
