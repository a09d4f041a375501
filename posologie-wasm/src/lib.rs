//! WASM <-> JavaScript bridge for dosage extraction.

use posologie_core::{assemble_batch, assemble_with, ExtractionConfig, Identity, Preprocessor};
use posologie_translate::EnglishToFrench;
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsExtractionConfig {
    #[serde(default)]
    start_id: Option<usize>,
    #[serde(default)]
    translate: Option<bool>,
}

impl JsExtractionConfig {
    fn preprocessor(&self) -> &'static dyn Preprocessor {
        if self.translate.unwrap_or(false) {
            &EnglishToFrench
        } else {
            &Identity
        }
    }
}

impl From<&JsExtractionConfig> for ExtractionConfig {
    fn from(cfg: &JsExtractionConfig) -> Self {
        let mut base = ExtractionConfig::default();
        if let Some(start_id) = cfg.start_id {
            base.start_id = start_id;
        }
        base
    }
}

/// Extract records for an array of instruction strings.
#[wasm_bindgen]
pub fn extract_lines(lines: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let lines = from_value::<Vec<String>>(lines)
        .map_err(|err| JsValue::from_str(&format!("cannot read lines: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => from_value::<JsExtractionConfig>(js_cfg)
            .map_err(|err| JsValue::from_str(&format!("cannot read config: {err}")))?,
        None => JsExtractionConfig::default(),
    };

    let records = assemble_batch(&lines, &ExtractionConfig::from(&cfg), cfg.preprocessor());

    to_value(&records).map_err(|err| JsValue::from_str(&format!("cannot serialize records: {err}")))
}

/// Extract the record for a single French instruction, with id 1.
#[wasm_bindgen]
pub fn extract_line(line: &str) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let record = assemble_with(1, line, &Identity);
    to_value(&record).map_err(|err| JsValue::from_str(&format!("cannot serialize record: {err}")))
}
