// wasm-bindgen exports for the page.
//
// The page keeps references to the editor's native `getHTML` and
// `Clipboard.onCopy` and routes calls through `QuillFixes`, which runs them
// inside the same decorators the native tests exercise.

use js_sys::{Array, Function, Object, Reflect};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use crate::bindings::{
    matching_names, BindingTable, Descriptor, DescriptorKey, KeyBinding, SequenceKey, TAB,
};
use crate::config::FixConfig;
use crate::editor::{CopyHandler, GuardedClipboard, HtmlSource, NormalizedHtml, SelectionRange};
use crate::normalize::normalize_html_with;
use crate::suspend::NormalizationGate;

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("quill_fix panic at {}:{}: {info}", loc.file(), loc.line()),
                None => format!("quill_fix panic: {info}"),
            };
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

struct JsHtmlSource<'a> {
    native: &'a Function,
    this: &'a JsValue,
}

impl HtmlSource for JsHtmlSource<'_> {
    type Error = JsValue;

    fn html(&mut self, index: usize, length: usize) -> Result<String, JsValue> {
        let value = self.native.call2(
            self.this,
            &JsValue::from_f64(index as f64),
            &JsValue::from_f64(length as f64),
        )?;
        value
            .as_string()
            .ok_or_else(|| js_sys::TypeError::new("getHTML returned a non-string value").into())
    }
}

struct JsCopyHandler<'a> {
    native: &'a Function,
    this: &'a JsValue,
    // Forwarded as-is so the native handler sees the editor's own range object.
    range: &'a JsValue,
}

impl CopyHandler for JsCopyHandler<'_> {
    type Output = JsValue;
    type Error = JsValue;

    fn on_copy(&mut self, _range: SelectionRange, is_cut: bool) -> Result<JsValue, JsValue> {
        self.native
            .call2(self.this, self.range, &JsValue::from_bool(is_cut))
    }
}

fn js_number(obj: &JsValue, field: &str) -> f64 {
    Reflect::get(obj, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn range_from_js(range: &JsValue) -> SelectionRange {
    if !range.is_object() {
        return SelectionRange::default();
    }
    SelectionRange::new(
        js_number(range, "index").max(0.0) as usize,
        js_number(range, "length").max(0.0) as usize,
    )
}

fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 {
        Some(n as i64)
    } else {
        None
    }
}

fn json_of(value: &JsValue) -> Value {
    serde_wasm_bindgen::from_value(value.clone()).unwrap_or(Value::Null)
}

fn sequence_key_from_js(key: &JsValue) -> SequenceKey {
    if let Some(name) = key.as_string() {
        SequenceKey::Named(name)
    } else if let Some(code) = key.as_f64().and_then(integral) {
        SequenceKey::Coded(code)
    } else {
        SequenceKey::Unrecognized(json_of(key))
    }
}

/// `undefined` means no key; an explicit `null` is an unrecognized key.
fn key_from_js(key: &JsValue) -> Option<DescriptorKey> {
    if key.is_undefined() {
        return None;
    }
    let parsed = if let Some(name) = key.as_string() {
        DescriptorKey::Named(name)
    } else if let Some(code) = key.as_f64().and_then(integral) {
        DescriptorKey::Coded(code)
    } else if Array::is_array(key) {
        let keys = Array::from(key).iter().map(|k| sequence_key_from_js(&k)).collect();
        DescriptorKey::Sequence(keys)
    } else {
        DescriptorKey::Unrecognized(json_of(key))
    };
    Some(parsed)
}

/// Classifies a live binding. Only `key` is read off descriptors: the rest
/// holds handler functions that have no JSON form and stay on the JS side.
fn binding_from_js(value: &JsValue) -> KeyBinding {
    if let Some(name) = value.as_string() {
        KeyBinding::Named(name)
    } else if let Some(code) = value.as_f64().and_then(integral) {
        KeyBinding::Coded(code)
    } else if value.is_object() && !Array::is_array(value) {
        let key = Reflect::get(value, &JsValue::from_str("key")).unwrap_or(JsValue::UNDEFINED);
        KeyBinding::Descriptor(Descriptor {
            key: key_from_js(&key),
            extra: Map::new(),
        })
    } else {
        KeyBinding::Unrecognized(json_of(value))
    }
}

#[wasm_bindgen]
pub struct QuillFixes {
    gate: NormalizationGate,
    config: FixConfig,
}

#[wasm_bindgen]
impl QuillFixes {
    /// `config` is an optional object such as `{ nbsp: false }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<QuillFixes, JsValue> {
        install_panic_hook();
        let config = if config.is_undefined() || config.is_null() {
            FixConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("invalid fix config: {}", e)))?
        };
        Ok(QuillFixes {
            gate: NormalizationGate::shared(),
            config,
        })
    }

    /// Stand-in for `Editor.getHTML(index, length)`.
    pub fn get_html(
        &self,
        native: &Function,
        this: &JsValue,
        index: f64,
        length: f64,
    ) -> Result<String, JsValue> {
        let source = JsHtmlSource { native, this };
        let mut fixed = NormalizedHtml::new(source, self.gate.clone(), self.config.clone());
        fixed.html(index.max(0.0) as usize, length.max(0.0) as usize)
    }

    /// Stand-in for `Clipboard.onCopy(range, isCut)`.
    pub fn on_copy(
        &self,
        native: &Function,
        this: &JsValue,
        range: JsValue,
        is_cut: bool,
    ) -> Result<JsValue, JsValue> {
        let selection = range_from_js(&range);
        let handler = JsCopyHandler {
            native,
            this,
            range: &range,
        };
        let mut guarded = GuardedClipboard::new(handler, self.gate.clone(), self.config.clone());
        guarded.on_copy(selection, is_cut)
    }

    /// Deletes the Tab bindings from `Keyboard.DEFAULTS.bindings` in place
    /// and returns their names.
    pub fn remove_tab_bindings(&self, bindings: &Object) -> Result<Array, JsValue> {
        let removed = Array::new();
        if !self.config.tab_bindings {
            return Ok(removed);
        }

        let table: BindingTable = Object::keys(bindings)
            .iter()
            .filter_map(|key| {
                let name = key.as_string()?;
                let value = Reflect::get(bindings, &key).ok()?;
                Some((name, binding_from_js(&value)))
            })
            .collect();

        for name in matching_names(&table, &TAB) {
            let key = JsValue::from_str(&name);
            Reflect::delete_property(bindings, &key)?;
            removed.push(&key);
        }

        if removed.length() > 0 {
            web_sys::console::debug_2(&JsValue::from_str("quill_fix: removed Tab bindings"), &removed);
        }
        Ok(removed)
    }

    /// Applies the configured HTML fixes regardless of any copy in flight.
    pub fn normalize(&self, html: &str) -> String {
        normalize_html_with(html, &self.config)
    }

    pub fn is_normalizing(&self) -> bool {
        self.gate.is_enabled()
    }
}
