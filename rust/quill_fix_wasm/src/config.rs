// Which fixes get installed on the editor.
// Every flag defaults to on, so an empty config `{}` installs the full set.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixConfig {
    /// Rewrite `<p></p>` to `<p><br></p>` in serialized HTML.
    pub empty_paragraphs: bool,
    /// Rewrite `&nbsp;` and U+00A0 to an ordinary space in serialized HTML.
    pub nbsp: bool,
    /// Drop every keyboard binding that would swallow Tab.
    pub tab_bindings: bool,
    /// Keep the editor's raw HTML while a cut is in flight, same as a copy.
    pub suspend_on_cut: bool,
}

impl FixConfig {
    /// Only the Tab binding removal, leaving serialized HTML untouched.
    pub fn bindings_only() -> Self {
        Self {
            empty_paragraphs: false,
            nbsp: false,
            tab_bindings: true,
            suspend_on_cut: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| format!("invalid fix config: {}", e))
    }

    pub fn fixes_html(&self) -> bool {
        self.empty_paragraphs || self.nbsp
    }
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            empty_paragraphs: true,
            nbsp: true,
            tab_bindings: true,
            suspend_on_cut: true,
        }
    }
}
