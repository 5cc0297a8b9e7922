// Decorators around the two editor seams we correct: HTML serialization and
// the copy/cut handler. Each wraps the native operation and exposes the same
// operation back, so callers swap one for the other.

use crate::config::FixConfig;
use crate::normalize::normalize_html_with;
use crate::suspend::NormalizationGate;

/// The editor's native "serialize this range to HTML".
pub trait HtmlSource {
    type Error;

    fn html(&mut self, index: usize, length: usize) -> Result<String, Self::Error>;
}

/// The editor's native copy/cut handler.
pub trait CopyHandler {
    type Output;
    type Error;

    fn on_copy(&mut self, range: SelectionRange, is_cut: bool)
        -> Result<Self::Output, Self::Error>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionRange {
    pub index: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

/// Serialization with the HTML fixes applied, unless a copy is in flight.
pub struct NormalizedHtml<S> {
    inner: S,
    gate: NormalizationGate,
    config: FixConfig,
}

impl<S: HtmlSource> NormalizedHtml<S> {
    pub fn new(inner: S, gate: NormalizationGate, config: FixConfig) -> Self {
        Self {
            inner,
            gate,
            config,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: HtmlSource> HtmlSource for NormalizedHtml<S> {
    type Error = S::Error;

    fn html(&mut self, index: usize, length: usize) -> Result<String, S::Error> {
        let raw = self.inner.html(index, length)?;
        if self.gate.is_enabled() && self.config.fixes_html() {
            Ok(normalize_html_with(&raw, &self.config))
        } else {
            Ok(raw)
        }
    }
}

/// Copy/cut that keeps the editor's raw HTML for the clipboard.
pub struct GuardedClipboard<C> {
    inner: C,
    gate: NormalizationGate,
    config: FixConfig,
}

impl<C: CopyHandler> GuardedClipboard<C> {
    pub fn new(inner: C, gate: NormalizationGate, config: FixConfig) -> Self {
        Self {
            inner,
            gate,
            config,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: CopyHandler> CopyHandler for GuardedClipboard<C> {
    type Output = C::Output;
    type Error = C::Error;

    fn on_copy(&mut self, range: SelectionRange, is_cut: bool) -> Result<C::Output, C::Error> {
        if is_cut && !self.config.suspend_on_cut {
            return self.inner.on_copy(range, is_cut);
        }
        let _suspension = self.gate.suspend();
        self.inner.on_copy(range, is_cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RAW: &str = "<p>a&nbsp;b</p><p></p>";
    const FIXED: &str = "<p>a b</p><p><br></p>";

    #[derive(Clone)]
    struct FakeEditor {
        html: String,
        calls: Rc<RefCell<Vec<(usize, usize)>>>,
        fail: bool,
    }

    impl FakeEditor {
        fn new(html: &str) -> Self {
            Self {
                html: html.to_string(),
                calls: Rc::new(RefCell::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl HtmlSource for FakeEditor {
        type Error = String;

        fn html(&mut self, index: usize, length: usize) -> Result<String, String> {
            self.calls.borrow_mut().push((index, length));
            if self.fail {
                return Err("editor detached".to_string());
            }
            Ok(self.html.clone())
        }
    }

    /// Serializes through a shared `NormalizedHtml`, like the clipboard module
    /// reading the selection during a copy.
    struct FakeClipboard {
        editor: Rc<RefCell<NormalizedHtml<FakeEditor>>>,
        fail: bool,
    }

    impl CopyHandler for FakeClipboard {
        type Output = String;
        type Error = String;

        fn on_copy(&mut self, range: SelectionRange, _is_cut: bool) -> Result<String, String> {
            let html = self.editor.borrow_mut().html(range.index, range.length)?;
            if self.fail {
                return Err("clipboard denied".to_string());
            }
            Ok(html)
        }
    }

    fn setup(config: FixConfig) -> (Rc<RefCell<NormalizedHtml<FakeEditor>>>, NormalizationGate) {
        let gate = NormalizationGate::new();
        let editor = NormalizedHtml::new(FakeEditor::new(RAW), gate.clone(), config);
        (Rc::new(RefCell::new(editor)), gate)
    }

    #[test]
    fn serialization_is_normalized_and_forwards_range() {
        let (editor, _) = setup(FixConfig::default());
        assert_eq!(editor.borrow_mut().html(3, 7).unwrap(), FIXED);
        assert_eq!(*editor.borrow().inner().calls.borrow(), [(3, 7)]);
    }

    #[test]
    fn native_errors_pass_through_unchanged() {
        let gate = NormalizationGate::new();
        let mut native = FakeEditor::new(RAW);
        native.fail = true;
        let mut editor = NormalizedHtml::new(native, gate, FixConfig::default());
        assert_eq!(editor.html(0, 1).unwrap_err(), "editor detached");
    }

    #[test]
    fn copy_sees_raw_html_then_normalization_resumes() {
        let (editor, gate) = setup(FixConfig::default());
        let mut clipboard = GuardedClipboard::new(
            FakeClipboard {
                editor: Rc::clone(&editor),
                fail: false,
            },
            gate.clone(),
            FixConfig::default(),
        );
        assert_eq!(clipboard.on_copy(SelectionRange::new(0, 4), false).unwrap(), RAW);
        assert!(gate.is_enabled());
        assert_eq!(editor.borrow_mut().html(0, 4).unwrap(), FIXED);
    }

    #[test]
    fn failed_copy_still_resumes_normalization() {
        let (editor, gate) = setup(FixConfig::default());
        let mut clipboard = GuardedClipboard::new(
            FakeClipboard {
                editor: Rc::clone(&editor),
                fail: true,
            },
            gate.clone(),
            FixConfig::default(),
        );
        assert_eq!(
            clipboard.on_copy(SelectionRange::new(0, 4), false).unwrap_err(),
            "clipboard denied"
        );
        assert!(gate.is_enabled());
        assert_eq!(editor.borrow_mut().html(0, 4).unwrap(), FIXED);
    }

    #[test]
    fn cut_keeps_raw_html_by_default() {
        let (editor, gate) = setup(FixConfig::default());
        let mut clipboard = GuardedClipboard::new(
            FakeClipboard {
                editor: Rc::clone(&editor),
                fail: false,
            },
            gate,
            FixConfig::default(),
        );
        assert_eq!(clipboard.on_copy(SelectionRange::new(0, 4), true).unwrap(), RAW);
    }

    #[test]
    fn cut_can_opt_into_normalized_html() {
        let config = FixConfig {
            suspend_on_cut: false,
            ..FixConfig::default()
        };
        let (editor, gate) = setup(config.clone());
        let mut clipboard = GuardedClipboard::new(
            FakeClipboard {
                editor: Rc::clone(&editor),
                fail: false,
            },
            gate,
            config,
        );
        assert_eq!(clipboard.on_copy(SelectionRange::new(0, 4), true).unwrap(), FIXED);
        assert_eq!(clipboard.on_copy(SelectionRange::new(0, 4), false).unwrap(), RAW);
    }

    #[test]
    fn suspension_spans_every_editor_sharing_the_gate() {
        let (first, gate) = setup(FixConfig::default());
        let mut second = NormalizedHtml::new(FakeEditor::new(RAW), gate.clone(), FixConfig::default());
        let _copying = gate.suspend();
        assert_eq!(first.borrow_mut().html(0, 1).unwrap(), RAW);
        assert_eq!(second.html(0, 1).unwrap(), RAW);
    }

    #[test]
    fn bindings_only_config_leaves_html_alone() {
        let (editor, _) = setup(FixConfig::bindings_only());
        assert_eq!(editor.borrow_mut().html(0, 1).unwrap(), RAW);
    }
}
