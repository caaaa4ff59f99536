//! Seams for the external collaborators this crate talks to but does not
//! implement: the notebook kernel, the language server, and whatever
//! converts a raw datum (image bytes, SVG, LaTeX, ANSI) between formats.
//!
//! Grounded on spec §6/§1: kernel execution, LSP diagnostics, and notebook
//! parsing are explicitly out of scope for the rendering/input core — but
//! the core still needs to know the *shape* of what it calls through, so
//! the containers and controls that display kernel output or format-convert
//! a [`crate::graphics::Datum`] have something concrete to hold. These are
//! trait definitions only; no kernel, LSP, or converter backend lives here.

/// A MIME bundle delivered by a kernel as execution output: MIME type to
/// raw payload (text, base64 image data, etc).
pub type MimeBundle = std::collections::BTreeMap<String, Vec<u8>>;

/// Everything a running code-execution backend exposes to the display
/// layer. Grounded on spec §6's kernel client operation/callback list.
pub trait KernelClient {
    fn run(&mut self, source: &str);
    fn complete(&mut self, source: &str, pos: usize);
    fn is_complete(&mut self, source: &str) -> bool;
    fn inspect(&mut self, source: &str, pos: usize);
    fn interrupt(&mut self);
    fn restart(&mut self);
    fn shutdown(&mut self);
}

/// Callbacks a [`KernelClient`] implementation delivers back into the
/// core as execution proceeds.
pub trait KernelCallbacks {
    fn add_output(&mut self, mime_bundle: MimeBundle, own: bool);
    fn clear_output(&mut self, wait: bool);
    fn set_execution_count(&mut self, count: u32);
    fn set_status(&mut self, status: &str);
    fn set_kernel_info(&mut self, info: &std::collections::BTreeMap<String, String>);
    fn get_input(&mut self, prompt: &str, password: bool) -> String;
}

/// Severity of an [`Diagnostic`], 0 (error) through 5, matching the LSP
/// `DiagnosticSeverity` plus `euporie`'s extra informational levels.
pub type DiagnosticLevel = u8;

/// One diagnostic reported by a language server against an open document.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
    pub level: DiagnosticLevel,
    pub link: Option<String>,
    pub line_range: (usize, usize),
    pub char_range: (usize, usize),
}

/// A language-server connection scoped to one document. Grounded on spec
/// §6's LSP client operation/event list.
pub trait LspClient {
    fn open_doc(&mut self, uri: &str, text: &str);
    fn change_doc(&mut self, uri: &str, text: &str);
    fn close_doc(&mut self, uri: &str);
    fn hover(&mut self, uri: &str, line: usize, col: usize);
    fn complete(&mut self, uri: &str, line: usize, col: usize);
    fn format(&mut self, uri: &str);
    fn on_diagnostics(&mut self, uri: &str, diagnostics: Vec<Diagnostic>);
}

/// Converts a datum from its current format to a requested one, resolving
/// a shortest-path route through whatever intermediate formats the
/// implementation knows (e.g. svg -> png -> sixel). The `wrap_lines`/
/// `fg`/`bg` parameters let a text-producing converter (e.g. an
/// ANSI-to-styled-text stage) size and colour its output the way the
/// requesting [`crate::graphics::Display`] needs.
pub trait FormatConverter {
    fn convert(
        &self,
        datum: &[u8],
        from: &str,
        to: &str,
        cols: u16,
        rows: u16,
        fg: Option<crate::style::Rgba>,
        bg: Option<crate::style::Rgba>,
        wrap_lines: bool,
    ) -> crate::error::Result<Vec<u8>>;

    /// Whether this converter (transitively) knows a route from `from` to
    /// `to` at all, without doing the conversion.
    fn find_route(&self, from: &str, to: &str) -> bool;
}
