//! Indirect resource string handling.
//!
//! Shell verbs often name themselves with a reference such as
//! `@%SystemRoot%\system32\shell32.dll,-8506` instead of literal text.
//! A [`ResourceResolver`] turns such references into display text; when it
//! cannot, [`display_text`] falls back to a readable placeholder derived
//! from the module file name.

/// Resolves indirect resource references to display text.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceResolver: Send + Sync {
    /// Resolve a normalized `@module,-id` reference.
    ///
    /// Returns `None` when the reference cannot be loaded.
    fn resolve(&self, reference: &str) -> Option<String>;
}

/// Resolver that never resolves anything.
///
/// Used on hosts without a shell string loader and in tests; every
/// reference falls back to its placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

impl ResourceResolver for NoopResolver {
    fn resolve(&self, _reference: &str) -> Option<String> {
        None
    }
}

/// Resolver backed by the shell's `SHLoadIndirectString`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellResolver;

#[cfg(windows)]
impl ResourceResolver for ShellResolver {
    #[allow(unsafe_code)]
    fn resolve(&self, reference: &str) -> Option<String> {
        use windows::Win32::UI::Shell::SHLoadIndirectString;
        use windows::core::PCWSTR;

        let source: Vec<u16> = reference.encode_utf16().chain(std::iter::once(0)).collect();
        let mut buffer = [0u16; 1024];
        // SAFETY: `source` is NUL-terminated and outlives the call, and the
        // output slice length bounds every write the loader makes.
        unsafe { SHLoadIndirectString(PCWSTR(source.as_ptr()), &mut buffer, None) }.ok()?;
        let units: Vec<u16> = buffer.iter().copied().take_while(|&u| u != 0).collect();
        let text = String::from_utf16_lossy(&units);
        (!text.trim().is_empty()).then_some(text)
    }
}

/// The resolver appropriate for the current host.
#[must_use]
pub fn platform_resolver() -> std::sync::Arc<dyn ResourceResolver> {
    #[cfg(windows)]
    {
        std::sync::Arc::new(ShellResolver)
    }
    #[cfg(not(windows))]
    {
        std::sync::Arc::new(NoopResolver)
    }
}

/// Whether `text` looks like an indirect resource reference.
#[must_use]
pub fn is_indirect(text: &str) -> bool {
    text.starts_with('@') || text.contains(".-")
}

/// Rewrite a reference into the `@module,-id` form the loader expects.
///
/// `C:\path\to.dll.-123` becomes `@C:\path\to.dll,-123`.
#[must_use]
pub fn normalize_reference(text: &str) -> String {
    format!("@{}", text.trim_start_matches('@').replace(".-", ",-"))
}

/// Placeholder text for a reference that could not be resolved.
///
/// `@%SystemRoot%\system32\shell32.dll,-8506` becomes
/// `shell32 (Resource String)`.
#[must_use]
pub fn placeholder(text: &str) -> String {
    let value = text.trim_start_matches('@');
    let Some(cut) = [value.find(".-"), value.find(",-")].into_iter().flatten().min() else {
        return value.to_string();
    };
    let module = value.get(..cut).unwrap_or(value);
    let file_name = module.rsplit(['\\', '/']).next().unwrap_or(module);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    if stem.is_empty() {
        return value.to_string();
    }
    format!("{stem} (Resource String)")
}

/// Turn a raw registry display value into presentable text.
///
/// Literal text passes through unchanged.  Indirect references are
/// resolved through `resolver`, falling back to [`placeholder`].
#[must_use]
pub fn display_text(resolver: &dyn ResourceResolver, text: &str) -> String {
    if !is_indirect(text) {
        return text.to_string();
    }
    match resolver.resolve(&normalize_reference(text)) {
        Some(resolved) if !resolved.trim().is_empty() => resolved,
        _ => {
            tracing::debug!("could not resolve resource string {text}");
            placeholder(text)
        }
    }
}

/// Strip keyboard accelerator markers from a menu caption.
///
/// `&&` is an escaped literal ampersand; any other `&` is dropped.
#[must_use]
pub fn strip_accelerators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            if chars.peek() == Some(&'&') {
                chars.next();
                out.push('&');
            }
        } else {
            out.push(c);
        }
    }
    out
}
